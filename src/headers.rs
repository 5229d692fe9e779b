//! JSON:API request-header validation
//!
//! Per the media-type registration, a request whose `Content-Type` is
//! `application/vnd.api+json` with media type parameters must be rejected
//! with 415, and a request whose `Accept` header lists the media type
//! only in parameterized forms must be rejected with 406. Runs before any
//! handler, alongside the association guard.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult, ErrorDocument};
use crate::http::{Handler, Middleware, Request, Response};
use crate::negotiation::JSON_API_MEDIA_TYPE;

/// Enforces the JSON:API header contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateHeaders;

impl ValidateHeaders {
	/// 415 when the declared content type is the JSON:API media type with
	/// any parameters attached.
	fn content_type_violation(request: &Request) -> bool {
		match request.content_type() {
			Some(value) => {
				let mut parts = value.split(';');
				let media_type = parts.next().unwrap_or("").trim();
				media_type == JSON_API_MEDIA_TYPE && parts.next().is_some()
			}
			None => false,
		}
	}

	/// 406 when every JSON:API entry in `Accept` carries parameters.
	fn accept_violation(request: &Request) -> bool {
		let Some(value) = request.accept() else {
			return false;
		};
		let entries: Vec<&str> = value
			.split(',')
			.map(str::trim)
			.filter(|entry| entry.split(';').next().unwrap_or("").trim() == JSON_API_MEDIA_TYPE)
			.collect();
		!entries.is_empty() && entries.iter().all(|entry| entry.contains(';'))
	}
}

#[async_trait]
impl Middleware for ValidateHeaders {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> ApiResult<Response> {
		if Self::content_type_violation(&request) {
			let error = ApiError::UnsupportedMediaType(
				"Content-Type must not carry media type parameters".to_string(),
			);
			return Ok(Response::unsupported_media_type()
				.with_json(&ErrorDocument::from_error(&error))
				.with_content_type(JSON_API_MEDIA_TYPE)
				.with_stop_chain(true));
		}
		if Self::accept_violation(&request) {
			let error = ApiError::NotAcceptable(
				"Accept must list the media type without parameters".to_string(),
			);
			return Ok(Response::not_acceptable()
				.with_json(&ErrorDocument::from_error(&error))
				.with_content_type(JSON_API_MEDIA_TYPE)
				.with_stop_chain(true));
		}
		next.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::header::{ACCEPT, CONTENT_TYPE};
	use http::StatusCode;

	struct OkHandler;

	#[async_trait]
	impl Handler for OkHandler {
		async fn handle(&self, _request: Request) -> ApiResult<Response> {
			Ok(Response::ok())
		}
	}

	fn request(content_type: Option<&str>, accept: Option<&str>) -> Request {
		let mut builder = Request::builder().uri("/articles");
		if let Some(value) = content_type {
			builder = builder.header(CONTENT_TYPE, value);
		}
		if let Some(value) = accept {
			builder = builder.header(ACCEPT, value);
		}
		builder.build().unwrap()
	}

	#[tokio::test]
	async fn test_parameterized_content_type_rejected() {
		let response = ValidateHeaders
			.process(
				request(Some("application/vnd.api+json; version=1"), None),
				Arc::new(OkHandler),
			)
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
		assert!(response.should_stop_chain());
	}

	#[tokio::test]
	async fn test_bare_content_type_passes() {
		let response = ValidateHeaders
			.process(
				request(Some("application/vnd.api+json"), None),
				Arc::new(OkHandler),
			)
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::OK);
	}

	#[tokio::test]
	async fn test_all_parameterized_accept_rejected() {
		let response = ValidateHeaders
			.process(
				request(None, Some("application/vnd.api+json; q=0.8")),
				Arc::new(OkHandler),
			)
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
	}

	#[tokio::test]
	async fn test_accept_with_one_bare_entry_passes() {
		let response = ValidateHeaders
			.process(
				request(
					None,
					Some("application/vnd.api+json; q=0.8, application/vnd.api+json"),
				),
				Arc::new(OkHandler),
			)
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::OK);
	}

	#[tokio::test]
	async fn test_unrelated_headers_pass() {
		let response = ValidateHeaders
			.process(
				request(Some("application/json"), Some("text/html, application/json")),
				Arc::new(OkHandler),
			)
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::OK);
	}
}
