//! Request/response plumbing
//!
//! Thin request and response representations plus the [`Handler`] and
//! [`Middleware`] seams the guard and responders plug into. The host
//! framework owns the actual socket handling; these types only carry what
//! the negotiation layer needs.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiResult;

/// HTTP request representation.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Request {
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Raw query string, empty when absent.
	pub fn query(&self) -> &str {
		self.uri.query().unwrap_or("")
	}

	/// Full `Content-Type` header value, including any parameters.
	pub fn content_type(&self) -> Option<&str> {
		self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
	}

	/// Full `Accept` header value.
	pub fn accept(&self) -> Option<&str> {
		self.headers.get(ACCEPT).and_then(|v| v.to_str().ok())
	}
}

/// Builder for [`Request`].
///
/// # Examples
///
/// ```
/// use jsonapi_rest::http::Request;
/// use http::Method;
///
/// let request = Request::builder()
///     .method(Method::GET)
///     .uri("/articles/42?include=author")
///     .build()
///     .unwrap();
/// assert_eq!(request.path(), "/articles/42");
/// assert_eq!(request.query(), "include=author");
/// ```
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Method,
	uri: String,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	pub fn header(mut self, name: http::header::HeaderName, value: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(value) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn build(self) -> Result<Request, http::Error> {
		let uri = Uri::try_from(self.uri.as_str())?;
		Ok(Request {
			method: self.method,
			uri,
			headers: self.headers,
			body: self.body,
		})
	}
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// When true, no further middleware or handlers run for this request.
	stop_chain: bool,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			stop_chain: false,
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn created() -> Self {
		Self::new(StatusCode::CREATED)
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	pub fn forbidden() -> Self {
		Self::new(StatusCode::FORBIDDEN)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn not_acceptable() -> Self {
		Self::new(StatusCode::NOT_ACCEPTABLE)
	}

	pub fn unsupported_media_type() -> Self {
		Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE)
	}

	pub fn unprocessable_entity() -> Self {
		Self::new(StatusCode::UNPROCESSABLE_ENTITY)
	}

	pub fn server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Serializes `value` as the JSON body and sets `application/json`.
	/// Use [`Response::with_content_type`] afterwards to narrow the media
	/// type. Serialization of the document types in this crate cannot
	/// fail; if it ever does, the body falls back to an empty object and
	/// the cause is logged.
	pub fn with_json<T: Serialize>(mut self, value: &T) -> Self {
		match serde_json::to_vec(value) {
			Ok(bytes) => self.body = Bytes::from(bytes),
			Err(error) => {
				tracing::error!(%error, "response body serialization failed");
				self.body = Bytes::from_static(b"{}");
			}
		}
		self.headers
			.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self
	}

	pub fn with_content_type(mut self, value: &'static str) -> Self {
		self.headers
			.insert(CONTENT_TYPE, HeaderValue::from_static(value));
		self
	}

	pub fn content_type(&self) -> Option<&str> {
		self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
	}

	pub fn with_stop_chain(mut self, stop: bool) -> Self {
		self.stop_chain = stop;
		self
	}

	pub fn should_stop_chain(&self) -> bool {
		self.stop_chain
	}
}

/// Handler trait for processing requests.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> ApiResult<Response>;
}

/// Blanket implementation so `Arc<dyn Handler>` is itself a Handler.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing. Uses composition:
/// a middleware decides whether to call `next` or short-circuit.
#[async_trait]
pub trait Middleware: Send + Sync {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> ApiResult<Response>;
}

/// Composes multiple middleware in front of a handler.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		let mut current: Arc<dyn Handler> = self.handler.clone();
		for middleware in self.middlewares.iter().rev() {
			current = Arc::new(ComposedHandler {
				middleware: middleware.clone(),
				next: current,
			});
		}
		current.handle(request).await
	}
}

struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct EchoHandler;

	#[async_trait]
	impl Handler for EchoHandler {
		async fn handle(&self, request: Request) -> ApiResult<Response> {
			Ok(Response::ok().with_body(request.path().to_string()))
		}
	}

	struct PrefixMiddleware {
		prefix: &'static str,
	}

	#[async_trait]
	impl Middleware for PrefixMiddleware {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> ApiResult<Response> {
			let response = next.handle(request).await?;
			let body = format!(
				"{}{}",
				self.prefix,
				String::from_utf8_lossy(&response.body)
			);
			Ok(response.with_body(body))
		}
	}

	fn request(uri: &str) -> Request {
		Request::builder().uri(uri).build().unwrap()
	}

	#[test]
	fn test_request_query_helpers() {
		let req = request("/articles?fields[article]=title");
		assert_eq!(req.path(), "/articles");
		assert_eq!(req.query(), "fields[article]=title");
		assert_eq!(request("/articles").query(), "");
	}

	#[test]
	fn test_response_json_body() {
		let response = Response::ok().with_json(&serde_json::json!({"ok": true}));
		assert_eq!(response.content_type(), Some("application/json"));
		assert_eq!(&response.body[..], br#"{"ok":true}"#);
	}

	#[test]
	fn test_response_content_type_override() {
		let response = Response::ok()
			.with_json(&serde_json::json!({}))
			.with_content_type("application/vnd.api+json");
		assert_eq!(response.content_type(), Some("application/vnd.api+json"));
	}

	#[tokio::test]
	async fn test_chain_runs_middleware_in_order() {
		let chain = MiddlewareChain::new(Arc::new(EchoHandler))
			.with_middleware(Arc::new(PrefixMiddleware { prefix: "a:" }))
			.with_middleware(Arc::new(PrefixMiddleware { prefix: "b:" }));

		let response = chain.handle(request("/x")).await.unwrap();
		assert_eq!(String::from_utf8_lossy(&response.body), "a:b:/x");
	}

	#[tokio::test]
	async fn test_chain_without_middleware() {
		let chain = MiddlewareChain::new(Arc::new(EchoHandler));
		let response = chain.handle(request("/y")).await.unwrap();
		assert_eq!(String::from_utf8_lossy(&response.body), "/y");
	}
}
