//! Content-type response negotiation
//!
//! A single logical outcome (success or error) is routed to one of two
//! response shapes by the declared content type: callers that negotiated
//! `application/vnd.api+json` get JSON:API documents, every other caller
//! gets the legacy plain shape, unchanged. The [`NegotiatingResponder`]
//! is a decorator: it holds the plain responder it was given rather than
//! replacing it, so custom responders installed by the host keep their
//! exact signature and behavior.

use std::sync::Arc;

use crate::document::ResourceDocument;
use crate::error::{ApiError, ErrorDocument};
use crate::http::Response;

/// The JSON:API media type.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Whether a declared content type selects the hypermedia path. The match
/// is exact: a parameterized `application/vnd.api+json; v=1` does not.
pub fn is_json_api(content_type: Option<&str>) -> bool {
	content_type.map(str::trim) == Some(JSON_API_MEDIA_TYPE)
}

/// Renders one error outcome as a complete response. Pure per request.
pub trait ErrorResponder: Send + Sync {
	fn respond(&self, error: &ApiError) -> Response;
}

/// JSON:API responder: status code plus an `{ "errors": [...] }` body.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonApiResponder;

impl ErrorResponder for JsonApiResponder {
	fn respond(&self, error: &ApiError) -> Response {
		Response::new(error.status())
			.with_json(&ErrorDocument::from_error(error))
			.with_content_type(JSON_API_MEDIA_TYPE)
	}
}

impl JsonApiResponder {
	/// 201 Created with the serialized document of the new resource.
	pub fn created(&self, document: &ResourceDocument) -> Response {
		Response::created()
			.with_json(document)
			.with_content_type(JSON_API_MEDIA_TYPE)
	}

	/// 200 OK with a serialized document.
	pub fn ok(&self, document: &ResourceDocument) -> Response {
		Response::ok()
			.with_json(document)
			.with_content_type(JSON_API_MEDIA_TYPE)
	}

	/// 204 No Content with an empty body.
	pub fn no_content(&self) -> Response {
		Response::no_content()
	}
}

/// Legacy responder: status code plus a plain-text body. This is the
/// behavior callers that never asked for hypermedia always received.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainResponder;

impl ErrorResponder for PlainResponder {
	fn respond(&self, error: &ApiError) -> Response {
		Response::new(error.status())
			.with_body(error.to_string())
			.with_content_type("text/plain; charset=utf-8")
	}
}

/// Dispatches each failure class to the hypermedia or plain responder
/// based on the declared content type.
///
/// # Examples
///
/// ```
/// use jsonapi_rest::error::ApiError;
/// use jsonapi_rest::negotiation::{NegotiatingResponder, JSON_API_MEDIA_TYPE};
/// use http::StatusCode;
///
/// let responder = NegotiatingResponder::with_defaults();
/// let error = ApiError::NotFound("no such article".to_string());
///
/// let hypermedia = responder.respond(Some(JSON_API_MEDIA_TYPE), &error);
/// assert_eq!(hypermedia.status, StatusCode::NOT_FOUND);
/// assert_eq!(hypermedia.content_type(), Some(JSON_API_MEDIA_TYPE));
///
/// let plain = responder.respond(Some("application/json"), &error);
/// assert_eq!(plain.status, StatusCode::NOT_FOUND);
/// assert_ne!(plain.content_type(), Some(JSON_API_MEDIA_TYPE));
/// ```
pub struct NegotiatingResponder {
	plain: Arc<dyn ErrorResponder>,
	json_api: Arc<dyn ErrorResponder>,
}

impl NegotiatingResponder {
	/// Wraps an existing plain responder. Pass the host's custom responder
	/// here to keep it authoritative for non-hypermedia callers; the
	/// decorator never substitutes its own default for one it was given.
	pub fn new(plain: Arc<dyn ErrorResponder>, json_api: Arc<dyn ErrorResponder>) -> Self {
		Self { plain, json_api }
	}

	pub fn with_defaults() -> Self {
		Self::new(Arc::new(PlainResponder), Arc::new(JsonApiResponder))
	}

	/// Picks exactly one of the two response shapes, never a mix.
	pub fn respond(&self, content_type: Option<&str>, error: &ApiError) -> Response {
		if is_json_api(content_type) {
			tracing::debug!(status = %error.status(), "dispatching json:api error response");
			self.json_api.respond(error)
		} else {
			tracing::debug!(status = %error.status(), "dispatching plain error response");
			self.plain.respond(error)
		}
	}
}
