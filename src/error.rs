//! Internal errors and their document-shaped form
//!
//! [`ApiError`] is what handlers and middleware propagate; [`jsonify`]
//! turns one into the `errors` members of a JSON:API error document.
//! A document contains either `data` or `errors`, never both, so the
//! error envelope is its own type.

use http::StatusCode;
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
	pub field: String,
	pub message: String,
}

impl FieldFailure {
	pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			message: message.into(),
		}
	}
}

/// Error kinds surfaced by the request path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
	#[error("bad request: {0}")]
	BadRequest(String),

	#[error("forbidden: {0}")]
	Forbidden(String),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("not acceptable: {0}")]
	NotAcceptable(String),

	#[error("unsupported media type: {0}")]
	UnsupportedMediaType(String),

	#[error("validation failed")]
	Validation(Vec<FieldFailure>),

	/// Any other internal failure. The payload is for the log only; it is
	/// never copied into a response body.
	#[error("internal error: {0}")]
	Internal(String),
}

impl ApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
			ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
			ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn title(&self) -> &'static str {
		match self {
			ApiError::BadRequest(_) => "Bad Request",
			ApiError::Forbidden(_) => "Forbidden",
			ApiError::NotFound(_) => "Not Found",
			ApiError::NotAcceptable(_) => "Not Acceptable",
			ApiError::UnsupportedMediaType(_) => "Unsupported Media Type",
			ApiError::Validation(_) => "Unprocessable Entity",
			ApiError::Internal(_) => "Internal Server Error",
		}
	}
}

impl From<crate::schema::SchemaError> for ApiError {
	/// Registry and schema failures indicate a startup-ordering bug, so
	/// they abort the request as a server error, distinct from a normal
	/// 404 for a missing record.
	fn from(err: crate::schema::SchemaError) -> Self {
		ApiError::Internal(err.to_string())
	}
}

/// The `source` member of an error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSource {
	pub pointer: String,
}

/// One member of a document's `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	pub title: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<ErrorSource>,
}

impl ErrorObject {
	/// Bare title/detail object, as emitted by pre-handler guards.
	pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
		Self {
			status: None,
			title: title.into(),
			detail: Some(detail.into()),
			source: None,
		}
	}
}

/// The error envelope: `{ "errors": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDocument {
	pub errors: Vec<ErrorObject>,
}

impl ErrorDocument {
	pub fn new(errors: Vec<ErrorObject>) -> Self {
		Self { errors }
	}

	pub fn from_error(error: &ApiError) -> Self {
		Self {
			errors: jsonify(error),
		}
	}
}

/// Converts an internal error into its document-shaped error objects.
///
/// A validation failure yields one object per field, in input order, each
/// carrying a `source.pointer` of `/data/attributes/<field>`. Every other
/// kind yields exactly one object without a `source`. Internal errors are
/// redacted: the underlying message goes to the log, the document gets a
/// generic detail.
///
/// # Examples
///
/// ```
/// use jsonapi_rest::error::{jsonify, ApiError, FieldFailure};
///
/// let errors = jsonify(&ApiError::Validation(vec![
///     FieldFailure::new("title", "is required"),
/// ]));
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].source.as_ref().unwrap().pointer, "/data/attributes/title");
/// ```
pub fn jsonify(error: &ApiError) -> Vec<ErrorObject> {
	let status = error.status().as_u16().to_string();
	let title = error.title().to_string();

	match error {
		ApiError::Validation(failures) => failures
			.iter()
			.map(|failure| ErrorObject {
				status: Some(status.clone()),
				title: title.clone(),
				detail: Some(failure.message.clone()),
				source: Some(ErrorSource {
					pointer: format!("/data/attributes/{}", failure.field),
				}),
			})
			.collect(),
		ApiError::Internal(message) => {
			tracing::error!(%message, "internal error surfaced to client");
			vec![ErrorObject {
				status: Some(status),
				title,
				detail: Some("An unexpected error occurred.".to_string()),
				source: None,
			}]
		}
		ApiError::BadRequest(detail)
		| ApiError::Forbidden(detail)
		| ApiError::NotFound(detail)
		| ApiError::NotAcceptable(detail)
		| ApiError::UnsupportedMediaType(detail) => vec![ErrorObject {
			status: Some(status),
			title,
			detail: Some(detail.clone()),
			source: None,
		}],
	}
}
