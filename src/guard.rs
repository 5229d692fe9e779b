//! Unknown-association guard
//!
//! Requests shaped like `/<resource>/<id>/<relation>` reach relationship
//! traversal logic; when the relation segment is not a registered alias
//! the traversal would surface as a generic 500 deep inside a handler.
//! This middleware rejects such paths with a 400 before any handler runs.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::error::{ApiResult, ErrorDocument, ErrorObject};
use crate::http::{Handler, Middleware, Request, Response};
use crate::registry::SchemaRegistry;

/// Rejects relationship paths whose final segment cannot be resolved.
pub struct UnknownAssociationGuard {
	registry: Arc<SchemaRegistry>,
}

impl UnknownAssociationGuard {
	pub fn new(registry: Arc<SchemaRegistry>) -> Self {
		Self { registry }
	}

	/// Whether the path matches the relationship shape with an alias that
	/// cannot be resolved for the resource at that path.
	fn is_unresolvable(&self, path: &str) -> bool {
		static RELATION_PATH: Lazy<Regex> = Lazy::new(|| {
			Regex::new(r"^/([A-Za-z][A-Za-z-]*)/([0-9]+)/([A-Za-z][A-Za-z-]*)/?$")
				.expect("Invalid relationship path pattern")
		});

		let Some(captures) = RELATION_PATH.captures(path) else {
			return false;
		};
		let resource = &captures[1];
		let alias = &captures[3];

		!self
			.registry
			.schema_for_plural(resource)
			.map(|schema| schema.relationships.contains_key(alias))
			.unwrap_or(false)
	}
}

#[async_trait]
impl Middleware for UnknownAssociationGuard {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> ApiResult<Response> {
		if self.is_unresolvable(request.path()) {
			tracing::debug!(path = request.path(), "rejecting unresolvable relationship path");
			let document = ErrorDocument::new(vec![ErrorObject::new(
				"Bad Request",
				"Unable to identify relationship",
			)]);
			return Ok(Response::bad_request()
				.with_json(&document)
				.with_stop_chain(true));
		}
		next.handle(request).await
	}
}
