//! # jsonapi-rest
//!
//! JSON:API document shaping and content negotiation for ORM-backed REST
//! services.
//!
//! The crate sits between an ORM and an HTTP layer: the ORM hands over
//! model metadata at startup and raw records plus relationship counts per
//! request; this crate shapes them into standards-compliant documents and
//! decides, per declared content type, whether a caller receives the
//! hypermedia shape or the legacy plain shape.
//!
//! - **[`inflection`]**: model names → stable, URL-safe resource-type
//!   tokens (kebab-case, deterministic pluralization).
//! - **[`registry`]** / **[`schema`]**: a one-shot [`SchemaRegistry`]
//!   built from model metadata, mapping each type token to its link and
//!   relationship rules.
//! - **[`query`]**: `fields[<type>]` and `include` parsing into an
//!   immutable per-request [`QuerySelection`].
//! - **[`document`]**: the [`Serializer`] producing `data` / `links` /
//!   `meta` / `included` documents with (type, id) deduplication.
//! - **[`error`]**: internal error kinds and their document-shaped form.
//! - **[`negotiation`]**: the [`NegotiatingResponder`] decorator routing
//!   each outcome to the hypermedia or plain responder.
//! - **[`guard`]** / **[`headers`]**: pre-handler middleware rejecting
//!   unresolvable relationship paths and malformed JSON:API headers.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use jsonapi_rest::document::{Data, SerializeContext, Serializer};
//! use jsonapi_rest::links::LinkBuilder;
//! use jsonapi_rest::registry::SchemaRegistry;
//! use jsonapi_rest::schema::{AssociationKind, ModelInfo};
//!
//! let models = vec![
//!     ModelInfo::new("Article")
//!         .with_attribute("title")
//!         .with_association("author", "Person", AssociationKind::ToOne),
//!     ModelInfo::new("Person").with_attribute("name"),
//! ];
//! let registry = Arc::new(SchemaRegistry::build(&models).unwrap());
//! let serializer = Serializer::new(registry, LinkBuilder::new("http://localhost:1337"));
//!
//! let record = serde_json::json!({"id": 1, "title": "Hello"});
//! let document = serializer
//!     .serialize("article", Data::Single(record), &SerializeContext::default())
//!     .unwrap();
//! let json = serde_json::to_value(&document).unwrap();
//! assert_eq!(json["data"]["type"], "article");
//! ```

pub mod document;
pub mod error;
pub mod guard;
pub mod headers;
pub mod http;
pub mod inflection;
pub mod links;
pub mod negotiation;
pub mod query;
pub mod registry;
pub mod schema;

pub use document::{Data, ResourceDocument, SerializeContext, Serializer};
pub use error::{ApiError, ApiResult, ErrorDocument, ErrorObject, FieldFailure};
pub use guard::UnknownAssociationGuard;
pub use headers::ValidateHeaders;
pub use http::{Handler, Middleware, MiddlewareChain, Request, Response};
pub use links::LinkBuilder;
pub use negotiation::{
	ErrorResponder, JsonApiResponder, NegotiatingResponder, PlainResponder, JSON_API_MEDIA_TYPE,
};
pub use query::QuerySelection;
pub use registry::SchemaRegistry;
pub use schema::{AssociationKind, CountMap, ModelInfo, ResourceSchema, SchemaError};
