//! Process-wide schema registry
//!
//! Built exactly once, after the ORM collaborator has loaded its model
//! metadata, then shared read-only across requests (wrap it in an `Arc`).
//! There is no interior mutability: a metadata change requires a full
//! rebuild, which keeps the read path lock-free.

use std::collections::HashMap;

use crate::inflection;
use crate::schema::{ModelInfo, ResourceSchema, SchemaError};

/// Maps resource-type tokens to their schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
	schemas: HashMap<String, ResourceSchema>,
}

impl SchemaRegistry {
	/// One-shot build from the full model set.
	///
	/// Building from an empty set fails loudly: it means registration ran
	/// before model metadata was available, which is a wiring bug, not a
	/// condition to paper over.
	///
	/// # Examples
	///
	/// ```
	/// use jsonapi_rest::registry::SchemaRegistry;
	/// use jsonapi_rest::schema::{AssociationKind, ModelInfo};
	///
	/// let models = vec![
	///     ModelInfo::new("Article")
	///         .with_association("author", "Person", AssociationKind::ToOne),
	///     ModelInfo::new("Person"),
	/// ];
	/// let registry = SchemaRegistry::build(&models).unwrap();
	/// assert!(registry.lookup("article").is_ok());
	/// assert!(registry.lookup("person").is_ok());
	/// ```
	pub fn build(models: &[ModelInfo]) -> Result<Self, SchemaError> {
		if models.is_empty() {
			return Err(SchemaError::NoModels);
		}

		let known_models: HashMap<String, String> = models
			.iter()
			.map(|model| {
				(
					model.name.to_lowercase(),
					inflection::resource_type(&model.name),
				)
			})
			.collect();

		let mut registry = Self::default();
		for model in models {
			let schema = ResourceSchema::from_model(model, &known_models)?;
			registry.register(schema);
		}

		tracing::info!(models = models.len(), "schema registry built");
		Ok(registry)
	}

	/// Stores a schema under its type token, overwriting any prior entry.
	/// Re-registration is idempotent because host re-initialization may run
	/// the build step again.
	pub fn register(&mut self, schema: ResourceSchema) {
		tracing::debug!(type_token = %schema.type_token, "registering resource schema");
		self.schemas.insert(schema.type_token.clone(), schema);
	}

	/// Resolves a type token, failing when the type was never registered.
	/// Callers must treat the failure as fatal to the current request:
	/// serialization cannot proceed for an unknown type.
	pub fn lookup(&self, type_token: &str) -> Result<&ResourceSchema, SchemaError> {
		self.schemas
			.get(type_token)
			.ok_or_else(|| SchemaError::NotRegistered {
				type_token: type_token.to_string(),
			})
	}

	/// Finds the schema whose plural collection token matches a URL path
	/// segment, e.g. "articles" → the "article" schema.
	pub fn schema_for_plural(&self, plural: &str) -> Option<&ResourceSchema> {
		self.schemas.values().find(|schema| schema.plural == plural)
	}

	pub fn len(&self) -> usize {
		self.schemas.len()
	}

	pub fn is_empty(&self) -> bool {
		self.schemas.is_empty()
	}
}
