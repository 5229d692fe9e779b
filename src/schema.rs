//! Resource schemas and relationship descriptors
//!
//! A [`ResourceSchema`] is built once per model from the metadata the ORM
//! layer hands over at startup and is read-only afterwards. It carries
//! everything the serializer needs for one resource type: the type token,
//! its plural collection path, the declared attribute names and one
//! [`RelationshipDescriptor`] per association.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::inflection;
use crate::links::LinkBuilder;

/// Errors raised while building or consulting resource schemas.
///
/// None of these are recoverable by the current request: a lookup miss or
/// a dangling association target is a startup-ordering bug, not user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
	/// Serialization was requested for a type that was never registered.
	#[error("resource type '{type_token}' is not registered")]
	NotRegistered { type_token: String },

	/// An association points at a model that is not part of the model set.
	#[error("association '{alias}' on model '{model}' targets unknown model '{target}'")]
	UnknownTarget {
		model: String,
		alias: String,
		target: String,
	},

	/// A registry build was attempted before any model metadata was loaded.
	#[error("cannot build a schema registry from an empty model set")]
	NoModels,

	/// A record handed to the serializer carries no usable `id`.
	#[error("record of type '{type_token}' has no id")]
	MissingId { type_token: String },
}

/// Cardinality of an association as declared by the ORM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
	ToOne,
	ToMany,
}

/// One association as declared on a model: the alias exposed to clients
/// and the display name of the model it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
	pub alias: String,
	pub target: String,
	pub kind: AssociationKind,
}

/// Model metadata handed over by the ORM collaborator at startup.
///
/// # Examples
///
/// ```
/// use jsonapi_rest::schema::{AssociationKind, ModelInfo};
///
/// let article = ModelInfo::new("Article")
///     .with_attribute("title")
///     .with_attribute("body")
///     .with_association("author", "Person", AssociationKind::ToOne);
/// assert_eq!(article.name, "Article");
/// assert_eq!(article.associations.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
	/// Display name with its original casing, e.g. "UserProfile".
	pub name: String,
	pub attributes: Vec<String>,
	pub associations: Vec<Association>,
}

impl ModelInfo {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attributes: Vec::new(),
			associations: Vec::new(),
		}
	}

	pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
		self.attributes.push(name.into());
		self
	}

	pub fn with_association(
		mut self,
		alias: impl Into<String>,
		target: impl Into<String>,
		kind: AssociationKind,
	) -> Self {
		self.associations.push(Association {
			alias: alias.into(),
			target: target.into(),
			kind,
		});
		self
	}
}

/// Relationship counts resolved by the populate step:
/// alias → record id → count.
pub type CountMap = HashMap<String, HashMap<String, u64>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedMeta {
	pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
	pub href: String,
	pub meta: RelatedMeta,
}

/// The `links` object of one relationship entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipLinks {
	pub related: RelatedLink,
}

/// Per-association metadata producing link and count information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDescriptor {
	pub alias: String,
	/// Resource-type token of the associated model.
	pub target_type: String,
	pub kind: AssociationKind,
}

impl RelationshipDescriptor {
	/// Computes the `related` link for one owning record.
	///
	/// A missing alias or record id in the count map means zero, never an
	/// error: a relationship that was not populated reports `count: 0`.
	pub fn links(
		&self,
		owner_plural: &str,
		record_id: &str,
		counts: &CountMap,
		links: &LinkBuilder,
	) -> RelationshipLinks {
		let count = counts
			.get(&self.alias)
			.and_then(|by_id| by_id.get(record_id))
			.copied()
			.unwrap_or(0);
		RelationshipLinks {
			related: RelatedLink {
				href: links.related(owner_plural, record_id, &self.alias),
				meta: RelatedMeta { count },
			},
		}
	}
}

/// Everything the serializer needs for one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSchema {
	pub type_token: String,
	/// Plural form used in collection and resource paths.
	pub plural: String,
	/// Declared attribute names. Empty means "expose every record field".
	pub attributes: HashSet<String>,
	/// Ordered by alias so document output is deterministic.
	pub relationships: BTreeMap<String, RelationshipDescriptor>,
}

impl ResourceSchema {
	/// Builds the schema for one model, resolving every association target
	/// through the normalizer. `known_models` maps lowercased model names
	/// to their type tokens; an association pointing outside that set fails
	/// the whole build rather than producing a dangling type token.
	pub fn from_model(
		model: &ModelInfo,
		known_models: &HashMap<String, String>,
	) -> Result<Self, SchemaError> {
		let type_token = inflection::resource_type(&model.name);
		let plural = inflection::pluralize(&type_token);

		let mut relationships = BTreeMap::new();
		for association in &model.associations {
			let target_type = known_models
				.get(&association.target.to_lowercase())
				.cloned()
				.ok_or_else(|| SchemaError::UnknownTarget {
					model: model.name.clone(),
					alias: association.alias.clone(),
					target: association.target.clone(),
				})?;
			relationships.insert(
				association.alias.clone(),
				RelationshipDescriptor {
					alias: association.alias.clone(),
					target_type,
					kind: association.kind,
				},
			);
		}

		Ok(Self {
			type_token,
			plural,
			attributes: model.attributes.iter().cloned().collect(),
			relationships,
		})
	}

	/// Self link of one record of this type.
	pub fn self_link(&self, id: &str, links: &LinkBuilder) -> String {
		links.resource(&self.plural, id)
	}

	/// Top-level self link: the collection endpoint for sequences, the
	/// resource endpoint for a single record.
	pub fn top_level_self_link(&self, id: Option<&str>, links: &LinkBuilder) -> String {
		match id {
			Some(id) => links.resource(&self.plural, id),
			None => links.collection(&self.plural),
		}
	}
}
