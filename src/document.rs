//! Document builder
//!
//! Turns one record or an ordered sequence of records into a JSON:API
//! top-level document: `data`, `links`, `meta` and, when includes were
//! requested, `included`. Records arrive as `serde_json::Value` objects
//! produced by the external populate step; everything else the builder
//! needs (counts, total, selection, populated related records) is passed
//! in explicitly through [`SerializeContext`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::links::LinkBuilder;
use crate::query::QuerySelection;
use crate::registry::SchemaRegistry;
use crate::schema::{CountMap, RelationshipLinks, ResourceSchema, SchemaError};

/// The `data` payload handed to the serializer.
#[derive(Debug, Clone)]
pub enum Data {
	Single(Value),
	Collection(Vec<Value>),
}

/// Request-scoped context resolved by the external populate collaborator.
#[derive(Debug, Clone, Default)]
pub struct SerializeContext {
	/// Relationship counts: alias → record id → count.
	pub counts: CountMap,
	/// Overall total for collection endpoints; `meta` is omitted entirely
	/// when undefined.
	pub total: Option<u64>,
	/// Parsed `fields`/`include` selection for this request.
	pub selection: QuerySelection,
	/// Populated related records, keyed by resource-type token.
	pub included: HashMap<String, Vec<Value>>,
}

/// A `links` object holding only `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfLinks {
	#[serde(rename = "self")]
	pub self_link: String,
}

/// One relationship entry: `{ "links": { "related": ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipObject {
	pub links: RelationshipLinks,
}

/// One member of `data` or `included`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
	#[serde(rename = "type")]
	pub type_token: String,
	pub id: String,
	pub attributes: Map<String, Value>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub relationships: BTreeMap<String, RelationshipObject>,
	pub links: SelfLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentData {
	One(ResourceObject),
	Many(Vec<ResourceObject>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
	pub total: u64,
}

/// A complete top-level document. Built per response and discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDocument {
	pub data: DocumentData,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub included: Option<Vec<ResourceObject>>,
	pub links: SelfLinks,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub meta: Option<DocumentMeta>,
}

/// Shapes records of registered types into documents.
#[derive(Clone)]
pub struct Serializer {
	registry: Arc<SchemaRegistry>,
	links: LinkBuilder,
}

impl Serializer {
	pub fn new(registry: Arc<SchemaRegistry>, links: LinkBuilder) -> Self {
		Self { registry, links }
	}

	/// Serializes `data` of the given resource type into a document.
	///
	/// Fails with [`SchemaError::NotRegistered`] when the type is unknown;
	/// that is fatal to the request, never an occasion for malformed
	/// output. The top-level `links.self` points at the collection
	/// endpoint when `data` is a sequence and at the resource otherwise.
	pub fn serialize(
		&self,
		type_token: &str,
		data: Data,
		ctx: &SerializeContext,
	) -> Result<ResourceDocument, SchemaError> {
		let schema = self.registry.lookup(type_token)?;

		let (document_data, top_link) = match data {
			Data::Single(record) => {
				let object = self.resource_object(schema, &record, ctx)?;
				let link = schema.top_level_self_link(Some(&object.id), &self.links);
				(DocumentData::One(object), link)
			}
			Data::Collection(records) => {
				let mut objects = Vec::with_capacity(records.len());
				for record in &records {
					objects.push(self.resource_object(schema, record, ctx)?);
				}
				let link = schema.top_level_self_link(None, &self.links);
				(DocumentData::Many(objects), link)
			}
		};

		Ok(ResourceDocument {
			data: document_data,
			included: self.build_included(schema, ctx)?,
			links: SelfLinks {
				self_link: top_link,
			},
			meta: ctx.total.map(|total| DocumentMeta { total }),
		})
	}

	/// Shapes one record: `type`, `id`, `attributes` (filtered by the
	/// sparse fieldset, excluding `id` and relationship aliases),
	/// `relationships` and `links.self`.
	fn resource_object(
		&self,
		schema: &ResourceSchema,
		record: &Value,
		ctx: &SerializeContext,
	) -> Result<ResourceObject, SchemaError> {
		let id = record_id(record).ok_or_else(|| SchemaError::MissingId {
			type_token: schema.type_token.clone(),
		})?;

		let mut attributes = Map::new();
		if let Some(fields) = record.as_object() {
			for (name, value) in fields {
				if name == "id" || schema.relationships.contains_key(name) {
					continue;
				}
				if !schema.attributes.is_empty() && !schema.attributes.contains(name) {
					continue;
				}
				if !ctx.selection.allows(&schema.type_token, name) {
					continue;
				}
				attributes.insert(name.clone(), value.clone());
			}
		}

		let mut relationships = BTreeMap::new();
		for (alias, descriptor) in &schema.relationships {
			relationships.insert(
				alias.clone(),
				RelationshipObject {
					links: descriptor.links(&schema.plural, &id, &ctx.counts, &self.links),
				},
			);
		}

		Ok(ResourceObject {
			type_token: schema.type_token.clone(),
			id: id.clone(),
			attributes,
			relationships,
			links: SelfLinks {
				self_link: schema.self_link(&id, &self.links),
			},
		})
	}

	/// Collects included resources for every requested path, shaped by
	/// their own schemas and deduplicated by (type, id) across the whole
	/// document. Emitted (possibly empty) whenever includes were
	/// requested, so callers can tell "nothing included" from "inclusion
	/// not requested".
	fn build_included(
		&self,
		root: &ResourceSchema,
		ctx: &SerializeContext,
	) -> Result<Option<Vec<ResourceObject>>, SchemaError> {
		if ctx.selection.include().is_empty() {
			return Ok(None);
		}

		let mut seen: HashSet<(String, String)> = HashSet::new();
		let mut included = Vec::new();

		'paths: for path in ctx.selection.include() {
			let mut schema = root;
			let mut targets = Vec::new();
			for segment in path.segments() {
				let Some(descriptor) = schema.relationships.get(segment) else {
					tracing::warn!(
						path = path.raw(),
						segment = %segment,
						"dropping include path with unknown relationship"
					);
					continue 'paths;
				};
				schema = self.registry.lookup(&descriptor.target_type)?;
				targets.push(schema);
			}

			for target in targets {
				let Some(records) = ctx.included.get(&target.type_token) else {
					continue;
				};
				for record in records {
					let object = self.resource_object(target, record, ctx)?;
					let key = (object.type_token.clone(), object.id.clone());
					if seen.insert(key) {
						included.push(object);
					}
				}
			}
		}

		Ok(Some(included))
	}
}

fn record_id(record: &Value) -> Option<String> {
	match record.get("id")? {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}
