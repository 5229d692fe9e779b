//! Presentation query-parameter parsing
//!
//! Two parameters affect how a response is shaped: `fields[<type>]` (sparse
//! fieldsets) and `include` (dotted relationship paths). Both are parsed
//! into an immutable [`QuerySelection`] that lives for one request.
//!
//! Parsing degrades gracefully: an unparseable fragment is dropped with a
//! warning, never a request failure. Field and include filtering is a
//! convenience for clients, not a security boundary.

use std::collections::{HashMap, HashSet};

/// One dotted include path, split into its relation segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludePath {
	raw: String,
	segments: Vec<String>,
}

impl IncludePath {
	fn parse(raw: &str) -> Option<Self> {
		let segments: Vec<String> = raw.split('.').map(|s| s.trim().to_string()).collect();
		if segments.iter().any(String::is_empty) {
			tracing::warn!(path = raw, "dropping malformed include path");
			return None;
		}
		Some(Self {
			raw: raw.to_string(),
			segments,
		})
	}

	pub fn raw(&self) -> &str {
		&self.raw
	}

	pub fn segments(&self) -> &[String] {
		&self.segments
	}
}

/// Normalized field/include selection for one request.
///
/// A type with no `fields` entry means "no restriction, return all fields";
/// an empty include list means "no includes". Never mutated after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySelection {
	fields_by_type: HashMap<String, HashSet<String>>,
	include: Vec<IncludePath>,
}

impl QuerySelection {
	/// Parses both recognized parameters from a raw query string.
	///
	/// # Examples
	///
	/// ```
	/// use jsonapi_rest::query::QuerySelection;
	///
	/// let selection = QuerySelection::parse("fields[article]=title,summary&include=author");
	/// assert!(selection.allows("article", "title"));
	/// assert!(!selection.allows("article", "body"));
	/// assert_eq!(selection.include().len(), 1);
	///
	/// let empty = QuerySelection::parse("");
	/// assert!(empty.allows("article", "anything"));
	/// assert!(empty.include().is_empty());
	/// ```
	pub fn parse(raw_query: &str) -> Self {
		Self {
			fields_by_type: parse_fields(raw_query),
			include: parse_include(raw_query),
		}
	}

	/// Whether `field` of resource type `type_token` survives the sparse
	/// fieldset. A type without an entry allows everything.
	pub fn allows(&self, type_token: &str, field: &str) -> bool {
		match self.fields_by_type.get(type_token) {
			Some(allowed) => allowed.contains(field),
			None => true,
		}
	}

	pub fn fields_for(&self, type_token: &str) -> Option<&HashSet<String>> {
		self.fields_by_type.get(type_token)
	}

	pub fn include(&self) -> &[IncludePath] {
		&self.include
	}

	/// True when neither parameter was supplied: serializing with such a
	/// selection equals serializing with no selection at all.
	pub fn is_unrestricted(&self) -> bool {
		self.fields_by_type.is_empty() && self.include.is_empty()
	}
}

/// Parses `fields[<type>]=<comma-separated names>` pairs into a map of
/// type token → allowed field names.
pub fn parse_fields(raw_query: &str) -> HashMap<String, HashSet<String>> {
	let mut fields_by_type: HashMap<String, HashSet<String>> = HashMap::new();

	for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
		let Some(type_token) = key
			.strip_prefix("fields[")
			.and_then(|rest| rest.strip_suffix(']'))
		else {
			continue;
		};
		if type_token.is_empty() {
			tracing::warn!(key = %key, "dropping fields parameter with empty type");
			continue;
		}

		let names = fields_by_type.entry(type_token.to_string()).or_default();
		names.extend(
			value
				.split(',')
				.map(str::trim)
				.filter(|name| !name.is_empty())
				.map(String::from),
		);
	}

	fields_by_type
}

/// Parses `include=<comma-separated dotted paths>` into an ordered,
/// deduplicated sequence of paths.
pub fn parse_include(raw_query: &str) -> Vec<IncludePath> {
	let mut seen: HashSet<String> = HashSet::new();
	let mut include = Vec::new();

	for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
		if key != "include" {
			continue;
		}
		for raw_path in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
			if !seen.insert(raw_path.to_string()) {
				continue;
			}
			if let Some(path) = IncludePath::parse(raw_path) {
				include.push(path);
			}
		}
	}

	include
}
