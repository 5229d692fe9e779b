//! Resource-type token derivation
//!
//! Model names arrive with arbitrary casing ("UserProfile", "person") and
//! must map to stable, URL-safe tokens. Both functions here are pure: the
//! same token is derived at registration time and at link-generation time,
//! so a type name can never drift between the two.

use heck::ToKebabCase;

/// Irregular plural forms that the suffix rules below would get wrong.
const IRREGULAR: &[(&str, &str)] = &[
	("person", "people"),
	("child", "children"),
	("man", "men"),
	("woman", "women"),
	("mouse", "mice"),
	("goose", "geese"),
	("foot", "feet"),
	("tooth", "teeth"),
	("ox", "oxen"),
];

/// Words whose singular and plural forms are identical.
const UNCOUNTABLE: &[&str] = &[
	"equipment",
	"information",
	"news",
	"series",
	"species",
	"sheep",
	"fish",
	"deer",
];

/// Converts a model's declared display name into its resource-type token.
///
/// # Examples
///
/// ```
/// use jsonapi_rest::inflection::resource_type;
///
/// assert_eq!(resource_type("UserProfile"), "user-profile");
/// assert_eq!(resource_type("Article"), "article");
/// ```
pub fn resource_type(name: &str) -> String {
	name.to_kebab_case()
}

/// Pluralizes a resource-type token.
///
/// Only the final word of a multi-word token is pluralized, so
/// "user-profile" becomes "user-profiles". Irregular forms are preserved:
/// "person" becomes "people", never "persons".
///
/// # Examples
///
/// ```
/// use jsonapi_rest::inflection::pluralize;
///
/// assert_eq!(pluralize("article"), "articles");
/// assert_eq!(pluralize("person"), "people");
/// assert_eq!(pluralize("category"), "categories");
/// assert_eq!(pluralize("user-profile"), "user-profiles");
/// ```
pub fn pluralize(token: &str) -> String {
	match token.rfind('-') {
		Some(idx) => {
			let (prefix, word) = token.split_at(idx + 1);
			format!("{}{}", prefix, pluralize_word(word))
		}
		None => pluralize_word(token),
	}
}

fn pluralize_word(word: &str) -> String {
	if word.is_empty() {
		return String::new();
	}
	if UNCOUNTABLE.contains(&word) {
		return word.to_string();
	}
	if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
		return (*plural).to_string();
	}
	// Already-plural irregulars map to themselves
	if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
		return word.to_string();
	}

	if word.ends_with('s')
		|| word.ends_with('x')
		|| word.ends_with('z')
		|| word.ends_with("ch")
		|| word.ends_with("sh")
	{
		return format!("{}es", word);
	}
	if let Some(stem) = word.strip_suffix('y') {
		if !stem.is_empty() && !stem.ends_with(|c: char| "aeiou".contains(c)) {
			return format!("{}ies", stem);
		}
	}
	if let Some(stem) = word.strip_suffix("fe") {
		return format!("{}ves", stem);
	}
	if let Some(stem) = word.strip_suffix('f') {
		return format!("{}ves", stem);
	}
	format!("{}s", word)
}
