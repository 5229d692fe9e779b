//! Resource link generation
//!
//! All hrefs in a document are derived from a single [`LinkBuilder`] that
//! carries the externally-configured base URL. Link builders take every
//! piece of context as an explicit parameter so they can be exercised
//! without a running server.

/// Builds collection, resource and related-resource hrefs.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
	base_url: String,
}

impl LinkBuilder {
	/// Create a builder rooted at `base_url`. A trailing slash is stripped
	/// so joined paths never contain `//`.
	///
	/// # Examples
	///
	/// ```
	/// use jsonapi_rest::links::LinkBuilder;
	///
	/// let links = LinkBuilder::new("https://api.example.com/");
	/// assert_eq!(links.collection("articles"), "https://api.example.com/articles");
	/// ```
	pub fn new(base_url: impl Into<String>) -> Self {
		let mut base_url = base_url.into();
		while base_url.ends_with('/') {
			base_url.pop();
		}
		Self { base_url }
	}

	/// Href of a collection endpoint, e.g. `/articles`.
	pub fn collection(&self, plural: &str) -> String {
		format!("{}/{}", self.base_url, plural)
	}

	/// Href of a single resource, e.g. `/articles/42`.
	pub fn resource(&self, plural: &str, id: &str) -> String {
		format!("{}/{}/{}", self.base_url, plural, id)
	}

	/// Href of a related-resource endpoint, e.g. `/articles/42/author`.
	pub fn related(&self, plural: &str, id: &str, alias: &str) -> String {
		format!("{}/{}/{}/{}", self.base_url, plural, id, alias)
	}
}
