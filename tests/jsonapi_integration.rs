//! End-to-end tests: registry build, pre-handler middleware, document
//! serialization and content-type negotiation wired together the way a
//! host application would.

use std::sync::Arc;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use serde_json::json;

use jsonapi_rest::document::{Data, SerializeContext, Serializer};
use jsonapi_rest::error::{ApiError, ApiResult};
use jsonapi_rest::http::{Handler, MiddlewareChain, Request, Response};
use jsonapi_rest::links::LinkBuilder;
use jsonapi_rest::negotiation::{JsonApiResponder, NegotiatingResponder, JSON_API_MEDIA_TYPE};
use jsonapi_rest::query::QuerySelection;
use jsonapi_rest::registry::SchemaRegistry;
use jsonapi_rest::schema::{AssociationKind, ModelInfo};
use jsonapi_rest::{UnknownAssociationGuard, ValidateHeaders};

const BASE_URL: &str = "http://localhost:1337";

fn models() -> Vec<ModelInfo> {
	vec![
		ModelInfo::new("Article")
			.with_attribute("title")
			.with_attribute("summary")
			.with_attribute("body")
			.with_association("author", "Person", AssociationKind::ToOne)
			.with_association("comments", "Comment", AssociationKind::ToMany),
		ModelInfo::new("Person").with_attribute("name"),
		ModelInfo::new("Comment")
			.with_attribute("text")
			.with_association("author", "Person", AssociationKind::ToOne),
	]
}

fn registry() -> Arc<SchemaRegistry> {
	Arc::new(SchemaRegistry::build(&models()).unwrap())
}

fn serializer(registry: Arc<SchemaRegistry>) -> Serializer {
	Serializer::new(registry, LinkBuilder::new(BASE_URL))
}

/// List endpoint: serializes a fixed pair of articles, honoring the
/// request's fields/include selection.
struct ListArticles {
	serializer: Serializer,
}

#[async_trait]
impl Handler for ListArticles {
	async fn handle(&self, request: Request) -> ApiResult<Response> {
		let records = vec![
			json!({"id": 1, "title": "First", "summary": "s1", "body": "b1"}),
			json!({"id": 2, "title": "Second", "summary": "s2", "body": "b2"}),
		];
		let mut ctx = SerializeContext {
			total: Some(records.len() as u64),
			selection: QuerySelection::parse(request.query()),
			..Default::default()
		};
		// The shared author both articles point at
		ctx.included
			.insert("person".to_string(), vec![json!({"id": 7, "name": "Ada"})]);
		let document = self
			.serializer
			.serialize("article", Data::Collection(records), &ctx)?;
		Ok(JsonApiResponder.ok(&document))
	}
}

fn chain(registry: Arc<SchemaRegistry>) -> MiddlewareChain {
	let handler = Arc::new(ListArticles {
		serializer: serializer(registry.clone()),
	});
	MiddlewareChain::new(handler)
		.with_middleware(Arc::new(ValidateHeaders))
		.with_middleware(Arc::new(UnknownAssociationGuard::new(registry)))
}

fn get(uri: &str) -> Request {
	Request::builder().uri(uri).build().unwrap()
}

#[tokio::test]
async fn single_article_reports_relationship_count() {
	// One relationship alias "author" targeting "person", count 3
	let mut ctx = SerializeContext::default();
	ctx.counts
		.entry("author".to_string())
		.or_default()
		.insert("42".to_string(), 3);

	let document = serializer(registry())
		.serialize(
			"article",
			Data::Single(json!({"id": 42, "title": "Hello"})),
			&ctx,
		)
		.unwrap();
	let body = serde_json::to_value(&document).unwrap();

	assert_eq!(
		body["data"]["relationships"]["author"]["links"]["related"]["meta"]["count"],
		3
	);
	assert_eq!(
		body["data"]["relationships"]["author"]["links"]["related"]["href"],
		format!("{BASE_URL}/articles/42/author")
	);
}

#[tokio::test]
async fn ghost_relation_path_is_rejected_before_the_handler() {
	let response = chain(registry())
		.handle(get("/articles/42/ghost-relation"))
		.await
		.unwrap();

	assert_eq!(response.status, StatusCode::BAD_REQUEST);
	let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
	assert_eq!(
		body,
		json!({
			"errors": [{"title": "Bad Request", "detail": "Unable to identify relationship"}]
		})
	);
}

#[tokio::test]
async fn known_relation_path_reaches_the_handler() {
	let response = chain(registry())
		.handle(get("/articles/1/author"))
		.await
		.unwrap();
	assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn sparse_fieldsets_restrict_serialized_attributes() {
	let response = chain(registry())
		.handle(get("/articles?fields[article]=title,summary"))
		.await
		.unwrap();

	let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
	for resource in body["data"].as_array().unwrap() {
		let attributes = resource["attributes"].as_object().unwrap();
		assert!(attributes.contains_key("title"));
		assert!(attributes.contains_key("summary"));
		assert!(!attributes.contains_key("body"));
	}
}

#[tokio::test]
async fn negotiation_routes_not_found_by_content_type() {
	let responder = NegotiatingResponder::with_defaults();
	let error = ApiError::NotFound("no such article".to_string());

	let hypermedia = responder.respond(Some(JSON_API_MEDIA_TYPE), &error);
	assert_eq!(hypermedia.status, StatusCode::NOT_FOUND);
	let body: serde_json::Value = serde_json::from_slice(&hypermedia.body).unwrap();
	let errors = body["errors"].as_array().unwrap();
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0]["title"], "Not Found");

	let plain = responder.respond(Some("application/json"), &error);
	assert_eq!(plain.status, StatusCode::NOT_FOUND);
	assert_eq!(
		String::from_utf8_lossy(&plain.body),
		"not found: no such article"
	);
}

#[tokio::test]
async fn empty_collection_keeps_total_and_collection_link() {
	let ctx = SerializeContext {
		total: Some(0),
		..Default::default()
	};
	let document = serializer(registry())
		.serialize("article", Data::Collection(vec![]), &ctx)
		.unwrap();
	let body = serde_json::to_value(&document).unwrap();

	assert_eq!(body["data"], json!([]));
	assert_eq!(body["meta"]["total"], 0);
	assert_eq!(body["links"]["self"], format!("{BASE_URL}/articles"));
}

#[tokio::test]
async fn re_registration_yields_identical_output() {
	let registry_once = registry();

	let mut rebuilt = SchemaRegistry::build(&models()).unwrap();
	let schema = rebuilt.lookup("article").unwrap().clone();
	rebuilt.register(schema);
	let registry_twice = Arc::new(rebuilt);

	let record = json!({"id": 5, "title": "Same"});
	let once = serializer(registry_once)
		.serialize("article", Data::Single(record.clone()), &SerializeContext::default())
		.unwrap();
	let twice = serializer(registry_twice)
		.serialize("article", Data::Single(record), &SerializeContext::default())
		.unwrap();

	assert_eq!(
		serde_json::to_value(&once).unwrap(),
		serde_json::to_value(&twice).unwrap()
	);
}

#[tokio::test]
async fn shared_included_resource_appears_once() {
	let response = chain(registry())
		.handle(get("/articles?include=author,comments.author"))
		.await
		.unwrap();

	let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
	let included = body["included"].as_array().unwrap();
	let people: Vec<_> = included
		.iter()
		.filter(|resource| resource["type"] == "person")
		.collect();
	assert_eq!(people.len(), 1);
	assert_eq!(people[0]["id"], "7");
}

#[tokio::test]
async fn parameterized_json_api_content_type_is_rejected() {
	let request = Request::builder()
		.uri("/articles")
		.header(CONTENT_TYPE, "application/vnd.api+json; charset=utf-8")
		.build()
		.unwrap();

	let response = chain(registry()).handle(request).await.unwrap();
	assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
	let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
	assert_eq!(body["errors"][0]["status"], "415");
}

#[tokio::test]
async fn success_response_carries_json_api_content_type() {
	let response = chain(registry()).handle(get("/articles")).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.content_type(), Some(JSON_API_MEDIA_TYPE));

	let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
	assert_eq!(body["data"].as_array().unwrap().len(), 2);
	assert_eq!(body["meta"]["total"], 2);
	// Data documents never carry an errors member
	assert!(body.get("errors").is_none());
}
