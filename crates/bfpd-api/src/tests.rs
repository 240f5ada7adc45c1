use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use bfpd_core::{
  DocType,
  food::{Food, FoodGroup, NutrientData, Serving},
  store::{DictionaryEntry, DocumentStore},
};
use bfpd_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn food(id: &str, description: &str, company: &str, source: &str) -> Food {
  let mut f = Food::new(id);
  f.description = description.into();
  f.manufacturer = company.into();
  f.upc = format!("0000{id}");
  f.ingredients = "water, sugar".into();
  f.source = source.into();
  f.group = Some(FoodGroup::new(1, "Snacks"));
  f.servings.push(Serving {
    nutrient_basis: "g".into(),
    description:    "1 bar".into(),
    amount:         40.0,
  });
  f.nutrients.push(NutrientData {
    nutrient_no: 203,
    value:       12.5,
    nutrient:    "Protein".into(),
    unit:        "G".into(),
    derivation:  None,
  });
  f
}

async fn seeded() -> Arc<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  for f in [
    food("100", "PEANUT BAR", "Zeta Foods", "LI"),
    food("200", "ALMOND MILK", "Acme Foods", "GTSN"),
    food("300", "CHEDDAR CHEESE", "Midway Dairy", "SR"),
  ] {
    store.update(&f.fdc_id.clone(), &f).await.unwrap();
  }
  store
    .put_dictionary("gnutdata", DocType::Nutrient, vec![DictionaryEntry {
      code: 1003,
      body: json!({ "id": 1003, "nutrientno": 203, "name": "Protein", "unit": "G" }),
    }])
    .await
    .unwrap();
  Arc::new(store)
}

async fn call(store: Arc<SqliteStore>, req: Request<Body>) -> (StatusCode, Value) {
  let resp = api_router(store).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(store: Arc<SqliteStore>, uri: &str) -> (StatusCode, Value) {
  call(store, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(store: Arc<SqliteStore>, uri: &str, body: &str) -> (StatusCode, Value) {
  let req = Request::post(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_owned()))
    .unwrap();
  call(store, req).await
}

fn ids(body: &Value) -> Vec<&str> {
  body["items"]
    .as_array()
    .unwrap()
    .iter()
    .map(|i| i["fdcId"].as_str().unwrap())
    .collect()
}

// ─── Food ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn food_defaults_to_full_document() {
  let (status, body) = get(seeded().await, "/food/100").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["fdcId"], "100");
  assert_eq!(body["foodDescription"], "PEANUT BAR");
  assert_eq!(body["company"], "Zeta Foods");
  assert_eq!(body["type"], "FOOD");
  assert_eq!(body["servingSizes"][0]["servingAmount"], 40.0);
  assert_eq!(body["nutrients"][0]["nutrientNumber"], 203);
}

#[tokio::test]
async fn food_formats_by_query_and_path() {
  let store = seeded().await;

  let (_, meta) = get(store.clone(), "/food/100?format=meta").await;
  assert_eq!(meta["foodDescription"], "PEANUT BAR");
  assert!(meta.get("servingSizes").is_none());
  assert!(meta.get("nutrients").is_none());

  let (_, servings) = get(store.clone(), "/food/100/servings").await;
  assert_eq!(servings, json!([{
    "nutrientBasis": "g",
    "description": "1 bar",
    "servingAmount": 40.0
  }]));

  let (status, nutrients) = get(store, "/food/100/nutrients").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(nutrients[0]["value"], 12.5);
  assert_eq!(nutrients.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_food_is_404_json() {
  let (status, body) = get(seeded().await, "/food/999").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn unknown_food_format_is_400() {
  let (status, body) = get(seeded().await, "/food/100/xml").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

// ─── Browse ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn browse_defaults_to_meta_sorted_by_id() {
  let (status, body) = get(seeded().await, "/browse").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], 3);
  assert_eq!(body["start"], 0);
  assert_eq!(body["max"], 50);
  assert_eq!(ids(&body), ["100", "200", "300"]);
  assert!(body["items"][0].get("servingSizes").is_none());
}

#[tokio::test]
async fn browse_sorts_and_pages() {
  let store = seeded().await;

  let (_, body) = get(store.clone(), "/browse?sort=company").await;
  assert_eq!(ids(&body), ["200", "300", "100"]);

  let (_, body) = get(store.clone(), "/browse?sort=foodDescription&max=2&page=1").await;
  assert_eq!(ids(&body), ["100"]);
  assert_eq!(body["start"], 1);
  assert_eq!(body["max"], 2);

  let (_, body) = get(store, "/browse?max=1&page=-4").await;
  assert_eq!(body["start"], 0);
  assert_eq!(ids(&body), ["100"]);
}

#[tokio::test]
async fn browse_bfpd_source_covers_both_feeds() {
  let store = seeded().await;

  let (_, body) = get(store.clone(), "/browse?source=BFPD").await;
  assert_eq!(ids(&body), ["100", "200"]);

  let (_, body) = get(store.clone(), "/browse?source=SR&format=full").await;
  assert_eq!(ids(&body), ["300"]);
  assert!(body["items"][0]["servingSizes"].is_array());

  let (status, _) = get(store, "/browse?source=USDA").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn browse_rejects_oversized_pages_and_bad_sorts() {
  let store = seeded().await;
  let (status, body) = get(store.clone(), "/browse?max=151").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("150"));

  let (status, _) = get(store, "/browse?sort=name").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_requires_q() {
  let (status, body) = get(seeded().await, "/search?f=upc").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("q parameter"));
}

#[tokio::test]
async fn search_all_fields_case_insensitive() {
  let (status, body) = get(seeded().await, "/search?q=foods").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], 2);
  assert_eq!(ids(&body), ["100", "200"]);
}

#[tokio::test]
async fn search_single_field_counts_total_hits() {
  let store = seeded().await;

  let (_, body) = get(store.clone(), "/search?q=00002&f=upc").await;
  assert_eq!(ids(&body), ["200"]);

  let (_, body) = get(store.clone(), "/search?q=water&f=ingredients&max=1").await;
  assert_eq!(body["count"], 3, "count is the total, not the page size");
  assert_eq!(body["items"].as_array().unwrap().len(), 1);

  let (status, _) = get(store, "/search?q=bar&f=brand").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_post_accepts_json_body() {
  let store = seeded().await;

  let (status, body) = post(
    store.clone(),
    "/search",
    r#"{"q":"cheddar","f":"foodDescription","format":"servings","max":5}"#,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], 1);
  assert_eq!(body["max"], 5);
  assert_eq!(body["items"][0][0]["description"], "1 bar");

  let (status, _) = post(store.clone(), "/search", r#"{"f":"upc"}"#).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = post(store, "/search", "{not json").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

// ─── Counts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn counts_by_doctype() {
  let store = seeded().await;

  let (status, body) = get(store.clone(), "/count/FOOD").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "type": "FOOD", "count": 3 }));

  let (_, body) = get(store.clone(), "/count/NUT").await;
  assert_eq!(body["count"], 1);

  let (status, body) = get(store, "/count/RECIPE").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}
