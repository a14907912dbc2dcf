//! Fixture HTTP server for exercising rfetch end-to-end.
//!
//! - `/echo` reflects the request back as JSON for every supported method.
//! - `/status/{code}`, `/text` and `/empty` produce specific response shapes.
//! - `/items` is a small in-memory collection keyed by UUID.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct PatchItem {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// What `/echo` saw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

type NotFound = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route(
            "/echo",
            get(echo).put(echo).post(echo).patch(echo).delete(echo),
        )
        .route("/status/{code}", get(status))
        .route("/text", get(text))
        .route("/empty", get(empty))
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(replace_item).patch(patch_item).delete(delete_item),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let body = json!({
        "status": code,
        "reason": status.canonical_reason().unwrap_or("unknown"),
    });
    Ok((status, Json(body)))
}

async fn text() -> &'static str {
    "hello from the mock server"
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Every `tag` must match. Tags may repeat (`?tag=a&tag=b`) or be
/// comma-joined (`?tag=a,b`).
async fn list_items(
    State(db): State<Db>,
    Query(query): Query<Vec<(String, String)>>,
) -> Json<Vec<Item>> {
    let wanted: Vec<&str> = query
        .iter()
        .filter(|(key, _)| key == "tag")
        .flat_map(|(_, value)| value.split(','))
        .filter(|tag| !tag.is_empty())
        .collect();

    let items = db.read().await;
    let mut matching: Vec<Item> = items
        .values()
        .filter(|item| wanted.iter().all(|tag| item.tags.iter().any(|t| t == tag)))
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.name.cmp(&b.name));
    Json(matching)
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        tags: input.tags,
    };
    db.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Item>, NotFound> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or_else(|| not_found(id))
}

async fn replace_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateItem>,
) -> Result<Json<Item>, NotFound> {
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or_else(|| not_found(id))?;
    item.name = input.name;
    item.tags = input.tags;
    Ok(Json(item.clone()))
}

async fn patch_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<PatchItem>,
) -> Result<Json<Item>, NotFound> {
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or_else(|| not_found(id))?;
    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(tags) = input.tags {
        item.tags = tags;
    }
    Ok(Json(item.clone()))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, NotFound> {
    let mut items = db.write().await;
    items.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or_else(|| not_found(id))
}

fn not_found(id: Uuid) -> NotFound {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found", "id": id })))
}
