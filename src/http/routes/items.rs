use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::application::{item_service::ItemService, list_service::ListService};
use crate::domain::item::{CreateItem, ItemId, TodoItem};
use crate::domain::list::ListId;
use crate::http::auth::Identity;
use crate::http::types::ApiError;

pub fn router<L, I>(state: AppState<L, I>) -> Router
where
    L: ListService + Clone + Send + Sync + 'static,
    I: ItemService + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/lists/:id/items", post(add_item::<L, I>).get(list_items::<L, I>))
        .route("/items/:id/toggle", post(toggle_item::<L, I>))
        .route("/items/:id/complete", post(complete_item::<L, I>))
        .with_state(state)
}

#[derive(Deserialize)]
struct AddItemBody {
    title: String,
}

async fn add_item<L: ListService, I: ItemService>(
    State(state): State<AppState<L, I>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<AddItemBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let list_id = parse_list_id(&id)?;
    state.lists.sync_user(&identity.actor, identity.email.as_deref()).await?;
    let item = state
        .items
        .add_item(&identity.actor, &list_id, CreateItem { title: payload.title })
        .await?;
    Ok(Json(item_json(&item)))
}

async fn list_items<L: ListService, I: ItemService>(
    State(state): State<AppState<L, I>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let items = state.items.list_items(&identity.actor, &list_id).await?;
    Ok(Json(json!({
        "items": items.iter().map(item_json).collect::<Vec<_>>(),
    })))
}

async fn toggle_item<L: ListService, I: ItemService>(
    State(state): State<AppState<L, I>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let item_id = parse_item_id(&id)?;
    let item = state.items.toggle_completion(&identity.actor, &item_id).await?;
    Ok(Json(item_json(&item)))
}

async fn complete_item<L: ListService, I: ItemService>(
    State(state): State<AppState<L, I>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let item_id = parse_item_id(&id)?;
    let item = state.items.complete_item(&identity.actor, &item_id).await?;
    Ok(Json(item_json(&item)))
}

fn parse_list_id(s: &str) -> Result<ListId, ApiError> {
    uuid::Uuid::parse_str(s)
        .map(ListId)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "invalid list id"))
}

fn parse_item_id(s: &str) -> Result<ItemId, ApiError> {
    uuid::Uuid::parse_str(s)
        .map(ItemId)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "invalid item id"))
}

fn item_json(item: &TodoItem) -> serde_json::Value {
    json!({
        "id": item.id.0,
        "todo_list_id": item.todo_list_id.0,
        "title": item.title,
        "completed": item.completed,
        "created_by": item.created_by.0,
        "created_at": item.created_at,
    })
}
