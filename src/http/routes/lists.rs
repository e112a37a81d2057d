use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::application::{item_service::ItemService, list_service::ListService};
use crate::domain::list::{CreateList, ShortId, TodoList};
use crate::http::auth::Identity;
use crate::http::types::ApiError;

pub fn router<L, I>(state: AppState<L, I>) -> Router
where
    L: ListService + Clone + Send + Sync + 'static,
    I: ItemService + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/lists", post(create_list::<L, I>).get(list_lists::<L, I>))
        .route("/lists/join", post(join_list::<L, I>))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateListBody {
    name: String,
}

#[derive(Deserialize)]
struct JoinBody {
    short_id: String,
}

async fn create_list<L: ListService, I: ItemService>(
    State(state): State<AppState<L, I>>,
    identity: Identity,
    Json(payload): Json<CreateListBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.lists.sync_user(&identity.actor, identity.email.as_deref()).await?;
    let list = state
        .lists
        .create_list(&identity.actor, CreateList { name: payload.name })
        .await?;
    Ok(Json(list_json(&list)))
}

async fn join_list<L: ListService, I: ItemService>(
    State(state): State<AppState<L, I>>,
    identity: Identity,
    Json(payload): Json<JoinBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.lists.sync_user(&identity.actor, identity.email.as_deref()).await?;
    let list = state
        .lists
        .join_list(&identity.actor, &ShortId(payload.short_id))
        .await?;
    Ok(Json(list_json(&list)))
}

async fn list_lists<L: ListService, I: ItemService>(
    State(state): State<AppState<L, I>>,
    identity: Identity,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lists = state.lists.visible_lists(&identity.actor).await?;
    Ok(Json(json!({ "lists": lists.into_iter().map(|l| json!({
        "id": l.id.0,
        "name": l.name,
        "short_id": l.short_id.0,
        "created_by": l.created_by.0,
        "items": l.items.iter().map(|i| json!({
            "id": i.id.0,
            "title": i.title,
            "completed": i.completed,
        })).collect::<Vec<_>>(),
        "members": l.members.iter().map(|m| json!({
            "id": m.id.0,
            "email": m.email,
        })).collect::<Vec<_>>(),
    })).collect::<Vec<_>>() })))
}

fn list_json(list: &TodoList) -> serde_json::Value {
    json!({
        "id": list.id.0,
        "name": list.name,
        "short_id": list.short_id.0,
        "created_by": list.created_by.0,
        "created_at": list.created_at,
    })
}
