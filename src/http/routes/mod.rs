pub mod items;
pub mod lists;

use axum::Router;

use crate::application::{item_service::ItemService, list_service::ListService};

#[derive(Clone)]
pub struct AppState<L, I> {
    pub lists: L,
    pub items: I,
}

pub fn router<L, I>(state: AppState<L, I>) -> Router
where
    L: ListService + Clone + Send + Sync + 'static,
    I: ItemService + Clone + Send + Sync + 'static,
{
    lists::router(state.clone()).merge(items::router(state))
}
