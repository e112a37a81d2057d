use async_trait::async_trait;

use crate::domain::error::{Error, Result};
use crate::domain::item::{CreateItem, ItemId, TodoItem, MAX_TITLE_LEN};
use crate::domain::list::ListId;
use crate::domain::repository::ItemRepository;
use crate::domain::user::Actor;

#[async_trait]
pub trait ItemService: Send + Sync + 'static {
    async fn add_item(&self, actor: &Actor, list_id: &ListId, input: CreateItem)
        -> Result<TodoItem>;
    async fn list_items(&self, actor: &Actor, list_id: &ListId) -> Result<Vec<TodoItem>>;
    async fn toggle_completion(&self, actor: &Actor, item_id: &ItemId) -> Result<TodoItem>;
    async fn complete_item(&self, actor: &Actor, item_id: &ItemId) -> Result<TodoItem>;
}

#[derive(Clone)]
pub struct ItemServiceImpl<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: ItemRepository> ItemService for ItemServiceImpl<R> {
    async fn add_item(
        &self,
        actor: &Actor,
        list_id: &ListId,
        input: CreateItem,
    ) -> Result<TodoItem> {
        let user = actor.require()?;
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("item title is required"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(Error::InvalidInput("item title is too long"));
        }
        // Any authenticated user who knows the list id may add items;
        // membership is not checked.
        if !self.repo.list_exists(list_id).await? {
            return Err(Error::NotFound("list"));
        }
        self.repo.insert_item(list_id, title, user).await
    }

    async fn list_items(&self, actor: &Actor, list_id: &ListId) -> Result<Vec<TodoItem>> {
        actor.require()?;
        self.repo.items_for_list(list_id).await
    }

    async fn toggle_completion(&self, actor: &Actor, item_id: &ItemId) -> Result<TodoItem> {
        actor.require()?;
        self.repo
            .toggle_completed(item_id)
            .await?
            .ok_or(Error::NotFound("item"))
    }

    async fn complete_item(&self, actor: &Actor, item_id: &ItemId) -> Result<TodoItem> {
        actor.require()?;
        self.repo
            .set_completed(item_id, true)
            .await?
            .ok_or(Error::NotFound("item"))
    }
}
