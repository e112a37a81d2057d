use async_trait::async_trait;

use crate::domain::error::{Error, Result};
use crate::domain::list::{CreateList, ListView, ShortId, TodoList, MAX_NAME_LEN};
use crate::domain::repository::ListRepository;
use crate::domain::user::Actor;

#[async_trait]
pub trait ListService: Send + Sync + 'static {
    async fn sync_user(&self, actor: &Actor, email: Option<&str>) -> Result<()>;
    async fn create_list(&self, actor: &Actor, input: CreateList) -> Result<TodoList>;
    async fn join_list(&self, actor: &Actor, short_id: &ShortId) -> Result<TodoList>;
    async fn visible_lists(&self, actor: &Actor) -> Result<Vec<ListView>>;
}

#[derive(Clone)]
pub struct ListServiceImpl<R: ListRepository> {
    repo: R,
}

impl<R: ListRepository> ListServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: ListRepository> ListService for ListServiceImpl<R> {
    async fn sync_user(&self, actor: &Actor, email: Option<&str>) -> Result<()> {
        // Anonymous requests have nothing to sync.
        let Some(user_id) = actor.0.as_ref() else { return Ok(()) };
        self.repo.upsert_user(user_id, email.unwrap_or_default()).await?;
        Ok(())
    }

    async fn create_list(&self, actor: &Actor, input: CreateList) -> Result<TodoList> {
        let user = actor.require()?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("list name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(Error::InvalidInput("list name is too long"));
        }
        self.repo.create_list(name, user).await
    }

    async fn join_list(&self, actor: &Actor, short_id: &ShortId) -> Result<TodoList> {
        let user = actor.require()?;
        let list = self
            .repo
            .find_list_by_short_id(short_id)
            .await?
            .ok_or(Error::NotFound("list"))?;
        // No existing-membership check: a repeated join adds a second row.
        self.repo.add_member(&list.id, user).await?;
        Ok(list)
    }

    async fn visible_lists(&self, actor: &Actor) -> Result<Vec<ListView>> {
        let user = actor.require()?;
        self.repo.visible_lists(user).await
    }
}
