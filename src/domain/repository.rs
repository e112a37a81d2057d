use async_trait::async_trait;

use super::error::Result;
use super::item::{ItemId, TodoItem};
use super::list::{ListId, ListView, Membership, ShortId, TodoList};
use super::user::{User, UserId};

#[async_trait]
pub trait ListRepository: Send + Sync + 'static {
    async fn init(&self) -> Result<()>;

    /// Insert-or-update of the identity-provider user row. A blank email
    /// never overwrites a stored one.
    async fn upsert_user(&self, id: &UserId, email: &str) -> Result<User>;

    /// Inserts the list row and the creator's membership row atomically.
    async fn create_list(&self, name: &str, created_by: &UserId) -> Result<TodoList>;

    async fn find_list_by_short_id(&self, short_id: &ShortId) -> Result<Option<TodoList>>;

    async fn add_member(&self, list_id: &ListId, user_id: &UserId) -> Result<Membership>;

    /// Every list the user holds a membership row for, fully populated.
    async fn visible_lists(&self, user_id: &UserId) -> Result<Vec<ListView>>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync + 'static {
    async fn list_exists(&self, list_id: &ListId) -> Result<bool>;

    async fn insert_item(&self, list_id: &ListId, title: &str, created_by: &UserId)
        -> Result<TodoItem>;

    async fn items_for_list(&self, list_id: &ListId) -> Result<Vec<TodoItem>>;

    /// Store-side flip of `completed`, returning the updated row.
    async fn toggle_completed(&self, item_id: &ItemId) -> Result<Option<TodoItem>>;

    async fn set_completed(&self, item_id: &ItemId, completed: bool) -> Result<Option<TodoItem>>;
}
