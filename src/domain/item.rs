use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::list::ListId;
use super::user::UserId;

pub const MAX_TITLE_LEN: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ItemId(pub Uuid);

impl Default for ItemId {
    fn default() -> Self { Self(Uuid::new_v4()) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    pub id: ItemId,
    pub todo_list_id: ListId,
    pub title: String,
    pub completed: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Item projection as rendered inside a `ListView`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemView {
    pub id: ItemId,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateItem {
    pub title: String,
}
