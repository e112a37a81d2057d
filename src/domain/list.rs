use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::ItemView;
use super::user::UserId;

pub const MAX_NAME_LEN: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ListId(pub Uuid);

impl Default for ListId {
    fn default() -> Self { Self(Uuid::new_v4()) }
}

/// Public join token for a list, always 10 characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortId(pub String);

impl ShortId {
    pub const LEN: usize = 10;

    /// Random alphanumeric token. Collisions are not retried; the unique
    /// constraint on the store surfaces them to the caller.
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(Alphanumeric)
            .take(Self::LEN)
            .map(char::from)
            .collect();
        Self(token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoList {
    pub id: ListId,
    pub name: String,
    pub short_id: ShortId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// One (list, user) membership row. A user may hold more than one row for
/// the same list; see `ListView::members`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Membership {
    pub id: Uuid,
    pub todo_list_id: ListId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
}

/// Member projection as rendered on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub id: UserId,
    pub email: String,
}

/// A fully populated list as returned by `visible_lists`: every item and
/// one member entry per membership row, duplicates included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListView {
    pub id: ListId,
    pub name: String,
    pub short_id: ShortId,
    pub created_by: UserId,
    pub items: Vec<ItemView>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateList {
    pub name: String,
}
