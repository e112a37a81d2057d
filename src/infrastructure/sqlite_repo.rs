use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::domain::{
    error::Result,
    item::{ItemId, ItemView, TodoItem},
    list::{ListId, ListView, Member, Membership, ShortId, TodoList},
    repository::{ItemRepository, ListRepository},
    user::{User, UserId},
};

#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);
        // An in-memory database exists per connection, so the pool must
        // stay at a single connection to see one coherent store.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    async fn fetch_item(&self, id: &ItemId) -> Result<Option<TodoItem>> {
        let row = sqlx::query(
            "SELECT id, todo_list_id, title, completed, created_at, created_by
             FROM todo WHERE id = ?1",
        )
        .bind(id.0.to_string())
        .fetch_optional(&*self.pool)
        .await?;
        Ok(row.map(row_to_item))
    }
}

#[async_trait]
impl ListRepository for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo_list (
                id TEXT PRIMARY KEY,
                name VARCHAR(256) NOT NULL,
                short_id VARCHAR(10) NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                created_by TEXT NOT NULL REFERENCES user(id)
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo_list_member (
                id TEXT PRIMARY KEY,
                todo_list_id TEXT NOT NULL REFERENCES todo_list(id),
                user_id TEXT NOT NULL REFERENCES user(id),
                joined_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo (
                id TEXT PRIMARY KEY,
                todo_list_id TEXT NOT NULL REFERENCES todo_list(id),
                title VARCHAR(256) NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL,
                created_by TEXT NOT NULL REFERENCES user(id)
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_user(&self, id: &UserId, email: &str) -> Result<User> {
        sqlx::query(
            "INSERT INTO user (id, email, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET email = excluded.email
             WHERE excluded.email <> ''",
        )
        .bind(&id.0)
        .bind(email)
        .bind(Utc::now().to_rfc3339())
        .execute(&*self.pool)
        .await?;
        let row = sqlx::query("SELECT id, email, created_at FROM user WHERE id = ?1")
            .bind(&id.0)
            .fetch_one(&*self.pool)
            .await?;
        Ok(row_to_user(row))
    }

    async fn create_list(&self, name: &str, created_by: &UserId) -> Result<TodoList> {
        let now = Utc::now();
        let list = TodoList {
            id: ListId::default(),
            name: name.to_owned(),
            short_id: ShortId::generate(),
            created_by: created_by.clone(),
            created_at: now,
        };

        // The list row and the creator's membership row must land together.
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO todo_list (id, name, short_id, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(list.id.0.to_string())
        .bind(&list.name)
        .bind(&list.short_id.0)
        .bind(now.to_rfc3339())
        .bind(&list.created_by.0)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "INSERT INTO todo_list_member (id, todo_list_id, user_id, joined_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(list.id.0.to_string())
        .bind(&list.created_by.0)
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(list)
    }

    async fn find_list_by_short_id(&self, short_id: &ShortId) -> Result<Option<TodoList>> {
        let row = sqlx::query(
            "SELECT id, name, short_id, created_at, created_by
             FROM todo_list WHERE short_id = ?1",
        )
        .bind(&short_id.0)
        .fetch_optional(&*self.pool)
        .await?;
        Ok(row.map(row_to_list))
    }

    async fn add_member(&self, list_id: &ListId, user_id: &UserId) -> Result<Membership> {
        let membership = Membership {
            id: Uuid::new_v4(),
            todo_list_id: list_id.clone(),
            user_id: user_id.clone(),
            joined_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO todo_list_member (id, todo_list_id, user_id, joined_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(membership.id.to_string())
        .bind(membership.todo_list_id.0.to_string())
        .bind(&membership.user_id.0)
        .bind(membership.joined_at.to_rfc3339())
        .execute(&*self.pool)
        .await?;
        Ok(membership)
    }

    async fn visible_lists(&self, user_id: &UserId) -> Result<Vec<ListView>> {
        let list_rows = sqlx::query(
            "SELECT DISTINCT l.id, l.name, l.short_id, l.created_at, l.created_by
             FROM todo_list_member m
             JOIN todo_list l ON l.id = m.todo_list_id
             WHERE m.user_id = ?1
             ORDER BY l.created_at, l.id",
        )
        .bind(&user_id.0)
        .fetch_all(&*self.pool)
        .await?;

        let item_rows = sqlx::query(
            "SELECT DISTINCT t.id, t.todo_list_id, t.title, t.completed, t.created_at
             FROM todo t
             WHERE t.todo_list_id IN
                 (SELECT todo_list_id FROM todo_list_member WHERE user_id = ?1)
             ORDER BY t.created_at DESC",
        )
        .bind(&user_id.0)
        .fetch_all(&*self.pool)
        .await?;

        // One row per membership row, so duplicate joins stay visible.
        let member_rows = sqlx::query(
            "SELECT m.todo_list_id, u.id, u.email
             FROM todo_list_member m
             JOIN user u ON u.id = m.user_id
             WHERE m.todo_list_id IN
                 (SELECT todo_list_id FROM todo_list_member WHERE user_id = ?1)
             ORDER BY m.joined_at, m.id",
        )
        .bind(&user_id.0)
        .fetch_all(&*self.pool)
        .await?;

        let mut items: HashMap<String, Vec<ItemView>> = HashMap::new();
        for row in item_rows {
            let list_id: String = row.get("todo_list_id");
            items.entry(list_id).or_default().push(ItemView {
                id: ItemId(Uuid::parse_str(row.get::<String, _>("id").as_str()).unwrap()),
                title: row.get("title"),
                completed: row.get("completed"),
            });
        }

        let mut members: HashMap<String, Vec<Member>> = HashMap::new();
        for row in member_rows {
            let list_id: String = row.get("todo_list_id");
            members.entry(list_id).or_default().push(Member {
                id: UserId(row.get("id")),
                email: row.get("email"),
            });
        }

        Ok(list_rows
            .into_iter()
            .map(|row| {
                let id: String = row.get("id");
                ListView {
                    id: ListId(Uuid::parse_str(&id).unwrap()),
                    name: row.get("name"),
                    short_id: ShortId(row.get("short_id")),
                    created_by: UserId(row.get("created_by")),
                    items: items.remove(&id).unwrap_or_default(),
                    members: members.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl ItemRepository for SqliteStore {
    async fn list_exists(&self, list_id: &ListId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM todo_list WHERE id = ?1")
            .bind(list_id.0.to_string())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_item(
        &self,
        list_id: &ListId,
        title: &str,
        created_by: &UserId,
    ) -> Result<TodoItem> {
        let now = Utc::now();
        let item = TodoItem {
            id: ItemId::default(),
            todo_list_id: list_id.clone(),
            title: title.to_owned(),
            completed: false,
            created_by: created_by.clone(),
            created_at: now,
        };
        sqlx::query(
            "INSERT INTO todo (id, todo_list_id, title, completed, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(item.id.0.to_string())
        .bind(item.todo_list_id.0.to_string())
        .bind(&item.title)
        .bind(item.completed)
        .bind(now.to_rfc3339())
        .bind(&item.created_by.0)
        .execute(&*self.pool)
        .await?;
        Ok(item)
    }

    async fn items_for_list(&self, list_id: &ListId) -> Result<Vec<TodoItem>> {
        let rows = sqlx::query(
            "SELECT id, todo_list_id, title, completed, created_at, created_by
             FROM todo WHERE todo_list_id = ?1
             ORDER BY created_at DESC",
        )
        .bind(list_id.0.to_string())
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_item).collect())
    }

    async fn toggle_completed(&self, item_id: &ItemId) -> Result<Option<TodoItem>> {
        // Single-statement flip; concurrent togglers cannot interleave a
        // read between the load and the store.
        let result = sqlx::query("UPDATE todo SET completed = NOT completed WHERE id = ?1")
            .bind(item_id.0.to_string())
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_item(item_id).await
    }

    async fn set_completed(&self, item_id: &ItemId, completed: bool) -> Result<Option<TodoItem>> {
        let result = sqlx::query("UPDATE todo SET completed = ?2 WHERE id = ?1")
            .bind(item_id.0.to_string())
            .bind(completed)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_item(item_id).await
    }
}

fn row_to_user(row: SqliteRow) -> User {
    let created_at_str: String = row.get("created_at");
    User {
        id: UserId(row.get("id")),
        email: row.get("email"),
        created_at: parse_timestamp(&created_at_str),
    }
}

fn row_to_list(row: SqliteRow) -> TodoList {
    let id_str: String = row.get("id");
    let created_at_str: String = row.get("created_at");
    TodoList {
        id: ListId(Uuid::parse_str(&id_str).unwrap()),
        name: row.get("name"),
        short_id: ShortId(row.get("short_id")),
        created_by: UserId(row.get("created_by")),
        created_at: parse_timestamp(&created_at_str),
    }
}

fn row_to_item(row: SqliteRow) -> TodoItem {
    let id_str: String = row.get("id");
    let list_id_str: String = row.get("todo_list_id");
    let created_at_str: String = row.get("created_at");
    TodoItem {
        id: ItemId(Uuid::parse_str(&id_str).unwrap()),
        todo_list_id: ListId(Uuid::parse_str(&list_id_str).unwrap()),
        title: row.get("title"),
        completed: row.get("completed"),
        created_by: UserId(row.get("created_by")),
        created_at: parse_timestamp(&created_at_str),
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}
