#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::super::item_service::{ItemService, ItemServiceImpl};
    use super::super::list_service::{ListService, ListServiceImpl};
    use crate::domain::{
        error::{Error, Result},
        item::{CreateItem, ItemId, ItemView, TodoItem},
        list::{CreateList, ListId, ListView, Member, Membership, ShortId, TodoList},
        repository::{ItemRepository, ListRepository},
        user::{Actor, User, UserId},
    };

    #[derive(Default)]
    struct Inner {
        users: HashMap<String, User>,
        lists: Vec<TodoList>,
        members: Vec<Membership>,
        items: Vec<TodoItem>,
    }

    #[derive(Clone, Default)]
    struct InMemoryStore {
        inner: Arc<Mutex<Inner>>,
    }

    #[async_trait]
    impl ListRepository for InMemoryStore {
        async fn init(&self) -> Result<()> { Ok(()) }

        async fn upsert_user(&self, id: &UserId, email: &str) -> Result<User> {
            let mut inner = self.inner.lock().unwrap();
            let user = inner
                .users
                .entry(id.0.clone())
                .or_insert_with(|| User {
                    id: id.clone(),
                    email: String::new(),
                    created_at: Utc::now(),
                });
            if !email.is_empty() {
                user.email = email.to_owned();
            }
            Ok(user.clone())
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
            let mut inner = self.inner.lock().unwrap();
            inner.lists.push(list.clone());
            inner.members.push(Membership {
                id: Uuid::new_v4(),
                todo_list_id: list.id.clone(),
                user_id: created_by.clone(),
                joined_at: now,
            });
            Ok(list)
        }

        async fn find_list_by_short_id(&self, short_id: &ShortId) -> Result<Option<TodoList>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner.lists.iter().find(|l| l.short_id == *short_id).cloned())
        }

        async fn add_member(&self, list_id: &ListId, user_id: &UserId) -> Result<Membership> {
            let membership = Membership {
                id: Uuid::new_v4(),
                todo_list_id: list_id.clone(),
                user_id: user_id.clone(),
                joined_at: Utc::now(),
            };
            self.inner.lock().unwrap().members.push(membership.clone());
            Ok(membership)
        }

        async fn visible_lists(&self, user_id: &UserId) -> Result<Vec<ListView>> {
            let inner = self.inner.lock().unwrap();
            Ok(inner
                .lists
                .iter()
                .filter(|l| {
                    inner
                        .members
                        .iter()
                        .any(|m| m.todo_list_id == l.id && m.user_id == *user_id)
                })
                .map(|l| {
                    let mut items: Vec<&TodoItem> =
                        inner.items.iter().filter(|i| i.todo_list_id == l.id).collect();
                    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                    ListView {
                        id: l.id.clone(),
                        name: l.name.clone(),
                        short_id: l.short_id.clone(),
                        created_by: l.created_by.clone(),
                        items: items
                            .into_iter()
                            .map(|i| ItemView {
                                id: i.id.clone(),
                                title: i.title.clone(),
                                completed: i.completed,
                            })
                            .collect(),
                        members: inner
                            .members
                            .iter()
                            .filter(|m| m.todo_list_id == l.id)
                            .map(|m| Member {
                                id: m.user_id.clone(),
                                email: inner
                                    .users
                                    .get(&m.user_id.0)
                                    .map(|u| u.email.clone())
                                    .unwrap_or_default(),
                            })
                            .collect(),
                    }
                })
                .collect())
        }
    }

    #[async_trait]
    impl ItemRepository for InMemoryStore {
        async fn list_exists(&self, list_id: &ListId) -> Result<bool> {
            Ok(self.inner.lock().unwrap().lists.iter().any(|l| l.id == *list_id))
        }

        async fn insert_item(
            &self,
            list_id: &ListId,
            title: &str,
            created_by: &UserId,
        ) -> Result<TodoItem> {
            let item = TodoItem {
                id: ItemId::default(),
                todo_list_id: list_id.clone(),
                title: title.to_owned(),
                completed: false,
                created_by: created_by.clone(),
                created_at: Utc::now(),
            };
            self.inner.lock().unwrap().items.push(item.clone());
            Ok(item)
        }

        async fn items_for_list(&self, list_id: &ListId) -> Result<Vec<TodoItem>> {
            let inner = self.inner.lock().unwrap();
            let mut items: Vec<TodoItem> = inner
                .items
                .iter()
                .filter(|i| i.todo_list_id == *list_id)
                .cloned()
                .collect();
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(items)
        }

        async fn toggle_completed(&self, item_id: &ItemId) -> Result<Option<TodoItem>> {
            let mut inner = self.inner.lock().unwrap();
            let Some(item) = inner.items.iter_mut().find(|i| i.id == *item_id) else {
                return Ok(None);
            };
            item.completed = !item.completed;
            Ok(Some(item.clone()))
        }

        async fn set_completed(
            &self,
            item_id: &ItemId,
            completed: bool,
        ) -> Result<Option<TodoItem>> {
            let mut inner = self.inner.lock().unwrap();
            let Some(item) = inner.items.iter_mut().find(|i| i.id == *item_id) else {
                return Ok(None);
            };
            item.completed = completed;
            Ok(Some(item.clone()))
        }
    }

    fn services() -> (ListServiceImpl<InMemoryStore>, ItemServiceImpl<InMemoryStore>) {
        let store = InMemoryStore::default();
        (ListServiceImpl::new(store.clone()), ItemServiceImpl::new(store))
    }

    #[tokio::test]
    async fn create_list_requires_authentication() {
        let (lists, _) = services();
        let err = lists
            .create_list(&Actor::anonymous(), CreateList { name: "Groceries".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthenticated));
    }

    #[tokio::test]
    async fn create_list_rejects_blank_name() {
        let (lists, _) = services();
        let err = lists
            .create_list(&Actor::authenticated("alice"), CreateList { name: "   ".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn create_list_generates_join_token_and_creator_membership() {
        let (lists, _) = services();
        let alice = Actor::authenticated("alice");
        let list = lists
            .create_list(&alice, CreateList { name: "Groceries".into() })
            .await
            .unwrap();
        assert_eq!(list.short_id.0.len(), ShortId::LEN);

        let visible = lists.visible_lists(&alice).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, list.id);
        assert_eq!(visible[0].members.len(), 1);
        assert_eq!(visible[0].members[0].id, UserId::new("alice"));
    }

    #[tokio::test]
    async fn join_with_unknown_code_is_not_found() {
        let (lists, _) = services();
        let bob = Actor::authenticated("bob");
        let err = lists
            .join_list(&bob, &ShortId("nosuchcode".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(lists.visible_lists(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn join_makes_list_visible_to_joiner() {
        let (lists, _) = services();
        let alice = Actor::authenticated("alice");
        let bob = Actor::authenticated("bob");
        let list = lists
            .create_list(&alice, CreateList { name: "Groceries".into() })
            .await
            .unwrap();

        let joined = lists.join_list(&bob, &list.short_id).await.unwrap();
        assert_eq!(joined.id, list.id);

        let visible = lists.visible_lists(&bob).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Groceries");
        assert_eq!(visible[0].members.len(), 2);
    }

    #[tokio::test]
    async fn repeated_join_adds_a_second_member_entry() {
        let (lists, _) = services();
        let alice = Actor::authenticated("alice");
        let bob = Actor::authenticated("bob");
        let list = lists
            .create_list(&alice, CreateList { name: "Groceries".into() })
            .await
            .unwrap();

        lists.join_list(&bob, &list.short_id).await.unwrap();
        lists.join_list(&bob, &list.short_id).await.unwrap();

        let visible = lists.visible_lists(&alice).await.unwrap();
        assert_eq!(visible[0].members.len(), 3);
    }

    #[tokio::test]
    async fn add_item_starts_incomplete_and_orders_newest_first() {
        let (lists, items) = services();
        let alice = Actor::authenticated("alice");
        let list = lists
            .create_list(&alice, CreateList { name: "Groceries".into() })
            .await
            .unwrap();

        let milk = items
            .add_item(&alice, &list.id, CreateItem { title: "Milk".into() })
            .await
            .unwrap();
        assert!(!milk.completed);
        let eggs = items
            .add_item(&alice, &list.id, CreateItem { title: "Eggs".into() })
            .await
            .unwrap();

        let visible = lists.visible_lists(&alice).await.unwrap();
        let view = &visible[0];
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].id, eggs.id);
        assert_eq!(view.items[1].id, milk.id);
    }

    #[tokio::test]
    async fn add_item_to_unknown_list_is_not_found() {
        let (_, items) = services();
        let err = items
            .add_item(
                &Actor::authenticated("alice"),
                &ListId::default(),
                CreateItem { title: "Milk".into() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn add_item_rejects_blank_title() {
        let (lists, items) = services();
        let alice = Actor::authenticated("alice");
        let list = lists
            .create_list(&alice, CreateList { name: "Groceries".into() })
            .await
            .unwrap();
        let err = items
            .add_item(&alice, &list.id, CreateItem { title: "".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_original_state() {
        let (lists, items) = services();
        let alice = Actor::authenticated("alice");
        let list = lists
            .create_list(&alice, CreateList { name: "Groceries".into() })
            .await
            .unwrap();
        let milk = items
            .add_item(&alice, &list.id, CreateItem { title: "Milk".into() })
            .await
            .unwrap();

        let flipped = items.toggle_completion(&alice, &milk.id).await.unwrap();
        assert!(flipped.completed);
        let restored = items.toggle_completion(&alice, &milk.id).await.unwrap();
        assert!(!restored.completed);
    }

    #[tokio::test]
    async fn toggle_on_unknown_item_is_not_found() {
        let (_, items) = services();
        let err = items
            .toggle_completion(&Actor::authenticated("alice"), &ItemId::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn complete_item_is_idempotent() {
        let (lists, items) = services();
        let alice = Actor::authenticated("alice");
        let list = lists
            .create_list(&alice, CreateList { name: "Groceries".into() })
            .await
            .unwrap();
        let milk = items
            .add_item(&alice, &list.id, CreateItem { title: "Milk".into() })
            .await
            .unwrap();

        let first = items.complete_item(&alice, &milk.id).await.unwrap();
        assert!(first.completed);
        let second = items.complete_item(&alice, &milk.id).await.unwrap();
        assert!(second.completed);
    }

    #[tokio::test]
    async fn sync_user_is_a_no_op_for_anonymous_actors() {
        let (lists, _) = services();
        lists.sync_user(&Actor::anonymous(), None).await.unwrap();
        lists
            .sync_user(&Actor::authenticated("alice"), Some("alice@example.com"))
            .await
            .unwrap();
    }
}
