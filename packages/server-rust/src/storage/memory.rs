//! In-memory [`TodoStore`] backed by [`DashMap`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use todo_core::{Todo, TodoId};

use super::{StoreError, TodoPage, TodoStore};

/// Concurrent in-memory todo storage.
///
/// `save` has nothing to flush; it only counts commits so callers can
/// assert how often a handler committed.
#[derive(Default)]
pub struct InMemoryTodoStore {
    todos: DashMap<TodoId, Todo>,
    saves: AtomicU64,
    unavailable: AtomicBool,
}

impl InMemoryTodoStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn find_by_id(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        self.check_available()?;
        Ok(self.todos.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, page: u32, page_size: u32) -> Result<TodoPage, StoreError> {
        self.check_available()?;
        let mut all: Vec<Todo> = self.todos.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by_key(|todo| (todo.created_at_ms(), todo.id()));

        let total = all.len() as u64;
        let size = usize::try_from(page_size).unwrap_or(usize::MAX);
        let skip = usize::try_from(page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(size);
        let items = all.into_iter().skip(skip).take(size).collect();

        Ok(TodoPage { items, total })
    }

    async fn add(&self, todo: Todo) -> Result<(), StoreError> {
        self.check_available()?;
        let id = todo.id();
        match self.todos.entry(id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate { id }),
            Entry::Vacant(slot) => {
                slot.insert(todo);
                Ok(())
            }
        }
    }

    async fn update(&self, todo: Todo) -> Result<(), StoreError> {
        self.check_available()?;
        let id = todo.id();
        match self.todos.get_mut(&id) {
            Some(mut entry) => {
                *entry = todo;
                Ok(())
            }
            None => Err(StoreError::Missing { id }),
        }
    }

    async fn remove(&self, id: TodoId) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.todos.remove(&id).is_some())
    }

    async fn save(&self) -> Result<(), StoreError> {
        self.check_available()?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(title: &str, now_ms: u64) -> Todo {
        Todo::new(title, now_ms).unwrap()
    }

    #[tokio::test]
    async fn add_then_find() {
        let store = InMemoryTodoStore::new();
        let item = todo("write tests", 1);
        let id = item.id();

        store.add(item.clone()).await.unwrap();

        assert_eq!(store.find_by_id(id).await.unwrap(), Some(item));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected() {
        let store = InMemoryTodoStore::new();
        let item = todo("once", 1);

        store.add(item.clone()).await.unwrap();
        let err = store.add(item).await.unwrap_err();

        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn update_of_unknown_todo_fails() {
        let store = InMemoryTodoStore::new();
        let err = store.update(todo("ghost", 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[tokio::test]
    async fn remove_reports_whether_anything_was_deleted() {
        let store = InMemoryTodoStore::new();
        let item = todo("short-lived", 1);
        let id = item.id();
        store.add(item).await.unwrap();

        assert!(store.remove(id).await.unwrap());
        assert!(!store.remove(id).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn list_pages_in_creation_order() {
        let store = InMemoryTodoStore::new();
        for (i, title) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
            store.add(todo(title, i as u64)).await.unwrap();
        }

        let second = store.list(2, 2).await.unwrap();
        let titles: Vec<&str> = second.items.iter().map(Todo::title).collect();
        assert_eq!(titles, vec!["c", "d"]);
        assert_eq!(second.total, 5);

        let past_end = store.list(4, 2).await.unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 5);
    }

    #[tokio::test]
    async fn save_is_counted() {
        let store = InMemoryTodoStore::new();
        store.save().await.unwrap();
        store.save().await.unwrap();
        assert_eq!(store.save_count(), 2);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = InMemoryTodoStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.find_by_id(TodoId::new()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.save().await.is_err());
        assert_eq!(store.save_count(), 0);
    }
}
