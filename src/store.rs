//! Todo Store — the in-memory todo collection and its id allocator.
//!
//! A single mutex guards both the map and `next_id`, so id allocation and
//! insertion, and every check-then-act in update/delete, happen in one
//! critical section. Reads take the same lock. The lock is never held
//! across an `.await`.
//!
//! `title` and `completed` hold raw JSON values. Create always writes a
//! string and `false`; update writes whatever value the caller supplied.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: Value,
    pub completed: Value,
}

/// Partial update: only the fields that are `Some` are written, as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<Value>,
    pub completed: Option<Value>,
}

struct StoreState {
    /// Keyed by id. Ids are allocated in increasing order, so iteration
    /// order is insertion order.
    todos: BTreeMap<u64, Todo>,
    next_id: u64,
}

/// In-memory todo store, shared across all request tasks via `Arc`.
pub struct TodoStore {
    state: Mutex<StoreState>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                todos: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    // No operation panics while holding the guard, so a poisoned lock still
    // protects a consistent state.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every todo, in insertion order.
    pub fn list(&self) -> Vec<Todo> {
        self.lock().todos.values().cloned().collect()
    }

    /// Number of live todos.
    pub fn count(&self) -> usize {
        self.lock().todos.len()
    }

    /// Create a todo with the trimmed `title`.
    /// An empty title is rejected before an id is allocated.
    pub fn create(&self, title: &str) -> Result<Todo, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation);
        }

        let mut state = self.lock();
        let id = state.next_id;
        let todo = Todo {
            id,
            title: Value::String(title.to_string()),
            completed: Value::Bool(false),
        };
        state.todos.insert(id, todo.clone());
        state.next_id += 1;
        Ok(todo)
    }

    pub fn get(&self, id: u64) -> Result<Todo, StoreError> {
        self.lock().todos.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    /// Apply `patch` to the todo with `id` and return the result.
    pub fn update(&self, id: u64, patch: TodoPatch) -> Result<Todo, StoreError> {
        let mut state = self.lock();
        let todo = state.todos.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(todo.clone())
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        self.lock()
            .todos
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
