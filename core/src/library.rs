use crate::notify::Notifier;
use crate::storage::{keys, LocalStore};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

/// Category filter value that matches every item.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryItem {
    pub id: Uuid,
    pub category: String,
    pub store_name: String,
    pub goal: String,
    #[serde(default)]
    pub project_name: Option<String>,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub data: Value,
}

/// Fields the caller supplies when saving an item; id and timestamp are
/// generated on add.
#[derive(Debug, Clone, Default)]
pub struct LibraryDraft {
    pub category: String,
    pub store_name: String,
    pub goal: String,
    pub project_name: Option<String>,
    pub data: Value,
}

/// Flat list of saved findings, append/remove only, persisted on every
/// change.
#[derive(Clone)]
pub struct LibraryStore {
    inner: Arc<RwLock<Vec<LibraryItem>>>,
    storage: LocalStore,
    notifier: Notifier,
}

impl LibraryStore {
    pub fn new(storage: LocalStore) -> Self {
        let items = storage.get(keys::LIBRARY).unwrap_or_default();
        Self {
            inner: Arc::new(RwLock::new(items)),
            storage,
            notifier: Notifier::new(),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<()> {
        self.notifier.subscribe()
    }

    pub fn items(&self) -> Vec<LibraryItem> {
        self.inner.read().clone()
    }

    pub fn add_item(&self, draft: LibraryDraft) -> LibraryItem {
        let item = LibraryItem {
            id: Uuid::new_v4(),
            category: draft.category,
            store_name: draft.store_name,
            goal: draft.goal,
            project_name: draft.project_name,
            saved_at: Utc::now(),
            data: draft.data,
        };
        {
            let mut items = self.inner.write();
            items.insert(0, item.clone());
            self.storage.set(keys::LIBRARY, &*items);
        }
        self.notifier.notify();
        item
    }

    pub fn remove_item(&self, id: Uuid) -> bool {
        let removed = {
            let mut items = self.inner.write();
            let before = items.len();
            items.retain(|item| item.id != id);
            let removed = items.len() != before;
            if removed {
                self.storage.set(keys::LIBRARY, &*items);
            }
            removed
        };
        if removed {
            self.notifier.notify();
        }
        removed
    }

    /// `"all"` returns the full list; any other value filters by exact
    /// category match.
    pub fn items_by_category(&self, category: &str) -> Vec<LibraryItem> {
        let items = self.inner.read();
        if category == ALL_CATEGORIES {
            return items.clone();
        }
        items
            .iter()
            .filter(|item| item.category == category)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over store name, goal and (when
    /// present) project name.
    pub fn search_items(&self, query: &str) -> Vec<LibraryItem> {
        let needle = query.to_lowercase();
        self.inner
            .read()
            .iter()
            .filter(|item| {
                item.store_name.to_lowercase().contains(&needle)
                    || item.goal.to_lowercase().contains(&needle)
                    || item
                        .project_name
                        .as_ref()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }
}
