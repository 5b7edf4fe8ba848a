//! Per-tab form drafts kept in session storage so that half-filled forms
//! survive switching tabs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::warn;

use super::{SessionStorage, TabName};

/// Writes are coalesced over this window
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Drafts older than this are not restored
pub const MAX_DRAFT_AGE_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Serialize, Deserialize)]
struct SavedDraft {
    state: Value,
    /// Unix milliseconds at write time
    timestamp: i64,
}

pub struct FormDraft {
    key: String,
    storage: Arc<dyn SessionStorage>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl FormDraft {
    pub fn new(tab: TabName, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            key: format!("tab_form_{}", tab),
            storage,
            pending: Mutex::new(None),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn restore<T: DeserializeOwned>(&self) -> Option<T> {
        self.restore_at(Utc::now().timestamp_millis())
    }

    /// Draft as of `now_ms`, if one exists and is younger than an hour
    pub fn restore_at<T: DeserializeOwned>(&self, now_ms: i64) -> Option<T> {
        let raw = self.storage.get(&self.key)?;
        let saved: SavedDraft = match serde_json::from_str(&raw) {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Failed to restore form state for {}: {}", self.key, e);
                return None;
            }
        };
        if now_ms - saved.timestamp >= MAX_DRAFT_AGE_MS {
            return None;
        }
        serde_json::from_value(saved.state)
            .map_err(|e| warn!("Saved form state for {} has the wrong shape: {}", self.key, e))
            .ok()
    }

    /// Schedules a write of `state` after [`SAVE_DEBOUNCE`]; a newer call
    /// replaces the pending one. Must be called inside a Tokio runtime.
    pub fn save<T: Serialize>(&self, state: &T) {
        let state = match serde_json::to_value(state) {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to save form state for {}: {}", self.key, e);
                return;
            }
        };

        let key = self.key.clone();
        let storage = Arc::clone(&self.storage);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(SAVE_DEBOUNCE).await;
            let saved = SavedDraft {
                state,
                timestamp: Utc::now().timestamp_millis(),
            };
            match serde_json::to_string(&saved) {
                Ok(json) => storage.set(&key, json),
                Err(e) => warn!("Failed to save form state for {}: {}", key, e),
            }
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Drops the saved draft and any write still waiting on the debounce
    pub fn clear(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }
        self.storage.remove(&self.key);
    }
}

impl Drop for FormDraft {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::MemorySessionStorage;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ProjectForm {
        project_name: String,
    }

    fn form(name: &str) -> ProjectForm {
        ProjectForm {
            project_name: name.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn saves_are_debounced() {
        let storage = Arc::new(MemorySessionStorage::new());
        let draft = FormDraft::new(TabName::ManageProjects, storage.clone());
        assert_eq!(draft.storage_key(), "tab_form_manage-projects");

        draft.save(&form("A"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        draft.save(&form("AB"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(storage.get("tab_form_manage-projects").is_none());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(draft.restore::<ProjectForm>(), Some(form("AB")));
    }

    #[test]
    fn stale_drafts_are_not_restored() {
        let storage = Arc::new(MemorySessionStorage::new());
        let draft = FormDraft::new(TabName::ManageProfile, storage.clone());
        storage.set(
            draft.storage_key(),
            serde_json::json!({ "state": { "project_name": "old" }, "timestamp": 1_000 }).to_string(),
        );

        assert_eq!(draft.restore_at::<ProjectForm>(1_000 + MAX_DRAFT_AGE_MS - 1), Some(form("old")));
        assert_eq!(draft.restore_at::<ProjectForm>(1_000 + MAX_DRAFT_AGE_MS), None);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_discards_pending_and_saved() {
        let storage = Arc::new(MemorySessionStorage::new());
        let draft = FormDraft::new(TabName::ManagePrompt, storage.clone());
        storage.set(draft.storage_key(), "{}".into());

        draft.save(&form("unsent"));
        draft.clear();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(storage.get("tab_form_manage-prompt").is_none());
    }
}
