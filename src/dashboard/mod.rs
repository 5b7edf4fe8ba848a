//! Dashboard tab session state.
//!
//! Tracks which dashboard sections have been visited (visited sections stay
//! mounted), persists that state to session storage, and preloads a section
//! after a hover delay that depends on the measured connection speed.

pub mod form_state;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use form_state::FormDraft;

/// Session storage key for the persisted tab state
pub const TAB_STATE_KEY: &str = "tabState";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabName {
    ManageProfile,
    ManageProjects,
    ManageEmployment,
    ManageAccess,
    ManagePrompt,
}

impl TabName {
    pub const ALL: [TabName; 5] = [
        TabName::ManageProfile,
        TabName::ManageProjects,
        TabName::ManageEmployment,
        TabName::ManageAccess,
        TabName::ManagePrompt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TabName::ManageProfile => "manage-profile",
            TabName::ManageProjects => "manage-projects",
            TabName::ManageEmployment => "manage-employment",
            TabName::ManageAccess => "manage-access",
            TabName::ManagePrompt => "manage-prompt",
        }
    }
}

impl fmt::Display for TabName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TabName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown tab '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionSpeed {
    Fast,
    Medium,
    Slow,
}

impl ConnectionSpeed {
    /// Network Information API `effectiveType`; no information means medium
    pub fn from_effective_type(effective_type: Option<&str>) -> Self {
        match effective_type {
            None => ConnectionSpeed::Medium,
            Some("4g") => ConnectionSpeed::Fast,
            Some("3g") => ConnectionSpeed::Medium,
            Some(_) => ConnectionSpeed::Slow,
        }
    }

    /// Hover-to-preload delay; `None` disables preloading
    pub fn preload_delay(&self) -> Option<Duration> {
        match self {
            ConnectionSpeed::Fast => Some(Duration::from_millis(300)),
            ConnectionSpeed::Medium => Some(Duration::from_millis(800)),
            ConnectionSpeed::Slow => None,
        }
    }
}

/// Session-scoped key/value storage (the browser's `sessionStorage`)
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

/// Persisted shape under [`TAB_STATE_KEY`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabState {
    pub visited_tabs: BTreeSet<TabName>,
    pub active_tab: TabName,
    pub connection_speed: ConnectionSpeed,
}

struct Shared {
    state: Mutex<TabState>,
    storage: Arc<dyn SessionStorage>,
}

impl Shared {
    /// Applies `change` and persists the result under the same lock, so
    /// storage always ends up holding the latest state.
    fn update(&self, change: impl FnOnce(&mut TabState)) {
        let mut state = self.state.lock();
        change(&mut state);
        match serde_json::to_string(&*state) {
            Ok(json) => self.storage.set(TAB_STATE_KEY, json),
            Err(e) => warn!("Failed to persist tab state: {}", e),
        }
    }
}

/// Owns the visited set, active tab and connection speed for one page session
pub struct TabSession {
    shared: Arc<Shared>,
    pending_preload: Mutex<Option<JoinHandle<()>>>,
}

impl TabSession {
    /// Starts on `initial_tab`, then applies any state persisted earlier in the session
    pub fn new(initial_tab: TabName, storage: Arc<dyn SessionStorage>) -> Self {
        let mut state = TabState {
            visited_tabs: BTreeSet::from([initial_tab]),
            active_tab: initial_tab,
            connection_speed: ConnectionSpeed::Medium,
        };

        if let Some(saved) = storage.get(TAB_STATE_KEY) {
            match serde_json::from_str::<TabState>(&saved) {
                Ok(restored) => {
                    state.visited_tabs = restored.visited_tabs;
                    state.active_tab = restored.active_tab;
                    state.visited_tabs.insert(state.active_tab);
                }
                Err(e) => warn!("Failed to restore tab state: {}", e),
            }
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            storage,
        });
        shared.update(|_| {});

        Self {
            shared,
            pending_preload: Mutex::new(None),
        }
    }

    pub fn active_tab(&self) -> TabName {
        self.shared.state.lock().active_tab
    }

    pub fn connection_speed(&self) -> ConnectionSpeed {
        self.shared.state.lock().connection_speed
    }

    pub fn visited_tabs(&self) -> BTreeSet<TabName> {
        self.shared.state.lock().visited_tabs.clone()
    }

    /// Visited tabs stay mounted so switching back does not rebuild them
    pub fn should_mount(&self, tab: TabName) -> bool {
        self.shared.state.lock().visited_tabs.contains(&tab)
    }

    pub fn switch_tab(&self, tab: TabName) {
        self.shared.update(|state| {
            state.active_tab = tab;
            state.visited_tabs.insert(tab);
        });
    }

    pub fn set_connection_speed(&self, speed: ConnectionSpeed) {
        self.shared.update(|state| state.connection_speed = speed);
    }

    /// Marks `tab` visited after the speed-dependent delay, replacing any
    /// pending preload. Must be called inside a Tokio runtime.
    pub fn preload_tab(&self, tab: TabName) {
        let Some(delay) = self.connection_speed().preload_delay() else {
            debug!("Slow connection, not preloading {}", tab);
            return;
        };

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.update(|state| {
                state.visited_tabs.insert(tab);
            });
        });

        if let Some(previous) = self.pending_preload.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn cancel_preload(&self) {
        if let Some(pending) = self.pending_preload.lock().take() {
            pending.abort();
        }
    }
}

impl Drop for TabSession {
    fn drop(&mut self) {
        self.cancel_preload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(storage: &Arc<MemorySessionStorage>) -> TabSession {
        TabSession::new(TabName::ManageProfile, storage.clone())
    }

    #[test]
    fn connection_speed_heuristic() {
        assert_eq!(ConnectionSpeed::from_effective_type(Some("4g")), ConnectionSpeed::Fast);
        assert_eq!(ConnectionSpeed::from_effective_type(Some("3g")), ConnectionSpeed::Medium);
        assert_eq!(ConnectionSpeed::from_effective_type(Some("2g")), ConnectionSpeed::Slow);
        assert_eq!(ConnectionSpeed::from_effective_type(None), ConnectionSpeed::Medium);
        assert_eq!(ConnectionSpeed::Slow.preload_delay(), None);
    }

    #[test]
    fn tab_names_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TabName::ManageEmployment).unwrap(),
            "\"manage-employment\""
        );
        assert_eq!("manage-access".parse::<TabName>().unwrap(), TabName::ManageAccess);
    }

    #[test]
    fn switching_marks_visited_and_persists() {
        let storage = Arc::new(MemorySessionStorage::new());
        let tabs = session(&storage);
        assert!(!tabs.should_mount(TabName::ManageProjects));

        tabs.switch_tab(TabName::ManageProjects);
        assert_eq!(tabs.active_tab(), TabName::ManageProjects);
        assert!(tabs.should_mount(TabName::ManageProfile));

        let saved: serde_json::Value = serde_json::from_str(&storage.get(TAB_STATE_KEY).unwrap()).unwrap();
        assert_eq!(saved["activeTab"], "manage-projects");
        assert_eq!(saved["connectionSpeed"], "medium");
    }

    #[test]
    fn restores_from_session_storage() {
        let storage = Arc::new(MemorySessionStorage::new());
        session(&storage).switch_tab(TabName::ManagePrompt);

        let restored = session(&storage);
        assert_eq!(restored.active_tab(), TabName::ManagePrompt);
        assert!(restored.should_mount(TabName::ManagePrompt));
        assert!(restored.should_mount(TabName::ManageProfile));
    }

    #[test]
    fn corrupt_saved_state_is_ignored() {
        let storage = Arc::new(MemorySessionStorage::new());
        storage.set(TAB_STATE_KEY, "{not json".into());
        let tabs = session(&storage);
        assert_eq!(tabs.active_tab(), TabName::ManageProfile);
        assert_eq!(tabs.visited_tabs().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn preload_marks_visited_after_delay() {
        let storage = Arc::new(MemorySessionStorage::new());
        let tabs = session(&storage);
        tabs.set_connection_speed(ConnectionSpeed::Fast);

        tabs.preload_tab(TabName::ManageAccess);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!tabs.should_mount(TabName::ManageAccess));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(tabs.should_mount(TabName::ManageAccess));
        // Preloading never changes the active tab
        assert_eq!(tabs.active_tab(), TabName::ManageProfile);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_preload_never_lands() {
        let storage = Arc::new(MemorySessionStorage::new());
        let tabs = session(&storage);

        tabs.preload_tab(TabName::ManageEmployment);
        tokio::time::sleep(Duration::from_millis(500)).await;
        tabs.cancel_preload();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(!tabs.should_mount(TabName::ManageEmployment));
    }

    #[tokio::test(start_paused = true)]
    async fn new_preload_replaces_pending_one() {
        let storage = Arc::new(MemorySessionStorage::new());
        let tabs = session(&storage);

        tabs.preload_tab(TabName::ManageEmployment);
        tokio::time::sleep(Duration::from_millis(400)).await;
        tabs.preload_tab(TabName::ManagePrompt);
        tokio::time::sleep(Duration::from_millis(900)).await;

        assert!(!tabs.should_mount(TabName::ManageEmployment));
        assert!(tabs.should_mount(TabName::ManagePrompt));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn persisted_state_matches_memory_under_concurrent_updates() {
        let storage = Arc::new(MemorySessionStorage::new());
        let tabs = Arc::new(session(&storage));

        let mut workers = Vec::new();
        for i in 0..8 {
            let tabs = Arc::clone(&tabs);
            workers.push(tokio::spawn(async move {
                for j in 0..50 {
                    tabs.switch_tab(TabName::ALL[(i + j) % TabName::ALL.len()]);
                    tokio::task::yield_now().await;
                }
            }));
        }
        for worker in workers {
            worker.await.unwrap();
        }

        let saved: TabState = serde_json::from_str(&storage.get(TAB_STATE_KEY).unwrap()).unwrap();
        assert_eq!(saved.active_tab, tabs.active_tab());
        assert_eq!(saved.visited_tabs, tabs.visited_tabs());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_connections_do_not_preload() {
        let storage = Arc::new(MemorySessionStorage::new());
        let tabs = session(&storage);
        tabs.set_connection_speed(ConnectionSpeed::from_effective_type(Some("slow-2g")));

        tabs.preload_tab(TabName::ManageProjects);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!tabs.should_mount(TabName::ManageProjects));
    }
}
