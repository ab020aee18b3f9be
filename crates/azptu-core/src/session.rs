//! TTL-expiring local session store.
//!
//! Operator context (active project, resource group, subscription, cached
//! project list) persists across invocations in a single JSON file. The
//! whole blob shares one timestamp: expiration is coarse-grained over the
//! entire state, and every successful load or write refreshes the window
//! (sliding TTL). The file is deliberately unlocked; concurrent invocations
//! race with last-writer-wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::model::ProjectSummary;

/// Default session file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = ".azptu_state";

/// Default expiration window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(300);

const KEY_CURRENT_PROJECT: &str = "current_project";
const KEY_RESOURCE_GROUP: &str = "resource_group";
const KEY_SUBSCRIPTION: &str = "subscription";
const KEY_PROJECTS_CACHE: &str = "projects_cache";

/// The active project entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProject {
    pub name: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    pub set_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredResourceGroup {
    name: String,
    set_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSubscription {
    id: String,
    set_at: String,
}

#[derive(Serialize)]
struct StateFile<'a> {
    timestamp: f64,
    state: &'a Map<String, Value>,
}

/// TTL-bound key/value store backed by a single local file.
///
/// Persistence failures are non-fatal: a warning is logged and the in-memory
/// state stays valid for the rest of the process.
pub struct SessionStore {
    path: PathBuf,
    window: Duration,
    state: Map<String, Value>,
}

impl SessionStore {
    /// Opens the store at the default location with the default window.
    pub fn open_default() -> Self {
        Self::open(DEFAULT_STATE_FILE, DEFAULT_WINDOW)
    }

    /// Opens the store at `path`, loading any unexpired state.
    ///
    /// An absent file yields empty state. A file without a numeric
    /// `timestamp` is corrupt and is cleared. An expired file is deleted.
    /// A fresh file is adopted and immediately re-persisted, which slides
    /// the expiration window forward.
    pub fn open(path: impl Into<PathBuf>, window: Duration) -> Self {
        let mut store = Self {
            path: path.into(),
            window,
            state: Map::new(),
        };
        store.load();
        store
    }

    fn load(&mut self) {
        if !self.path.exists() {
            return;
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to read session state");
                return;
            }
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "session state is not valid JSON");
                return;
            }
        };

        let Some(timestamp) = parsed.get("timestamp").and_then(Value::as_f64) else {
            // No timestamp means we cannot judge freshness: treat as corrupt.
            self.clear();
            return;
        };

        if now_secs() - timestamp < self.window.as_secs_f64() {
            self.state = parsed
                .get("state")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            // Refresh the access timestamp: sliding expiration.
            self.persist();
        } else {
            self.clear();
        }
    }

    /// Persists the full blob with a fresh timestamp. Never fails the caller.
    fn persist(&self) {
        let file = StateFile {
            timestamp: now_secs(),
            state: &self.state,
        };
        let json = match serde_json::to_string_pretty(&file) {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, "failed to serialize session state");
                return;
            }
        };

        if let Err(err) = write_atomic(&self.path, &json) {
            warn!(path = %self.path.display(), %err, "could not save session state");
        }
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Stores `value` under `key` and re-persists the whole blob.
    pub fn set(&mut self, key: &str, value: Value) {
        self.state.insert(key.to_string(), value);
        self.persist();
    }

    /// Removes `key` if present, re-persisting on change.
    pub fn remove(&mut self, key: &str) {
        if self.state.remove(key).is_some() {
            self.persist();
        }
    }

    /// Clears all state and removes the backing file.
    pub fn clear(&mut self) {
        self.state.clear();
        if self.path.exists() {
            // Best effort: a leftover file will simply expire.
            let _ = fs::remove_file(&self.path);
        }
    }

    // ------------------------------------------------------------------
    // Typed accessors layered on the generic map
    // ------------------------------------------------------------------

    /// The active project, if one was set within the window.
    pub fn current_project(&self) -> Option<StoredProject> {
        self.get(KEY_CURRENT_PROJECT)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Sets the active project, stamping the write time.
    pub fn set_current_project(&mut self, name: &str, endpoint: Option<String>) {
        let entry = StoredProject {
            name: name.to_string(),
            endpoint,
            set_at: chrono::Utc::now().to_rfc3339(),
        };
        self.set(KEY_CURRENT_PROJECT, to_value_or_null(&entry));
    }

    /// The stored default resource group name.
    pub fn resource_group(&self) -> Option<String> {
        self.get(KEY_RESOURCE_GROUP)
            .and_then(|value| serde_json::from_value::<StoredResourceGroup>(value.clone()).ok())
            .map(|entry| entry.name)
    }

    /// Sets the default resource group, stamping the write time.
    pub fn set_resource_group(&mut self, name: &str) {
        let entry = StoredResourceGroup {
            name: name.to_string(),
            set_at: chrono::Utc::now().to_rfc3339(),
        };
        self.set(KEY_RESOURCE_GROUP, to_value_or_null(&entry));
    }

    /// The stored default subscription id.
    pub fn subscription(&self) -> Option<String> {
        self.get(KEY_SUBSCRIPTION)
            .and_then(|value| serde_json::from_value::<StoredSubscription>(value.clone()).ok())
            .map(|entry| entry.id)
    }

    /// Sets the default subscription, stamping the write time.
    pub fn set_subscription(&mut self, id: &str) {
        let entry = StoredSubscription {
            id: id.to_string(),
            set_at: chrono::Utc::now().to_rfc3339(),
        };
        self.set(KEY_SUBSCRIPTION, to_value_or_null(&entry));
    }

    /// The last-seen project list, stored verbatim (no per-entry TTL).
    pub fn projects_cache(&self) -> Vec<ProjectSummary> {
        self.get(KEY_PROJECTS_CACHE)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    /// Replaces the cached project list.
    pub fn set_projects_cache(&mut self, projects: &[ProjectSummary]) {
        self.set(KEY_PROJECTS_CACHE, to_value_or_null(&projects));
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

fn to_value_or_null<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Write-temp-then-rename so a concurrent reader never sees a torn file.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_path(dir: &TempDir) -> PathBuf {
        dir.path().join(".azptu_state")
    }

    fn write_state_with_timestamp(path: &Path, timestamp: f64, state: Value) {
        let blob = serde_json::json!({ "timestamp": timestamp, "state": state });
        fs::write(path, serde_json::to_string(&blob).unwrap()).unwrap();
    }

    #[test]
    fn absent_file_yields_empty_state() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(state_path(&dir), DEFAULT_WINDOW);
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn set_persists_and_reopen_restores() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);

        let mut store = SessionStore::open(&path, DEFAULT_WINDOW);
        store.set("k", Value::String("v".into()));

        let reopened = SessionStore::open(&path, DEFAULT_WINDOW);
        assert_eq!(reopened.get("k"), Some(&Value::String("v".into())));
    }

    #[test]
    fn fresh_state_is_adopted_and_timestamp_refreshed() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);
        let stale_by_200 = now_secs() - 200.0;
        write_state_with_timestamp(&path, stale_by_200, serde_json::json!({"k": "v"}));

        let store = SessionStore::open(&path, DEFAULT_WINDOW);
        assert_eq!(store.get("k"), Some(&Value::String("v".into())));

        // The load itself slid the window: the on-disk timestamp moved forward.
        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk["timestamp"].as_f64().unwrap() > stale_by_200 + 100.0);
    }

    #[test]
    fn expired_state_is_dropped_and_file_removed() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);
        write_state_with_timestamp(&path, now_secs() - 301.0, serde_json::json!({"k": "v"}));

        let store = SessionStore::open(&path, DEFAULT_WINDOW);
        assert!(store.get("k").is_none());
        assert!(!path.exists());
    }

    #[test]
    fn missing_timestamp_is_corrupt_and_cleared() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);
        fs::write(&path, r#"{"state": {"k": "v"}}"#).unwrap();

        let store = SessionStore::open(&path, DEFAULT_WINDOW);
        assert!(store.get("k").is_none());
        assert!(!path.exists());
    }

    #[test]
    fn clear_removes_the_backing_file() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);

        let mut store = SessionStore::open(&path, DEFAULT_WINDOW);
        store.set_resource_group("my-rg");
        assert!(path.exists());

        store.clear();
        assert!(!path.exists());
        assert!(store.resource_group().is_none());
    }

    #[test]
    fn typed_helpers_stamp_set_at() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::open(state_path(&dir), DEFAULT_WINDOW);

        store.set_current_project("proj", Some("https://proj.example".into()));
        store.set_resource_group("my-rg");
        store.set_subscription("0000-1111");

        let project = store.current_project().unwrap();
        assert_eq!(project.name, "proj");
        assert_eq!(project.endpoint.as_deref(), Some("https://proj.example"));
        assert!(!project.set_at.is_empty());

        assert_eq!(store.resource_group().as_deref(), Some("my-rg"));
        assert_eq!(store.subscription().as_deref(), Some("0000-1111"));

        let raw = store.get("subscription").unwrap();
        assert!(raw.get("set_at").is_some());
    }

    #[test]
    fn projects_cache_round_trips_verbatim() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::open(state_path(&dir), DEFAULT_WINDOW);

        let projects = vec![
            ProjectSummary {
                name: "alpha".into(),
                resource_group: "rg-a".into(),
                location: "eastus".into(),
                kind: "AIServices".into(),
                endpoint: Some("https://alpha.example".into()),
            },
            ProjectSummary {
                name: "alpha".into(),
                resource_group: "rg-a".into(),
                location: "eastus".into(),
                kind: "AIServices".into(),
                endpoint: Some("https://alpha.example".into()),
            },
        ];
        store.set_projects_cache(&projects);

        // Duplicates are kept: the cache is the raw last-seen list.
        assert_eq!(store.projects_cache(), projects);
    }

    #[test]
    fn unwritable_path_keeps_in_memory_state() {
        let mut store = SessionStore::open(
            "/definitely/not/a/writable/dir/.azptu_state",
            DEFAULT_WINDOW,
        );
        store.set("k", Value::String("v".into()));
        // The write failed, but the process-local state is still valid.
        assert_eq!(store.get("k"), Some(&Value::String("v".into())));
    }

    #[test]
    fn remove_deletes_a_single_entry() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);
        let mut store = SessionStore::open(&path, DEFAULT_WINDOW);

        store.set_resource_group("my-rg");
        store.set_subscription("0000-1111");
        store.remove("resource_group");

        let reopened = SessionStore::open(&path, DEFAULT_WINDOW);
        assert!(reopened.resource_group().is_none());
        assert_eq!(reopened.subscription().as_deref(), Some("0000-1111"));
    }
}
