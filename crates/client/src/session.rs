//! Client-side session storage.
//!
//! [`SessionStore`] is a flat string key/value store. [`MemoryStore`] backs tests and one-shot
//! commands; [`FileStore`] keeps a single JSON object on disk so a login survives between CLI
//! invocations. [`Session`] layers the typed keys (token, user, theme, preferences, recent
//! searches, cached entries) on top, with every value JSON-encoded.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const AUTH_TOKEN: &str = "auth_token";
pub const USER_DATA: &str = "user_data";
pub const THEME: &str = "theme";
pub const LANGUAGE: &str = "language";
pub const PREFERENCES: &str = "preferences";
pub const RECENT_SEARCHES: &str = "recent_searches";
pub const SOCKET_ID: &str = "socket_id";
pub const LOGIN_TIME: &str = "login_time";

pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_RECENT_SEARCHES: usize = 10;
pub const DEFAULT_CACHE_MINUTES: i64 = 60;

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;
    fn set(&self, key: &str, value: String) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
    fn keys(&self) -> ClientResult<Vec<String>>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> ClientResult<()> {
        lock(&self.entries).insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        lock(&self.entries).clear();
        Ok(())
    }

    fn keys(&self) -> ClientResult<Vec<String>> {
        Ok(lock(&self.entries).keys().cloned().collect())
    }
}

/// A JSON object file of string values.
///
/// Every mutation is a read-modify-write of the whole file. Writers in other processes are not
/// coordinated; the last write wins.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> ClientResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(ClientError::StoreFormat),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ClientError::StoreIo(e)),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ClientError::StoreIo)?;
        }
        let text = serde_json::to_string_pretty(entries).map_err(ClientError::StoreFormat)?;
        std::fs::write(&self.path, text).map_err(ClientError::StoreIo)
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> ClientResult<()> {
        let _guard = lock(&self.guard);
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let _guard = lock(&self.guard);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> ClientResult<()> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value);
        })
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> ClientResult<()> {
        self.update(BTreeMap::clear)
    }

    fn keys(&self) -> ClientResult<Vec<String>> {
        let _guard = lock(&self.guard);
        Ok(self.load()?.into_keys().collect())
    }
}

#[derive(Serialize, Deserialize)]
struct CachedEntry {
    data: Value,
    /// Epoch milliseconds.
    #[serde(default)]
    expiry: Option<i64>,
}

/// Typed view over a [`SessionStore`].
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// File-backed when `config` names a session file, otherwise in memory.
    pub fn for_config(config: &ClientConfig) -> Self {
        match config.session_file() {
            Some(path) => Self::new(Arc::new(FileStore::new(path.clone()))),
            None => Self::in_memory(),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Decoded value at `key`. Entries that are not valid JSON are logged and read as absent.
    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> ClientResult<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("session entry '{key}' is unreadable: {e}");
                Ok(None)
            }
        }
    }

    pub fn set_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ClientResult<()> {
        let raw = serde_json::to_string(value).map_err(ClientError::Encode)?;
        self.store.set(key, raw)
    }

    pub fn remove_item(&self, key: &str) -> ClientResult<()> {
        self.store.remove(key)
    }

    pub fn has_item(&self, key: &str) -> ClientResult<bool> {
        Ok(self.store.get(key)?.is_some())
    }

    pub fn clear_all(&self) -> ClientResult<()> {
        self.store.clear()
    }

    pub fn auth_token(&self) -> ClientResult<Option<String>> {
        self.get_item(AUTH_TOKEN)
    }

    /// Stores the token and stamps the login time.
    pub fn set_auth_token(&self, token: &str, now: DateTime<Utc>) -> ClientResult<()> {
        self.set_item(AUTH_TOKEN, token)?;
        self.set_item(LOGIN_TIME, &now)
    }

    pub fn login_time(&self) -> ClientResult<Option<DateTime<Utc>>> {
        self.get_item(LOGIN_TIME)
    }

    pub fn user<T: DeserializeOwned>(&self) -> ClientResult<Option<T>> {
        self.get_item(USER_DATA)
    }

    pub fn set_user<T: Serialize>(&self, user: &T) -> ClientResult<()> {
        self.set_item(USER_DATA, user)
    }

    pub fn theme(&self) -> ClientResult<String> {
        Ok(self
            .get_item::<String>(THEME)?
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_THEME.to_owned()))
    }

    pub fn set_theme(&self, theme: &str) -> ClientResult<()> {
        self.set_item(THEME, theme)
    }

    pub fn language(&self) -> ClientResult<Option<String>> {
        self.get_item(LANGUAGE)
    }

    pub fn set_language(&self, language: &str) -> ClientResult<()> {
        self.set_item(LANGUAGE, language)
    }

    pub fn socket_id(&self) -> ClientResult<Option<String>> {
        self.get_item(SOCKET_ID)
    }

    pub fn set_socket_id(&self, socket_id: &str) -> ClientResult<()> {
        self.set_item(SOCKET_ID, socket_id)
    }

    pub fn preferences(&self) -> ClientResult<Map<String, Value>> {
        Ok(self.get_item(PREFERENCES)?.unwrap_or_default())
    }

    pub fn set_preferences(&self, preferences: &Map<String, Value>) -> ClientResult<()> {
        self.set_item(PREFERENCES, preferences)
    }

    pub fn update_preference(&self, key: &str, value: Value) -> ClientResult<()> {
        let mut preferences = self.preferences()?;
        preferences.insert(key.to_owned(), value);
        self.set_preferences(&preferences)
    }

    /// Most recent first.
    pub fn recent_searches(&self) -> ClientResult<Vec<String>> {
        Ok(self.get_item(RECENT_SEARCHES)?.unwrap_or_default())
    }

    /// Moves `term` to the front, dropping any earlier copy, and keeps at most `max_items`.
    pub fn add_recent_search(&self, term: &str, max_items: usize) -> ClientResult<()> {
        let mut searches = self.recent_searches()?;
        searches.retain(|s| s != term);
        searches.insert(0, term.to_owned());
        searches.truncate(max_items);
        self.set_item(RECENT_SEARCHES, &searches)
    }

    pub fn clear_recent_searches(&self) -> ClientResult<()> {
        self.remove_item(RECENT_SEARCHES)
    }

    /// Stores `data` under `key` until `now + ttl_minutes`.
    ///
    /// A lifetime too long to represent is stored as the furthest representable expiry.
    pub fn set_cached<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl_minutes: i64,
        now: DateTime<Utc>,
    ) -> ClientResult<()> {
        let entry = CachedEntry {
            data: serde_json::to_value(data).map_err(ClientError::Encode)?,
            expiry: Some(expiry_millis(now, ttl_minutes)),
        };
        self.set_item(key, &entry)
    }

    /// Cached data at `key`, evicting it first if it expired before `now`.
    pub fn get_cached<T: DeserializeOwned>(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> ClientResult<Option<T>> {
        let Some(entry) = self.get_item::<CachedEntry>(key)? else {
            return Ok(None);
        };
        if entry.expiry.is_some_and(|expiry| now.timestamp_millis() > expiry) {
            tracing::debug!("cache entry '{key}' expired");
            self.remove_item(key)?;
            return Ok(None);
        }
        serde_json::from_value(entry.data)
            .map(Some)
            .map_err(ClientError::Decode)
    }

    /// Drops credentials. Theme, language and preferences survive.
    pub fn clear_session(&self) -> ClientResult<()> {
        self.remove_item(AUTH_TOKEN)?;
        self.remove_item(USER_DATA)?;
        self.remove_item(LOGIN_TIME)
    }

    /// The raw store as a JSON object of strings.
    pub fn export(&self) -> ClientResult<String> {
        let mut out = Map::new();
        for key in self.store.keys()? {
            if let Some(raw) = self.store.get(&key)? {
                out.insert(key, Value::String(raw));
            }
        }
        serde_json::to_string(&out).map_err(ClientError::Encode)
    }

    /// Merges an [`export`](Self::export) into the store.
    pub fn import(&self, json: &str) -> ClientResult<()> {
        let entries: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(ClientError::StoreFormat)?;
        for (key, value) in entries {
            self.store.set(&key, value)?;
        }
        Ok(())
    }
}

fn expiry_millis(now: DateTime<Utc>, ttl_minutes: i64) -> i64 {
    let ttl_millis = ttl_minutes
        .checked_mul(60 * 1000)
        .unwrap_or(if ttl_minutes < 0 { i64::MIN } else { i64::MAX });
    now.timestamp_millis().saturating_add(ttl_millis)
}
