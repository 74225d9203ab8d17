//! Key-value persistence
//!
//! String keys, string values; integer helpers on top. LocalStorage on web,
//! an in-memory map everywhere else.

use std::collections::HashMap;

use crate::error::StoreError;

/// Minimal get/set storage used for high scores and settings
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Integer value under `key`.
    ///
    /// Leading digits are parsed the way the browser's `parseInt` would, so
    /// `"1200px"` reads as 1200; anything without a leading integer is `None`.
    fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.get(key)?.as_deref().and_then(parse_leading_int))
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.set(key, &value.to_string())
    }
}

/// Parse an optionally signed run of leading digits, ignoring surrounding whitespace
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

/// In-memory store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// Reject every write, to exercise best-effort callers
    pub reject_writes: bool,
    /// Fail every read, as a blocked browser storage does
    pub reject_reads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    /// Store where every read and write fails
    pub fn unavailable() -> Self {
        Self {
            reject_writes: true,
            reject_reads: true,
            ..Self::default()
        }
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.reject_reads {
            return Err(StoreError::Unavailable(format!("{key} is unreadable")));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Rejected(format!("{key} is read-only")));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Grab `window.localStorage`; a missing or blocked storage turns every call into an error
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - scores will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StoreError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("no localStorage".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Rejected(format!("{e:?}")))
    }
}
