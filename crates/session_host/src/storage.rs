//! Durable key-value storage contracts and adapters.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use serde::{de::DeserializeOwned, Serialize};

/// Host service for durable key-value state (JSON or literal text per key).
///
/// The contract is synchronous because the backing browser facility
/// (`window.localStorage`) is synchronous; adapters for unsupported targets
/// simply report absence.
pub trait DurableStore {
    /// Loads the raw string stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage is unavailable or the read
    /// fails.
    fn load(&self, key: &str) -> Result<Option<String>, String>;

    /// Saves a raw string under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage is unavailable or the write
    /// fails.
    fn save(&self, key: &str, value: &str) -> Result<(), String>;

    /// Removes `key` from storage.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage is unavailable or the delete
    /// fails.
    fn remove(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser store backed by `window.localStorage`.
///
/// On non-WASM targets every key reads as absent and writes succeed without
/// effect, mirroring a browser session with storage disabled.
pub struct WebDurableStore;

impl DurableStore for WebDurableStore {
    fn load(&self, key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = local_storage()?;
            storage
                .get_item(key)
                .map_err(|e| format!("localStorage get_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = local_storage()?;
            storage
                .set_item(key, value)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, value);
            Ok(())
        }
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = local_storage()?;
            storage
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_string())
}

#[derive(Debug, Clone, Default)]
/// In-memory store keyed by string.
///
/// Counts successful writes so tests can observe write coalescing.
pub struct MemoryDurableStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryDurableStore {
    /// Returns how many writes have been applied to this store.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl DurableStore for MemoryDurableStore {
    fn load(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), String> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op store for baseline tests and hosts without durable storage.
pub struct NoopDurableStore;

impl DurableStore for NoopDurableStore {
    fn load(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Loads and deserializes a typed value through a [`DurableStore`].
///
/// Returns `None` when the key is absent, the store fails, or
/// deserialization fails.
pub fn load_typed<S: DurableStore + ?Sized, T: DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    let raw = store.load(key).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

/// Serializes and saves a typed value through a [`DurableStore`].
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub fn save_typed<S: DurableStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save(key, &raw)
}
