//! Durable persistence of the session: storage keys, tree (de)serialization,
//! protection-flag migration, and the debounced write gateway.

use std::collections::HashMap;
use std::rc::Rc;

use session_host::{Debouncer, DurableStore};
use thiserror::Error;
use tracing::warn;

use crate::fs::defaults::default_file_system;
use crate::fs::node::{FsNode, NodeKind};

/// Storage key holding the JSON-serialized filesystem tree.
pub const FILE_SYSTEM_KEY: &str = "os-file-system";
/// Storage key holding the cookie-consent decision.
pub const COOKIE_CONSENT_KEY: &str = "cookie-consent";
/// Quiet period for coalescing filesystem writes, in milliseconds.
pub const PERSIST_QUIET_MS: i32 = 500;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("serialize file system failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("durable store failed: {0}")]
    Store(String),
}

/// Loads the persisted tree, repairing protection flags against the canonical
/// defaults; falls back to the defaults when nothing usable is stored.
pub fn load_file_system(store: &dyn DurableStore) -> Rc<FsNode> {
    let defaults = default_file_system();
    let raw = match store.load(FILE_SYSTEM_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return defaults,
        Err(err) => {
            warn!("load persisted file system failed: {err}");
            return defaults;
        }
    };
    match serde_json::from_str::<FsNode>(&raw) {
        Ok(tree) => merge_system_flags(&Rc::new(tree), &collect_system_flags(&defaults)),
        Err(err) => {
            warn!("parse persisted file system failed: {err}");
            defaults
        }
    }
}

/// Serializes `root` and writes it under [`FILE_SYSTEM_KEY`].
///
/// # Errors
///
/// Returns a [`PersistError`] when serialization or the store write fails.
pub fn save_file_system(store: &dyn DurableStore, root: &FsNode) -> Result<(), PersistError> {
    let raw = serde_json::to_string(root)?;
    store.save(FILE_SYSTEM_KEY, &raw).map_err(PersistError::Store)
}

fn collect_system_flags(root: &Rc<FsNode>) -> HashMap<String, bool> {
    fn walk(node: &Rc<FsNode>, flags: &mut HashMap<String, bool>) {
        flags.insert(node.id.as_str().to_string(), node.is_system);
        for child in node.children() {
            walk(child, flags);
        }
    }
    let mut flags = HashMap::new();
    walk(root, &mut flags);
    flags
}

/// OR-merges protection flags onto a persisted tree: a canonical `true` is
/// copied in by id, a persisted `true` is never cleared. Repairs states
/// captured before protection flags existed.
pub fn merge_system_flags(root: &Rc<FsNode>, flags: &HashMap<String, bool>) -> Rc<FsNode> {
    let is_system = root.is_system || flags.get(root.id.as_str()).copied().unwrap_or(false);
    let kind = match &root.kind {
        NodeKind::Folder { children } => NodeKind::Folder {
            children: children
                .iter()
                .map(|child| merge_system_flags(child, flags))
                .collect(),
        },
        file @ NodeKind::File { .. } => file.clone(),
    };
    Rc::new(FsNode {
        is_system,
        kind,
        ..(**root).clone()
    })
}

/// Reads the cookie-consent decision; anything but the literal `"true"` or
/// `"false"` (including absence) means undecided.
pub fn load_cookie_consent(store: &dyn DurableStore) -> Option<bool> {
    match store.load(COOKIE_CONSENT_KEY) {
        Ok(Some(raw)) => match raw.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Ok(None) => None,
        Err(err) => {
            warn!("load cookie consent failed: {err}");
            None
        }
    }
}

/// Writes the cookie-consent decision through immediately.
pub fn save_cookie_consent(store: &dyn DurableStore, consent: bool) {
    let literal = if consent { "true" } else { "false" };
    if let Err(err) = store.save(COOKIE_CONSENT_KEY, literal) {
        warn!("persist cookie consent failed: {err}");
    }
}

/// Debounced serialize-and-store of the filesystem tree.
///
/// Each schedule replaces the one before it, so a burst of edits inside the
/// quiet window produces exactly one durable write of the final tree. Storage
/// failures are logged and swallowed; the in-memory tree stays authoritative.
pub struct PersistenceGateway {
    store: Rc<dyn DurableStore>,
    debouncer: Rc<dyn Debouncer>,
}

impl PersistenceGateway {
    pub fn new(store: Rc<dyn DurableStore>, debouncer: Rc<dyn Debouncer>) -> Self {
        Self { store, debouncer }
    }

    /// Schedules a durable write of `root`, replacing any write still pending.
    pub fn schedule(&self, root: Rc<FsNode>) {
        let store = self.store.clone();
        self.debouncer.schedule(Box::new(move || {
            if let Err(err) = save_file_system(store.as_ref(), &root) {
                warn!("persist file system failed: {err}");
            }
        }));
    }
}
