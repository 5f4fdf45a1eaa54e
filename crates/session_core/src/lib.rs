//! Client-side desktop session state engine.
//!
//! The engine owns one [`store::SessionStore`] per browser session and keeps
//! its three coupled concerns consistent across synchronous, reentrant calls:
//! the window stack (single instance per app, dense z-order), the virtual
//! filesystem (copy-on-write structural edits, trash semantics, debounced
//! persistence), and the modal dialog arbiter that gates destructive
//! filesystem operations on user confirmation.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use session_core::{
//!     AppKind, SessionStore, WebDebouncer, WebDurableStore, WebViewport, PERSIST_QUIET_MS,
//! };
//!
//! let store = SessionStore::boot(
//!     Rc::new(WebDurableStore),
//!     Rc::new(WebDebouncer::new(PERSIST_QUIET_MS)),
//!     Rc::new(WebViewport),
//! );
//! store.open_window(AppKind::Terminal, "Terminal", None);
//! assert_eq!(store.windows().len(), 1);
//! ```

pub mod dialog;
pub mod fs;
pub mod model;
pub mod persist;
pub mod store;

pub use dialog::{DialogArbiter, DialogKind, DialogReply, DialogRequest};
pub use fs::node::{format_display_size, FsNode, NewItem, NodeId, NodeKind, ROOT_ID, TRASH_ID};
pub use model::*;
pub use persist::{PersistenceGateway, COOKIE_CONSENT_KEY, FILE_SYSTEM_KEY, PERSIST_QUIET_MS};
pub use session_host::{
    Debouncer, DurableStore, FixedViewport, ManualDebouncer, MemoryDurableStore, NoopDebouncer,
    NoopDurableStore, ViewportProbe, WebDebouncer, WebDurableStore, WebViewport,
};
pub use store::SessionStore;
