//! Host-boundary contracts and browser adapters for the desktop session engine.
//!
//! This crate is the platform boundary for the session state engine. It wraps
//! the browser capabilities the engine depends on (localStorage, timers,
//! viewport probing, the wall clock) behind Rust-friendly traits with
//! in-memory and no-op counterparts for native hosts and tests.
//!
//! # Example
//!
//! ```rust
//! use session_host::{DurableStore, MemoryDurableStore};
//!
//! let store = MemoryDurableStore::default();
//! store.save("greeting", "\"hello\"").expect("save");
//! assert_eq!(store.load("greeting").expect("load"), Some("\"hello\"".to_string()));
//! assert_eq!(store.write_count(), 1);
//! ```

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod schedule;
pub mod storage;
pub mod time;
pub mod viewport;

pub use schedule::{Debouncer, DeferredTask, ManualDebouncer, NoopDebouncer, WebDebouncer};
pub use storage::{
    load_typed, save_typed, DurableStore, MemoryDurableStore, NoopDurableStore, WebDurableStore,
};
pub use time::date_stamp_now;
pub use viewport::{FixedViewport, ViewportProbe, WebViewport};
