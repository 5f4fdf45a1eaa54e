//! The owned session store: window stack, filesystem operations, dialog
//! surface, and commit/notify plumbing.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use serde_json::Value;
use session_host::{date_stamp_now, Debouncer, DurableStore, ViewportProbe};

use crate::dialog::{DialogArbiter, DialogKind, DialogReply, DialogRequest};
use crate::fs::node::{
    extension_of, format_display_size, FsNode, NewItem, NodeId, NodeKind, ROOT_ID, TRASH_ID,
};
use crate::fs::tree;
use crate::model::{
    AppKind, BootState, Position, SessionState, WindowId, WindowRecord, WindowSize, BASE_Z_INDEX,
    CASCADE_ORIGIN_X, CASCADE_ORIGIN_Y, CASCADE_STEP, MOBILE_BREAKPOINT,
};
use crate::persist::{self, PersistenceGateway};

type Subscriber = Rc<dyn Fn(&SessionState)>;

/// The single state container behind the desktop UI.
///
/// One store is created at boot and shared by reference with every consumer.
/// All mutation flows through the operations below; each public operation
/// commits atomically and publishes exactly one snapshot to subscribers, so
/// composed operations never expose an intermediate state.
///
/// The handle is a cheap clone over shared innards, which lets async
/// operations (`delete_item`, `rename_item`) be spawned onto a local executor
/// while the UI keeps its own handle.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<StoreInner>,
}

struct StoreInner {
    state: RefCell<SessionState>,
    dialogs: DialogArbiter,
    gateway: PersistenceGateway,
    viewport: Rc<dyn ViewportProbe>,
    durable: Rc<dyn DurableStore>,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl SessionStore {
    /// Builds the store from durable storage, migrating the persisted tree
    /// (or seeding the defaults) and reading the cookie-consent decision.
    pub fn boot(
        durable: Rc<dyn DurableStore>,
        debouncer: Rc<dyn Debouncer>,
        viewport: Rc<dyn ViewportProbe>,
    ) -> Self {
        let state = SessionState {
            file_system: persist::load_file_system(durable.as_ref()),
            cookie_consent: persist::load_cookie_consent(durable.as_ref()),
            ..SessionState::default()
        };
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                dialogs: DialogArbiter::default(),
                gateway: PersistenceGateway::new(durable.clone(), debouncer),
                viewport,
                durable,
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    // ---- read surface ----

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn boot_state(&self) -> BootState {
        self.inner.state.borrow().boot_state
    }

    pub fn windows(&self) -> Vec<WindowRecord> {
        self.inner.state.borrow().windows.clone()
    }

    pub fn active_window_id(&self) -> Option<WindowId> {
        self.inner.state.borrow().active_window_id
    }

    pub fn file_system(&self) -> Rc<FsNode> {
        self.inner.state.borrow().file_system.clone()
    }

    pub fn cookie_consent(&self) -> Option<bool> {
        self.inner.state.borrow().cookie_consent
    }

    /// The dialog the UI should currently display.
    pub fn dialog(&self) -> Option<DialogRequest> {
        self.inner.dialogs.current()
    }

    /// Registers a snapshot observer invoked after every committed operation.
    pub fn subscribe(&self, subscriber: impl Fn(&SessionState) + 'static) {
        self.inner.subscribers.borrow_mut().push(Rc::new(subscriber));
    }

    // ---- session ----

    pub fn set_boot_state(&self, boot_state: BootState) {
        self.inner.state.borrow_mut().boot_state = boot_state;
        self.notify();
    }

    /// Records the consent decision and writes it through immediately (the
    /// debounce window covers filesystem writes only).
    pub fn set_cookie_consent(&self, consent: bool) {
        self.inner.state.borrow_mut().cookie_consent = Some(consent);
        persist::save_cookie_consent(self.inner.durable.as_ref(), consent);
        self.notify();
    }

    // ---- window stack ----

    /// Opens a window for `app`, or focuses (and restores) the existing one.
    ///
    /// Editor windows are matched per file identifier in `params`; everything
    /// else is single-instance. When an existing window is reused and new
    /// `params` are supplied, they replace the old payload.
    pub fn open_window(&self, app: AppKind, title: impl Into<String>, params: Option<Value>) {
        {
            let mut state = self.inner.state.borrow_mut();
            let existing = state
                .windows
                .iter()
                .find(|w| {
                    w.app == app
                        && (!app.is_multi_instance()
                            || editor_file_id(&w.params)
                                == params.as_ref().and_then(editor_file_id))
                })
                .map(|w| w.id);

            if let Some(id) = existing {
                if let Some(params) = params {
                    if let Some(window) = state.windows.iter_mut().find(|w| w.id == id) {
                        window.params = params;
                    }
                }
                focus_window_locked(&mut state, id);
                let minimized = state.window(id).map(|w| w.is_minimized).unwrap_or(false);
                if minimized {
                    restore_window_locked(&mut state, id);
                }
            } else {
                let id = WindowId(state.next_window_id);
                state.next_window_id = state.next_window_id.saturating_add(1);
                let offset = state.windows.len() as i32 * CASCADE_STEP;
                let record = WindowRecord {
                    id,
                    app,
                    title: title.into(),
                    is_minimized: false,
                    is_maximized: self.inner.viewport.width() < MOBILE_BREAKPOINT,
                    z_index: BASE_Z_INDEX + state.windows.len() as u32,
                    position: Position {
                        x: CASCADE_ORIGIN_X + offset,
                        y: CASCADE_ORIGIN_Y + offset,
                    },
                    size: WindowSize::default(),
                    params: params.unwrap_or(Value::Null),
                };
                state.windows.push(record);
                focus_window_locked(&mut state, id);
            }
        }
        self.notify();
    }

    /// Removes the window; clears the active pointer when it was active.
    pub fn close_window(&self, id: WindowId) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let before = state.windows.len();
            state.windows.retain(|w| w.id != id);
            let removed = state.windows.len() != before;
            if removed && state.active_window_id == Some(id) {
                state.active_window_id = None;
            }
            removed
        };
        if changed {
            self.notify();
        }
    }

    /// Raises the window to the top of a dense z-order run and activates it.
    pub fn focus_window(&self, id: WindowId) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            focus_window_locked(&mut state, id)
        };
        if changed {
            self.notify();
        }
    }

    pub fn minimize_window(&self, id: WindowId) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            match state.windows.iter_mut().find(|w| w.id == id) {
                Some(window) => {
                    window.is_minimized = true;
                    state.active_window_id = None;
                    true
                }
                None => false,
            }
        };
        if changed {
            self.notify();
        }
    }

    pub fn maximize_window(&self, id: WindowId) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            match state.windows.iter_mut().find(|w| w.id == id) {
                Some(window) => {
                    window.is_maximized = true;
                    focus_window_locked(&mut state, id);
                    true
                }
                None => false,
            }
        };
        if changed {
            self.notify();
        }
    }

    pub fn restore_window(&self, id: WindowId) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            restore_window_locked(&mut state, id)
        };
        if changed {
            self.notify();
        }
    }

    /// Taskbar behavior: open when absent, minimize when active, otherwise
    /// focus (restoring if minimized).
    pub fn toggle_window(&self, app: AppKind, title: &str) {
        let existing = {
            let state = self.inner.state.borrow();
            state
                .windows
                .iter()
                .find(|w| w.app == app)
                .map(|w| (w.id, w.is_minimized, state.active_window_id == Some(w.id)))
        };
        match existing {
            None => self.open_window(app, title, None),
            Some((id, minimized, active)) => {
                if active && !minimized {
                    self.minimize_window(id);
                } else {
                    {
                        let mut state = self.inner.state.borrow_mut();
                        focus_window_locked(&mut state, id);
                        if minimized {
                            restore_window_locked(&mut state, id);
                        }
                    }
                    self.notify();
                }
            }
        }
    }

    /// Pure positional update; z-order and focus are untouched.
    pub fn update_window_position(&self, id: WindowId, position: Position) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            match state.windows.iter_mut().find(|w| w.id == id) {
                Some(window) => {
                    window.position = position;
                    true
                }
                None => false,
            }
        };
        if changed {
            self.notify();
        }
    }

    pub fn deselect_all(&self) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            state.active_window_id.take().is_some()
        };
        if changed {
            self.notify();
        }
    }

    // ---- virtual filesystem ----

    /// Creates a file or folder under `parent_id`, resolving sibling name
    /// collisions with the lowest unused `-N` suffix. Missing or non-folder
    /// parents leave the tree untouched.
    pub fn create_item(&self, parent_id: &str, item: NewItem) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let root = state.file_system.clone();
            let resolved = tree::find_node(&root, parent_id)
                .filter(|parent| parent.is_folder())
                .map(|parent| tree::unique_child_name(parent.children(), &item.name, item.folder));
            match resolved {
                Some(name) => {
                    let node = Rc::new(build_new_node(&name, &item));
                    match tree::insert_child(&root, parent_id, node) {
                        Some(next) => {
                            state.file_system = next;
                            true
                        }
                        None => false,
                    }
                }
                None => false,
            }
        };
        if changed {
            self.persist_and_notify();
        }
    }

    /// Deletes a node: soft (into the trash, stamped with its origin) when it
    /// lives outside the trash, permanent when it is already trashed. System
    /// items surface a blocking alert and nothing changes.
    pub async fn delete_item(&self, id: &str) {
        enum Plan {
            Missing,
            Blocked,
            Permanent,
            Soft { parent_id: NodeId },
        }

        let plan = {
            let state = self.inner.state.borrow();
            let root = &state.file_system;
            match tree::find_node(root, id) {
                None => Plan::Missing,
                Some(node) if node.is_system => Plan::Blocked,
                Some(_) => match tree::find_parent(root, id) {
                    // The root has no parent; it is system-protected anyway.
                    None => Plan::Missing,
                    Some(parent) if parent.id.as_str() == TRASH_ID => Plan::Permanent,
                    Some(parent) => Plan::Soft {
                        parent_id: parent.id.clone(),
                    },
                },
            }
        };

        match plan {
            Plan::Missing => {}
            Plan::Blocked => {
                self.show_alert("Operation blocked", "This system item cannot be deleted.")
                    .await;
            }
            Plan::Permanent => {
                let changed = {
                    let mut state = self.inner.state.borrow_mut();
                    let root = state.file_system.clone();
                    match tree::remove_node(&root, id) {
                        Some((next, _)) => {
                            state.file_system = next;
                            true
                        }
                        None => false,
                    }
                };
                if changed {
                    self.persist_and_notify();
                }
            }
            Plan::Soft { parent_id } => {
                let changed = {
                    let mut state = self.inner.state.borrow_mut();
                    let root = state.file_system.clone();
                    match tree::remove_node(&root, id) {
                        Some((stripped, removed)) => {
                            let mut trashed = (*removed).clone();
                            trashed.original_parent_id = Some(parent_id);
                            match tree::insert_child(&stripped, TRASH_ID, Rc::new(trashed)) {
                                Some(next) => {
                                    state.file_system = next;
                                    true
                                }
                                // Trash is unreachable; keep the old tree.
                                None => false,
                            }
                        }
                        None => false,
                    }
                };
                if changed {
                    self.persist_and_notify();
                }
            }
        }
    }

    /// Moves a trashed node back to the folder it was deleted from, clearing
    /// its origin marker. No-op for nodes that are not trashed. When the
    /// original folder no longer exists the node is restored under the root.
    pub fn restore_item(&self, id: &str) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let root = state.file_system.clone();
            let origin = tree::find_node(&root, id).and_then(|n| n.original_parent_id.clone());
            match origin {
                None => false,
                Some(origin) => match tree::remove_node(&root, id) {
                    Some((stripped, removed)) => {
                        let mut restored = (*removed).clone();
                        restored.original_parent_id = None;
                        let target = if tree::find_node(&stripped, origin.as_str())
                            .is_some_and(|n| n.is_folder())
                        {
                            origin
                        } else {
                            NodeId::new(ROOT_ID)
                        };
                        match tree::insert_child(&stripped, target.as_str(), Rc::new(restored)) {
                            Some(next) => {
                                state.file_system = next;
                                true
                            }
                            None => false,
                        }
                    }
                    None => false,
                },
            }
        };
        if changed {
            self.persist_and_notify();
        }
    }

    /// Drops everything in the trash.
    pub fn empty_trash(&self) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let root = state.file_system.clone();
            let has_contents = tree::find_node(&root, TRASH_ID)
                .map(|trash| !trash.children().is_empty())
                .unwrap_or(false);
            if !has_contents {
                false
            } else {
                match tree::update_node(&root, TRASH_ID, &|trash| trash.with_children(Vec::new())) {
                    Some(next) => {
                        state.file_system = next;
                        true
                    }
                    None => false,
                }
            }
        };
        if changed {
            self.persist_and_notify();
        }
    }

    /// Replaces a file's content, recomputing its displayed size and
    /// refreshing its modified stamp.
    pub fn update_file_content(&self, id: &str, content: impl Into<String>) {
        let content = content.into();
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let root = state.file_system.clone();
            let is_file = tree::find_node(&root, id).is_some_and(|n| n.is_file());
            if !is_file {
                false
            } else {
                let size = format_display_size(content.len());
                let modified = date_stamp_now();
                match tree::update_node(&root, id, &|node| {
                    let mut next = node.clone();
                    next.size = Some(size.clone());
                    next.modified = modified.clone();
                    if let NodeKind::File { content: slot, .. } = &mut next.kind {
                        *slot = Some(content.clone());
                    }
                    next
                }) {
                    Some(next) => {
                        state.file_system = next;
                        true
                    }
                    None => false,
                }
            }
        };
        if changed {
            self.persist_and_notify();
        }
    }

    /// Renames a node. System items and case-insensitive sibling collisions
    /// surface a blocking alert and nothing changes.
    pub async fn rename_item(&self, id: &str, new_name: &str) {
        let trimmed = new_name.trim().to_string();
        if trimmed.is_empty() {
            return;
        }

        enum Plan {
            Missing,
            Blocked,
            Collision,
            Apply,
        }

        let plan = {
            let state = self.inner.state.borrow();
            let root = &state.file_system;
            match tree::find_node(root, id) {
                None => Plan::Missing,
                Some(node) if node.is_system => Plan::Blocked,
                Some(_) => {
                    let collides = tree::find_parent(root, id)
                        .map(|parent| tree::name_taken(parent.children(), &trimmed, Some(id)))
                        .unwrap_or(false);
                    if collides {
                        Plan::Collision
                    } else {
                        Plan::Apply
                    }
                }
            }
        };

        match plan {
            Plan::Missing => {}
            Plan::Blocked => {
                self.show_alert("Operation blocked", "This system item cannot be renamed.")
                    .await;
            }
            Plan::Collision => {
                self.show_alert(
                    "Rename failed",
                    format!("An item named \"{trimmed}\" already exists here."),
                )
                .await;
            }
            Plan::Apply => {
                let changed = {
                    let mut state = self.inner.state.borrow_mut();
                    let root = state.file_system.clone();
                    let modified = date_stamp_now();
                    match tree::update_node(&root, id, &|node| {
                        let mut next = node.clone();
                        next.name = trimmed.clone();
                        next.modified = modified.clone();
                        next
                    }) {
                        Some(next) => {
                            state.file_system = next;
                            true
                        }
                        None => false,
                    }
                };
                if changed {
                    self.persist_and_notify();
                }
            }
        }
    }

    // ---- dialogs ----

    /// Surfaces an alert; the future resolves once the user acknowledges it.
    pub fn show_alert(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> impl Future<Output = ()> {
        let outcome = self
            .inner
            .dialogs
            .show(DialogRequest::new(DialogKind::Alert, title, message));
        self.notify();
        async move {
            let _ = outcome.await;
        }
    }

    /// Surfaces a confirm dialog; resolves `true` only on explicit approval.
    pub fn show_confirm(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> impl Future<Output = bool> {
        let outcome = self
            .inner
            .dialogs
            .show(DialogRequest::new(DialogKind::Confirm, title, message));
        self.notify();
        async move { matches!(outcome.await, Ok(DialogReply::Button(true))) }
    }

    /// Surfaces a prompt dialog; resolves with the entered text, or `None`
    /// when dismissed.
    pub fn show_prompt(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        default_value: Option<String>,
    ) -> impl Future<Output = Option<String>> {
        let mut request = DialogRequest::new(DialogKind::Prompt, title, message);
        request.default_value = default_value;
        let outcome = self.inner.dialogs.show(request);
        self.notify();
        async move {
            match outcome.await {
                Ok(DialogReply::Input(value)) => value,
                _ => None,
            }
        }
    }

    /// Resolves the visible dialog with the user's reply.
    pub fn close_dialog(&self, reply: DialogReply) {
        if self.inner.dialogs.resolve(reply) {
            self.notify();
        }
    }

    // ---- commit plumbing ----

    fn persist_and_notify(&self) {
        let root = self.inner.state.borrow().file_system.clone();
        self.inner.gateway.schedule(root);
        self.notify();
    }

    fn notify(&self) {
        let snapshot = self.inner.state.borrow().clone();
        // Subscribers may reenter store operations; both borrows are released
        // before any callback runs.
        let subscribers: Vec<Subscriber> = self.inner.subscribers.borrow().clone();
        for subscriber in &subscribers {
            subscriber(&snapshot);
        }
    }
}

fn editor_file_id(params: &Value) -> Option<String> {
    params
        .get("fileId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn build_new_node(name: &str, item: &NewItem) -> FsNode {
    let modified = date_stamp_now();
    if item.folder {
        let mut node = FsNode::folder(NodeId::fresh().as_str(), name, Vec::new());
        node.modified = modified;
        node
    } else {
        let content = item.content.clone().unwrap_or_default();
        let extension = item
            .extension
            .clone()
            .or_else(|| extension_of(name).map(str::to_string));
        FsNode {
            id: NodeId::fresh(),
            name: name.to_string(),
            size: Some(format_display_size(content.len())),
            modified,
            is_system: false,
            original_parent_id: None,
            kind: NodeKind::File {
                extension,
                content: Some(content),
                url: item.url.clone(),
            },
        }
    }
}

/// Reassigns all other windows a dense ascending run from the base, then
/// raises the target above them. Bounds z-index growth no matter how often
/// windows are refocused.
fn focus_window_locked(state: &mut SessionState, id: WindowId) -> bool {
    let Some(target) = state.window(id) else {
        return false;
    };
    if state.active_window_id == Some(id) && target.z_index == state.top_z_index() {
        return false;
    }

    let mut others: Vec<usize> = (0..state.windows.len())
        .filter(|&i| state.windows[i].id != id)
        .collect();
    others.sort_by_key(|&i| state.windows[i].z_index);
    for (offset, &i) in others.iter().enumerate() {
        state.windows[i].z_index = BASE_Z_INDEX + offset as u32;
    }
    let top = BASE_Z_INDEX + others.len() as u32;
    if let Some(target) = state.windows.iter_mut().find(|w| w.id == id) {
        target.z_index = top;
    }
    state.active_window_id = Some(id);
    true
}

fn restore_window_locked(state: &mut SessionState, id: WindowId) -> bool {
    let found = match state.windows.iter_mut().find(|w| w.id == id) {
        Some(window) => {
            window.is_minimized = false;
            window.is_maximized = false;
            true
        }
        None => false,
    };
    if found {
        focus_window_locked(state, id);
    }
    found
}
