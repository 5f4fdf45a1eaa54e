//! Modal dialog arbitration between store operations and the UI layer.

use std::cell::RefCell;
use std::collections::VecDeque;

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogRequest {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_label: Option<String>,
}

impl DialogRequest {
    pub fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            default_value: None,
            confirm_label: None,
            cancel_label: None,
        }
    }
}

/// The value the UI resolves a dialog with.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogReply {
    /// Alert acknowledgment or confirm outcome.
    Button(bool),
    /// Prompt input; `None` when dismissed.
    Input(Option<String>),
}

struct PendingDialog {
    request: DialogRequest,
    responder: oneshot::Sender<DialogReply>,
}

/// Brokers modal requests as one-shot futures.
///
/// Exactly one request is active at a time. A request issued while another is
/// outstanding is queued in arrival order instead of replacing it, so no
/// caller's future is ever orphaned.
#[derive(Default)]
pub struct DialogArbiter {
    active: RefCell<Option<PendingDialog>>,
    queued: RefCell<VecDeque<PendingDialog>>,
}

impl DialogArbiter {
    /// Places `request` into the slot (or the queue) and returns the future
    /// resolved by [`DialogArbiter::resolve`].
    pub fn show(&self, request: DialogRequest) -> oneshot::Receiver<DialogReply> {
        let (responder, outcome) = oneshot::channel();
        let pending = PendingDialog { request, responder };
        let mut active = self.active.borrow_mut();
        if active.is_none() {
            *active = Some(pending);
        } else {
            self.queued.borrow_mut().push_back(pending);
        }
        outcome
    }

    /// The request the UI should currently display.
    pub fn current(&self) -> Option<DialogRequest> {
        self.active.borrow().as_ref().map(|p| p.request.clone())
    }

    /// Resolves the active request with `reply` and promotes the next queued
    /// request, if any. Returns `true` when a request was resolved.
    pub fn resolve(&self, reply: DialogReply) -> bool {
        let pending = self.active.borrow_mut().take();
        let Some(pending) = pending else {
            return false;
        };
        // The caller may have dropped its future; a failed send is fine.
        let _ = pending.responder.send(reply);
        let next = self.queued.borrow_mut().pop_front();
        *self.active.borrow_mut() = next;
        true
    }
}
