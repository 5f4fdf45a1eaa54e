//! Debounced task scheduling contracts and adapters.

use std::cell::{Cell, RefCell};

/// A boxed deferred task.
pub type DeferredTask = Box<dyn FnOnce()>;

/// Host facility that runs at most one pending task after a quiet period.
///
/// Scheduling while a task is already pending replaces it, so a burst of
/// schedules inside the quiet window executes exactly once with the latest
/// task.
pub trait Debouncer {
    /// Schedules `task`, replacing any task still pending.
    fn schedule(&self, task: DeferredTask);

    /// Drops the pending task, if any, without running it.
    fn cancel(&self);
}

/// Browser debouncer armed with `setTimeout` for a fixed quiet period.
///
/// When the timer fires, the task is deferred to `requestIdleCallback` where
/// the browser supports it; otherwise it runs directly. On non-WASM targets
/// there is no timer facility, so the task runs immediately (a degenerate
/// debounce that still preserves last-write-wins ordering).
pub struct WebDebouncer {
    quiet_ms: i32,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    handle: Cell<Option<i32>>,
}

impl WebDebouncer {
    /// Creates a debouncer with the given quiet period in milliseconds.
    pub fn new(quiet_ms: i32) -> Self {
        Self {
            quiet_ms,
            handle: Cell::new(None),
        }
    }

    /// Returns the configured quiet period in milliseconds.
    pub fn quiet_ms(&self) -> i32 {
        self.quiet_ms
    }
}

impl Debouncer for WebDebouncer {
    fn schedule(&self, task: DeferredTask) {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{closure::Closure, JsCast};

            self.cancel();
            let Some(window) = web_sys::window() else {
                return;
            };
            let fire = Closure::once_into_js(move || run_when_idle(task));
            if let Ok(handle) = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    fire.unchecked_ref(),
                    self.quiet_ms,
                )
            {
                self.handle.set(Some(handle));
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            task();
        }
    }

    fn cancel(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn run_when_idle(task: DeferredTask) {
    use wasm_bindgen::{closure::Closure, JsCast, JsValue};

    let Some(window) = web_sys::window() else {
        return;
    };
    let supported = js_sys::Reflect::has(
        window.as_ref(),
        &JsValue::from_str("requestIdleCallback"),
    )
    .unwrap_or(false);
    if !supported {
        task();
        return;
    }
    let idle = Closure::once_into_js(move |_deadline: web_sys::IdleDeadline| task());
    let _ = window.request_idle_callback(idle.unchecked_ref());
}

#[derive(Default)]
/// Test debouncer that holds the latest scheduled task until fired explicitly.
pub struct ManualDebouncer {
    pending: RefCell<Option<DeferredTask>>,
    scheduled: Cell<usize>,
}

impl ManualDebouncer {
    /// Runs the pending task, if any. Returns `true` when a task ran.
    pub fn fire(&self) -> bool {
        let task = self.pending.borrow_mut().take();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a task is scheduled but not yet fired.
    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Returns how many times `schedule` has been called.
    pub fn times_scheduled(&self) -> usize {
        self.scheduled.get()
    }
}

impl Debouncer for ManualDebouncer {
    fn schedule(&self, task: DeferredTask) {
        self.scheduled.set(self.scheduled.get() + 1);
        *self.pending.borrow_mut() = Some(task);
    }

    fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Debouncer that drops every task, for hosts without persistence.
pub struct NoopDebouncer;

impl Debouncer for NoopDebouncer {
    fn schedule(&self, _task: DeferredTask) {}

    fn cancel(&self) {}
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn manual_debouncer_runs_only_the_latest_task() {
        let debouncer = ManualDebouncer::default();
        let log = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let log = log.clone();
            debouncer.schedule(Box::new(move || log.borrow_mut().push(label)));
        }

        assert_eq!(debouncer.times_scheduled(), 3);
        assert!(debouncer.has_pending());
        assert!(debouncer.fire());
        assert!(!debouncer.fire());
        assert_eq!(*log.borrow(), vec!["third"]);
    }

    #[test]
    fn manual_debouncer_cancel_drops_the_pending_task() {
        let debouncer = ManualDebouncer::default();
        let ran = Rc::new(RefCell::new(false));
        {
            let ran = ran.clone();
            debouncer.schedule(Box::new(move || *ran.borrow_mut() = true));
        }
        debouncer.cancel();
        assert!(!debouncer.fire());
        assert!(!*ran.borrow());
    }

    #[test]
    fn manual_debouncer_task_may_reschedule() {
        let debouncer = Rc::new(ManualDebouncer::default());
        let inner = debouncer.clone();
        debouncer.schedule(Box::new(move || {
            inner.schedule(Box::new(|| {}));
        }));
        assert!(debouncer.fire());
        assert!(debouncer.has_pending());
    }

    #[test]
    fn web_debouncer_runs_through_on_native_targets() {
        let debouncer = WebDebouncer::new(500);
        assert_eq!(debouncer.quiet_ms(), 500);
        let ran = Rc::new(RefCell::new(false));
        {
            let ran = ran.clone();
            debouncer.schedule(Box::new(move || *ran.borrow_mut() = true));
        }
        assert!(*ran.borrow());
    }

    #[test]
    fn noop_debouncer_drops_tasks() {
        let debouncer = NoopDebouncer;
        debouncer.schedule(Box::new(|| panic!("noop debouncer must not run tasks")));
        debouncer.cancel();
    }
}
