//! Viewport probing for layout decisions made by the engine.

/// Host service reporting the current viewport width in CSS pixels.
pub trait ViewportProbe {
    /// Returns the current viewport width.
    fn width(&self) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser viewport probe backed by `window.innerWidth`.
///
/// Falls back to a desktop-sized width when the browser context is
/// unavailable (non-WASM targets, headless documents).
pub struct WebViewport;

impl ViewportProbe for WebViewport {
    fn width(&self) -> i32 {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                return window
                    .inner_width()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .map(|value| value as i32)
                    .unwrap_or(1024);
            }
        }

        1024
    }
}

#[derive(Debug, Clone, Copy)]
/// Fixed-width probe for tests and native hosts.
pub struct FixedViewport(pub i32);

impl ViewportProbe for FixedViewport {
    fn width(&self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_viewport_reports_its_width() {
        assert_eq!(FixedViewport(480).width(), 480);
        assert_eq!(FixedViewport(1920).width(), 1920);
    }

    #[test]
    fn web_viewport_falls_back_to_desktop_width_off_browser() {
        assert_eq!(WebViewport.width(), 1024);
    }
}
