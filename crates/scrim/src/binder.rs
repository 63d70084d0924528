#![forbid(unsafe_code)]

//! Dismissal bindings: escape key, overlay click, close button.
//!
//! All handles attached for one open cycle live in a single owned
//! collection. Binding again releases the previous handles first, so a bind
//! is always idempotent; unbinding releases the whole collection atomically.
//! Removal is by handle, never by reconstructing a closure.

use tracing::trace;

use crate::event::{EventHub, KeyCode, KeyEventKind, MouseButton, Subscription};
use crate::host::SurfaceId;
use crate::options::ResolvedOptions;

/// Which dismissal path fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissKind {
    /// Escape key pressed.
    Escape,
    /// The overlay itself was clicked (not a descendant).
    Backdrop,
    /// The close button was clicked.
    CloseButton,
}

/// The set of currently attached dismissal listeners.
#[derive(Debug, Default)]
pub(crate) struct DismissBindings {
    subs: Vec<Subscription>,
}

impl DismissBindings {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Attach the dismissal listeners selected by `options`.
    ///
    /// Any handles from a previous bind are released first.
    pub(crate) fn bind(
        &mut self,
        hub: &EventHub,
        options: &ResolvedOptions,
        overlay: Option<SurfaceId>,
        close_button: Option<SurfaceId>,
        on_dismiss: impl Fn(DismissKind) + Clone + 'static,
    ) {
        self.unbind();

        if options.escape_close {
            let dismiss = on_dismiss.clone();
            self.subs.push(hub.subscribe_keys(move |key| {
                if key.code == KeyCode::Escape && key.kind == KeyEventKind::Press {
                    dismiss(DismissKind::Escape);
                }
            }));
        }

        if options.click_close
            && let Some(overlay) = overlay
        {
            let dismiss = on_dismiss.clone();
            self.subs.push(hub.subscribe_clicks(move |click| {
                if click.button == MouseButton::Left && click.target == overlay {
                    dismiss(DismissKind::Backdrop);
                }
            }));
        }

        if options.show_close
            && let Some(button) = close_button
        {
            let dismiss = on_dismiss.clone();
            self.subs.push(hub.subscribe_clicks(move |click| {
                if click.button == MouseButton::Left && click.target == button {
                    dismiss(DismissKind::CloseButton);
                }
            }));
        }

        trace!(handles = self.subs.len(), "dismissal handlers bound");
    }

    /// Release every handle this instance attached.
    pub(crate) fn unbind(&mut self) {
        if !self.subs.is_empty() {
            trace!(handles = self.subs.len(), "dismissal handlers released");
        }
        self.subs.clear();
    }

    #[cfg(test)]
    fn active(&self) -> usize {
        self.subs.len()
    }
}
