#![forbid(unsafe_code)]

//! Background blocker: the dimmed overlay and the page scroll lock.
//!
//! # Invariants
//!
//! - The scroll lock is released by `unblock` before any fade-out starts,
//!   never as part of animation completion.
//! - Both operations are silent no-ops unless the body and overlay
//!   references are both present.

use std::time::Duration;

use tracing::debug;

use crate::host::{AnimationId, Fade, HostPage, ModalSurfaces, SurfaceId};

/// Outcome of [`Blocker::unblock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unblock {
    /// The overlay settled synchronously.
    Done,
    /// A fade-out is running; completion arrives as an animation wakeup.
    Fading(AnimationId),
}

/// Owns the overlay's opacity and the page body's scroll lock.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Blocker {
    body: Option<SurfaceId>,
    overlay: Option<SurfaceId>,
}

impl Blocker {
    pub(crate) fn new(surfaces: &ModalSurfaces) -> Self {
        Self {
            body: surfaces.body,
            overlay: surfaces.overlay,
        }
    }

    pub(crate) fn overlay(&self) -> Option<SurfaceId> {
        self.overlay
    }

    /// Lock scrolling and raise the overlay.
    ///
    /// With fading, the overlay starts transparent and fades to full
    /// opacity; the returned handle lets a superseding sequence cancel the
    /// transition. Without, the overlay is opaque immediately.
    pub(crate) fn block(
        &self,
        host: &mut dyn HostPage,
        fade: Option<Duration>,
    ) -> Option<AnimationId> {
        let (Some(body), Some(overlay)) = (self.body, self.overlay) else {
            return None;
        };

        host.set_scroll_locked(body, true);
        match fade {
            Some(duration) => {
                debug!(?duration, "overlay fade-in");
                host.set_opacity(overlay, 0.0);
                Some(host.animate(overlay, Fade::fade_in(duration)))
            }
            None => {
                host.set_opacity(overlay, 1.0);
                None
            }
        }
    }

    /// Release the scroll lock and lower the overlay.
    ///
    /// The lock is released unconditionally; only the opacity transition may
    /// be deferred. `immediate` forces the synchronous path even when fading
    /// is enabled.
    pub(crate) fn unblock(
        &self,
        host: &mut dyn HostPage,
        immediate: bool,
        fade: Option<Duration>,
    ) -> Unblock {
        let (Some(body), Some(overlay)) = (self.body, self.overlay) else {
            return Unblock::Done;
        };

        host.set_scroll_locked(body, false);
        match fade {
            Some(duration) if !immediate => {
                debug!(?duration, "overlay fade-out");
                Unblock::Fading(host.animate(overlay, Fade::fade_out(duration)))
            }
            _ => {
                host.set_opacity(overlay, 0.0);
                Unblock::Done
            }
        }
    }
}
