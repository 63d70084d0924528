#![forbid(unsafe_code)]

//! Host capability boundary.
//!
//! The controller never touches a real page. Everything it needs from its
//! host — locking scroll, writing opacity/display state, running a timed
//! opacity transition, scheduling a delayed callback — goes through
//! [`HostPage`]. Completions come back through the host's event loop as
//! [`Wakeup`] values fed to [`Modal::wake`](crate::Modal::wake); the host
//! must never call back into the controller from inside a trait method.
//!
//! # Invariants
//!
//! - `TimerId` and `AnimationId` values are minted by the host and are unique
//!   for the lifetime of the page; the controller compares them by equality
//!   to drop stale completions.
//! - Cancelling an id the host no longer knows is a no-op, never an error.
//!
//! # Failure Modes
//!
//! - A host that delivers a completion for a cancelled handle causes no harm:
//!   the controller discards unknown ids.

use std::time::Duration;

/// Opaque handle to an element owned by the rendering layer.
///
/// The controller only ever compares and forwards these; it cannot mint
/// elements itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Wrap a raw id minted by the rendering layer.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Handle to a scheduled delay, minted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Handle to a running opacity transition, minted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(pub u64);

/// A linear opacity transition between two values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    /// Starting opacity in `[0.0, 1.0]`.
    pub from: f32,
    /// Ending opacity in `[0.0, 1.0]`.
    pub to: f32,
    /// Transition length.
    pub duration: Duration,
}

impl Fade {
    /// 0 → 1 over `duration`.
    pub const fn fade_in(duration: Duration) -> Self {
        Self {
            from: 0.0,
            to: 1.0,
            duration,
        }
    }

    /// 1 → 0 over `duration`.
    pub const fn fade_out(duration: Duration) -> Self {
        Self {
            from: 1.0,
            to: 0.0,
            duration,
        }
    }
}

/// A completion notification delivered by the host event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// A timer scheduled via [`HostPage::schedule`] elapsed.
    Timer(TimerId),
    /// A transition started via [`HostPage::animate`] finished.
    Animation(AnimationId),
}

/// Imperative surface the controller drives.
///
/// Implementations must apply each call synchronously and must not re-enter
/// the controller; completion notifications go through the event loop as
/// [`Wakeup`]s.
pub trait HostPage {
    /// Lock or release scrolling on the page body.
    fn set_scroll_locked(&mut self, body: SurfaceId, locked: bool);

    /// Write an element's opacity immediately.
    fn set_opacity(&mut self, surface: SurfaceId, value: f32);

    /// Flip an element in or out of the displayed layer.
    fn set_displayed(&mut self, surface: SurfaceId, displayed: bool);

    /// Start an opacity transition, returning a cancellable handle.
    fn animate(&mut self, surface: SurfaceId, fade: Fade) -> AnimationId;

    /// Cancel a running transition. Unknown ids are ignored.
    fn cancel_animation(&mut self, id: AnimationId);

    /// Schedule a one-shot delay, returning a cancellable handle.
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Cancel a scheduled delay. Unknown ids are ignored.
    fn cancel_timer(&mut self, id: TimerId);
}

/// The element references a modal instance works against.
///
/// Every slot is optional: a host that has not mounted yet simply leaves the
/// slots empty and the corresponding operations become silent no-ops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalSurfaces {
    /// The page body carrying the scroll lock.
    pub body: Option<SurfaceId>,
    /// The full-viewport dimmed overlay behind the content panel.
    pub overlay: Option<SurfaceId>,
    /// The content panel.
    pub panel: Option<SurfaceId>,
    /// The close button inside the panel.
    pub close_button: Option<SurfaceId>,
}

impl ModalSurfaces {
    /// Create an empty surface set (every operation no-ops).
    pub const fn new() -> Self {
        Self {
            body: None,
            overlay: None,
            panel: None,
            close_button: None,
        }
    }

    /// Set the page body reference.
    pub fn body(mut self, id: SurfaceId) -> Self {
        self.body = Some(id);
        self
    }

    /// Set the overlay reference.
    pub fn overlay(mut self, id: SurfaceId) -> Self {
        self.overlay = Some(id);
        self
    }

    /// Set the content panel reference.
    pub fn panel(mut self, id: SurfaceId) -> Self {
        self.panel = Some(id);
        self
    }

    /// Set the close button reference.
    pub fn close_button(mut self, id: SurfaceId) -> Self {
        self.close_button = Some(id);
        self
    }
}
