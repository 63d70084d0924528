#![forbid(unsafe_code)]

//! Modal overlay lifecycle controller.
//!
//! `scrim` coordinates the showing and hiding of a dimmed background layer
//! and a content panel off a boolean visibility signal: fade sequencing, a
//! delayed content reveal, a page scroll lock, and transient dismissal
//! handlers (escape key, click-outside, close button). Rendering is someone
//! else's job — the controller only drives opacity, display state, and
//! scroll lock through the [`HostPage`] seam and reports lifecycle edges
//! through its opened/closed callbacks.
//!
//! # Example
//!
//! ```ignore
//! use scrim::{EventHub, Modal, ModalOptions, ModalSurfaces, SurfaceId};
//!
//! let hub = EventHub::new();
//! let surfaces = ModalSurfaces::new()
//!     .body(SurfaceId::new(0))
//!     .overlay(SurfaceId::new(1))
//!     .panel(SurfaceId::new(2));
//!
//! let modal = Modal::new(host, hub.clone(), surfaces,
//!         ModalOptions::default().fade_duration("300").fade_delay(0.5))
//!     .on_opened(|| println!("opened"))
//!     .on_closed(|| println!("closed"));
//!
//! modal.set_visible(true);       // open sequence starts
//! // ... host event loop feeds hub.dispatch(..) and modal.wake(..) ...
//! modal.set_visible(false);      // close sequence starts
//! ```
//!
//! Single-threaded by design: the controller is driven cooperatively by the
//! host event loop and shares state over `Rc`. One active instance per page
//! is assumed; the scroll lock and the key-listener registry are not
//! reference counted.

mod binder;
mod blocker;
pub mod event;
pub mod host;
mod lifecycle;
pub mod options;
mod presenter;

pub use binder::DismissKind;
pub use event::{
    ClickEvent, Event, EventHub, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton,
    Subscription,
};
pub use host::{AnimationId, Fade, HostPage, ModalSurfaces, SurfaceId, TimerId, Wakeup};
pub use lifecycle::{LifecycleState, Modal};
pub use options::{ModalOptions, Presentation, ResolvedOptions};
