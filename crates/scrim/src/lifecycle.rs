#![forbid(unsafe_code)]

//! Lifecycle orchestration: the four-state machine driving blocker,
//! presenter, and dismissal bindings off a boolean visibility signal.
//!
//! # Sequences
//!
//! Open (`Closed`/`Closing` → `Opening` → `Open`): block the background,
//! then either reveal the content immediately (no fade) or schedule the
//! reveal for `fade × fade_delay`; bind the dismissal handlers; fire the
//! "opened" callback at initiation.
//!
//! Close (`Opening`/`Open` → `Closing` → `Closed`): unblock the background
//! and wait for its fade-out to settle (synchronously when fading is off),
//! then fire the "closed" callback and release every dismissal handle.
//!
//! # Invariants
//!
//! 1. Entering a sequence first cancels the superseded sequence's pending
//!    reveal timer and fade-completion wait; their wakeups, should the host
//!    still deliver them, are dropped as stale.
//! 2. Options are resolved once at open-sequence start and the snapshot is
//!    held through the matching close.
//! 3. The "closed" callback of a superseded close never fires.
//! 4. Callbacks run only after the triggering step has settled; a callback
//!    may toggle visibility again and the resulting work is processed in
//!    order, not recursively.
//!
//! # Failure Modes
//!
//! - Hosts must not re-enter the controller from inside [`HostPage`]
//!   methods; completions go through [`Modal::wake`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::binder::{DismissBindings, DismissKind};
use crate::blocker::{Blocker, Unblock};
use crate::event::EventHub;
use crate::host::{HostPage, ModalSurfaces, Wakeup};
use crate::options::{ModalOptions, Presentation, ResolvedOptions};
use crate::presenter::Presenter;

/// Where the lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Closed,
    /// Background blocked, content reveal still pending.
    Opening,
    Open,
    /// Unblock issued, fade-out completion still pending.
    Closing,
}

/// Cancellable handles belonging to the in-flight sequence.
#[derive(Debug, Default)]
struct PendingWork {
    reveal_timer: Option<crate::host::TimerId>,
    overlay_fade: Option<crate::host::AnimationId>,
    panel_fade: Option<crate::host::AnimationId>,
    close_wait: Option<crate::host::AnimationId>,
}

#[derive(Debug, Clone, Copy)]
enum Emit {
    Opened,
    Closed,
}

struct ModalInner<H: HostPage> {
    weak_self: Weak<RefCell<ModalInner<H>>>,
    host: Rc<RefCell<H>>,
    hub: EventHub,
    options: ModalOptions,
    resolved: ResolvedOptions,
    title: Option<String>,
    state: LifecycleState,
    visible: bool,
    blocker: Blocker,
    presenter: Presenter,
    bindings: DismissBindings,
    pending: PendingWork,
    on_opened: Option<Box<dyn FnMut()>>,
    on_closed: Option<Box<dyn FnMut()>>,
    emits: VecDeque<Emit>,
    driving: bool,
}

/// A modal instance: visibility signal in, opened/closed callbacks out.
///
/// All control flows through [`set_visible`](Self::set_visible); dismissal
/// input arrives via the shared [`EventHub`] and timing completions via
/// [`wake`](Self::wake).
pub struct Modal<H: HostPage + 'static> {
    inner: Rc<RefCell<ModalInner<H>>>,
}

impl<H: HostPage + 'static> Modal<H> {
    /// Create a closed instance against the given host, hub, and surfaces.
    pub fn new(
        host: Rc<RefCell<H>>,
        hub: EventHub,
        surfaces: ModalSurfaces,
        options: ModalOptions,
    ) -> Self {
        let resolved = options.resolve();
        let inner = Rc::new_cyclic(|weak| {
            RefCell::new(ModalInner {
                weak_self: weak.clone(),
                host,
                hub,
                options,
                resolved,
                title: None,
                state: LifecycleState::Closed,
                visible: false,
                blocker: Blocker::new(&surfaces),
                presenter: Presenter::new(&surfaces),
                bindings: DismissBindings::new(),
                pending: PendingWork::default(),
                on_opened: None,
                on_closed: None,
                emits: VecDeque::new(),
                driving: false,
            })
        });
        Self { inner }
    }

    /// Set the callback fired when an open sequence is initiated.
    pub fn on_opened(self, callback: impl FnMut() + 'static) -> Self {
        self.inner.borrow_mut().on_opened = Some(Box::new(callback));
        self
    }

    /// Set the callback fired when a close sequence completes.
    pub fn on_closed(self, callback: impl FnMut() + 'static) -> Self {
        self.inner.borrow_mut().on_closed = Some(Box::new(callback));
        self
    }

    /// Attach a title for the rendering layer. The lifecycle never reads it.
    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.inner.borrow_mut().title = Some(title.into());
        self
    }

    /// Feed the visibility signal. Edge-triggered: repeating the current
    /// value is a no-op.
    pub fn set_visible(&self, visible: bool) {
        drive(&self.inner, |m| {
            if m.visible == visible {
                return;
            }
            m.visible = visible;
            if visible {
                m.open_sequence();
            } else {
                m.begin_close();
            }
        });
    }

    /// Deliver a timer or animation completion from the host event loop.
    pub fn wake(&self, wakeup: Wakeup) {
        drive(&self.inner, |m| m.wake(wakeup));
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.inner.borrow().state
    }

    /// Whether the content has been revealed.
    pub fn is_open(&self) -> bool {
        self.state() == LifecycleState::Open
    }

    /// Last visibility signal value seen.
    pub fn visible(&self) -> bool {
        self.inner.borrow().visible
    }

    /// Whether the close button has been revealed.
    pub fn close_button_visible(&self) -> bool {
        self.inner.borrow().presenter.close_button_visible()
    }

    /// Presentation passthrough for the rendering layer, from the snapshot
    /// currently in effect.
    pub fn presentation(&self) -> Presentation {
        self.inner.borrow().resolved.presentation.clone()
    }

    /// Title passthrough for the rendering layer.
    pub fn title(&self) -> Option<String> {
        self.inner.borrow().title.clone()
    }

    /// Swap the caller-facing options. Takes effect at the next open
    /// sequence; the snapshot of an in-flight cycle is untouched.
    pub fn set_options(&self, options: ModalOptions) {
        self.inner.borrow_mut().options = options;
    }

    /// The caller-facing options as currently configured.
    pub fn options(&self) -> ModalOptions {
        self.inner.borrow().options.clone()
    }
}

impl<H: HostPage + 'static> std::fmt::Debug for Modal<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Modal")
            .field("state", &inner.state)
            .field("visible", &inner.visible)
            .finish()
    }
}

/// Run a mutation, then drain deferred callback emissions.
///
/// Re-entrant entries (a callback toggling visibility) only apply their
/// mutation; the outermost call owns the drain loop, so callbacks always run
/// with the controller unborrowed and in emission order.
fn drive<H: HostPage + 'static>(
    inner: &Rc<RefCell<ModalInner<H>>>,
    mutate: impl FnOnce(&mut ModalInner<H>),
) {
    let nested = {
        let mut m = inner.borrow_mut();
        let nested = m.driving;
        m.driving = true;
        mutate(&mut *m);
        nested
    };
    if nested {
        return;
    }

    loop {
        let Some(emit) = inner.borrow_mut().emits.pop_front() else {
            break;
        };
        match emit {
            Emit::Opened => {
                let callback = inner.borrow_mut().on_opened.take();
                if let Some(mut callback) = callback {
                    callback();
                    let mut m = inner.borrow_mut();
                    if m.on_opened.is_none() {
                        m.on_opened = Some(callback);
                    }
                }
            }
            Emit::Closed => {
                let callback = inner.borrow_mut().on_closed.take();
                if let Some(mut callback) = callback {
                    callback();
                    let mut m = inner.borrow_mut();
                    if m.on_closed.is_none() {
                        m.on_closed = Some(callback);
                    }
                }
                // Release the handles unless the callback already reopened
                // (the new cycle owns fresh ones).
                let mut m = inner.borrow_mut();
                if m.state == LifecycleState::Closed {
                    m.bindings.unbind();
                }
            }
        }
    }

    inner.borrow_mut().driving = false;
}

impl<H: HostPage + 'static> ModalInner<H> {
    fn open_sequence(&mut self) {
        let host = Rc::clone(&self.host);
        let mut host = host.borrow_mut();
        self.cancel_pending(&mut *host);

        self.resolved = self.options.resolve();
        debug!(from = ?self.state, fade = ?self.resolved.fade, "open sequence");
        self.state = LifecycleState::Opening;

        self.pending.overlay_fade = self.blocker.block(&mut *host, self.resolved.fade);
        match self.resolved.reveal_delay() {
            Some(delay) => {
                self.pending.reveal_timer = Some(host.schedule(delay));
            }
            None => {
                self.pending.panel_fade =
                    self.presenter
                        .show(&mut *host, None, self.resolved.show_close);
                self.state = LifecycleState::Open;
            }
        }
        drop(host);

        self.bind_dismissal();
        self.emits.push_back(Emit::Opened);
    }

    fn begin_close(&mut self) {
        match self.state {
            LifecycleState::Opening | LifecycleState::Open => {}
            LifecycleState::Closing | LifecycleState::Closed => return,
        }

        let host = Rc::clone(&self.host);
        let mut host = host.borrow_mut();
        self.cancel_pending(&mut *host);

        debug!(from = ?self.state, "close sequence");
        self.state = LifecycleState::Closing;
        match self.blocker.unblock(&mut *host, false, self.resolved.fade) {
            Unblock::Done => {
                drop(host);
                self.finish_close();
            }
            Unblock::Fading(id) => {
                self.pending.close_wait = Some(id);
            }
        }
    }

    fn finish_close(&mut self) {
        self.state = LifecycleState::Closed;
        debug!("closed");
        self.emits.push_back(Emit::Closed);
    }

    fn reveal(&mut self) {
        if self.state != LifecycleState::Opening {
            return;
        }
        let host = Rc::clone(&self.host);
        let mut host = host.borrow_mut();
        self.pending.panel_fade =
            self.presenter
                .show(&mut *host, self.resolved.fade, self.resolved.show_close);
        self.state = LifecycleState::Open;
        debug!("content revealed");
    }

    fn dismiss(&mut self, kind: DismissKind) {
        match self.state {
            LifecycleState::Opening | LifecycleState::Open => {
                debug!(?kind, "dismissal");
                self.begin_close();
            }
            LifecycleState::Closing | LifecycleState::Closed => {
                trace!(?kind, state = ?self.state, "dismissal ignored");
            }
        }
    }

    fn wake(&mut self, wakeup: Wakeup) {
        match wakeup {
            Wakeup::Timer(id) => {
                if self.pending.reveal_timer == Some(id) {
                    self.pending.reveal_timer = None;
                    self.reveal();
                } else {
                    trace!(?id, "stale timer wakeup");
                }
            }
            Wakeup::Animation(id) => {
                if self.pending.close_wait == Some(id) {
                    self.pending.close_wait = None;
                    self.finish_close();
                } else if self.pending.overlay_fade == Some(id) {
                    self.pending.overlay_fade = None;
                } else if self.pending.panel_fade == Some(id) {
                    self.pending.panel_fade = None;
                } else {
                    trace!(?id, "stale animation wakeup");
                }
            }
        }
    }

    fn bind_dismissal(&mut self) {
        let weak = self.weak_self.clone();
        let on_dismiss = move |kind: DismissKind| {
            if let Some(inner) = weak.upgrade() {
                drive(&inner, |m| m.dismiss(kind));
            }
        };
        let hub = self.hub.clone();
        self.bindings.bind(
            &hub,
            &self.resolved,
            self.blocker.overlay(),
            self.presenter.close_button(),
            on_dismiss,
        );
    }

    fn cancel_pending(&mut self, host: &mut H) {
        if let Some(id) = self.pending.reveal_timer.take() {
            trace!(?id, "cancel pending reveal");
            host.cancel_timer(id);
        }
        if let Some(id) = self.pending.overlay_fade.take() {
            host.cancel_animation(id);
        }
        if let Some(id) = self.pending.panel_fade.take() {
            host.cancel_animation(id);
        }
        if let Some(id) = self.pending.close_wait.take() {
            trace!(?id, "cancel pending close wait");
            host.cancel_animation(id);
        }
    }
}

impl<H: HostPage> Drop for ModalInner<H> {
    fn drop(&mut self) {
        let host = Rc::clone(&self.host);
        if let Ok(mut host) = host.try_borrow_mut() {
            if let Some(id) = self.pending.reveal_timer.take() {
                host.cancel_timer(id);
            }
            for id in [
                self.pending.overlay_fade.take(),
                self.pending.panel_fade.take(),
                self.pending.close_wait.take(),
            ]
            .into_iter()
            .flatten()
            {
                host.cancel_animation(id);
            }
        }
        // Subscriptions release themselves when `bindings` drops.
    }
}
