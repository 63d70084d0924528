#![forbid(unsafe_code)]

//! Input event model and the page-wide listener hub.
//!
//! [`EventHub`] is the registry a host feeds raw input into. Listeners are
//! registered through [`EventHub::subscribe_keys`] /
//! [`EventHub::subscribe_clicks`] and owned as RAII [`Subscription`] handles:
//! dropping the handle removes the listener, there is no remove-by-closure.
//!
//! # Invariants
//!
//! 1. After a `Subscription` is dropped, its listener never fires again.
//! 2. Dispatch is reentrancy-safe: a listener may release subscriptions
//!    (including its own) while a dispatch is in flight; listeners removed
//!    mid-dispatch are skipped, listeners added mid-dispatch see only later
//!    events.
//! 3. `listener_count()` reflects exactly the live subscriptions.
//!
//! # Failure Modes
//!
//! - A listener must not call `dispatch` recursively from inside its own
//!   callback; the callback cell is borrowed for the duration of the call.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;

use crate::host::SurfaceId;

bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

/// Key identity, reduced to what dismissal handling needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Backspace,
    Char(char),
}

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
}

/// A page-wide keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain press of `code` with no modifiers.
    pub const fn press(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }
}

/// Mouse button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A click event carrying the surface it landed on.
///
/// `target` is the innermost element hit, so a click inside the content
/// panel reports the panel (or a descendant), never the overlay behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub button: MouseButton,
    pub target: SurfaceId,
}

impl ClickEvent {
    /// A left click on `target`.
    pub const fn left(target: SurfaceId) -> Self {
        Self {
            button: MouseButton::Left,
            target,
        }
    }
}

/// An input event routed through the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Click(ClickEvent),
}

type KeyListener = Rc<RefCell<dyn FnMut(&KeyEvent)>>;
type ClickListener = Rc<RefCell<dyn FnMut(&ClickEvent)>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ListenerId(u64);

#[derive(Default)]
struct HubInner {
    next_id: u64,
    keys: Vec<(ListenerId, KeyListener)>,
    clicks: Vec<(ListenerId, ClickListener)>,
}

impl HubInner {
    fn mint(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }

    fn remove(&mut self, id: ListenerId) {
        self.keys.retain(|(key_id, _)| *key_id != id);
        self.clicks.retain(|(click_id, _)| *click_id != id);
    }
}

/// The page-wide listener registry.
///
/// Cloning shares the registry; the host typically keeps one clone to feed
/// input into while modal instances keep another to bind against.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Rc<RefCell<HubInner>>,
}

impl EventHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page-wide key listener.
    pub fn subscribe_keys(&self, listener: impl FnMut(&KeyEvent) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.mint();
        inner.keys.push((id, Rc::new(RefCell::new(listener))));
        Subscription {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Register a page-wide click listener.
    pub fn subscribe_clicks(&self, listener: impl FnMut(&ClickEvent) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.mint();
        inner.clicks.push((id, Rc::new(RefCell::new(listener))));
        Subscription {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Route an input event to every live listener of its kind.
    ///
    /// The listener list is snapshotted up front and each entry is re-checked
    /// for liveness right before its callback runs, so listeners released
    /// mid-dispatch are skipped.
    pub fn dispatch(&self, event: &Event) {
        match event {
            Event::Key(key) => {
                let snapshot: Vec<(ListenerId, KeyListener)> = self
                    .inner
                    .borrow()
                    .keys
                    .iter()
                    .map(|(id, listener)| (*id, Rc::clone(listener)))
                    .collect();
                for (id, listener) in snapshot {
                    if self.is_live(id) {
                        (&mut *listener.borrow_mut())(key);
                    }
                }
            }
            Event::Click(click) => {
                let snapshot: Vec<(ListenerId, ClickListener)> = self
                    .inner
                    .borrow()
                    .clicks
                    .iter()
                    .map(|(id, listener)| (*id, Rc::clone(listener)))
                    .collect();
                for (id, listener) in snapshot {
                    if self.is_live(id) {
                        (&mut *listener.borrow_mut())(click);
                    }
                }
            }
        }
    }

    /// Number of live listeners across both kinds.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        let inner = self.inner.borrow();
        inner.keys.len() + inner.clicks.len()
    }

    fn is_live(&self, id: ListenerId) -> bool {
        let inner = self.inner.borrow();
        inner.keys.iter().any(|(key_id, _)| *key_id == id)
            || inner.clicks.iter().any(|(click_id, _)| *click_id == id)
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// RAII handle to a registered listener. Dropping it removes the listener.
pub struct Subscription {
    hub: Weak<RefCell<HubInner>>,
    id: ListenerId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().remove(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn escape() -> Event {
        Event::Key(KeyEvent::press(KeyCode::Escape))
    }

    #[test]
    fn key_listener_receives_dispatch() {
        let hub = EventHub::new();
        let seen = Rc::new(Cell::new(0u32));
        let s = Rc::clone(&seen);
        let _sub = hub.subscribe_keys(move |_| s.set(s.get() + 1));

        hub.dispatch(&escape());
        assert_eq!(seen.get(), 1);
        hub.dispatch(&escape());
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn click_and_key_listeners_are_separate() {
        let hub = EventHub::new();
        let keys = Rc::new(Cell::new(0u32));
        let clicks = Rc::new(Cell::new(0u32));
        let k = Rc::clone(&keys);
        let c = Rc::clone(&clicks);
        let _ks = hub.subscribe_keys(move |_| k.set(k.get() + 1));
        let _cs = hub.subscribe_clicks(move |_| c.set(c.get() + 1));

        hub.dispatch(&escape());
        hub.dispatch(&Event::Click(ClickEvent::left(SurfaceId::new(7))));
        assert_eq!(keys.get(), 1);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn drop_releases_listener() {
        let hub = EventHub::new();
        let seen = Rc::new(Cell::new(0u32));
        let s = Rc::clone(&seen);
        let sub = hub.subscribe_keys(move |_| s.set(s.get() + 1));
        assert_eq!(hub.listener_count(), 1);

        drop(sub);
        assert_eq!(hub.listener_count(), 0);
        hub.dispatch(&escape());
        assert_eq!(seen.get(), 0, "listener must not fire after release");
    }

    #[test]
    fn listener_released_mid_dispatch_is_skipped() {
        let hub = EventHub::new();
        let seen = Rc::new(Cell::new(0u32));

        // First listener drops the second one's subscription.
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let v = Rc::clone(&victim);
        let _killer = hub.subscribe_keys(move |_| {
            v.borrow_mut().take();
        });

        let s = Rc::clone(&seen);
        *victim.borrow_mut() = Some(hub.subscribe_keys(move |_| s.set(s.get() + 1)));

        hub.dispatch(&escape());
        assert_eq!(seen.get(), 0, "released listener must not see the event");
        assert_eq!(hub.listener_count(), 1);
    }

    #[test]
    fn listener_added_mid_dispatch_sees_only_later_events() {
        let hub = EventHub::new();
        let seen = Rc::new(Cell::new(0u32));

        let hub_clone = hub.clone();
        let late: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let l = Rc::clone(&late);
        let s = Rc::clone(&seen);
        let _adder = hub.subscribe_keys(move |_| {
            if l.borrow().is_none() {
                let s2 = Rc::clone(&s);
                *l.borrow_mut() = Some(hub_clone.subscribe_keys(move |_| s2.set(s2.get() + 1)));
            }
        });

        hub.dispatch(&escape());
        assert_eq!(seen.get(), 0, "late listener must miss the in-flight event");
        hub.dispatch(&escape());
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn count_tracks_repeated_cycles() {
        let hub = EventHub::new();
        for _ in 0..10 {
            let a = hub.subscribe_keys(|_| {});
            let b = hub.subscribe_clicks(|_| {});
            assert_eq!(hub.listener_count(), 2);
            drop(a);
            drop(b);
        }
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let seen = Rc::new(Cell::new(0u32));
        let sub;
        {
            let hub = EventHub::new();
            let s = Rc::clone(&seen);
            sub = hub.subscribe_keys(move |_| s.set(s.get() + 1));
        }
        drop(sub);
    }
}
