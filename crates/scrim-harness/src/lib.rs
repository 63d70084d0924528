#![forbid(unsafe_code)]

//! Deterministic host simulation for exercising `scrim` lifecycles.
//!
//! [`PageSim`] implements [`HostPage`] against a manual clock: timers and
//! fades are bookkept with explicit deadlines, [`PageSim::advance`] moves
//! time forward and returns the due [`Wakeup`]s in completion order, and
//! every host call lands in an ordered [`Effect`] log so tests can assert
//! sequencing (lock before reveal, unlock before the closed callback, and
//! so on). Fades interpolate linearly while in flight.
//!
//! # Invariants
//!
//! 1. `advance` never fires a cancelled handle.
//! 2. Wakeups are returned ordered by deadline, ties broken by creation
//!    order (timer and fade ids share one counter).
//! 3. A zero-length delay or fade completes on the next `advance`, even one
//!    of zero.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use ahash::AHashMap;
use tracing::trace;

use scrim::host::{AnimationId, Fade, HostPage, SurfaceId, TimerId, Wakeup};
use scrim::Modal;

/// One recorded host call.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ScrollLock { body: SurfaceId, locked: bool },
    Opacity { surface: SurfaceId, value: f32 },
    Displayed { surface: SurfaceId, displayed: bool },
    FadeStarted { id: AnimationId, surface: SurfaceId, fade: Fade },
    FadeCancelled(AnimationId),
    TimerScheduled { id: TimerId, delay: Duration },
    TimerCancelled(TimerId),
}

#[derive(Debug, Clone)]
struct FadeRun {
    surface: SurfaceId,
    fade: Fade,
    started_at: Duration,
}

/// Simulated page: manual clock, effect log, surface state.
#[derive(Debug, Default)]
pub struct PageSim {
    now: Duration,
    next_id: u64,
    timers: AHashMap<TimerId, Duration>,
    fades: AHashMap<AnimationId, FadeRun>,
    scroll_locks: AHashMap<SurfaceId, bool>,
    opacities: AHashMap<SurfaceId, f32>,
    displayed: AHashMap<SurfaceId, bool>,
    effects: Vec<Effect>,
}

impl PageSim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time since construction.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move time forward, interpolate running fades, and collect due
    /// wakeups in completion order.
    pub fn advance(&mut self, step: Duration) -> Vec<Wakeup> {
        self.now += step;
        let now = self.now;

        // (deadline, creation order, wakeup)
        let mut due: Vec<(Duration, u64, Wakeup)> = Vec::new();

        self.timers.retain(|id, deadline| {
            if *deadline <= now {
                due.push((*deadline, id.0, Wakeup::Timer(*id)));
                false
            } else {
                true
            }
        });

        let mut finished: Vec<AnimationId> = Vec::new();
        for (id, run) in &self.fades {
            let ends_at = run.started_at + run.fade.duration;
            if ends_at <= now {
                due.push((ends_at, id.0, Wakeup::Animation(*id)));
                finished.push(*id);
            } else {
                let elapsed = (now - run.started_at).as_secs_f32();
                let total = run.fade.duration.as_secs_f32();
                let fraction = (elapsed / total).clamp(0.0, 1.0);
                let value = run.fade.from + (run.fade.to - run.fade.from) * fraction;
                self.opacities.insert(run.surface, value);
            }
        }
        for id in finished {
            if let Some(run) = self.fades.remove(&id) {
                self.opacities.insert(run.surface, run.fade.to);
            }
        }

        due.sort_by_key(|(deadline, order, _)| (*deadline, *order));
        let wakeups: Vec<Wakeup> = due.into_iter().map(|(_, _, wakeup)| wakeup).collect();
        if !wakeups.is_empty() {
            trace!(?now, count = wakeups.len(), "wakeups due");
        }
        wakeups
    }

    pub fn is_scroll_locked(&self, body: SurfaceId) -> bool {
        self.scroll_locks.get(&body).copied().unwrap_or(false)
    }

    pub fn opacity(&self, surface: SurfaceId) -> Option<f32> {
        self.opacities.get(&surface).copied()
    }

    pub fn is_displayed(&self, surface: SurfaceId) -> bool {
        self.displayed.get(&surface).copied().unwrap_or(false)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn pending_fades(&self) -> usize {
        self.fades.len()
    }

    /// Everything the controller asked of the host, in call order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Drain the effect log.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn mint(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl HostPage for PageSim {
    fn set_scroll_locked(&mut self, body: SurfaceId, locked: bool) {
        self.scroll_locks.insert(body, locked);
        self.effects.push(Effect::ScrollLock { body, locked });
    }

    fn set_opacity(&mut self, surface: SurfaceId, value: f32) {
        self.opacities.insert(surface, value);
        self.effects.push(Effect::Opacity { surface, value });
    }

    fn set_displayed(&mut self, surface: SurfaceId, displayed: bool) {
        self.displayed.insert(surface, displayed);
        self.effects.push(Effect::Displayed { surface, displayed });
    }

    fn animate(&mut self, surface: SurfaceId, fade: Fade) -> AnimationId {
        let id = AnimationId(self.mint());
        self.opacities.insert(surface, fade.from);
        self.fades.insert(
            id,
            FadeRun {
                surface,
                fade,
                started_at: self.now,
            },
        );
        self.effects.push(Effect::FadeStarted { id, surface, fade });
        id
    }

    fn cancel_animation(&mut self, id: AnimationId) {
        // Opacity freezes wherever the last advance left it.
        if self.fades.remove(&id).is_some() {
            self.effects.push(Effect::FadeCancelled(id));
        }
    }

    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.mint());
        self.timers.insert(id, self.now + delay);
        self.effects.push(Effect::TimerScheduled { id, delay });
        id
    }

    fn cancel_timer(&mut self, id: TimerId) {
        if self.timers.remove(&id).is_some() {
            self.effects.push(Effect::TimerCancelled(id));
        }
    }
}

/// Advance the page and feed every due wakeup to the modal.
pub fn pump(page: &Rc<RefCell<PageSim>>, modal: &Modal<PageSim>, step: Duration) {
    let wakeups = page.borrow_mut().advance(step);
    for wakeup in wakeups {
        modal.wake(wakeup);
    }
}

/// Proptest strategies over `scrim` inputs.
pub mod strategy {
    use proptest::prelude::*;
    use scrim::ModalOptions;

    /// Arbitrary caller options: numeric, empty, and junk fade durations,
    /// fractions around the useful range, and all flag combinations.
    pub fn modal_options() -> impl Strategy<Value = ModalOptions> {
        let fade = prop_oneof![
            Just(String::new()),
            "[0-9]{1,4}",
            "[a-z]{1,6}",
            Just("-25".to_string()),
        ];
        (
            fade,
            0.0f64..2.0f64,
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(fade_duration, fade_delay, escape, click, show)| {
                ModalOptions::default()
                    .fade_duration(fade_duration)
                    .fade_delay(fade_delay)
                    .escape_close(escape)
                    .click_close(click)
                    .show_close(show)
            })
    }
}
