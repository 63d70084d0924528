#![forbid(unsafe_code)]

//! Content presenter: the panel reveal and the close-button visibility.
//!
//! There is no hide operation. Hiding is the overlay close's job; the panel
//! keeps its last state until the next reveal.

use std::time::Duration;

use tracing::debug;

use crate::host::{AnimationId, Fade, HostPage, ModalSurfaces, SurfaceId};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Presenter {
    panel: Option<SurfaceId>,
    close_button: Option<SurfaceId>,
    close_visible: bool,
}

impl Presenter {
    pub(crate) fn new(surfaces: &ModalSurfaces) -> Self {
        Self {
            panel: surfaces.panel,
            close_button: surfaces.close_button,
            close_visible: false,
        }
    }

    pub(crate) fn close_button(&self) -> Option<SurfaceId> {
        self.close_button
    }

    /// Whether the close button has been revealed.
    pub(crate) fn close_button_visible(&self) -> bool {
        self.close_visible
    }

    /// Reveal the content panel, fading it in when a duration is given.
    ///
    /// Returns the fade handle so a superseding sequence can cancel it; the
    /// transition's completion carries no lifecycle meaning. No-op without a
    /// panel reference.
    pub(crate) fn show(
        &mut self,
        host: &mut dyn HostPage,
        fade: Option<Duration>,
        show_close: bool,
    ) -> Option<AnimationId> {
        let Some(panel) = self.panel else {
            return None;
        };

        if show_close {
            self.close_visible = true;
            if let Some(button) = self.close_button {
                host.set_displayed(button, true);
            }
        }

        match fade {
            Some(duration) => {
                debug!(?duration, "panel fade-in");
                host.set_displayed(panel, true);
                host.set_opacity(panel, 0.0);
                Some(host.animate(panel, Fade::fade_in(duration)))
            }
            None => {
                host.set_displayed(panel, true);
                host.set_opacity(panel, 1.0);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TimerId;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
        next_anim: u64,
    }

    impl HostPage for Recorder {
        fn set_scroll_locked(&mut self, _body: SurfaceId, _locked: bool) {}
        fn set_opacity(&mut self, surface: SurfaceId, value: f32) {
            self.calls.push(format!("opacity({},{value})", surface.id()));
        }
        fn set_displayed(&mut self, surface: SurfaceId, displayed: bool) {
            self.calls
                .push(format!("displayed({},{displayed})", surface.id()));
        }
        fn animate(&mut self, surface: SurfaceId, fade: Fade) -> AnimationId {
            self.next_anim += 1;
            self.calls.push(format!(
                "animate({},{}->{})",
                surface.id(),
                fade.from,
                fade.to
            ));
            AnimationId(self.next_anim)
        }
        fn cancel_animation(&mut self, _id: AnimationId) {}
        fn schedule(&mut self, _delay: Duration) -> TimerId {
            unreachable!("presenter never schedules timers")
        }
        fn cancel_timer(&mut self, _id: TimerId) {}
    }

    fn surfaces() -> ModalSurfaces {
        ModalSurfaces::new()
            .panel(SurfaceId::new(3))
            .close_button(SurfaceId::new(4))
    }

    #[test]
    fn show_without_fade_is_immediate() {
        let mut presenter = Presenter::new(&surfaces());
        let mut host = Recorder::default();
        let anim = presenter.show(&mut host, None, true);
        assert!(anim.is_none());
        assert!(presenter.close_button_visible());
        assert_eq!(
            host.calls,
            vec!["displayed(4,true)", "displayed(3,true)", "opacity(3,1)"]
        );
    }

    #[test]
    fn show_with_fade_animates_panel() {
        let mut presenter = Presenter::new(&surfaces());
        let mut host = Recorder::default();
        let anim = presenter.show(&mut host, Some(Duration::from_millis(200)), false);
        assert!(anim.is_some());
        assert!(!presenter.close_button_visible());
        assert_eq!(
            host.calls,
            vec!["displayed(3,true)", "opacity(3,0)", "animate(3,0->1)"]
        );
    }

    #[test]
    fn close_visibility_is_sticky() {
        let mut presenter = Presenter::new(&surfaces());
        let mut host = Recorder::default();
        presenter.show(&mut host, None, true);
        // Later reveals without show_close leave the flag set.
        presenter.show(&mut host, None, false);
        assert!(presenter.close_button_visible());
    }

    #[test]
    fn missing_panel_no_ops() {
        let mut presenter = Presenter::new(&ModalSurfaces::new().close_button(SurfaceId::new(4)));
        let mut host = Recorder::default();
        assert!(presenter.show(&mut host, None, true).is_none());
        assert!(host.calls.is_empty());
        assert!(!presenter.close_button_visible());
    }
}
