#![forbid(unsafe_code)]

//! Caller-facing options and their once-per-cycle resolution.
//!
//! [`ModalOptions`] is the partial, caller-facing value: defaults plus
//! chained setters. [`ResolvedOptions`] is the snapshot the lifecycle holds
//! for one open/close cycle; resolving again never mutates the defaults and
//! never disturbs a snapshot already in flight.
//!
//! The fade duration is kept raw: any value that does not trim and parse as
//! a finite non-negative integer silently disables fading. That is a
//! contract, not an error.

use std::time::Duration;

/// Behavior and presentation options, partial over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalOptions {
    /// Raw fade duration in milliseconds. Non-numeric ⇒ fading disabled.
    pub fade_duration: String,
    /// Fraction of the fade duration to wait before revealing the content.
    pub fade_delay: f64,
    /// Escape key dismisses.
    pub escape_close: bool,
    /// Clicking the overlay itself dismisses.
    pub click_close: bool,
    /// Reveal the close button together with the content.
    pub show_close: bool,
    /// Presentation passthrough: close-button class.
    pub close_class: String,
    /// Presentation passthrough: content panel class.
    pub modal_class: String,
    /// Presentation passthrough: overlay class.
    pub blocker_class: String,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            fade_duration: String::new(),
            fade_delay: 1.0,
            escape_close: true,
            click_close: true,
            show_close: true,
            close_class: String::new(),
            modal_class: "modal".to_string(),
            blocker_class: "jquery-modal".to_string(),
        }
    }
}

impl ModalOptions {
    /// Set the raw fade duration in milliseconds.
    pub fn fade_duration(mut self, raw: impl Into<String>) -> Self {
        self.fade_duration = raw.into();
        self
    }

    /// Set the reveal-delay fraction.
    pub fn fade_delay(mut self, fraction: f64) -> Self {
        self.fade_delay = fraction;
        self
    }

    /// Set whether Escape dismisses.
    pub fn escape_close(mut self, close: bool) -> Self {
        self.escape_close = close;
        self
    }

    /// Set whether an overlay click dismisses.
    pub fn click_close(mut self, close: bool) -> Self {
        self.click_close = close;
        self
    }

    /// Set whether the close button is revealed.
    pub fn show_close(mut self, show: bool) -> Self {
        self.show_close = show;
        self
    }

    /// Set the close-button class passthrough.
    pub fn close_class(mut self, class: impl Into<String>) -> Self {
        self.close_class = class.into();
        self
    }

    /// Set the content panel class passthrough.
    pub fn modal_class(mut self, class: impl Into<String>) -> Self {
        self.modal_class = class.into();
        self
    }

    /// Set the overlay class passthrough.
    pub fn blocker_class(mut self, class: impl Into<String>) -> Self {
        self.blocker_class = class.into();
        self
    }

    /// Resolve into the immutable per-cycle snapshot.
    #[must_use]
    pub fn resolve(&self) -> ResolvedOptions {
        ResolvedOptions {
            fade: parse_fade_duration(&self.fade_duration),
            fade_delay: self.fade_delay,
            escape_close: self.escape_close,
            click_close: self.click_close,
            show_close: self.show_close,
            presentation: Presentation {
                close_class: self.close_class.clone(),
                modal_class: self.modal_class.clone(),
                blocker_class: self.blocker_class.clone(),
            },
        }
    }
}

/// Class strings forwarded verbatim to the rendering layer.
///
/// The lifecycle never reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presentation {
    pub close_class: String,
    pub modal_class: String,
    pub blocker_class: String,
}

/// Options snapshot held for one open/close cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    /// Fade length; `None` means fading is disabled and every transition is
    /// instantaneous.
    pub fade: Option<Duration>,
    pub fade_delay: f64,
    pub escape_close: bool,
    pub click_close: bool,
    pub show_close: bool,
    pub presentation: Presentation,
}

impl ResolvedOptions {
    /// Whether fade animations run at all.
    #[must_use]
    pub fn fade_enabled(&self) -> bool {
        self.fade.is_some()
    }

    /// Delay between the overlay starting to fade in and the content reveal:
    /// `fade × fade_delay`. `None` when fading is disabled. Non-finite or
    /// negative fractions clamp to zero.
    #[must_use]
    pub fn reveal_delay(&self) -> Option<Duration> {
        let fade = self.fade?;
        let fraction = if self.fade_delay.is_finite() && self.fade_delay > 0.0 {
            self.fade_delay
        } else {
            0.0
        };
        Some(fade.mul_f64(fraction))
    }
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        ModalOptions::default().resolve()
    }
}

/// Parse a raw fade duration: trimmed, finite, non-negative integer
/// milliseconds. Anything else disables fading.
fn parse_fade_duration(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let opts = ModalOptions::default();
        assert_eq!(opts.fade_duration, "");
        assert_eq!(opts.fade_delay, 1.0);
        assert!(opts.escape_close);
        assert!(opts.click_close);
        assert!(opts.show_close);
        assert_eq!(opts.close_class, "");
        assert_eq!(opts.modal_class, "modal");
        assert_eq!(opts.blocker_class, "jquery-modal");
    }

    #[test]
    fn fade_enabled_iff_numeric() {
        assert!(
            ModalOptions::default()
                .fade_duration("300")
                .resolve()
                .fade_enabled()
        );
        assert!(!ModalOptions::default().resolve().fade_enabled());
        assert!(
            !ModalOptions::default()
                .fade_duration("abc")
                .resolve()
                .fade_enabled()
        );
        assert!(
            !ModalOptions::default()
                .fade_duration("-5")
                .resolve()
                .fade_enabled()
        );
        assert!(
            !ModalOptions::default()
                .fade_duration("300px")
                .resolve()
                .fade_enabled()
        );
        // Zero is a valid (instant-ish) fade, not a disabled one.
        assert!(
            ModalOptions::default()
                .fade_duration("0")
                .resolve()
                .fade_enabled()
        );
    }

    #[test]
    fn whitespace_is_trimmed() {
        let resolved = ModalOptions::default().fade_duration("  250 ").resolve();
        assert_eq!(resolved.fade, Some(Duration::from_millis(250)));
    }

    #[test]
    fn setters_override_defaults() {
        let resolved = ModalOptions::default()
            .fade_duration("120")
            .fade_delay(0.5)
            .escape_close(false)
            .click_close(false)
            .show_close(false)
            .modal_class("sheet")
            .resolve();
        assert_eq!(resolved.fade, Some(Duration::from_millis(120)));
        assert_eq!(resolved.fade_delay, 0.5);
        assert!(!resolved.escape_close);
        assert!(!resolved.click_close);
        assert!(!resolved.show_close);
        assert_eq!(resolved.presentation.modal_class, "sheet");
        // Untouched fields keep their defaults.
        assert_eq!(resolved.presentation.blocker_class, "jquery-modal");
    }

    #[test]
    fn resolve_does_not_mutate_source() {
        let opts = ModalOptions::default().fade_duration("80");
        let before = opts.clone();
        let _ = opts.resolve();
        let _ = opts.resolve();
        assert_eq!(opts, before);
        assert_eq!(ModalOptions::default(), ModalOptions::default());
    }

    #[test]
    fn reveal_delay_scales_by_fraction() {
        let resolved = ModalOptions::default()
            .fade_duration("300")
            .fade_delay(0.5)
            .resolve();
        assert_eq!(resolved.reveal_delay(), Some(Duration::from_millis(150)));

        let full = ModalOptions::default().fade_duration("300").resolve();
        assert_eq!(full.reveal_delay(), Some(Duration::from_millis(300)));

        let none = ModalOptions::default().resolve();
        assert_eq!(none.reveal_delay(), None);
    }

    #[test]
    fn reveal_delay_clamps_bad_fractions() {
        for bad in [-1.0, f64::NAN, f64::NEG_INFINITY, f64::INFINITY] {
            let resolved = ModalOptions::default()
                .fade_duration("300")
                .fade_delay(bad)
                .resolve();
            assert_eq!(
                resolved.reveal_delay(),
                Some(Duration::ZERO),
                "fraction {bad} must clamp to zero"
            );
        }
    }
}
