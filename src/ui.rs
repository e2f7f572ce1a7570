//! User-visible surface.
//!
//! The original surface is a page with a toggle button, a live count, an
//! analyzing indicator, a blocking loading indicator, blocking alerts, and an
//! auto-dismissing toast. `UserInterface` is that surface as a seam; the
//! daemon renders it on a terminal, tests record it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// The user-visible surface driven by the controller and the sampling loop.
pub trait UserInterface {
    /// Blocking loading indicator shown while the detector and camera load.
    fn loading_started(&mut self);
    fn loading_finished(&mut self);

    /// Replace the loading indicator with a fixed error label.
    fn loading_failed(&mut self, label: &str);

    /// Toggle/export actions become available (both bootstrap stages passed).
    fn controls_enabled(&mut self);

    /// Live person-count display.
    fn set_count(&mut self, count: u32);

    /// Analyzing activity indicator and toggle label state.
    fn set_analyzing(&mut self, analyzing: bool);

    /// Blocking alert-style message.
    fn alert(&mut self, message: &str);

    /// Transient confirmation, auto-dismissing after `duration`.
    fn toast(&mut self, message: &str, duration: Duration);
}

/// Shared-handle surfaces, so a test can keep inspecting the UI after the
/// controller has taken ownership of its handle.
impl<U: UserInterface> UserInterface for Rc<RefCell<U>> {
    fn loading_started(&mut self) {
        self.borrow_mut().loading_started();
    }

    fn loading_finished(&mut self) {
        self.borrow_mut().loading_finished();
    }

    fn loading_failed(&mut self, label: &str) {
        self.borrow_mut().loading_failed(label);
    }

    fn controls_enabled(&mut self) {
        self.borrow_mut().controls_enabled();
    }

    fn set_count(&mut self, count: u32) {
        self.borrow_mut().set_count(count);
    }

    fn set_analyzing(&mut self, analyzing: bool) {
        self.borrow_mut().set_analyzing(analyzing);
    }

    fn alert(&mut self, message: &str) {
        self.borrow_mut().alert(message);
    }

    fn toast(&mut self, message: &str, duration: Duration) {
        self.borrow_mut().toast(message, duration);
    }
}

// ----------------------------------------------------------------------------
// Terminal UI (daemon)
// ----------------------------------------------------------------------------

/// Terminal rendering of the surface: an indicatif spinner for the loading
/// indicator, log lines for everything else. The count is logged only when
/// it changes so a 30 fps loop does not flood stderr.
pub struct TerminalUi {
    pretty: bool,
    spinner: Option<ProgressBar>,
    last_count: Option<u32>,
}

impl TerminalUi {
    pub fn new(pretty: bool) -> Self {
        Self {
            pretty,
            spinner: None,
            last_count: None,
        }
    }

    /// Resolve an explicit mode flag (`auto`/`plain`/`pretty`). `auto` (or
    /// anything unrecognized) uses the pretty spinner only on a terminal.
    pub fn from_args(ui_flag: Option<&str>, is_tty: bool) -> Self {
        let pretty = match ui_flag {
            Some("plain") => false,
            Some("pretty") => true,
            _ => is_tty,
        };
        Self::new(pretty)
    }
}

impl UserInterface for TerminalUi {
    fn loading_started(&mut self) {
        if self.pretty {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            spinner.set_style(style);
            spinner.set_message("loading detector and camera…");
            self.spinner = Some(spinner);
        } else {
            eprintln!("==> loading detector and camera");
        }
    }

    fn loading_finished(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message("✔ detector and camera ready");
        } else {
            eprintln!("✔ detector and camera ready");
        }
    }

    fn loading_failed(&mut self, label: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("✖ {label}"));
        } else {
            eprintln!("✖ {label}");
        }
    }

    fn controls_enabled(&mut self) {
        log::info!("controls enabled");
    }

    fn set_count(&mut self, count: u32) {
        if self.last_count != Some(count) {
            log::info!("persons visible: {}", count);
            self.last_count = Some(count);
        }
    }

    fn set_analyzing(&mut self, analyzing: bool) {
        if analyzing {
            log::info!("analyzing…");
        } else {
            log::info!("analysis idle");
        }
    }

    fn alert(&mut self, message: &str) {
        log::error!("{}", message);
    }

    fn toast(&mut self, message: &str, duration: Duration) {
        // A terminal line has nothing to dismiss; the duration is advisory.
        log::info!("{} ({}ms)", message, duration.as_millis());
    }
}

// ----------------------------------------------------------------------------
// Recording UI (tests)
// ----------------------------------------------------------------------------

/// One surface event captured by `RecordingUi`.
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    LoadingStarted,
    LoadingFinished,
    LoadingFailed(String),
    ControlsEnabled,
    Count(u32),
    Analyzing(bool),
    Alert(String),
    Toast(String, Duration),
}

/// Surface that records every event for assertions.
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Vec<UiEvent>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[UiEvent] {
        &self.events
    }

    pub fn alerts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Alert(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn toasts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Toast(message, _) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn counts(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Count(count) => Some(*count),
                _ => None,
            })
            .collect()
    }

    pub fn controls_are_enabled(&self) -> bool {
        self.events.contains(&UiEvent::ControlsEnabled)
    }

    pub fn last_analyzing(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|e| match e {
            UiEvent::Analyzing(on) => Some(*on),
            _ => None,
        })
    }
}

impl UserInterface for RecordingUi {
    fn loading_started(&mut self) {
        self.events.push(UiEvent::LoadingStarted);
    }

    fn loading_finished(&mut self) {
        self.events.push(UiEvent::LoadingFinished);
    }

    fn loading_failed(&mut self, label: &str) {
        self.events.push(UiEvent::LoadingFailed(label.to_string()));
    }

    fn controls_enabled(&mut self) {
        self.events.push(UiEvent::ControlsEnabled);
    }

    fn set_count(&mut self, count: u32) {
        self.events.push(UiEvent::Count(count));
    }

    fn set_analyzing(&mut self, analyzing: bool) {
        self.events.push(UiEvent::Analyzing(analyzing));
    }

    fn alert(&mut self, message: &str) {
        self.events.push(UiEvent::Alert(message.to_string()));
    }

    fn toast(&mut self, message: &str, duration: Duration) {
        self.events.push(UiEvent::Toast(message.to_string(), duration));
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_mode_flag_overrides_tty_detection() {
        assert!(!TerminalUi::from_args(Some("plain"), true).pretty);
        assert!(TerminalUi::from_args(Some("pretty"), false).pretty);
        assert!(TerminalUi::from_args(Some("auto"), true).pretty);
        assert!(!TerminalUi::from_args(None, false).pretty);
    }
}
