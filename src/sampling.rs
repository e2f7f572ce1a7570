//! Real-time sampling loop.
//!
//! One iteration per displayed frame: pull the current frame, run one
//! detection pass, draw the frame and one stroked rectangle per target-class
//! detection, publish the count, append one record to the session log, and
//! re-arm for the next iteration.
//!
//! Ordering contract: iterations are strictly sequential. The next iteration
//! is armed only after the current detection call resolves and its log append
//! completes, so no two detection calls are ever in flight and records land
//! in frame order. If the detector is slower than the display refresh rate,
//! the effective sampling rate drops; frames are never queued.
//!
//! Cancellation is cooperative at the scheduling boundary: `stop()`
//! invalidates the armed schedule handle. An iteration already past that
//! check completes once (its record is appended) and does not re-arm.

use crate::detect::DetectorBackend;
use crate::error::HeadcountError;
use crate::frame::FrameSource;
use crate::overlay::{DrawSurface, OVERLAY_COLOR, OVERLAY_LINE_WIDTH};
use crate::session::{LogRecord, SessionLog};
use crate::ui::UserInterface;

/// Whether the loop is actively scheduling iterations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Analyzing,
}

/// Outcome of one driver tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was analyzed and one record appended.
    Processed { count: u32 },
    /// Nothing was armed, or the feed had no current frame; the loop is
    /// disarmed until restarted.
    Skipped,
    /// The detection call failed and the loop stopped.
    Stopped,
}

/// The per-frame sampling loop.
///
/// Owns the detector, the frame source, and the drawing surface; borrows the
/// session log and UI per tick so the controller keeps ownership of both.
pub struct SamplingLoop {
    detector: Box<dyn DetectorBackend>,
    source: Box<dyn FrameSource>,
    surface: Box<dyn DrawSurface>,
    target_label: String,
    state: AnalysisState,
    /// Bumped by `stop()`; a pending schedule from an older generation is
    /// dead (the cancelAnimationFrame analog).
    generation: u64,
    /// The armed schedule handle, when an iteration is pending.
    armed: Option<u64>,
}

impl SamplingLoop {
    pub fn new(
        detector: Box<dyn DetectorBackend>,
        source: Box<dyn FrameSource>,
        surface: Box<dyn DrawSurface>,
        target_label: impl Into<String>,
    ) -> Self {
        Self {
            detector,
            source,
            surface,
            target_label: target_label.into(),
            state: AnalysisState::Idle,
            generation: 0,
            armed: None,
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn is_analyzing(&self) -> bool {
        self.state == AnalysisState::Analyzing
    }

    /// True when an iteration is scheduled.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Frame statistics from the underlying source.
    pub fn source_stats(&self) -> crate::frame::SourceStats {
        self.source.stats()
    }

    /// Transition to analyzing and arm the first iteration.
    pub fn start(&mut self) {
        self.state = AnalysisState::Analyzing;
        self.armed = Some(self.generation);
        log::info!("analysis started");
    }

    /// Transition to idle and cancel any pending iteration. No further
    /// frames are processed after this returns.
    pub fn stop(&mut self) {
        self.state = AnalysisState::Idle;
        self.generation = self.generation.wrapping_add(1);
        self.armed = None;
        log::info!("analysis stopped");
    }

    /// Run one scheduled iteration, if one is armed and still valid.
    ///
    /// On detection failure the loop transitions to idle, disarms, and
    /// returns the error; the controller surfaces it as a visible
    /// "analysis stopped unexpectedly" state rather than dying silently.
    pub fn tick(
        &mut self,
        log: &mut SessionLog,
        ui: &mut dyn UserInterface,
    ) -> Result<TickOutcome, HeadcountError> {
        let Some(scheduled) = self.armed.take() else {
            return Ok(TickOutcome::Skipped);
        };
        if scheduled != self.generation || self.state != AnalysisState::Analyzing {
            return Ok(TickOutcome::Skipped);
        }

        // Paused/ended feed: no work, no re-arm. The loop self-terminates
        // until restarted.
        let Some(frame) = self.source.current_frame() else {
            log::debug!("frame source has no current frame; loop disarmed");
            return Ok(TickOutcome::Skipped);
        };

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                self.state = AnalysisState::Idle;
                self.generation = self.generation.wrapping_add(1);
                log::error!("detection failed, analysis stopped: {:#}", e);
                return Err(HeadcountError::Detection(e.to_string()));
            }
        };

        self.surface.draw_frame(&frame);
        let mut count = 0u32;
        for detection in &detections {
            if detection.label == self.target_label {
                count += 1;
                self.surface
                    .stroke_rect(detection.bbox, OVERLAY_COLOR, OVERLAY_LINE_WIDTH);
            }
        }

        ui.set_count(count);
        log.append(LogRecord::now(count));

        // Re-arm only after the append completed and only if nothing stopped
        // us mid-flight.
        if self.state == AnalysisState::Analyzing && self.generation == scheduled {
            self.armed = Some(self.generation);
        }

        Ok(TickOutcome::Processed { count })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
