//! Session controller.
//!
//! Owns the analysis state, the session log, and the user-visible surface.
//! Wires the two user actions (`toggle`, `export_now`) to the sampling loop
//! and the CSV exporter, and runs page-load bootstrap: detector first, then
//! camera, with controls enabled only once both succeed.

use std::time::Duration;

use crate::detect::DetectorBackend;
use crate::error::HeadcountError;
use crate::export::{CsvExporter, DownloadSink};
use crate::frame::FrameSource;
use crate::overlay::DrawSurface;
use crate::sampling::{SamplingLoop, TickOutcome};
use crate::session::SessionLog;
use crate::ui::UserInterface;

const DEFAULT_TOAST: Duration = Duration::from_millis(3000);

/// Controller options not tied to a capability.
#[derive(Clone, Debug)]
pub struct ControllerOptions {
    /// Detection class that counts toward the total.
    pub target_label: String,
    /// How long the export confirmation toast stays up.
    pub toast: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            target_label: "person".to_string(),
            toast: DEFAULT_TOAST,
        }
    }
}

/// The session controller.
pub struct Controller {
    sampler: SamplingLoop,
    exporter: CsvExporter,
    log: SessionLog,
    ui: Box<dyn UserInterface>,
    controls_enabled: bool,
    toast: Duration,
}

impl Controller {
    /// Page-load bootstrap.
    ///
    /// Acquires the detector, then the camera. Either failure is terminal:
    /// it is surfaced as a blocking alert (permission denial with its own
    /// guidance), the loading indicator becomes a fixed error label, and the
    /// error propagates so the caller knows controls never came up.
    pub fn bootstrap(
        mut ui: Box<dyn UserInterface>,
        load_detector: impl FnOnce() -> Result<Box<dyn DetectorBackend>, HeadcountError>,
        open_camera: impl FnOnce() -> Result<Box<dyn FrameSource>, HeadcountError>,
        surface: Box<dyn DrawSurface>,
        sink: Box<dyn DownloadSink>,
        options: ControllerOptions,
    ) -> Result<Self, HeadcountError> {
        ui.loading_started();

        let mut detector = match load_detector() {
            Ok(detector) => detector,
            Err(e) => {
                ui.alert(&format!(
                    "Initialization failed: {}. Restart the daemon and try again.",
                    e
                ));
                ui.loading_failed("initialization error");
                return Err(e);
            }
        };
        if let Err(e) = detector.warm_up() {
            let e = HeadcountError::Initialization(format!("{:#}", e));
            ui.alert(&format!(
                "Initialization failed: {}. Restart the daemon and try again.",
                e
            ));
            ui.loading_failed("initialization error");
            return Err(e);
        }
        log::info!("detector backend '{}' loaded", detector.name());

        let source = match open_camera() {
            Ok(source) => source,
            Err(e) => {
                if e.is_permission_denied() {
                    ui.alert(
                        "Camera access was not granted. \
                         Check your camera permissions and allow access.",
                    );
                } else {
                    ui.alert(&format!("{}", e));
                }
                ui.loading_failed("camera unavailable");
                return Err(e);
            }
        };

        ui.loading_finished();
        ui.controls_enabled();

        Ok(Self {
            sampler: SamplingLoop::new(detector, source, surface, options.target_label),
            exporter: CsvExporter::new(sink),
            log: SessionLog::new(),
            ui,
            controls_enabled: true,
            toast: options.toast,
        })
    }

    /// Flip the analysis state, starting or stopping the sampling loop and
    /// updating the analyzing indicator.
    pub fn toggle(&mut self) {
        if !self.controls_enabled {
            log::warn!("toggle ignored: controls are disabled");
            return;
        }
        if self.sampler.is_analyzing() {
            self.sampler.stop();
            self.ui.set_analyzing(false);
        } else {
            self.sampler.start();
            self.ui.set_analyzing(true);
        }
    }

    /// Export the current log as CSV.
    ///
    /// Empty log and sink failures are surfaced as alerts; success shows the
    /// auto-dismissing confirmation toast.
    pub fn export_now(&mut self) {
        if !self.controls_enabled {
            log::warn!("export ignored: controls are disabled");
            return;
        }
        match self.exporter.export(&mut self.log) {
            Ok(receipt) => {
                self.ui.toast(
                    &format!(
                        "Export complete: {} ({} records)",
                        receipt.filename, receipt.records_exported
                    ),
                    self.toast,
                );
            }
            Err(HeadcountError::EmptyExport) => {
                self.ui
                    .alert("No records to export. Start analysis first.");
            }
            Err(e) => {
                self.ui.alert(&format!("{}", e));
            }
        }
    }

    /// Drive one scheduled loop iteration.
    ///
    /// A detection failure stops the loop and is surfaced as a visible
    /// "analysis stopped unexpectedly" state rather than dying silently.
    pub fn tick(&mut self) -> TickOutcome {
        match self.sampler.tick(&mut self.log, self.ui.as_mut()) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.ui.set_analyzing(false);
                self.ui
                    .alert(&format!("Analysis stopped unexpectedly: {}", e));
                TickOutcome::Stopped
            }
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.sampler.is_analyzing()
    }

    /// True while an iteration is scheduled; the driver can sleep between
    /// ticks and stop pumping once the loop disarms.
    pub fn is_armed(&self) -> bool {
        self.sampler.is_armed()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn source_stats(&self) -> crate::frame::SourceStats {
        self.sampler.source_stats()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
