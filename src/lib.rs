//! Real-time person counting kernel.
//!
//! This crate samples a live camera feed, runs a pretrained object-detection
//! capability on each frame, overlays bounding boxes on a drawing surface,
//! and keeps a timestamped in-memory log of per-frame person counts that can
//! be exported as a BOM-prefixed CSV file.
//!
//! # Architecture
//!
//! The detection model, the camera, the rendering surface, and the download
//! mechanism are opaque capabilities behind traits; the crate's own logic is
//! the sampling loop and the export serializer. The scheduling model is
//! single-threaded cooperative: iterations are strictly sequential, the next
//! one armed only after the current detection pass resolves and its log
//! append completes. A slow detector lowers the sampling rate; frames are
//! never queued.
//!
//! # Module Structure
//!
//! - `frame`: camera frame sources (`FrameSource`, synthetic `stub://` backend)
//! - `detect`: detector backends (`DetectorBackend`, stub and scripted)
//! - `overlay`: drawing surface seam and overlay constants
//! - `session`: the append-only session log of timestamped counts
//! - `sampling`: the per-frame loop with cooperative cancellation
//! - `export`: CSV serialization and download sinks
//! - `controller`: bootstrap, toggle and export actions, UI wiring
//! - `ui`: the user-visible surface seam (terminal and recording impls)
//! - `config`: daemon configuration (file + env overrides)

pub mod config;
pub mod controller;
pub mod detect;
pub mod error;
pub mod export;
pub mod frame;
pub mod overlay;
pub mod sampling;
pub mod session;
pub mod ui;

pub use config::HeadcountConfig;
pub use controller::{Controller, ControllerOptions};
pub use detect::{load_backend, BoundingBox, Detection, DetectorBackend, ScriptedBackend, StubBackend};
pub use error::HeadcountError;
pub use export::{
    csv_payload, export_filename, CsvExporter, DirectoryDownloadSink, DownloadSink,
    ExportReceipt, MemoryDownloadSink, CSV_HEADER, UTF8_BOM,
};
pub use frame::{acquire_camera, CameraConfig, Frame, FrameSource, SourceStats, SyntheticCameraSource};
pub use overlay::{
    DrawCommand, DrawSurface, NullSurface, RecordingSurface, OVERLAY_COLOR, OVERLAY_LINE_WIDTH,
};
pub use sampling::{AnalysisState, SamplingLoop, TickOutcome};
pub use session::{format_timestamp, LogRecord, SessionLog};
pub use ui::{RecordingUi, TerminalUi, UiEvent, UserInterface};
