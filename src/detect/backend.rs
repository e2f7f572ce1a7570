use anyhow::Result;

use crate::detect::backends::{ScriptedBackend, StubBackend};
use crate::detect::result::Detection;
use crate::error::HeadcountError;
use crate::frame::Frame;

/// Detector backend trait.
///
/// The pretrained model is an opaque capability: one frame in, a list of
/// labeled bounding boxes out. Implementations may block while the model
/// runs; the sampling loop never issues a second call while one is in
/// flight, so a slow backend lowers the effective sampling rate rather than
/// queuing frames.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;

    /// Optional warm-up hook, called once at bootstrap.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Load a detector backend by name.
///
/// Model loading is the first bootstrap stage and may fail; failures are
/// fatal to the session. Real model backends are deployment concerns; this
/// build ships the synthetic backends only.
pub fn load_backend(name: &str) -> Result<Box<dyn DetectorBackend>, HeadcountError> {
    match name {
        "stub" => Ok(Box::new(StubBackend::new())),
        "scripted" => Ok(Box::new(ScriptedBackend::new())),
        other => Err(HeadcountError::Initialization(format!(
            "unknown detector backend '{}'",
            other
        ))),
    }
}
