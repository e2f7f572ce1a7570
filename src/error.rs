use thiserror::Error;

/// Session-level error taxonomy.
///
/// Initialization and camera errors are fatal to bootstrap; the empty-export
/// condition is recoverable; detection failures stop the sampling loop but do
/// not unwind the controller.
#[derive(Debug, Error)]
pub enum HeadcountError {
    /// Detector backend failed to load. Fatal to the whole session; the user
    /// must restart the daemon.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Camera acquisition failed. Fatal to the analysis feature; controls
    /// stay disabled.
    #[error("camera access failed: {message}")]
    CameraAccess {
        message: String,
        /// True when the failure is a permission denial rather than a missing
        /// or broken device. Surfaced with its own guidance text.
        permission_denied: bool,
    },

    /// Export requested with no records. Recoverable, no state change.
    #[error("no records to export")]
    EmptyExport,

    /// The download sink rejected the export payload.
    #[error("export failed: {0}")]
    Export(String),

    /// A per-frame detection call failed. Stops the loop.
    #[error("detection failed: {0}")]
    Detection(String),
}

impl HeadcountError {
    /// True for camera failures caused by a permission denial.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            HeadcountError::CameraAccess {
                permission_denied: true,
                ..
            }
        )
    }
}
