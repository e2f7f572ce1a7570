//! Camera frame sources.
//!
//! This module provides the `FrameSource` seam between the sampling loop and
//! the host camera subsystem:
//!
//! - `Frame`: one still image sampled from the live feed
//! - `FrameSource`: trait exposing the continuously updating current frame
//! - `acquire_camera`: acquisition entry point, with a synthetic backend for
//!   `stub://` URLs and a simulated permission denial for `denied://` URLs
//!
//! Acquisition failures distinguish permission denial from other errors so
//! the controller can surface the right guidance text.

use crate::error::HeadcountError;

/// One still image sampled from the live camera feed.
#[derive(Clone, Debug)]
pub struct Frame {
    /// RGB pixel data, row-major.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// A live frame source.
///
/// `current_frame` returns `None` when the feed is paused or has ended; the
/// sampling loop treats that as a signal to self-terminate until restarted.
pub trait FrameSource: std::fmt::Debug {
    /// Capture the current frame, or `None` when the feed is paused/ended.
    fn current_frame(&mut self) -> Option<Frame>;

    /// Frame statistics for health logging.
    fn stats(&self) -> SourceStats;
}

/// Statistics for a frame source.
#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub url: String,
}

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Camera URL. `stub://` selects the synthetic source; `denied://`
    /// simulates a permission denial at acquisition time.
    pub url: String,
    /// Target frame rate (frames per second). The daemon paces to this rate.
    pub target_fps: u32,
    /// Frame width (for synthetic frames).
    pub width: u32,
    /// Frame height (for synthetic frames).
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "stub://front_camera".to_string(),
            target_fps: 30,
            width: 640,
            height: 480,
        }
    }
}

/// Acquire a camera source for the configured URL.
///
/// Real device backends are host-environment concerns; this build ships the
/// synthetic source only. Unknown schemes fail with a non-permission camera
/// error so the controller surfaces them as "device unavailable".
pub fn acquire_camera(config: CameraConfig) -> Result<Box<dyn FrameSource>, HeadcountError> {
    if config.url.starts_with("stub://") {
        log::info!("camera: connected to {} (synthetic)", config.url);
        return Ok(Box::new(SyntheticCameraSource::new(config)));
    }
    if config.url.starts_with("denied://") {
        return Err(HeadcountError::CameraAccess {
            message: format!("camera access was not granted for {}", config.url),
            permission_denied: true,
        });
    }
    Err(HeadcountError::CameraAccess {
        message: format!("no camera backend available for {}", config.url),
        permission_denied: false,
    })
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests and the demo pipeline
// ----------------------------------------------------------------------------

/// Synthetic camera source.
///
/// Generates deterministic-shape pixel data with occasional scene changes,
/// standing in for a live feed. Can be capped to a fixed number of frames to
/// simulate a feed that ends.
#[derive(Debug)]
pub struct SyntheticCameraSource {
    config: CameraConfig,
    frame_count: u64,
    /// Simulated scene state; bumped occasionally so consecutive frames are
    /// not identical forever.
    scene_state: u8,
    /// When set, the source reports no frame after this many captures.
    ends_after: Option<u64>,
}

impl SyntheticCameraSource {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            scene_state: 0,
            ends_after: None,
        }
    }

    /// Cap the source to `frames` captures, after which the feed reports as
    /// ended. Used to exercise the loop's self-termination path.
    pub fn with_end_after(mut self, frames: u64) -> Self {
        self.ends_after = Some(frames);
        self
    }

    fn generate_pixels(&mut self) -> Vec<u8> {
        let pixel_count = (self.config.width * self.config.height * 3) as usize; // RGB

        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }

        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count + self.scene_state as u64) % 256) as u8;
        }
        pixels
    }
}

impl FrameSource for SyntheticCameraSource {
    fn current_frame(&mut self) -> Option<Frame> {
        if let Some(limit) = self.ends_after {
            if self.frame_count >= limit {
                return None;
            }
        }
        self.frame_count += 1;
        let pixels = self.generate_pixels();
        Some(Frame {
            pixels,
            width: self.config.width,
            height: self.config.height,
        })
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_config() -> CameraConfig {
        CameraConfig {
            url: "stub://test".to_string(),
            target_fps: 30,
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn synthetic_source_produces_frames() {
        let mut source = SyntheticCameraSource::new(stub_config());

        let frame = source.current_frame().expect("frame");
        assert_eq!(frame.width, 640);
        assert_eq!(frame.height, 480);
        assert_eq!(frame.pixels.len(), 640 * 480 * 3);
        assert_eq!(source.stats().frames_captured, 1);
    }

    #[test]
    fn synthetic_source_ends_after_cap() {
        let mut source = SyntheticCameraSource::new(stub_config()).with_end_after(2);

        assert!(source.current_frame().is_some());
        assert!(source.current_frame().is_some());
        assert!(source.current_frame().is_none());
        assert!(source.current_frame().is_none());
    }

    #[test]
    fn acquire_stub_url_succeeds() {
        let mut source = acquire_camera(stub_config()).expect("synthetic camera");
        assert!(source.current_frame().is_some());
    }

    #[test]
    fn acquire_denied_url_is_permission_denied() {
        let config = CameraConfig {
            url: "denied://front_camera".to_string(),
            ..stub_config()
        };
        let err = acquire_camera(config).expect_err("denied");
        assert!(err.is_permission_denied());
    }

    #[test]
    fn acquire_unknown_scheme_is_not_permission_denied() {
        let config = CameraConfig {
            url: "rtsp://camera-1".to_string(),
            ..stub_config()
        };
        let err = acquire_camera(config).expect_err("unavailable");
        assert!(!err.is_permission_denied());
    }
}
