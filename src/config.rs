use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::frame::CameraConfig;

const DEFAULT_DETECTOR_BACKEND: &str = "stub";
const DEFAULT_TARGET_LABEL: &str = "person";
const DEFAULT_CAMERA_URL: &str = "stub://front_camera";
const DEFAULT_TARGET_FPS: u32 = 30;
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_TOAST_MS: u64 = 3000;

#[derive(Debug, Deserialize, Default)]
struct HeadcountConfigFile {
    detector: Option<DetectorConfigFile>,
    camera: Option<CameraConfigFile>,
    export: Option<ExportConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    target_label: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ExportConfigFile {
    output_dir: Option<PathBuf>,
    toast_ms: Option<u64>,
}

/// Daemon configuration: defaults, then config file, then env overrides.
#[derive(Debug, Clone)]
pub struct HeadcountConfig {
    pub detector_backend: String,
    pub target_label: String,
    pub camera: CameraConfig,
    pub output_dir: PathBuf,
    pub toast: Duration,
}

impl HeadcountConfig {
    pub fn load() -> Result<Self> {
        Self::load_path(None)
    }

    /// Load with an explicit config file path. `None` falls back to the
    /// `HEADCOUNT_CONFIG` env var, then defaults.
    pub fn load_path(config_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("HEADCOUNT_CONFIG").ok();
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| env_path.map(PathBuf::from));
        let file_cfg = match path {
            Some(path) => Some(read_config_file(&path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: HeadcountConfigFile) -> Self {
        let detector_backend = file
            .detector
            .as_ref()
            .and_then(|detector| detector.backend.clone())
            .unwrap_or_else(|| DEFAULT_DETECTOR_BACKEND.to_string());
        let target_label = file
            .detector
            .and_then(|detector| detector.target_label)
            .unwrap_or_else(|| DEFAULT_TARGET_LABEL.to_string());
        let camera = CameraConfig {
            url: file
                .camera
                .as_ref()
                .and_then(|camera| camera.url.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_URL.to_string()),
            target_fps: file
                .camera
                .as_ref()
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_TARGET_FPS),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_WIDTH),
            height: file
                .camera
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_HEIGHT),
        };
        let output_dir = file
            .export
            .as_ref()
            .and_then(|export| export.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let toast = Duration::from_millis(
            file.export
                .and_then(|export| export.toast_ms)
                .unwrap_or(DEFAULT_TOAST_MS),
        );
        Self {
            detector_backend,
            target_label,
            camera,
            output_dir,
            toast,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(backend) = std::env::var("HEADCOUNT_DETECTOR_BACKEND") {
            if !backend.trim().is_empty() {
                self.detector_backend = backend;
            }
        }
        if let Ok(label) = std::env::var("HEADCOUNT_TARGET_LABEL") {
            if !label.trim().is_empty() {
                self.target_label = label;
            }
        }
        if let Ok(url) = std::env::var("HEADCOUNT_CAMERA_URL") {
            if !url.trim().is_empty() {
                self.camera.url = url;
            }
        }
        if let Ok(fps) = std::env::var("HEADCOUNT_TARGET_FPS") {
            let fps: u32 = fps
                .parse()
                .map_err(|_| anyhow!("HEADCOUNT_TARGET_FPS must be an integer"))?;
            self.camera.target_fps = fps;
        }
        if let Ok(dir) = std::env::var("HEADCOUNT_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(toast) = std::env::var("HEADCOUNT_TOAST_MS") {
            let millis: u64 = toast
                .parse()
                .map_err(|_| anyhow!("HEADCOUNT_TOAST_MS must be an integer number of ms"))?;
            self.toast = Duration::from_millis(millis);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.detector_backend.trim().is_empty() {
            return Err(anyhow!("detector backend must not be empty"));
        }
        if self.target_label.trim().is_empty() {
            return Err(anyhow!("target label must not be empty"));
        }
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be greater than zero"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<HeadcountConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
