use std::collections::VecDeque;

use anyhow::{anyhow, Result};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;
use crate::frame::Frame;

/// Scripted backend for tests. Replays a queue of canned detection results
/// so loop behavior can be pinned against known per-frame outcomes; never
/// touches a real model.
pub struct ScriptedBackend {
    responses: VecDeque<Result<Vec<Detection>>>,
    calls: u64,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            calls: 0,
        }
    }

    /// Queue one successful detection pass.
    pub fn push_detections(&mut self, detections: Vec<Detection>) -> &mut Self {
        self.responses.push_back(Ok(detections));
        self
    }

    /// Queue one failing detection pass.
    pub fn push_failure(&mut self, message: &str) -> &mut Self {
        self.responses.push_back(Err(anyhow!("{}", message)));
        self
    }

    /// Number of detection calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>> {
        self.calls += 1;
        self.responses
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
