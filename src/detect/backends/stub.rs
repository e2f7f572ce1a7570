use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{BoundingBox, Detection};
use crate::frame::Frame;

/// Stub backend for the synthetic pipeline. Derives a deterministic set of
/// detections from a pixel hash, so the same frame always yields the same
/// boxes and counts vary across a synthetic scene.
pub struct StubBackend {
    frames_seen: u64,
}

impl StubBackend {
    pub fn new() -> Self {
        Self { frames_seen: 0 }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        self.frames_seen += 1;

        let hash: [u8; 32] = Sha256::digest(&frame.pixels).into();

        // 0..=3 synthetic persons, box positions derived from the hash.
        let person_count = (hash[0] % 4) as usize;
        let mut detections = Vec::with_capacity(person_count + 1);
        for i in 0..person_count {
            let seed = hash[i + 1] as f32;
            detections.push(Detection::new(
                "person",
                BoundingBox::new(
                    seed % frame.width as f32,
                    (seed * 1.7) % frame.height as f32,
                    48.0,
                    120.0,
                ),
            ));
        }

        // Occasionally a non-person object, to exercise label filtering.
        if hash[5] % 3 == 0 {
            detections.push(Detection::new(
                "car",
                BoundingBox::new(10.0, 10.0, 160.0, 90.0),
            ));
        }

        Ok(detections)
    }
}
