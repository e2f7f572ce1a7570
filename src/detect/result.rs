/// One labeled bounding box produced by the detector for a single frame.
///
/// Transient: detections are discarded after the frame they belong to is
/// processed; only the derived count survives in the session log.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Class identifier as reported by the model (e.g. "person", "car").
    pub label: String,
    /// Box in frame pixel coordinates.
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            bbox,
        }
    }
}

/// Axis-aligned box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}
