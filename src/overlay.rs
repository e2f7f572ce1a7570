//! Overlay drawing surface.
//!
//! The rendering target is an opaque capability with two primitives: blit
//! the current frame at native dimensions, then stroke one rectangle per
//! matching detection. The sampling loop issues commands in that order every
//! iteration.

use crate::detect::BoundingBox;
use crate::frame::Frame;

/// Stroke color for detection overlays.
pub const OVERLAY_COLOR: &str = "red";
/// Stroke width for detection overlays.
pub const OVERLAY_LINE_WIDTH: f32 = 2.0;

/// A drawing surface the loop renders onto.
pub trait DrawSurface {
    /// Draw the frame at its native dimensions. The surface adopts the
    /// frame's dimensions, the way a canvas is sized to the video feed.
    fn draw_frame(&mut self, frame: &Frame);

    /// Stroke one detection rectangle over the last drawn frame.
    fn stroke_rect(&mut self, bbox: BoundingBox, color: &str, line_width: f32);
}

/// Shared-handle surfaces, so a test can keep inspecting a surface after the
/// loop has taken ownership of its handle.
impl<S: DrawSurface> DrawSurface for std::rc::Rc<std::cell::RefCell<S>> {
    fn draw_frame(&mut self, frame: &Frame) {
        self.borrow_mut().draw_frame(frame);
    }

    fn stroke_rect(&mut self, bbox: BoundingBox, color: &str, line_width: f32) {
        self.borrow_mut().stroke_rect(bbox, color, line_width);
    }
}

// ----------------------------------------------------------------------------
// Recording surface (tests)
// ----------------------------------------------------------------------------

/// One draw command captured by `RecordingSurface`.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Frame { width: u32, height: u32 },
    Rect {
        bbox: BoundingBox,
        color: String,
        line_width: f32,
    },
}

/// Surface that records every command for assertions.
#[derive(Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Rectangles stroked since creation.
    pub fn rect_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count()
    }

    /// Dimensions adopted from the most recent frame, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.commands.iter().rev().find_map(|c| match c {
            DrawCommand::Frame { width, height } => Some((*width, *height)),
            _ => None,
        })
    }
}

impl DrawSurface for RecordingSurface {
    fn draw_frame(&mut self, frame: &Frame) {
        self.commands.push(DrawCommand::Frame {
            width: frame.width,
            height: frame.height,
        });
    }

    fn stroke_rect(&mut self, bbox: BoundingBox, color: &str, line_width: f32) {
        self.commands.push(DrawCommand::Rect {
            bbox,
            color: color.to_string(),
            line_width,
        });
    }
}

// ----------------------------------------------------------------------------
// Null surface (daemon)
// ----------------------------------------------------------------------------

/// Surface that discards pixels but keeps counters, for headless runs.
#[derive(Default)]
pub struct NullSurface {
    frames_drawn: u64,
    rects_drawn: u64,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn rects_drawn(&self) -> u64 {
        self.rects_drawn
    }
}

impl DrawSurface for NullSurface {
    fn draw_frame(&mut self, _frame: &Frame) {
        self.frames_drawn += 1;
    }

    fn stroke_rect(&mut self, _bbox: BoundingBox, _color: &str, _line_width: f32) {
        self.rects_drawn += 1;
    }
}
