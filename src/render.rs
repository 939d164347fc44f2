//! Drawing contract between the engine and whatever displays the canvas.
//!
//! The engine never touches pixels. It hands image-space boxes and the
//! current [`ScaleTransform`] to a [`RenderSurface`], which owns the actual
//! drawing (a browser canvas, a GPU overlay, or the [`RecordingSurface`]
//! used headlessly).

use serde::{Deserialize, Serialize};

use crate::config::SurfaceStyle;
use crate::geometry::{BoundingBox, Point, ScaleTransform, Size};
use crate::model::Annotation;

/// Drawing capabilities the engine depends on.
pub trait RenderSurface {
    /// Clear a display-space region.
    fn clear_region(&mut self, rect: BoundingBox);

    /// Stroke the outline of an image-space box scaled by `scale`.
    fn stroke_rect(&mut self, rect: &BoundingBox, scale: ScaleTransform, color: &str);

    /// Draw a text label anchored at an image-space point scaled by `scale`.
    fn draw_label_text(&mut self, text: &str, anchor: Point, scale: ScaleTransform, color: &str);
}

/// Everything one redraw needs, borrowed from the engine.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Display-space size of the canvas
    pub container: Size,
    /// Image-space to display-space scale
    pub transform: ScaleTransform,
    /// Committed annotations in insertion order
    pub annotations: &'a [Annotation],
    /// Draft waiting for a label, drawn after committed boxes
    pub pending: Option<&'a Annotation>,
    /// Live drag rectangle, drawn last
    pub preview: Option<&'a Annotation>,
}

/// Clear the whole canvas and draw a frame.
///
/// Order: committed annotations in insertion order, then the pending draft,
/// then the live drag preview so it ends up on top. Degenerate boxes are
/// skipped.
pub fn redraw<S: RenderSurface + ?Sized>(surface: &mut S, frame: &Frame<'_>) {
    surface.clear_region(BoundingBox::new(
        0.0,
        0.0,
        frame.container.width,
        frame.container.height,
    ));

    let mut drawn = 0usize;
    let all = frame
        .annotations
        .iter()
        .chain(frame.pending)
        .chain(frame.preview);
    for annotation in all {
        if draw_annotation(surface, annotation, frame.transform) {
            drawn += 1;
        }
    }
    log::trace!("Redraw: {} box(es)", drawn);
}

fn draw_annotation<S: RenderSurface + ?Sized>(
    surface: &mut S,
    annotation: &Annotation,
    transform: ScaleTransform,
) -> bool {
    if annotation.bbox.is_degenerate() {
        return false;
    }
    surface.stroke_rect(&annotation.bbox, transform, &annotation.color);
    if let Some(id) = annotation.id() {
        surface.draw_label_text(id, annotation.bbox.top_left(), transform, &annotation.color);
    }
    true
}

/// A single resolved drawing operation, in display-space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        rect: BoundingBox,
    },
    StrokeRect {
        rect: BoundingBox,
        color: String,
        line_width: f32,
    },
    Label {
        text: String,
        position: Point,
        color: String,
        font: String,
    },
}

/// Surface that records display-space draw commands instead of painting.
///
/// Clearing the full canvas discards previously recorded commands, so after
/// a redraw `commands()` holds exactly the last frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    style: SurfaceStyle,
    commands: Vec<DrawCommand>,
    frames: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: SurfaceStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// Commands recorded since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of clears seen, i.e. redraws started.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Stroked rectangles of the current frame.
    pub fn rects(&self) -> impl Iterator<Item = (&BoundingBox, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::StrokeRect { rect, color, .. } => Some((rect, color.as_str())),
            _ => None,
        })
    }

    /// Label texts of the current frame, in draw order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl RenderSurface for RecordingSurface {
    fn clear_region(&mut self, rect: BoundingBox) {
        self.commands.clear();
        self.frames += 1;
        self.commands.push(DrawCommand::Clear { rect });
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, scale: ScaleTransform, color: &str) {
        self.commands.push(DrawCommand::StrokeRect {
            rect: scale.to_display_rect(rect),
            color: color.to_string(),
            line_width: self.style.line_width,
        });
    }

    fn draw_label_text(&mut self, text: &str, anchor: Point, scale: ScaleTransform, color: &str) {
        let at = scale.to_display_point(anchor);
        self.commands.push(DrawCommand::Label {
            text: text.to_string(),
            position: Point::new(
                at.x + self.style.label_offset_x,
                at.y + self.style.label_offset_y,
            ),
            color: color.to_string(),
            font: self.style.font.clone(),
        });
    }
}
