//! Display-space / image-space coordinate mathematics.
//!
//! Boxes are always stored in image-space (natural pixel units of the source
//! image). The canvas the user draws on has its own size, so every pointer
//! position is converted into image-space on ingestion and every stored box
//! is converted back into display-space at render time.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A 2D point. Which space it lives in depends on the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a point from its coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height pair, used for both container and natural image sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a size from width and height.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle, `(x, y)` being the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner X coordinate
    pub x: f32,
    /// Top-left corner Y coordinate
    pub y: f32,
    /// Width of the box
    pub width: f32,
    /// Height of the box
    pub height: f32,
}

impl BoundingBox {
    /// Create a box from its top-left corner and extents.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized box spanning two arbitrary corners.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self {
            x: p1.x.min(p2.x),
            y: p1.y.min(p2.y),
            width: (p1.x - p2.x).abs(),
            height: (p1.y - p2.y).abs(),
        }
    }

    /// Top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bottom-right corner.
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Covered area in square units of the box's space.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when the box covers no pixels and should not be drawn.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Coerce malformed data into a well-formed (possibly zero-area) box.
    ///
    /// Non-finite or negative extents collapse the box to zero area; a
    /// negative or non-finite origin is clamped to 0. Returns the sanitized
    /// box and whether anything had to change.
    pub fn sanitized(&self) -> (Self, bool) {
        let clamp_origin = |v: f32| if v.is_finite() && v >= 0.0 { v } else { 0.0 };
        let extents_ok = self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0;

        let fixed = Self {
            x: clamp_origin(self.x),
            y: clamp_origin(self.y),
            width: if extents_ok { self.width } else { 0.0 },
            height: if extents_ok { self.height } else { 0.0 },
        };
        let changed = fixed != *self;
        (fixed, changed)
    }
}

/// Per-axis scale from image-space to display-space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleTransform {
    /// Display pixels per image pixel, horizontally
    pub scale_x: f32,
    /// Display pixels per image pixel, vertically
    pub scale_y: f32,
}

impl ScaleTransform {
    /// Create a transform from per-axis factors.
    pub fn new(scale_x: f32, scale_y: f32) -> Self {
        Self { scale_x, scale_y }
    }

    /// Identity transform (container matches the natural size).
    pub fn identity() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Display-space point to image-space.
    pub fn to_image_point(&self, point: Point) -> Point {
        Point::new(point.x / self.scale_x, point.y / self.scale_y)
    }

    /// Image-space point to display-space.
    pub fn to_display_point(&self, point: Point) -> Point {
        Point::new(point.x * self.scale_x, point.y * self.scale_y)
    }

    /// Image-space rectangle to display-space.
    pub fn to_display_rect(&self, rect: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            rect.x * self.scale_x,
            rect.y * self.scale_y,
            rect.width * self.scale_x,
            rect.height * self.scale_y,
        )
    }

    /// Display-space rectangle to image-space.
    pub fn to_image_rect(&self, rect: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            rect.x / self.scale_x,
            rect.y / self.scale_y,
            rect.width / self.scale_x,
            rect.height / self.scale_y,
        )
    }
}

impl Default for ScaleTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Scale that stretches an image of `natural` size into `container`.
///
/// Fails with [`EngineError::InvalidDimensions`] when either size has a
/// non-positive or non-finite dimension. A zero scale would turn every
/// pointer position into NaN.
pub fn compute_scale(container: Size, natural: Size) -> Result<ScaleTransform, EngineError> {
    for size in [natural, container] {
        if !size.is_valid() {
            return Err(EngineError::InvalidDimensions {
                width: size.width,
                height: size.height,
            });
        }
    }
    Ok(ScaleTransform::new(
        container.width / natural.width,
        container.height / natural.height,
    ))
}

/// Convert a display-space point into image-space.
pub fn to_image_space(point: Point, transform: &ScaleTransform) -> Point {
    transform.to_image_point(point)
}

/// Convert an image-space rectangle into display-space.
pub fn to_display_space(rect: &BoundingBox, transform: &ScaleTransform) -> BoundingBox {
    transform.to_display_rect(rect)
}
