// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Axis-aligned rectangles and Intersection over Union.

use serde::Serialize;

/// Axis-aligned bounding box in image-pixel space.
///
/// A rectangle whose right edge lies left of its left edge (or whose bottom
/// lies above its top) is degenerate: it has zero width, height and area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Rect {
    /// Create a rectangle from its corner bounds.
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from a center point and size (xywh format).
    #[must_use]
    pub fn from_xywh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    #[must_use]
    pub const fn left(&self) -> f32 {
        self.left
    }

    #[must_use]
    pub const fn top(&self) -> f32 {
        self.top
    }

    #[must_use]
    pub const fn right(&self) -> f32 {
        self.right
    }

    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.bottom
    }

    /// Corner bounds as `[x1, y1, x2, y2]`.
    #[must_use]
    pub const fn xyxy(&self) -> [f32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    /// Horizontal extent, never negative.
    #[must_use]
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    /// Vertical extent, never negative.
    #[must_use]
    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    /// Center point `(x, y)`.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Area of the rectangle; 0 for degenerate rectangles.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Area of the overlap between two rectangles; 0 if they do not overlap.
    #[must_use]
    pub fn intersection_area(&self, other: &Self) -> f32 {
        let x1 = self.left.max(other.left);
        let y1 = self.top.max(other.top);
        let x2 = self.right.min(other.right);
        let y2 = self.bottom.min(other.bottom);

        ((x2 - x1).max(0.0)) * ((y2 - y1).max(0.0))
    }

    /// Calculate `IoU` (Intersection over Union) with another rectangle.
    ///
    /// # Returns
    ///
    /// `IoU` value between 0.0 and 1.0. Defined as 0.0 when the union is empty,
    /// so degenerate rectangles never overlap anything.
    #[must_use]
    pub fn iou(&self, other: &Self) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Scale each axis independently, e.g. to map image pixels into a view.
    #[must_use]
    pub fn scale(&self, sx: f32, sy: f32) -> Self {
        Self::new(
            self.left * sx,
            self.top * sy,
            self.right * sx,
            self.bottom * sy,
        )
    }

    /// Clamp every coordinate into `[0, width] x [0, height]`.
    #[must_use]
    pub fn clamp(&self, width: f32, height: f32) -> Self {
        Self::new(
            self.left.clamp(0.0, width),
            self.top.clamp(0.0, height),
            self.right.clamp(0.0, width),
            self.bottom.clamp(0.0, height),
        )
    }
}
