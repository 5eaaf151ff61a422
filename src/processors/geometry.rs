//! Geometric primitives for plate detection.
//!
//! Detection boxes from the end-to-end detector are axis-aligned, so this
//! module keeps to rectangles: corner representation, extents, clamping to
//! image bounds, and conversion to integer pixel regions for cropping.

use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in image coordinates.
///
/// `x1`/`y1` is the top-left corner and `x2`/`y2` the bottom-right corner;
/// the box is empty when either extent is not strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X-coordinate of the top-left corner.
    pub x1: f32,
    /// Y-coordinate of the top-left corner.
    pub y1: f32,
    /// X-coordinate of the bottom-right corner.
    pub x2: f32,
    /// Y-coordinate of the bottom-right corner.
    pub y2: f32,
}

impl BoundingBox {
    /// Creates a bounding box from corner coordinates.
    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns the width of the box (0.0 for degenerate boxes).
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Returns the height of the box (0.0 for degenerate boxes).
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Returns the area of the box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the center of the box.
    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Returns the four corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x1, self.y2),
        ]
    }

    /// Clamps the box to the bounds of an image with the given dimensions.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
        }
    }

    /// Converts the box to an integer pixel region `(x, y, width, height)`.
    ///
    /// The top-left corner is floored and the bottom-right corner is ceiled
    /// so that every pixel the box touches is included. Returns `None` when
    /// the region degenerates to zero width or height.
    pub fn to_pixel_region(&self) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x1.floor().max(0.0) as u32;
        let y1 = self.y1.floor().max(0.0) as u32;
        let x2 = self.x2.ceil().max(0.0) as u32;
        let y2 = self.y2.ceil().max(0.0) as u32;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some((x1, y1, x2 - x1, y2 - y1))
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.0}, {:.0}, {:.0}, {:.0}]",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents() {
        let bbox = BoundingBox::from_coords(10.0, 20.0, 110.0, 70.0);
        assert_eq!(bbox.width(), 100.0);
        assert_eq!(bbox.height(), 50.0);
        assert_eq!(bbox.area(), 5000.0);
        assert_eq!(bbox.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_degenerate_box_has_no_extent() {
        let bbox = BoundingBox::from_coords(50.0, 50.0, 40.0, 60.0);
        assert_eq!(bbox.width(), 0.0);
        assert_eq!(bbox.area(), 0.0);
    }

    #[test]
    fn test_clamp_to_image_bounds() {
        let bbox = BoundingBox::from_coords(-5.0, -3.0, 205.0, 95.0);
        let clamped = bbox.clamp_to(200, 90);
        assert_eq!(clamped, BoundingBox::from_coords(0.0, 0.0, 200.0, 90.0));
    }

    #[test]
    fn test_pixel_region_rounds_outward() {
        let bbox = BoundingBox::from_coords(10.3, 5.7, 20.2, 9.1);
        assert_eq!(bbox.to_pixel_region(), Some((10, 5, 11, 5)));
    }

    #[test]
    fn test_pixel_region_degenerate() {
        let bbox = BoundingBox::from_coords(10.0, 10.0, 10.0, 30.0);
        assert_eq!(bbox.to_pixel_region(), None);
    }

    #[test]
    fn test_corners_order() {
        let bbox = BoundingBox::from_coords(1.0, 2.0, 3.0, 4.0);
        let corners = bbox.corners();
        assert_eq!(corners[0], Point::new(1.0, 2.0));
        assert_eq!(corners[2], Point::new(3.0, 4.0));
    }
}
