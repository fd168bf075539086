//! Mapping between normalized table space and screen space.
//!
//! The table is drawn in fake perspective: a quadrilateral whose near
//! edge is wider than its far edge. Gameplay logic works in normalized
//! coordinates where `x` runs 0 (near edge) to 1 (far edge) along the
//! depth axis and `y` runs 0 (left rail) to 1 (right rail). Physics and
//! rendering work in screen pixels. This module converts between the
//! two.

use glam::Vec2;

use crate::config::TableConfig;

/// The four screen-space corners of the playing quadrilateral.
///
/// Immutable after construction; both mapping directions derive from
/// the corners alone.
#[derive(Debug, Clone, Copy)]
pub struct TableGeometry {
    pub near_left: Vec2,
    pub near_right: Vec2,
    pub far_left: Vec2,
    pub far_right: Vec2,
}

impl TableGeometry {
    pub fn from_config(config: &TableConfig) -> Self {
        Self {
            near_left: config.near_left,
            near_right: config.near_right,
            far_left: config.far_left,
            far_right: config.far_right,
        }
    }

    /// Map a normalized table point to screen pixels.
    ///
    /// Bilinear interpolation over the four corners: the near and far
    /// edges are interpolated by `norm.y` (lateral), then blended by
    /// `norm.x` (depth). Inputs outside [0, 1] extrapolate, which is
    /// intentional: slightly-out-of-table placements (rack jitter,
    /// cushion contact points) still land in a sensible spot.
    pub fn to_screen(&self, norm: Vec2) -> Vec2 {
        debug_assert!(norm.is_finite(), "non-finite normalized point: {:?}", norm);
        let near = self.near_left.lerp(self.near_right, norm.y);
        let far = self.far_left.lerp(self.far_right, norm.y);
        near.lerp(far, norm.x)
    }

    /// Map a screen point back to normalized table space.
    ///
    /// Approximate inverse of [`to_screen`](Self::to_screen): depth is
    /// solved from the vertical edge interpolation, then the lateral
    /// fraction from the horizontal edge at that depth. Exact when the
    /// near corners share a y coordinate and the far corners share
    /// another (the default trapezoid); close enough for aim math on
    /// mildly skewed quads. Outputs are clamped to [0, 1].
    pub fn to_normalized(&self, screen: Vec2) -> Vec2 {
        let near_y = (self.near_left.y + self.near_right.y) * 0.5;
        let far_y = (self.far_left.y + self.far_right.y) * 0.5;
        let depth_span = far_y - near_y;
        let norm_x = if depth_span.abs() < f32::EPSILON {
            0.0
        } else {
            ((screen.y - near_y) / depth_span).clamp(0.0, 1.0)
        };

        let left = self.near_left.lerp(self.far_left, norm_x);
        let right = self.near_right.lerp(self.far_right, norm_x);
        let width = right.x - left.x;
        let norm_y = if width.abs() < f32::EPSILON {
            0.0
        } else {
            ((screen.x - left.x) / width).clamp(0.0, 1.0)
        };

        Vec2::new(norm_x, norm_y)
    }

    /// Corner loop in drawing order: near-left, near-right, far-right,
    /// far-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [self.near_left, self.near_right, self.far_right, self.far_left]
    }

    /// The four rail segments as screen-space endpoint pairs.
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        [
            (self.near_left, self.near_right),
            (self.far_left, self.far_right),
            (self.near_left, self.far_left),
            (self.near_right, self.far_right),
        ]
    }
}
