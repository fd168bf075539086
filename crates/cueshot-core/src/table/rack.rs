//! Opening layout: ball identities, colors, and the triangular rack.

use glam::Vec2;

use crate::render::Rgba;

/// Stable identity of a ball for the lifetime of a session. 0 is the
/// cue ball; object balls count up from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(pub u8);

impl BallId {
    pub const CUE: BallId = BallId(0);

    pub fn is_cue(self) -> bool {
        self.0 == 0
    }
}

/// Static definition of one object ball.
#[derive(Debug, Clone, Copy)]
pub struct BallDef {
    pub id: BallId,
    pub color: Rgba,
}

/// The fourteen object balls, in rack order.
pub const OBJECT_BALLS: [BallDef; 14] = [
    BallDef { id: BallId(1), color: Rgba::rgb(1.0, 0.85, 0.1) },
    BallDef { id: BallId(2), color: Rgba::rgb(0.1, 0.3, 0.9) },
    BallDef { id: BallId(3), color: Rgba::rgb(0.9, 0.15, 0.15) },
    BallDef { id: BallId(4), color: Rgba::rgb(0.5, 0.15, 0.7) },
    BallDef { id: BallId(5), color: Rgba::rgb(1.0, 0.5, 0.1) },
    BallDef { id: BallId(6), color: Rgba::rgb(0.1, 0.6, 0.25) },
    BallDef { id: BallId(7), color: Rgba::rgb(0.55, 0.3, 0.15) },
    BallDef { id: BallId(8), color: Rgba::rgb(0.1, 0.1, 0.1) },
    BallDef { id: BallId(9), color: Rgba::rgb(1.0, 0.85, 0.1) },
    BallDef { id: BallId(10), color: Rgba::rgb(0.1, 0.3, 0.9) },
    BallDef { id: BallId(11), color: Rgba::rgb(0.9, 0.15, 0.15) },
    BallDef { id: BallId(12), color: Rgba::rgb(0.5, 0.15, 0.7) },
    BallDef { id: BallId(13), color: Rgba::rgb(1.0, 0.5, 0.1) },
    BallDef { id: BallId(14), color: Rgba::rgb(0.1, 0.6, 0.25) },
];

pub const CUE_COLOR: Rgba = Rgba::WHITE;

/// Normalized positions for a triangular rack: rows of 1..=5 balls
/// growing away from the apex along the depth axis, centered laterally.
///
/// Yields exactly `OBJECT_BALLS.len()` positions, so the last row is
/// one short of full.
pub fn rack_positions(apex: Vec2, spacing: f32) -> Vec<Vec2> {
    let mut positions = Vec::with_capacity(OBJECT_BALLS.len());
    'rows: for row in 0..5 {
        let depth = apex.x + row as f32 * spacing;
        let first_lateral = apex.y - row as f32 * spacing * 0.5;
        for slot in 0..=row {
            if positions.len() == OBJECT_BALLS.len() {
                break 'rows;
            }
            positions.push(Vec2::new(depth, first_lateral + slot as f32 * spacing));
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourteen_object_balls_with_unique_ids() {
        let mut ids: Vec<u8> = OBJECT_BALLS.iter().map(|b| b.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 14);
        assert!(!ids.contains(&0), "cue id must not appear in the rack");
    }

    #[test]
    fn rack_has_one_position_per_ball() {
        let positions = rack_positions(Vec2::new(0.7, 0.5), 0.04);
        assert_eq!(positions.len(), OBJECT_BALLS.len());
    }

    #[test]
    fn rack_apex_is_first_and_rows_recede() {
        let apex = Vec2::new(0.7, 0.5);
        let positions = rack_positions(apex, 0.04);
        assert_eq!(positions[0], apex);
        for pair in positions.windows(2) {
            assert!(
                pair[1].x >= pair[0].x - 1e-6,
                "rows must not move toward the viewer: {:?}",
                pair
            );
        }
    }

    #[test]
    fn rack_rows_are_laterally_centered() {
        let apex = Vec2::new(0.7, 0.5);
        let spacing = 0.04;
        let positions = rack_positions(apex, spacing);
        // Third row: indices 3, 4, 5 at depth apex.x + 2*spacing.
        let row: Vec<_> = positions
            .iter()
            .filter(|p| (p.x - (apex.x + 2.0 * spacing)).abs() < 1e-6)
            .collect();
        assert_eq!(row.len(), 3);
        let mid = (row[0].y + row[2].y) * 0.5;
        assert!((mid - apex.y).abs() < 1e-6, "row center drifted: {}", mid);
    }

    #[test]
    fn no_two_rack_positions_coincide() {
        let positions = rack_positions(Vec2::new(0.7, 0.5), 0.04);
        for (i, a) in positions.iter().enumerate() {
            for b in positions.iter().skip(i + 1) {
                assert!(a.distance(*b) > 1e-4, "overlap at {:?}", a);
            }
        }
    }
}
