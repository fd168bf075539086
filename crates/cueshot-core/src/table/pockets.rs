//! Pocket captures and the session score.

use glam::Vec2;

use crate::config::{TableConfig, Tuning};
use crate::core::physics::TableWorld;
use crate::table::perspective::TableGeometry;
use crate::table::rack::BallId;

/// One capture zone: a screen-space disk.
#[derive(Debug, Clone, Copy)]
pub struct Pocket {
    pub position: Vec2,
    pub radius: f32,
}

impl Pocket {
    fn captures(&self, ball_position: Vec2) -> bool {
        ball_position.distance(self.position) < self.radius
    }
}

/// Non-negative session score. Penalties saturate at zero rather than
/// going negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score(u32);

impl Score {
    pub fn credit(&mut self, points: u32) {
        self.0 = self.0.saturating_add(points);
    }

    pub fn penalize(&mut self, points: u32) {
        self.0 = self.0.saturating_sub(points);
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// The six pockets plus the capture consequences. Built once per
/// session; geometry never changes afterwards.
pub struct PocketSet {
    pockets: [Pocket; 6],
    cue_reentry: Vec2,
    capture_reward: u32,
    cue_penalty: u32,
}

impl PocketSet {
    /// Four corner pockets and the two long-side centers. Near pockets
    /// get wider capture radii than far ones, matching the perspective
    /// scaling of the drawn table.
    pub fn new(config: &TableConfig, geometry: &TableGeometry, tuning: &Tuning) -> Self {
        let near_center = geometry.near_left.lerp(geometry.near_right, 0.5);
        let far_center = geometry.far_left.lerp(geometry.far_right, 0.5);
        Self {
            pockets: [
                Pocket { position: geometry.near_left, radius: config.pocket_radius_near_corner },
                Pocket { position: geometry.near_right, radius: config.pocket_radius_near_corner },
                Pocket { position: geometry.far_left, radius: config.pocket_radius_far_corner },
                Pocket { position: geometry.far_right, radius: config.pocket_radius_far_corner },
                Pocket { position: near_center, radius: config.pocket_radius_near_side },
                Pocket { position: far_center, radius: config.pocket_radius_far_side },
            ],
            cue_reentry: geometry.to_screen(tuning.cue_reentry),
            capture_reward: tuning.capture_reward,
            cue_penalty: tuning.cue_penalty,
        }
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    /// Scan every ball against every pocket, in fixed pocket order with
    /// the first match winning. Captured object balls are removed after
    /// the scan so iteration never observes a half-updated registry.
    /// A captured cue ball is penalized and put back on the table at
    /// the re-entry point with its motion killed.
    ///
    /// Returns the object balls captured this frame.
    pub fn check_pockets(&self, world: &mut TableWorld, score: &mut Score) -> Vec<BallId> {
        let mut captured = Vec::new();
        let mut cue_captured = false;

        for id in world.ball_ids() {
            let Some(position) = world.ball_position(id) else {
                continue;
            };
            if let Some(pocket) = self.pockets.iter().find(|p| p.captures(position)) {
                if id.is_cue() {
                    cue_captured = true;
                    log::info!(
                        "cue ball pocketed at ({:.0},{:.0}), penalty {}",
                        pocket.position.x,
                        pocket.position.y,
                        self.cue_penalty
                    );
                } else {
                    captured.push(id);
                    log::info!("ball {} pocketed, +{}", id.0, self.capture_reward);
                }
            }
        }

        for id in &captured {
            world.remove_ball(*id);
            score.credit(self.capture_reward);
        }
        if cue_captured {
            score.penalize(self.cue_penalty);
            world.reposition_cue(self.cue_reentry);
        }
        captured
    }
}
