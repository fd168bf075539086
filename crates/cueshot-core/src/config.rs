//! Table geometry and gameplay tuning.
//!
//! Every feel-critical constant lives here as a named field rather than
//! as a literal inside the logic that consumes it. Defaults follow the
//! reference table; both structs deserialize from JSON so a deployment
//! can override individual values without recompiling.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Screen-space geometry of the perspective table.
///
/// The four corners define the playing quadrilateral; everything else
/// (walls, pockets, ball placement) derives from them. Immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Width of the render/physics frame in pixels.
    pub screen_width: f32,
    /// Height of the render/physics frame in pixels.
    pub screen_height: f32,
    /// Bottom-left table corner (closest to the viewer).
    pub near_left: Vec2,
    /// Bottom-right table corner.
    pub near_right: Vec2,
    /// Top-left table corner (farthest from the viewer).
    pub far_left: Vec2,
    /// Top-right table corner.
    pub far_right: Vec2,
    /// Capture radius of the two near corner pockets.
    pub pocket_radius_near_corner: f32,
    /// Capture radius of the two far corner pockets (smaller: perspective).
    pub pocket_radius_far_corner: f32,
    /// Capture radius of the near side-center pocket.
    pub pocket_radius_near_side: f32,
    /// Capture radius of the far side-center pocket.
    pub pocket_radius_far_side: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            screen_width: 1200.0,
            screen_height: 800.0,
            near_left: Vec2::new(150.0, 550.0),
            near_right: Vec2::new(1050.0, 550.0),
            far_left: Vec2::new(250.0, 150.0),
            far_right: Vec2::new(950.0, 150.0),
            pocket_radius_near_corner: 25.0,
            pocket_radius_far_corner: 20.0,
            pocket_radius_near_side: 22.0,
            pocket_radius_far_side: 18.0,
        }
    }
}

impl TableConfig {
    /// Parse a table configuration from JSON, filling missing fields
    /// with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The full screen rectangle as a vector, for linear hand mapping.
    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.screen_width, self.screen_height)
    }
}

/// Gameplay tuning constants.
///
/// The interaction thresholds and damping factors are load-bearing for
/// game feel; treat changes here the way you would treat a physics
/// change, not a cosmetic one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fixed physics timestep in seconds. Never stepped with a variable
    /// dt so shot trajectories stay reproducible across frames.
    pub fixed_dt: f32,

    // Ball bodies
    pub ball_radius: f32,
    pub ball_mass: f32,
    pub ball_elasticity: f32,
    pub ball_friction: f32,

    // Wall colliders
    pub wall_elasticity: f32,
    pub wall_friction: f32,

    // Shot injection
    /// Multiplies (direction * power) into a linear velocity.
    pub velocity_scale: f32,
    /// Angular velocity per unit of shot power (spin scales with strength).
    pub spin_scale: f32,
    /// Upper bound on accumulated power.
    pub power_max: f32,
    /// Divides projected pull distance into power units.
    pub power_sensitivity: f32,
    /// Minimum origin→target distance for a usable aim vector.
    pub min_aim_distance: f32,
    /// Shots below this power are swallowed instead of applied.
    pub fire_threshold: f32,
    /// Length of the recomputed reference target after a direction freeze.
    pub aim_reference_length: f32,

    // Gesture thresholds
    /// Frame-to-frame right-hand displacement that commits a shot.
    pub flick_speed: f32,
    /// Ball speed above which the table counts as "in motion".
    pub motion_threshold: f32,
    /// Preview vector length from the cue ball.
    pub preview_length: f32,
    /// Below this cue-to-hand separation the preview falls back to the
    /// default forward direction.
    pub hand_min_separation: f32,

    // Graduated braking
    /// Per-frame velocity factor applied to every ball while an aim
    /// phase is active (rapid settle so aiming feels crisp).
    pub aim_settle_damping: f32,
    /// One-off factor applied when aiming starts.
    pub aim_start_pulse: f32,
    /// One-off near-total factor applied when the direction freezes.
    pub freeze_pulse: f32,
    /// Speeds above this get the mild factor.
    pub fast_speed: f32,
    pub damp_fast: f32,
    /// Speeds between `stop_speed` and `fast_speed` get the strong factor.
    pub damp_slow: f32,
    /// Below this speed, velocities are zeroed outright so residue
    /// never keeps the motion gate closed.
    pub stop_speed: f32,

    // Scoring
    pub capture_reward: u32,
    pub cue_penalty: u32,
    /// Credited when the cue ball strikes an object ball above
    /// `strike_min_speed`.
    pub strike_bonus: u32,
    pub strike_min_speed: f32,

    // Layout, in normalized table coordinates
    pub cue_start: Vec2,
    /// Re-entry point after the cue ball is pocketed.
    pub cue_reentry: Vec2,
    /// Apex of the triangular rack.
    pub rack_apex: Vec2,
    /// Ball-to-ball spacing within the rack.
    pub rack_spacing: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,

            ball_radius: 15.0,
            ball_mass: 1.0,
            ball_elasticity: 0.75,
            ball_friction: 0.8,

            wall_elasticity: 0.65,
            wall_friction: 0.9,

            velocity_scale: 60.0,
            spin_scale: 0.5,
            power_max: 20.0,
            power_sensitivity: 12.0,
            min_aim_distance: 10.0,
            fire_threshold: 0.8,
            aim_reference_length: 400.0,

            flick_speed: 30.0,
            motion_threshold: 6.0,
            preview_length: 400.0,
            hand_min_separation: 10.0,

            aim_settle_damping: 0.70,
            aim_start_pulse: 0.5,
            freeze_pulse: 0.05,
            fast_speed: 120.0,
            damp_fast: 0.995,
            damp_slow: 0.96,
            stop_speed: 6.0,

            capture_reward: 50,
            cue_penalty: 50,
            strike_bonus: 10,
            strike_min_speed: 60.0,

            cue_start: Vec2::new(0.2, 0.5),
            cue_reentry: Vec2::new(0.3, 0.5),
            rack_apex: Vec2::new(0.7, 0.5),
            rack_spacing: 0.04,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
