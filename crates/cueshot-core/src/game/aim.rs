//! Two-phase aiming: pick a direction, lock it, charge power, shoot.
//!
//! Every operation is total. Called out of phase it does nothing, so
//! the gesture loop can drive transitions without pre-checking state
//! and a dropped tracker frame can never wedge the controller.

use glam::Vec2;

use crate::config::Tuning;
use crate::core::physics::TableWorld;
use crate::table::rack::BallId;

/// Where the controller is in the aim cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AimPhase {
    Idle,
    SelectingDirection,
    ChargingPower,
}

/// The aim/power state machine for the cue ball.
pub struct AimController {
    phase: AimPhase,
    origin: Vec2,
    target: Vec2,
    frozen_dir: Option<Vec2>,
    power: f32,
    tuning: Tuning,
}

impl AimController {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            phase: AimPhase::Idle,
            origin: Vec2::ZERO,
            target: Vec2::ZERO,
            frozen_dir: None,
            power: 0.0,
            tuning,
        }
    }

    pub fn phase(&self) -> AimPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != AimPhase::Idle
    }

    /// Cue ball position at the moment aiming started.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Current visual aim target in screen space.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Unit direction locked by [`freeze_direction`](Self::freeze_direction),
    /// present only while charging.
    pub fn frozen_direction(&self) -> Option<Vec2> {
        self.frozen_dir
    }

    /// Accumulated shot power in `[0, power_max]`.
    pub fn power(&self) -> f32 {
        self.power
    }

    /// Begin selecting a direction. Only valid from idle with the
    /// table at rest; anything else is a no-op. The origin locks to
    /// the cue ball's current position and a strong damping pulse
    /// settles whatever residue is left on the table.
    pub fn start_aiming(&mut self, world: &mut TableWorld, target: Vec2) {
        if self.phase != AimPhase::Idle || world.any_ball_moving() {
            return;
        }
        self.origin = world.cue_position();
        self.target = target;
        self.frozen_dir = None;
        self.power = 0.0;
        self.phase = AimPhase::SelectingDirection;
        world.damp_pulse(self.tuning.aim_start_pulse);
        log::info!(
            "aiming started, origin ({:.0},{:.0})",
            self.origin.x,
            self.origin.y
        );
    }

    /// Feed the current pointing position.
    ///
    /// While selecting, it moves the visual target. While charging,
    /// its scalar projection onto the frozen direction sets the power.
    pub fn update_aim_target(&mut self, point: Vec2) {
        match self.phase {
            AimPhase::SelectingDirection => {
                self.target = point;
            }
            AimPhase::ChargingPower => {
                if let Some(dir) = self.frozen_dir {
                    let projected = (point - self.origin).dot(dir);
                    self.power = (projected / self.tuning.power_sensitivity)
                        .clamp(0.0, self.tuning.power_max);
                }
            }
            AimPhase::Idle => {}
        }
    }

    /// Lock the current direction and move on to charging power.
    ///
    /// Targets closer to the origin than the minimum aim distance
    /// cannot give a stable direction, so the call is ignored and the
    /// phase stays at selecting. On success the target is recomputed
    /// at a fixed reference length along the locked direction and a
    /// near-total damping pulse freezes the table.
    pub fn freeze_direction(&mut self, world: &mut TableWorld) {
        if self.phase != AimPhase::SelectingDirection {
            return;
        }
        let delta = self.target - self.origin;
        let distance = delta.length();
        if distance < self.tuning.min_aim_distance {
            log::debug!("freeze ignored, target too close ({:.1} px)", distance);
            return;
        }
        let dir = delta / distance;
        self.frozen_dir = Some(dir);
        self.power = 0.0;
        self.target = self.origin + dir * self.tuning.aim_reference_length;
        self.phase = AimPhase::ChargingPower;
        world.damp_pulse(self.tuning.freeze_pulse);
        log::info!("direction locked ({:.2},{:.2})", dir.x, dir.y);
    }

    /// Drop the locked direction and go back to selecting. The visual
    /// target keeps its last value so the overlay does not jump.
    pub fn cancel_power(&mut self) {
        if self.phase != AimPhase::ChargingPower {
            return;
        }
        self.frozen_dir = None;
        self.power = 0.0;
        self.phase = AimPhase::SelectingDirection;
        log::info!("power charge cancelled");
    }

    /// Commit the shot and return to idle.
    ///
    /// With a frozen direction the stored direction and power are
    /// used. Without one (the single-phase path) direction and power
    /// both come from the raw origin-to-target vector; a target under
    /// the minimum aim distance aborts without shooting. Shots at or
    /// below the fire threshold are swallowed. The controller always
    /// ends up idle.
    pub fn fire(&mut self, world: &mut TableWorld) {
        if self.phase == AimPhase::Idle {
            return;
        }
        let shot = match self.frozen_dir {
            Some(dir) => Some((dir, self.power)),
            None => {
                let delta = self.target - self.origin;
                let distance = delta.length();
                if distance < self.tuning.min_aim_distance {
                    None
                } else {
                    let power =
                        (distance / self.tuning.power_sensitivity).min(self.tuning.power_max);
                    Some((delta / distance, power))
                }
            }
        };

        if let Some((dir, power)) = shot {
            if power > self.tuning.fire_threshold {
                world.apply_shot(BallId::CUE, dir, power);
            } else {
                log::debug!("shot swallowed, power {:.2} under threshold", power);
            }
        }
        self.reset();
    }

    /// Back to idle, dropping direction, power, and target.
    pub fn reset(&mut self) {
        self.phase = AimPhase::Idle;
        self.frozen_dir = None;
        self.power = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::table::perspective::TableGeometry;

    fn fixture() -> (TableWorld, AimController) {
        let tuning = Tuning::default();
        let geometry = TableGeometry::from_config(&TableConfig::default());
        let mut world = TableWorld::new(geometry, tuning.clone());
        world.create_ball(Vec2::new(400.0, 400.0), BallId::CUE, true);
        (world, AimController::new(tuning))
    }

    #[test]
    fn operations_out_of_phase_are_no_ops() {
        let (mut world, mut aim) = fixture();
        aim.freeze_direction(&mut world);
        aim.cancel_power();
        aim.update_aim_target(Vec2::new(900.0, 100.0));
        aim.fire(&mut world);
        assert_eq!(aim.phase(), AimPhase::Idle);
        assert_eq!(world.ball_velocity(BallId::CUE).unwrap(), Vec2::ZERO);
    }

    #[test]
    fn start_aiming_locks_origin_to_cue() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(600.0, 300.0));
        assert_eq!(aim.phase(), AimPhase::SelectingDirection);
        assert_eq!(aim.origin(), Vec2::new(400.0, 400.0));
        assert_eq!(aim.target(), Vec2::new(600.0, 300.0));
    }

    #[test]
    fn start_aiming_gated_while_balls_move() {
        let (mut world, mut aim) = fixture();
        world.apply_shot(BallId::CUE, Vec2::new(1.0, 0.0), 5.0);
        aim.start_aiming(&mut world, Vec2::new(600.0, 300.0));
        assert_eq!(aim.phase(), AimPhase::Idle);
    }

    #[test]
    fn freeze_needs_minimum_distance() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(405.0, 400.0));
        aim.freeze_direction(&mut world);
        assert_eq!(aim.phase(), AimPhase::SelectingDirection);
        assert!(aim.frozen_direction().is_none());
    }

    #[test]
    fn freeze_stores_unit_direction_and_reference_target() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(700.0, 400.0));
        aim.freeze_direction(&mut world);

        assert_eq!(aim.phase(), AimPhase::ChargingPower);
        let dir = aim.frozen_direction().unwrap();
        assert!((dir.length() - 1.0).abs() < 1e-5, "not unit: {:?}", dir);
        assert!((dir.x - 1.0).abs() < 1e-5);
        assert_eq!(aim.power(), 0.0);
        let expected_target = Vec2::new(400.0 + 400.0, 400.0);
        assert!(aim.target().distance(expected_target) < 1e-3);
    }

    #[test]
    fn power_is_projection_clamped_to_bounds() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(700.0, 400.0));
        aim.freeze_direction(&mut world);

        // 100 px along the direction → 100 / 12.
        aim.update_aim_target(Vec2::new(500.0, 400.0));
        assert!((aim.power() - 100.0 / 12.0).abs() < 1e-4);

        // Behind the origin projects negative → clamped to zero.
        aim.update_aim_target(Vec2::new(300.0, 400.0));
        assert_eq!(aim.power(), 0.0);

        // Far beyond the max → clamped to power_max.
        aim.update_aim_target(Vec2::new(4000.0, 400.0));
        assert!((aim.power() - 20.0).abs() < 1e-4);

        // Lateral offset does not change the projection.
        aim.update_aim_target(Vec2::new(500.0, 900.0));
        assert!((aim.power() - 100.0 / 12.0).abs() < 1e-4);
    }

    #[test]
    fn cancel_power_returns_to_selecting() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(700.0, 400.0));
        aim.freeze_direction(&mut world);
        aim.update_aim_target(Vec2::new(600.0, 400.0));

        aim.cancel_power();
        assert_eq!(aim.phase(), AimPhase::SelectingDirection);
        assert!(aim.frozen_direction().is_none());
        assert_eq!(aim.power(), 0.0);
        // Visual target survives the cancel.
        assert!(aim.target().x > 400.0);
    }

    #[test]
    fn two_phase_shot_end_to_end() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(800.0, 400.0));
        aim.freeze_direction(&mut world);
        aim.update_aim_target(Vec2::new(500.0, 400.0));
        aim.fire(&mut world);

        assert_eq!(aim.phase(), AimPhase::Idle);
        let vel = world.ball_velocity(BallId::CUE).unwrap();
        // power = 100 / 12, speed = power * 60 = 500.
        assert!(
            (vel.x - 500.0).abs() < 0.1,
            "expected ~500 px/s, got {:?}",
            vel
        );
        assert!(vel.y.abs() < 0.1);
    }

    #[test]
    fn single_phase_fallback_uses_raw_vector() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(400.0, 300.0));
        aim.fire(&mut world);

        assert_eq!(aim.phase(), AimPhase::Idle);
        let vel = world.ball_velocity(BallId::CUE).unwrap();
        // 100 px pull → power 100/12 → 500 px/s upward.
        assert!(vel.x.abs() < 0.1);
        assert!((vel.y + 500.0).abs() < 0.1, "got {:?}", vel);
    }

    #[test]
    fn fire_below_threshold_is_swallowed() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(700.0, 400.0));
        aim.freeze_direction(&mut world);
        // 5 px along the direction → power well under the threshold.
        aim.update_aim_target(Vec2::new(405.0, 400.0));
        aim.fire(&mut world);

        assert_eq!(aim.phase(), AimPhase::Idle);
        assert_eq!(world.ball_velocity(BallId::CUE).unwrap(), Vec2::ZERO);
    }

    #[test]
    fn fire_under_min_distance_aborts_silently() {
        let (mut world, mut aim) = fixture();
        aim.start_aiming(&mut world, Vec2::new(403.0, 400.0));
        aim.fire(&mut world);
        assert_eq!(aim.phase(), AimPhase::Idle);
        assert_eq!(world.ball_velocity(BallId::CUE).unwrap(), Vec2::ZERO);
    }
}
