//! Session orchestration: one table, one score, one aim cycle at a
//! time.

pub mod aim;

pub use aim::{AimController, AimPhase};

use glam::Vec2;

use crate::config::{TableConfig, Tuning};
use crate::core::physics::{BallContact, TableWorld};
use crate::core::time::FixedTimestep;
use crate::input::gesture::GestureLoop;
use crate::input::tracker::Hands;
use crate::render::Rgba;
use crate::table::perspective::TableGeometry;
use crate::table::pockets::{Pocket, PocketSet, Score};
use crate::table::rack::{rack_positions, BallId, CUE_COLOR, OBJECT_BALLS};

/// One ball as the renderer sees it.
#[derive(Debug, Clone, Copy)]
pub struct BallView {
    pub id: BallId,
    pub position: Vec2,
    pub color: Rgba,
    pub is_cue: bool,
}

/// The complete game session. Drives the per-frame pipeline:
/// gestures, physics step, braking, strike bonuses, pocket scan.
pub struct BilliardsGame {
    table: TableConfig,
    tuning: Tuning,
    geometry: TableGeometry,
    world: TableWorld,
    pockets: PocketSet,
    aim: AimController,
    gestures: GestureLoop,
    score: Score,
    timestep: FixedTimestep,
    contacts: Vec<BallContact>,
}

impl BilliardsGame {
    pub fn new(table: TableConfig, tuning: Tuning) -> Self {
        let geometry = TableGeometry::from_config(&table);
        let pockets = PocketSet::new(&table, &geometry, &tuning);
        let world = TableWorld::new(geometry, tuning.clone());
        let aim = AimController::new(tuning.clone());
        let gestures = GestureLoop::new(tuning.clone(), table.screen_size());
        let timestep = FixedTimestep::new(tuning.fixed_dt);
        let mut game = Self {
            table,
            tuning,
            geometry,
            world,
            pockets,
            aim,
            gestures,
            score: Score::default(),
            timestep,
            contacts: Vec::new(),
        };
        game.setup_balls();
        game
    }

    /// Cue ball at its start point, object balls in the triangle.
    fn setup_balls(&mut self) {
        let cue = self.geometry.to_screen(self.tuning.cue_start);
        self.world.create_ball(cue, BallId::CUE, true);
        let positions = rack_positions(self.tuning.rack_apex, self.tuning.rack_spacing);
        for (def, norm) in OBJECT_BALLS.iter().zip(positions) {
            self.world
                .create_ball(self.geometry.to_screen(norm), def.id, false);
        }
        log::info!("table set up with {} balls", self.world.ball_count());
    }

    /// Run exactly one frame at the fixed timestep: gestures first,
    /// then one physics step, braking, strike credit, pocket scan.
    pub fn frame(&mut self, hands: &Hands) {
        self.gestures
            .process(hands, &mut self.aim, &mut self.world);
        self.step_once();
    }

    /// Variable-rate host entry point: accumulates real frame time and
    /// runs however many fixed steps it covers. Gestures still run
    /// once per call.
    pub fn advance(&mut self, frame_dt: f32, hands: &Hands) {
        self.gestures
            .process(hands, &mut self.aim, &mut self.world);
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.step_once();
        }
    }

    fn step_once(&mut self) {
        self.contacts.clear();
        self.world.step_into(&mut self.contacts);
        self.world.damp_velocities(self.aim.is_active());
        self.credit_strikes();
        self.pockets.check_pockets(&mut self.world, &mut self.score);
    }

    /// A cue ball striking an object ball above the speed cutoff is
    /// worth a small bonus, once per contact start.
    fn credit_strikes(&mut self) {
        for contact in &self.contacts {
            if !contact.started {
                continue;
            }
            if let Some(target) = contact.cue_strike_target() {
                let speed = self
                    .world
                    .ball_velocity(BallId::CUE)
                    .map(|v| v.length())
                    .unwrap_or(0.0);
                if speed > self.tuning.strike_min_speed {
                    self.score.credit(self.tuning.strike_bonus);
                    log::info!(
                        "cue struck ball {} at {:.0} px/s, +{}",
                        target.0,
                        speed,
                        self.tuning.strike_bonus
                    );
                }
            }
        }
    }

    /// Back to the opening state: score zeroed, aim idle, every ball
    /// removed and re-racked.
    pub fn reset(&mut self) {
        self.score.reset();
        self.aim.reset();
        self.timestep.reset();
        self.world.clear();
        self.setup_balls();
        log::info!("session reset");
    }

    // -- read accessors for rendering and hosts --

    pub fn table_config(&self) -> &TableConfig {
        &self.table
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn geometry(&self) -> &TableGeometry {
        &self.geometry
    }

    pub fn pockets(&self) -> &[Pocket] {
        self.pockets.pockets()
    }

    pub fn aim(&self) -> &AimController {
        &self.aim
    }

    pub fn preview(&self) -> Option<(Vec2, Vec2)> {
        self.gestures.preview()
    }

    pub fn score(&self) -> u32 {
        self.score.value()
    }

    pub fn balls_moving(&self) -> bool {
        self.world.any_ball_moving()
    }

    pub fn ball_count(&self) -> usize {
        self.world.ball_count()
    }

    pub fn cue_position(&self) -> Vec2 {
        self.world.cue_position()
    }

    /// Every ball on the table with its display color, cue first.
    pub fn ball_views(&self) -> Vec<BallView> {
        let mut ids = self.world.ball_ids();
        ids.sort_unstable();
        ids.iter()
            .filter_map(|&id| {
                let position = self.world.ball_position(id)?;
                let color = if id.is_cue() {
                    CUE_COLOR
                } else {
                    OBJECT_BALLS
                        .iter()
                        .find(|def| def.id == id)
                        .map(|def| def.color)
                        .unwrap_or(Rgba::GRAY)
                };
                Some(BallView {
                    id,
                    position,
                    color,
                    is_cue: id.is_cue(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tracker::HandSample;
    use crate::render::{draw_frame, RecordingSurface};

    fn new_game() -> BilliardsGame {
        BilliardsGame::new(TableConfig::default(), Tuning::default())
    }

    fn hands(left: Option<HandSample>, right: Option<HandSample>) -> Hands {
        Hands { left, right }
    }

    #[test]
    fn opening_layout_has_fifteen_balls() {
        let game = new_game();
        assert_eq!(game.ball_count(), 15);
        let expected = game.geometry().to_screen(game.tuning().cue_start);
        assert!(game.cue_position().distance(expected) < 0.001);
        assert_eq!(game.score(), 0);
        assert!(!game.balls_moving());
    }

    #[test]
    fn ball_views_are_cue_first_with_colors() {
        let game = new_game();
        let views = game.ball_views();
        assert_eq!(views.len(), 15);
        assert!(views[0].is_cue);
        assert_eq!(views[0].color, CUE_COLOR);
        assert_eq!(views[1].id, BallId(1));
    }

    #[test]
    fn full_gesture_cycle_fires_a_shot() {
        let mut game = new_game();
        let left = Vec2::new(0.5, 0.6);

        // Close the left hand to start aiming.
        game.frame(&hands(Some(HandSample::closed(left)), None));
        assert_eq!(game.aim().phase(), AimPhase::SelectingDirection);

        // Point with the right hand, then open the left to lock.
        let point = Vec2::new(0.1, 0.58);
        game.frame(&hands(
            Some(HandSample::closed(left)),
            Some(HandSample::open(point)),
        ));
        game.frame(&hands(
            Some(HandSample::open(left)),
            Some(HandSample::open(point)),
        ));
        assert_eq!(game.aim().phase(), AimPhase::ChargingPower);

        // Drift outward slowly (under the flick speed), then flick.
        game.frame(&hands(
            Some(HandSample::open(left)),
            Some(HandSample::open(Vec2::new(0.09, 0.58))),
        ));
        assert!(game.aim().power() > 0.0);
        game.frame(&hands(
            Some(HandSample::open(left)),
            Some(HandSample::open(Vec2::new(0.0, 0.58))),
        ));

        assert_eq!(game.aim().phase(), AimPhase::Idle);
        assert!(game.balls_moving(), "shot should set the cue in motion");

        // Let the table settle again; rail hits bleed speed alongside
        // the per-frame braking.
        for _ in 0..900 {
            game.frame(&Hands::none());
        }
        assert!(!game.balls_moving(), "braking should bring the table to rest");
    }

    #[test]
    fn cue_strike_credits_bonus_once() {
        let mut game = new_game();
        game.world.clear();
        game.world
            .create_ball(Vec2::new(500.0, 350.0), BallId::CUE, true);
        game.world
            .create_ball(Vec2::new(560.0, 350.0), BallId(1), false);

        game.world.apply_shot(BallId::CUE, Vec2::new(1.0, 0.0), 3.0);
        for _ in 0..120 {
            game.frame(&Hands::none());
        }
        assert_eq!(game.score(), game.tuning().strike_bonus);
    }

    #[test]
    fn slow_strike_earns_nothing() {
        let mut game = new_game();
        game.world.clear();
        game.world
            .create_ball(Vec2::new(500.0, 350.0), BallId::CUE, true);
        game.world
            .create_ball(Vec2::new(540.0, 350.0), BallId(1), false);

        // 30 px/s is under the strike speed cutoff.
        game.world.apply_shot(BallId::CUE, Vec2::new(1.0, 0.0), 0.5);
        for _ in 0..120 {
            game.frame(&Hands::none());
        }
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn reset_restores_the_opening_state() {
        let mut game = new_game();
        game.world.apply_shot(BallId::CUE, Vec2::new(0.0, -1.0), 8.0);
        for _ in 0..120 {
            game.frame(&Hands::none());
        }

        game.reset();
        assert_eq!(game.ball_count(), 15);
        assert_eq!(game.score(), 0);
        assert_eq!(game.aim().phase(), AimPhase::Idle);
        let expected = game.geometry().to_screen(game.tuning().cue_start);
        assert!(game.cue_position().distance(expected) < 0.001);
    }

    #[test]
    fn advance_runs_fixed_steps_for_real_time() {
        let mut game = new_game();
        game.world.apply_shot(BallId::CUE, Vec2::new(0.0, -1.0), 2.0);
        let before = game.cue_position();

        // Half a frame of real time: no step yet.
        game.advance(0.008, &Hands::none());
        assert_eq!(game.cue_position(), before);

        // The rest of the frame arrives: exactly one step runs.
        game.advance(0.009, &Hands::none());
        assert!(game.cue_position().distance(before) > 0.1);
    }

    #[test]
    fn power_bar_appears_only_while_charging() {
        let mut game = new_game();
        let mut surface = RecordingSurface::new();

        draw_frame(&mut surface, &game);
        assert!(
            !surface.texts().iter().any(|t| t.starts_with("POWER")),
            "no power bar while idle"
        );

        let left = Vec2::new(0.5, 0.6);
        game.frame(&hands(Some(HandSample::closed(left)), None));
        game.frame(&hands(
            Some(HandSample::closed(left)),
            Some(HandSample::open(Vec2::new(0.1, 0.58))),
        ));
        game.frame(&hands(
            Some(HandSample::open(left)),
            Some(HandSample::open(Vec2::new(0.1, 0.58))),
        ));
        assert_eq!(game.aim().phase(), AimPhase::ChargingPower);

        surface.clear();
        draw_frame(&mut surface, &game);
        assert!(
            surface.texts().iter().any(|t| t.starts_with("POWER")),
            "power bar missing while charging: {:?}",
            surface.texts()
        );
    }
}
