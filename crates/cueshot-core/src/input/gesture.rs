//! Per-frame arbitration between tracker input and the aim machine.
//!
//! The loop owns everything gesture recognition needs across frames:
//! per-hand position history, the previous left-hand openness for edge
//! detection, and the preview vector. Gesture rules only run while the
//! table is at rest; while balls are moving the loop just clears its
//! transient state.

use std::collections::VecDeque;

use glam::Vec2;

use crate::config::Tuning;
use crate::core::physics::TableWorld;
use crate::game::aim::{AimController, AimPhase};
use crate::input::tracker::Hands;

const HISTORY_LEN: usize = 8;

/// Bounded ring of recent mapped positions for one hand.
#[derive(Debug, Default)]
struct HandHistory {
    positions: VecDeque<Vec2>,
}

impl HandHistory {
    fn push(&mut self, position: Vec2) {
        if self.positions.len() == HISTORY_LEN {
            self.positions.pop_front();
        }
        self.positions.push_back(position);
    }

    fn last(&self) -> Option<Vec2> {
        self.positions.back().copied()
    }

    fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn clear(&mut self) {
        self.positions.clear();
    }
}

/// Turns raw hand samples into aim-controller transitions.
pub struct GestureLoop {
    tuning: Tuning,
    screen: Vec2,
    left_history: HandHistory,
    right_history: HandHistory,
    prev_left_open: Option<bool>,
    preview: Option<(Vec2, Vec2)>,
}

impl GestureLoop {
    pub fn new(tuning: Tuning, screen: Vec2) -> Self {
        Self {
            tuning,
            screen,
            left_history: HandHistory::default(),
            right_history: HandHistory::default(),
            prev_left_open: None,
            preview: None,
        }
    }

    /// The idle-phase preview vector, if one is showing.
    pub fn preview(&self) -> Option<(Vec2, Vec2)> {
        self.preview
    }

    /// Normalized tracker space maps linearly onto the whole screen
    /// rectangle, not just the table quad, so hands can comfortably
    /// point outside the rails.
    fn map(&self, norm: Vec2) -> Vec2 {
        norm * self.screen
    }

    /// Run one frame of gesture rules.
    pub fn process(&mut self, hands: &Hands, aim: &mut AimController, world: &mut TableWorld) {
        if world.any_ball_moving() {
            self.preview = None;
            self.left_history.clear();
            self.right_history.clear();
            self.prev_left_open = None;
            return;
        }

        self.process_left(hands, aim, world);
        self.process_right(hands, aim, world);
    }

    fn process_left(&mut self, hands: &Hands, aim: &mut AimController, world: &mut TableWorld) {
        let Some(left) = hands.left else {
            self.preview = None;
            // A single dropped frame is neutral; only a hand that
            // stays gone (history already cleared) abandons the aim.
            if self.left_history.is_empty() && aim.phase() == AimPhase::SelectingDirection {
                log::info!("left hand lost, aim abandoned");
                aim.reset();
            }
            self.left_history.clear();
            self.prev_left_open = None;
            return;
        };

        let mapped = self.map(left.position);
        self.left_history.push(mapped);
        let was_open = self.prev_left_open;
        self.prev_left_open = Some(left.is_open());

        if left.is_open() {
            match aim.phase() {
                AimPhase::Idle => {
                    self.preview = Some(self.preview_vector(hands, world));
                }
                AimPhase::SelectingDirection => {
                    self.preview = None;
                    if was_open == Some(false) {
                        aim.freeze_direction(world);
                    }
                }
                AimPhase::ChargingPower => {
                    self.preview = None;
                }
            }
        } else {
            self.preview = None;
            match aim.phase() {
                AimPhase::Idle => {
                    aim.start_aiming(world, mapped);
                    self.right_history.clear();
                }
                AimPhase::ChargingPower => {
                    aim.cancel_power();
                }
                AimPhase::SelectingDirection => {}
            }
        }
    }

    fn process_right(&mut self, hands: &Hands, aim: &mut AimController, world: &mut TableWorld) {
        let Some(right) = hands.right else {
            if aim.phase() == AimPhase::ChargingPower && !self.right_history.is_empty() {
                log::info!("right hand lost while charging, firing");
                aim.fire(world);
            }
            self.right_history.clear();
            return;
        };

        let mapped = self.map(right.position);
        let previous = self.right_history.last();

        if aim.is_active() {
            aim.update_aim_target(mapped);
        }

        if aim.phase() == AimPhase::ChargingPower {
            if let Some(previous) = previous {
                let displacement = mapped.distance(previous);
                let receding =
                    mapped.distance(aim.origin()) > previous.distance(aim.origin());
                if displacement > self.tuning.flick_speed && receding {
                    log::info!("flick detected ({:.1} px), firing", displacement);
                    aim.fire(world);
                }
            }
        }

        self.right_history.push(mapped);
    }

    /// Preview from the cue ball toward the right hand. Falls back to
    /// straight ahead when there is no right hand or it sits almost on
    /// top of the cue ball.
    fn preview_vector(&self, hands: &Hands, world: &TableWorld) -> (Vec2, Vec2) {
        let cue = world.cue_position();
        let dir = hands
            .right
            .map(|right| self.map(right.position) - cue)
            .filter(|delta| delta.length() >= self.tuning.hand_min_separation)
            .map(|delta| delta.normalize())
            .unwrap_or(Vec2::new(0.0, -1.0));
        (cue, cue + dir * self.tuning.preview_length)
    }
}
