//! Headless demo: a scripted pair of hands plays one full shot.
//!
//! Drives the complete frame pipeline (gestures, physics, braking,
//! pockets, rendering) with a canned gesture timeline instead of a
//! camera, and a surface that logs what it would have drawn instead of
//! rasterizing. Run with `RUST_LOG=debug` for the per-primitive
//! stream.

use glam::Vec2;

use cueshot_core::{
    draw_frame, BilliardsGame, HandSample, HandTracker, Hands, RenderSurface, Rgba, TableConfig,
    Tuning,
};

const FIXED_DT: f32 = 1.0 / 60.0;
const TOTAL_FRAMES: u32 = 720;

/// Replays a fixed gesture timeline: settle, preview, aim at the
/// rack, lock the direction, charge, flick.
struct ScriptedTracker {
    frame: u32,
}

impl ScriptedTracker {
    fn new() -> Self {
        Self { frame: 0 }
    }
}

impl HandTracker for ScriptedTracker {
    fn sample(&mut self) -> Hands {
        let frame = self.frame;
        self.frame += 1;

        let left_closed = HandSample::closed(Vec2::new(0.65, 0.7));
        let left_open = HandSample::open(Vec2::new(0.65, 0.7));
        // Pointing at the rack apex from the cue ball.
        let aim_point = Vec2::new(0.5, 0.3375);

        match frame {
            // Let the opening layout settle, hands out of view.
            0..=29 => Hands::none(),
            // Open palm: preview only.
            30..=44 => Hands {
                left: Some(left_open),
                right: Some(HandSample::open(aim_point)),
            },
            // Fist: start aiming.
            45..=89 => Hands {
                left: Some(left_closed),
                right: Some(HandSample::open(aim_point)),
            },
            // Palm opens again: the direction locks.
            90 => Hands {
                left: Some(left_open),
                right: Some(HandSample::open(aim_point)),
            },
            // Drift the right hand outward to charge, slower than the
            // flick cutoff.
            91..=139 => {
                let t = (frame - 90) as f32;
                let y = 0.3375 - t * 0.002;
                Hands {
                    left: Some(left_open),
                    right: Some(HandSample::open(Vec2::new(0.5, y))),
                }
            }
            // Flick away from the cue ball: fire.
            140 => Hands {
                left: Some(left_open),
                right: Some(HandSample::open(Vec2::new(0.5, 0.12))),
            },
            // Hands down, watch the break play out.
            _ => Hands::none(),
        }
    }
}

/// Surface that logs primitives instead of drawing them.
#[derive(Default)]
struct LogSurface {
    primitives: usize,
}

impl LogSurface {
    fn reset(&mut self) {
        self.primitives = 0;
    }
}

impl RenderSurface for LogSurface {
    fn fill_polygon(&mut self, points: &[Vec2], _color: Rgba) {
        self.primitives += 1;
        log::debug!("fill_polygon {} pts", points.len());
    }

    fn stroke_polygon(&mut self, points: &[Vec2], _width: f32, _color: Rgba) {
        self.primitives += 1;
        log::debug!("stroke_polygon {} pts", points.len());
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, _color: Rgba) {
        self.primitives += 1;
        log::debug!("fill_circle ({:.0},{:.0}) r{:.0}", center.x, center.y, radius);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, _width: f32, _color: Rgba) {
        self.primitives += 1;
        log::debug!("stroke_circle ({:.0},{:.0}) r{:.0}", center.x, center.y, radius);
    }

    fn line(&mut self, from: Vec2, to: Vec2, _width: f32, _color: Rgba) {
        self.primitives += 1;
        log::debug!(
            "line ({:.0},{:.0})-({:.0},{:.0})",
            from.x,
            from.y,
            to.x,
            to.y
        );
    }

    fn fill_rect(&mut self, top_left: Vec2, width: f32, height: f32, _color: Rgba) {
        self.primitives += 1;
        log::debug!(
            "fill_rect ({:.0},{:.0}) {:.0}x{:.0}",
            top_left.x,
            top_left.y,
            width,
            height
        );
    }

    fn text(&mut self, _position: Vec2, content: &str, _size: f32, _color: Rgba) {
        self.primitives += 1;
        log::debug!("text {:?}", content);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut game = BilliardsGame::new(TableConfig::default(), Tuning::default());
    let mut tracker = ScriptedTracker::new();
    let mut surface = LogSurface::default();

    log::info!(
        "starting scripted session: {} balls, {} frames",
        game.ball_count(),
        TOTAL_FRAMES
    );

    for frame in 0..TOTAL_FRAMES {
        let hands = tracker.sample();
        game.advance(FIXED_DT, &hands);

        surface.reset();
        draw_frame(&mut surface, &game);

        if frame % 60 == 0 {
            log::info!(
                "frame {:3}: phase {:?}, power {:4.1}, score {:3}, balls {:2}, moving {}, {} primitives",
                frame,
                game.aim().phase(),
                game.aim().power(),
                game.score(),
                game.ball_count(),
                game.balls_moving(),
                surface.primitives
            );
        }
    }

    log::info!(
        "session over: score {}, {} balls left on the table",
        game.score(),
        game.ball_count()
    );
}
