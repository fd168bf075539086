//! Presentation layer: turns game state into draw primitives.
//!
//! Nothing in here rasterizes. The frame composer walks the game state
//! and emits primitives to a [`RenderSurface`]; the host (a window, a
//! canvas bridge, a test) decides what pixels mean. The
//! [`RecordingSurface`] double captures the primitive stream so tests
//! can assert on what would have been drawn.

use glam::Vec2;

use crate::game::{AimPhase, BilliardsGame};

/// RGBA color for draw operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Create a color from RGBA components (0.0 - 1.0).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGB u8 values (0-255) with full opacity.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Create a color with the given alpha value.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const ORANGE: Self = Self::rgb(1.0, 0.5, 0.0);
    pub const PURPLE: Self = Self::rgb(0.5, 0.0, 1.0);
    pub const GRAY: Self = Self::rgb(0.5, 0.5, 0.5);
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Output target for the frame composer.
///
/// One method per primitive the composer needs; dashed lines and
/// arrows are composed from these, not part of the contract.
pub trait RenderSurface {
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);
    fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    fn fill_rect(&mut self, top_left: Vec2, width: f32, height: f32, color: Rgba);
    fn text(&mut self, position: Vec2, content: &str, size: f32, color: Rgba);
}

/// One captured primitive, for test assertions and headless logging.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    FillPolygon { points: Vec<Vec2>, color: Rgba },
    StrokePolygon { points: Vec<Vec2>, width: f32, color: Rgba },
    FillCircle { center: Vec2, radius: f32, color: Rgba },
    StrokeCircle { center: Vec2, radius: f32, width: f32, color: Rgba },
    Line { from: Vec2, to: Vec2, width: f32, color: Rgba },
    FillRect { top_left: Vec2, width: f32, height: f32, color: Rgba },
    Text { position: Vec2, content: String, size: f32, color: Rgba },
}

/// Surface that records every primitive instead of drawing it.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// All text primitives, flattened to their contents.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn rect_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::FillRect { .. }))
            .count()
    }
}

impl RenderSurface for RecordingSurface {
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        self.calls.push(DrawCall::FillPolygon { points: points.to_vec(), color });
    }

    fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        self.calls.push(DrawCall::StrokePolygon { points: points.to_vec(), width, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.calls.push(DrawCall::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        self.calls.push(DrawCall::StrokeCircle { center, radius, width, color });
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.calls.push(DrawCall::Line { from, to, width, color });
    }

    fn fill_rect(&mut self, top_left: Vec2, width: f32, height: f32, color: Rgba) {
        self.calls.push(DrawCall::FillRect { top_left, width, height, color });
    }

    fn text(&mut self, position: Vec2, content: &str, size: f32, color: Rgba) {
        self.calls.push(DrawCall::Text {
            position,
            content: content.to_string(),
            size,
            color,
        });
    }
}

/// Draw a dashed line as alternating solid segments.
pub fn dashed_line(
    surface: &mut dyn RenderSurface,
    from: Vec2,
    to: Vec2,
    dash: f32,
    gap: f32,
    width: f32,
    color: Rgba,
) {
    let total = from.distance(to);
    if total < f32::EPSILON || dash <= 0.0 {
        return;
    }
    let dir = (to - from) / total;
    let mut t = 0.0;
    while t < total {
        let end = (t + dash).min(total);
        surface.line(from + dir * t, from + dir * end, width, color);
        t = end + gap;
    }
}

/// Draw a line with a V-shaped arrowhead at `to`.
pub fn arrow(
    surface: &mut dyn RenderSurface,
    from: Vec2,
    to: Vec2,
    head: f32,
    width: f32,
    color: Rgba,
) {
    surface.line(from, to, width, color);
    let delta = to - from;
    if delta.length_squared() < f32::EPSILON {
        return;
    }
    let dir = delta.normalize();
    let left = Vec2::new(-dir.y, dir.x);
    surface.line(to, to - dir * head + left * head * 0.5, width, color);
    surface.line(to, to - dir * head - left * head * 0.5, width, color);
}

const FELT: Rgba = Rgba::rgb(0.05, 0.35, 0.12);
const RAIL: Rgba = Rgba::rgb(0.35, 0.20, 0.08);
const BACKGROUND: Rgba = Rgba::rgb(0.08, 0.08, 0.10);
const PREVIEW: Rgba = Rgba::rgb8(120, 190, 255);
const AIM: Rgba = Rgba::RED;
const SHADOW: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.35);

const POWER_BAR_WIDTH: f32 = 400.0;
const POWER_BAR_HEIGHT: f32 = 40.0;

/// Compose a full frame: table, pockets, aim overlays, balls, HUD.
///
/// Draw order is back to front; overlays go under the balls so the cue
/// ball sits on top of its own aim line.
pub fn draw_frame(surface: &mut dyn RenderSurface, game: &BilliardsGame) {
    let screen = game.table_config().screen_size();
    surface.fill_rect(Vec2::ZERO, screen.x, screen.y, BACKGROUND);

    let corners = game.geometry().corners();
    surface.fill_polygon(&corners, FELT);
    surface.stroke_polygon(&corners, 8.0, RAIL);

    for pocket in game.pockets() {
        surface.fill_circle(pocket.position, pocket.radius, Rgba::BLACK);
        surface.stroke_circle(pocket.position, pocket.radius, 2.0, Rgba::GRAY);
    }

    draw_aim_overlays(surface, game);

    for ball in game.ball_views() {
        let radius = game.tuning().ball_radius;
        surface.fill_circle(ball.position + Vec2::new(3.0, 3.0), radius, SHADOW);
        surface.fill_circle(ball.position, radius, ball.color);
        surface.stroke_circle(ball.position, radius, 1.5, Rgba::WHITE);
        if !ball.is_cue {
            surface.text(
                ball.position - Vec2::new(4.0, 6.0),
                &ball.id.0.to_string(),
                12.0,
                Rgba::WHITE,
            );
        }
    }

    draw_hud(surface, game, screen);
}

fn draw_aim_overlays(surface: &mut dyn RenderSurface, game: &BilliardsGame) {
    if let Some((from, to)) = game.preview() {
        dashed_line(surface, from, to, 12.0, 8.0, 2.0, PREVIEW);
        arrow(surface, to - (to - from).normalize_or_zero() * 24.0, to, 14.0, 2.0, PREVIEW);
    }

    let aim = game.aim();
    match aim.phase() {
        AimPhase::SelectingDirection => {
            surface.line(aim.origin(), aim.target(), 3.0, AIM);
            surface.fill_circle(aim.origin(), 5.0, AIM);
            surface.fill_circle(aim.target(), 5.0, AIM);
        }
        AimPhase::ChargingPower => {
            if let Some(dir) = aim.frozen_direction() {
                let tip = aim.origin() + dir * game.tuning().aim_reference_length;
                arrow(surface, aim.origin(), tip, 16.0, 3.0, AIM);
            }
        }
        AimPhase::Idle => {}
    }
}

fn draw_hud(surface: &mut dyn RenderSurface, game: &BilliardsGame, screen: Vec2) {
    surface.text(
        Vec2::new(20.0, 30.0),
        &format!("SCORE: {}", game.score()),
        24.0,
        Rgba::WHITE,
    );

    let aim = game.aim();
    if aim.phase() == AimPhase::ChargingPower {
        draw_power_bar(surface, screen, aim.power(), game.tuning().power_max);
    }

    let banner = if game.balls_moving() {
        "Balls in motion..."
    } else {
        match aim.phase() {
            AimPhase::Idle => "Close left hand to aim",
            AimPhase::SelectingDirection => "Move right hand to aim, open left to lock",
            AimPhase::ChargingPower => "Pull back to charge, flick to shoot",
        }
    };
    surface.text(
        Vec2::new(20.0, screen.y - 20.0),
        banner,
        18.0,
        Rgba::YELLOW,
    );
}

fn draw_power_bar(surface: &mut dyn RenderSurface, screen: Vec2, power: f32, power_max: f32) {
    let top_left = Vec2::new((screen.x - POWER_BAR_WIDTH) * 0.5, 60.0);
    surface.fill_rect(top_left, POWER_BAR_WIDTH, POWER_BAR_HEIGHT, Rgba::rgb(0.15, 0.15, 0.15));

    let frac = if power_max > 0.0 {
        (power / power_max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let fill_color = if frac < 1.0 / 3.0 {
        Rgba::GREEN
    } else if frac < 2.0 / 3.0 {
        Rgba::YELLOW
    } else {
        Rgba::RED
    };
    if frac > 0.0 {
        surface.fill_rect(top_left, POWER_BAR_WIDTH * frac, POWER_BAR_HEIGHT, fill_color);
    }
    surface.stroke_polygon(
        &[
            top_left,
            top_left + Vec2::new(POWER_BAR_WIDTH, 0.0),
            top_left + Vec2::new(POWER_BAR_WIDTH, POWER_BAR_HEIGHT),
            top_left + Vec2::new(0.0, POWER_BAR_HEIGHT),
        ],
        2.0,
        Rgba::WHITE,
    );
    surface.text(
        top_left + Vec2::new(POWER_BAR_WIDTH * 0.5 - 60.0, POWER_BAR_HEIGHT + 20.0),
        &format!("POWER: {:.1}/{:.0}", power, power_max),
        18.0,
        Rgba::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashed_line_alternates_segments() {
        let mut surface = RecordingSurface::new();
        dashed_line(&mut surface, Vec2::ZERO, Vec2::new(100.0, 0.0), 10.0, 10.0, 1.0, Rgba::WHITE);
        // 100 units of 10-on / 10-off = 5 dashes
        assert_eq!(surface.calls.len(), 5, "calls: {:?}", surface.calls);
        match &surface.calls[1] {
            DrawCall::Line { from, to, .. } => {
                assert!((from.x - 20.0).abs() < 1e-4);
                assert!((to.x - 30.0).abs() < 1e-4);
            }
            other => panic!("expected Line, got {:?}", other),
        }
    }

    #[test]
    fn dashed_line_degenerate_is_silent() {
        let mut surface = RecordingSurface::new();
        dashed_line(&mut surface, Vec2::ONE, Vec2::ONE, 10.0, 5.0, 1.0, Rgba::WHITE);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn arrow_has_shaft_and_two_head_strokes() {
        let mut surface = RecordingSurface::new();
        arrow(&mut surface, Vec2::ZERO, Vec2::new(50.0, 0.0), 10.0, 2.0, Rgba::RED);
        assert_eq!(surface.calls.len(), 3);
    }

    #[test]
    fn recording_surface_captures_text() {
        let mut surface = RecordingSurface::new();
        surface.text(Vec2::ZERO, "SCORE: 50", 24.0, Rgba::WHITE);
        assert_eq!(surface.texts(), vec!["SCORE: 50"]);
    }
}
