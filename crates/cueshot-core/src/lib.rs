//! Gesture-driven billiards core.
//!
//! The crate owns the table: a Rapier2D world fenced by the four rails
//! of a perspective quadrilateral, a two-phase aim state machine for
//! the cue ball, pocket captures with scoring, and the per-frame
//! arbitration that turns tracked hand samples into shots. Hosts
//! supply the tracker ([`HandTracker`]) and the drawing backend
//! ([`RenderSurface`]); everything between those two seams lives here.

pub mod config;
pub mod core;
pub mod game;
pub mod input;
pub mod render;
pub mod table;

// Re-export key types at crate root for convenience
pub use crate::config::{TableConfig, Tuning};
pub use crate::core::physics::{BallContact, TableWorld};
pub use crate::core::time::FixedTimestep;
pub use crate::game::{AimController, AimPhase, BallView, BilliardsGame};
pub use crate::input::gesture::GestureLoop;
pub use crate::input::tracker::{HandOpenness, HandSample, HandTracker, Hands};
pub use crate::render::{
    draw_frame, DrawCall, RecordingSurface, RenderSurface, Rgba,
};
pub use crate::table::perspective::TableGeometry;
pub use crate::table::pockets::{Pocket, PocketSet, Score};
pub use crate::table::rack::{BallDef, BallId, CUE_COLOR, OBJECT_BALLS};
