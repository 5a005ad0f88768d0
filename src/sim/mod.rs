//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `update` = one 30 Hz frame)
//! - Seeded RNG only
//! - Slot-ordered iteration with compaction-aware retry
//! - No rendering or platform dependencies beyond the `Host` trait

pub mod effects;
pub mod motion;
pub mod object;
pub mod objects;
pub mod player;
pub mod room;
pub mod state;
pub mod tick;
pub mod tile;

pub use object::{Hitbox, Object, ObjectKind, ObjectType, Slots};
pub use state::Game;
