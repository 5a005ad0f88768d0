//! Crag - deterministic simulation core for a tile-based 2D platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (object registry, movement, behaviors)
//! - `rng`: Legacy-compatible pseudo-random generator
//! - `host`: Platform boundary (blitting, audio, tiles, input)
//! - `savestate`: Flat byte-blob state capture/restore
//!
//! The simulation is fixed-timestep and single-threaded: the host calls
//! `update()` and `draw()` alternately once per 30 Hz frame tick. Given the
//! same seed and the same button sequence, every run is bit-identical.

pub mod host;
pub mod rng;
pub mod savestate;
pub mod sim;

pub use host::{Button, Host};
pub use rng::Rng;
pub use sim::object::{Object, ObjectKind, ObjectType};
pub use sim::state::Game;

/// Game tuning constants
///
/// These are gameplay-feel contracts, not defaults: replay compatibility
/// depends on every one of them.
pub mod consts {
    /// Concurrent object capacity; spawns beyond this fail softly
    pub const MAX_OBJECTS: usize = 30;
    /// One collectible per level
    pub const FRUIT_COUNT: usize = 30;

    /// Screen size in pixels (one room)
    pub const SCREEN: f32 = 128.0;

    /// Ground run speed cap
    pub const MAX_RUN: f32 = 1.0;
    /// Horizontal acceleration on the ground
    pub const GROUND_ACCEL: f32 = 0.6;
    /// Horizontal acceleration while airborne
    pub const AIR_ACCEL: f32 = 0.4;
    /// Horizontal acceleration on ice
    pub const ICE_ACCEL: f32 = 0.05;
    /// Deceleration applied above the run cap
    pub const DECCEL: f32 = 0.15;
    /// Per-frame gravity (halved near the jump apex)
    pub const GRAVITY: f32 = 0.21;
    /// Terminal fall speed
    pub const MAX_FALL: f32 = 2.0;
    /// Terminal fall speed while wall-sliding
    pub const WALL_SLIDE_MAX_FALL: f32 = 0.4;
    /// Jump takeoff speed
    pub const JUMP_SPEED: f32 = -2.0;
    /// Frames a jump press stays buffered
    pub const JUMP_BUFFER_FRAMES: i32 = 4;
    /// Frames after leaving ground during which a jump still counts
    pub const GRACE_FRAMES: i32 = 6;
    /// Dash burst speed
    pub const DASH_SPEED: f32 = 5.0;
    /// Frames a dash overrides normal movement
    pub const DASH_TIME: i32 = 4;
    /// Frames the dash keeps breaking fake walls after it ends
    pub const DASH_EFFECT_TIME: i32 = 10;
    /// Frames between death and room reload
    pub const RESTART_DELAY: i32 = 15;
}

/// Clamp `val` to `[a, b]`
#[inline]
pub fn clamp(val: f32, a: f32, b: f32) -> f32 {
    a.max(b.min(val))
}

/// Move `val` toward `target` by at most `amount`
#[inline]
pub fn appr(val: f32, target: f32, amount: f32) -> f32 {
    if val > target {
        (val - amount).max(target)
    } else {
        (val + amount).min(target)
    }
}

/// Sign of `v`, with `sign(0) == 0`
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Sine over a [0,1) turn, negated
///
/// The legacy convention: angles are fractions of a full turn and the wave
/// is flipped so positive phases move *down* in screen space. Cosmetic
/// motion (fruit bobbing, orb dots, hair) depends on this exact curve.
#[inline]
pub fn p8_sin(x: f32) -> f32 {
    -(x * std::f32::consts::TAU).sin()
}

/// Cosine counterpart of [`p8_sin`]: `cos(x) = sin(x + 1/4 turn)`
#[inline]
pub fn p8_cos(x: f32) -> f32 {
    -p8_sin(x + 0.25)
}

/// Float modulo with an always-non-negative result
#[inline]
pub fn p8_modulo(a: f32, b: f32) -> f32 {
    ((a % b) + b) % b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appr_converges_both_ways() {
        assert_eq!(appr(0.0, 1.0, 0.25), 0.25);
        assert_eq!(appr(2.0, 1.0, 0.25), 1.75);
        // Never overshoots
        assert_eq!(appr(0.9, 1.0, 0.25), 1.0);
        assert_eq!(appr(1.05, 1.0, 0.25), 1.0);
    }

    #[test]
    fn test_sign_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.01), -1.0);
    }

    #[test]
    fn test_p8_trig_convention() {
        // sin(0) = 0, sin(0.25) = -1 (inverted wave)
        assert!(p8_sin(0.0).abs() < 1e-6);
        assert!((p8_sin(0.25) + 1.0).abs() < 1e-6);
        assert!((p8_cos(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_p8_modulo_negative() {
        assert!((p8_modulo(-1.0, 8.0) - 7.0).abs() < 1e-6);
        assert!((p8_modulo(9.0, 8.0) - 1.0).abs() < 1e-6);
    }
}
