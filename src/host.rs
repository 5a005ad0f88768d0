//! Platform boundary
//!
//! Everything the simulation needs from the outside world goes through
//! this trait: sprite blitting, primitive drawing, audio triggers, tile
//! map lookups and button state. The core never touches pixels, samples
//! or devices itself, which is what keeps it portable and testable.
//!
//! Every method has a default implementation (no-op drawing/audio, empty
//! world, no input), so a partial host is a configuration gap with no
//! visible effect rather than an error. Hosts override what they support.

/// Button identifiers, in the legacy controller layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Dash,
}

/// Host-provided primitives
///
/// Draw coordinates arrive already truncated toward zero from the
/// simulation's float space. Color and sprite values use the host's own
/// palette/atlas indexing.
pub trait Host {
    /// Blit one 8x8 sprite cell
    fn spr(&mut self, _spr: i32, _x: i32, _y: i32, _flip_x: bool, _flip_y: bool) {}

    /// Poll a button
    fn btn(&self, _b: Button) -> bool {
        false
    }

    /// Trigger a sound effect
    fn sfx(&mut self, _id: i32) {}

    /// Start/stop music (`track` -1 stops, `fade` in ms, `mask` = channels)
    fn music(&mut self, _track: i32, _fade: i32, _mask: i32) {}

    /// Remap palette slot `a` to color `b`
    fn pal(&mut self, _a: i32, _b: i32) {}

    /// Reset all palette remaps
    fn pal_reset(&mut self) {}

    /// Filled circle
    fn circfill(&mut self, _x: i32, _y: i32, _r: i32, _c: i32) {}

    /// Filled rectangle spanning both corner pixels
    fn rectfill(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32, _c: i32) {}

    /// Text at a pixel position
    fn print(&mut self, _s: &str, _x: i32, _y: i32, _c: i32) {}

    /// Line between two pixels
    fn line(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32, _c: i32) {}

    /// Tile id at absolute map coordinates
    fn mget(&self, _tx: i32, _ty: i32) -> u8 {
        0
    }

    /// Flag bit lookup for a tile id
    fn fget(&self, _tile: u8, _flag: u8) -> bool {
        false
    }

    /// Set the camera offset for subsequent drawing
    fn camera(&mut self, _x: i32, _y: i32) {}

    /// Draw a map region filtered by tile flag mask
    fn map(&mut self, _mx: i32, _my: i32, _tx: i32, _ty: i32, _mw: i32, _mh: i32, _mask: u8) {}
}

/// A host that does nothing: empty world, no input, no output
///
/// Useful as a placeholder and in tests that only exercise state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}
