//! Tile/world queries
//!
//! The world is an 8x8 grid of 16x16-tile rooms; all queries are
//! room-relative and go through the host's map/flag tables. Box scans
//! divide by the 8-pixel tile size and clamp to the room, so probes that
//! hang off the edge never wrap.
//!
//! Flag-based queries take integer pixel coordinates (callers truncate
//! float positions toward zero); the spike query keeps float coordinates
//! because its trigger bands depend on sub-tile remainders.

use crate::host::Host;
use crate::p8_modulo;
use crate::sim::state::Game;

/// Tile flag: blocks movement
pub const FLAG_SOLID: u8 = 0;
/// Tile flag: slippery surface
pub const FLAG_ICE: u8 = 4;

/// Spike tile ids by facing
const SPIKE_UP: u8 = 17;
const SPIKE_DOWN: u8 = 27;
const SPIKE_RIGHT: u8 = 43;
const SPIKE_LEFT: u8 = 59;

impl<H: Host> Game<H> {
    /// Tile id at a room-relative tile coordinate
    pub fn tile_at(&self, x: i32, y: i32) -> u8 {
        self.host.mget(self.room.x * 16 + x, self.room.y * 16 + y)
    }

    /// True if any tile under the pixel box has `flag` set
    pub fn tile_flag_at(&self, x: i32, y: i32, w: i32, h: i32, flag: u8) -> bool {
        let x1 = ((x + w - 1) / 8).min(15);
        let y1 = ((y + h - 1) / 8).min(15);
        for i in (x / 8).max(0)..=x1 {
            for j in (y / 8).max(0)..=y1 {
                if self.host.fget(self.tile_at(i, j), flag) {
                    return true;
                }
            }
        }
        false
    }

    pub fn solid_at(&self, x: i32, y: i32, w: i32, h: i32) -> bool {
        self.tile_flag_at(x, y, w, h, FLAG_SOLID)
    }

    pub fn ice_at(&self, x: i32, y: i32, w: i32, h: i32) -> bool {
        self.tile_flag_at(x, y, w, h, FLAG_ICE)
    }

    /// Directional hazard check
    ///
    /// A spike only kills when the colliding edge faces the direction of
    /// travel: the edge must sit inside the tile's trigger band and the
    /// velocity along that axis must not be receding. A glancing or
    /// receding contact passes through safely.
    pub fn spikes_at(&self, x: f32, y: f32, w: i32, h: i32, xspd: f32, yspd: f32) -> bool {
        let (w, h) = (w as f32, h as f32);
        let x0 = (x / 8.0).floor().max(0.0) as i32;
        let x1 = ((x + w - 1.0) / 8.0).min(15.0).floor() as i32;
        let y0 = (y / 8.0).floor().max(0.0) as i32;
        let y1 = ((y + h - 1.0) / 8.0).min(15.0).floor() as i32;
        for i in x0..=x1 {
            for j in y0..=y1 {
                let hit = match self.tile_at(i, j) {
                    SPIKE_UP => {
                        (p8_modulo(y + h - 1.0, 8.0) >= 6.0 || y + h == j as f32 * 8.0 + 8.0)
                            && yspd >= 0.0
                    }
                    SPIKE_DOWN => p8_modulo(y, 8.0) <= 2.0 && yspd <= 0.0,
                    SPIKE_RIGHT => p8_modulo(x, 8.0) <= 2.0 && xspd <= 0.0,
                    SPIKE_LEFT => {
                        (p8_modulo(x + w - 1.0, 8.0) >= 6.0 || x + w == i as f32 * 8.0 + 8.0)
                            && xspd >= 0.0
                    }
                    _ => false,
                };
                if hit {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;

    /// Host with one room: solid floor at tile row 14, an up spike at
    /// (2,13) and a down spike at (5,2)
    struct MapHost;

    impl Host for MapHost {
        fn mget(&self, tx: i32, ty: i32) -> u8 {
            match (tx, ty) {
                (2, 13) => 17,
                (5, 2) => 27,
                (_, 14) => 32,
                _ => 0,
            }
        }
        fn fget(&self, tile: u8, flag: u8) -> bool {
            tile == 32 && flag == FLAG_SOLID
        }
    }

    fn game() -> Game<MapHost> {
        Game::new(MapHost)
    }

    #[test]
    fn test_solid_box_scan() {
        let g = game();
        // Fully above the floor
        assert!(!g.solid_at(0, 100, 8, 8));
        // Bottom edge reaching into tile row 14 (y >= 112)
        assert!(g.solid_at(0, 105, 8, 8));
        assert!(g.solid_at(0, 112, 8, 8));
        // A 1px probe just off the floor
        assert!(!g.solid_at(0, 111, 8, 1));
        assert!(g.solid_at(0, 112, 8, 1));
    }

    #[test]
    fn test_solid_scan_clamps_to_room() {
        let g = game();
        // Boxes hanging off the room edge never wrap around
        assert!(!g.solid_at(-20, 0, 8, 8));
        assert!(!g.solid_at(130, 130, 8, 8));
    }

    #[test]
    fn test_up_spike_requires_downward_travel() {
        let g = game();
        // Spike at tile (2,13): pixels 16..24 x 104..112. Box bottom edge
        // deep in the tile's lower band, moving down
        assert!(g.spikes_at(17.0, 106.0, 6, 5, 0.0, 0.0));
        assert!(g.spikes_at(17.0, 106.0, 6, 5, 0.0, 2.0));
        // Moving up: same overlap, no kill
        assert!(!g.spikes_at(17.0, 106.0, 6, 5, 0.0, -1.0));
    }

    #[test]
    fn test_up_spike_trigger_band() {
        let g = game();
        // Bottom edge too shallow into the tile (remainder < 6)
        assert!(!g.spikes_at(17.0, 105.0, 6, 5, 0.0, 1.0));
        // Bottom edge exactly on the tile boundary still triggers
        assert!(g.spikes_at(17.0, 107.0, 6, 5, 0.0, 1.0));
    }

    #[test]
    fn test_down_spike_requires_upward_travel() {
        let g = game();
        // Spike at tile (5,2): pixels 40..48 x 16..24. Box top edge in the
        // band, rising into it
        assert!(g.spikes_at(41.0, 17.0, 6, 5, 0.0, -2.0));
        assert!(g.spikes_at(41.0, 17.0, 6, 5, 0.0, 0.0));
        // Falling away from a ceiling spike is safe
        assert!(!g.spikes_at(41.0, 17.0, 6, 5, 0.0, 1.0));
        // Top edge below the band
        assert!(!g.spikes_at(41.0, 19.5, 6, 5, 0.0, -2.0));
    }
}
