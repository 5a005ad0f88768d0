//! Movement/collision resolver
//!
//! Motion accumulates into a per-object sub-pixel remainder; whole pixels
//! are extracted with `floor(rem + 0.5)` and walked one pixel at a time
//! against the tile layer and solid objects. The unit-step sweep (rather
//! than a swept AABB) is a compatibility contract: blocked movement stops
//! exactly at the boundary with velocity and remainder zeroed on that
//! axis, and one-way platforms only block a downward approach.

use crate::host::Host;
use crate::sign;
use crate::sim::object::{Object, ObjectType};
use crate::sim::state::Game;

impl<H: Host> Game<H> {
    /// Would `obj`, displaced by `(ox, oy)`, stand in something solid?
    ///
    /// Covers solid tiles, fall-floors, fake walls, and the one-way
    /// platform rule: a platform only blocks when moving down onto it and
    /// not already horizontally overlapping one.
    pub(crate) fn is_solid(&self, obj: &Object, ox: f32, oy: f32) -> bool {
        if oy > 0.0
            && !self.objects.check(obj, ObjectType::Platform, ox, 0.0)
            && self.objects.check(obj, ObjectType::Platform, ox, oy)
        {
            return true;
        }
        self.solid_at(
            (obj.x + obj.hitbox.x as f32 + ox) as i32,
            (obj.y + obj.hitbox.y as f32 + oy) as i32,
            obj.hitbox.w,
            obj.hitbox.h,
        ) || self.objects.check(obj, ObjectType::FallFloor, ox, oy)
            || self.objects.check(obj, ObjectType::FakeWall, ox, oy)
    }

    /// Would `obj`, displaced by `(ox, oy)`, stand on ice?
    pub(crate) fn is_ice(&self, obj: &Object, ox: f32, oy: f32) -> bool {
        self.ice_at(
            (obj.x + obj.hitbox.x as f32 + ox) as i32,
            (obj.y + obj.hitbox.y as f32 + oy) as i32,
            obj.hitbox.w,
            obj.hitbox.h,
        )
    }

    /// Advance the object in `slot` by its own velocity
    pub(crate) fn move_slot(&mut self, slot: usize) {
        let mut obj = self.objects[slot].clone();
        let (dx, dy) = (obj.spd.x, obj.spd.y);
        self.move_by(&mut obj, dx, dy);
        self.objects[slot] = obj;
    }

    /// Move `obj` by `(ox, oy)`, carrying sub-pixel remainders
    pub(crate) fn move_by(&self, obj: &mut Object, ox: f32, oy: f32) {
        obj.rem.x += ox;
        let amount = (obj.rem.x + 0.5).floor();
        obj.rem.x -= amount;
        self.move_x(obj, amount, 0.0);

        obj.rem.y += oy;
        let amount = (obj.rem.y + 0.5).floor();
        obj.rem.y -= amount;
        self.move_y(obj, amount);
    }

    /// Horizontal unit-step sweep; `start` lets a platform carry skip the
    /// first step
    pub(crate) fn move_x(&self, obj: &mut Object, amount: f32, start: f32) {
        if obj.solids {
            let step = sign(amount);
            let mut i = start;
            while i <= amount.abs() {
                if !self.is_solid(obj, step, 0.0) {
                    obj.x += step;
                } else {
                    obj.spd.x = 0.0;
                    obj.rem.x = 0.0;
                    break;
                }
                i += 1.0;
            }
        } else {
            obj.x += amount;
        }
    }

    /// Vertical unit-step sweep
    pub(crate) fn move_y(&self, obj: &mut Object, amount: f32) {
        if obj.solids {
            let step = sign(amount);
            let mut i = 0.0;
            while i <= amount.abs() {
                if !self.is_solid(obj, 0.0, step) {
                    obj.y += step;
                } else {
                    obj.spd.y = 0.0;
                    obj.rem.y = 0.0;
                    break;
                }
                i += 1.0;
            }
        } else {
            obj.y += amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use crate::sim::object::{Hitbox, Object, ObjectType};
    use glam::Vec2;
    use proptest::prelude::*;

    /// One solid tile column at tx=4 (pixels 32..40), all rows
    struct WallHost;

    impl Host for WallHost {
        fn mget(&self, tx: i32, _ty: i32) -> u8 {
            if tx == 4 { 32 } else { 0 }
        }
        fn fget(&self, tile: u8, flag: u8) -> bool {
            tile == 32 && flag == 0
        }
    }

    fn game() -> Game<WallHost> {
        Game::new(WallHost)
    }

    fn mover(x: f32, y: f32) -> Object {
        Object::new(1, ObjectType::Smoke, x, y)
    }

    #[test]
    fn test_solid_mover_stops_at_tile_boundary() {
        let g = game();
        let mut obj = mover(0.0, 8.0);
        obj.spd = Vec2::new(20.0, 0.0);
        g.move_by(&mut obj, 20.0, 0.0);
        // Right edge flush against the wall at x=32, not inside it
        assert_eq!(obj.x, 24.0);
        assert_eq!(obj.spd.x, 0.0);
        assert_eq!(obj.rem.x, 0.0);
    }

    #[test]
    fn test_non_solid_mover_passes_through() {
        let g = game();
        let mut obj = mover(0.0, 8.0);
        obj.solids = false;
        let spd_before = obj.spd;
        g.move_by(&mut obj, 40.0, 0.0);
        assert_eq!(obj.x, 40.0);
        assert_eq!(obj.spd, spd_before);
    }

    #[test]
    fn test_subpixel_remainder_accumulates() {
        let g = game();
        let mut obj = mover(0.0, 8.0);
        g.move_by(&mut obj, 0.4, 0.0);
        assert_eq!(obj.x, 0.0);
        assert!((obj.rem.x - 0.4).abs() < 1e-6);
        g.move_by(&mut obj, 0.4, 0.0);
        // 0.8 accumulated rounds to one pixel, remainder goes negative
        assert_eq!(obj.x, 1.0);
        assert!((obj.rem.x + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_blocked_while_embedded_zeroes_axis() {
        let g = game();
        // Already overlapping the wall: even a zero-pixel move clears the
        // axis velocity and remainder
        let mut obj = mover(30.0, 8.0);
        obj.spd = Vec2::new(3.0, 0.0);
        obj.rem.x = 0.3;
        g.move_x(&mut obj, 0.0, 0.0);
        assert_eq!(obj.x, 30.0);
        assert_eq!(obj.spd.x, 0.0);
        assert_eq!(obj.rem.x, 0.0);
    }

    #[test]
    fn test_platform_blocks_only_downward() {
        let mut g = game();
        // Hand-built platform at (60, 16), 16x8 like the real one
        let id = g.objects.take_id();
        let mut platform = Object::new(id, ObjectType::Platform, 60.0, 16.0);
        platform.hitbox = Hitbox::new(0, 0, 16, 8);
        platform.solids = false;
        g.objects.push(platform);

        let subject = mover(64.0, 8.0); // bottom edge touching platform top
        assert!(g.is_solid(&subject, 0.0, 1.0));
        assert!(!g.is_solid(&subject, 0.0, -1.0));

        // Already vertically aligned with the platform: falls through
        let inside = mover(64.0, 12.0);
        assert!(!g.is_solid(&inside, 0.0, 1.0));
    }

    proptest! {
        #[test]
        fn prop_solid_sweep_never_tunnels(start_x in 0.0f32..24.0, dx in -30.0f32..30.0) {
            let g = game();
            let mut obj = mover(start_x, 8.0);
            prop_assume!(!g.is_solid(&obj, 0.0, 0.0));
            g.move_by(&mut obj, dx, 0.0);
            // Wherever it ended up, it is not inside the wall
            prop_assert!(!g.is_solid(&obj, 0.0, 0.0));
        }
    }
}
