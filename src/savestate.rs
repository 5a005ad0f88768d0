//! Flat byte-blob state capture/restore
//!
//! The whole mutable session is serialized as a fixed-order little-endian
//! concatenation of every field: RNG words, globals, cosmetic layers, then
//! the object table as fixed-size records (padded to the largest variant),
//! so the blob size is a build constant. Save and load walk the exact same
//! order; a save/load/save round trip is bit-identical.
//!
//! Capture only between frames. The buffer must be exactly
//! [`Game::state_size`] bytes; anything else is an upstream contract
//! violation.

use glam::{IVec2, Vec2};

use crate::consts::{FRUIT_COUNT, MAX_OBJECTS};
use crate::host::Host;
use crate::sim::effects::{Cloud, DeadParticle, Particle};
use crate::sim::object::{
    BalloonState, BigChestState, ChestParticle, FallFloorState, Hitbox, Object, ObjectKind,
    ObjectType, Player, PlayerSpawn, SpawnState, SpringState, BIG_CHEST_PARTICLES,
};
use crate::sim::state::Game;

const CLOUD_BYTES: usize = 16;
const PARTICLE_BYTES: usize = 24;
const DEAD_PARTICLE_BYTES: usize = 21;
const CHEST_PARTICLE_BYTES: usize = 16;

/// Largest per-type payload: the big chest's particle curtain
const KIND_BYTES: usize = 1 + 4 + 1 + BIG_CHEST_PARTICLES * CHEST_PARTICLE_BYTES;
/// id, type, position, hitbox, velocity, remainder, flags, sprite
const OBJECT_HEADER_BYTES: usize = 2 + 1 + 8 + 16 + 8 + 8 + 2 + 4 + 2;
const OBJECT_BYTES: usize = OBJECT_HEADER_BYTES + KIND_BYTES;

const GLOBALS_BYTES: usize =
    8 + 8 + 4 + 4 + 1 + 4 + FRUIT_COUNT + 1 + 4 + 1 + 1 + 1 + 4 + 1 + 4 + 4 + 4 + 4 + 4 + 1 + 4;

/// Total blob size; constant for a given build
pub const STATE_SIZE: usize = GLOBALS_BYTES
    + 17 * CLOUD_BYTES
    + 25 * PARTICLE_BYTES
    + 8 * DEAD_PARTICLE_BYTES
    + 2 // spawn id counter
    + 1 // live object count
    + MAX_OBJECTS * OBJECT_BYTES;

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self, v: u8) {
        self.buf[self.pos] = v;
        self.pos += 1;
    }

    fn bool(&mut self, v: bool) {
        self.u8(v as u8);
    }

    fn u16(&mut self, v: u16) {
        self.buf[self.pos..self.pos + 2].copy_from_slice(&v.to_le_bytes());
        self.pos += 2;
    }

    fn u32(&mut self, v: u32) {
        self.buf[self.pos..self.pos + 4].copy_from_slice(&v.to_le_bytes());
        self.pos += 4;
    }

    fn i32(&mut self, v: i32) {
        self.u32(v as u32);
    }

    fn f32(&mut self, v: f32) {
        self.u32(v.to_bits());
    }

    fn vec2(&mut self, v: Vec2) {
        self.f32(v.x);
        self.f32(v.y);
    }

    /// Zero-fill up to an absolute offset (padding must be deterministic)
    fn pad_to(&mut self, pos: usize) {
        debug_assert!(pos >= self.pos);
        self.buf[self.pos..pos].fill(0);
        self.pos = pos;
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self) -> u8 {
        let v = self.buf[self.pos];
        self.pos += 1;
        v
    }

    fn bool(&mut self) -> bool {
        self.u8() != 0
    }

    fn u16(&mut self) -> u16 {
        let v = u16::from_le_bytes(self.buf[self.pos..self.pos + 2].try_into().unwrap());
        self.pos += 2;
        v
    }

    fn u32(&mut self) -> u32 {
        let v = u32::from_le_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        v
    }

    fn i32(&mut self) -> i32 {
        self.u32() as i32
    }

    fn f32(&mut self) -> f32 {
        f32::from_bits(self.u32())
    }

    fn vec2(&mut self) -> Vec2 {
        Vec2::new(self.f32(), self.f32())
    }

    fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }
}

fn object_type_from(v: u8) -> ObjectType {
    match v {
        0 => ObjectType::Player,
        1 => ObjectType::PlayerSpawn,
        2 => ObjectType::Spring,
        3 => ObjectType::Balloon,
        4 => ObjectType::Smoke,
        5 => ObjectType::Platform,
        6 => ObjectType::FallFloor,
        7 => ObjectType::Fruit,
        8 => ObjectType::FlyFruit,
        9 => ObjectType::FakeWall,
        10 => ObjectType::Key,
        11 => ObjectType::Chest,
        12 => ObjectType::Lifeup,
        13 => ObjectType::Message,
        14 => ObjectType::BigChest,
        15 => ObjectType::Orb,
        16 => ObjectType::Flag,
        _ => ObjectType::RoomTitle,
    }
}

fn write_kind(w: &mut Writer, kind: &ObjectKind) {
    match kind {
        ObjectKind::Player(p) => {
            w.bool(p.p_jump);
            w.bool(p.p_dash);
            w.i32(p.grace);
            w.i32(p.jbuffer);
            w.i32(p.djump);
            w.i32(p.dash_time);
            w.i32(p.dash_effect_time);
            w.vec2(p.dash_target);
            w.vec2(p.dash_accel);
            w.f32(p.spr_off);
            w.bool(p.was_on_ground);
            for h in &p.hair {
                w.vec2(*h);
            }
        }
        ObjectKind::PlayerSpawn(ps) => {
            w.vec2(ps.target);
            w.u8(ps.state as u8);
            w.i32(ps.delay);
            for h in &ps.hair {
                w.vec2(*h);
            }
        }
        ObjectKind::Spring {
            state,
            delay,
            hide_in,
            hide_for,
        } => {
            w.u8(*state as u8);
            w.i32(*delay);
            w.i32(*hide_in);
            w.i32(*hide_for);
        }
        ObjectKind::Balloon {
            state,
            offset,
            start,
            timer,
        } => {
            w.u8(*state as u8);
            w.f32(*offset);
            w.f32(*start);
            w.i32(*timer);
        }
        ObjectKind::Smoke | ObjectKind::FakeWall | ObjectKind::Key | ObjectKind::Orb => {}
        ObjectKind::Platform { dir, last } => {
            w.f32(*dir);
            w.f32(*last);
        }
        ObjectKind::FallFloor { state, delay } => {
            w.u8(*state as u8);
            w.i32(*delay);
        }
        ObjectKind::Fruit { start, off } => {
            w.f32(*start);
            w.f32(*off);
        }
        ObjectKind::FlyFruit {
            start,
            fly,
            step,
            sfx_delay,
        } => {
            w.f32(*start);
            w.bool(*fly);
            w.f32(*step);
            w.i32(*sfx_delay);
        }
        ObjectKind::Chest { start, timer } => {
            w.f32(*start);
            w.i32(*timer);
        }
        ObjectKind::Lifeup { duration, flash } => {
            w.i32(*duration);
            w.f32(*flash);
        }
        ObjectKind::Message { index, last } => {
            w.f32(*index);
            w.f32(*last);
        }
        ObjectKind::BigChest {
            state,
            timer,
            particles,
        } => {
            w.u8(*state as u8);
            w.i32(*timer);
            w.u8(particles.len() as u8);
            for p in particles {
                w.f32(p.x);
                w.f32(p.y);
                w.f32(p.spd);
                w.f32(p.h);
            }
        }
        ObjectKind::Flag { score, show } => {
            w.i32(*score);
            w.bool(*show);
        }
        ObjectKind::RoomTitle { delay } => {
            w.i32(*delay);
        }
    }
}

fn read_kind(r: &mut Reader, ty: ObjectType) -> ObjectKind {
    match ty {
        ObjectType::Player => {
            let mut p = Player {
                p_jump: r.bool(),
                p_dash: r.bool(),
                grace: r.i32(),
                jbuffer: r.i32(),
                djump: r.i32(),
                dash_time: r.i32(),
                dash_effect_time: r.i32(),
                dash_target: r.vec2(),
                dash_accel: r.vec2(),
                spr_off: r.f32(),
                was_on_ground: r.bool(),
                hair: [Vec2::ZERO; 5],
            };
            for h in &mut p.hair {
                *h = r.vec2();
            }
            ObjectKind::Player(p)
        }
        ObjectType::PlayerSpawn => {
            let target = r.vec2();
            let state = match r.u8() {
                0 => SpawnState::Rising,
                1 => SpawnState::Falling,
                _ => SpawnState::Landing,
            };
            let delay = r.i32();
            let mut hair = [Vec2::ZERO; 5];
            for h in &mut hair {
                *h = r.vec2();
            }
            ObjectKind::PlayerSpawn(PlayerSpawn {
                target,
                state,
                delay,
                hair,
            })
        }
        ObjectType::Spring => ObjectKind::Spring {
            state: match r.u8() {
                0 => SpringState::Idle,
                1 => SpringState::Compressed,
                _ => SpringState::Hidden,
            },
            delay: r.i32(),
            hide_in: r.i32(),
            hide_for: r.i32(),
        },
        ObjectType::Balloon => ObjectKind::Balloon {
            state: if r.u8() == 0 {
                BalloonState::Floating
            } else {
                BalloonState::Hidden
            },
            offset: r.f32(),
            start: r.f32(),
            timer: r.i32(),
        },
        ObjectType::Smoke => ObjectKind::Smoke,
        ObjectType::Platform => ObjectKind::Platform {
            dir: r.f32(),
            last: r.f32(),
        },
        ObjectType::FallFloor => ObjectKind::FallFloor {
            state: match r.u8() {
                0 => FallFloorState::Idle,
                1 => FallFloorState::Shaking,
                _ => FallFloorState::Hidden,
            },
            delay: r.i32(),
        },
        ObjectType::Fruit => ObjectKind::Fruit {
            start: r.f32(),
            off: r.f32(),
        },
        ObjectType::FlyFruit => ObjectKind::FlyFruit {
            start: r.f32(),
            fly: r.bool(),
            step: r.f32(),
            sfx_delay: r.i32(),
        },
        ObjectType::FakeWall => ObjectKind::FakeWall,
        ObjectType::Key => ObjectKind::Key,
        ObjectType::Chest => ObjectKind::Chest {
            start: r.f32(),
            timer: r.i32(),
        },
        ObjectType::Lifeup => ObjectKind::Lifeup {
            duration: r.i32(),
            flash: r.f32(),
        },
        ObjectType::Message => ObjectKind::Message {
            index: r.f32(),
            last: r.f32(),
        },
        ObjectType::BigChest => {
            let state = match r.u8() {
                0 => BigChestState::Closed,
                1 => BigChestState::Opening,
                _ => BigChestState::Open,
            };
            let timer = r.i32();
            let count = (r.u8() as usize).min(BIG_CHEST_PARTICLES);
            let mut particles = Vec::with_capacity(count);
            for _ in 0..count {
                particles.push(ChestParticle {
                    x: r.f32(),
                    y: r.f32(),
                    spd: r.f32(),
                    h: r.f32(),
                });
            }
            ObjectKind::BigChest {
                state,
                timer,
                particles,
            }
        }
        ObjectType::Orb => ObjectKind::Orb,
        ObjectType::Flag => ObjectKind::Flag {
            score: r.i32(),
            show: r.bool(),
        },
        ObjectType::RoomTitle => ObjectKind::RoomTitle { delay: r.i32() },
    }
}

fn write_object(w: &mut Writer, o: &Object) {
    w.u16(o.id);
    w.u8(o.ty() as u8);
    w.f32(o.x);
    w.f32(o.y);
    w.i32(o.hitbox.x);
    w.i32(o.hitbox.y);
    w.i32(o.hitbox.w);
    w.i32(o.hitbox.h);
    w.vec2(o.spd);
    w.vec2(o.rem);
    w.bool(o.collideable);
    w.bool(o.solids);
    w.f32(o.spr);
    w.bool(o.flip_x);
    w.bool(o.flip_y);
    write_kind(w, &o.kind);
}

fn read_object(r: &mut Reader) -> Object {
    let id = r.u16();
    let ty = object_type_from(r.u8());
    let mut o = Object::new(id, ty, 0.0, 0.0);
    o.x = r.f32();
    o.y = r.f32();
    o.hitbox = Hitbox::new(r.i32(), r.i32(), r.i32(), r.i32());
    o.spd = r.vec2();
    o.rem = r.vec2();
    o.collideable = r.bool();
    o.solids = r.bool();
    o.spr = r.f32();
    o.flip_x = r.bool();
    o.flip_y = r.bool();
    o.kind = read_kind(r, ty);
    o
}

impl<H: Host> Game<H> {
    /// Exact blob size required by save/load
    pub fn state_size(&self) -> usize {
        STATE_SIZE
    }

    /// Capture the entire session into `buf` (between frames only)
    pub fn save_state(&self, buf: &mut [u8]) {
        assert_eq!(
            buf.len(),
            STATE_SIZE,
            "state buffer must be exactly state_size() bytes"
        );
        let mut w = Writer::new(buf);

        w.u32(self.rng.lo);
        w.u32(self.rng.hi);
        w.i32(self.room.x);
        w.i32(self.room.y);
        w.i32(self.freeze);
        w.i32(self.shake);
        w.bool(self.will_restart);
        w.i32(self.delay_restart);
        for got in &self.got_fruit {
            w.bool(*got);
        }
        w.bool(self.has_dashed);
        w.i32(self.sfx_timer);
        w.bool(self.has_key);
        w.bool(self.pause_player);
        w.bool(self.flash_bg);
        w.i32(self.music_timer);
        w.bool(self.new_bg);
        w.i32(self.frames);
        w.i32(self.seconds);
        w.i32(self.minutes);
        w.i32(self.deaths);
        w.i32(self.max_djump);
        w.bool(self.start_game);
        w.i32(self.start_game_flash);

        for c in &self.clouds {
            w.f32(c.x);
            w.f32(c.y);
            w.f32(c.spd);
            w.f32(c.w);
        }
        for p in &self.particles {
            w.f32(p.x);
            w.f32(p.y);
            w.f32(p.s);
            w.f32(p.spd);
            w.f32(p.off);
            w.f32(p.c);
        }
        for d in &self.dead_particles {
            w.bool(d.active);
            w.f32(d.x);
            w.f32(d.y);
            w.f32(d.t);
            w.vec2(d.spd);
        }

        w.u16(self.objects.next_id());
        w.u8(self.objects.len() as u8);
        let base = w.pos;
        for (i, o) in self.objects.iter().enumerate() {
            w.pad_to(base + i * OBJECT_BYTES);
            write_object(&mut w, o);
        }
        w.pad_to(STATE_SIZE);
    }

    /// Restore a blob previously produced by [`save_state`](Self::save_state)
    pub fn load_state(&mut self, buf: &[u8]) {
        assert_eq!(
            buf.len(),
            STATE_SIZE,
            "state buffer must be exactly state_size() bytes"
        );
        let mut r = Reader::new(buf);

        self.rng.lo = r.u32();
        self.rng.hi = r.u32();
        self.room = IVec2::new(r.i32(), r.i32());
        self.freeze = r.i32();
        self.shake = r.i32();
        self.will_restart = r.bool();
        self.delay_restart = r.i32();
        for got in &mut self.got_fruit {
            *got = r.bool();
        }
        self.has_dashed = r.bool();
        self.sfx_timer = r.i32();
        self.has_key = r.bool();
        self.pause_player = r.bool();
        self.flash_bg = r.bool();
        self.music_timer = r.i32();
        self.new_bg = r.bool();
        self.frames = r.i32();
        self.seconds = r.i32();
        self.minutes = r.i32();
        self.deaths = r.i32();
        self.max_djump = r.i32();
        self.start_game = r.bool();
        self.start_game_flash = r.i32();

        for c in &mut self.clouds {
            *c = Cloud {
                x: r.f32(),
                y: r.f32(),
                spd: r.f32(),
                w: r.f32(),
            };
        }
        for p in &mut self.particles {
            *p = Particle {
                x: r.f32(),
                y: r.f32(),
                s: r.f32(),
                spd: r.f32(),
                off: r.f32(),
                c: r.f32(),
            };
        }
        for d in &mut self.dead_particles {
            *d = DeadParticle {
                active: r.bool(),
                x: r.f32(),
                y: r.f32(),
                t: r.f32(),
                spd: r.vec2(),
            };
        }

        let next_id = r.u16();
        let count = (r.u8() as usize).min(MAX_OBJECTS);
        let base = r.pos;
        self.objects.clear();
        self.objects.set_next_id(next_id);
        for i in 0..count {
            r.seek(base + i * OBJECT_BYTES);
            let obj = read_object(&mut r);
            self.objects.push(obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;
    use crate::sim::object::ObjectType;
    use crate::sim::state::Game;

    fn started_game() -> Game<NullHost> {
        let mut game = Game::new(NullHost);
        game.set_random_seed(0xc0ffee);
        game.init();
        game
    }

    #[test]
    fn test_round_trip_is_bit_identical() {
        let mut game = started_game();
        game.spawn(ObjectType::Player, 16.0, 104.0);
        game.spawn(ObjectType::Spring, 40.0, 112.0);
        for _ in 0..10 {
            game.update();
        }

        let mut snapshot = vec![0u8; game.state_size()];
        game.save_state(&mut snapshot);

        // Diverge, then restore
        for _ in 0..25 {
            game.update();
        }
        let mut diverged = vec![0u8; game.state_size()];
        game.save_state(&mut diverged);
        assert_ne!(snapshot, diverged);

        game.load_state(&snapshot);
        let mut restored = vec![0u8; game.state_size()];
        game.save_state(&mut restored);
        assert_eq!(snapshot, restored);
    }

    #[test]
    fn test_restore_resumes_identically() {
        let mut game = started_game();
        game.spawn(ObjectType::Player, 16.0, 104.0);
        for _ in 0..5 {
            game.update();
        }
        let mut snapshot = vec![0u8; game.state_size()];
        game.save_state(&mut snapshot);

        // Run 10 frames from the snapshot, twice; both runs must agree
        for _ in 0..10 {
            game.update();
        }
        let mut run_a = vec![0u8; game.state_size()];
        game.save_state(&mut run_a);

        game.load_state(&snapshot);
        for _ in 0..10 {
            game.update();
        }
        let mut run_b = vec![0u8; game.state_size()];
        game.save_state(&mut run_b);
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_state_size_is_constant() {
        let game = started_game();
        let mut other = started_game();
        other.spawn(ObjectType::BigChest, 64.0, 64.0);
        assert_eq!(game.state_size(), other.state_size());
        assert_eq!(game.state_size(), STATE_SIZE);
    }
}
