//! Object spawning and non-player behaviors
//!
//! Each behavior is a small state machine with exact timer lengths and
//! trigger geometry; those numbers are externally observable gameplay
//! timing and are not tunable. Behaviors run against the live slot and
//! destroy-then-return when they remove themselves, so nothing ever
//! touches a freed slot.

use glam::Vec2;

use crate::host::Host;
use crate::sim::object::{
    BalloonState, BigChestState, ChestParticle, FallFloorState, Hitbox, Object, ObjectKind,
    ObjectType, SpringState, BIG_CHEST_PARTICLES,
};
use crate::sim::player::fresh_hair;
use crate::sim::state::Game;
use crate::{appr, p8_modulo, p8_sin, sign};

impl<H: Host> Game<H> {
    /// Create an object, apply type defaults and run its init
    ///
    /// Fails softly: fruit-gated types refuse to spawn in a room whose
    /// fruit is already collected, and a full table drops the spawn with
    /// a log line. Either way the simulation continues.
    pub fn spawn(&mut self, ty: ObjectType, x: f32, y: f32) -> Option<usize> {
        if ty.fruit_gated() && self.fruit_collected_here() {
            return None;
        }
        if self.objects.is_full() {
            log::warn!("object table full, dropping {ty:?} spawn");
            return None;
        }

        let id = self.objects.take_id();
        let mut obj = Object::new(id, ty, x, y);

        match &mut obj.kind {
            ObjectKind::Player(p) => {
                p.djump = self.max_djump;
                obj.hitbox = Hitbox::new(1, 3, 6, 5);
                p.hair = fresh_hair(obj.x, obj.y);
            }
            ObjectKind::PlayerSpawn(ps) => {
                self.host.sfx(4);
                obj.spr = 3.0;
                ps.target = Vec2::new(obj.x, obj.y);
                obj.y = 128.0;
                obj.spd.y = -4.0;
                ps.delay = 0;
                obj.solids = false;
                ps.hair = fresh_hair(obj.x, obj.y);
            }
            ObjectKind::Spring { .. } => {}
            ObjectKind::Balloon { offset, start, .. } => {
                *offset = self.rng.rnd(1.0);
                *start = obj.y;
                obj.hitbox = Hitbox::new(-1, -1, 10, 10);
            }
            ObjectKind::Smoke => {
                obj.spr = 29.0;
                obj.spd.y = -0.1;
                obj.spd.x = 0.3 + self.rng.rnd(0.2);
                obj.x += -1.0 + self.rng.rnd(2.0);
                obj.y += -1.0 + self.rng.rnd(2.0);
                obj.flip_x = self.rng.maybe();
                obj.flip_y = self.rng.maybe();
                obj.solids = false;
            }
            ObjectKind::Platform { last, .. } => {
                obj.x -= 4.0;
                obj.solids = false;
                obj.hitbox.w = 16;
                *last = obj.x;
            }
            ObjectKind::FallFloor { .. } => {}
            ObjectKind::Fruit { start, .. } => {
                *start = obj.y;
            }
            ObjectKind::FlyFruit {
                start,
                step,
                sfx_delay,
                ..
            } => {
                *start = obj.y;
                *step = 0.5;
                obj.solids = false;
                *sfx_delay = 8;
            }
            ObjectKind::FakeWall | ObjectKind::Key | ObjectKind::Message { .. } => {}
            ObjectKind::Chest { start, timer } => {
                obj.x -= 4.0;
                *start = obj.x;
                *timer = 20;
            }
            ObjectKind::Lifeup { duration, .. } => {
                obj.spd.y = -0.25;
                *duration = 30;
                obj.x -= 2.0;
                obj.y -= 4.0;
                obj.solids = false;
            }
            ObjectKind::BigChest { .. } => {
                obj.hitbox.w = 16;
            }
            ObjectKind::Orb => {
                obj.spd.y = -4.0;
                obj.solids = false;
            }
            ObjectKind::Flag { score, .. } => {
                obj.x += 5.0;
                *score = self.got_fruit.iter().filter(|&&g| g).count() as i32;
            }
            ObjectKind::RoomTitle { delay } => {
                *delay = 5;
            }
        }

        Some(self.objects.push(obj))
    }

    fn fruit_collected_here(&self) -> bool {
        // The title screen's level index is out of the fruit table; nothing
        // gated can spawn there anyway
        self.got_fruit
            .get(self.level_index() as usize)
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn update_spring(&mut self, slot: usize) {
        let ObjectKind::Spring {
            state,
            delay,
            hide_for,
            ..
        } = self.objects[slot].kind
        else {
            return;
        };

        if hide_for > 0 {
            if let ObjectKind::Spring {
                state,
                delay,
                hide_for,
                ..
            } = &mut self.objects[slot].kind
            {
                *hide_for -= 1;
                if *hide_for <= 0 {
                    *state = SpringState::Idle;
                    *delay = 0;
                }
            }
        } else if state == SpringState::Idle {
            let subject = self.objects[slot].clone();
            if let Some(hit) = self.objects.collide(&subject, ObjectType::Player, 0.0, 0.0) {
                if self.objects[hit].spd.y >= 0.0 {
                    if let ObjectKind::Spring { state, delay, .. } = &mut self.objects[slot].kind {
                        *state = SpringState::Compressed;
                        *delay = 10;
                    }
                    let player = &mut self.objects[hit];
                    player.y = subject.y - 4.0;
                    player.spd.x *= 0.2;
                    player.spd.y = -3.0;
                    if let Some(p) = player.as_player_mut() {
                        p.djump = self.max_djump;
                    }
                    self.spawn(ObjectType::Smoke, subject.x, subject.y);

                    // Chain into a breakable floor below
                    let subject = self.objects[slot].clone();
                    if let Some(below) =
                        self.objects
                            .collide(&subject, ObjectType::FallFloor, 0.0, 1.0)
                    {
                        self.break_fall_floor(below);
                    }
                    self.psfx(8);
                }
            }
        } else if delay > 0 {
            if let ObjectKind::Spring { state, delay, .. } = &mut self.objects[slot].kind {
                *delay -= 1;
                if *delay <= 0 {
                    *state = SpringState::Idle;
                }
            }
        }

        // Begin hiding; the floor break chained above may have just armed
        // this, so re-read the live value
        let armed = matches!(
            self.objects[slot].kind,
            ObjectKind::Spring { hide_in, .. } if hide_in > 0
        );
        if armed {
            if let ObjectKind::Spring {
                state,
                hide_in,
                hide_for,
                ..
            } = &mut self.objects[slot].kind
            {
                *hide_in -= 1;
                if *hide_in <= 0 {
                    *hide_for = 60;
                    *state = SpringState::Hidden;
                }
            }
        }
    }

    pub(crate) fn draw_spring(&mut self, slot: usize) {
        let obj = &self.objects[slot];
        let ObjectKind::Spring { state, .. } = obj.kind else {
            return;
        };
        let (x, y) = (obj.x as i32, obj.y as i32);
        match state {
            SpringState::Idle => self.host.spr(18, x, y, false, false),
            SpringState::Compressed => self.host.spr(19, x, y, false, false),
            SpringState::Hidden => {}
        }
    }

    pub(crate) fn break_spring(&mut self, slot: usize) {
        if let ObjectKind::Spring { hide_in, .. } = &mut self.objects[slot].kind {
            *hide_in = 15;
        }
    }

    pub(crate) fn break_fall_floor(&mut self, slot: usize) {
        let ObjectKind::FallFloor { state, .. } = self.objects[slot].kind else {
            return;
        };
        if state != FallFloorState::Idle {
            return;
        }
        self.psfx(15);
        if let ObjectKind::FallFloor { state, delay } = &mut self.objects[slot].kind {
            *state = FallFloorState::Shaking;
            *delay = 15; // shake frames before it drops out
        }
        let (x, y) = (self.objects[slot].x, self.objects[slot].y);
        self.spawn(ObjectType::Smoke, x, y);
        let subject = self.objects[slot].clone();
        if let Some(above) = self.objects.collide(&subject, ObjectType::Spring, 0.0, -1.0) {
            self.break_spring(above);
        }
    }

    pub(crate) fn update_balloon(&mut self, slot: usize) {
        let ObjectKind::Balloon { state, timer, .. } = self.objects[slot].kind else {
            return;
        };
        match state {
            BalloonState::Floating => {
                let obj = &mut self.objects[slot];
                let ObjectKind::Balloon { offset, start, .. } = &mut obj.kind else {
                    return;
                };
                *offset += 0.01;
                let off = *offset;
                obj.y = *start + p8_sin(off) * 2.0;

                let subject = self.objects[slot].clone();
                if let Some(hit) = self.objects.collide(&subject, ObjectType::Player, 0.0, 0.0) {
                    let spent = match &self.objects[hit].kind {
                        ObjectKind::Player(p) => p.djump < self.max_djump,
                        _ => false,
                    };
                    if spent {
                        self.psfx(6);
                        self.spawn(ObjectType::Smoke, subject.x, subject.y);
                        if let Some(p) = self.objects[hit].as_player_mut() {
                            p.djump = self.max_djump;
                        }
                        if let ObjectKind::Balloon { state, timer, .. } =
                            &mut self.objects[slot].kind
                        {
                            *state = BalloonState::Hidden;
                            *timer = 60;
                        }
                    }
                }
            }
            BalloonState::Hidden if timer > 0 => {
                if let ObjectKind::Balloon { timer, .. } = &mut self.objects[slot].kind {
                    *timer -= 1;
                }
            }
            BalloonState::Hidden => {
                self.psfx(7);
                let (x, y) = (self.objects[slot].x, self.objects[slot].y);
                self.spawn(ObjectType::Smoke, x, y);
                if let ObjectKind::Balloon { state, .. } = &mut self.objects[slot].kind {
                    *state = BalloonState::Floating;
                }
            }
        }
    }

    pub(crate) fn draw_balloon(&mut self, slot: usize) {
        let obj = &self.objects[slot];
        let ObjectKind::Balloon { state, offset, .. } = obj.kind else {
            return;
        };
        if state == BalloonState::Floating {
            let (x, y) = (obj.x, obj.y);
            let string_spr = 13 + (offset * 8.0) as i32 % 3;
            self.host
                .spr(string_spr, x as i32, (y + 6.0) as i32, false, false);
            self.host.spr(22, x as i32, y as i32, false, false);
        }
    }

    pub(crate) fn update_fall_floor(&mut self, slot: usize) {
        let ObjectKind::FallFloor { state, delay } = self.objects[slot].kind else {
            return;
        };
        match state {
            FallFloorState::Idle => {
                let subject = self.objects[slot].clone();
                let touched = self.objects.check(&subject, ObjectType::Player, 0.0, -1.0)
                    || self.objects.check(&subject, ObjectType::Player, -1.0, 0.0)
                    || self.objects.check(&subject, ObjectType::Player, 1.0, 0.0);
                if touched {
                    self.break_fall_floor(slot);
                }
            }
            FallFloorState::Shaking => {
                let obj = &mut self.objects[slot];
                let ObjectKind::FallFloor { state, delay } = &mut obj.kind else {
                    return;
                };
                *delay -= 1;
                if *delay <= 0 {
                    *state = FallFloorState::Hidden;
                    *delay = 60; // how long it stays gone
                    obj.collideable = false;
                }
            }
            FallFloorState::Hidden => {
                let subject = self.objects[slot].clone();
                let occupied = self.objects.check(&subject, ObjectType::Player, 0.0, 0.0);
                let mut respawn = false;
                if let ObjectKind::FallFloor { delay, .. } = &mut self.objects[slot].kind {
                    *delay -= 1;
                    respawn = *delay <= 0 && !occupied;
                }
                if respawn {
                    self.psfx(7);
                    let obj = &mut self.objects[slot];
                    obj.collideable = true;
                    if let ObjectKind::FallFloor { state, .. } = &mut obj.kind {
                        *state = FallFloorState::Idle;
                    }
                    let (x, y) = (self.objects[slot].x, self.objects[slot].y);
                    self.spawn(ObjectType::Smoke, x, y);
                }
            }
        }
    }

    pub(crate) fn draw_fall_floor(&mut self, slot: usize) {
        let obj = &self.objects[slot];
        let ObjectKind::FallFloor { state, delay } = obj.kind else {
            return;
        };
        let (x, y) = (obj.x as i32, obj.y as i32);
        match state {
            FallFloorState::Idle => self.host.spr(23, x, y, false, false),
            FallFloorState::Shaking => self.host.spr(23 + (15 - delay) / 5, x, y, false, false),
            FallFloorState::Hidden => {}
        }
    }

    pub(crate) fn update_smoke(&mut self, slot: usize) {
        let obj = &mut self.objects[slot];
        obj.spr += 0.2;
        if obj.spr >= 32.0 {
            self.objects.remove(slot);
        }
    }

    pub(crate) fn update_fruit(&mut self, slot: usize) {
        let subject = self.objects[slot].clone();
        if let Some(hit) = self.objects.collide(&subject, ObjectType::Player, 0.0, 0.0) {
            if let Some(p) = self.objects[hit].as_player_mut() {
                p.djump = self.max_djump;
            }
            self.collect_fruit(slot);
            return;
        }
        let obj = &mut self.objects[slot];
        let ObjectKind::Fruit { start, off } = &mut obj.kind else {
            return;
        };
        *off += 1.0;
        obj.y = *start + p8_sin(*off / 40.0) * 2.5;
    }

    /// Shared pickup path for fruit and fly-fruit: score the level, pop a
    /// lifeup, drop the object
    fn collect_fruit(&mut self, slot: usize) {
        self.sfx_timer = 20;
        self.host.sfx(13);
        let level = self.level_index() as usize;
        if let Some(got) = self.got_fruit.get_mut(level) {
            *got = true;
        }
        let (x, y) = (self.objects[slot].x, self.objects[slot].y);
        self.spawn(ObjectType::Lifeup, x, y);
        self.objects.remove(slot);
    }

    pub(crate) fn update_fly_fruit(&mut self, slot: usize) {
        let ObjectKind::FlyFruit { fly, .. } = self.objects[slot].kind else {
            return;
        };
        let mut gone = false;

        if fly {
            let mut play = false;
            if let ObjectKind::FlyFruit { sfx_delay, .. } = &mut self.objects[slot].kind {
                if *sfx_delay > 0 {
                    *sfx_delay -= 1;
                    play = *sfx_delay <= 0;
                }
            }
            if play {
                self.sfx_timer = 20;
                self.host.sfx(14);
            }
            let obj = &mut self.objects[slot];
            obj.spd.y = appr(obj.spd.y, -3.5, 0.25);
            if obj.y < -16.0 {
                gone = true;
            }
        } else {
            if self.has_dashed {
                if let ObjectKind::FlyFruit { fly, .. } = &mut self.objects[slot].kind {
                    *fly = true;
                }
            }
            let obj = &mut self.objects[slot];
            let ObjectKind::FlyFruit { step, .. } = &mut obj.kind else {
                return;
            };
            *step += 0.05;
            obj.spd.y = p8_sin(*step) * 0.5;
        }

        let subject = self.objects[slot].clone();
        if let Some(hit) = self.objects.collide(&subject, ObjectType::Player, 0.0, 0.0) {
            if let Some(p) = self.objects[hit].as_player_mut() {
                p.djump = self.max_djump;
            }
            self.collect_fruit(slot);
            return;
        }
        if gone {
            self.objects.remove(slot);
        }
    }

    pub(crate) fn draw_fly_fruit(&mut self, slot: usize) {
        let obj = &self.objects[slot];
        let ObjectKind::FlyFruit {
            start, fly, step, ..
        } = obj.kind
        else {
            return;
        };
        let (x, y, spr) = (obj.x, obj.y, obj.spr);
        let off = if !fly {
            if p8_sin(step) < 0.0 {
                1.0 + 0.0f32.max(sign(y - start))
            } else {
                0.0
            }
        } else {
            p8_modulo(0.25, 3.0)
        };
        let wing = (45.0 + off) as i32;
        self.host
            .spr(wing, (x - 6.0) as i32, (y - 2.0) as i32, true, false);
        self.host.spr(spr as i32, x as i32, y as i32, false, false);
        self.host
            .spr(wing, (x + 6.0) as i32, (y - 2.0) as i32, false, false);
    }

    pub(crate) fn update_lifeup(&mut self, slot: usize) {
        if let ObjectKind::Lifeup { duration, .. } = &mut self.objects[slot].kind {
            *duration -= 1;
            if *duration <= 0 {
                self.objects.remove(slot);
            }
        }
    }

    pub(crate) fn draw_lifeup(&mut self, slot: usize) {
        let obj = &mut self.objects[slot];
        let ObjectKind::Lifeup { flash, .. } = &mut obj.kind else {
            return;
        };
        *flash += 0.5;
        let (x, y, flash) = (obj.x, obj.y, *flash);
        self.host
            .print("1000", (x - 2.0) as i32, y as i32, 7 + flash as i32 % 2);
    }

    pub(crate) fn update_fake_wall(&mut self, slot: usize) {
        // Probe with a one-pixel margin around the full 16x16 body
        self.objects[slot].hitbox = Hitbox::new(-1, -1, 18, 18);
        let subject = self.objects[slot].clone();
        if let Some(hit) = self.objects.collide(&subject, ObjectType::Player, 0.0, 0.0) {
            let dashing = match &self.objects[hit].kind {
                ObjectKind::Player(p) => p.dash_effect_time > 0,
                _ => false,
            };
            if dashing {
                let player = &mut self.objects[hit];
                player.spd.x = -sign(player.spd.x) * 1.5;
                player.spd.y = -1.5;
                if let Some(p) = player.as_player_mut() {
                    p.dash_time = -1;
                }
                self.sfx_timer = 20;
                self.host.sfx(16);
                let (x, y) = (subject.x, subject.y);
                self.spawn(ObjectType::Smoke, x, y);
                self.spawn(ObjectType::Smoke, x + 8.0, y);
                self.spawn(ObjectType::Smoke, x, y + 8.0);
                self.spawn(ObjectType::Smoke, x + 8.0, y + 8.0);
                self.spawn(ObjectType::Fruit, x + 4.0, y + 4.0);
                self.objects.remove(slot);
                return;
            }
        }
        self.objects[slot].hitbox = Hitbox::new(0, 0, 16, 16);
    }

    pub(crate) fn draw_fake_wall(&mut self, slot: usize) {
        let (x, y) = (self.objects[slot].x as i32, self.objects[slot].y as i32);
        self.host.spr(64, x, y, false, false);
        self.host.spr(65, x + 8, y, false, false);
        self.host.spr(80, x, y + 8, false, false);
        self.host.spr(81, x + 8, y + 8, false, false);
    }

    pub(crate) fn update_key(&mut self, slot: usize) {
        let obj = &mut self.objects[slot];
        let was = obj.spr.floor() as i32;
        obj.spr = 9.0 + (p8_sin(self.frames as f32 / 30.0) + 0.5);
        let is = obj.spr.floor() as i32;
        if is == 10 && is != was {
            obj.flip_x = !obj.flip_x;
        }
        let subject = self.objects[slot].clone();
        if self.objects.check(&subject, ObjectType::Player, 0.0, 0.0) {
            self.host.sfx(23);
            self.sfx_timer = 10;
            self.objects.remove(slot);
            self.has_key = true;
        }
    }

    pub(crate) fn update_chest(&mut self, slot: usize) {
        if !self.has_key {
            return;
        }
        let obj = &mut self.objects[slot];
        let ObjectKind::Chest { start, timer } = &mut obj.kind else {
            return;
        };
        *timer -= 1;
        let (start, timer) = (*start, *timer);
        obj.x = start - 1.0 + self.rng.rnd(3.0);
        if timer <= 0 {
            self.sfx_timer = 20;
            self.host.sfx(16);
            let (x, y) = (self.objects[slot].x, self.objects[slot].y);
            self.spawn(ObjectType::Fruit, x, y - 4.0);
            self.objects.remove(slot);
        }
    }

    pub(crate) fn update_platform(&mut self, slot: usize) {
        let ObjectKind::Platform { dir, last } = self.objects[slot].kind else {
            return;
        };
        let obj = &mut self.objects[slot];
        obj.spd.x = dir * 0.65;
        // Wrap around the screen
        if obj.x < -16.0 {
            obj.x = 128.0;
        } else if obj.x > 128.0 {
            obj.x = -16.0;
        }

        let subject = self.objects[slot].clone();
        if !self.objects.check(&subject, ObjectType::Player, 0.0, 0.0) {
            if let Some(hit) = self.objects.collide(&subject, ObjectType::Player, 0.0, -1.0) {
                // Carry the rider by this frame's delta
                let mut rider = self.objects[hit].clone();
                self.move_x(&mut rider, subject.x - last, 1.0);
                self.objects[hit] = rider;
            }
        }
        let x = self.objects[slot].x;
        if let ObjectKind::Platform { last, .. } = &mut self.objects[slot].kind {
            *last = x;
        }
    }

    pub(crate) fn draw_platform(&mut self, slot: usize) {
        let (x, y) = (self.objects[slot].x, self.objects[slot].y);
        self.host
            .spr(11, x as i32, (y - 1.0) as i32, false, false);
        self.host
            .spr(12, (x + 8.0) as i32, (y - 1.0) as i32, false, false);
    }

    pub(crate) fn draw_message(&mut self, slot: usize) {
        const TEXT: &str =
            "-- celeste mountain --#this memorial to those# perished on the climb";
        let subject = self.objects[slot].clone();
        if self.objects.check(&subject, ObjectType::Player, 4.0, 0.0) {
            let ObjectKind::Message { index, last } = &mut self.objects[slot].kind else {
                return;
            };
            if *index < TEXT.len() as f32 {
                *index += 0.5;
                if *index >= *last + 1.0 {
                    *last += 1.0;
                    self.host.sfx(35);
                }
            }
            let shown = self.message_index(slot).ceil() as usize;
            let (mut ox, mut oy) = (8, 96);
            for ch in TEXT.chars().take(shown) {
                if ch != '#' {
                    self.host.rectfill(ox - 2, oy - 2, ox + 7, oy + 6, 7);
                    self.host.print(&ch.to_string(), ox, oy, 0);
                    ox += 5;
                } else {
                    ox = 8;
                    oy += 7;
                }
            }
        } else if let ObjectKind::Message { index, last } = &mut self.objects[slot].kind {
            *index = 0.0;
            *last = 0.0;
        }
    }

    fn message_index(&self, slot: usize) -> f32 {
        match self.objects[slot].kind {
            ObjectKind::Message { index, .. } => index,
            _ => 0.0,
        }
    }

    pub(crate) fn draw_big_chest(&mut self, slot: usize) {
        let ObjectKind::BigChest { state, .. } = self.objects[slot].kind else {
            return;
        };
        let (x, y) = (self.objects[slot].x, self.objects[slot].y);
        match state {
            BigChestState::Closed => {
                let subject = self.objects[slot].clone();
                if let Some(hit) = self.objects.collide(&subject, ObjectType::Player, 0.0, 8.0) {
                    let standing = self.is_solid(&self.objects[hit].clone(), 0.0, 1.0);
                    if standing {
                        self.host.music(-1, 500, 7);
                        self.host.sfx(37);
                        self.pause_player = true;
                        let player = &mut self.objects[hit];
                        player.spd = Vec2::ZERO;
                        if let ObjectKind::BigChest {
                            state,
                            timer,
                            particles,
                        } = &mut self.objects[slot].kind
                        {
                            *state = BigChestState::Opening;
                            *timer = 60;
                            particles.clear();
                        }
                        self.spawn(ObjectType::Smoke, x, y);
                        self.spawn(ObjectType::Smoke, x + 8.0, y);
                    }
                }
                self.host.spr(96, x as i32, y as i32, false, false);
                self.host.spr(97, (x + 8.0) as i32, y as i32, false, false);
            }
            BigChestState::Opening => {
                self.shake = 5;
                self.flash_bg = true;
                let (timer, mut parts) = match &self.objects[slot].kind {
                    ObjectKind::BigChest {
                        timer, particles, ..
                    } => (*timer - 1, particles.clone()),
                    _ => return,
                };
                if timer <= 45 && parts.len() < BIG_CHEST_PARTICLES {
                    parts.push(ChestParticle {
                        x: 1.0 + self.rng.rnd(14.0),
                        y: 0.0,
                        spd: 8.0 + self.rng.rnd(8.0),
                        h: 32.0 + self.rng.rnd(32.0),
                    });
                }
                let finished = timer < 0;
                if finished {
                    parts.clear();
                    self.flash_bg = false;
                    self.new_bg = true;
                    self.spawn(ObjectType::Orb, x + 4.0, y + 4.0);
                    self.pause_player = false;
                }
                for p in &mut parts {
                    p.y += p.spd;
                    let top = y + 8.0 - p.y;
                    self.host.line(
                        (x + p.x) as i32,
                        top as i32,
                        (x + p.x) as i32,
                        (top + p.h).min(y + 8.0) as i32,
                        7,
                    );
                }
                if let ObjectKind::BigChest {
                    state,
                    timer: t,
                    particles,
                } = &mut self.objects[slot].kind
                {
                    *t = timer;
                    *particles = parts;
                    if finished {
                        *state = BigChestState::Open;
                    }
                }
            }
            BigChestState::Open => {}
        }
        self.host
            .spr(112, x as i32, (y + 8.0) as i32, false, false);
        self.host
            .spr(113, (x + 8.0) as i32, (y + 8.0) as i32, false, false);
    }

    pub(crate) fn draw_orb(&mut self, slot: usize) {
        {
            let obj = &mut self.objects[slot];
            obj.spd.y = appr(obj.spd.y, 0.0, 0.5);
        }
        let subject = self.objects[slot].clone();
        let hit = self.objects.collide(&subject, ObjectType::Player, 0.0, 0.0);
        let mut taken = false;
        if subject.spd.y == 0.0 {
            if let Some(hit) = hit {
                self.music_timer = 45;
                self.host.sfx(51);
                self.freeze = 10;
                self.shake = 10;
                taken = true;
                self.max_djump = 2;
                if let Some(p) = self.objects[hit].as_player_mut() {
                    p.djump = 2;
                }
            }
        }

        let (x, y) = (subject.x, subject.y);
        self.host.spr(102, x as i32, y as i32, false, false);
        let off = self.frames as f32 / 30.0;
        for i in 0..=7 {
            let a = off + i as f32 / 8.0;
            self.host.circfill(
                (x + 4.0 + p8_cos(a) * 8.0) as i32,
                (y + 4.0 + p8_sin(a) * 8.0) as i32,
                1,
                7,
            );
        }
        if taken {
            self.objects.remove(slot);
        }
    }

    pub(crate) fn draw_flag(&mut self, slot: usize) {
        self.objects[slot].spr = 118.0 + p8_modulo(self.frames as f32 / 5.0, 3.0);
        let obj = self.objects[slot].clone();
        let ObjectKind::Flag { score, show } = obj.kind else {
            return;
        };
        self.host
            .spr(obj.spr as i32, obj.x as i32, obj.y as i32, false, false);
        if show {
            self.host.rectfill(32, 2, 96, 31, 0);
            self.host.spr(26, 55, 6, false, false);
            self.host.print(&format!("x{score}"), 64, 9, 7);
            self.draw_time(49, 16);
            let deaths = self.deaths;
            self.host.print(&format!("deaths:{deaths}"), 48, 24, 7);
        } else if self.objects.check(&obj, ObjectType::Player, 0.0, 0.0) {
            self.host.sfx(55);
            self.sfx_timer = 30;
            if let ObjectKind::Flag { show, .. } = &mut self.objects[slot].kind {
                *show = true;
            }
        }
    }

    pub(crate) fn draw_room_title(&mut self, slot: usize) {
        let delay = {
            let ObjectKind::RoomTitle { delay } = &mut self.objects[slot].kind else {
                return;
            };
            *delay -= 1;
            *delay
        };
        if delay < -30 {
            self.objects.remove(slot);
        } else if delay < 0 {
            self.host.rectfill(24, 58, 104, 70, 0);
            if self.room.x == 3 && self.room.y == 1 {
                self.host.print("old site", 48, 62, 7);
            } else if self.level_index() == 30 {
                self.host.print("summit", 52, 62, 7);
            } else {
                let level = (1 + self.level_index()) * 100;
                let x = 52 + if level < 1000 { 2 } else { 0 };
                self.host.print(&format!("{level} m"), x, 62, 7);
            }
            self.draw_time(4, 4);
        }
    }

    pub(crate) fn draw_time(&mut self, x: i32, y: i32) {
        let s = self.seconds;
        let m = self.minutes % 60;
        let h = self.minutes / 60;
        self.host.rectfill(x, y, x + 32, y + 6, 0);
        self.host
            .print(&format!("{h:02}:{m:02}:{s:02}"), x + 1, y + 1, 7);
    }
}
