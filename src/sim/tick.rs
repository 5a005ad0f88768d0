//! Frame driver
//!
//! One `update` advances exactly one simulation frame; one `draw` renders
//! it. Both walk the object table in slot order and re-check the slot's
//! id after calling into behavior logic: if an object destroyed itself
//! (or a room load replaced everything), the slot's new occupant is
//! processed before the cursor advances, so no live object is skipped in
//! the same pass.

use crate::host::{Button, Host};
use crate::sim::object::ObjectType;
use crate::sim::state::Game;

impl<H: Host> Game<H> {
    /// Advance one frame
    pub fn update(&mut self) {
        self.frames = (self.frames + 1) % 30;
        if self.frames == 0 && self.level_index() < 30 {
            self.seconds = (self.seconds + 1) % 60;
            if self.seconds == 0 {
                self.minutes += 1;
            }
        }

        if self.music_timer > 0 {
            self.music_timer -= 1;
            if self.music_timer <= 0 {
                self.host.music(10, 0, 7);
            }
        }

        if self.sfx_timer > 0 {
            self.sfx_timer -= 1;
        }

        // Hit-stop: the whole frame is skipped
        if self.freeze > 0 {
            self.freeze -= 1;
            return;
        }

        // Screenshake
        if self.shake > 0 {
            self.shake -= 1;
            self.host.camera(0, 0);
            if self.shake > 0 {
                let cx = -2.0 + self.rng.rnd(5.0);
                let cy = -2.0 + self.rng.rnd(5.0);
                self.host.camera(cx as i32, cy as i32);
            }
        }

        // Delayed restart after a death
        if self.will_restart && self.delay_restart > 0 {
            self.delay_restart -= 1;
            if self.delay_restart <= 0 {
                self.will_restart = false;
                let (x, y) = (self.room.x, self.room.y);
                self.load_room(x, y);
            }
        }

        self.room_just_loaded = false;
        let mut slot = 0;
        while slot < self.objects.len() {
            loop {
                let Some(id) = self.objects.id_at(slot) else {
                    break;
                };
                self.move_slot(slot);
                self.update_object(slot);
                if self.room_just_loaded {
                    self.room_just_loaded = false;
                }
                // Compaction moved a different object here: process it
                // before moving on
                if self.objects.id_at(slot) == Some(id) {
                    break;
                }
            }
            slot += 1;
        }

        // Title screen start
        if self.is_title() {
            if !self.start_game && (self.host.btn(Button::Jump) || self.host.btn(Button::Dash)) {
                self.host.music(-1, 0, 0);
                self.start_game_flash = 50;
                self.start_game = true;
                self.host.sfx(38);
            }
            if self.start_game {
                self.start_game_flash -= 1;
                if self.start_game_flash <= -30 {
                    self.begin_game();
                }
            }
        }
    }

    fn update_object(&mut self, slot: usize) {
        match self.objects[slot].ty() {
            ObjectType::Player => self.update_player(slot),
            ObjectType::PlayerSpawn => self.update_player_spawn(slot),
            ObjectType::Spring => self.update_spring(slot),
            ObjectType::Balloon => self.update_balloon(slot),
            ObjectType::Smoke => self.update_smoke(slot),
            ObjectType::Platform => self.update_platform(slot),
            ObjectType::FallFloor => self.update_fall_floor(slot),
            ObjectType::Fruit => self.update_fruit(slot),
            ObjectType::FlyFruit => self.update_fly_fruit(slot),
            ObjectType::FakeWall => self.update_fake_wall(slot),
            ObjectType::Key => self.update_key(slot),
            ObjectType::Chest => self.update_chest(slot),
            ObjectType::Lifeup => self.update_lifeup(slot),
            ObjectType::Message
            | ObjectType::BigChest
            | ObjectType::Orb
            | ObjectType::Flag
            | ObjectType::RoomTitle => {}
        }
    }

    /// Render the current frame
    pub fn draw(&mut self) {
        if self.freeze > 0 {
            return;
        }

        self.host.pal_reset();

        // Start-game flash washes the palette out in stages
        if self.start_game {
            let c = if self.start_game_flash > 10 {
                if self.frames % 10 < 5 { 7 } else { 10 } // flicker
            } else if self.start_game_flash > 5 {
                2
            } else if self.start_game_flash > 0 {
                1
            } else {
                0
            };
            if c < 10 {
                for slot in [6, 12, 13, 5, 1, 7] {
                    self.host.pal(slot, c);
                }
            }
        }

        let bg_col = if self.flash_bg {
            self.frames / 5
        } else if self.new_bg {
            2
        } else {
            0
        };
        self.host.rectfill(0, 0, 128, 128, bg_col);

        if !self.is_title() {
            self.draw_clouds();
        }

        self.host
            .map(self.room.x * 16, self.room.y * 16, 0, 0, 16, 16, 4);

        // Platforms and the big chest draw behind the terrain layer
        let mut slot = 0;
        while slot < self.objects.len() {
            let ty = self.objects[slot].ty();
            if ty == ObjectType::Platform || ty == ObjectType::BigChest {
                self.draw_object(slot);
            }
            slot += 1;
        }

        let off = if self.is_title() { -4 } else { 0 };
        self.host
            .map(self.room.x * 16, self.room.y * 16, off, 0, 16, 16, 2);

        // Everything else, with the same id-recheck rule as update: a draw
        // can destroy its object (orb grab, fake wall break)
        let mut slot = 0;
        while slot < self.objects.len() {
            loop {
                let Some(id) = self.objects.id_at(slot) else {
                    break;
                };
                let ty = self.objects[slot].ty();
                if ty != ObjectType::Platform && ty != ObjectType::BigChest {
                    self.draw_object(slot);
                }
                if self.objects.id_at(slot) == Some(id) {
                    break;
                }
            }
            slot += 1;
        }

        self.host
            .map(self.room.x * 16, self.room.y * 16, 0, 0, 16, 16, 8);

        self.draw_particles();
        self.draw_dead_particles();

        // Mask past the screen edge so screenshake never shows garbage
        self.host.rectfill(-5, -5, -1, 133, 0);
        self.host.rectfill(-5, -5, 133, -1, 0);
        self.host.rectfill(-5, 128, 133, 133, 0);
        self.host.rectfill(128, -5, 133, 133, 0);

        if self.is_title() {
            self.host.print("v1.03", 54, 55, 5);
            self.host.print("x+c", 58, 80, 5);
            self.host.print("maddy thorson", 41, 96, 5);
            self.host.print("noel berry", 46, 102, 5);
        }

        // Summit vignette closes in around the player
        if self.level_index() == 30 {
            if let Some(p) = self.objects.find(ObjectType::Player) {
                let diff = (40.0 - (self.objects[p].x + 4.0 - 64.0).abs()).min(24.0);
                self.host.rectfill(0, 0, diff as i32, 128, 0);
                self.host.rectfill(128 - diff as i32, 0, 128, 128, 0);
            }
        }
    }

    fn draw_object(&mut self, slot: usize) {
        match self.objects[slot].ty() {
            ObjectType::Player => self.draw_player(slot),
            ObjectType::PlayerSpawn => self.draw_player_spawn(slot),
            ObjectType::Spring => self.draw_spring(slot),
            ObjectType::Balloon => self.draw_balloon(slot),
            ObjectType::Platform => self.draw_platform(slot),
            ObjectType::FallFloor => self.draw_fall_floor(slot),
            ObjectType::FlyFruit => self.draw_fly_fruit(slot),
            ObjectType::FakeWall => self.draw_fake_wall(slot),
            ObjectType::Lifeup => self.draw_lifeup(slot),
            ObjectType::Message => self.draw_message(slot),
            ObjectType::BigChest => self.draw_big_chest(slot),
            ObjectType::Orb => self.draw_orb(slot),
            ObjectType::Flag => self.draw_flag(slot),
            ObjectType::RoomTitle => self.draw_room_title(slot),
            ObjectType::Smoke | ObjectType::Fruit | ObjectType::Chest | ObjectType::Key => {
                self.draw_sprite(slot)
            }
        }
    }

    /// Default draw: the object's sprite at its position
    fn draw_sprite(&mut self, slot: usize) {
        let o = &self.objects[slot];
        if o.spr > 0.0 {
            let (spr, x, y, fx, fy) = (o.spr as i32, o.x as i32, o.y as i32, o.flip_x, o.flip_y);
            self.host.spr(spr, x, y, fx, fy);
        }
    }
}
