//! Room orchestration
//!
//! Loading a room is the only bulk teardown in the simulation: the object
//! table is cleared and repopulated by scanning the room's 16x16 tile
//! block, column by column. Two tile ids carry a platform direction; the
//! rest map through the static tile-to-type table.

use glam::IVec2;

use crate::consts::{FRUIT_COUNT, RESTART_DELAY};
use crate::host::Host;
use crate::sim::object::{ObjectKind, ObjectType};
use crate::sim::state::Game;

impl<H: Host> Game<H> {
    /// Tear down and repopulate the registry from the room's tiles
    pub fn load_room(&mut self, x: i32, y: i32) {
        self.has_dashed = false;
        self.has_key = false;
        self.room_just_loaded = true;

        self.objects.clear();
        self.room = IVec2::new(x, y);
        log::debug!("room ({x},{y}) loaded");

        for tx in 0..16 {
            for ty in 0..16 {
                let tile = self.host.mget(self.room.x * 16 + tx, self.room.y * 16 + ty);
                match tile {
                    11 => self.spawn_platform(tx, ty, -1.0),
                    12 => self.spawn_platform(tx, ty, 1.0),
                    _ => {
                        if let Some(ty_) = ObjectType::from_tile(tile) {
                            self.spawn(ty_, (tx * 8) as f32, (ty * 8) as f32);
                        }
                    }
                }
            }
        }

        if !self.is_title() {
            self.spawn(ObjectType::RoomTitle, 0.0, 0.0);
        }
    }

    fn spawn_platform(&mut self, tx: i32, ty: i32, direction: f32) {
        if let Some(slot) = self.spawn(ObjectType::Platform, (tx * 8) as f32, (ty * 8) as f32) {
            if let ObjectKind::Platform { dir, .. } = &mut self.objects[slot].kind {
                *dir = direction;
            }
        }
    }

    /// Advance to the next room, with music changes at fixed points
    pub fn next_room(&mut self) {
        let (x, y) = (self.room.x, self.room.y);
        match (x, y) {
            (2, 1) | (4, 2) | (5, 3) => self.host.music(30, 500, 7),
            (3, 1) => self.host.music(20, 500, 7),
            _ => {}
        }
        if x == 7 {
            self.load_room(0, y + 1);
        } else {
            self.load_room(x + 1, y);
        }
    }

    /// Arm the delayed reload of the current room (after a death)
    pub(crate) fn restart_room(&mut self) {
        self.will_restart = true;
        self.delay_restart = RESTART_DELAY;
    }

    /// Reset session progress and show the title room
    pub(crate) fn title_screen(&mut self) {
        self.got_fruit = [false; FRUIT_COUNT];
        self.frames = 0;
        self.deaths = 0;
        self.max_djump = 1;
        self.start_game = false;
        self.start_game_flash = 0;
        self.host.music(40, 0, 7);
        self.load_room(7, 3);
    }

    /// Leave the title screen and start the run proper
    pub(crate) fn begin_game(&mut self) {
        self.frames = 0;
        self.seconds = 0;
        self.minutes = 0;
        self.music_timer = 0;
        self.start_game = false;
        self.host.music(0, 0, 7);
        self.load_room(0, 0);
    }
}
