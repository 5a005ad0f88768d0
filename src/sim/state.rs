//! Session state
//!
//! One `Game` value owns the entire mutable state of a run: RNG, room,
//! global timers/flags, cosmetic layers and the object table. There are no
//! process-wide singletons; the host creates it, drives it one frame at a
//! time, and drops it when done.

use glam::IVec2;

use crate::consts::FRUIT_COUNT;
use crate::host::Host;
use crate::rng::Rng;
use crate::sim::effects::{Cloud, DeadParticle, Particle};
use crate::sim::object::Slots;

/// The whole simulation
pub struct Game<H: Host> {
    pub host: H,
    pub rng: Rng,

    /// Current room in the 8x4 level grid
    pub room: IVec2,
    /// While positive, update and draw are skipped entirely (hit-stop)
    pub freeze: i32,
    /// Camera shake frames remaining
    pub shake: i32,
    /// Delayed room reload armed by a death
    pub will_restart: bool,
    pub delay_restart: i32,
    /// Collected-fruit bitset keyed by level index
    pub got_fruit: [bool; FRUIT_COUNT],
    /// Set on the first dash in a room; flips fly-fruit to flight
    pub has_dashed: bool,
    /// While positive, behavior sounds are suppressed
    pub sfx_timer: i32,
    pub has_key: bool,
    /// Player input/physics suspended (big chest cutscene)
    pub pause_player: bool,
    pub flash_bg: bool,
    pub music_timer: i32,
    pub new_bg: bool,

    /// Frame counter, wrapping at 30 (one second)
    pub frames: i32,
    pub seconds: i32,
    pub minutes: i32,
    pub deaths: i32,
    /// Air-dash pool restored on landing; 2 after the orb
    pub max_djump: i32,
    pub start_game: bool,
    pub start_game_flash: i32,

    pub clouds: [Cloud; 17],
    pub particles: [Particle; 25],
    pub dead_particles: [DeadParticle; 8],

    pub objects: Slots,
    /// Set by a room load during the object pass; cleared by the driver
    pub room_just_loaded: bool,
}

impl<H: Host> Game<H> {
    /// New session around a host; call [`set_random_seed`](Self::set_random_seed)
    /// and then [`init`](Self::init) before the first frame
    pub fn new(host: H) -> Self {
        Self {
            host,
            rng: Rng::default(),
            room: IVec2::ZERO,
            freeze: 0,
            shake: 0,
            will_restart: false,
            delay_restart: 0,
            got_fruit: [false; FRUIT_COUNT],
            has_dashed: false,
            sfx_timer: 0,
            has_key: false,
            pause_player: false,
            flash_bg: false,
            music_timer: 0,
            new_bg: false,
            frames: 0,
            seconds: 0,
            minutes: 0,
            deaths: 0,
            max_djump: 1,
            start_game: false,
            start_game_flash: 0,
            clouds: [Cloud::default(); 17],
            particles: [Particle::default(); 25],
            dead_particles: [DeadParticle::default(); 8],
            objects: Slots::default(),
            room_just_loaded: false,
        }
    }

    /// Seed the generator; must happen before [`init`](Self::init) for a
    /// reproducible run
    pub fn set_random_seed(&mut self, seed: u32) {
        self.rng.seed(seed);
    }

    /// Start the session: cosmetic layers, then the title screen
    pub fn init(&mut self) {
        log::debug!("simulation init");
        self.init_clouds();
        self.init_particles();
        self.title_screen();
    }

    /// Linear level index of the current room
    pub fn level_index(&self) -> i32 {
        self.room.x % 8 + self.room.y * 8
    }

    /// Room (7,3) doubles as the title screen
    pub fn is_title(&self) -> bool {
        self.level_index() == 31
    }

    /// Sound effect, suppressed while a priority sound is playing
    pub(crate) fn psfx(&mut self, id: i32) {
        if self.sfx_timer <= 0 {
            self.host.sfx(id);
        }
    }
}
