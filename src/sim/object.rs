//! Game objects and the slot registry
//!
//! Objects live in a fixed-capacity slot table. Destruction compacts the
//! table by shifting every later slot down one position; combined with the
//! id-recheck rule in the frame driver this reproduces the legacy
//! iterate-while-mutating semantics that room loading and same-frame
//! destruction depend on.

use glam::Vec2;

use crate::consts::MAX_OBJECTS;

/// Axis-aligned hitbox, in pixels relative to the object position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hitbox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Hitbox {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

impl Default for Hitbox {
    fn default() -> Self {
        Self::new(0, 0, 8, 8)
    }
}

/// Closed set of object types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjectType {
    Player,
    PlayerSpawn,
    Spring,
    Balloon,
    Smoke,
    Platform,
    FallFloor,
    Fruit,
    FlyFruit,
    FakeWall,
    Key,
    Chest,
    Lifeup,
    Message,
    BigChest,
    Orb,
    Flag,
    RoomTitle,
}

impl ObjectType {
    /// Map tile id this type spawns from, or -1 for code-spawned types
    ///
    /// Platforms are excluded here: tiles 11 and 12 carry a direction and
    /// are special-cased by the room loader.
    pub fn tile(self) -> i32 {
        match self {
            ObjectType::PlayerSpawn => 1,
            ObjectType::Key => 8,
            ObjectType::Spring => 18,
            ObjectType::Chest => 20,
            ObjectType::Balloon => 22,
            ObjectType::FallFloor => 23,
            ObjectType::Fruit => 26,
            ObjectType::FlyFruit => 28,
            ObjectType::FakeWall => 64,
            ObjectType::Message => 86,
            ObjectType::BigChest => 96,
            ObjectType::Flag => 118,
            _ => -1,
        }
    }

    /// Resolve a map tile to the type it spawns, if any
    pub fn from_tile(tile: u8) -> Option<Self> {
        match tile {
            1 => Some(ObjectType::PlayerSpawn),
            8 => Some(ObjectType::Key),
            18 => Some(ObjectType::Spring),
            20 => Some(ObjectType::Chest),
            22 => Some(ObjectType::Balloon),
            23 => Some(ObjectType::FallFloor),
            26 => Some(ObjectType::Fruit),
            28 => Some(ObjectType::FlyFruit),
            64 => Some(ObjectType::FakeWall),
            86 => Some(ObjectType::Message),
            96 => Some(ObjectType::BigChest),
            118 => Some(ObjectType::Flag),
            _ => None,
        }
    }

    /// Types that refuse to spawn once the room's fruit is collected
    pub fn fruit_gated(self) -> bool {
        matches!(
            self,
            ObjectType::Fruit
                | ObjectType::FlyFruit
                | ObjectType::FakeWall
                | ObjectType::Key
                | ObjectType::Chest
        )
    }
}

/// Player spawn cutscene phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SpawnState {
    Rising,
    Falling,
    Landing,
}

/// Spring surface states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SpringState {
    Idle,
    Compressed,
    Hidden,
}

/// Crumbling floor states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FallFloorState {
    Idle,
    Shaking,
    Hidden,
}

/// Balloon states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BalloonState {
    Floating,
    Hidden,
}

/// Big chest cutscene states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BigChestState {
    Closed,
    Opening,
    Open,
}

/// Player controller fields
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub p_jump: bool,
    pub p_dash: bool,
    pub grace: i32,
    pub jbuffer: i32,
    pub djump: i32,
    pub dash_time: i32,
    pub dash_effect_time: i32,
    pub dash_target: Vec2,
    pub dash_accel: Vec2,
    pub spr_off: f32,
    pub was_on_ground: bool,
    pub hair: [Vec2; 5],
}

/// Respawn cutscene fields
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSpawn {
    pub target: Vec2,
    pub state: SpawnState,
    pub delay: i32,
    pub hair: [Vec2; 5],
}

/// One falling light streak inside the big chest curtain
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChestParticle {
    pub x: f32,
    pub y: f32,
    pub spd: f32,
    pub h: f32,
}

/// Maximum streaks in a big chest curtain
pub const BIG_CHEST_PARTICLES: usize = 50;

/// Type tag plus the per-type state it carries
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Player(Player),
    PlayerSpawn(PlayerSpawn),
    Spring {
        state: SpringState,
        delay: i32,
        hide_in: i32,
        hide_for: i32,
    },
    Balloon {
        state: BalloonState,
        offset: f32,
        start: f32,
        timer: i32,
    },
    Smoke,
    Platform {
        dir: f32,
        last: f32,
    },
    FallFloor {
        state: FallFloorState,
        delay: i32,
    },
    Fruit {
        start: f32,
        off: f32,
    },
    FlyFruit {
        start: f32,
        fly: bool,
        step: f32,
        sfx_delay: i32,
    },
    FakeWall,
    Key,
    Chest {
        start: f32,
        timer: i32,
    },
    Lifeup {
        duration: i32,
        flash: f32,
    },
    Message {
        index: f32,
        last: f32,
    },
    BigChest {
        state: BigChestState,
        timer: i32,
        particles: Vec<ChestParticle>,
    },
    Orb,
    Flag {
        score: i32,
        show: bool,
    },
    RoomTitle {
        delay: i32,
    },
}

impl ObjectKind {
    /// Fieldless tag for queries and dispatch
    pub fn tag(&self) -> ObjectType {
        match self {
            ObjectKind::Player(_) => ObjectType::Player,
            ObjectKind::PlayerSpawn(_) => ObjectType::PlayerSpawn,
            ObjectKind::Spring { .. } => ObjectType::Spring,
            ObjectKind::Balloon { .. } => ObjectType::Balloon,
            ObjectKind::Smoke => ObjectType::Smoke,
            ObjectKind::Platform { .. } => ObjectType::Platform,
            ObjectKind::FallFloor { .. } => ObjectType::FallFloor,
            ObjectKind::Fruit { .. } => ObjectType::Fruit,
            ObjectKind::FlyFruit { .. } => ObjectType::FlyFruit,
            ObjectKind::FakeWall => ObjectType::FakeWall,
            ObjectKind::Key => ObjectType::Key,
            ObjectKind::Chest { .. } => ObjectType::Chest,
            ObjectKind::Lifeup { .. } => ObjectType::Lifeup,
            ObjectKind::Message { .. } => ObjectType::Message,
            ObjectKind::BigChest { .. } => ObjectType::BigChest,
            ObjectKind::Orb => ObjectType::Orb,
            ObjectKind::Flag { .. } => ObjectType::Flag,
            ObjectKind::RoomTitle { .. } => ObjectType::RoomTitle,
        }
    }

    /// Blank per-type state for a freshly spawned object
    ///
    /// Spawn-time init in `Game::spawn` fills in anything non-zero.
    pub fn blank(ty: ObjectType) -> Self {
        match ty {
            ObjectType::Player => ObjectKind::Player(Player {
                p_jump: false,
                p_dash: false,
                grace: 0,
                jbuffer: 0,
                djump: 0,
                dash_time: 0,
                dash_effect_time: 0,
                dash_target: Vec2::ZERO,
                dash_accel: Vec2::ZERO,
                spr_off: 0.0,
                was_on_ground: false,
                hair: [Vec2::ZERO; 5],
            }),
            ObjectType::PlayerSpawn => ObjectKind::PlayerSpawn(PlayerSpawn {
                target: Vec2::ZERO,
                state: SpawnState::Rising,
                delay: 0,
                hair: [Vec2::ZERO; 5],
            }),
            ObjectType::Spring => ObjectKind::Spring {
                state: SpringState::Idle,
                delay: 0,
                hide_in: 0,
                hide_for: 0,
            },
            ObjectType::Balloon => ObjectKind::Balloon {
                state: BalloonState::Floating,
                offset: 0.0,
                start: 0.0,
                timer: 0,
            },
            ObjectType::Smoke => ObjectKind::Smoke,
            ObjectType::Platform => ObjectKind::Platform { dir: 0.0, last: 0.0 },
            ObjectType::FallFloor => ObjectKind::FallFloor {
                state: FallFloorState::Idle,
                delay: 0,
            },
            ObjectType::Fruit => ObjectKind::Fruit { start: 0.0, off: 0.0 },
            ObjectType::FlyFruit => ObjectKind::FlyFruit {
                start: 0.0,
                fly: false,
                step: 0.0,
                sfx_delay: 0,
            },
            ObjectType::FakeWall => ObjectKind::FakeWall,
            ObjectType::Key => ObjectKind::Key,
            ObjectType::Chest => ObjectKind::Chest { start: 0.0, timer: 0 },
            ObjectType::Lifeup => ObjectKind::Lifeup {
                duration: 0,
                flash: 0.0,
            },
            ObjectType::Message => ObjectKind::Message {
                index: 0.0,
                last: 0.0,
            },
            ObjectType::BigChest => ObjectKind::BigChest {
                state: BigChestState::Closed,
                timer: 0,
                particles: Vec::new(),
            },
            ObjectType::Orb => ObjectKind::Orb,
            ObjectType::Flag => ObjectKind::Flag {
                score: 0,
                show: false,
            },
            ObjectType::RoomTitle => ObjectKind::RoomTitle { delay: 0 },
        }
    }
}

/// One live game object
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Monotonic identity; survives slot moves, never reused while active
    pub id: u16,
    pub kind: ObjectKind,
    pub x: f32,
    pub y: f32,
    pub hitbox: Hitbox,
    pub spd: Vec2,
    /// Sub-pixel motion carried between frames by the movement resolver
    pub rem: Vec2,
    pub collideable: bool,
    pub solids: bool,
    /// Sprite index; fractional for animation cycles
    pub spr: f32,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Object {
    /// Fresh object with type defaults applied
    pub fn new(id: u16, ty: ObjectType, x: f32, y: f32) -> Self {
        Self {
            id,
            kind: ObjectKind::blank(ty),
            x,
            y,
            hitbox: Hitbox::default(),
            spd: Vec2::ZERO,
            rem: Vec2::ZERO,
            collideable: true,
            solids: true,
            spr: ty.tile() as f32,
            flip_x: false,
            flip_y: false,
        }
    }

    pub fn ty(&self) -> ObjectType {
        self.kind.tag()
    }

    /// Hitbox overlap against `other`, with this object's box shifted by
    /// `(ox, oy)`; strict inequalities so edge-touching boxes do not collide
    pub fn overlaps(&self, other: &Object, ox: f32, oy: f32) -> bool {
        other.x + other.hitbox.x as f32 + other.hitbox.w as f32 > self.x + self.hitbox.x as f32 + ox
            && other.y + other.hitbox.y as f32 + other.hitbox.h as f32
                > self.y + self.hitbox.y as f32 + oy
            && other.x + other.hitbox.x as f32
                < self.x + self.hitbox.x as f32 + self.hitbox.w as f32 + ox
            && other.y + other.hitbox.y as f32
                < self.y + self.hitbox.y as f32 + self.hitbox.h as f32 + oy
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.kind {
            ObjectKind::Player(p) => Some(p),
            _ => None,
        }
    }
}

/// Fixed-capacity slot table
///
/// Live objects always occupy a prefix of the table: spawning appends and
/// destruction shifts later entries down. `id_at` is what iteration uses
/// to detect that a slot's occupant changed underneath it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slots {
    entries: Vec<Object>,
    next_id: u16,
}

impl Slots {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_OBJECTS
    }

    pub fn get(&self, slot: usize) -> Option<&Object> {
        self.entries.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Object> {
        self.entries.get_mut(slot)
    }

    /// Identity of the object currently in `slot`, if any
    pub fn id_at(&self, slot: usize) -> Option<u16> {
        self.entries.get(slot).map(|o| o.id)
    }

    /// Claim the next monotonic id
    pub fn take_id(&mut self) -> u16 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn next_id(&self) -> u16 {
        self.next_id
    }

    pub fn set_next_id(&mut self, id: u16) {
        self.next_id = id;
    }

    /// Append; caller checks `is_full` first
    pub fn push(&mut self, obj: Object) -> usize {
        debug_assert!(self.entries.len() < MAX_OBJECTS);
        self.entries.push(obj);
        self.entries.len() - 1
    }

    /// Remove and compact: every later slot shifts down one position
    pub fn remove(&mut self, slot: usize) {
        if slot < self.entries.len() {
            self.entries.remove(slot);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.entries.iter()
    }

    /// First slot holding an object of `ty`
    pub fn find(&self, ty: ObjectType) -> Option<usize> {
        self.entries.iter().position(|o| o.ty() == ty)
    }

    pub fn count(&self, ty: ObjectType) -> usize {
        self.entries.iter().filter(|o| o.ty() == ty).count()
    }

    /// First active, collideable object of `ty` overlapping `subject`'s
    /// hitbox shifted by `(ox, oy)`, excluding the subject itself
    pub fn collide(&self, subject: &Object, ty: ObjectType, ox: f32, oy: f32) -> Option<usize> {
        self.entries.iter().position(|other| {
            other.ty() == ty
                && other.id != subject.id
                && other.collideable
                && subject.overlaps(other, ox, oy)
        })
    }

    /// Boolean form of [`collide`](Self::collide)
    pub fn check(&self, subject: &Object, ty: ObjectType, ox: f32, oy: f32) -> bool {
        self.collide(subject, ty, ox, oy).is_some()
    }
}

impl std::ops::Index<usize> for Slots {
    type Output = Object;
    fn index(&self, slot: usize) -> &Object {
        &self.entries[slot]
    }
}

impl std::ops::IndexMut<usize> for Slots {
    fn index_mut(&mut self, slot: usize) -> &mut Object {
        &mut self.entries[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(slots: &mut Slots, ty: ObjectType, x: f32, y: f32) -> usize {
        let id = slots.take_id();
        slots.push(Object::new(id, ty, x, y))
    }

    #[test]
    fn test_destroy_compacts_slots() {
        let mut slots = Slots::default();
        obj(&mut slots, ObjectType::Fruit, 0.0, 0.0);
        obj(&mut slots, ObjectType::Spring, 8.0, 0.0);
        obj(&mut slots, ObjectType::Key, 16.0, 0.0);
        let (a, b, c) = (slots[0].id, slots[1].id, slots[2].id);

        slots.remove(0);

        // B shifted into slot 0, C into slot 1; identities unchanged
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].id, b);
        assert_eq!(slots[1].id, c);
        assert_ne!(slots.id_at(0), Some(a));
    }

    #[test]
    fn test_ids_monotonic_and_not_reused() {
        let mut slots = Slots::default();
        obj(&mut slots, ObjectType::Fruit, 0.0, 0.0);
        obj(&mut slots, ObjectType::Fruit, 8.0, 0.0);
        let first = slots[0].id;
        slots.remove(0);
        let replacement = obj(&mut slots, ObjectType::Fruit, 16.0, 0.0);
        assert!(slots[replacement].id > first);
        assert!(slots.iter().all(|o| o.id != first));
    }

    #[test]
    fn test_collide_overlap_and_exclusion() {
        let mut slots = Slots::default();
        let a = obj(&mut slots, ObjectType::Player, 0.0, 0.0);
        obj(&mut slots, ObjectType::Fruit, 4.0, 4.0);

        let subject = slots[a].clone();
        // Overlapping fruit found; subject never matches itself
        assert!(slots.check(&subject, ObjectType::Fruit, 0.0, 0.0));
        assert!(!slots.check(&subject, ObjectType::Player, 0.0, 0.0));
        // Translated out of range
        assert!(!slots.check(&subject, ObjectType::Fruit, 32.0, 0.0));
    }

    #[test]
    fn test_collide_edge_touch_is_not_overlap() {
        let mut slots = Slots::default();
        let a = obj(&mut slots, ObjectType::Player, 0.0, 0.0);
        obj(&mut slots, ObjectType::Fruit, 8.0, 0.0);
        let subject = slots[a].clone();
        assert!(!slots.check(&subject, ObjectType::Fruit, 0.0, 0.0));
        // One pixel closer and they overlap
        assert!(slots.check(&subject, ObjectType::Fruit, 1.0, 0.0));
    }

    #[test]
    fn test_collide_respects_collideable_flag() {
        let mut slots = Slots::default();
        let a = obj(&mut slots, ObjectType::Player, 0.0, 0.0);
        let b = obj(&mut slots, ObjectType::FallFloor, 4.0, 0.0);
        slots[b].collideable = false;
        let subject = slots[a].clone();
        assert!(!slots.check(&subject, ObjectType::FallFloor, 0.0, 0.0));
    }
}
