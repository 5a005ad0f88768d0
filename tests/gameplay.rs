//! End-to-end simulation tests against a scripted host
//!
//! The fixture room (0,0): a solid floor across tile row 14, a player
//! spawn at tile (2,13), up-spikes at (6,13), a fruit at (8,12), a spring
//! at (10,13) and a rightward moving platform at (4,10). Every other room
//! (including the title screen at (7,3)) is empty.

use crag::sim::object::{BalloonState, FallFloorState, ObjectKind, SpringState};
use crag::{Button, Game, Host, ObjectType};

const SOLID: u8 = 32;

#[derive(Default)]
struct TestHost {
    buttons: [bool; 6],
    sfx_log: Vec<i32>,
}

fn button_slot(b: Button) -> usize {
    match b {
        Button::Left => 0,
        Button::Right => 1,
        Button::Up => 2,
        Button::Down => 3,
        Button::Jump => 4,
        Button::Dash => 5,
    }
}

impl TestHost {
    fn press(&mut self, b: Button) {
        self.buttons[button_slot(b)] = true;
    }
}

impl Host for TestHost {
    fn btn(&self, b: Button) -> bool {
        self.buttons[button_slot(b)]
    }

    fn sfx(&mut self, id: i32) {
        self.sfx_log.push(id);
    }

    fn mget(&self, tx: i32, ty: i32) -> u8 {
        match (tx, ty) {
            (2, 13) => 1,   // player spawn
            (6, 13) => 17,  // up-spikes
            (8, 12) => 26,  // fruit
            (10, 13) => 18, // spring
            (4, 10) => 12,  // platform heading right
            (0..=15, 14) => SOLID,
            _ => 0,
        }
    }

    fn fget(&self, tile: u8, flag: u8) -> bool {
        tile == SOLID && flag == 0
    }
}

/// Session with cosmetic layers seeded and room (0,0) loaded
fn booted_game() -> Game<TestHost> {
    let mut game = Game::new(TestHost::default());
    game.set_random_seed(1);
    game.init();
    game.load_room(0, 0);
    game
}

/// Bare session on room (0,0) for direct object placement
fn bare_game() -> Game<TestHost> {
    let mut game = Game::new(TestHost::default());
    game.set_random_seed(1);
    game
}

fn count(game: &Game<TestHost>, ty: ObjectType) -> usize {
    game.objects.iter().filter(|o| o.ty() == ty).count()
}

fn player_slot(game: &Game<TestHost>) -> usize {
    game.objects.find(ObjectType::Player).expect("live player")
}

#[test]
fn room_scan_populates_registry() {
    let game = booted_game();
    assert_eq!(count(&game, ObjectType::PlayerSpawn), 1);
    assert_eq!(count(&game, ObjectType::Fruit), 1);
    assert_eq!(count(&game, ObjectType::Spring), 1);
    assert_eq!(count(&game, ObjectType::Platform), 1);
    assert_eq!(count(&game, ObjectType::RoomTitle), 1);
    assert_eq!(count(&game, ObjectType::Player), 0);
}

#[test]
fn spawn_cutscene_hands_over_to_player() {
    let mut game = booted_game();

    for _ in 0..12 {
        game.update();
    }
    // Mid-cutscene: still no controllable player
    assert_eq!(count(&game, ObjectType::PlayerSpawn), 1);
    assert_eq!(count(&game, ObjectType::Player), 0);

    for _ in 12..40 {
        game.update();
    }
    // Cutscene over: exactly one player, standing on the floor
    assert_eq!(count(&game, ObjectType::PlayerSpawn), 0);
    assert_eq!(count(&game, ObjectType::Player), 1);
    let p = &game.objects[player_slot(&game)];
    assert_eq!(p.y, 104.0);
}

#[test]
fn fruit_gating_blocks_collected_rooms() {
    let mut game = booted_game();
    game.got_fruit[0] = true;

    assert!(game.spawn(ObjectType::Fruit, 64.0, 64.0).is_none());
    assert!(game.spawn(ObjectType::Key, 64.0, 64.0).is_none());
    // Ungated types still spawn
    assert!(game.spawn(ObjectType::Smoke, 64.0, 64.0).is_some());

    // A reload of the same room no longer places its fruit
    game.load_room(0, 0);
    assert_eq!(count(&game, ObjectType::Fruit), 0);
    assert_eq!(count(&game, ObjectType::Spring), 1);
}

#[test]
fn spawn_fails_softly_at_capacity() {
    let mut game = bare_game();
    let mut spawned = 0;
    for _ in 0..40 {
        if game.spawn(ObjectType::Balloon, 0.0, 0.0).is_some() {
            spawned += 1;
        }
    }
    assert_eq!(spawned, 30);
    assert_eq!(game.objects.len(), 30);
}

#[test]
fn death_compacts_and_retries_the_slot() {
    let mut game = booted_game();
    // Player standing on the spike tile, plus trailing smoke objects that
    // sit after it in the table
    game.spawn(ObjectType::Player, 48.0, 104.0);
    game.spawn(ObjectType::Smoke, 100.0, 40.0);
    game.spawn(ObjectType::Smoke, 108.0, 40.0);

    game.update();

    assert_eq!(count(&game, ObjectType::Player), 0);
    assert_eq!(game.deaths, 1);
    assert!(game.will_restart);
    assert!(game.dead_particles.iter().all(|p| p.active));

    // Every smoke advanced exactly one animation step this frame: the one
    // compaction shifted into the dead player's slot was not skipped
    // (the third puff is the landing smoke the dying player emitted)
    assert_eq!(count(&game, ObjectType::Smoke), 3);
    for o in game.objects.iter().filter(|o| o.ty() == ObjectType::Smoke) {
        assert_eq!(o.spr, 29.0 + 0.2);
    }

    // The armed restart reloads the room after its delay
    for _ in 0..15 {
        game.update();
    }
    assert_eq!(count(&game, ObjectType::PlayerSpawn), 1);
    assert_eq!(count(&game, ObjectType::Smoke), 0);
    assert!(!game.will_restart);
}

#[test]
fn grounded_jump_uses_buffer_and_grace() {
    let mut game = bare_game();
    game.spawn(ObjectType::Player, 16.0, 104.0);
    game.host.press(Button::Jump);

    game.update();

    let p = &game.objects[player_slot(&game)];
    assert_eq!(p.spd.y, -2.0);
    assert!(game.host.sfx_log.contains(&1));
    assert!(count(&game, ObjectType::Smoke) >= 1);
}

#[test]
fn dash_sets_burst_freeze_and_shake() {
    let mut game = bare_game();
    game.spawn(ObjectType::Player, 16.0, 104.0);
    game.host.press(Button::Right);
    game.host.press(Button::Dash);

    game.update();

    {
        let p = &game.objects[player_slot(&game)];
        assert_eq!(p.spd.x, 5.0);
        assert_eq!(p.spd.y, 0.0);
        let ObjectKind::Player(pl) = &p.kind else {
            panic!("player kind");
        };
        assert_eq!(pl.djump, 0);
        assert_eq!(pl.dash_time, 4);
    }
    assert!(game.has_dashed);
    assert_eq!(game.freeze, 2);
    assert_eq!(game.shake, 6);

    // Hit-stop: the next two frames change nothing
    let x_before = game.objects[player_slot(&game)].x;
    game.update();
    game.update();
    assert_eq!(game.objects[player_slot(&game)].x, x_before);
    assert_eq!(game.freeze, 0);

    // Then the burst actually moves
    game.update();
    assert!(game.objects[player_slot(&game)].x > x_before);
}

#[test]
fn spring_launches_player() {
    let mut game = booted_game();
    game.spawn(ObjectType::Player, 80.0, 104.0);

    game.update();

    let p = &game.objects[player_slot(&game)];
    // Snapped above the spring, launched upward, then moved and pulled by
    // gravity within the same frame
    assert_eq!(p.y, 97.0);
    assert!(p.spd.y < -2.0);

    let spring = game
        .objects
        .iter()
        .find(|o| o.ty() == ObjectType::Spring)
        .unwrap();
    assert!(matches!(
        spring.kind,
        ObjectKind::Spring {
            state: SpringState::Compressed,
            ..
        }
    ));
    assert!(game.host.sfx_log.contains(&8));
}

#[test]
fn platform_patrols_after_load() {
    let mut game = booted_game();
    let slot = game.objects.find(ObjectType::Platform).unwrap();
    // Loader applied the 4px left shift
    assert_eq!(game.objects[slot].x, 28.0);

    game.update(); // picks up its speed
    game.update(); // first whole pixel of travel
    let platform = game
        .objects
        .iter()
        .find(|o| o.ty() == ObjectType::Platform)
        .unwrap();
    assert_eq!(platform.x, 29.0);
}

#[test]
fn flag_reveals_on_touch_during_draw() {
    let mut game = bare_game();
    game.spawn(ObjectType::Flag, 60.0, 104.0);
    game.spawn(ObjectType::Player, 62.0, 104.0);

    game.draw();

    let flag = game
        .objects
        .iter()
        .find(|o| o.ty() == ObjectType::Flag)
        .unwrap();
    assert!(matches!(flag.kind, ObjectKind::Flag { show: true, .. }));
    assert!(game.host.sfx_log.contains(&55));
}

#[test]
fn balloon_recharges_spent_dash() {
    let mut game = bare_game();
    let b = game.spawn(ObjectType::Balloon, 16.0, 100.0).unwrap();
    let p = game.spawn(ObjectType::Player, 16.0, 100.0).unwrap();
    // Spend the dash mid-air first
    if let ObjectKind::Player(pl) = &mut game.objects[p].kind {
        pl.djump = 0;
    }

    game.update();

    let ObjectKind::Player(pl) = &game.objects[player_slot(&game)].kind else {
        panic!("player kind");
    };
    assert_eq!(pl.djump, 1);
    assert!(matches!(
        game.objects[b].kind,
        ObjectKind::Balloon {
            state: BalloonState::Hidden,
            timer: 60,
            ..
        }
    ));
}

#[test]
fn fall_floor_shakes_then_drops_out() {
    let mut game = bare_game();
    let floor = game.spawn(ObjectType::FallFloor, 24.0, 112.0).unwrap();
    game.spawn(ObjectType::Player, 24.0, 104.0);

    game.update();
    assert!(matches!(
        game.objects[floor].kind,
        ObjectKind::FallFloor {
            state: FallFloorState::Shaking,
            ..
        }
    ));

    // 15 shake frames, then it goes intangible for 60
    for _ in 0..15 {
        game.update();
    }
    let fall_floor = game
        .objects
        .iter()
        .find(|o| o.ty() == ObjectType::FallFloor)
        .unwrap();
    assert!(matches!(
        fall_floor.kind,
        ObjectKind::FallFloor {
            state: FallFloorState::Hidden,
            ..
        }
    ));
    assert!(!fall_floor.collideable);
}

#[test]
fn title_screen_starts_the_run() {
    let mut game = Game::new(TestHost::default());
    game.set_random_seed(7);
    game.init();
    assert!(game.is_title());

    game.host.press(Button::Jump);
    game.update();
    assert!(game.start_game);
    assert!(game.host.sfx_log.contains(&38));

    // Flash counts down from 50 to -30 before the run begins
    for _ in 0..80 {
        game.update();
    }
    assert!(!game.is_title());
    assert_eq!((game.room.x, game.room.y), (0, 0));
    assert_eq!(count(&game, ObjectType::PlayerSpawn), 1);
}

#[test]
fn save_restore_replays_identically() {
    let mut game = booted_game();
    for _ in 0..10 {
        game.update();
        game.draw();
    }

    let mut snapshot = vec![0u8; game.state_size()];
    game.save_state(&mut snapshot);

    // Continue 20 frames, record where we end up
    for _ in 0..20 {
        game.update();
        game.draw();
    }
    let mut first_run = vec![0u8; game.state_size()];
    game.save_state(&mut first_run);

    // Rewind and replay the same 20 frames
    game.load_state(&snapshot);
    for _ in 0..20 {
        game.update();
        game.draw();
    }
    let mut second_run = vec![0u8; game.state_size()];
    game.save_state(&mut second_run);

    assert_eq!(first_run, second_run);
}
