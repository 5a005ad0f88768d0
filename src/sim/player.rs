//! Player controller and respawn cutscene
//!
//! The player's state machine is spread over a handful of fields rather
//! than one enum: grounded-ness is re-derived every frame from a solid
//! probe below the hitbox, a dash is `dash_time > 0`, a buffered jump is
//! `jbuffer > 0`, and `grace > 0` marks the frames after leaving ground
//! during which a jump still counts as grounded.
//!
//! Death is decided first each frame but the slot is removed immediately;
//! the remainder of the tick runs against a detached copy of the player
//! so every later read this frame still sees consistent values.

use glam::Vec2;

use crate::consts::*;
use crate::host::{Button, Host};
use crate::sim::effects::DeadParticle;
use crate::sim::object::{ObjectKind, ObjectType, SpawnState};
use crate::sim::state::Game;
use crate::{appr, clamp, p8_cos, p8_sin, sign};

/// Hair trail starting positions for a newly created player
pub(crate) fn fresh_hair(x: f32, y: f32) -> [Vec2; 5] {
    [Vec2::new(x, y); 5]
}

impl<H: Host> Game<H> {
    pub(crate) fn update_player(&mut self, slot: usize) {
        let input: i32 = if self.host.btn(Button::Right) {
            1
        } else if self.host.btn(Button::Left) {
            -1
        } else {
            0
        };

        if self.pause_player {
            return;
        }

        let mut this = self.objects[slot].clone();
        let ObjectKind::Player(mut p) = this.kind.clone() else {
            return;
        };
        let mut killed = false;

        // Hazards: spikes and falling off the bottom of the room
        if self.spikes_at(
            this.x + this.hitbox.x as f32,
            this.y + this.hitbox.y as f32,
            this.hitbox.w,
            this.hitbox.h,
            this.spd.x,
            this.spd.y,
        ) || this.y > SCREEN
        {
            self.kill_player(slot);
            killed = true;
        }

        let on_ground = self.is_solid(&this, 0.0, 1.0);
        let on_ice = self.is_ice(&this, 0.0, 1.0);

        // Landing smoke
        if on_ground && !p.was_on_ground {
            self.spawn(ObjectType::Smoke, this.x, this.y + 4.0);
        }

        let jump = self.host.btn(Button::Jump) && !p.p_jump;
        p.p_jump = self.host.btn(Button::Jump);
        if jump {
            p.jbuffer = JUMP_BUFFER_FRAMES;
        } else if p.jbuffer > 0 {
            p.jbuffer -= 1;
        }

        let dash = self.host.btn(Button::Dash) && !p.p_dash;
        p.p_dash = self.host.btn(Button::Dash);

        if on_ground {
            p.grace = GRACE_FRAMES;
            if p.djump < self.max_djump {
                self.psfx(54);
                p.djump = self.max_djump;
            }
        } else if p.grace > 0 {
            p.grace -= 1;
        }

        p.dash_effect_time -= 1;
        if p.dash_time > 0 {
            self.spawn(ObjectType::Smoke, this.x, this.y);
            p.dash_time -= 1;
            this.spd.x = appr(this.spd.x, p.dash_target.x, p.dash_accel.x);
            this.spd.y = appr(this.spd.y, p.dash_target.y, p.dash_accel.y);
        } else {
            // Run
            let maxrun = MAX_RUN;
            let accel = if !on_ground {
                AIR_ACCEL
            } else if on_ice {
                ICE_ACCEL
            } else {
                GROUND_ACCEL
            };

            if this.spd.x.abs() > maxrun {
                this.spd.x = appr(this.spd.x, sign(this.spd.x) * maxrun, DECCEL);
            } else {
                this.spd.x = appr(this.spd.x, input as f32 * maxrun, accel);
            }

            if this.spd.x != 0.0 {
                this.flip_x = this.spd.x < 0.0;
            }

            // Gravity, halved near the apex for hang
            let mut maxfall = MAX_FALL;
            let mut gravity = GRAVITY;
            if this.spd.y.abs() <= 0.15 {
                gravity *= 0.5;
            }

            // Wall slide
            if input != 0
                && self.is_solid(&this, input as f32, 0.0)
                && !self.is_ice(&this, input as f32, 0.0)
            {
                maxfall = WALL_SLIDE_MAX_FALL;
                if self.rng.rnd(10.0) < 2.0 {
                    self.spawn(ObjectType::Smoke, this.x + input as f32 * 6.0, this.y);
                }
            }

            if !on_ground {
                this.spd.y = appr(this.spd.y, maxfall, gravity);
            }

            // Jump: grounded (within grace) or off a wall
            if p.jbuffer > 0 {
                if p.grace > 0 {
                    self.psfx(1);
                    p.jbuffer = 0;
                    p.grace = 0;
                    this.spd.y = JUMP_SPEED;
                    self.spawn(ObjectType::Smoke, this.x, this.y + 4.0);
                } else {
                    let wall_dir = if self.is_solid(&this, -3.0, 0.0) {
                        -1.0
                    } else if self.is_solid(&this, 3.0, 0.0) {
                        1.0
                    } else {
                        0.0
                    };
                    if wall_dir != 0.0 {
                        self.psfx(2);
                        p.jbuffer = 0;
                        this.spd.y = JUMP_SPEED;
                        this.spd.x = -wall_dir * (maxrun + 1.0);
                        if !self.is_ice(&this, wall_dir * 3.0, 0.0) {
                            self.spawn(ObjectType::Smoke, this.x + wall_dir * 6.0, this.y);
                        }
                    }
                }
            }

            // Dash
            let d_full = DASH_SPEED;
            let d_half = d_full * std::f32::consts::FRAC_1_SQRT_2;

            if p.djump > 0 && dash {
                self.spawn(ObjectType::Smoke, this.x, this.y);
                p.djump -= 1;
                p.dash_time = DASH_TIME;
                self.has_dashed = true;
                p.dash_effect_time = DASH_EFFECT_TIME;
                let v_input: i32 = if self.host.btn(Button::Up) {
                    -1
                } else if self.host.btn(Button::Down) {
                    1
                } else {
                    0
                };
                if input != 0 {
                    if v_input != 0 {
                        this.spd.x = input as f32 * d_half;
                        this.spd.y = v_input as f32 * d_half;
                    } else {
                        this.spd.x = input as f32 * d_full;
                        this.spd.y = 0.0;
                    }
                } else if v_input != 0 {
                    this.spd.x = 0.0;
                    this.spd.y = v_input as f32 * d_full;
                } else {
                    // No direction held: nudge toward facing
                    this.spd.x = if this.flip_x { -1.0 } else { 1.0 };
                    this.spd.y = 0.0;
                }

                self.psfx(3);
                self.freeze = 2;
                self.shake = 6;
                p.dash_target.x = 2.0 * sign(this.spd.x);
                p.dash_target.y = 2.0 * sign(this.spd.y);
                p.dash_accel.x = 1.5;
                p.dash_accel.y = 1.5;

                if this.spd.y < 0.0 {
                    p.dash_target.y *= 0.75;
                }
                if this.spd.y != 0.0 {
                    p.dash_accel.x *= std::f32::consts::FRAC_1_SQRT_2;
                }
                if this.spd.x != 0.0 {
                    p.dash_accel.y *= std::f32::consts::FRAC_1_SQRT_2;
                }
            } else if dash && p.djump <= 0 {
                self.psfx(9);
                self.spawn(ObjectType::Smoke, this.x, this.y);
            }
        }

        // Animation, in priority order
        p.spr_off += 0.25;
        if !on_ground {
            this.spr = if self.is_solid(&this, input as f32, 0.0) {
                5.0
            } else {
                3.0
            };
        } else if self.host.btn(Button::Down) {
            this.spr = 6.0;
        } else if self.host.btn(Button::Up) {
            this.spr = 7.0;
        } else if this.spd.x == 0.0 || (!self.host.btn(Button::Left) && !self.host.btn(Button::Right))
        {
            this.spr = 1.0;
        } else {
            this.spr = 1.0 + (p.spr_off as i32 % 4) as f32;
        }

        // Level exit off the top
        if this.y < -4.0 && self.level_index() < 30 {
            self.next_room();
        }

        p.was_on_ground = on_ground;

        this.kind = ObjectKind::Player(p);
        if !killed && self.objects.id_at(slot) == Some(this.id) {
            self.objects[slot] = this;
        }
    }

    /// Death: burst particles, arm the delayed restart, free the slot
    pub(crate) fn kill_player(&mut self, slot: usize) {
        self.sfx_timer = 12;
        self.host.sfx(0);
        self.deaths += 1;
        self.shake = 10;
        let (x, y) = (self.objects[slot].x, self.objects[slot].y);
        for (dir, dp) in self.dead_particles.iter_mut().enumerate() {
            let angle = dir as f32 / 8.0;
            *dp = DeadParticle {
                active: true,
                x: x + 4.0,
                y: y + 4.0,
                t: 10.0,
                spd: Vec2::new(p8_sin(angle) * 3.0, p8_cos(angle) * 3.0),
            };
        }
        self.restart_room();
        self.objects.remove(slot);
    }

    pub(crate) fn update_player_spawn(&mut self, slot: usize) {
        let (state, target) = match &self.objects[slot].kind {
            ObjectKind::PlayerSpawn(ps) => (ps.state, ps.target),
            _ => return,
        };
        match state {
            // Shooting up from below the screen
            SpawnState::Rising => {
                if self.objects[slot].y < target.y + 16.0 {
                    if let ObjectKind::PlayerSpawn(ps) = &mut self.objects[slot].kind {
                        ps.state = SpawnState::Falling;
                        ps.delay = 3;
                    }
                }
            }
            // Hover briefly, then drop onto the spawn point
            SpawnState::Falling => {
                let obj = &mut self.objects[slot];
                obj.spd.y += 0.5;
                let (spd_y, y) = (obj.spd.y, obj.y);
                let ObjectKind::PlayerSpawn(ps) = &mut obj.kind else {
                    return;
                };
                if spd_y > 0.0 && ps.delay > 0 {
                    obj.spd.y = 0.0;
                    ps.delay -= 1;
                } else if spd_y > 0.0 && y > target.y {
                    obj.y = target.y;
                    obj.spd = Vec2::ZERO;
                    ps.state = SpawnState::Landing;
                    ps.delay = 5;
                    self.shake = 5;
                    let (x, y) = (self.objects[slot].x, self.objects[slot].y);
                    self.spawn(ObjectType::Smoke, x, y + 4.0);
                    self.host.sfx(5);
                }
            }
            // Crouch frame, then hand over to a live player
            SpawnState::Landing => {
                let obj = &mut self.objects[slot];
                obj.spr = 6.0;
                let mut handoff = false;
                if let ObjectKind::PlayerSpawn(ps) = &mut obj.kind {
                    ps.delay -= 1;
                    handoff = ps.delay < 0;
                }
                if handoff {
                    let (x, y) = (self.objects[slot].x, self.objects[slot].y);
                    self.objects.remove(slot);
                    self.spawn(ObjectType::Player, x, y);
                }
            }
        }
    }

    pub(crate) fn draw_player(&mut self, slot: usize) {
        let mut this = self.objects[slot].clone();
        // Keep the player on screen
        if this.x < -1.0 || this.x > 121.0 {
            this.x = clamp(this.x, -1.0, 121.0);
            this.spd.x = 0.0;
        }
        let ObjectKind::Player(mut p) = this.kind.clone() else {
            return;
        };
        self.set_hair_color(p.djump);
        let facing = if this.flip_x { -1 } else { 1 };
        self.draw_hair(&mut p.hair, this.x, this.y, facing);
        self.host
            .spr(this.spr as i32, this.x as i32, this.y as i32, this.flip_x, this.flip_y);
        self.unset_hair_color();
        this.kind = ObjectKind::Player(p);
        self.objects[slot] = this;
    }

    pub(crate) fn draw_player_spawn(&mut self, slot: usize) {
        let this = self.objects[slot].clone();
        let ObjectKind::PlayerSpawn(mut ps) = this.kind.clone() else {
            return;
        };
        self.set_hair_color(self.max_djump);
        self.draw_hair(&mut ps.hair, this.x, this.y, 1);
        self.host
            .spr(this.spr as i32, this.x as i32, this.y as i32, this.flip_x, this.flip_y);
        self.unset_hair_color();
        if let Some(obj) = self.objects.get_mut(slot) {
            if obj.id == this.id {
                obj.kind = ObjectKind::PlayerSpawn(ps);
            }
        }
    }

    fn set_hair_color(&mut self, djump: i32) {
        let color = match djump {
            1 => 8,
            2 => 7 + (self.frames / 3) % 2 * 4,
            _ => 12,
        };
        self.host.pal(8, color);
    }

    fn unset_hair_color(&mut self) {
        self.host.pal(8, 8);
    }

    /// Lerp the trail toward the head anchor and draw it
    fn draw_hair(&mut self, hair: &mut [Vec2; 5], x: f32, y: f32, facing: i32) {
        let mut last = Vec2::new(
            x + 4.0 - facing as f32 * 2.0,
            y + if self.host.btn(Button::Down) { 4.0 } else { 3.0 },
        );
        for (i, h) in hair.iter_mut().enumerate() {
            h.x += (last.x - h.x) / 1.5;
            h.y += (last.y + 0.5 - h.y) / 1.5;
            let size = (3 - i as i32).clamp(1, 2);
            self.host.circfill(h.x as i32, h.y as i32, size, 8);
            last = *h;
        }
    }
}
