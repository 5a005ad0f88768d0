//! Cosmetic layers: clouds, ambient particles, death bursts
//!
//! Purely visual, but not free to change: they draw from the shared RNG,
//! so their exact draw order and random consumption are part of the
//! determinism contract.

use glam::Vec2;

use crate::host::Host;
use crate::sim::state::Game;
use crate::{p8_modulo, p8_sin};

/// One background cloud band
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cloud {
    pub x: f32,
    pub y: f32,
    pub spd: f32,
    pub w: f32,
}

/// One drifting ambient particle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub s: f32,
    pub spd: f32,
    pub off: f32,
    pub c: f32,
}

/// One fragment of the player death burst
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeadParticle {
    pub active: bool,
    pub x: f32,
    pub y: f32,
    pub t: f32,
    pub spd: Vec2,
}

impl<H: Host> Game<H> {
    pub(crate) fn init_clouds(&mut self) {
        for cloud in &mut self.clouds {
            *cloud = Cloud {
                x: self.rng.rnd(128.0),
                y: self.rng.rnd(128.0),
                spd: 1.0 + self.rng.rnd(4.0),
                w: 32.0 + self.rng.rnd(32.0),
            };
        }
    }

    pub(crate) fn init_particles(&mut self) {
        for p in &mut self.particles {
            *p = Particle {
                x: self.rng.rnd(128.0),
                y: self.rng.rnd(128.0),
                s: (self.rng.rnd(5.0) / 4.0).floor(),
                spd: 0.25 + self.rng.rnd(5.0),
                off: self.rng.rnd(1.0),
                c: 6.0 + (0.5 + self.rng.rnd(1.0)).floor(),
            };
        }
    }

    pub(crate) fn draw_clouds(&mut self) {
        let color = if self.new_bg { 14 } else { 1 };
        for i in 0..self.clouds.len() {
            let c = &mut self.clouds[i];
            c.x += c.spd;
            let (x, y, w) = (c.x, c.y, c.w);
            self.host.rectfill(
                x as i32,
                y as i32,
                (x + w) as i32,
                (y + 4.0 + (1.0 - w / 64.0) * 12.0) as i32,
                color,
            );
            if self.clouds[i].x > 128.0 {
                self.clouds[i].x = -self.clouds[i].w;
                self.clouds[i].y = self.rng.rnd(128.0 - 8.0);
            }
        }
    }

    pub(crate) fn draw_particles(&mut self) {
        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            p.x += p.spd;
            p.y += p8_sin(p.off);
            p.off += (p.spd / 32.0).min(0.05);
            let (x, y, s, c) = (p.x, p.y, p.s, p.c);
            self.host
                .rectfill(x as i32, y as i32, (x + s) as i32, (y + s) as i32, c as i32);
            if self.particles[i].x > 128.0 + 4.0 {
                self.particles[i].x = -4.0;
                self.particles[i].y = self.rng.rnd(128.0);
            }
        }
    }

    pub(crate) fn draw_dead_particles(&mut self) {
        for i in 0..self.dead_particles.len() {
            let p = &mut self.dead_particles[i];
            if !p.active {
                continue;
            }
            p.x += p.spd.x;
            p.y += p.spd.y;
            p.t -= 1.0;
            if p.t <= 0.0 {
                p.active = false;
            }
            let (x, y, t) = (p.x, p.y, p.t);
            self.host.rectfill(
                (x - t / 5.0) as i32,
                (y - t / 5.0) as i32,
                (x + t / 5.0) as i32,
                (y + t / 5.0) as i32,
                (14.0 + p8_modulo(t, 2.0)) as i32,
            );
        }
    }
}
