use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::{Gradient, Paint, Surface};
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const CAPACITY: usize = 60;

struct Puff {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    radius: f64,
    life: f64,
    decay: f64,
}

/// Smoke rising with turbulence
pub struct Smoke {
    puffs: Vec<Puff>,
    noise: Perlin,
    rng: StdRng,
}

pub fn create(_frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Smoke {
        puffs: Vec::with_capacity(CAPACITY),
        noise: Perlin::new(seed as u32),
        rng: StdRng::seed_from_u64(seed),
    })
}

impl CanvasEffect for Smoke {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        if self.puffs.len() < CAPACITY {
            self.puffs.push(Puff {
                x: self.rng.random_range(0.0..frame.width.max(1.0)),
                y: frame.height + 40.0,
                vx: self.rng.random_range(-0.3..0.3),
                vy: -self.rng.random_range(0.3..0.8),
                radius: self.rng.random_range(30.0..70.0) * frame.size,
                life: 1.0,
                decay: self.rng.random_range(0.002..0.005),
            });
        }

        // Turbulence grows as the smoke ages
        let motion = frame.motion();
        for p in &mut self.puffs {
            let strength = 0.02 + (1.0 - p.life) * 0.06;
            let turb = self.noise.get([p.x * 0.005, p.y * 0.005, frame.time]);
            p.vx += turb * strength * motion;
            p.x += p.vx * motion;
            p.y += p.vy * motion;
            p.radius += 0.3 * frame.size * motion;
            p.life -= p.decay * motion;
        }
        self.puffs.retain(|p| p.life > 0.0);

        let grey = frame.color.lerp(Rgb::new(160, 160, 160), 0.5);
        for p in &self.puffs {
            let core = frame.rgba(grey, p.life * 0.25);
            let gradient = Gradient::radial(p.x, p.y, 0.0, p.radius)
                .stop(0.0, core)
                .stop(1.0, core.fade(0.0));
            let outline = circle_points(p.x, p.y, p.radius, 16);
            surface.fill_polygon(&outline, &Paint::Gradient(gradient));
        }
    }

    fn population(&self) -> usize {
        self.puffs.len()
    }
}

fn circle_points(cx: f64, cy: f64, r: f64, n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            (cx + a.cos() * r, cy + a.sin() * r)
        })
        .collect()
}
