use super::{CanvasEffect, Frame, twinkle};
use crate::color::Rgb;
use crate::surface::{Gradient, Surface};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const CAPACITY: usize = 200;

const ARMS: usize = 3;

struct Star {
    /// Distance from the core, 0..1 of the galaxy radius.
    orbit: f64,
    angle: f64,
    angular_speed: f64,
    radius: f64,
    phase: f64,
}

/// Spiral galaxy of orbiting stars. The population is fixed at creation.
pub struct Galaxy {
    stars: Vec<Star>,
}

pub fn create(frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    let mut rng = StdRng::seed_from_u64(seed);
    let stars = (0..CAPACITY)
        .map(|i| {
            let orbit: f64 = rng.random_range(0.02..1.0);
            let arm = (i % ARMS) as f64 * std::f64::consts::TAU / ARMS as f64;
            Star {
                orbit,
                angle: arm + orbit * 4.0 + rng.random_range(-0.3..0.3),
                // Inner stars circle faster
                angular_speed: 0.002 + 0.01 / (orbit + 0.2),
                radius: rng.random_range(0.5..2.0) * frame.size,
                phase: rng.random_range(0.0..std::f64::consts::TAU),
            }
        })
        .collect();
    Box::new(Galaxy { stars })
}

impl CanvasEffect for Galaxy {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let cx = frame.width / 2.0;
        let cy = frame.height / 2.0;
        let extent = frame.width.min(frame.height) * 0.45;

        let core = Gradient::radial(cx, cy, 0.0, extent * 0.35)
            .stop(0.0, frame.rgba(frame.color.lerp(Rgb::WHITE, 0.6), 0.5))
            .stop(1.0, frame.tint(0.0));
        surface.fill_gradient(&core);

        let motion = frame.motion();
        for s in &mut self.stars {
            s.angle += s.angular_speed * motion;
            s.phase += 0.05 * motion;

            let r = s.orbit * extent;
            let x = cx + s.angle.cos() * r;
            // Tilted disc
            let y = cy + s.angle.sin() * r * 0.6;
            let color = frame.color.lerp(Rgb::WHITE, 1.0 - s.orbit);
            let local = 0.4 + 0.6 * twinkle(s.phase);
            surface.fill_circle(x, y, s.radius, frame.rgba(color, local));
        }
    }

    fn population(&self) -> usize {
        self.stars.len()
    }
}
