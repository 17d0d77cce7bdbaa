use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const CAPACITY: usize = 300;

/// Added to every spark's vertical speed each nominal frame.
const GRAVITY: f64 = 0.05;

/// Average bursts per second once the sky has sparks in it.
const BURST_RATE: f64 = 1.2;

struct Spark {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    life: f64,
    decay: f64,
    color: Rgb,
}

/// Firework bursts falling under gravity
pub struct Fireworks {
    sparks: Vec<Spark>,
    rng: StdRng,
}

pub fn create(_frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Fireworks {
        sparks: Vec::with_capacity(CAPACITY),
        rng: StdRng::seed_from_u64(seed),
    })
}

impl Fireworks {
    fn burst(&mut self, frame: &Frame) {
        let room = CAPACITY - self.sparks.len();
        let count = self.rng.random_range(40..70).min(room);
        let cx = self.rng.random_range(frame.width * 0.15..frame.width * 0.85 + 1.0);
        let cy = self.rng.random_range(frame.height * 0.1..frame.height * 0.5 + 1.0);
        let color = frame.color.rotate_hue(self.rng.random_range(-0.1..0.1));
        for _ in 0..count {
            let angle = self.rng.random_range(0.0..std::f64::consts::TAU);
            let speed = self.rng.random_range(1.0..5.0);
            self.sparks.push(Spark {
                x: cx,
                y: cy,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life: 1.0,
                decay: self.rng.random_range(0.01..0.02),
                color,
            });
        }
    }
}

impl CanvasEffect for Fireworks {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        if self.sparks.len() < CAPACITY
            && (self.sparks.is_empty() || frame.roll(&mut self.rng, BURST_RATE))
        {
            self.burst(frame);
        }

        let motion = frame.motion();
        for s in &mut self.sparks {
            s.vy += GRAVITY * motion;
            s.vx *= 0.99;
            s.x += s.vx * motion;
            s.y += s.vy * motion;
            s.life -= s.decay * motion;
        }
        let floor = frame.height + 20.0;
        self.sparks.retain(|s| s.life > 0.0 && s.y <= floor);

        let radius = 2.0 * frame.size;
        for s in &self.sparks {
            surface.fill_circle(s.x, s.y, radius, frame.rgba(s.color, s.life));
        }
    }

    fn population(&self) -> usize {
        self.sparks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::Recorder;

    #[test]
    fn test_empty_sky_bursts_immediately() {
        let params = params(EffectType::Fireworks, 0.7);
        let f = frame(&params, 0.0);
        let mut fx = create(&f, 3);
        fx.tick(&mut Recorder::new(), &f);
        assert!(fx.population() >= 40);
    }

    #[test]
    fn test_gravity_pulls_sparks_down() {
        let params = params(EffectType::Fireworks, 0.7);
        let f = frame(&params, 0.0);
        let mut fw = Fireworks {
            sparks: Vec::new(),
            rng: StdRng::seed_from_u64(4),
        };
        // A full pool suppresses new bursts for this test.
        for _ in 0..CAPACITY {
            fw.sparks.push(Spark {
                x: 100.0,
                y: 100.0,
                vx: 0.0,
                vy: 0.0,
                life: 1.0,
                decay: 0.0,
                color: Rgb::WHITE,
            });
        }
        let mut surface = Recorder::new();
        fw.tick(&mut surface, &f);
        fw.tick(&mut surface, &f);
        assert!((fw.sparks[0].vy - 2.0 * GRAVITY).abs() < 1e-9);
        assert!(fw.sparks[0].y > 100.0);
    }
}
