use super::{CanvasEffect, Frame};
use crate::color::{ColorRamp, ColorStop, Rgb};
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const CAPACITY: usize = 200;

/// New flames per tick while the pool is below capacity.
const SPAWN_PER_TICK: usize = 6;

struct Flame {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    radius: f64,
    life: f64,
    decay: f64,
}

/// Flame particles licking up from the bottom edge
pub struct Fire {
    flames: Vec<Flame>,
    ramp: ColorRamp,
    rng: StdRng,
}

pub fn create(frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    // Hot core near white, body in the configured color, cooling to ember.
    let ramp = ColorRamp::new(vec![
        ColorStop {
            t: 0.0,
            color: frame.color.lerp(Rgb::WHITE, 0.6),
        },
        ColorStop {
            t: 0.35,
            color: frame.color,
        },
        ColorStop {
            t: 1.0,
            color: frame.color.lerp(Rgb::new(60, 0, 0), 0.7),
        },
    ]);
    Box::new(Fire {
        flames: Vec::with_capacity(CAPACITY),
        ramp,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl CanvasEffect for Fire {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        for _ in 0..SPAWN_PER_TICK {
            if self.flames.len() >= CAPACITY {
                break;
            }
            self.flames.push(Flame {
                x: self.rng.random_range(0.0..frame.width.max(1.0)),
                y: frame.height + 10.0,
                vx: self.rng.random_range(-0.5..0.5),
                vy: -self.rng.random_range(1.5..3.5),
                radius: self.rng.random_range(8.0..22.0) * frame.size,
                life: 1.0,
                decay: self.rng.random_range(0.008..0.02),
            });
        }

        let motion = frame.motion();
        for f in &mut self.flames {
            let sway = (frame.time * 3.0 + f.y * 0.02).sin() * 0.3;
            f.x += (f.vx + sway) * motion;
            f.y += f.vy * motion;
            f.life -= f.decay * motion;
        }
        self.flames.retain(|f| f.life > 0.0);

        for f in &self.flames {
            let color = self.ramp.sample(1.0 - f.life);
            let radius = f.radius * f.life.max(0.2);
            surface.fill_circle(f.x, f.y, radius, frame.rgba(color, f.life * 0.8));
        }
    }

    fn population(&self) -> usize {
        self.flames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::Recorder;

    #[test]
    fn test_flames_burn_out() {
        let params = params(EffectType::Fire, 0.7);
        let f = frame(&params, 0.0);
        let mut fire = Fire {
            flames: Vec::new(),
            ramp: ColorRamp::new(Vec::new()),
            rng: StdRng::seed_from_u64(5),
        };
        // Fill to capacity with nearly spent flames.
        for _ in 0..CAPACITY {
            fire.flames.push(Flame {
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
                radius: 1.0,
                life: 0.001,
                decay: 0.01,
            });
        }
        let mut surface = Recorder::new();
        fire.tick(&mut surface, &f);
        assert_eq!(fire.population(), 0);
        fire.tick(&mut surface, &f);
        assert_eq!(fire.population(), SPAWN_PER_TICK);
    }

    #[test]
    fn test_flames_rise() {
        let params = params(EffectType::Fire, 0.7);
        let f = frame(&params, 0.0);
        let mut fx = create(&f, 9);
        let mut surface = Recorder::new();
        surface.resize(390.0, 844.0);
        for _ in 0..30 {
            fx.tick(&mut surface, &f);
        }
        let lowest = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                crate::surface::DrawCall::Circle { y, .. } => Some(*y),
                _ => None,
            })
            .fold(f64::MIN, f64::max);
        // Every flame has moved up at least once before it is drawn.
        assert!(lowest < 844.0 + 10.0);
    }
}
