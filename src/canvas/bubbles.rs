use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const CAPACITY: usize = 30;

/// Bubbles are dropped once they rise this far above the top edge.
const EXIT_Y: f64 = -100.0;

struct Bubble {
    x: f64,
    y: f64,
    radius: f64,
    rise: f64,
    wobble: f64,
    wobble_speed: f64,
}

/// Translucent bubbles rising from below the bottom edge
pub struct Bubbles {
    bubbles: Vec<Bubble>,
    rng: StdRng,
}

pub fn create(_frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Bubbles {
        bubbles: Vec::with_capacity(CAPACITY),
        rng: StdRng::seed_from_u64(seed),
    })
}

impl Bubbles {
    fn spawn(&mut self, frame: &Frame) -> Bubble {
        let radius = self.rng.random_range(8.0..28.0) * frame.size;
        Bubble {
            x: self.rng.random_range(0.0..frame.width.max(1.0)),
            y: frame.height + radius + self.rng.random_range(0.0..40.0),
            radius,
            rise: self.rng.random_range(0.4..1.4),
            wobble: self.rng.random_range(0.0..std::f64::consts::TAU),
            wobble_speed: self.rng.random_range(0.01..0.04),
        }
    }
}

impl CanvasEffect for Bubbles {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        for _ in 0..2 {
            if self.bubbles.len() >= CAPACITY {
                break;
            }
            let bubble = self.spawn(frame);
            self.bubbles.push(bubble);
        }

        let motion = frame.motion();
        for b in &mut self.bubbles {
            b.y -= b.rise * motion;
            b.wobble += b.wobble_speed * motion;
            b.x += b.wobble.sin() * 0.4 * motion;
        }
        self.bubbles.retain(|b| b.y >= EXIT_Y);

        let shine = frame.color.lerp(Rgb::WHITE, 0.7);
        for b in &self.bubbles {
            surface.fill_circle(b.x, b.y, b.radius, frame.tint(0.15));
            surface.stroke_circle(b.x, b.y, b.radius, 1.5 * frame.size, frame.tint(0.6));
            surface.fill_circle(
                b.x - b.radius * 0.35,
                b.y - b.radius * 0.35,
                b.radius * 0.2,
                frame.rgba(shine, 0.8),
            );
        }
    }

    fn population(&self) -> usize {
        self.bubbles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::Recorder;

    #[test]
    fn test_pool_fills_lazily_to_capacity() {
        let params = params(EffectType::Bubbles, 0.7);
        let mut fx = create(&frame(&params, 0.0), 1);
        let mut surface = Recorder::new();
        assert_eq!(fx.population(), 0);
        fx.tick(&mut surface, &frame(&params, 0.0));
        assert_eq!(fx.population(), 2);
        for _ in 0..20 {
            fx.tick(&mut surface, &frame(&params, 0.0));
        }
        assert_eq!(fx.population(), CAPACITY);
    }

    #[test]
    fn test_bubbles_leave_through_the_top() {
        let params = params(EffectType::Bubbles, 0.7);
        let f = frame(&params, 0.0);
        let mut fx = Bubbles {
            bubbles: Vec::new(),
            rng: StdRng::seed_from_u64(2),
        };
        fx.bubbles.push(Bubble {
            x: 10.0,
            y: EXIT_Y + 0.5,
            radius: 10.0,
            rise: 1.0,
            wobble: 0.0,
            wobble_speed: 0.0,
        });
        // Fill the rest of the pool so no new bubble is spawned this tick.
        while fx.bubbles.len() < CAPACITY {
            let b = fx.spawn(&f);
            fx.bubbles.push(b);
        }
        let mut surface = Recorder::new();
        fx.tick(&mut surface, &f);
        assert_eq!(fx.population(), CAPACITY - 1);
        assert!(fx.bubbles.iter().all(|b| b.y >= EXIT_Y));
    }
}
