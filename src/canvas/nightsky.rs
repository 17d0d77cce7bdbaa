use super::{CanvasEffect, Frame, twinkle};
use crate::color::Rgb;
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const CAPACITY: usize = 150;

/// Average shooting stars per second.
const METEOR_RATE: f64 = 0.15;

struct Star {
    /// Position as a fraction of the viewport, so resizes keep the sky.
    fx: f64,
    fy: f64,
    radius: f64,
    phase: f64,
    twinkle_speed: f64,
}

struct Meteor {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    life: f64,
}

/// Twinkling night sky with the occasional shooting star
pub struct NightSky {
    stars: Vec<Star>,
    meteor: Option<Meteor>,
    rng: StdRng,
}

pub fn create(frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    let mut rng = StdRng::seed_from_u64(seed);
    let stars = (0..CAPACITY)
        .map(|_| Star {
            fx: rng.random_range(0.0..1.0),
            fy: rng.random_range(0.0..1.0),
            radius: rng.random_range(0.5..1.8) * frame.size,
            phase: rng.random_range(0.0..std::f64::consts::TAU),
            twinkle_speed: rng.random_range(0.02..0.08),
        })
        .collect();
    Box::new(NightSky {
        stars,
        meteor: None,
        rng,
    })
}

impl CanvasEffect for NightSky {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let motion = frame.motion();
        let star_color = frame.color.lerp(Rgb::WHITE, 0.5);
        for s in &mut self.stars {
            s.phase += s.twinkle_speed * motion;
            surface.fill_circle(
                s.fx * frame.width,
                s.fy * frame.height,
                s.radius,
                frame.rgba(star_color, twinkle(s.phase)),
            );
        }

        if self.meteor.is_none() && frame.roll(&mut self.rng, METEOR_RATE) {
            self.meteor = Some(Meteor {
                x: self.rng.random_range(0.0..frame.width * 0.7 + 1.0),
                y: self.rng.random_range(0.0..frame.height * 0.3 + 1.0),
                vx: self.rng.random_range(6.0..10.0),
                vy: self.rng.random_range(2.0..4.0),
                life: 1.0,
            });
        }
        if let Some(m) = &mut self.meteor {
            m.x += m.vx * motion;
            m.y += m.vy * motion;
            m.life -= 0.02 * motion;
            let tail = 8.0 * frame.size;
            surface.line(
                m.x,
                m.y,
                m.x - m.vx * tail,
                m.y - m.vy * tail,
                1.5 * frame.size,
                frame.rgba(Rgb::WHITE, m.life),
            );
        }
        if self
            .meteor
            .as_ref()
            .is_some_and(|m| m.life <= 0.0 || m.x > frame.width + 100.0)
        {
            self.meteor = None;
        }
    }

    fn population(&self) -> usize {
        self.stars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::{DrawCall, Recorder};

    #[test]
    fn test_twinkle_drives_alpha() {
        let params = params(EffectType::NightSky, 0.8);
        let f = frame(&params, 0.0);
        let mut sky = NightSky {
            stars: vec![Star {
                fx: 0.5,
                fy: 0.5,
                radius: 1.0,
                phase: std::f64::consts::FRAC_PI_2 - 0.05,
                twinkle_speed: 0.05,
            }],
            meteor: None,
            rng: StdRng::seed_from_u64(0),
        };
        let mut surface = Recorder::new();
        sky.tick(&mut surface, &f);
        // Peak of the sine: full local intensity, capped by the opacity.
        let alpha = surface.calls.iter().find_map(|c| match c {
            DrawCall::Circle { alpha, .. } => Some(*alpha),
            _ => None,
        });
        assert!((alpha.unwrap_or_default() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_population_is_fixed() {
        let params = params(EffectType::NightSky, 0.8);
        let f = frame(&params, 0.0);
        let mut fx = create(&f, 12);
        let mut surface = Recorder::new();
        for _ in 0..500 {
            fx.tick(&mut surface, &f);
        }
        assert_eq!(fx.population(), CAPACITY);
    }
}
