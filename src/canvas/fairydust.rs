use super::{CanvasEffect, Frame, around, twinkle};
use crate::color::Rgb;
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const CAPACITY: usize = 100;

struct Mote {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    life: f64,
    decay: f64,
    phase: f64,
}

/// Glittering dust trailing behind a wandering wand
pub struct FairyDust {
    motes: Vec<Mote>,
    rng: StdRng,
}

pub fn create(_frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(FairyDust {
        motes: Vec::with_capacity(CAPACITY),
        rng: StdRng::seed_from_u64(seed),
    })
}

/// Where the wand is at a given time: a lazy figure eight.
fn wand(frame: &Frame) -> (f64, f64) {
    let t = frame.time * 8.0;
    (
        frame.width * (0.5 + 0.35 * (t * 0.8).sin()),
        frame.height * (0.5 + 0.3 * (t * 1.3).sin()),
    )
}

impl CanvasEffect for FairyDust {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let (wx, wy) = wand(frame);
        for _ in 0..3 {
            if self.motes.len() >= CAPACITY {
                break;
            }
            let (x, y) = around(&mut self.rng, wx, wy, 10.0 * frame.size);
            self.motes.push(Mote {
                x,
                y,
                vx: self.rng.random_range(-1.0..1.0),
                vy: self.rng.random_range(-1.0..0.5),
                life: 1.0,
                decay: self.rng.random_range(0.01..0.025),
                phase: self.rng.random_range(0.0..std::f64::consts::TAU),
            });
        }

        let motion = frame.motion();
        for m in &mut self.motes {
            m.vy += 0.02 * motion;
            m.x += m.vx * motion;
            m.y += m.vy * motion;
            m.phase += 0.3 * motion;
            m.life -= m.decay * motion;
        }
        self.motes.retain(|m| m.life > 0.0);

        for m in &self.motes {
            let sparkle = twinkle(m.phase);
            let color = frame.color.lerp(Rgb::WHITE, sparkle);
            let local = m.life * sparkle;
            let r = 1.5 * frame.size * m.life.max(0.3);
            surface.fill_circle(m.x, m.y, r, frame.rgba(color, local));
            if sparkle > 0.8 {
                // Cross glint on the brightest motes
                let arm = r * 3.0;
                let glint = frame.rgba(color, local * 0.8);
                surface.line(m.x - arm, m.y, m.x + arm, m.y, 0.5, glint);
                surface.line(m.x, m.y - arm, m.x, m.y + arm, 0.5, glint);
            }
        }
    }

    fn population(&self) -> usize {
        self.motes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::Recorder;

    #[test]
    fn test_motes_spawn_near_the_wand() {
        let params = params(EffectType::FairyDust, 0.7);
        let f = frame(&params, 0.3);
        let mut dust = FairyDust {
            motes: Vec::new(),
            rng: StdRng::seed_from_u64(6),
        };
        let mut surface = Recorder::new();
        dust.tick(&mut surface, &f);
        let (wx, wy) = wand(&f);
        assert_eq!(dust.population(), 3);
        for m in &dust.motes {
            // Spawn radius plus one frame of motion
            assert!(((m.x - wx).powi(2) + (m.y - wy).powi(2)).sqrt() < 12.0);
        }
    }

    #[test]
    fn test_motes_die_out() {
        let params = params(EffectType::FairyDust, 0.7);
        let f = frame(&params, 0.0);
        let mut dust = FairyDust {
            motes: Vec::new(),
            rng: StdRng::seed_from_u64(6),
        };
        for _ in 0..CAPACITY {
            dust.motes.push(Mote {
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
                life: 0.005,
                decay: 0.01,
                phase: 0.0,
            });
        }
        dust.tick(&mut Recorder::new(), &f);
        assert_eq!(dust.population(), 0);
    }
}
