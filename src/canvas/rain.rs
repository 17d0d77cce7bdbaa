use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const CAPACITY: usize = 150;

/// Average lightning strikes per second.
const STRIKE_RATE: f64 = 0.35;

/// Horizontal drift of every drop per nominal frame.
const WIND: f64 = 1.5;

struct Raindrop {
    x: f64,
    y: f64,
    length: f64,
    fall: f64,
}

struct Bolt {
    segments: Vec<(f64, f64, f64, f64)>, // (x1, y1, x2, y2)
    life: f64,
}

/// Heavy rain with occasional lightning
pub struct RainLightning {
    drops: Vec<Raindrop>,
    bolt: Option<Bolt>,
    rng: StdRng,
}

pub fn create(_frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(RainLightning {
        drops: Vec::with_capacity(CAPACITY),
        bolt: None,
        rng: StdRng::seed_from_u64(seed),
    })
}

impl RainLightning {
    fn strike(&mut self, frame: &Frame) -> Bolt {
        let start_x = self
            .rng
            .random_range(frame.width * 0.1..frame.width * 0.9 + 1.0);
        let mut segments = Vec::new();
        branch(
            &mut segments,
            start_x,
            0.0,
            frame.height * 0.7,
            frame.height * 0.04,
            0,
            &mut self.rng,
        );
        Bolt {
            segments,
            life: 1.0,
        }
    }
}

/// Jagged path downward from (x, y), forking now and then.
fn branch(
    segments: &mut Vec<(f64, f64, f64, f64)>,
    x: f64,
    y: f64,
    target_y: f64,
    step: f64,
    depth: u32,
    rng: &mut StdRng,
) {
    if depth > 3 || y >= target_y || step <= 0.0 {
        return;
    }
    let (mut cx, mut cy) = (x, y);
    while cy < target_y {
        let nx = cx + rng.random_range(-step * 1.5..step * 1.5);
        let ny = cy + rng.random_range(step * 0.5..step * 1.5);
        segments.push((cx, cy, nx, ny));

        if depth < 2 && rng.random_range(0.0..1.0) < 0.12 {
            let fork_end = (ny + rng.random_range(step * 2.0..step * 5.0)).min(target_y);
            branch(segments, nx, ny, fork_end, step * 0.8, depth + 1, rng);
        }
        cx = nx;
        cy = ny;
    }
}

impl CanvasEffect for RainLightning {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        for _ in 0..5 {
            if self.drops.len() >= CAPACITY {
                break;
            }
            self.drops.push(Raindrop {
                x: self
                    .rng
                    .random_range(-frame.width * 0.1..frame.width * 1.1 + 1.0),
                y: self.rng.random_range(-frame.height * 0.2 - 1.0..0.0),
                length: self.rng.random_range(10.0..25.0) * frame.size,
                fall: self.rng.random_range(8.0..14.0),
            });
        }

        let motion = frame.motion();
        for d in &mut self.drops {
            d.y += d.fall * motion;
            d.x += WIND * motion;
        }
        let floor = frame.height;
        self.drops.retain(|d| d.y - d.length <= floor);

        let drop_color = frame.color.lerp(Rgb::new(180, 200, 230), 0.5);
        for d in &self.drops {
            let tail_x = d.x - WIND * d.length / d.fall;
            surface.line(
                d.x,
                d.y,
                tail_x,
                d.y - d.length,
                frame.size,
                frame.rgba(drop_color, 0.5),
            );
        }

        if self.bolt.is_none() && frame.roll(&mut self.rng, STRIKE_RATE) {
            self.bolt = Some(self.strike(frame));
        }
        if let Some(bolt) = &mut self.bolt {
            let flash = frame.rgba(Rgb::WHITE, bolt.life * 0.25);
            surface.fill_rect(0.0, 0.0, frame.width, frame.height, flash);
            let glow = frame.color.lerp(Rgb::WHITE, 0.7);
            for &(x1, y1, x2, y2) in &bolt.segments {
                surface.line(x1, y1, x2, y2, 2.0 * frame.size, frame.rgba(glow, bolt.life));
            }
            bolt.life -= 0.08 * frame.step();
        }
        if self.bolt.as_ref().is_some_and(|b| b.life <= 0.0) {
            self.bolt = None;
        }
    }

    fn population(&self) -> usize {
        self.drops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::{DrawCall, Recorder};

    #[test]
    fn test_bolt_reaches_target_depth() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut segments = Vec::new();
        branch(&mut segments, 100.0, 0.0, 500.0, 30.0, 0, &mut rng);
        assert!(!segments.is_empty());
        let deepest = segments.iter().map(|s| s.3).fold(0.0, f64::max);
        assert!(deepest >= 500.0);
    }

    #[test]
    fn test_bolt_fades_and_clears() {
        let params = params(EffectType::RainLightning, 0.7);
        let f = frame(&params, 0.0);
        let mut storm = RainLightning {
            drops: Vec::new(),
            bolt: None,
            rng: StdRng::seed_from_u64(8),
        };
        storm.bolt = Some(storm.strike(&f));
        let mut surface = Recorder::new();
        for _ in 0..13 {
            storm.tick(&mut surface, &f);
        }
        // 13 ticks * 0.08 > 1.0, so the strike is over (unless a new one rolled).
        assert!(storm.bolt.as_ref().is_none_or(|b| b.life > 0.9));
        assert!(
            surface
                .calls
                .iter()
                .any(|c| matches!(c, DrawCall::Rect { .. }))
        );
    }

    #[test]
    fn test_drops_removed_below_floor() {
        let params = params(EffectType::RainLightning, 0.7);
        let f = frame(&params, 0.0);
        let mut storm = RainLightning {
            drops: Vec::new(),
            bolt: None,
            rng: StdRng::seed_from_u64(1),
        };
        for _ in 0..CAPACITY {
            storm.drops.push(Raindrop {
                x: 0.0,
                y: f.height + 100.0,
                length: 10.0,
                fall: 10.0,
            });
        }
        storm.tick(&mut Recorder::new(), &f);
        assert_eq!(storm.population(), 0);
    }
}
