use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Most slices alive at once.
pub const CAPACITY: usize = 24;

/// Average glitch bursts per second.
const BURST_RATE: f64 = 6.0;

/// Spacing of the static scanlines, in px.
const SCANLINE_GAP: f64 = 4.0;

struct Slice {
    y: f64,
    height: f64,
    shift: f64,
    color: Rgb,
    intensity: f64,
    /// Nominal frames left on screen.
    frames: f64,
}

/// Digital glitch: displaced color slices over faint scanlines
pub struct Glitch {
    slices: Vec<Slice>,
    rng: StdRng,
}

pub fn create(_frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Glitch {
        slices: Vec::with_capacity(CAPACITY),
        rng: StdRng::seed_from_u64(seed),
    })
}

impl Glitch {
    fn burst(&mut self, frame: &Frame) {
        let count = self.rng.random_range(3..8);
        for _ in 0..count {
            if self.slices.len() >= CAPACITY {
                break;
            }
            // Split channels: tint toward red or cyan
            let channel = if self.rng.random_range(0.0..1.0) < 0.5 {
                Rgb::new(255, 0, 80)
            } else {
                Rgb::new(0, 255, 255)
            };
            self.slices.push(Slice {
                y: self.rng.random_range(0.0..frame.height.max(1.0)),
                height: self.rng.random_range(2.0..30.0) * frame.size,
                shift: self.rng.random_range(-40.0..40.0) * frame.size,
                color: frame.color.lerp(channel, 0.4),
                intensity: self.rng.random_range(0.3..0.8),
                frames: self.rng.random_range(2.0..6.0),
            });
        }
    }
}

impl CanvasEffect for Glitch {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let mut y = 0.0;
        let line = frame.tint(0.06);
        while y < frame.height {
            surface.fill_rect(0.0, y, frame.width, 1.0, line);
            y += SCANLINE_GAP;
        }

        if frame.roll(&mut self.rng, BURST_RATE) {
            self.burst(frame);
        }

        for s in &self.slices {
            surface.fill_rect(
                s.shift,
                s.y,
                frame.width,
                s.height,
                frame.rgba(s.color, s.intensity),
            );
        }
        let step = frame.step();
        for s in &mut self.slices {
            s.frames -= step;
        }
        self.slices.retain(|s| s.frames > 0.0);
    }

    fn population(&self) -> usize {
        self.slices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::Recorder;

    #[test]
    fn test_scanlines_cover_the_height() {
        let params = params(EffectType::Glitch, 0.7);
        let f = frame(&params, 0.0);
        let mut glitch = Glitch {
            slices: Vec::new(),
            rng: StdRng::seed_from_u64(0),
        };
        let mut surface = Recorder::new();
        glitch.tick(&mut surface, &f);
        let scanlines = (f.height / SCANLINE_GAP).ceil() as usize;
        assert!(surface.draw_count() >= scanlines);
    }

    #[test]
    fn test_slices_expire() {
        let params = params(EffectType::Glitch, 0.7);
        let f = frame(&params, 0.0);
        let mut glitch = Glitch {
            slices: Vec::new(),
            rng: StdRng::seed_from_u64(0),
        };
        glitch.burst(&f);
        assert!(glitch.population() >= 3);
        let mut frozen = f;
        frozen.dt = super::super::NOMINAL_FRAME;
        frozen.speed = 0.0; // no new bursts
        let mut surface = Recorder::new();
        for _ in 0..6 {
            glitch.tick(&mut surface, &frozen);
        }
        assert_eq!(glitch.population(), 0);
    }
}
