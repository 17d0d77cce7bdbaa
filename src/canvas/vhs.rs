use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Most noise bands alive at once.
pub const CAPACITY: usize = 4;

/// Average noise bands per second.
const BAND_RATE: f64 = 1.5;

/// Static specks per frame at size 1.
const SPECKS: f64 = 60.0;

struct NoiseBand {
    y: f64,
    height: f64,
    frames: f64,
}

/// VHS tape look: static, a rolling tracking bar and noise bands
pub struct Vhs {
    bands: Vec<NoiseBand>,
    rng: StdRng,
}

pub fn create(_frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Vhs {
        bands: Vec::with_capacity(CAPACITY),
        rng: StdRng::seed_from_u64(seed),
    })
}

impl CanvasEffect for Vhs {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let w = frame.width.max(1.0);
        let h = frame.height.max(1.0);
        let snow = frame.color.lerp(Rgb::WHITE, 0.6);

        let specks = (SPECKS * frame.size).round() as usize;
        for _ in 0..specks {
            let x = self.rng.random_range(0.0..w);
            let y = self.rng.random_range(0.0..h);
            let s = self.rng.random_range(1.0..3.0);
            let local = self.rng.random_range(0.1..0.5);
            surface.fill_rect(x, y, s, s, frame.rgba(snow, local));
        }

        // Tracking bar rolls down the screen
        let bar_height = 30.0 * frame.size;
        let bar_y = (frame.time * 120.0).rem_euclid(h + bar_height * 2.0) - bar_height;
        surface.fill_rect(0.0, bar_y, w, bar_height, frame.tint(0.12));

        if self.bands.len() < CAPACITY && frame.roll(&mut self.rng, BAND_RATE) {
            self.bands.push(NoiseBand {
                y: self.rng.random_range(0.0..h),
                height: self.rng.random_range(8.0..40.0) * frame.size,
                frames: self.rng.random_range(3.0..10.0),
            });
        }
        for band in &self.bands {
            let mut y = band.y;
            while y < band.y + band.height {
                let offset = self.rng.random_range(-12.0..12.0);
                let local = self.rng.random_range(0.15..0.4);
                surface.fill_rect(offset, y, w, 2.0, frame.rgba(snow, local));
                y += 3.0;
            }
        }
        let step = frame.step();
        for band in &mut self.bands {
            band.frames -= step;
        }
        self.bands.retain(|b| b.frames > 0.0);
    }

    fn population(&self) -> usize {
        self.bands.len()
    }
}
