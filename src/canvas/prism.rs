use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::{Gradient, Paint, Surface};

/// Hue bands across the spectrum sweep.
const BANDS: usize = 7;

/// Rainbow light rotating as if cast through a prism
pub struct Prism;

pub fn create(_frame: &Frame, _seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Prism)
}

/// Spectrum gradient through the center at `angle`.
fn spectrum(frame: &Frame, angle: f64) -> Gradient {
    let cx = frame.width / 2.0;
    let cy = frame.height / 2.0;
    let reach = frame.width.hypot(frame.height) / 2.0;
    let (dx, dy) = (angle.cos() * reach, angle.sin() * reach);

    let base = frame.color.hue();
    (0..BANDS).fold(
        Gradient::linear(cx - dx, cy - dy, cx + dx, cy + dy),
        |g, i| {
            let t = i as f64 / (BANDS - 1) as f64;
            let color = frame.color.at_hue(base + t * 300.0);
            g.stop(t, frame.rgba(color, 0.35))
        },
    )
}

impl CanvasEffect for Prism {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let angle = frame.time * 0.5;
        surface.fill_gradient(&spectrum(frame, angle));

        // A bright beam fanning out from the top corner
        let spread = 0.25 * frame.size;
        let reach = frame.width.hypot(frame.height);
        let a = std::f64::consts::FRAC_PI_4 + (frame.time * 0.7).sin() * 0.3;
        let beam = [
            (0.0, 0.0),
            ((a - spread).cos() * reach, (a - spread).sin() * reach),
            ((a + spread).cos() * reach, (a + spread).sin() * reach),
        ];
        let light = Gradient::radial(0.0, 0.0, 0.0, reach)
            .stop(0.0, frame.rgba(Rgb::WHITE, 0.3))
            .stop(1.0, frame.rgba(Rgb::WHITE, 0.0));
        surface.fill_polygon(&beam, &Paint::Gradient(light));
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;

    #[test]
    fn test_spectrum_has_all_bands_under_opacity() {
        let params = params(EffectType::Prism, 0.5);
        let g = spectrum(&frame(&params, 0.0), 0.0);
        assert_eq!(g.stops.len(), BANDS);
        assert!(g.max_alpha() <= 0.5);
    }

    #[test]
    fn test_spectrum_rotates_with_angle() {
        let params = params(EffectType::Prism, 0.5);
        let f = frame(&params, 0.0);
        assert_ne!(spectrum(&f, 0.0).shape, spectrum(&f, 1.0).shape);
    }
}
