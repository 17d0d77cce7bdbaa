use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::{Gradient, Paint, Surface};

/// Wave layers, back to front.
const LAYERS: usize = 3;

/// Horizontal spacing of wave outline points, in px.
const POINT_SPACING: f64 = 8.0;

/// Ocean waves rolling across the lower part of the page
pub struct Ocean;

pub fn create(_frame: &Frame, _seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Ocean)
}

/// Surface height of a wave layer at x.
fn wave_y(frame: &Frame, layer: usize, x: f64) -> f64 {
    let l = layer as f64;
    let fx = x / frame.width.max(1.0);
    let t = frame.time * 10.0;
    let amp = 20.0 * frame.size * (1.0 - l * 0.2);

    let wave1 = (fx * 6.0 + t * 1.5 + l).sin() * amp;
    let wave2 = (fx * 12.0 - t * 2.5 + l * 2.0).sin() * amp * 0.4;
    let wave3 = (fx * 3.0 + t * 0.8).sin() * amp * 0.6;
    frame.height * (0.6 + l * 0.12) + wave1 + wave2 + wave3
}

impl CanvasEffect for Ocean {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let columns = (frame.width / POINT_SPACING).ceil().max(1.0) as usize;

        for layer in 0..LAYERS {
            let mut outline: Vec<(f64, f64)> = (0..=columns)
                .map(|i| {
                    let x = (i as f64 * POINT_SPACING).min(frame.width);
                    (x, wave_y(frame, layer, x))
                })
                .collect();
            let crest = outline.iter().map(|p| p.1).fold(f64::MAX, f64::min);
            outline.push((frame.width, frame.height));
            outline.push((0.0, frame.height));

            // Deeper layers are darker and more opaque
            let depth = layer as f64 / (LAYERS - 1) as f64;
            let top = frame.color.lerp(Rgb::WHITE, 0.3 * (1.0 - depth));
            let bottom = frame.color.lerp(Rgb::new(0, 20, 60), 0.5 + 0.3 * depth);
            let gradient = Gradient::linear(0.0, crest, 0.0, frame.height)
                .stop(0.0, frame.rgba(top, 0.35 + 0.2 * depth))
                .stop(1.0, frame.rgba(bottom, 0.6 + 0.3 * depth));
            surface.fill_polygon(&outline, &Paint::Gradient(gradient));

            // Foam along the crest line
            let foam = frame.rgba(Rgb::WHITE, 0.3 * (1.0 - depth * 0.5));
            for pair in outline[..=columns].windows(2) {
                let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
                surface.line(x1, y1, x2, y2, 1.5 * frame.size, foam);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::{DrawCall, Recorder};

    #[test]
    fn test_draws_one_polygon_per_layer() {
        let params = params(EffectType::Ocean, 0.7);
        let mut surface = Recorder::new();
        Ocean.tick(&mut surface, &frame(&params, 0.0));
        let polygons = surface
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Polygon { .. }))
            .count();
        assert_eq!(polygons, LAYERS);
    }

    #[test]
    fn test_waves_move_with_time() {
        let params = params(EffectType::Ocean, 0.7);
        let a = wave_y(&frame(&params, 0.0), 0, 100.0);
        let b = wave_y(&frame(&params, 0.5), 0, 100.0);
        assert!((a - b).abs() > 1e-6);
    }
}
