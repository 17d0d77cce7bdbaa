use super::{CanvasEffect, Frame};
use crate::surface::{Gradient, Paint, Surface};
use noise::{NoiseFn, Perlin};

/// Curtain layers, each with its own hue offset.
const LAYERS: usize = 4;

/// Points along each curtain edge.
const SEGMENTS: usize = 48;

/// Aurora curtains swaying across the upper sky
pub struct Aurora {
    noise: Perlin,
}

pub fn create(_frame: &Frame, seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Aurora {
        noise: Perlin::new(seed as u32),
    })
}

impl CanvasEffect for Aurora {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let w = frame.width;
        let h = frame.height;
        let t = frame.time * 3.0;

        for layer in 0..LAYERS {
            let offset = layer as f64 * 0.8;
            let drift = 0.8 + layer as f64 * 0.2;

            let mut top = Vec::with_capacity(SEGMENTS + 1);
            let mut bottom = Vec::with_capacity(SEGMENTS + 1);
            for i in 0..=SEGMENTS {
                let fx = i as f64 / SEGMENTS as f64;
                let n1 = self.noise.get([fx * 3.0 + offset, t * drift * 0.5]);
                let n2 = self.noise.get([fx * 7.0 + offset + 10.0, t * drift * 0.3 + 5.0]);
                let curtain_y = h * (0.08 + layer as f64 * 0.05 + n1 * 0.15 + n2 * 0.05);
                let sag = self.noise.get([fx * 2.0, t * 0.15 + offset]);
                let hang = h * (0.3 + sag * 0.1) * frame.size;
                top.push((fx * w, curtain_y));
                bottom.push((fx * w, curtain_y + hang.max(1.0)));
            }

            let y_min = top.iter().map(|p| p.1).fold(f64::MAX, f64::min);
            let y_max = bottom.iter().map(|p| p.1).fold(f64::MIN, f64::max);

            let color = frame.color.rotate_hue(layer as f64 * 0.08);
            let glow = frame.rgba(color, 0.5 - layer as f64 * 0.08);
            let gradient = Gradient::linear(0.0, y_min, 0.0, y_max)
                .stop(0.0, glow.fade(0.0))
                .stop(0.3, glow)
                .stop(1.0, glow.fade(0.0));

            bottom.reverse();
            top.extend(bottom);
            surface.fill_polygon(&top, &Paint::Gradient(gradient));
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
    fn test_curtains_are_closed_polygons() {
        let params = params(EffectType::Aurora, 0.7);
        let mut fx = create(&frame(&params, 0.0), 42);
        let mut surface = Recorder::new();
        fx.tick(&mut surface, &frame(&params, 0.0));
        let sizes: Vec<usize> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Polygon { points, .. } => Some(*points),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![2 * (SEGMENTS + 1); LAYERS]);
        assert_eq!(fx.population(), 0);
    }
}
