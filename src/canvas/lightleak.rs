use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::{Gradient, Surface};

const LEAKS: usize = 3;

/// Warm film light leaks drifting over the frame
pub struct LightLeak;

pub fn create(_frame: &Frame, _seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(LightLeak)
}

impl CanvasEffect for LightLeak {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let warm = frame.color.lerp(Rgb::new(255, 150, 60), 0.3);
        let radius = frame.width.max(frame.height) * 0.5 * frame.size;

        for i in 0..LEAKS {
            let k = i as f64;
            let t = frame.time;
            let cx = frame.width * (0.5 + 0.45 * (t * 0.7 + k * 2.1).sin());
            let cy = frame.height * (0.5 + 0.4 * (t * 0.5 + k * 1.3).cos());
            // Each leak breathes between half and full strength
            let pulse = 0.5 + 0.5 * ((t + k).sin() + 1.0) * 0.5;
            let color = warm.rotate_hue(k * 0.03);
            let leak = Gradient::radial(cx, cy, 0.0, radius)
                .stop(0.0, frame.rgba(color, 0.45 * pulse))
                .stop(0.6, frame.rgba(color, 0.15 * pulse))
                .stop(1.0, frame.rgba(color, 0.0));
            surface.fill_gradient(&leak);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::effect::EffectType;
    use crate::surface::Recorder;

    #[test]
    fn test_one_gradient_per_leak() {
        let params = params(EffectType::LightLeak, 0.7);
        let mut surface = Recorder::new();
        LightLeak.tick(&mut surface, &frame(&params, 1.0));
        assert_eq!(surface.draw_count(), LEAKS);
        assert!(surface.max_alpha() <= 0.7 * 0.45 + 1e-9);
    }
}
