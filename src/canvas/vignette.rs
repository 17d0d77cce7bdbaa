use super::{CanvasEffect, Frame};
use crate::color::Rgb;
use crate::surface::{Gradient, Surface};

/// Darkened edges with a slowly breathing clear center
pub struct Vignette;

pub fn create(_frame: &Frame, _seed: u64) -> Box<dyn CanvasEffect> {
    Box::new(Vignette)
}

impl CanvasEffect for Vignette {
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame) {
        let cx = frame.width / 2.0;
        let cy = frame.height / 2.0;
        let clear = frame.width.min(frame.height) * (0.25 + 0.05 * frame.time.sin()) * frame.size;
        let edge = frame.width.hypot(frame.height) / 2.0;
        let shade = frame.color.lerp(Rgb::BLACK, 0.5);
        let vignette = Gradient::radial(cx, cy, clear, edge.max(clear + 1.0))
            .stop(0.0, frame.rgba(shade, 0.0))
            .stop(1.0, frame.rgba(shade, 0.9));
        surface.fill_gradient(&vignette);
    }
}
