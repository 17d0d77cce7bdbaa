use crate::color::Rgba;

/// Size of the host window in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }
}

impl Default for Viewport {
    /// A typical phone preview.
    fn default() -> Self {
        Viewport::new(390.0, 844.0)
    }
}

/// Geometry of a gradient, in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientShape {
    /// Color varies along the line from (x0, y0) to (x1, y1).
    Linear { x0: f64, y0: f64, x1: f64, y1: f64 },
    /// Color varies with distance from (cx, cy), between radii r0 and r1.
    Radial { cx: f64, cy: f64, r0: f64, r1: f64 },
}

/// A gradient with color stops at offsets in 0.0..=1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub shape: GradientShape,
    pub stops: Vec<(f64, Rgba)>,
}

impl Gradient {
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Gradient {
            shape: GradientShape::Linear { x0, y0, x1, y1 },
            stops: Vec::new(),
        }
    }

    pub fn radial(cx: f64, cy: f64, r0: f64, r1: f64) -> Self {
        Gradient {
            shape: GradientShape::Radial { cx, cy, r0, r1 },
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f64, color: Rgba) -> Self {
        self.stops.push((offset.clamp(0.0, 1.0), color));
        self
    }

    /// Gradient parameter (0..1) at a point.
    pub fn offset_at(&self, x: f64, y: f64) -> f64 {
        match self.shape {
            GradientShape::Linear { x0, y0, x1, y1 } => {
                let (dx, dy) = (x1 - x0, y1 - y0);
                let len2 = dx * dx + dy * dy;
                if len2 < f64::EPSILON {
                    return 0.0;
                }
                (((x - x0) * dx + (y - y0) * dy) / len2).clamp(0.0, 1.0)
            }
            GradientShape::Radial { cx, cy, r0, r1 } => {
                let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
                let span = (r1 - r0).abs().max(f64::EPSILON);
                ((d - r0) / span).clamp(0.0, 1.0)
            }
        }
    }

    /// Interpolated color at a point.
    pub fn color_at(&self, x: f64, y: f64) -> Rgba {
        let t = self.offset_at(x, y);
        let (Some(&(t0, first)), Some(&(t1, last))) = (self.stops.first(), self.stops.last())
        else {
            return Rgba::TRANSPARENT;
        };
        if t <= t0 {
            return first;
        }
        if t >= t1 {
            return last;
        }
        for pair in self.stops.windows(2) {
            let ((ta, a), (tb, b)) = (pair[0], pair[1]);
            if t >= ta && t <= tb {
                let f = (t - ta) / (tb - ta).max(f64::EPSILON);
                let rgb = a.rgb().lerp(b.rgb(), f);
                return rgb.with_alpha(a.a + (b.a - a.a) * f);
            }
        }
        last
    }

    /// Highest alpha of any stop.
    pub fn max_alpha(&self) -> f64 {
        self.stops.iter().map(|(_, c)| c.a).fold(0.0, f64::max)
    }
}

/// How a filled shape is painted.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Gradient(Gradient),
}

impl Paint {
    pub fn color_at(&self, x: f64, y: f64) -> Rgba {
        match self {
            Paint::Solid(c) => *c,
            Paint::Gradient(g) => g.color_at(x, y),
        }
    }

    pub fn max_alpha(&self) -> f64 {
        match self {
            Paint::Solid(c) => c.a,
            Paint::Gradient(g) => g.max_alpha(),
        }
    }
}

impl From<Rgba> for Paint {
    fn from(c: Rgba) -> Self {
        Paint::Solid(c)
    }
}

impl From<Gradient> for Paint {
    fn from(g: Gradient) -> Self {
        Paint::Gradient(g)
    }
}

/// A 2D drawing target sized to the viewport.
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Match the surface to the viewport size.
    fn resize(&mut self, width: f64, height: f64);

    /// Erase the whole surface to transparent.
    fn clear(&mut self);

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, line_width: f64, color: Rgba);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba);

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, line_width: f64, color: Rgba);

    fn fill_polygon(&mut self, points: &[(f64, f64)], paint: &Paint);

    /// Paint the gradient over the whole surface.
    fn fill_gradient(&mut self, gradient: &Gradient);
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Resize { width: f64, height: f64 },
    Clear,
    Circle { x: f64, y: f64, radius: f64, alpha: f64, filled: bool },
    Rect { x: f64, y: f64, w: f64, h: f64, alpha: f64 },
    Line { alpha: f64 },
    Polygon { points: usize, alpha: f64 },
    Gradient { alpha: f64 },
}

impl DrawCall {
    /// Alpha used by the call, if it paints anything.
    pub fn alpha(&self) -> Option<f64> {
        match self {
            DrawCall::Resize { .. } | DrawCall::Clear => None,
            DrawCall::Circle { alpha, .. }
            | DrawCall::Rect { alpha, .. }
            | DrawCall::Line { alpha }
            | DrawCall::Polygon { alpha, .. }
            | DrawCall::Gradient { alpha } => Some(*alpha),
        }
    }
}

/// A surface that only records what was drawn on it.
#[derive(Debug, Default)]
pub struct Recorder {
    width: f64,
    height: f64,
    pub calls: Vec<DrawCall>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of calls that actually paint.
    pub fn draw_count(&self) -> usize {
        self.calls.iter().filter(|c| c.alpha().is_some()).count()
    }

    pub fn resize_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Resize { .. }))
            .count()
    }

    pub fn clear_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == DrawCall::Clear).count()
    }

    /// Largest alpha used by any recorded call.
    pub fn max_alpha(&self) -> f64 {
        self.calls
            .iter()
            .filter_map(DrawCall::alpha)
            .fold(0.0, f64::max)
    }
}

impl Surface for Recorder {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.calls.push(DrawCall::Resize { width, height });
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.calls.push(DrawCall::Circle {
            x,
            y,
            radius,
            alpha: color.a,
            filled: true,
        });
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, _line_width: f64, color: Rgba) {
        self.calls.push(DrawCall::Circle {
            x,
            y,
            radius,
            alpha: color.a,
            filled: false,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        self.calls.push(DrawCall::Rect {
            x,
            y,
            w,
            h,
            alpha: color.a,
        });
    }

    fn line(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64, _line_width: f64, color: Rgba) {
        self.calls.push(DrawCall::Line { alpha: color.a });
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], paint: &Paint) {
        self.calls.push(DrawCall::Polygon {
            points: points.len(),
            alpha: paint.max_alpha(),
        });
    }

    fn fill_gradient(&mut self, gradient: &Gradient) {
        self.calls.push(DrawCall::Gradient {
            alpha: gradient.max_alpha(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_linear_gradient_interpolates() {
        let g = Gradient::linear(0.0, 0.0, 100.0, 0.0)
            .stop(0.0, Rgb::BLACK.with_alpha(0.0))
            .stop(1.0, Rgb::WHITE.with_alpha(1.0));
        let mid = g.color_at(50.0, 10.0);
        assert_eq!(mid.rgb(), Rgb::new(128, 128, 128));
        assert!((mid.a - 0.5).abs() < 1e-9);
        assert_eq!(g.color_at(-10.0, 0.0).a, 0.0);
    }

    #[test]
    fn test_radial_gradient_offset() {
        let g = Gradient::radial(0.0, 0.0, 10.0, 20.0);
        assert_eq!(g.offset_at(5.0, 0.0), 0.0);
        assert!((g.offset_at(15.0, 0.0) - 0.5).abs() < 1e-9);
        assert_eq!(g.offset_at(30.0, 0.0), 1.0);
    }

    #[test]
    fn test_recorder_tracks_alpha_and_resizes() {
        let mut r = Recorder::new();
        r.resize(390.0, 844.0);
        r.clear();
        r.fill_circle(1.0, 1.0, 2.0, Rgb::WHITE.with_alpha(0.3));
        r.fill_rect(0.0, 0.0, 5.0, 5.0, Rgb::WHITE.with_alpha(0.6));
        assert_eq!(r.resize_count(), 1);
        assert_eq!(r.clear_count(), 1);
        assert_eq!(r.draw_count(), 2);
        assert!((r.max_alpha() - 0.6).abs() < 1e-9);
        assert_eq!(r.width(), 390.0);
    }
}
