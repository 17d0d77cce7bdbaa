use crate::color::Rgba;
use crate::surface::{Gradient, Paint, Surface};
use crossterm::style::Color;

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// No color, brightness only
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

impl ColorMode {
    pub fn next(self) -> Self {
        match self {
            ColorMode::Mono => ColorMode::Ansi16,
            ColorMode::Ansi16 => ColorMode::Ansi256,
            ColorMode::Ansi256 => ColorMode::TrueColor,
            ColorMode::TrueColor => ColorMode::Mono,
        }
    }
}

/// A terminal raster that effects draw on in viewport coordinates.
///
/// Each terminal cell holds two pixels stacked vertically (half blocks).
/// Draw calls are alpha-composited over black; the viewport is stretched
/// onto the pixel grid.
pub struct Canvas {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels (two per terminal row)
    pub height: usize,
    /// Composited color per pixel, channels in 0.0..=1.0
    pub pixels: Vec<[f64; 3]>,
    pub color_mode: ColorMode,
    view_w: f64,
    view_h: f64,
}

impl Canvas {
    pub fn new(term_cols: usize, term_rows: usize, color_mode: ColorMode) -> Self {
        let (width, height) = (term_cols, term_rows * 2);
        Canvas {
            width,
            height,
            pixels: vec![[0.0; 3]; width * height],
            color_mode,
            view_w: width as f64,
            view_h: height as f64,
        }
    }

    /// Follow a terminal resize. The viewport size is kept.
    pub fn resize_grid(&mut self, term_cols: usize, term_rows: usize) {
        self.width = term_cols;
        self.height = term_rows * 2;
        self.pixels = vec![[0.0; 3]; self.width * self.height];
    }

    /// Terminal dimensions needed for this canvas
    pub fn term_size(&self) -> (usize, usize) {
        (self.width, self.height / 2)
    }

    pub fn render(&self) -> String {
        super::halfblock::render(self)
    }

    /// Pixel per viewport unit on each axis.
    fn scale(&self) -> (f64, f64) {
        (
            self.width as f64 / self.view_w.max(1.0),
            self.height as f64 / self.view_h.max(1.0),
        )
    }

    /// Viewport coordinates of a pixel center.
    fn to_view(&self, px: usize, py: usize) -> (f64, f64) {
        let (sx, sy) = self.scale();
        ((px as f64 + 0.5) / sx, (py as f64 + 0.5) / sy)
    }

    /// Pixel range covering the viewport span [a, b], clipped to `limit`.
    fn span(a: f64, b: f64, scale: f64, limit: usize) -> std::ops::Range<usize> {
        let lo = (a.min(b) * scale).floor().max(0.0) as usize;
        let hi = ((a.max(b) * scale).ceil().max(0.0) as usize).min(limit);
        lo.min(hi)..hi
    }

    /// Composite `color` over the pixel. Out-of-range coordinates are ignored.
    #[inline]
    pub fn blend(&mut self, px: usize, py: usize, color: Rgba) {
        if px >= self.width || py >= self.height || color.a <= 0.0 {
            return;
        }
        let a = color.a.min(1.0);
        let p = &mut self.pixels[py * self.width + px];
        let src = [color.r, color.g, color.b].map(|c| c as f64 / 255.0);
        for (dst, s) in p.iter_mut().zip(src) {
            *dst = *dst * (1.0 - a) + s * a;
        }
    }

    /// Pixel nearest to a viewport point.
    fn nearest(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (sx, sy) = self.scale();
        let (px, py) = ((x * sx).floor(), (y * sy).floor());
        (px >= 0.0 && py >= 0.0).then(|| (px as usize, py as usize))
    }

    /// Brightness of a pixel (0.0..=1.0).
    pub fn brightness(&self, px: usize, py: usize) -> f64 {
        self.pixels
            .get(py * self.width + px)
            .map_or(0.0, |p| p.iter().copied().fold(0.0, f64::max))
    }

    pub fn map_color(&self, r: u8, g: u8, b: u8) -> Color {
        match self.color_mode {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                // Approximate RGB to 256-color
                let idx = 16 + (36 * (r as u16 / 51)) + (6 * (g as u16 / 51)) + (b as u16 / 51);
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => {
                let brightness = (r as u16 + g as u16 + b as u16) / 3;
                if brightness < 64 {
                    Color::Black
                } else if r > g && r > b {
                    if brightness > 180 {
                        Color::Red
                    } else {
                        Color::DarkRed
                    }
                } else if g > r && g > b {
                    if brightness > 180 {
                        Color::Green
                    } else {
                        Color::DarkGreen
                    }
                } else if b > r && b > g {
                    if brightness > 180 {
                        Color::Blue
                    } else {
                        Color::DarkBlue
                    }
                } else if brightness > 180 {
                    Color::White
                } else {
                    Color::Grey
                }
            }
        }
    }
}

impl Surface for Canvas {
    fn width(&self) -> f64 {
        self.view_w
    }

    fn height(&self) -> f64 {
        self.view_h
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.view_w = width.max(1.0);
        self.view_h = height.max(1.0);
    }

    fn clear(&mut self) {
        self.pixels.fill([0.0; 3]);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        let (sx, sy) = self.scale();
        let xs = Self::span(x - radius, x + radius, sx, self.width);
        let ys = Self::span(y - radius, y + radius, sy, self.height);
        let mut hit = false;
        for py in ys {
            for px in xs.clone() {
                let (vx, vy) = self.to_view(px, py);
                if (vx - x).powi(2) + (vy - y).powi(2) <= radius * radius {
                    self.blend(px, py, color);
                    hit = true;
                }
            }
        }
        // Smaller than a pixel: fade the nearest one by covered area
        if !hit && let Some((px, py)) = self.nearest(x, y) {
            let coverage = (std::f64::consts::PI * radius * radius * sx * sy).min(1.0);
            self.blend(px, py, color.fade(coverage));
        }
    }

    fn stroke_circle(&mut self, x: f64, y: f64, radius: f64, line_width: f64, color: Rgba) {
        let (sx, sy) = self.scale();
        let half = (line_width / 2.0).max(0.5 / sx.min(sy));
        let outer = radius + half;
        let xs = Self::span(x - outer, x + outer, sx, self.width);
        let ys = Self::span(y - outer, y + outer, sy, self.height);
        for py in ys {
            for px in xs.clone() {
                let (vx, vy) = self.to_view(px, py);
                let d = ((vx - x).powi(2) + (vy - y).powi(2)).sqrt();
                if (d - radius).abs() <= half {
                    self.blend(px, py, color);
                }
            }
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let (sx, sy) = self.scale();
        let xs = Self::span(x, x + w, sx, self.width);
        let ys = Self::span(y, y + h, sy, self.height);
        for py in ys {
            for px in xs.clone() {
                self.blend(px, py, color);
            }
        }
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, _line_width: f64, color: Rgba) {
        let (sx, sy) = self.scale();
        let (ax, ay, bx, by) = (x1 * sx, y1 * sy, x2 * sx, y2 * sy);
        let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0) as usize;
        let mut last = None;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let (fx, fy) = (ax + (bx - ax) * t, ay + (by - ay) * t);
            if fx < 0.0 || fy < 0.0 {
                continue;
            }
            let p = (fx as usize, fy as usize);
            if last != Some(p) {
                self.blend(p.0, p.1, color);
                last = Some(p);
            }
        }
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], paint: &Paint) {
        if points.len() < 3 {
            return;
        }
        let (sx, sy) = self.scale();
        let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for &(x, y) in points {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        for py in Self::span(y0, y1, sy, self.height) {
            for px in Self::span(x0, x1, sx, self.width) {
                let (vx, vy) = self.to_view(px, py);
                if contains(points, vx, vy) {
                    self.blend(px, py, paint.color_at(vx, vy));
                }
            }
        }
    }

    fn fill_gradient(&mut self, gradient: &Gradient) {
        for py in 0..self.height {
            for px in 0..self.width {
                let (vx, vy) = self.to_view(px, py);
                self.blend(px, py, gradient.color_at(vx, vy));
            }
        }
    }
}

/// Even-odd point in polygon test.
fn contains(points: &[(f64, f64)], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for (i, &(xi, yi)) in points.iter().enumerate() {
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn canvas() -> Canvas {
        let mut c = Canvas::new(40, 20, ColorMode::TrueColor);
        c.resize(400.0, 400.0);
        c
    }

    #[test]
    fn test_viewport_maps_onto_grid() {
        let c = canvas();
        assert_eq!((c.width, c.height), (40, 40));
        assert_eq!(c.term_size(), (40, 20));
        let (x, y) = c.to_view(0, 0);
        assert!((x - 5.0).abs() < 1e-9 && (y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_compositing_over_black() {
        let mut c = canvas();
        c.fill_rect(0.0, 0.0, 400.0, 400.0, Rgb::WHITE.with_alpha(0.5));
        assert!((c.brightness(3, 3) - 0.5).abs() < 1e-9);
        c.fill_rect(0.0, 0.0, 400.0, 400.0, Rgb::WHITE.with_alpha(0.5));
        assert!((c.brightness(3, 3) - 0.75).abs() < 1e-9);
        c.clear();
        assert_eq!(c.brightness(3, 3), 0.0);
    }

    #[test]
    fn test_circle_covers_center_only() {
        let mut c = canvas();
        c.fill_circle(200.0, 200.0, 30.0, Rgb::WHITE.with_alpha(1.0));
        assert_eq!(c.brightness(20, 20), 1.0);
        assert_eq!(c.brightness(0, 0), 0.0);
    }

    #[test]
    fn test_tiny_circle_still_shows() {
        let mut c = canvas();
        c.fill_circle(101.0, 101.0, 1.0, Rgb::WHITE.with_alpha(1.0));
        let b = c.brightness(10, 10);
        assert!(b > 0.0 && b < 1.0);
    }

    #[test]
    fn test_polygon_and_offscreen_draws() {
        let mut c = canvas();
        let tri = [(0.0, 0.0), (400.0, 0.0), (0.0, 400.0)];
        c.fill_polygon(&tri, &Paint::Solid(Rgb::WHITE.with_alpha(1.0)));
        assert_eq!(c.brightness(1, 1), 1.0);
        assert_eq!(c.brightness(39, 39), 0.0);
        // Off-screen geometry is clipped, not a panic
        c.fill_circle(-500.0, -500.0, 10.0, Rgb::WHITE.with_alpha(1.0));
        c.line(-10.0, -10.0, 1000.0, 1000.0, 1.0, Rgb::WHITE.with_alpha(1.0));
        c.fill_rect(390.0, 390.0, 100.0, 100.0, Rgb::WHITE.with_alpha(1.0));
    }

    #[test]
    fn test_color_mode_cycle() {
        let mut mode = ColorMode::Mono;
        for _ in 0..4 {
            mode = mode.next();
        }
        assert_eq!(mode, ColorMode::Mono);
    }
}
