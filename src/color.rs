use std::fmt;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`. Anything else (wrong length, missing `#`,
    /// non-hex digits) comes back as black instead of an error.
    pub fn parse_hex(hex: &str) -> Self {
        let Some(digits) = hex.strip_prefix('#') else {
            return Rgb::BLACK;
        };
        let nibble = |c: u8| (c as char).to_digit(16).map(|d| d as u8);
        let bytes = digits.as_bytes();
        let parsed = match bytes.len() {
            3 => bytes
                .iter()
                .map(|&c| nibble(c).map(|d| d * 17))
                .collect::<Option<Vec<u8>>>(),
            6 => bytes
                .chunks(2)
                .map(|pair| Some(nibble(pair[0])? * 16 + nibble(pair[1])?))
                .collect::<Option<Vec<u8>>>(),
            _ => None,
        };
        match parsed.as_deref() {
            Some(&[r, g, b]) => Rgb::new(r, g, b),
            _ => Rgb::BLACK,
        }
    }

    #[inline]
    pub fn with_alpha(self, a: f64) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Linear blend toward `other` (t = 0 keeps self, t = 1 gives other).
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Hue in degrees (0..360). Greys report 0.
    pub fn hue(self) -> f64 {
        let (h, _, _) = to_hsv(self);
        h
    }

    /// Rotate the hue by `shift` turns (0.5 = 180°).
    pub fn rotate_hue(self, shift: f64) -> Rgb {
        let (h, s, v) = to_hsv(self);
        from_hsv((h + shift * 360.0).rem_euclid(360.0), s, v)
    }

    /// Fully saturated color at the given hue, keeping this color's brightness.
    pub fn at_hue(self, hue: f64) -> Rgb {
        let (_, _, v) = to_hsv(self);
        from_hsv(hue.rem_euclid(360.0), 1.0, v.max(0.5))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// An RGB color with a floating point alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    #[inline]
    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Same color, alpha multiplied by `factor`.
    #[inline]
    pub fn fade(self, factor: f64) -> Rgba {
        Rgba {
            a: self.a * factor,
            ..self
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Convert a hex color to a CSS `rgba()` string with the given opacity.
///
/// Malformed colors fall back to black. The opacity is passed through as-is;
/// callers keep it in `[0, 1]`.
pub fn apply_opacity(hex: &str, opacity: f64) -> String {
    Rgb::parse_hex(hex).with_alpha(opacity).to_string()
}

/// A color stop in a ramp.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

/// Piecewise linear ramp between color stops, sampled by t in 0.0..=1.0.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// Stops must be sorted by t. An empty ramp samples as black.
    pub fn new(stops: Vec<ColorStop>) -> Self {
        ColorRamp { stops }
    }

    pub fn sample(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgb::BLACK;
        };
        if t <= first.t {
            return first.color;
        }
        if t >= last.t {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.t && t <= b.t {
                let span = (b.t - a.t).max(f64::EPSILON);
                return a.color.lerp(b.color, (t - a.t) / span);
            }
        }
        last.color
    }
}

fn to_hsv(rgb: Rgb) -> (f64, f64, f64) {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta < 1e-10 {
        0.0
    } else if (max - r).abs() < 1e-10 {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if (max - g).abs() < 1e-10 {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max < 1e-10 { 0.0 } else { delta / max };
    (h, s, max)
}

fn from_hsv(h: f64, s: f64, v: f64) -> Rgb {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r1, g1, b1) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    Rgb::new(
        ((r1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
        ((g1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
        ((b1 + m) * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_opacity_short_hex() {
        assert_eq!(apply_opacity("#FFF", 0.5), "rgba(255,255,255,0.5)");
    }

    #[test]
    fn test_apply_opacity_long_hex() {
        assert_eq!(apply_opacity("#000000", 1.0), "rgba(0,0,0,1)");
        assert_eq!(apply_opacity("#ff8000", 0.25), "rgba(255,128,0,0.25)");
    }

    #[test]
    fn test_apply_opacity_malformed_is_black() {
        assert_eq!(apply_opacity("bad", 0.5), "rgba(0,0,0,0.5)");
        assert_eq!(apply_opacity("#12345", 0.5), "rgba(0,0,0,0.5)");
        assert_eq!(apply_opacity("#ggg", 0.5), "rgba(0,0,0,0.5)");
        assert_eq!(apply_opacity("", 0.5), "rgba(0,0,0,0.5)");
    }

    #[test]
    fn test_apply_opacity_does_not_clamp() {
        assert_eq!(apply_opacity("#fff", 1.5), "rgba(255,255,255,1.5)");
    }

    #[test]
    fn test_hue_of_primaries() {
        assert!((Rgb::parse_hex("#ff0000").hue() - 0.0).abs() < 1e-6);
        assert!((Rgb::parse_hex("#00ff00").hue() - 120.0).abs() < 1e-6);
        assert!((Rgb::parse_hex("#0000ff").hue() - 240.0).abs() < 1e-6);
        assert_eq!(Rgb::WHITE.hue(), 0.0);
    }

    #[test]
    fn test_rotate_hue_half_turn() {
        assert_eq!(Rgb::new(255, 0, 0).rotate_hue(0.5), Rgb::new(0, 255, 255));
    }

    #[test]
    fn test_ramp_sampling() {
        let ramp = ColorRamp::new(vec![
            ColorStop {
                t: 0.0,
                color: Rgb::BLACK,
            },
            ColorStop {
                t: 1.0,
                color: Rgb::WHITE,
            },
        ]);
        assert_eq!(ramp.sample(-1.0), Rgb::BLACK);
        assert_eq!(ramp.sample(0.5), Rgb::new(128, 128, 128));
        assert_eq!(ramp.sample(2.0), Rgb::WHITE);
        assert_eq!(ColorRamp::new(Vec::new()).sample(0.5), Rgb::BLACK);
    }
}
