use super::canvas::{Canvas, ColorMode};
use crossterm::style::Color;

/// Pixels dimmer than this count as background.
const DARK_THRESHOLD: f64 = 0.02;

#[derive(Clone, Copy)]
enum Plane {
    Fg,
    Bg,
}

/// SGR parameters selecting `color` for one plane.
fn sgr(color: Color, plane: Plane) -> String {
    let (extended, base, bright) = match plane {
        Plane::Fg => (38, 30, 90),
        Plane::Bg => (48, 40, 100),
    };
    let basic = |n: u8| (base + n).to_string();
    let vivid = |n: u8| (bright + n).to_string();
    match color {
        Color::Rgb { r, g, b } => format!("{extended};2;{r};{g};{b}"),
        Color::AnsiValue(v) => format!("{extended};5;{v}"),
        Color::Black => basic(0),
        Color::DarkRed => basic(1),
        Color::DarkGreen => basic(2),
        Color::DarkYellow => basic(3),
        Color::DarkBlue => basic(4),
        Color::DarkMagenta => basic(5),
        Color::DarkCyan => basic(6),
        Color::Grey => basic(7),
        Color::DarkGrey => vivid(0),
        Color::Red => vivid(1),
        Color::Green => vivid(2),
        Color::Yellow => vivid(3),
        Color::Blue => vivid(4),
        Color::Magenta => vivid(5),
        Color::Cyan => vivid(6),
        Color::White => vivid(7),
        _ => basic(7),
    }
}

fn to_u8(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Current terminal attributes, so unchanged colors are not re-sent.
#[derive(Default)]
struct Pen {
    fg: Option<String>,
    bg: Option<String>,
}

impl Pen {
    fn set(&mut self, out: &mut String, fg: String, bg: String) {
        let mut params = Vec::with_capacity(2);
        if self.fg.as_ref() != Some(&fg) {
            params.push(fg.clone());
            self.fg = Some(fg);
        }
        if self.bg.as_ref() != Some(&bg) {
            params.push(bg.clone());
            self.bg = Some(bg);
        }
        if !params.is_empty() {
            out.push_str("\x1b[");
            out.push_str(&params.join(";"));
            out.push('m');
        }
    }

    fn reset(&mut self, out: &mut String) {
        if self.fg.is_some() || self.bg.is_some() {
            out.push_str("\x1b[0m");
            *self = Pen::default();
        }
    }
}

/// Render the canvas as rows of `▀`: top pixel in the foreground color,
/// bottom pixel in the background color.
pub fn render(canvas: &Canvas) -> String {
    let (term_cols, term_rows) = canvas.term_size();
    let mut out = String::with_capacity(term_cols * term_rows * 10);
    let mut pen = Pen::default();
    let lit = |x: usize, y: usize| canvas.brightness(x, y) >= DARK_THRESHOLD;
    let color = |x: usize, y: usize| {
        let [r, g, b] = canvas.pixels[y * canvas.width + x].map(to_u8);
        canvas.map_color(r, g, b)
    };

    for row in 0..term_rows {
        let (top, bottom) = (row * 2, row * 2 + 1);
        for col in 0..term_cols {
            let (upper, lower) = (lit(col, top), lit(col, bottom));
            if canvas.color_mode == ColorMode::Mono {
                out.push(match (upper, lower) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
            } else if !upper && !lower {
                pen.reset(&mut out);
                out.push(' ');
            } else {
                let fg = sgr(color(col, top), Plane::Fg);
                let bg = sgr(color(col, bottom), Plane::Bg);
                pen.set(&mut out, fg, bg);
                out.push('▀');
            }
        }
        pen.reset(&mut out);
        out.push_str(&format!("\x1b[{};1H", row + 2));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::surface::Surface;

    #[test]
    fn test_mono_uses_block_shapes() {
        let mut c = Canvas::new(2, 1, ColorMode::Mono);
        c.resize(2.0, 2.0);
        // Left column: top pixel only. Right column: both.
        c.fill_rect(0.0, 0.0, 1.0, 1.0, Rgb::WHITE.with_alpha(1.0));
        c.fill_rect(1.0, 0.0, 1.0, 2.0, Rgb::WHITE.with_alpha(1.0));
        let out = render(&c);
        assert!(out.starts_with("▀█"));
    }

    #[test]
    fn test_true_color_sets_fg_and_bg() {
        let mut c = Canvas::new(1, 1, ColorMode::TrueColor);
        c.resize(1.0, 2.0);
        c.fill_rect(0.0, 0.0, 1.0, 1.0, Rgb::new(255, 0, 0).with_alpha(1.0));
        c.fill_rect(0.0, 1.0, 1.0, 1.0, Rgb::new(0, 0, 255).with_alpha(1.0));
        let out = render(&c);
        assert!(out.starts_with("\x1b[38;2;255;0;0;48;2;0;0;255m▀\x1b[0m"));
    }

    #[test]
    fn test_sgr_planes() {
        assert_eq!(sgr(Color::Red, Plane::Fg), "91");
        assert_eq!(sgr(Color::Red, Plane::Bg), "101");
        assert_eq!(sgr(Color::DarkCyan, Plane::Bg), "46");
        assert_eq!(sgr(Color::AnsiValue(200), Plane::Bg), "48;5;200");
    }

    #[test]
    fn test_unchanged_colors_are_not_resent() {
        let mut c = Canvas::new(2, 1, ColorMode::TrueColor);
        c.resize(2.0, 2.0);
        c.fill_rect(0.0, 0.0, 2.0, 2.0, Rgb::new(0, 255, 0).with_alpha(1.0));
        let out = render(&c);
        assert_eq!(out.matches("38;2;0;255;0").count(), 1);
        assert!(out.contains("▀▀"));
    }

    #[test]
    fn test_empty_canvas_is_blank() {
        let c = Canvas::new(3, 2, ColorMode::TrueColor);
        let out = render(&c);
        assert!(out.starts_with("   \x1b[2;1H   \x1b[3;1H"));
    }
}
