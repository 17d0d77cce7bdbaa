use crate::color::{Rgb, Rgba};
use crate::effect::{EffectParams, EffectType};
use serde::Serialize;
use std::fmt::Write;

/// Named keyframe animations shared by all generated elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Animation {
    Twinkle,
    Shoot,
    Fall,
    Drift,
    Orbit,
    Sway,
    Flicker,
    Rise,
    Burst,
    Float,
    Glow,
    Spin,
    Hue,
    Breathe,
    Roll,
}

impl Animation {
    pub const ALL: &[Animation] = &[
        Animation::Twinkle,
        Animation::Shoot,
        Animation::Fall,
        Animation::Drift,
        Animation::Orbit,
        Animation::Sway,
        Animation::Flicker,
        Animation::Rise,
        Animation::Burst,
        Animation::Float,
        Animation::Glow,
        Animation::Spin,
        Animation::Hue,
        Animation::Breathe,
        Animation::Roll,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Animation::Twinkle => "twinkle",
            Animation::Shoot => "shoot",
            Animation::Fall => "fall",
            Animation::Drift => "drift",
            Animation::Orbit => "orbit",
            Animation::Sway => "sway",
            Animation::Flicker => "flicker",
            Animation::Rise => "rise",
            Animation::Burst => "burst",
            Animation::Float => "float",
            Animation::Glow => "glow",
            Animation::Spin => "spin",
            Animation::Hue => "hue",
            Animation::Breathe => "breathe",
            Animation::Roll => "roll",
        }
    }

    /// Keyframe body. Reads custom properties set on the element.
    fn keyframes(self) -> &'static str {
        match self {
            Animation::Twinkle => {
                "0%,100%{opacity:.2;transform:scale(.8)}50%{opacity:1;transform:scale(1)}"
            }
            Animation::Shoot => {
                "0%{transform:rotate(var(--angle)) translateX(0);opacity:1}\
                 70%{opacity:1}\
                 100%{transform:rotate(var(--angle)) translateX(var(--travel));opacity:0}"
            }
            Animation::Fall => "from{transform:translateY(-20vh)}to{transform:translateY(120vh)}",
            Animation::Drift => {
                "0%,100%{transform:translate(0,0) scale(1)}\
                 50%{transform:translate(var(--dx),var(--dy)) scale(1.15)}"
            }
            Animation::Orbit => {
                "from{transform:rotate(0deg) translateX(var(--orbit)) rotate(0deg)}\
                 to{transform:rotate(360deg) translateX(var(--orbit)) rotate(-360deg)}"
            }
            Animation::Sway => "0%,100%{transform:translateX(0)}50%{transform:translateX(-25%)}",
            Animation::Flicker => {
                "0%,100%{transform:scaleY(1) rotate(0deg);opacity:.9}\
                 50%{transform:scaleY(1.25) rotate(var(--sway));opacity:.6}"
            }
            Animation::Rise => {
                "0%{transform:translate(0,0) scale(.6);opacity:0}20%{opacity:1}\
                 100%{transform:translate(var(--dx),-60vh) scale(1.6);opacity:0}"
            }
            Animation::Burst => {
                "0%{transform:translate(0,0);opacity:1}\
                 100%{transform:translate(var(--dx),var(--dy));opacity:0}"
            }
            Animation::Float => {
                "0%{transform:translate(0,0) scale(.9);opacity:0}10%,90%{opacity:1}\
                 100%{transform:translate(var(--dx),var(--dy)) scale(1.1);opacity:0}"
            }
            Animation::Glow => {
                "0%,100%{opacity:.7;filter:hue-rotate(0deg)}50%{opacity:1;filter:hue-rotate(40deg)}"
            }
            Animation::Spin => "to{transform:rotate(360deg)}",
            Animation::Hue => "to{filter:hue-rotate(360deg)}",
            Animation::Breathe => "0%,100%{transform:scale(1)}50%{transform:scale(1.15)}",
            Animation::Roll => "from{background-position:0 0}to{background-position:0 100vh}",
        }
    }

    /// Iteration and fill for the `animation` shorthand.
    pub fn iteration(self) -> &'static str {
        match self {
            Animation::Float => "1 forwards",
            _ => "infinite",
        }
    }

    pub fn timing(self) -> &'static str {
        match self {
            Animation::Fall | Animation::Spin | Animation::Hue | Animation::Roll => "linear",
            Animation::Shoot | Animation::Burst => "ease-out",
            _ => "ease-in-out",
        }
    }
}

/// Layer root plus one keyframes rule per animation.
pub fn stylesheet() -> String {
    let mut css = String::from(
        ".fx-layer{position:fixed;inset:0;z-index:-1;pointer-events:none;overflow:hidden}\
         .fx{position:absolute;border-radius:50%;will-change:transform,opacity}\
         .fx-backdrop{position:absolute;inset:-50%}\
         .fx-binary,.fx-emoji{border-radius:0;font-family:monospace;line-height:1}\
         .fx-binary{writing-mode:vertical-rl}\
         .fx-shootingstar{border-radius:2px;box-shadow:-30px 0 12px 1px var(--tail)}\
         .fx-wave{border-radius:45%}\
         .fx-flame{border-radius:50% 50% 20% 20%;filter:blur(2px)}\
         .fx-puff,.fx-nebula{filter:blur(24px)}\
         .fx-soapbubble{background:transparent!important;border:1px solid var(--rim);\
         box-shadow:inset -6px -6px 12px var(--rim)}",
    );
    for anim in Animation::ALL {
        let _ = write!(css, "@keyframes fx-{}{{{}}}", anim.name(), anim.keyframes());
    }
    css
}

/// How a backdrop gradient is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum BackdropShape {
    Linear { angle: f64 },
    Radial,
    Conic,
    /// Repeating horizontal lines every `gap` px.
    Scanlines { gap: f64 },
}

/// A full-layer CSS gradient, optionally rotated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backdrop {
    pub shape: BackdropShape,
    pub background: String,
    pub animation: Animation,
    pub duration: f64,
    /// Extra rotation in degrees on top of the animation.
    pub rotation: f64,
    #[serde(skip)]
    pub stops: Vec<(f64, Rgba)>,
}

impl Backdrop {
    pub fn new(
        shape: BackdropShape,
        stops: Vec<(f64, Rgba)>,
        animation: Animation,
        duration: f64,
    ) -> Self {
        let background = gradient_css(shape, &stops);
        Backdrop {
            shape,
            background,
            animation,
            duration,
            rotation: 0.0,
            stops,
        }
    }

    pub fn max_alpha(&self) -> f64 {
        self.stops.iter().map(|(_, c)| c.a).fold(0.0, f64::max)
    }

    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="fx-backdrop" style="background:{};animation:fx-{} {:.2}s {} {};transform:rotate({:.1}deg)"></div>"#,
            self.background,
            self.animation.name(),
            self.duration,
            self.animation.timing(),
            self.animation.iteration(),
            self.rotation,
        )
    }
}

fn gradient_css(shape: BackdropShape, stops: &[(f64, Rgba)]) -> String {
    let list = stops
        .iter()
        .map(|(offset, c)| format!("{c} {:.1}%", offset * 100.0))
        .collect::<Vec<_>>()
        .join(",");
    match shape {
        BackdropShape::Linear { angle } => format!("linear-gradient({angle:.1}deg,{list})"),
        BackdropShape::Radial => format!("radial-gradient(circle at center,{list})"),
        BackdropShape::Conic => format!("conic-gradient(from 0deg,{list})"),
        BackdropShape::Scanlines { gap } => {
            let line = stops.first().map(|(_, c)| *c).unwrap_or(Rgba::TRANSPARENT);
            format!(
                "repeating-linear-gradient(0deg,{line} 0px,{line} 1px,transparent 1px,transparent {gap:.0}px)"
            )
        }
    }
}

/// The gradient layer for pure-CSS effects, `None` for everything else.
pub fn backdrop(params: &EffectParams) -> Option<Backdrop> {
    let base = params.color;
    let a = |local: f64| params.opacity * local;
    let clear = base.with_alpha(0.0);
    let backdrop = match params.effect {
        EffectType::AuroraGlow => Backdrop::new(
            BackdropShape::Linear { angle: 180.0 },
            vec![
                (0.0, clear),
                (0.3, base.with_alpha(a(0.6))),
                (0.6, base.rotate_hue(0.15).with_alpha(a(0.4))),
                (1.0, clear),
            ],
            Animation::Glow,
            8.0 / params.speed,
        ),
        EffectType::Kaleidoscope => {
            let mut stops: Vec<(f64, Rgba)> = (0..6)
                .map(|k| {
                    let c = base.rotate_hue(k as f64 / 6.0);
                    (k as f64 / 6.0, c.with_alpha(a(0.5)))
                })
                .collect();
            stops.push((1.0, base.with_alpha(a(0.5))));
            Backdrop::new(BackdropShape::Conic, stops, Animation::Spin, 20.0 / params.speed)
        }
        EffectType::Spectrum => {
            let stops = (0..7)
                .map(|k| {
                    let c = base.at_hue(k as f64 * 360.0 / 7.0);
                    (k as f64 / 6.0, c.with_alpha(a(0.35)))
                })
                .collect();
            Backdrop::new(
                BackdropShape::Linear { angle: 135.0 },
                stops,
                Animation::Hue,
                10.0 / params.speed,
            )
        }
        EffectType::Spotlight => {
            let shade = base.lerp(Rgb::BLACK, 0.6);
            Backdrop::new(
                BackdropShape::Radial,
                vec![(0.3, shade.with_alpha(0.0)), (1.0, shade.with_alpha(a(0.85)))],
                Animation::Breathe,
                6.0 / params.speed,
            )
        }
        EffectType::Retro => Backdrop::new(
            BackdropShape::Scanlines {
                gap: (4.0 * params.size).max(2.0),
            },
            vec![(0.0, base.with_alpha(a(0.25))), (1.0, clear)],
            Animation::Roll,
            8.0 / params.speed,
        ),
        _ => return None,
    };
    Some(backdrop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectConfig;

    #[test]
    fn test_stylesheet_defines_each_keyframe_once() {
        let css = stylesheet();
        for anim in Animation::ALL {
            let rule = format!("@keyframes fx-{}{{", anim.name());
            assert_eq!(css.matches(&rule).count(), 1, "{}", anim.name());
        }
        assert!(css.contains("z-index:-1"));
        assert!(css.contains("pointer-events:none"));
    }

    #[test]
    fn test_backdrops_only_for_gradient_effects() {
        for &effect in EffectType::ALL {
            let params = EffectConfig::new(effect).normalized();
            let expected = matches!(
                effect,
                EffectType::AuroraGlow
                    | EffectType::Kaleidoscope
                    | EffectType::Spectrum
                    | EffectType::Spotlight
                    | EffectType::Retro
            );
            assert_eq!(backdrop(&params).is_some(), expected, "{effect}");
        }
    }

    #[test]
    fn test_backdrop_respects_opacity_and_speed() {
        let params = EffectConfig::new(EffectType::Kaleidoscope)
            .with_opacity(0.4)
            .with_speed(2.0)
            .normalized();
        let b = backdrop(&params).unwrap();
        assert!(b.max_alpha() <= 0.4);
        assert_eq!(b.duration, 10.0);
        assert!(b.background.starts_with("conic-gradient("));
    }

    #[test]
    fn test_scanlines_css() {
        let params = EffectConfig::new(EffectType::Retro)
            .with_color("#ff0000")
            .with_opacity(1.0)
            .normalized();
        let b = backdrop(&params).unwrap();
        assert_eq!(
            b.background,
            "repeating-linear-gradient(0deg,rgba(255,0,0,0.25) 0px,rgba(255,0,0,0.25) 1px,transparent 1px,transparent 4px)"
        );
    }
}
