use super::{Animation, ElementKind, GeneratedElement};
use crate::color::Rgb;
use crate::effect::{EffectParams, EffectType};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::f64::consts::TAU;

pub type GenerateFn = fn(usize, &EffectParams, &mut StdRng) -> Vec<GeneratedElement>;

/// Registry entry for an element-generating effect.
pub struct Generator {
    pub effect: EffectType,
    pub count: usize,
    pub generate: GenerateFn,
}

impl Generator {
    pub fn generate(&self, params: &EffectParams, seed: u64) -> Vec<GeneratedElement> {
        let mut rng = StdRng::seed_from_u64(seed);
        (self.generate)(self.count, params, &mut rng)
    }
}

pub const GENERATORS: &[Generator] = &[
    Generator {
        effect: EffectType::Stars,
        count: 100,
        generate: stars,
    },
    Generator {
        effect: EffectType::ShootingStars,
        count: 6,
        generate: shooting_stars,
    },
    Generator {
        effect: EffectType::Rain,
        count: 80,
        generate: rain,
    },
    Generator {
        effect: EffectType::Nebula,
        count: 5,
        generate: nebula,
    },
    Generator {
        effect: EffectType::Planets,
        count: 4,
        generate: planets,
    },
    Generator {
        effect: EffectType::Binary,
        count: 40,
        generate: binary,
    },
    Generator {
        effect: EffectType::EmojiRain,
        count: 25,
        generate: emoji_rain,
    },
    Generator {
        effect: EffectType::Sparkles,
        count: 60,
        generate: sparkles,
    },
    Generator {
        effect: EffectType::Waves,
        count: 4,
        generate: waves,
    },
    Generator {
        effect: EffectType::Flames,
        count: 30,
        generate: flames,
    },
    Generator {
        effect: EffectType::Mist,
        count: 15,
        generate: mist,
    },
    Generator {
        effect: EffectType::SparkBurst,
        count: 60,
        generate: spark_burst,
    },
];

pub fn lookup(effect: EffectType) -> Option<&'static Generator> {
    GENERATORS.iter().find(|g| g.effect == effect)
}

const EMOJI: &[&str] = &["✨", "💖", "🌸", "⭐", "🎈", "🦋", "🌈", "💫"];

fn px(v: f64) -> String {
    format!("{v:.1}px")
}

pub fn stars(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|_| {
            let d = rng.random_range(1.0..3.0) * p.size;
            GeneratedElement::new(ElementKind::Star, Animation::Twinkle)
                .at(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0))
                .sized(d, d)
                .timed(rng.random_range(2.0..5.0) / p.speed, rng.random_range(0.0..5.0))
                .tinted(p, p.color, rng.random_range(0.5..1.0))
        })
        .collect()
}

/// Streaks with a glowing tail trailing behind them.
pub fn shooting_stars(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|_| {
            let tail = p.color.lerp(Rgb::WHITE, 0.5);
            let el = GeneratedElement::new(ElementKind::ShootingStar, Animation::Shoot)
                .at(rng.random_range(0.0..100.0), rng.random_range(0.0..50.0))
                .sized(rng.random_range(80.0..150.0) * p.size, 2.0 * p.size)
                .timed(rng.random_range(1.5..3.0) / p.speed, rng.random_range(0.0..10.0))
                .tinted(p, p.color, 1.0)
                .var("--angle", format!("{:.0}deg", rng.random_range(20.0..45.0)))
                .var("--travel", "-120vw");
            let trail = crate::color::apply_opacity(&tail.to_hex(), p.opacity * 0.5);
            el.var("--tail", trail)
        })
        .collect()
}

pub fn rain(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|_| {
            GeneratedElement::new(ElementKind::RainStreak, Animation::Fall)
                .at(rng.random_range(0.0..100.0), -20.0)
                .sized(
                    rng.random_range(1.0..2.0),
                    rng.random_range(15.0..30.0) * p.size,
                )
                .timed(rng.random_range(0.5..1.2) / p.speed, rng.random_range(0.0..2.0))
                .tinted(p, p.color, rng.random_range(0.3..0.7))
        })
        .collect()
}

pub fn nebula(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|_| {
            let d = rng.random_range(200.0..400.0) * p.size;
            let color = p.color.rotate_hue(rng.random_range(-0.08..0.08));
            GeneratedElement::new(ElementKind::Nebula, Animation::Drift)
                .at(rng.random_range(-10.0..90.0), rng.random_range(-10.0..90.0))
                .sized(d, d * rng.random_range(0.6..1.0))
                .timed(rng.random_range(15.0..30.0) / p.speed, rng.random_range(0.0..5.0))
                .tinted(p, color, rng.random_range(0.15..0.35))
                .var("--dx", px(rng.random_range(-60.0..60.0)))
                .var("--dy", px(rng.random_range(-40.0..40.0)))
        })
        .collect()
}

pub fn planets(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|k| {
            let d = rng.random_range(20.0..80.0) * p.size;
            let color = p.color.rotate_hue(k as f64 * 0.2);
            GeneratedElement::new(ElementKind::Planet, Animation::Orbit)
                .at(rng.random_range(20.0..80.0), rng.random_range(20.0..80.0))
                .sized(d, d)
                .timed(rng.random_range(20.0..60.0) / p.speed, rng.random_range(0.0..5.0))
                .tinted(p, color, rng.random_range(0.6..0.9))
                .var("--orbit", px(rng.random_range(30.0..120.0) * p.size))
        })
        .collect()
}

pub fn binary(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|_| {
            let len = rng.random_range(8..20);
            let digits: String = (0..len)
                .map(|_| if rng.random_range(0..2) == 0 { '0' } else { '1' })
                .collect();
            let glyph = 14.0 * p.size;
            GeneratedElement::new(ElementKind::Binary, Animation::Fall)
                .at(rng.random_range(0.0..100.0), -20.0)
                .sized(glyph, glyph * len as f64)
                .timed(rng.random_range(3.0..8.0) / p.speed, rng.random_range(0.0..4.0))
                .tinted(p, p.color, rng.random_range(0.4..0.9))
                .text(digits)
        })
        .collect()
}

pub fn emoji_rain(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|_| {
            let d = rng.random_range(20.0..40.0) * p.size;
            let glyph = EMOJI[rng.random_range(0..EMOJI.len())];
            GeneratedElement::new(ElementKind::Emoji, Animation::Fall)
                .at(rng.random_range(0.0..100.0), -10.0)
                .sized(d, d)
                .timed(rng.random_range(4.0..9.0) / p.speed, rng.random_range(0.0..6.0))
                .tinted(p, p.color, 1.0)
                .text(glyph)
        })
        .collect()
}

/// Fairy-dust sparkles scattered over the page.
pub fn sparkles(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|_| {
            let d = rng.random_range(2.0..6.0) * p.size;
            let color = p.color.lerp(Rgb::WHITE, rng.random_range(0.0..0.6));
            GeneratedElement::new(ElementKind::Sparkle, Animation::Twinkle)
                .at(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0))
                .sized(d, d)
                .timed(rng.random_range(1.0..3.0) / p.speed, rng.random_range(0.0..3.0))
                .tinted(p, color, rng.random_range(0.6..1.0))
        })
        .collect()
}

/// Ocean bands stacked toward the bottom, back to front.
pub fn waves(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|k| {
            let depth = k as f64;
            GeneratedElement::new(ElementKind::Wave, Animation::Sway)
                .at(-50.0, 65.0 + depth * 8.0)
                .sized(1600.0, rng.random_range(60.0..120.0) * p.size)
                .timed((6.0 + depth * 2.0) / p.speed, rng.random_range(0.0..2.0))
                .tinted(p, p.color, 0.3 - depth * 0.04)
        })
        .collect()
}

pub fn flames(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    let ember = Rgb::new(255, 140, 0);
    (0..count)
        .map(|_| {
            let color = p.color.lerp(ember, rng.random_range(0.0..0.5));
            GeneratedElement::new(ElementKind::Flame, Animation::Flicker)
                .at(rng.random_range(0.0..100.0), rng.random_range(85.0..100.0))
                .sized(
                    rng.random_range(10.0..30.0) * p.size,
                    rng.random_range(40.0..90.0) * p.size,
                )
                .timed(rng.random_range(0.8..2.0) / p.speed, rng.random_range(0.0..1.0))
                .tinted(p, color, rng.random_range(0.5..0.9))
                .var("--sway", format!("{:.0}deg", rng.random_range(-8.0..8.0)))
        })
        .collect()
}

/// Smoke puffs rising from the lower half.
pub fn mist(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    (0..count)
        .map(|_| {
            let d = rng.random_range(60.0..160.0) * p.size;
            GeneratedElement::new(ElementKind::Puff, Animation::Rise)
                .at(rng.random_range(0.0..100.0), rng.random_range(60.0..100.0))
                .sized(d, d)
                .timed(rng.random_range(8.0..16.0) / p.speed, rng.random_range(0.0..8.0))
                .tinted(p, p.color, rng.random_range(0.1..0.25))
                .var("--dx", px(rng.random_range(-80.0..80.0)))
        })
        .collect()
}

/// Firework sparks split across a few burst centers.
pub fn spark_burst(count: usize, p: &EffectParams, rng: &mut StdRng) -> Vec<GeneratedElement> {
    const CENTERS: usize = 5;
    let per = count.div_ceil(CENTERS).max(1);
    let mut out = Vec::with_capacity(count);
    let mut center = (0.0, 0.0, 0.0, p.color);
    for i in 0..count {
        if i % per == 0 {
            center = (
                rng.random_range(15.0..85.0),
                rng.random_range(15.0..60.0),
                rng.random_range(0.0..3.0),
                p.color.rotate_hue(rng.random_range(0.0..1.0)),
            );
        }
        let (cx, cy, delay, color) = center;
        let angle = (i % per) as f64 / per as f64 * TAU + rng.random_range(-0.1..0.1);
        let dist = rng.random_range(60.0..140.0) * p.size;
        let d = 3.0 * p.size;
        out.push(
            GeneratedElement::new(ElementKind::Spark, Animation::Burst)
                .at(cx, cy)
                .sized(d, d)
                .timed(rng.random_range(1.2..2.2) / p.speed, delay)
                .tinted(p, color, 1.0)
                .var("--dx", px(angle.cos() * dist))
                .var("--dy", px(angle.sin() * dist)),
        );
    }
    out
}
