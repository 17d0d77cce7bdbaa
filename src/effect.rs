use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_COLOR: &str = "#ffffff";
pub const DEFAULT_OPACITY: f64 = 0.7;
pub const DEFAULT_SPEED: f64 = 1.0;
pub const DEFAULT_SIZE: f64 = 1.0;

/// Which rendering strategy drives an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Renders nothing.
    Off,
    /// Continuous per-frame simulation on a drawing surface.
    Canvas,
    /// Declaratively animated elements and CSS gradient layers.
    Dom,
    /// Static custom image or video background.
    Media,
}

macro_rules! effect_types {
    ($( $variant:ident => $id:literal, $engine:ident, $desc:literal; )*) => {
        /// Every selectable background effect.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum EffectType {
            #[default]
            $( $variant, )*
        }

        impl EffectType {
            /// All effect types in menu order.
            pub const ALL: &[EffectType] = &[$( EffectType::$variant, )*];

            /// Identifier used in page-style state.
            pub fn id(self) -> &'static str {
                match self {
                    $( EffectType::$variant => $id, )*
                }
            }

            pub fn engine(self) -> Engine {
                match self {
                    $( EffectType::$variant => Engine::$engine, )*
                }
            }

            pub fn description(self) -> &'static str {
                match self {
                    $( EffectType::$variant => $desc, )*
                }
            }

            /// Look up an identifier. Unknown ids yield `None`.
            pub fn from_id(id: &str) -> Option<EffectType> {
                match id.trim().to_ascii_lowercase().as_str() {
                    $( $id => Some(EffectType::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

effect_types! {
    None => "none", Off, "No background effect";
    Bubbles => "bubbles", Canvas, "Translucent bubbles rising from the bottom";
    Fire => "fire", Canvas, "Flickering flame particles along the bottom edge";
    Smoke => "smoke", Canvas, "Soft smoke drifting upward with turbulence";
    Fireworks => "fireworks", Canvas, "Firework bursts falling under gravity";
    RainLightning => "rainlightning", Canvas, "Heavy rain with occasional lightning strikes";
    Galaxy => "galaxy", Canvas, "Spiral galaxy of orbiting stars";
    Ocean => "ocean", Canvas, "Layered ocean waves rolling across the bottom";
    NightSky => "nightsky", Canvas, "Twinkling night sky with the odd shooting star";
    Aurora => "aurora", Canvas, "Aurora curtains swaying across the sky";
    Prism => "prism", Canvas, "Rotating rainbow light through a prism";
    LightLeak => "lightleak", Canvas, "Warm film light leaks drifting over the frame";
    Vignette => "vignette", Canvas, "Breathing vignette around the edges";
    Glitch => "glitch", Canvas, "Digital glitch slices and scanlines";
    Vhs => "vhs", Canvas, "VHS tape noise and tracking bands";
    FairyDust => "fairydust", Canvas, "Glittering fairy dust trails";
    Stars => "stars", Dom, "Twinkling star field";
    ShootingStars => "shootingstars", Dom, "Shooting stars with comet tails";
    Rain => "rain", Dom, "Falling rain streaks";
    Nebula => "nebula", Dom, "Slowly pulsing nebula clouds";
    Planets => "planets", Dom, "Floating planets over a starry backdrop";
    Binary => "binary", Dom, "Binary code raining down";
    EmojiRain => "emojirain", Dom, "Emoji falling from the top";
    Sparkles => "sparkles", Dom, "Fairy dust sparkles popping in and out";
    Waves => "waves", Dom, "Ocean wave bands sliding sideways";
    Flames => "flames", Dom, "Flickering flame blades";
    Mist => "mist", Dom, "Rising smoke puffs";
    SparkBurst => "sparkburst", Dom, "Firework sparks bursting outward";
    SoapBubbles => "soapbubbles", Dom, "Soap bubbles drifting across the page";
    AuroraGlow => "auroraglow", Dom, "Rotating aurora gradient glow";
    Kaleidoscope => "kaleidoscope", Dom, "Spinning kaleidoscope gradient";
    Spectrum => "spectrum", Dom, "Shifting prism spectrum gradient";
    Spotlight => "spotlight", Dom, "Pulsing vignette spotlight";
    Retro => "retro", Dom, "Retro VHS scanline overlay";
    Custom => "custom", Media, "Your own image or video";
}

impl From<String> for EffectType {
    fn from(id: String) -> Self {
        EffectType::from_id(&id).unwrap_or(EffectType::None)
    }
}

impl From<EffectType> for String {
    fn from(effect: EffectType) -> Self {
        effect.id().to_string()
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Effect settings as held in the page-style state of the hosting page.
///
/// Numeric fields are optional; absent values take the documented defaults
/// when the config is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectConfig {
    pub effect_type: EffectType,
    pub color: String,
    pub opacity: Option<f64>,
    pub speed: Option<f64>,
    pub size: Option<f64>,
    pub custom_media_url: Option<String>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            effect_type: EffectType::None,
            color: DEFAULT_COLOR.to_string(),
            opacity: None,
            speed: None,
            size: None,
            custom_media_url: None,
        }
    }
}

impl EffectConfig {
    pub fn new(effect_type: EffectType) -> Self {
        EffectConfig {
            effect_type,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_media(mut self, url: impl Into<String>) -> Self {
        self.custom_media_url = Some(url.into());
        self
    }

    /// Overlay the fields present in a partial update.
    pub fn merge(&mut self, update: EffectUpdate) {
        if let Some(v) = update.effect_type {
            self.effect_type = v;
        }
        if let Some(v) = update.color {
            self.color = v;
        }
        if update.opacity.is_some() {
            self.opacity = update.opacity;
        }
        if update.speed.is_some() {
            self.speed = update.speed;
        }
        if update.size.is_some() {
            self.size = update.size;
        }
        if update.custom_media_url.is_some() {
            self.custom_media_url = update.custom_media_url;
        }
    }

    /// Resolve defaults and clamp out-of-range values. Never fails.
    pub fn normalized(&self) -> EffectParams {
        let positive = |v: Option<f64>, default: f64| match v {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => default,
        };
        let opacity = match self.opacity {
            Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
            _ => DEFAULT_OPACITY,
        };
        EffectParams {
            effect: self.effect_type,
            color: Rgb::parse_hex(&self.color),
            color_hex: self.color.clone(),
            opacity,
            speed: positive(self.speed, DEFAULT_SPEED),
            size: positive(self.size, DEFAULT_SIZE),
            media_url: self.custom_media_url.clone(),
        }
    }
}

/// A partial config update; only present fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectUpdate {
    pub effect_type: Option<EffectType>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub speed: Option<f64>,
    pub size: Option<f64>,
    pub custom_media_url: Option<String>,
}

/// Fully resolved effect parameters for one activation.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParams {
    pub effect: EffectType,
    pub color: Rgb,
    /// The color as the host supplied it, for CSS output.
    pub color_hex: String,
    pub opacity: f64,
    pub speed: f64,
    pub size: f64,
    pub media_url: Option<String>,
}

impl EffectParams {
    pub fn engine(&self) -> Engine {
        self.effect.engine()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip_through_lookup() {
        for &effect in EffectType::ALL {
            assert_eq!(EffectType::from_id(effect.id()), Some(effect));
        }
    }

    #[test]
    fn test_engine_mapping_counts() {
        let count = |engine| {
            EffectType::ALL
                .iter()
                .filter(|e| e.engine() == engine)
                .count()
        };
        assert_eq!(count(Engine::Canvas), 15);
        assert_eq!(count(Engine::Dom), 18);
        assert_eq!(count(Engine::Media), 1);
        assert_eq!(count(Engine::Off), 1);
    }

    #[test]
    fn test_unknown_id_deserializes_to_none() {
        let cfg: EffectConfig =
            serde_json::from_str(r##"{"effectType":"confetti-cannon","color":"#fff"}"##).unwrap();
        assert_eq!(cfg.effect_type, EffectType::None);
    }

    #[test]
    fn test_defaults_when_absent() {
        let cfg: EffectConfig = serde_json::from_str(r#"{"effectType":"galaxy"}"#).unwrap();
        let p = cfg.normalized();
        assert_eq!(p.effect, EffectType::Galaxy);
        assert_eq!(p.opacity, DEFAULT_OPACITY);
        assert_eq!(p.speed, DEFAULT_SPEED);
        assert_eq!(p.size, DEFAULT_SIZE);
        assert_eq!(p.color, Rgb::WHITE);
    }

    #[test]
    fn test_normalize_rejects_bad_numbers() {
        let cfg = EffectConfig::new(EffectType::Fire)
            .with_opacity(3.0)
            .with_speed(-2.0)
            .with_size(f64::NAN);
        let p = cfg.normalized();
        assert_eq!(p.opacity, 1.0);
        assert_eq!(p.speed, DEFAULT_SPEED);
        assert_eq!(p.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_camel_case_wire_form() {
        let cfg = EffectConfig::new(EffectType::Custom).with_media("data:image/png;base64,AA");
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains(r#""effectType":"custom""#));
        assert!(json.contains(r#""customMediaUrl":"data:image/png;base64,AA""#));
    }

    #[test]
    fn test_merge_partial_update() {
        let mut cfg = EffectConfig::new(EffectType::Bubbles).with_speed(2.0);
        let update: EffectUpdate = serde_json::from_str(r##"{"color":"#f00"}"##).unwrap();
        cfg.merge(update);
        assert_eq!(cfg.effect_type, EffectType::Bubbles);
        assert_eq!(cfg.color, "#f00");
        assert_eq!(cfg.speed, Some(2.0));
    }
}
