use crate::color::Rgb;
use crate::effect::{EffectParams, EffectType};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Detect the media type from a data URI's declared MIME prefix.
    pub fn detect(url: &str) -> Option<MediaKind> {
        let mime = url.strip_prefix("data:")?;
        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// A ready-to-render custom media layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaLayer {
    pub kind: MediaKind,
    pub url: String,
    /// Degrees passed to `hue-rotate()`.
    pub hue: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl MediaLayer {
    /// Build the layer for a `custom` effect. Anything unusable yields `None`.
    pub fn from_params(params: &EffectParams) -> Option<MediaLayer> {
        if params.effect != EffectType::Custom {
            return None;
        }
        let url = params.media_url.as_deref()?;
        let Some(kind) = MediaKind::detect(url) else {
            log::info!("custom media has no image/video data URI, rendering nothing");
            return None;
        };
        Some(MediaLayer {
            kind,
            url: url.to_owned(),
            hue: hue_of(params.color),
            scale: params.size,
            opacity: params.opacity,
        })
    }

    fn style(&self) -> String {
        format!(
            "position:fixed;inset:0;z-index:-1;pointer-events:none;\
             transform:scale({});filter:hue-rotate({:.0}deg);opacity:{}",
            self.scale, self.hue, self.opacity
        )
    }

    pub fn html(&self) -> String {
        match self.kind {
            MediaKind::Image => format!(
                r#"<div class="fx-media" aria-hidden="true" style="{};background-image:url(&quot;{}&quot;);background-size:cover;background-position:center"></div>"#,
                self.style(),
                escape_attr(&css_url(&self.url))
            ),
            MediaKind::Video => format!(
                r#"<video class="fx-media" aria-hidden="true" src="{}" autoplay loop muted playsinline style="{};object-fit:cover;width:100%;height:100%"></video>"#,
                escape_attr(&self.url),
                self.style()
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn hue_of(color: Rgb) -> f64 {
    color.hue().round()
}

/// Percent-encode what could end a CSS `url("...")` token early.
fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '"' | '\'' | '(' | ')' | '\\' | '\n' | '\r' | ' ' => {
                out.push_str(&format!("%{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectConfig;

    #[test]
    fn test_detect_by_mime_prefix() {
        assert_eq!(
            MediaKind::detect("data:image/png;base64,AAAA"),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::detect("data:video/mp4;base64,AAAA"),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::detect("data:audio/ogg;base64,AAAA"), None);
        assert_eq!(MediaKind::detect("https://example.com/cat.png"), None);
        assert_eq!(MediaKind::detect(""), None);
    }

    #[test]
    fn test_layer_uses_hue_scale_and_opacity() {
        let params = EffectConfig::new(EffectType::Custom)
            .with_color("#00ff00")
            .with_size(1.5)
            .with_opacity(0.4)
            .with_media("data:image/gif;base64,R0lG")
            .normalized();
        let layer = MediaLayer::from_params(&params).unwrap();
        assert_eq!(layer.kind, MediaKind::Image);
        assert_eq!(layer.hue, 120.0);
        let html = layer.html();
        assert!(html.contains("transform:scale(1.5)"));
        assert!(html.contains("filter:hue-rotate(120deg)"));
        assert!(html.contains("opacity:0.4"));
        assert!(html.contains("z-index:-1;pointer-events:none"));
    }

    #[test]
    fn test_quotes_cannot_break_out_of_the_css_url() {
        let params = EffectConfig::new(EffectType::Custom)
            .with_media("data:image/svg+xml,<svg onload='x'>a\")b</svg>")
            .normalized();
        let html = MediaLayer::from_params(&params).unwrap().html();
        let start = html.find("url(&quot;").unwrap() + "url(&quot;".len();
        let end = start + html[start..].find("&quot;)").unwrap();
        let inner = &html[start..end];
        assert!(inner.contains("%27x%27") && inner.contains("%22%29b"));
        assert!(!inner.contains(['\'', '"', '(', ')']));
        assert!(inner.contains("&lt;svg"));
    }

    #[test]
    fn test_video_markup() {
        let params = EffectConfig::new(EffectType::Custom)
            .with_media("data:video/webm;base64,GkXf")
            .normalized();
        let html = MediaLayer::from_params(&params).unwrap().html();
        assert!(html.starts_with("<video"));
        assert!(html.contains("autoplay loop muted playsinline"));
    }

    #[test]
    fn test_unusable_media_renders_nothing() {
        let none = EffectConfig::new(EffectType::Custom).normalized();
        assert!(MediaLayer::from_params(&none).is_none());
        let text = EffectConfig::new(EffectType::Custom)
            .with_media("data:text/plain,hi")
            .normalized();
        assert!(MediaLayer::from_params(&text).is_none());
        let wrong = EffectConfig::new(EffectType::Stars)
            .with_media("data:image/png;base64,AA")
            .normalized();
        assert!(MediaLayer::from_params(&wrong).is_none());
    }
}
