pub mod aurora;
pub mod bubbles;
pub mod generators;
pub mod style;

pub use style::{Animation, Backdrop};

use crate::color::{Rgb, Rgba, apply_opacity};
use crate::effect::{EffectParams, EffectType, Engine};
use crate::scheduler::{CallbackId, Scheduler};
use crate::surface::{Gradient, Surface, Viewport};
use aurora::AuroraDrift;
use bubbles::SoapBubbles;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// What a generated element depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Star,
    ShootingStar,
    RainStreak,
    Nebula,
    Planet,
    Binary,
    Emoji,
    Sparkle,
    Wave,
    Flame,
    Puff,
    Spark,
    SoapBubble,
}

impl ElementKind {
    fn class(self) -> &'static str {
        match self {
            ElementKind::Star => "star",
            ElementKind::ShootingStar => "shootingstar",
            ElementKind::RainStreak => "rain",
            ElementKind::Nebula => "nebula",
            ElementKind::Planet => "planet",
            ElementKind::Binary => "binary",
            ElementKind::Emoji => "emoji",
            ElementKind::Sparkle => "sparkle",
            ElementKind::Wave => "wave",
            ElementKind::Flame => "flame",
            ElementKind::Puff => "puff",
            ElementKind::Spark => "spark",
            ElementKind::SoapBubble => "soapbubble",
        }
    }

    /// Text elements take the color as their glyph color.
    fn is_glyph(self) -> bool {
        matches!(self, ElementKind::Binary | ElementKind::Emoji)
    }
}

/// One declaratively animated element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedElement {
    /// Unique per run, for timer-generated elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub kind: ElementKind,
    /// Percent of the viewport width.
    pub left: f64,
    /// Percent of the viewport height.
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub animation: Animation,
    /// Seconds, already divided by speed.
    pub duration: f64,
    pub delay: f64,
    /// CSS `rgba()` color.
    pub color: String,
    #[serde(skip)]
    pub tint: Rgba,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Custom properties read by the keyframes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<&'static str, String>,
    /// Clock time after which the element has finished animating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<f64>,
}

impl GeneratedElement {
    pub fn new(kind: ElementKind, animation: Animation) -> Self {
        GeneratedElement {
            id: None,
            kind,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            animation,
            duration: 1.0,
            delay: 0.0,
            color: Rgba::TRANSPARENT.to_string(),
            tint: Rgba::TRANSPARENT,
            text: None,
            vars: BTreeMap::new(),
            expires_at: None,
        }
    }

    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn timed(mut self, duration: f64, delay: f64) -> Self {
        self.duration = duration;
        self.delay = delay;
        self
    }

    /// Color the element with `color` at `opacity * local`.
    pub fn tinted(mut self, params: &EffectParams, color: Rgb, local: f64) -> Self {
        let alpha = params.opacity * local.clamp(0.0, 1.0);
        self.color = apply_opacity(&color.to_hex(), alpha);
        self.tint = color.with_alpha(alpha);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn var(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.vars.insert(name, value.into());
        self
    }

    pub fn alpha(&self) -> f64 {
        self.tint.a
    }

    pub fn to_html(&self) -> String {
        let mut style = format!(
            "left:{:.2}%;top:{:.2}%;width:{:.1}px;height:{:.1}px;",
            self.left, self.top, self.width, self.height
        );
        match self.kind {
            ElementKind::Emoji => {
                let _ = write!(style, "font-size:{:.1}px;opacity:{};", self.height, self.alpha());
            }
            k if k.is_glyph() => {
                let _ = write!(style, "font-size:{:.1}px;color:{};", self.width, self.color);
            }
            _ => {
                let _ = write!(style, "background:{};", self.color);
            }
        }
        let _ = write!(
            style,
            "animation:fx-{} {:.2}s {} {:.2}s {}",
            self.animation.name(),
            self.duration,
            self.animation.timing(),
            self.delay,
            self.animation.iteration(),
        );
        for (name, value) in &self.vars {
            let _ = write!(style, ";{name}:{value}");
        }
        let id = self
            .id
            .map(|id| format!(r#" id="fx-{id}""#))
            .unwrap_or_default();
        format!(
            r#"<div{id} class="fx fx-{}" style="{style}">{}</div>"#,
            self.kind.class(),
            self.text.as_deref().unwrap_or_default(),
        )
    }
}

/// The rendered output of a DOM effect: behind all content, click-through.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomLayer {
    pub effect: EffectType,
    pub z_index: i32,
    pub pointer_events: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<Backdrop>,
    pub elements: Vec<GeneratedElement>,
}

impl DomLayer {
    fn new(
        effect: EffectType,
        backdrop: Option<Backdrop>,
        elements: Vec<GeneratedElement>,
    ) -> Self {
        DomLayer {
            effect,
            z_index: -1,
            pointer_events: "none",
            backdrop,
            elements,
        }
    }

    pub fn html(&self) -> String {
        let mut html = format!(
            r#"<div class="fx-layer" data-effect="{}" aria-hidden="true">"#,
            self.effect
        );
        if let Some(backdrop) = &self.backdrop {
            html.push_str(&backdrop.to_html());
        }
        for el in &self.elements {
            html.push_str(&el.to_html());
        }
        html.push_str("</div>");
        html
    }

    pub fn css(&self) -> String {
        style::stylesheet()
    }

    /// Stylesheet and markup as one standalone fragment.
    pub fn document(&self) -> String {
        format!("<style>{}</style>\n{}", self.css(), self.html())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Draw a still of the layer: every element at its resting position.
    /// The surface is sized to the viewport first.
    pub fn sketch(&self, surface: &mut dyn Surface, viewport: Viewport) {
        let (w, h) = (viewport.width, viewport.height);
        if surface.width() != w || surface.height() != h {
            surface.resize(w, h);
        }
        if let Some(b) = &self.backdrop {
            surface.fill_gradient(&sketch_gradient(b, viewport));
        }
        for el in &self.elements {
            let x = el.left / 100.0 * w;
            let y = el.top / 100.0 * h;
            match el.kind {
                ElementKind::Wave => surface.fill_rect(0.0, y, w, el.height, el.tint),
                ElementKind::RainStreak | ElementKind::Binary => {
                    surface.line(x, y, x, y + el.height, el.width.max(1.0), el.tint)
                }
                ElementKind::ShootingStar => {
                    surface.line(x, y, x + el.width, y + el.width * 0.3, 1.5, el.tint)
                }
                ElementKind::SoapBubble => {
                    surface.stroke_circle(x, y, el.width / 2.0, 1.0, el.tint)
                }
                _ => surface.fill_circle(x, y, (el.width.max(el.height) / 2.0).max(0.5), el.tint),
            }
        }
    }
}

/// Surface approximation of a CSS backdrop.
fn sketch_gradient(backdrop: &Backdrop, viewport: Viewport) -> Gradient {
    let (w, h) = (viewport.width, viewport.height);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let mut gradient = match backdrop.shape {
        style::BackdropShape::Radial => Gradient::radial(cx, cy, 0.0, w.hypot(h) / 2.0),
        style::BackdropShape::Linear { angle } => {
            // CSS angles run clockwise from "to top".
            let rad = (angle + backdrop.rotation).to_radians();
            let (dx, dy) = (rad.sin() * h / 2.0, -rad.cos() * h / 2.0);
            Gradient::linear(cx - dx, cy - dy, cx + dx, cy + dy)
        }
        style::BackdropShape::Conic | style::BackdropShape::Scanlines { .. } => {
            Gradient::linear(0.0, 0.0, w, h)
        }
    };
    for &(offset, color) in &backdrop.stops {
        gradient = gradient.stop(offset, color);
    }
    gradient
}

struct Timed<T> {
    state: T,
    interval: CallbackId,
}

/// An active DOM effect together with its timers.
pub struct DomRun {
    params: EffectParams,
    elements: Vec<GeneratedElement>,
    backdrop: Option<Backdrop>,
    bubbles: Option<Timed<SoapBubbles>>,
    aurora: Option<Timed<AuroraDrift>>,
}

impl DomRun {
    /// Generate the layer and start any timers. Returns `None` for effects
    /// this engine does not handle.
    pub fn start(params: &EffectParams, scheduler: &mut Scheduler, seed: u64) -> Option<DomRun> {
        if params.engine() != Engine::Dom {
            return None;
        }
        let mut run = DomRun {
            params: params.clone(),
            elements: Vec::new(),
            backdrop: style::backdrop(params),
            bubbles: None,
            aurora: None,
        };
        match params.effect {
            EffectType::SoapBubbles => {
                let mut state = SoapBubbles::new(params, seed);
                state.spawn(scheduler.now());
                run.bubbles = Some(Timed {
                    state,
                    interval: scheduler.set_interval(bubbles::INTERVAL),
                });
            }
            EffectType::AuroraGlow => {
                run.aurora = Some(Timed {
                    state: AuroraDrift::new(),
                    interval: scheduler.set_interval(aurora::INTERVAL),
                });
            }
            effect => {
                if let Some(generator) = generators::lookup(effect) {
                    run.elements = generator.generate(params, seed);
                }
            }
        }
        Some(run)
    }

    pub fn effect(&self) -> EffectType {
        self.params.effect
    }

    pub fn owns_interval(&self, id: CallbackId) -> bool {
        self.bubbles.as_ref().is_some_and(|t| t.interval == id)
            || self.aurora.as_ref().is_some_and(|t| t.interval == id)
    }

    /// Handle an interval that came due at clock time `now`. Ids that belong
    /// to another run are ignored.
    pub fn on_interval(&mut self, id: CallbackId, now: f64) -> bool {
        if let Some(t) = self.bubbles.as_mut().filter(|t| t.interval == id) {
            t.state.on_timer(now);
            return true;
        }
        if let Some(t) = self.aurora.as_mut().filter(|t| t.interval == id) {
            t.state.advance();
            return true;
        }
        false
    }

    /// Current layer, including timer-generated elements and the drift
    /// rotation.
    pub fn layer(&self) -> DomLayer {
        let mut elements = self.elements.clone();
        if let Some(t) = &self.bubbles {
            elements.extend(t.state.elements().iter().cloned());
        }
        let mut backdrop = self.backdrop.clone();
        if let (Some(b), Some(t)) = (backdrop.as_mut(), &self.aurora) {
            b.rotation = t.state.rotation();
        }
        DomLayer::new(self.params.effect, backdrop, elements)
    }

    /// Number of live elements.
    pub fn population(&self) -> usize {
        self.elements.len() + self.bubbles.as_ref().map_or(0, |t| t.state.len())
    }

    pub fn aurora_phase(&self) -> Option<f64> {
        self.aurora.as_ref().map(|t| t.state.phase())
    }

    /// Clear every interval this run holds.
    pub fn stop(self, scheduler: &mut Scheduler) {
        if let Some(t) = self.bubbles {
            scheduler.clear_interval(t.interval);
        }
        if let Some(t) = self.aurora {
            scheduler.clear_interval(t.interval);
        }
    }
}
