pub mod aurora;
pub mod bubbles;
pub mod fairydust;
pub mod fire;
pub mod fireworks;
pub mod galaxy;
pub mod glitch;
pub mod lightleak;
pub mod nightsky;
pub mod ocean;
pub mod prism;
pub mod rain;
pub mod smoke;
pub mod vhs;
pub mod vignette;

use crate::color::{Rgb, Rgba};
use crate::effect::{EffectParams, EffectType};
use crate::scheduler::{CallbackId, Scheduler};
use crate::surface::{Surface, Viewport};
use rand::RngExt;
use rand::rngs::StdRng;

/// Frame length the per-tick motion constants are tuned for (60 Hz).
pub const NOMINAL_FRAME: f64 = 1.0 / 60.0;

/// Longest frame gap simulated in one tick, in nominal frames. Larger gaps
/// (a backgrounded tab, a stalled terminal) are clamped.
const MAX_STEP: f64 = 4.0;

/// Time advanced per nominal frame at speed 1.
const TIME_STEP: f64 = 0.01;

/// Everything an effect needs to know for one tick.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
    pub opacity: f64,
    pub speed: f64,
    pub size: f64,
    /// Accumulated effect time (advances by speed).
    pub time: f64,
    /// Seconds since the previous tick, clamped.
    pub dt: f64,
}

impl Frame {
    pub fn new(params: &EffectParams, viewport: Viewport, time: f64, dt: f64) -> Self {
        Frame {
            width: viewport.width,
            height: viewport.height,
            color: params.color,
            opacity: params.opacity,
            speed: params.speed,
            size: params.size,
            time,
            dt,
        }
    }

    /// Elapsed nominal frames for this tick.
    #[inline]
    pub fn step(&self) -> f64 {
        (self.dt / NOMINAL_FRAME).clamp(0.0, MAX_STEP)
    }

    /// Motion multiplier: nominal frames scaled by the configured speed.
    #[inline]
    pub fn motion(&self) -> f64 {
        self.step() * self.speed
    }

    /// Final alpha for a local intensity. Never exceeds the config opacity.
    #[inline]
    pub fn alpha(&self, local: f64) -> f64 {
        self.opacity * local.clamp(0.0, 1.0)
    }

    /// `color` at the given local intensity.
    #[inline]
    pub fn rgba(&self, color: Rgb, local: f64) -> Rgba {
        color.with_alpha(self.alpha(local))
    }

    /// The configured tint at the given local intensity.
    #[inline]
    pub fn tint(&self, local: f64) -> Rgba {
        self.rgba(self.color, local)
    }

    /// Roll for an event that happens `rate` times per second on average,
    /// scaled by this tick's duration and the speed setting.
    pub fn roll(&self, rng: &mut StdRng, rate: f64) -> bool {
        let p = 1.0 - (-rate * self.speed * self.dt).exp();
        p > 0.0 && rng.random_range(0.0..1.0) < p
    }
}

/// One running canvas effect. Dropping it discards all of its state.
pub trait CanvasEffect {
    /// Advance the simulation and draw onto the (already cleared) surface.
    fn tick(&mut self, surface: &mut dyn Surface, frame: &Frame);

    /// Live particles in the pool. Gradient effects have none.
    fn population(&self) -> usize {
        0
    }
}

/// Registry entry for a canvas effect.
pub struct Entry {
    pub effect: EffectType,
    /// Upper bound on the particle pool.
    pub capacity: usize,
    pub create: fn(&Frame, u64) -> Box<dyn CanvasEffect>,
}

pub const REGISTRY: &[Entry] = &[
    Entry {
        effect: EffectType::Bubbles,
        capacity: bubbles::CAPACITY,
        create: bubbles::create,
    },
    Entry {
        effect: EffectType::Fire,
        capacity: fire::CAPACITY,
        create: fire::create,
    },
    Entry {
        effect: EffectType::Smoke,
        capacity: smoke::CAPACITY,
        create: smoke::create,
    },
    Entry {
        effect: EffectType::Fireworks,
        capacity: fireworks::CAPACITY,
        create: fireworks::create,
    },
    Entry {
        effect: EffectType::RainLightning,
        capacity: rain::CAPACITY,
        create: rain::create,
    },
    Entry {
        effect: EffectType::Galaxy,
        capacity: galaxy::CAPACITY,
        create: galaxy::create,
    },
    Entry {
        effect: EffectType::Ocean,
        capacity: 0,
        create: ocean::create,
    },
    Entry {
        effect: EffectType::NightSky,
        capacity: nightsky::CAPACITY,
        create: nightsky::create,
    },
    Entry {
        effect: EffectType::Aurora,
        capacity: 0,
        create: aurora::create,
    },
    Entry {
        effect: EffectType::Prism,
        capacity: 0,
        create: prism::create,
    },
    Entry {
        effect: EffectType::LightLeak,
        capacity: 0,
        create: lightleak::create,
    },
    Entry {
        effect: EffectType::Vignette,
        capacity: 0,
        create: vignette::create,
    },
    Entry {
        effect: EffectType::Glitch,
        capacity: glitch::CAPACITY,
        create: glitch::create,
    },
    Entry {
        effect: EffectType::Vhs,
        capacity: vhs::CAPACITY,
        create: vhs::create,
    },
    Entry {
        effect: EffectType::FairyDust,
        capacity: fairydust::CAPACITY,
        create: fairydust::create,
    },
];

pub fn lookup(effect: EffectType) -> Option<&'static Entry> {
    REGISTRY.iter().find(|e| e.effect == effect)
}

/// An active canvas effect together with the callbacks it holds.
pub struct CanvasRun {
    effect: Box<dyn CanvasEffect>,
    entry: &'static Entry,
    params: EffectParams,
    frame_request: CallbackId,
    resize_listener: CallbackId,
    time: f64,
    ticks: u64,
}

impl CanvasRun {
    /// Acquire the surface and schedule the first frame. Returns `None` for
    /// effects this engine does not handle.
    pub fn start(
        params: &EffectParams,
        surface: &mut dyn Surface,
        viewport: Viewport,
        scheduler: &mut Scheduler,
        seed: u64,
    ) -> Option<CanvasRun> {
        let entry = lookup(params.effect)?;
        surface.resize(viewport.width, viewport.height);
        let frame = Frame::new(params, viewport, 0.0, 0.0);
        Some(CanvasRun {
            effect: (entry.create)(&frame, seed),
            entry,
            params: params.clone(),
            frame_request: scheduler.request_frame(),
            resize_listener: scheduler.add_resize_listener(),
            time: 0.0,
            ticks: 0,
        })
    }

    pub fn effect(&self) -> EffectType {
        self.entry.effect
    }

    pub fn owns_frame(&self, id: CallbackId) -> bool {
        self.frame_request == id
    }

    pub fn resize_listener(&self) -> CallbackId {
        self.resize_listener
    }

    /// Run one frame: clear, advance time, draw, request the next frame.
    pub fn tick(&mut self, surface: &mut dyn Surface, scheduler: &mut Scheduler, dt: f64) {
        let dt = dt.clamp(0.0, MAX_STEP * NOMINAL_FRAME);
        surface.clear();
        self.time += self.params.speed * TIME_STEP * (dt / NOMINAL_FRAME);
        let viewport = Viewport::new(surface.width(), surface.height());
        let frame = Frame::new(&self.params, viewport, self.time, dt);
        self.effect.tick(surface, &frame);
        self.ticks += 1;
        self.frame_request = scheduler.request_frame();
    }

    /// Follow a viewport change. Particle state is kept.
    pub fn resize(&mut self, surface: &mut dyn Surface, viewport: Viewport) {
        surface.resize(viewport.width, viewport.height);
    }

    /// Cancel the pending frame and drop the resize listener.
    pub fn stop(self, scheduler: &mut Scheduler) {
        scheduler.cancel_frame(self.frame_request);
        scheduler.remove_resize_listener(self.resize_listener);
    }

    pub fn population(&self) -> usize {
        self.effect.population()
    }

    pub fn capacity(&self) -> usize {
        self.entry.capacity
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

/// Random point on a circle of radius `r` around (cx, cy).
pub(crate) fn around(rng: &mut StdRng, cx: f64, cy: f64, r: f64) -> (f64, f64) {
    let angle = rng.random_range(0.0..std::f64::consts::TAU);
    let dist = rng.random_range(0.0..=r.max(0.0));
    (cx + angle.cos() * dist, cy + angle.sin() * dist)
}

/// Twinkle intensity in 0..=1 for a phase.
#[inline]
pub(crate) fn twinkle(phase: f64) -> f64 {
    (phase.sin() + 1.0) * 0.5
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::effect::EffectConfig;
    use crate::surface::Recorder;

    pub fn params(effect: EffectType, opacity: f64) -> EffectParams {
        EffectConfig::new(effect)
            .with_color("#66ccff")
            .with_opacity(opacity)
            .normalized()
    }

    pub fn frame(params: &EffectParams, time: f64) -> Frame {
        Frame::new(params, Viewport::default(), time, NOMINAL_FRAME)
    }

    /// Run `ticks` frames and return (max alpha seen, max population seen).
    pub fn run(effect: EffectType, opacity: f64, ticks: usize, seed: u64) -> (f64, usize) {
        let params = params(effect, opacity);
        let entry = lookup(effect).expect("registered effect");
        let mut fx = (entry.create)(&frame(&params, 0.0), seed);
        let mut surface = Recorder::new();
        surface.resize(390.0, 844.0);
        let mut max_alpha: f64 = 0.0;
        let mut max_pop = 0;
        for i in 0..ticks {
            surface.clear_calls();
            fx.tick(&mut surface, &frame(&params, i as f64 * TIME_STEP));
            max_alpha = max_alpha.max(surface.max_alpha());
            max_pop = max_pop.max(fx.population());
        }
        (max_alpha, max_pop)
    }
}
