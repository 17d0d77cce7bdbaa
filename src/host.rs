use crate::canvas::CanvasRun;
use crate::dom::{DomLayer, DomRun};
use crate::effect::{EffectConfig, EffectParams, EffectType, EffectUpdate, Engine};
use crate::media::MediaLayer;
use crate::scheduler::{Due, Scheduler};
use crate::surface::{Surface, Viewport};
use std::time::Duration;

/// Where the host is in its activation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Inactive,
    Activating,
    Active,
    TearingDown,
}

enum Run {
    Canvas(CanvasRun),
    Dom(DomRun),
    Media(MediaLayer),
}

/// What the host currently renders besides the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Empty,
    /// Output goes to the drawing surface.
    Canvas,
    Dom(DomLayer),
    Media(MediaLayer),
}

/// Drives one effect at a time from an [`EffectConfig`].
///
/// The host picks the engine for the effect type and owns the scheduler and
/// the (optional) drawing surface. Any config change tears the current run
/// down completely before the next one starts.
pub struct EffectHost<S: Surface> {
    config: EffectConfig,
    params: EffectParams,
    state: Lifecycle,
    run: Option<Run>,
    surface: Option<S>,
    scheduler: Scheduler,
    viewport: Viewport,
    /// Canvas activation waiting for a surface.
    deferred: bool,
    seed: u64,
    activations: u64,
}

impl<S: Surface> EffectHost<S> {
    pub fn new(viewport: Viewport) -> Self {
        let config = EffectConfig::default();
        EffectHost {
            params: config.normalized(),
            config,
            state: Lifecycle::Inactive,
            run: None,
            surface: None,
            scheduler: Scheduler::new(),
            viewport,
            deferred: false,
            seed: 0x5eed,
            activations: 0,
        }
    }

    /// Base seed for effect rngs. Each activation derives its own.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Apply a config. Returns true when the effect was (re)started.
    ///
    /// Changing any field restarts the effect. An identical config leaves a
    /// running effect alone, but starts one that was unmounted.
    pub fn configure(&mut self, config: EffectConfig) -> bool {
        if config == self.config {
            if self.run.is_none() && !self.deferred && self.params.engine() != Engine::Off {
                self.activate();
                return self.run.is_some();
            }
            return false;
        }
        self.teardown();
        self.params = config.normalized();
        self.config = config;
        self.activate();
        true
    }

    /// Merge a partial update over the current config and apply it.
    pub fn update(&mut self, update: EffectUpdate) -> bool {
        let mut config = self.config.clone();
        config.merge(update);
        self.configure(config)
    }

    /// Stop rendering entirely, as when the hosting view goes away. The
    /// config is kept; `reactivate` or `configure` starts it again.
    pub fn unmount(&mut self) {
        self.teardown();
    }

    /// Start the current config again after `unmount`.
    pub fn reactivate(&mut self) {
        if self.run.is_none() {
            self.activate();
        }
    }

    /// Hand the host a drawing surface. A deferred canvas activation picks
    /// it up on the next `pump`.
    pub fn mount_surface(&mut self, surface: S) {
        self.surface = Some(surface);
    }

    /// Take the surface away. A running canvas effect is torn down and
    /// waits for the next surface.
    pub fn unmount_surface(&mut self) -> Option<S> {
        if matches!(self.run, Some(Run::Canvas(_))) {
            self.teardown();
            self.deferred = true;
        }
        self.surface.take()
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let (Some(Run::Canvas(run)), Some(surface)) = (self.run.as_mut(), self.surface.as_mut())
            && self.scheduler.has_resize_listener(run.resize_listener())
        {
            run.resize(surface, viewport);
        }
    }

    /// One render pass: retry a deferred activation, advance the clock by
    /// `dt` and dispatch whatever came due.
    pub fn pump(&mut self, dt: Duration) {
        if self.deferred && self.surface.is_some() {
            log::debug!("surface available, activating {}", self.params.effect);
            self.deferred = false;
            self.activate();
        }

        let frame_dt = dt.as_secs_f64();
        for due in self.scheduler.advance(dt) {
            match due {
                Due::Frame { id } => {
                    if let (Some(Run::Canvas(run)), Some(surface)) =
                        (self.run.as_mut(), self.surface.as_mut())
                        && run.owns_frame(id)
                    {
                        run.tick(surface, &mut self.scheduler, frame_dt);
                    }
                }
                Due::Interval { id, at } => {
                    if let Some(Run::Dom(run)) = self.run.as_mut() {
                        run.on_interval(id, at);
                    }
                }
            }
        }
    }

    fn activate(&mut self) {
        let params = self.params.clone();
        let engine = params.engine();
        if engine == Engine::Off {
            self.state = Lifecycle::Inactive;
            return;
        }
        self.state = Lifecycle::Activating;
        log::debug!("activating {} ({:?})", params.effect, engine);

        let seed = self.next_seed();
        let run = match engine {
            Engine::Canvas => {
                let Some(surface) = self.surface.as_mut() else {
                    log::debug!("no surface mounted, deferring {}", params.effect);
                    self.deferred = true;
                    self.state = Lifecycle::Inactive;
                    return;
                };
                CanvasRun::start(&params, surface, self.viewport, &mut self.scheduler, seed)
                    .map(Run::Canvas)
            }
            Engine::Dom => DomRun::start(&params, &mut self.scheduler, seed).map(Run::Dom),
            Engine::Media => MediaLayer::from_params(&params).map(Run::Media),
            Engine::Off => None,
        };

        self.state = if run.is_some() {
            Lifecycle::Active
        } else {
            Lifecycle::Inactive
        };
        self.run = run;
        log::debug!("{} is {:?}", params.effect, self.state);
    }

    fn teardown(&mut self) {
        self.deferred = false;
        let Some(run) = self.run.take() else {
            self.state = Lifecycle::Inactive;
            return;
        };
        self.state = Lifecycle::TearingDown;
        log::debug!("tearing down {}", self.params.effect);
        match run {
            Run::Canvas(run) => run.stop(&mut self.scheduler),
            Run::Dom(run) => run.stop(&mut self.scheduler),
            Run::Media(_) => {}
        }
        self.state = Lifecycle::Inactive;
    }

    fn next_seed(&mut self) -> u64 {
        self.activations += 1;
        self.seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(self.activations)
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    /// The effect that is actually running, if any.
    pub fn active_effect(&self) -> Option<EffectType> {
        match self.run.as_ref()? {
            Run::Canvas(run) => Some(run.effect()),
            Run::Dom(run) => Some(run.effect()),
            Run::Media(_) => Some(EffectType::Custom),
        }
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Particles or elements alive in the current run.
    pub fn population(&self) -> usize {
        match &self.run {
            Some(Run::Canvas(run)) => run.population(),
            Some(Run::Dom(run)) => run.population(),
            Some(Run::Media(_)) | None => 0,
        }
    }

    /// Frames drawn by the current canvas run.
    pub fn canvas_ticks(&self) -> u64 {
        match &self.run {
            Some(Run::Canvas(run)) => run.ticks(),
            _ => 0,
        }
    }

    /// Number of activations so far, including deferred retries.
    pub fn activations(&self) -> u64 {
        self.activations
    }

    pub fn layer(&self) -> Layer {
        match &self.run {
            Some(Run::Canvas(_)) => Layer::Canvas,
            Some(Run::Dom(run)) => Layer::Dom(run.layer()),
            Some(Run::Media(media)) => Layer::Media(media.clone()),
            None => Layer::Empty,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Recorder;

    fn host() -> EffectHost<Recorder> {
        let mut host = EffectHost::new(Viewport::default());
        host.mount_surface(Recorder::new());
        host
    }

    #[test]
    fn test_starts_inactive() {
        let host = host();
        assert_eq!(host.state(), Lifecycle::Inactive);
        assert_eq!(host.layer(), Layer::Empty);
        assert!(host.scheduler().is_idle());
    }

    #[test]
    fn test_equal_config_is_not_a_restart() {
        let mut host = host();
        let cfg = EffectConfig::new(EffectType::Galaxy).with_color("#abcdef");
        assert!(host.configure(cfg.clone()));
        assert!(!host.configure(cfg.clone()));
        assert_eq!(host.activations(), 1);
    }

    #[test]
    fn test_any_field_change_restarts() {
        let mut host = host();
        let cfg = EffectConfig::new(EffectType::Galaxy).with_opacity(1.5);
        assert!(host.configure(cfg.clone()));
        // Same params after clamping, still a different config
        assert!(host.configure(cfg.clone().with_opacity(2.0)));
        assert_eq!(host.params().opacity, 1.0);
        // An explicit default is a change too
        assert!(host.configure(EffectConfig::new(EffectType::Galaxy).with_opacity(0.7)));
        assert!(host.configure(EffectConfig::new(EffectType::Galaxy)));
        assert_eq!(host.activations(), 4);
    }

    #[test]
    fn test_configure_after_unmount_starts_again() {
        let mut host = host();
        let cfg = EffectConfig::new(EffectType::AuroraGlow);
        host.configure(cfg.clone());
        host.unmount();
        assert_eq!(host.state(), Lifecycle::Inactive);

        assert!(host.configure(cfg.clone()));
        assert_eq!(host.state(), Lifecycle::Active);
        assert_eq!(host.scheduler().active_intervals(), 1);
        // Already running: nothing to do
        assert!(!host.configure(cfg));
        assert_eq!(host.scheduler().active_intervals(), 1);
    }

    #[test]
    fn test_deferred_until_surface_mounted() {
        let mut host: EffectHost<Recorder> = EffectHost::new(Viewport::default());
        host.configure(EffectConfig::new(EffectType::Fire));
        assert!(host.is_deferred());
        assert_eq!(host.state(), Lifecycle::Inactive);
        assert!(host.scheduler().is_idle());

        host.pump(Duration::from_millis(16));
        assert!(host.is_deferred());

        host.mount_surface(Recorder::new());
        host.pump(Duration::from_millis(16));
        assert!(!host.is_deferred());
        assert_eq!(host.state(), Lifecycle::Active);
        assert_eq!(host.active_effect(), Some(EffectType::Fire));
        assert_eq!(host.scheduler().pending_frames(), 1);
    }

    #[test]
    fn test_unmount_surface_defers_canvas() {
        let mut host = host();
        host.configure(EffectConfig::new(EffectType::Bubbles));
        host.pump(Duration::from_millis(16));
        let surface = host.unmount_surface();
        assert!(surface.is_some());
        assert!(host.is_deferred());
        assert!(host.scheduler().is_idle());
    }

    #[test]
    fn test_resize_follows_viewport() {
        let mut host = host();
        host.configure(EffectConfig::new(EffectType::Ocean));
        host.resize(Viewport::new(800.0, 600.0));
        let surface = host.surface().unwrap();
        assert_eq!(surface.resize_count(), 2);
        assert_eq!(surface.width(), 800.0);
    }

    #[test]
    fn test_resize_keeps_particles() {
        let mut host = host();
        host.configure(EffectConfig::new(EffectType::Bubbles));
        for _ in 0..5 {
            host.pump(Duration::from_millis(16));
        }
        let before = host.population();
        assert!(before > 0);

        host.resize(Viewport::new(800.0, 600.0));
        assert_eq!(host.population(), before);
        assert_eq!(host.canvas_ticks(), 5);
        assert_eq!(host.activations(), 1);

        host.pump(Duration::from_millis(16));
        assert!(host.population() >= before);
        assert_eq!(host.canvas_ticks(), 6);
    }

    #[test]
    fn test_media_layer_has_no_timers() {
        let mut host = host();
        host.configure(
            EffectConfig::new(EffectType::Custom).with_media("data:video/mp4;base64,AAAA"),
        );
        assert_eq!(host.state(), Lifecycle::Active);
        assert!(matches!(host.layer(), Layer::Media(_)));
        assert!(host.scheduler().is_idle());
        assert_eq!(host.surface().unwrap().resize_count(), 0);
    }

    #[test]
    fn test_unsupported_media_stays_inactive() {
        let mut host = host();
        host.configure(EffectConfig::new(EffectType::Custom).with_media("data:text/html,x"));
        assert_eq!(host.state(), Lifecycle::Inactive);
        assert_eq!(host.layer(), Layer::Empty);
    }

    #[test]
    fn test_update_merges_and_restarts() {
        let mut host = host();
        host.configure(EffectConfig::new(EffectType::Stars).with_speed(2.0));
        let restarted = host.update(EffectUpdate {
            color: Some("#ff0000".into()),
            ..Default::default()
        });
        assert!(restarted);
        assert_eq!(host.config().speed, Some(2.0));
        assert_eq!(host.params().color_hex, "#ff0000");
        assert!(!host.update(EffectUpdate::default()));
    }

    #[test]
    fn test_unmount_and_reactivate() {
        let mut host = host();
        host.configure(EffectConfig::new(EffectType::SoapBubbles));
        assert_eq!(host.scheduler().active_intervals(), 1);
        host.unmount();
        assert!(host.scheduler().is_idle());
        assert_eq!(host.state(), Lifecycle::Inactive);
        host.reactivate();
        assert_eq!(host.scheduler().active_intervals(), 1);
        assert_eq!(host.active_effect(), Some(EffectType::SoapBubbles));
    }
}
