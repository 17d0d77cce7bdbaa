use super::{Animation, ElementKind, GeneratedElement};
use crate::color::Rgb;
use crate::effect::EffectParams;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::time::Duration;

/// Regeneration period.
pub const INTERVAL: Duration = Duration::from_millis(3000);

/// Bubble animation length at speed 1, in seconds.
const MIN_DURATION: f64 = 8.0;
const MAX_DURATION: f64 = 14.0;

/// Largest start delay, in seconds.
const MAX_DELAY: f64 = 1.5;

/// Horizontal jitter applied to both ends of a path, in percent.
const JITTER: f64 = 10.0;

/// Path templates, in viewport percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trajectory {
    DiagonalDown,
    DiagonalUp,
    LeftToRight,
    RightToLeft,
    BottomToTop,
}

const TRAJECTORIES: [Trajectory; 5] = [
    Trajectory::DiagonalDown,
    Trajectory::DiagonalUp,
    Trajectory::LeftToRight,
    Trajectory::RightToLeft,
    Trajectory::BottomToTop,
];

impl Trajectory {
    /// Start and end points as ((x0, y0), (x1, y1)).
    fn path(self, rng: &mut StdRng) -> ((f64, f64), (f64, f64)) {
        match self {
            Trajectory::DiagonalDown => ((-10.0, -10.0), (110.0, 110.0)),
            Trajectory::DiagonalUp => ((-10.0, 110.0), (110.0, -10.0)),
            Trajectory::LeftToRight => {
                let y = rng.random_range(20.0..80.0);
                ((-10.0, y), (110.0, y))
            }
            Trajectory::RightToLeft => {
                let y = rng.random_range(20.0..80.0);
                ((110.0, y), (-10.0, y))
            }
            Trajectory::BottomToTop => {
                let x = rng.random_range(10.0..90.0);
                ((x, 110.0), (x, -10.0))
            }
        }
    }
}

/// The live set of soap bubbles for one run.
pub struct SoapBubbles {
    params: EffectParams,
    rng: StdRng,
    next_id: u64,
    live: Vec<GeneratedElement>,
}

impl SoapBubbles {
    pub fn new(params: &EffectParams, seed: u64) -> Self {
        SoapBubbles {
            params: params.clone(),
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
            live: Vec::new(),
        }
    }

    /// Add a batch of 2 to 4 bubbles starting at clock time `now`.
    pub fn spawn(&mut self, now: f64) {
        let count = self.rng.random_range(2..=4);
        for _ in 0..count {
            let bubble = self.bubble(now);
            self.live.push(bubble);
        }
    }

    fn bubble(&mut self, now: f64) -> GeneratedElement {
        let p = &self.params;
        let template = TRAJECTORIES[self.rng.random_range(0..TRAJECTORIES.len())];
        let ((x0, y0), (x1, y1)) = template.path(&mut self.rng);
        let x0 = x0 + self.rng.random_range(-JITTER..JITTER);
        let x1 = x1 + self.rng.random_range(-JITTER..JITTER);
        let diameter = self.rng.random_range(30.0..80.0) * p.size;
        let duration = self.rng.random_range(MIN_DURATION..MAX_DURATION) / p.speed;
        let delay = self.rng.random_range(0.0..MAX_DELAY);
        let local = self.rng.random_range(0.4..0.8);
        let rim = p.color.lerp(Rgb::WHITE, 0.5);

        self.next_id += 1;
        let mut el = GeneratedElement::new(ElementKind::SoapBubble, Animation::Float)
            .at(x0, y0)
            .sized(diameter, diameter)
            .timed(duration, delay)
            .tinted(p, rim, local)
            .var("--dx", format!("{:.1}vw", x1 - x0))
            .var("--dy", format!("{:.1}vh", y1 - y0));
        el.vars.insert("--rim", el.color.clone());
        el.id = Some(self.next_id);
        el.expires_at = Some(now + delay + duration);
        el
    }

    /// Drop bubbles whose animation has finished. Returns how many went.
    pub fn prune(&mut self, now: f64) -> usize {
        let before = self.live.len();
        self.live
            .retain(|b| b.expires_at.is_none_or(|expiry| expiry > now));
        before - self.live.len()
    }

    pub fn on_timer(&mut self, now: f64) {
        let pruned = self.prune(now);
        self.spawn(now);
        log::trace!("soap bubbles: pruned {pruned}, live {}", self.live.len());
    }

    pub fn elements(&self) -> &[GeneratedElement] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectConfig, EffectType};
    use std::collections::HashSet;

    fn bubbles(speed: f64) -> SoapBubbles {
        let params = EffectConfig::new(EffectType::SoapBubbles)
            .with_speed(speed)
            .with_opacity(0.6)
            .normalized();
        SoapBubbles::new(&params, 42)
    }

    #[test]
    fn test_batch_size_and_timing() {
        let mut b = bubbles(2.0);
        b.spawn(0.0);
        assert!((2..=4).contains(&b.len()));
        for el in b.elements() {
            assert!(el.duration >= MIN_DURATION / 2.0 && el.duration < MAX_DURATION / 2.0);
            assert!(el.alpha() <= 0.6);
            let expiry = el.expires_at.unwrap();
            assert!((expiry - (el.delay + el.duration)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ids_unique_across_rapid_batches() {
        let mut b = bubbles(1.0);
        let mut seen = HashSet::new();
        for i in 0..50 {
            b.spawn(i as f64 * 0.001);
        }
        for el in b.elements() {
            assert!(seen.insert(el.id.unwrap()), "duplicate id {:?}", el.id);
        }
    }

    #[test]
    fn test_no_bubble_pruned_before_it_finishes() {
        let mut b = bubbles(1.0);
        b.spawn(0.0);
        let mut now = 0.0;
        for _ in 0..100 {
            now += INTERVAL.as_secs_f64();
            let finished: Vec<_> = b
                .elements()
                .iter()
                .filter(|e| e.expires_at.unwrap() <= now)
                .map(|e| e.id)
                .collect();
            let alive_before = b.len();
            b.on_timer(now);
            assert!(b.elements().iter().all(|e| !finished.contains(&e.id)));
            assert!(b.len() >= alive_before - finished.len());
        }
        // Steady state: only bubbles from the last few batches remain.
        let window = ((MAX_DURATION + MAX_DELAY) / INTERVAL.as_secs_f64()).ceil() as usize + 1;
        assert!(b.len() <= window * 4);
    }

    #[test]
    fn test_every_template_is_reachable() {
        let mut rng = StdRng::seed_from_u64(1);
        for t in TRAJECTORIES {
            let ((x0, y0), (x1, y1)) = t.path(&mut rng);
            assert!(x0 != x1 || y0 != y1);
        }
    }
}
