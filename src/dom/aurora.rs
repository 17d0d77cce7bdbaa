use std::time::Duration;

/// Phase tick period. Independent of the speed setting.
pub const INTERVAL: Duration = Duration::from_millis(100);

/// Phase added per tick.
pub const STEP: f64 = 0.5;

/// Slow rotation layered over the aurora glow's CSS animation.
#[derive(Debug, Clone, Default)]
pub struct AuroraDrift {
    phase: f64,
}

impl AuroraDrift {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self) {
        self.phase += STEP;
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Backdrop rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.phase.rem_euclid(360.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let mut drift = AuroraDrift::new();
        for _ in 0..722 {
            drift.advance();
        }
        assert_eq!(drift.phase(), 361.0);
        assert_eq!(drift.rotation(), 1.0);
    }
}
