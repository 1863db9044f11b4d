//! Volume level with mute and a perceptual gain curve.
//!
//! The level is what users see and what gets persisted (0-100). The binding
//! converts it to linear gain with a dB curve: 0% is silence, 100% is unity,
//! everything in between maps linearly onto -60 dB..0 dB.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    level: u8,
    muted: bool,
}

impl Volume {
    pub const MAX: u8 = 100;

    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(Self::MAX),
            muted: false,
        }
    }

    /// Clamp an arbitrary requested level into `0..=100`.
    pub fn clamped(requested: i32) -> u8 {
        requested.clamp(0, i32::from(Self::MAX)) as u8
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(Self::MAX);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Linear gain multiplier for the output.
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            level_to_gain(self.level)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(50)
    }
}

/// gain = 10^((level - 100) * 0.6 / 20)
pub fn level_to_gain(level: u8) -> f32 {
    if level == 0 {
        return 0.0;
    }
    let db = (f32::from(level.min(Volume::MAX)) - 100.0) * 0.6;
    10.0_f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_requested_levels() {
        assert_eq!(Volume::clamped(150), 100);
        assert_eq!(Volume::clamped(-5), 0);
        assert_eq!(Volume::clamped(42), 42);
        assert_eq!(Volume::new(200).level(), 100);
    }

    #[test]
    fn gain_curve_endpoints_and_midpoint() {
        assert_eq!(level_to_gain(0), 0.0);
        assert!((level_to_gain(100) - 1.0).abs() < 0.001);
        // 50% is -30 dB
        assert!((level_to_gain(50) - 0.0316).abs() < 0.001);
        // 80% is -12 dB
        assert!((level_to_gain(80) - 0.251).abs() < 0.01);
    }

    #[test]
    fn mute_preserves_level() {
        let mut v = Volume::new(80);
        v.set_muted(true);
        assert_eq!(v.level(), 80);
        assert_eq!(v.gain(), 0.0);

        v.set_muted(false);
        assert!(v.gain() > 0.0);
    }

    #[test]
    fn gain_is_monotonic() {
        let gains: Vec<f32> = (0..=100).map(level_to_gain).collect();
        assert!(gains.windows(2).all(|w| w[0] < w[1]));
    }
}
