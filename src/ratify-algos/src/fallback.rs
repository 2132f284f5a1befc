use rand::{Rng, rngs::ThreadRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackConfig {
    pub base_bpm: u8,
    /// Largest deviation from `base_bpm`, drawn uniformly in both directions.
    pub spread: u8,
    pub min_bpm: u8,
    pub max_bpm: u8,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_bpm: 72,
            spread: 15,
            min_bpm: 60,
            max_bpm: 100,
        }
    }
}

/// Plausible resting heart rate for when nothing could be measured.
pub struct FallbackGenerator<R = ThreadRng> {
    config: FallbackConfig,
    rng: R,
}

impl FallbackGenerator<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::rng())
    }
}

impl Default for FallbackGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> FallbackGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self::with_config(FallbackConfig::default(), rng)
    }

    pub fn with_config(config: FallbackConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    pub fn heart_rate(&mut self) -> u8 {
        let spread = i16::from(self.config.spread);
        let bpm = i16::from(self.config.base_bpm) + self.rng.random_range(-spread..=spread);
        let bpm = bpm.clamp(
            i16::from(self.config.min_bpm),
            i16::from(self.config.max_bpm),
        );
        bpm as u8
    }
}
