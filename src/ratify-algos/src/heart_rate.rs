use std::ops::RangeInclusive;

use rand::Rng;

use crate::{
    EstimateError, FallbackGenerator,
    helpers::signal::{autocorrelation, demean, moving_average},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateConfig {
    /// Rate of the PPG samples, i.e. of the sampled frames.
    pub sample_rate_hz: f64,
    /// Lower edge of the pass band, sets the smoothing window.
    pub low_cutoff_hz: f64,
    /// Nominal upper edge of the pass band (240 cycles/min).
    pub high_cutoff_hz: f64,
    pub min_window: usize,
    /// Fastest periodicity searched for, sets the shortest lag.
    pub max_pulse_hz: f64,
    /// Slowest periodicity searched for, sets the longest lag.
    pub min_pulse_hz: f64,
    pub min_samples: usize,
    pub min_bpm: u8,
    pub max_bpm: u8,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 10.0,
            low_cutoff_hz: 0.5,
            high_cutoff_hz: 4.0,
            min_window: 3,
            max_pulse_hz: 3.0,
            min_pulse_hz: 0.67,
            min_samples: 10,
            min_bpm: 40,
            max_bpm: 200,
        }
    }
}

/// Heart rate from a PPG signal via autocorrelation peak picking.
///
/// 1. Smooth with a centered moving average sized from the low cutoff
/// 2. Demean, then score every lag between the fastest and slowest pulse
///    of interest by length-normalized autocorrelation
/// 3. The best lag gives the dominant frequency, `bpm = round(60 * f)`
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartRateEstimator {
    config: HeartRateConfig,
}

impl HeartRateEstimator {
    /// Correlations closer than this are ties. Covers the rounding residue
    /// left after demeaning a constant signal.
    pub const TIE_TOLERANCE: f64 = 1e-12;

    pub fn new(config: HeartRateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeartRateConfig {
        &self.config
    }

    /// Always yields a usable rate. Any estimation failure is logged and
    /// answered by `fallback`.
    pub fn estimate<R: Rng>(
        &self,
        ppg: &[f64],
        frame_count: usize,
        fallback: &mut FallbackGenerator<R>,
    ) -> u8 {
        debug!("{} PPG samples from {frame_count} frames", ppg.len());

        match self.try_estimate(ppg) {
            Ok(bpm) => bpm,
            Err(error) => {
                let bpm = fallback.heart_rate();
                warn!("Heart rate unavailable ({error}), using {bpm} BPM");
                bpm
            }
        }
    }

    pub fn try_estimate(&self, ppg: &[f64]) -> Result<u8, EstimateError> {
        if ppg.len() < self.config.min_samples {
            return Err(EstimateError::InsufficientData {
                available: ppg.len(),
                required: self.config.min_samples,
            });
        }
        if ppg.iter().any(|v| !v.is_finite()) {
            return Err(EstimateError::NonFinite);
        }

        let filtered = self.smooth(ppg)?;
        let frequency = self.dominant_frequency(&filtered)?;
        let bpm = (frequency * 60.0)
            .round()
            .clamp(f64::from(self.config.min_bpm), f64::from(self.config.max_bpm));

        debug!("Dominant frequency: {frequency:.2}Hz, HR: {bpm}BPM");
        Ok(bpm as u8)
    }

    /// Smoothing window in samples.
    pub fn window_size(&self) -> Result<usize, EstimateError> {
        let window = self.config.sample_rate_hz / (2.0 * self.config.low_cutoff_hz);
        if !window.is_finite() || window < 0.0 {
            return Err(EstimateError::InvalidParameter("low_cutoff_hz"));
        }
        Ok((window.round() as usize).max(self.config.min_window))
    }

    pub fn smooth(&self, ppg: &[f64]) -> Result<Vec<f64>, EstimateError> {
        let window = self.window_size()?;
        trace!(
            "Band {}-{}Hz, window {window}",
            self.config.low_cutoff_hz, self.config.high_cutoff_hz
        );
        Ok(moving_average(ppg, window / 2))
    }

    /// Lags scored for a signal of `len` samples.
    pub fn lag_range(&self, len: usize) -> RangeInclusive<usize> {
        let fs = self.config.sample_rate_hz;
        let min_lag = ((fs / self.config.max_pulse_hz) as usize).max(1);
        let max_lag = ((fs / self.config.min_pulse_hz) as usize).min(len / 2);
        min_lag..=max_lag
    }

    /// Frequency, in Hz, of the strongest self-similarity within the lag
    /// window. Ties go to the shortest lag, so a flat signal reports the
    /// fastest pulse searched for.
    pub fn dominant_frequency(&self, signal: &[f64]) -> Result<f64, EstimateError> {
        let centered = demean(signal);
        let lags = self.lag_range(centered.len());
        let (min, max) = (*lags.start(), *lags.end());

        let mut best: Option<(usize, f64)> = None;
        for lag in lags {
            let correlation = autocorrelation(&centered, lag);
            if best.is_none_or(|(_, strongest)| correlation > strongest + Self::TIE_TOLERANCE) {
                best = Some((lag, correlation));
            }
        }

        let (lag, _) = best.ok_or(EstimateError::EmptyLagWindow { min, max })?;
        Ok(self.config.sample_rate_hz / lag as f64)
    }
}
