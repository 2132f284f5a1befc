use ratify_codec::AccelerometerTrace;

use crate::EstimateError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespirationConfig {
    pub min_samples: usize,
    /// Share of the gap between mean and peak magnitude added to the mean
    /// to form the breath threshold.
    pub threshold_ratio: f32,
    /// A breath ends once magnitude falls below `threshold * hysteresis_ratio`.
    pub hysteresis_ratio: f32,
    /// Length of the recording the samples span.
    pub collection_window_secs: f64,
    pub min_bpm: u8,
    pub max_bpm: u8,
    /// Reported whenever no measurement can be made.
    pub default_bpm: u8,
}

impl Default for RespirationConfig {
    fn default() -> Self {
        Self {
            min_samples: 20,
            threshold_ratio: 0.3,
            hysteresis_ratio: 0.8,
            collection_window_secs: 45.0,
            min_bpm: 12,
            max_bpm: 20,
            default_bpm: 16,
        }
    }
}

/// Breathing rate from chest motion: counts peaks of the acceleration
/// magnitude above an adaptive threshold, with hysteresis so the ripples of
/// a single breath are counted once.
#[derive(Debug, Clone, Copy, Default)]
pub struct RespiratoryRateEstimator {
    config: RespirationConfig,
}

impl RespiratoryRateEstimator {
    pub fn new(config: RespirationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RespirationConfig {
        &self.config
    }

    pub fn estimate_trace(&self, trace: &AccelerometerTrace) -> u8 {
        self.estimate(&trace.x, &trace.y, &trace.z)
    }

    /// Always yields a usable rate, `default_bpm` when the axes cannot be
    /// measured.
    pub fn estimate(&self, x: &[f32], y: &[f32], z: &[f32]) -> u8 {
        match self.try_estimate(x, y, z) {
            Ok(bpm) => bpm,
            Err(EstimateError::InsufficientData { .. }) => self.config.default_bpm,
            Err(error) => {
                warn!(
                    "Respiratory rate unavailable ({error}), using {} BPM",
                    self.config.default_bpm
                );
                self.config.default_bpm
            }
        }
    }

    pub fn try_estimate(&self, x: &[f32], y: &[f32], z: &[f32]) -> Result<u8, EstimateError> {
        let shortest = x.len().min(y.len()).min(z.len());
        if shortest < self.config.min_samples {
            return Err(EstimateError::InsufficientData {
                available: shortest,
                required: self.config.min_samples,
            });
        }

        let window = self.config.collection_window_secs;
        if !(window.is_finite() && window > 0.0) {
            return Err(EstimateError::InvalidParameter("collection_window_secs"));
        }

        let magnitudes = Self::magnitudes(x, y, z);
        if magnitudes.iter().any(|m| !m.is_finite()) {
            return Err(EstimateError::NonFinite);
        }

        let threshold = self.threshold(&magnitudes);
        let breaths = self.count_breaths(&magnitudes, threshold);
        let rate = breaths as f64 / window * 60.0;

        debug!("Breath count: {breaths}, Rate: {} BPM", rate as u32);

        let bpm = rate
            .trunc()
            .clamp(f64::from(self.config.min_bpm), f64::from(self.config.max_bpm));
        Ok(bpm as u8)
    }

    /// Euclidean norm of each sample present on all three axes.
    pub fn magnitudes(x: &[f32], y: &[f32], z: &[f32]) -> Vec<f32> {
        x.iter()
            .zip(y)
            .zip(z)
            .map(|((&x, &y), &z)| {
                let (x, y, z) = (f64::from(x), f64::from(y), f64::from(z));
                (x * x + y * y + z * z).sqrt() as f32
            })
            .collect()
    }

    /// `mean + threshold_ratio * (max - mean)`; zero for an empty sequence.
    pub fn threshold(&self, magnitudes: &[f32]) -> f32 {
        if magnitudes.is_empty() {
            return 0.0;
        }

        let mean = (magnitudes.iter().map(|&m| f64::from(m)).sum::<f64>()
            / magnitudes.len() as f64) as f32;
        let max = magnitudes.iter().copied().fold(f32::MIN, f32::max);
        mean + (max - mean) * self.config.threshold_ratio
    }

    /// Counts strict local maxima above `threshold`, one per breath.
    pub fn count_breaths(&self, magnitudes: &[f32], threshold: f32) -> usize {
        let release = threshold * self.config.hysteresis_ratio;

        let mut breaths = 0;
        let mut in_breath = false;
        for window in magnitudes.windows(3) {
            let [previous, current, next] = [window[0], window[1], window[2]];

            if current > previous && current > next && current > threshold && !in_breath {
                breaths += 1;
                in_breath = true;
            }

            if current < release {
                in_breath = false;
            }
        }

        breaths
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    /// Chest rising and falling at `freq_hz`, sampled at 20Hz.
    fn breathing(freq_hz: f32, len: usize) -> AccelerometerTrace {
        let x = (0..len)
            .map(|i| 0.5 * (1.0 + (2.0 * PI * freq_hz * i as f32 / 20.0).sin()))
            .collect();
        AccelerometerTrace::new(x, vec![0.0; len], vec![0.0; len])
    }

    #[test]
    fn breathing_at_18_per_minute() {
        let estimator = RespiratoryRateEstimator::default();
        let trace = breathing(0.3, 900);
        let magnitudes = RespiratoryRateEstimator::magnitudes(&trace.x, &trace.y, &trace.z);
        let breaths = estimator.count_breaths(&magnitudes, estimator.threshold(&magnitudes));
        assert!((13..=14).contains(&breaths), "breaths: {breaths}");

        let bpm = estimator.estimate_trace(&trace);
        assert!((17..=18).contains(&bpm), "Expected ~18 BPM, got {bpm}");
    }

    #[test]
    fn fast_breathing_is_clamped() {
        // |sin| peaks twice per cycle
        let len = 900;
        let x = (0..len)
            .map(|i| 0.5 * (2.0 * PI * 0.3 * i as f32 / 20.0).sin())
            .collect();
        let trace = AccelerometerTrace::new(x, vec![0.0; len], vec![0.0; len]);
        assert_eq!(RespiratoryRateEstimator::default().estimate_trace(&trace), 20);
    }

    #[test]
    fn slow_breathing() {
        let estimator = RespiratoryRateEstimator::default();
        assert_eq!(estimator.estimate_trace(&breathing(0.2, 900)), 12);
    }

    #[test]
    fn short_axes_return_default() {
        let estimator = RespiratoryRateEstimator::default();
        let trace = breathing(0.3, 5);
        assert_eq!(estimator.estimate_trace(&trace), 16);

        let long = vec![1.0; 100];
        assert_eq!(estimator.estimate(&long, &long, &long[..19]), 16);
        assert_eq!(
            estimator.try_estimate(&long, &long[..19], &long),
            Err(EstimateError::InsufficientData {
                available: 19,
                required: 20
            })
        );
    }

    #[test]
    fn all_zero_motion() {
        let estimator = RespiratoryRateEstimator::default();
        let zeros = vec![0.0; 100];
        assert_eq!(estimator.threshold(&zeros), 0.0);
        assert_eq!(estimator.count_breaths(&zeros, 0.0), 0);
        assert_eq!(estimator.estimate(&zeros, &zeros, &zeros), 12);
    }

    #[test]
    fn non_finite_samples_return_default() {
        let estimator = RespiratoryRateEstimator::default();
        let mut trace = breathing(0.3, 900);
        trace.y[100] = f32::INFINITY;
        assert_eq!(
            estimator.try_estimate(&trace.x, &trace.y, &trace.z),
            Err(EstimateError::NonFinite)
        );
        assert_eq!(estimator.estimate_trace(&trace), 16);
    }

    #[test]
    fn invalid_window_returns_default() {
        let estimator = RespiratoryRateEstimator::new(RespirationConfig {
            collection_window_secs: 0.0,
            ..Default::default()
        });
        assert_eq!(estimator.estimate_trace(&breathing(0.3, 900)), 16);
    }

    #[test]
    fn uneven_axes_use_shortest() {
        let estimator = RespiratoryRateEstimator::default();
        let mut trace = breathing(0.3, 900);
        trace.x.extend(std::iter::repeat_n(100.0, 50));
        assert_eq!(
            estimator.estimate_trace(&trace),
            estimator.estimate_trace(&breathing(0.3, 900))
        );
    }

    #[test]
    fn magnitude_is_euclidean_norm() {
        let m = RespiratoryRateEstimator::magnitudes(&[3.0, 0.0], &[4.0, 1.0], &[0.0, 0.0, 9.0]);
        assert_eq!(m, vec![5.0, 1.0]);
    }

    #[test]
    fn threshold_sits_between_mean_and_max() {
        let estimator = RespiratoryRateEstimator::default();
        let threshold = estimator.threshold(&[1.0, 1.0, 1.0, 5.0]);
        // mean 2, max 5
        assert!((threshold - 2.9).abs() < 1e-6);
    }

    #[test]
    fn ripples_count_as_one_breath() {
        let estimator = RespiratoryRateEstimator::default();
        let magnitudes = [0.0, 10.0, 8.0, 10.0, 8.0, 10.0, 0.0, 10.0, 0.0];
        assert_eq!(estimator.count_breaths(&magnitudes, 5.0), 2);

        // Dipping to 4.2 stays above the 4.0 release level
        let magnitudes = [0.0, 10.0, 4.2, 10.0, 0.0];
        assert_eq!(estimator.count_breaths(&magnitudes, 5.0), 1);
    }

    #[test]
    fn random_motion_stays_in_range() {
        let estimator = RespiratoryRateEstimator::default();
        let mut rng = StdRng::seed_from_u64(3);
        for len in [20, 21, 100, 900] {
            for _ in 0..10 {
                let mut axis = || (0..len).map(|_| rng.random_range(-2.0..2.0)).collect::<Vec<f32>>();
                let (x, y, z) = (axis(), axis(), axis());
                let bpm = estimator.estimate(&x, &y, &z);
                assert!((12..=20).contains(&bpm), "out of range: {bpm}");
            }
        }
    }

    #[test]
    fn repeated_estimates_agree() {
        let estimator = RespiratoryRateEstimator::default();
        let trace = breathing(0.3, 900);
        assert_eq!(estimator.estimate_trace(&trace), estimator.estimate_trace(&trace));
    }
}
