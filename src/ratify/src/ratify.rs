use anyhow::anyhow;
use chrono::Local;
use rand::Rng;
use ratify_algos::{
    FallbackConfig, FallbackGenerator, HeartRateConfig, HeartRateEstimator, PpgExtractor,
    RespirationConfig, RespiratoryRateEstimator,
};
use ratify_codec::{AccelerometerTrace, FrameSampler, FrameSource, SamplerConfig};
use ratify_db::{DatabaseHandler, HealthRecord, SymptomRatings};
use serde::Serialize;

/// Tuning for every estimator, kept together so the sampler interval and the
/// heart rate sample rate cannot drift apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatorSettings {
    pub sampler: SamplerConfig,
    pub heart_rate: HeartRateConfig,
    pub respiration: RespirationConfig,
    pub fallback: FallbackConfig,
}

impl EstimatorSettings {
    pub fn with_frame_interval(interval_ms: u64) -> Self {
        let mut settings = Self::default();
        settings.sampler.interval_ms = interval_ms.max(1);
        settings.heart_rate.sample_rate_hz = FrameSampler::new(settings.sampler).sample_rate_hz();
        settings
    }

    /// Frame cap for the sampler, never above [`FrameSampler::MAX_FRAMES`].
    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.sampler.max_frames = max_frames.min(FrameSampler::MAX_FRAMES);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VitalSigns {
    pub heart_rate: u8,
    pub respiratory_rate: u8,
}

pub struct Ratify {
    pub database: Option<DatabaseHandler>,
    settings: EstimatorSettings,
}

impl Ratify {
    pub fn new(settings: EstimatorSettings) -> Self {
        Self {
            database: None,
            settings,
        }
    }

    pub fn with_database(mut self, database: DatabaseHandler) -> Self {
        self.database = Some(database);
        self
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    pub fn database(&self) -> anyhow::Result<&DatabaseHandler> {
        self.database
            .as_ref()
            .ok_or(anyhow!("No database configured, set DATABASE_URL"))
    }

    pub fn fallback_heart_rate(&self) -> u8 {
        FallbackGenerator::with_config(self.settings.fallback, rand::rng()).heart_rate()
    }

    /// Samples `source` on a blocking worker. Without a source, or if the
    /// worker dies, the fallback rate is reported.
    pub async fn measure_heart_rate<S>(&self, source: Option<S>) -> u8
    where
        S: FrameSource + Send + 'static,
    {
        let Some(mut source) = source else {
            warn!("No frames to measure, using fallback heart rate");
            return self.fallback_heart_rate();
        };

        let settings = self.settings;
        let task = tokio::task::spawn_blocking(move || {
            let mut fallback = FallbackGenerator::with_config(settings.fallback, rand::rng());
            estimate_heart_rate(&settings, &mut source, &mut fallback)
        });

        match task.await {
            Ok(bpm) => bpm,
            Err(error) => {
                error!("Heart rate worker failed: {error}");
                self.fallback_heart_rate()
            }
        }
    }

    pub async fn measure_respiratory_rate(&self, trace: AccelerometerTrace) -> u8 {
        let estimator = RespiratoryRateEstimator::new(self.settings.respiration);
        let task = tokio::task::spawn_blocking(move || estimator.estimate_trace(&trace));

        match task.await {
            Ok(bpm) => bpm,
            Err(error) => {
                error!("Respiratory rate worker failed: {error}");
                self.settings.respiration.default_bpm
            }
        }
    }

    /// Runs both measurements concurrently.
    pub async fn measure<S>(&self, source: Option<S>, trace: AccelerometerTrace) -> VitalSigns
    where
        S: FrameSource + Send + 'static,
    {
        let (heart_rate, respiratory_rate) = tokio::join!(
            self.measure_heart_rate(source),
            self.measure_respiratory_rate(trace)
        );

        info!("Heart rate: {heart_rate} BPM, respiratory rate: {respiratory_rate} BPM");
        VitalSigns {
            heart_rate,
            respiratory_rate,
        }
    }

    /// Stores `vitals` with the reported symptoms, stamped with local time.
    pub async fn record(
        &self,
        vitals: VitalSigns,
        symptoms: SymptomRatings,
    ) -> anyhow::Result<HealthRecord> {
        let record = HealthRecord {
            time: Local::now().naive_local(),
            heart_rate: vitals.heart_rate,
            respiratory_rate: vitals.respiratory_rate,
            symptoms,
        };

        self.database()?.create_health_record(&record).await?;
        Ok(record)
    }
}

/// Sample, extract, estimate. Unreadable sources fall back like any other
/// failed estimate.
pub fn estimate_heart_rate<S, R>(
    settings: &EstimatorSettings,
    source: &mut S,
    fallback: &mut FallbackGenerator<R>,
) -> u8
where
    S: FrameSource + ?Sized,
    R: Rng,
{
    let frames = match FrameSampler::new(settings.sampler).sample(source) {
        Ok(frames) => frames,
        Err(error) => {
            let bpm = fallback.heart_rate();
            error!("Could not read frames ({error}), using {bpm} BPM");
            return bpm;
        }
    };

    let ppg = PpgExtractor::extract(&frames);
    HeartRateEstimator::new(settings.heart_rate).estimate(&ppg, frames.len(), fallback)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use rand::{SeedableRng, rngs::StdRng};
    use ratify_codec::{CodecError, Frame};
    use ratify_db::{SearchHealthRecords, Symptom};

    use super::*;

    /// Fingertip over the lens: red level pulsing at `freq_hz`.
    struct Pulse {
        freq_hz: f64,
        duration_ms: u64,
    }

    impl FrameSource for Pulse {
        fn duration_ms(&self) -> Option<u64> {
            Some(self.duration_ms)
        }

        fn frame_at(&mut self, time_ms: u64) -> Result<Option<Frame>, CodecError> {
            let phase = 2.0 * PI * self.freq_hz * time_ms as f64 / 1000.0;
            let red = (150.0 + 20.0 * phase.sin()).round() as u8;
            Ok(Some(Frame::filled(32, 24, [red, 60, 60])))
        }
    }

    struct Broken;

    impl FrameSource for Broken {
        fn duration_ms(&self) -> Option<u64> {
            None
        }

        fn frame_at(&mut self, _time_ms: u64) -> Result<Option<Frame>, CodecError> {
            Err(CodecError::InvalidFrameRate(0.0))
        }
    }

    fn breathing(len: usize) -> AccelerometerTrace {
        let x = (0..len)
            .map(|i| 0.5 * (1.0 + (2.0 * std::f32::consts::PI * 0.3 * i as f32 / 20.0).sin()))
            .collect();
        AccelerometerTrace::new(x, vec![0.0; len], vec![0.0; len])
    }

    #[test]
    fn frame_interval_sets_sample_rate() {
        let settings = EstimatorSettings::with_frame_interval(50);
        assert_eq!(settings.sampler.interval_ms, 50);
        assert_eq!(settings.heart_rate.sample_rate_hz, 20.0);

        let settings = EstimatorSettings::default();
        assert_eq!(settings.heart_rate.sample_rate_hz, 10.0);
    }

    #[test]
    fn frame_cap_cannot_be_raised() {
        let settings = EstimatorSettings::default().with_max_frames(1_000);
        assert_eq!(settings.sampler.max_frames, FrameSampler::MAX_FRAMES);

        let settings = EstimatorSettings::default().with_max_frames(50);
        assert_eq!(settings.sampler.max_frames, 50);
    }

    #[test]
    fn pulse_from_frames() {
        let mut fallback = FallbackGenerator::with_rng(StdRng::seed_from_u64(0));
        let mut source = Pulse {
            freq_hz: 1.2,
            duration_ms: 5_000,
        };
        let bpm = estimate_heart_rate(&EstimatorSettings::default(), &mut source, &mut fallback);
        assert_eq!(bpm, 75);

        let mut source = Pulse {
            freq_hz: 2.0,
            duration_ms: 10_000,
        };
        let bpm = estimate_heart_rate(&EstimatorSettings::default(), &mut source, &mut fallback);
        assert_eq!(bpm, 120);
    }

    #[test]
    fn unreadable_source_falls_back() {
        let mut fallback = FallbackGenerator::with_rng(StdRng::seed_from_u64(0));
        let bpm = estimate_heart_rate(&EstimatorSettings::default(), &mut Broken, &mut fallback);
        assert!((60..=100).contains(&bpm));
    }

    #[tokio::test]
    async fn measure_both() {
        let ratify = Ratify::new(EstimatorSettings::default());
        let source = Pulse {
            freq_hz: 1.2,
            duration_ms: 20_000,
        };

        let vitals = ratify.measure(Some(source), breathing(900)).await;
        assert_eq!(vitals.heart_rate, 75);
        assert!((17..=18).contains(&vitals.respiratory_rate));
    }

    #[tokio::test]
    async fn missing_inputs() {
        let ratify = Ratify::new(EstimatorSettings::default());
        let vitals = ratify
            .measure(None::<Pulse>, AccelerometerTrace::default())
            .await;
        assert!((60..=100).contains(&vitals.heart_rate));
        assert_eq!(vitals.respiratory_rate, 16);
    }

    #[tokio::test]
    async fn record_requires_database() {
        let ratify = Ratify::new(EstimatorSettings::default());
        let vitals = VitalSigns {
            heart_rate: 70,
            respiratory_rate: 15,
        };
        assert!(ratify.record(vitals, SymptomRatings::default()).await.is_err());
    }

    #[tokio::test]
    async fn record_is_stored() {
        let db = DatabaseHandler::new("sqlite::memory:").await.unwrap();
        let ratify = Ratify::new(EstimatorSettings::default()).with_database(db);

        let vitals = VitalSigns {
            heart_rate: 70,
            respiratory_rate: 15,
        };
        let symptoms = SymptomRatings::from_iter([(Symptom::Headache, 3.0)]);
        let record = ratify.record(vitals, symptoms).await.unwrap();

        let stored = ratify
            .database()
            .unwrap()
            .search_health_records(SearchHealthRecords::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].heart_rate, 70);
        assert_eq!(stored[0].respiratory_rate, 15);
        assert_eq!(stored[0].symptoms, record.symptoms);
    }
}
