use std::{
    fs,
    path::{Path, PathBuf},
};

use image::ImageFormat;

use crate::{CodecError, Frame};

/// Anything that can hand out decoded frames by timestamp.
pub trait FrameSource {
    /// Total length of the clip, if known.
    fn duration_ms(&self) -> Option<u64>;

    /// Frame closest to `time_ms`. `Ok(None)` means nothing could be
    /// produced for that instant and the sampler should move on.
    fn frame_at(&mut self, time_ms: u64) -> Result<Option<Frame>, CodecError>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn duration_ms(&self) -> Option<u64> {
        (**self).duration_ms()
    }

    fn frame_at(&mut self, time_ms: u64) -> Result<Option<Frame>, CodecError> {
        (**self).frame_at(time_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub interval_ms: u64,
    pub max_frames: usize,
    /// Assumed clip length when the source cannot report one.
    pub default_duration_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: FrameSampler::FRAME_INTERVAL_MS,
            max_frames: FrameSampler::MAX_FRAMES,
            default_duration_ms: FrameSampler::DEFAULT_DURATION_MS,
        }
    }
}

/// Pulls an evenly spaced, bounded run of frames out of a [`FrameSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSampler {
    config: SamplerConfig,
}

impl FrameSampler {
    pub const FRAME_INTERVAL_MS: u64 = 100;
    pub const MAX_FRAMES: usize = 200;
    pub const DEFAULT_DURATION_MS: u64 = 45_000;

    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> SamplerConfig {
        self.config
    }

    pub fn sample_rate_hz(&self) -> f64 {
        1000.0 / self.interval_ms() as f64
    }

    /// Upper bound on the frames a clip of `duration_ms` yields.
    pub fn planned_frames(&self, duration_ms: u64) -> usize {
        let by_duration = usize::try_from(duration_ms / self.interval_ms()).unwrap_or(usize::MAX);
        by_duration.min(self.config.max_frames)
    }

    /// Samples frames at `0, interval, 2 * interval, ...` until the clip ends
    /// or the frame cap is reached.
    ///
    /// A decode error stops sampling early; the frames gathered so far are
    /// returned, and the error only surfaces when nothing was gathered.
    pub fn sample<S>(&self, source: &mut S) -> Result<Vec<Frame>, CodecError>
    where
        S: FrameSource + ?Sized,
    {
        let duration_ms = source
            .duration_ms()
            .unwrap_or(self.config.default_duration_ms);
        let max_frames = self.planned_frames(duration_ms);
        debug!("Sampling up to {max_frames} frames from a {duration_ms}ms clip");

        let mut frames = Vec::with_capacity(max_frames);
        let mut time_ms = 0;
        while time_ms < duration_ms && frames.len() < max_frames {
            match source.frame_at(time_ms) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => trace!("No frame at {time_ms}ms"),
                Err(error) if frames.is_empty() => return Err(error),
                Err(error) => {
                    warn!("Stopped sampling at {time_ms}ms: {error}");
                    break;
                }
            }
            time_ms += self.interval_ms();
        }

        debug!("Sampled {} frames", frames.len());
        Ok(frames)
    }

    fn interval_ms(&self) -> u64 {
        self.config.interval_ms.max(1)
    }
}

/// Directory of numbered image frames captured at a fixed frame rate. Any
/// file whose extension names a format `image` supports is a frame.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    fps: f64,
}

impl ImageSequence {
    pub fn open(dir: impl AsRef<Path>, fps: f64) -> Result<Self, CodecError> {
        let dir = dir.as_ref();
        if !(fps.is_finite() && fps > 0.0) {
            return Err(CodecError::InvalidFrameRate(fps));
        }

        let mut paths = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| ImageFormat::from_path(path).is_ok())
            .collect::<Vec<_>>();

        if paths.is_empty() {
            return Err(CodecError::EmptySequence(dir.to_path_buf()));
        }

        paths.sort();
        Ok(Self { paths, fps })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl FrameSource for ImageSequence {
    fn duration_ms(&self) -> Option<u64> {
        Some((self.paths.len() as f64 * 1000.0 / self.fps).round() as u64)
    }

    fn frame_at(&mut self, time_ms: u64) -> Result<Option<Frame>, CodecError> {
        let index = (time_ms as f64 * self.fps / 1000.0).round() as usize;
        let Some(path) = self.paths.get(index) else {
            return Ok(None);
        };

        Frame::open(path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource {
        duration_ms: Option<u64>,
        requested: Vec<u64>,
        missing_at: Vec<u64>,
        fail_from: Option<u64>,
    }

    impl FakeSource {
        fn new(duration_ms: Option<u64>) -> Self {
            Self {
                duration_ms,
                requested: vec![],
                missing_at: vec![],
                fail_from: None,
            }
        }
    }

    impl FrameSource for FakeSource {
        fn duration_ms(&self) -> Option<u64> {
            self.duration_ms
        }

        fn frame_at(&mut self, time_ms: u64) -> Result<Option<Frame>, CodecError> {
            self.requested.push(time_ms);
            if self.fail_from.is_some_and(|from| time_ms >= from) {
                return Err(CodecError::Io(std::io::Error::other("dropped frame")));
            }
            if self.missing_at.contains(&time_ms) {
                return Ok(None);
            }
            Ok(Some(Frame::filled(4, 4, [time_ms as u8, 0, 0])))
        }
    }

    #[test]
    fn samples_every_interval() {
        let mut source = FakeSource::new(Some(1000));
        let frames = FrameSampler::default().sample(&mut source).unwrap();
        assert_eq!(frames.len(), 10);
        assert_eq!(source.requested, (0..10).map(|i| i * 100).collect::<Vec<_>>());
    }

    #[test]
    fn caps_frame_count() {
        let mut source = FakeSource::new(Some(60_000));
        let frames = FrameSampler::default().sample(&mut source).unwrap();
        assert_eq!(frames.len(), FrameSampler::MAX_FRAMES);
    }

    #[test]
    fn unknown_duration_uses_default() {
        let sampler = FrameSampler::new(SamplerConfig {
            max_frames: 1000,
            ..Default::default()
        });
        let mut source = FakeSource::new(None);
        let frames = sampler.sample(&mut source).unwrap();
        assert_eq!(frames.len(), 450);
    }

    #[test]
    fn missing_frames_are_skipped() {
        let mut source = FakeSource::new(Some(1000));
        source.missing_at = vec![200, 500];
        let frames = FrameSampler::default().sample(&mut source).unwrap();
        assert_eq!(frames.len(), 8);
        assert_eq!(source.requested.len(), 10);
    }

    #[test]
    fn error_keeps_frames_gathered_so_far() {
        let mut source = FakeSource::new(Some(1000));
        source.fail_from = Some(300);
        let frames = FrameSampler::default().sample(&mut source).unwrap();
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn error_before_any_frame() {
        let mut source = FakeSource::new(Some(1000));
        source.fail_from = Some(0);
        assert!(FrameSampler::default().sample(&mut source).is_err());
    }

    #[test]
    fn short_clip_yields_nothing() {
        let mut source = FakeSource::new(Some(50));
        let frames = FrameSampler::default().sample(&mut source).unwrap();
        assert!(frames.is_empty());
        assert!(source.requested.is_empty());
    }

    #[test]
    fn planned_frames() {
        let sampler = FrameSampler::default();
        assert_eq!(sampler.planned_frames(0), 0);
        assert_eq!(sampler.planned_frames(1_050), 10);
        assert_eq!(sampler.planned_frames(45_000), 200);
        assert!((sampler.sample_rate_hz() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn image_sequence_picks_closest_frame() {
        let dir = std::env::temp_dir().join(format!("ratify-seq-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..5_u8 {
            let frame = Frame::filled(2, 2, [i * 10, 0, 0]);
            let ext = if i % 2 == 0 { "png" } else { "ppm" };
            frame.save(dir.join(format!("frame_{i:03}.{ext}"))).unwrap();
        }
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut sequence = ImageSequence::open(&dir, 20.0).unwrap();
        assert_eq!(sequence.len(), 5);
        assert_eq!(sequence.duration_ms(), Some(250));

        let frame = sequence.frame_at(100).unwrap().unwrap();
        assert_eq!(frame.pixel(0, 0), Some([20, 0, 0]));
        assert!(sequence.frame_at(1000).unwrap().is_none());

        let frames = FrameSampler::default().sample(&mut sequence).unwrap();
        assert_eq!(frames.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupt_frame_ends_sampling_without_panicking() {
        let dir = std::env::temp_dir().join(format!("ratify-corrupt-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..5_u8 {
            Frame::filled(2, 2, [i, 0, 0])
                .save(dir.join(format!("frame_{i:03}.ppm")))
                .unwrap();
        }
        fs::write(
            dir.join("frame_002.ppm"),
            b"P6 4294967295 4294967295 255\n\0\0\0",
        )
        .unwrap();

        let mut sequence = ImageSequence::open(&dir, 20.0).unwrap();
        assert!(matches!(sequence.frame_at(100), Err(CodecError::Image(_))));

        let frames = FrameSampler::default().sample(&mut sequence).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pixel(0, 0), Some([0, 0, 0]));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn image_sequence_rejects_bad_input() {
        let dir = std::env::temp_dir().join(format!("ratify-empty-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        assert!(matches!(
            ImageSequence::open(&dir, 30.0),
            Err(CodecError::EmptySequence(_))
        ));
        assert!(matches!(
            ImageSequence::open(&dir, 0.0),
            Err(CodecError::InvalidFrameRate(_))
        ));
        fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(
            ImageSequence::open(dir.join("missing"), 30.0),
            Err(CodecError::Io(_))
        ));
    }
}
