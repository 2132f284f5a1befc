use indicatif::{ProgressBar, ProgressStyle};
use ratify_codec::{CodecError, Frame, FrameSampler, FrameSource};

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:>12} [{wide_bar:.red/dim}] {pos}/{len} frames ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

/// Ticks a progress bar for every frame the sampler asks for.
pub struct ProgressSource<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: FrameSource> ProgressSource<S> {
    pub fn new(inner: S, sampler: &FrameSampler) -> Self {
        let duration_ms = inner
            .duration_ms()
            .unwrap_or(sampler.config().default_duration_ms);
        let bar = ProgressBar::new(sampler.planned_frames(duration_ms) as u64);
        bar.set_style(bar_style());
        bar.set_prefix("Sampling");
        Self { inner, bar }
    }

    pub fn hidden(inner: S) -> Self {
        Self {
            inner,
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl<S: FrameSource> FrameSource for ProgressSource<S> {
    fn duration_ms(&self) -> Option<u64> {
        self.inner.duration_ms()
    }

    fn frame_at(&mut self, time_ms: u64) -> Result<Option<Frame>, CodecError> {
        let frame = self.inner.frame_at(time_ms);
        self.bar.inc(1);
        frame
    }
}

impl<S> Drop for ProgressSource<S> {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
