use std::{borrow::Borrow, ops::Range};

use ratify_codec::Frame;

/// Reduces frames to a photoplethysmographic signal: the red share of the
/// average color inside a square at the center of each frame.
pub struct PpgExtractor;

impl PpgExtractor {
    /// One sample per frame that has a non-empty sampling region, in input
    /// order.
    pub fn extract<I>(frames: I) -> Vec<f64>
    where
        I: IntoIterator,
        I::Item: Borrow<Frame>,
    {
        frames
            .into_iter()
            .filter_map(|frame| Self::normalized_red(frame.borrow()))
            .collect()
    }

    /// `avg_red / (avg_red + avg_green + avg_blue)` over the sampling region,
    /// `0.0` for a black region and `None` when the region has no pixels.
    pub fn normalized_red(frame: &Frame) -> Option<f64> {
        let (xs, ys) = Self::sampling_region(frame.width(), frame.height())?;

        let mut sums = [0_u64; 3];
        let mut count = 0_u64;
        for y in ys {
            for pixel in &frame.row(y)[xs.start as usize..xs.end as usize] {
                for (sum, &value) in sums.iter_mut().zip(pixel) {
                    *sum += u64::from(value);
                }
                count += 1;
            }
        }

        if count == 0 {
            return None;
        }

        let [red, green, blue] = sums.map(|sum| sum as f64 / count as f64);
        let total = red + green + blue;
        Some(if total > 0.0 { red / total } else { 0.0 })
    }

    /// Square of half-width `min(w, h) / 4` around the frame center, clamped
    /// so the last row and column are never sampled.
    fn sampling_region(width: u32, height: u32) -> Option<(Range<u32>, Range<u32>)> {
        let max_x = width.checked_sub(1)?;
        let max_y = height.checked_sub(1)?;

        let radius = width.min(height) / 4;
        let (cx, cy) = (width / 2, height / 2);

        let xs = cx.saturating_sub(radius)..(cx + radius).min(max_x);
        let ys = cy.saturating_sub(radius)..(cy + radius).min(max_y);
        Some((xs, ys))
    }
}
