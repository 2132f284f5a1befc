use std::{io::Read, path::Path};

use csv::{Reader, ReaderBuilder, Trim};
use rand::Rng;

use crate::CodecError;

fn axis_reader() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true).trim(Trim::All);
    builder
}

/// First column of every record that holds a number. Headers, blank lines
/// and other text are skipped.
fn read_axis<R: Read>(mut reader: Reader<R>) -> Vec<f32> {
    reader
        .records()
        .filter_map(Result::ok)
        .filter_map(|record| record.get(0)?.parse::<f32>().ok())
        .collect()
}

/// Parses a single-column recording, one value per line.
pub fn parse_axis(text: &str) -> Vec<f32> {
    read_axis(axis_reader().from_reader(text.as_bytes()))
}

/// Three synchronized accelerometer axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccelerometerTrace {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

impl AccelerometerTrace {
    pub fn new(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        Self { x, y, z }
    }

    pub fn from_files(
        x: impl AsRef<Path>,
        y: impl AsRef<Path>,
        z: impl AsRef<Path>,
    ) -> Result<Self, CodecError> {
        let read = |path: &Path| -> Result<Vec<f32>, CodecError> {
            Ok(read_axis(axis_reader().from_path(path)?))
        };
        let trace = Self {
            x: read(x.as_ref())?,
            y: read(y.as_ref())?,
            z: read(z.as_ref())?,
        };

        debug!(
            "Loaded accelerometer trace: x={}, y={}, z={}",
            trace.x.len(),
            trace.y.len(),
            trace.z.len()
        );
        Ok(trace)
    }

    /// Synthetic chest motion: a slow sine on `x` with jitter on every axis.
    pub fn simulated<R: Rng>(rng: &mut R, len: usize) -> Self {
        let mut trace = Self::default();
        for i in 0..len {
            let breathing = (i as f32 * 0.1).sin() * 0.5;
            trace.x.push(breathing + rng.random_range(-0.1_f32..0.1));
            trace.y.push(rng.random_range(-0.15..0.15));
            trace.z.push(rng.random_range(-0.15..0.15));
        }
        trace
    }

    /// Number of complete `(x, y, z)` samples.
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len()).min(self.z.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn samples(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| [x, y, z])
    }
}
