use std::path::Path;

use image::{ImageReader, Limits, RgbImage};

use crate::CodecError;

pub type Rgb = [u8; 3];

/// Decoded color frame, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Frame {
    /// Largest width or height accepted when decoding.
    pub const MAX_DIMENSION: u32 = 8192;

    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, CodecError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(CodecError::InvalidDimensions { width, height })?;

        if pixels.len() != expected {
            return Err(CodecError::FrameSizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgb,
    {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();

        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Pixels of row `y`, or an empty slice when out of bounds.
    pub fn row(&self, y: u32) -> &[Rgb] {
        if y >= self.height {
            return &[];
        }
        let width = self.width as usize;
        let start = y as usize * width;
        &self.pixels[start..start + width]
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Decodes any format `image` recognizes, sniffing the content before
    /// trusting the extension. Headers claiming more than
    /// [`Frame::MAX_DIMENSION`] on either side are rejected before any pixel
    /// buffer is allocated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let mut limits = Limits::default();
        limits.max_image_width = Some(Self::MAX_DIMENSION);
        limits.max_image_height = Some(Self::MAX_DIMENSION);

        let mut reader = ImageReader::open(path)?.with_guessed_format()?;
        reader.limits(limits);
        Ok(Self::from(reader.decode()?.to_rgb8()))
    }

    /// Encodes in the format implied by the extension of `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        self.to_rgb_image().save(path)?;
        Ok(())
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let width = self.width as usize;
        RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(self.pixels[y as usize * width + x as usize])
        })
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().map(|pixel| pixel.0).collect(),
        }
    }
}
