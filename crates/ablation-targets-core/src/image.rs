use serde::{Deserialize, Serialize};

/// Errors raised when wrapping raw pixel buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}

fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize, ImageError> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(ImageError::InvalidDimensions { width, height })
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl GrayImageView<'_> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

/// Single-channel 8-bit image. Binary masks use the values `{0, 255}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }

    /// Number of non-zero pixels.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// Interleaved 3-channel 8-bit image in RGB order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // row-major, len = w*h*3
}

impl RgbImage {
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = checked_len(width, height, 3)?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Replicate a gray image into three channels.
    pub fn from_gray(gray: &GrayImageView<'_>) -> Self {
        let mut data = Vec::with_capacity(gray.data.len() * 3);
        for &v in gray.data {
            data.extend_from_slice(&[v, v, v]);
        }
        Self {
            width: gray.width,
            height: gray.height,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Luma conversion with the BT.601 weights in 14-bit fixed point.
    pub fn to_gray(&self) -> GrayImage {
        const R: u32 = 4899;
        const G: u32 = 9617;
        const B: u32 = 1868;
        const ROUND: u32 = 1 << 13;
        let data = self
            .data
            .chunks_exact(3)
            .map(|p| ((R * p[0] as u32 + G * p[1] as u32 + B * p[2] as u32 + ROUND) >> 14) as u8)
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Source micrograph: grayscale or 3-channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Image {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Image {
    pub fn width(&self) -> usize {
        match self {
            Image::Gray(g) => g.width,
            Image::Rgb(c) => c.width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Image::Gray(g) => g.height,
            Image::Rgb(c) => c.height,
        }
    }

    pub fn to_gray(&self) -> GrayImage {
        match self {
            Image::Gray(g) => g.clone(),
            Image::Rgb(c) => c.to_gray(),
        }
    }

    pub fn to_rgb(&self) -> RgbImage {
        match self {
            Image::Gray(g) => RgbImage::from_gray(&g.view()),
            Image::Rgb(c) => c.clone(),
        }
    }
}

impl From<GrayImage> for Image {
    fn from(value: GrayImage) -> Self {
        Image::Gray(value)
    }
}

impl From<RgbImage> for Image {
    fn from(value: RgbImage) -> Self {
        Image::Rgb(value)
    }
}

/// Single-channel float image (distance maps and their dilations).
#[derive(Clone, Debug, PartialEq)]
pub struct FloatImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl FloatImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = GrayImage::from_vec(4, 3, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            ImageError::InvalidBuffer {
                expected: 12,
                got: 11
            }
        );
        assert!(RgbImage::from_vec(2, 2, vec![0; 12]).is_ok());
    }

    #[test]
    fn gray_conversion_keeps_neutral_tones() {
        let img = RgbImage::filled(3, 2, [200, 200, 200]);
        let g = img.to_gray();
        assert!(g.data.iter().all(|&v| v == 200));

        let white = RgbImage::filled(1, 1, [255, 255, 255]).to_gray();
        assert_eq!(white.data[0], 255);
    }
}
