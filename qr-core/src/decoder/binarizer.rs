use crate::decoder::pixel_source::PixelSource;
use crate::error::QrDecodeError;

/// A binarized view of a scanned image: one dark/light bit per pixel.
pub struct BinaryImage {
    width: u32,
    height: u32,
    dark: Vec<bool>,
}

impl BinaryImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        self.dark[(y * self.width + x) as usize]
    }

    /// Converts a pixel source to dark/light using a single global
    /// threshold: the midpoint between the darkest and lightest luminance
    /// values seen in the image. A scanned symbol always has both a
    /// quiet zone (light) and ink (dark), so a flat image — `min == max` —
    /// means nothing resembling a symbol was captured.
    pub fn binarize(src: &dyn PixelSource) -> Result<Self, QrDecodeError> {
        let width = src.width();
        let height = src.height();
        if width == 0 || height == 0 {
            return Err(QrDecodeError::InvalidInputFormat(format!("{}x{} image", width, height)));
        }

        let mut luminance = Vec::with_capacity((width * height) as usize);
        let mut min = 255u8;
        let mut max = 0u8;
        for y in 0..height {
            for x in 0..width {
                let (b, g, r) = src.pixel_bgr(x, y);
                let l = luminance_of(r, g, b);
                min = min.min(l);
                max = max.max(l);
                luminance.push(l);
            }
        }

        if min == max {
            return Err(QrDecodeError::UniformImage);
        }

        let threshold = (u32::from(min) + u32::from(max)) / 2;
        let dark = luminance.into_iter().map(|l| u32::from(l) <= threshold).collect();
        Ok(Self { width, height, dark })
    }
}

fn luminance_of(r: u8, g: u8, b: u8) -> u8 {
    ((30 * u32::from(b) + 59 * u32::from(g) + 11 * u32::from(r)) / 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::pixel_source::RawBgrImage;

    #[test]
    fn uniform_white_image_is_rejected() {
        let img = RawBgrImage::new(4, 4, vec![255u8; 4 * 4 * 3]);
        assert!(matches!(BinaryImage::binarize(&img), Err(QrDecodeError::UniformImage)));
    }

    #[test]
    fn half_black_half_white_splits_at_midpoint() {
        let mut data = vec![255u8; 4 * 4 * 3];
        for px in 0..8 {
            data[px * 3] = 0;
            data[px * 3 + 1] = 0;
            data[px * 3 + 2] = 0;
        }
        let img = RawBgrImage::new(4, 4, data);
        let bin = BinaryImage::binarize(&img).unwrap();
        assert!(bin.is_dark(0, 0));
        assert!(!bin.is_dark(0, 2));
    }
}
