use image::{ColorType, DynamicImage, RgbImage};
use ndarray::ArrayView3;

/// Color mode of the upload as decoded, before any conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceColorMode {
    Rgb,
    Rgba,
    Other,
}

/// An upload decoded to an owned RGB8 buffer. Alpha is dropped during
/// conversion but the source color mode is kept so the gate can still
/// reject inputs that were never RGB to begin with.
///
/// Never mutated after creation; the gate and the preprocessor only read it.
pub struct DecodedImage {
    pixels: RgbImage,
    source_mode: SourceColorMode,
}

impl DecodedImage {
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let source_mode = match image.color() {
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => SourceColorMode::Rgb,
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => SourceColorMode::Rgba,
            _ => SourceColorMode::Other,
        };
        Self {
            pixels: image.to_rgb8(),
            source_mode,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn source_mode(&self) -> SourceColorMode {
        self.source_mode
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    /// View of the buffer as a (height, width, 3) array of u8 samples.
    pub fn pixel_view(&self) -> ArrayView3<'_, u8> {
        let (h, w) = (self.pixels.height() as usize, self.pixels.width() as usize);
        // RgbImage stores exactly h*w*3 contiguous samples, so the reshape
        // cannot fail.
        ArrayView3::from_shape((h, w, 3), self.pixels.as_raw())
            .expect("RGB8 buffer matches (h, w, 3)")
    }

    #[cfg(test)]
    pub(crate) fn from_parts(pixels: RgbImage, source_mode: SourceColorMode) -> Self {
        Self {
            pixels,
            source_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rgba_input_drops_alpha_and_records_mode() {
        let rgba = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 128]));
        let decoded = DecodedImage::from_dynamic(DynamicImage::ImageRgba8(rgba));
        assert_eq!(decoded.source_mode(), SourceColorMode::Rgba);
        assert_eq!(decoded.as_rgb().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn luma_input_is_flagged_as_other() {
        let gray = image::GrayImage::from_pixel(4, 4, image::Luma([77]));
        let decoded = DecodedImage::from_dynamic(DynamicImage::ImageLuma8(gray));
        assert_eq!(decoded.source_mode(), SourceColorMode::Other);
    }

    #[test]
    fn pixel_view_is_row_major_hwc() {
        let mut img = RgbImage::from_pixel(2, 3, Rgb([0, 0, 0]));
        img.put_pixel(1, 2, Rgb([9, 8, 7]));
        let decoded = DecodedImage::from_dynamic(DynamicImage::ImageRgb8(img));
        let view = decoded.pixel_view();
        assert_eq!(view.dim(), (3, 2, 3));
        assert_eq!(view[(2, 1, 0)], 9);
        assert_eq!(view[(2, 1, 2)], 7);
    }
}
