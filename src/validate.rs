use std::fmt;

use crate::error::CurError;

/// Largest width or height a cursor entry can describe. The directory entry
/// stores dimensions in one byte each, with 0 standing for 256.
pub const MAX_DIMENSION: u32 = 256;

/// Pixel layout of the embedded image, as reported by the PNG header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorModel {
    /// 8-bit RGBA, straight alpha
    Rgba,
    /// 8-bit RGBA, premultiplied alpha. PNG always stores straight alpha, so
    /// only callers handing in payloads from other encoders use this.
    #[allow(dead_code)]
    PremultipliedRgba,
    /// 16-bit RGBA
    Rgba64,
    Rgb,
    Rgb48,
    Gray,
    Gray16,
    GrayAlpha,
    GrayAlpha32,
    /// Palette based
    Indexed,
}

impl ColorModel {
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            ColorModel::Rgba
                | ColorModel::PremultipliedRgba
                | ColorModel::Rgba64
                | ColorModel::GrayAlpha
                | ColorModel::GrayAlpha32
        )
    }

    /// Maps the color type and bit depth from a PNG IHDR chunk. Palette images
    /// stay `Indexed` even when a tRNS chunk gives them transparency.
    pub fn from_png(color_type: png::ColorType, bit_depth: png::BitDepth) -> Self {
        use png::BitDepth::Sixteen;
        match (color_type, bit_depth) {
            (png::ColorType::Rgba, Sixteen) => ColorModel::Rgba64,
            (png::ColorType::Rgba, _) => ColorModel::Rgba,
            (png::ColorType::Rgb, Sixteen) => ColorModel::Rgb48,
            (png::ColorType::Rgb, _) => ColorModel::Rgb,
            (png::ColorType::Grayscale, Sixteen) => ColorModel::Gray16,
            (png::ColorType::Grayscale, _) => ColorModel::Gray,
            (png::ColorType::GrayscaleAlpha, Sixteen) => ColorModel::GrayAlpha32,
            (png::ColorType::GrayscaleAlpha, _) => ColorModel::GrayAlpha,
            (png::ColorType::Indexed, _) => ColorModel::Indexed,
        }
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorModel::Rgba => "RGBA",
            ColorModel::PremultipliedRgba => "premultiplied RGBA",
            ColorModel::Rgba64 => "RGBA (16 bits per channel)",
            ColorModel::Rgb => "RGB",
            ColorModel::Rgb48 => "RGB (16 bits per channel)",
            ColorModel::Gray => "grayscale",
            ColorModel::Gray16 => "grayscale (16 bits)",
            ColorModel::GrayAlpha => "grayscale with alpha",
            ColorModel::GrayAlpha32 => "grayscale with alpha (16 bits per channel)",
            ColorModel::Indexed => "indexed palette",
        };
        f.write_str(name)
    }
}

/// Checks that an image can be wrapped in a cursor file before anything is
/// written.
pub fn validate(width: u32, height: u32, color_model: ColorModel) -> Result<(), CurError> {
    if width == 0 || height == 0 {
        return Err(CurError::DimensionOutOfRange { width, height });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CurError::DimensionTooLarge {
            width,
            height,
            max: MAX_DIMENSION,
        });
    }
    match color_model {
        ColorModel::Rgba | ColorModel::PremultipliedRgba => Ok(()),
        other => Err(CurError::UnsupportedColorModel(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_rgba_up_to_256() {
        assert!(validate(1, 1, ColorModel::Rgba).is_ok());
        assert!(validate(32, 32, ColorModel::Rgba).is_ok());
        assert!(validate(256, 256, ColorModel::PremultipliedRgba).is_ok());
        assert!(validate(256, 1, ColorModel::Rgba).is_ok());
    }

    #[test]
    fn test_rejects_large_dimensions() {
        assert!(matches!(
            validate(300, 10, ColorModel::Rgba),
            Err(CurError::DimensionTooLarge { width: 300, height: 10, max: 256 })
        ));
        assert!(matches!(
            validate(10, 257, ColorModel::Indexed),
            Err(CurError::DimensionTooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(matches!(
            validate(0, 10, ColorModel::Rgba),
            Err(CurError::DimensionOutOfRange { width: 0, height: 10 })
        ));
        assert!(matches!(
            validate(10, 0, ColorModel::Rgba),
            Err(CurError::DimensionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_color_models_without_rgba() {
        for model in [
            ColorModel::Indexed,
            ColorModel::Rgb,
            ColorModel::Gray,
            ColorModel::GrayAlpha,
            ColorModel::Rgba64,
        ] {
            match validate(10, 10, model) {
                Err(CurError::UnsupportedColorModel(found)) => assert_eq!(found, model),
                other => panic!("expected UnsupportedColorModel for {model}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_png_color_type_mapping() {
        use png::{BitDepth, ColorType};

        assert_eq!(ColorModel::from_png(ColorType::Rgba, BitDepth::Eight), ColorModel::Rgba);
        assert_eq!(ColorModel::from_png(ColorType::Rgba, BitDepth::Sixteen), ColorModel::Rgba64);
        assert_eq!(ColorModel::from_png(ColorType::Grayscale, BitDepth::Four), ColorModel::Gray);
        assert_eq!(ColorModel::from_png(ColorType::Indexed, BitDepth::Eight), ColorModel::Indexed);
        assert_eq!(ColorModel::from_png(ColorType::Indexed, BitDepth::One), ColorModel::Indexed);
        assert!(ColorModel::GrayAlpha.has_alpha());
        assert!(!ColorModel::Indexed.has_alpha());
    }
}
