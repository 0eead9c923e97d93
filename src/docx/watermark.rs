//! Watermark treatment for the page header image
//!
//! Decodes the header artwork, optionally resizes it to the printable
//! width and scales the alpha channel down so the image sits behind the
//! text as a translucent watermark. The result is re-encoded as PNG,
//! which keeps the alpha channel intact inside the document package.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat};

/// Pixels per inch used when resizing for the printable width.
pub const RENDER_DPI: u32 = 96;

/// Pixel width matching a printable width in inches.
pub fn print_width_px(inches: f32) -> u32 {
    (inches * RENDER_DPI as f32).round() as u32
}

/// Apply opacity (and an optional resize to `target_width`) to an encoded
/// image, returning PNG bytes.
pub fn apply_opacity(
    bytes: &[u8],
    opacity: f32,
    target_width: Option<u32>,
) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;

    let img = match target_width {
        Some(width) if width > 0 && img.width() != width => {
            let height = (width as f64 * img.height() as f64 / img.width() as f64)
                .round()
                .max(1.0) as u32;
            img.resize_exact(width, height, FilterType::Lanczos3)
        }
        _ => img,
    };

    let opacity = opacity.clamp(0.0, 1.0);
    let mut rgba = img.to_rgba8();
    for pixel in rgba.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
    }

    let mut out = Vec::new();
    DynamicImage::ImageRgba8(rgba).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn opaque_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let out = apply_opacity(&opaque_png(20, 10), 0.5, None).unwrap();
        let img = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0)[3], 128);
    }

    #[test]
    fn test_resize_to_target_width() {
        let out = apply_opacity(&opaque_png(100, 40), 1.0, Some(50)).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (50, 20));
    }

    #[test]
    fn test_opacity_is_clamped() {
        let out = apply_opacity(&opaque_png(4, 4), 3.0, None).unwrap();
        let img = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_print_width() {
        assert_eq!(print_width_px(7.5), 720);
        assert_eq!(print_width_px(1.0), 96);
    }
}
