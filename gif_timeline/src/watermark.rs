//! Text watermark stamping over frame bitmaps

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{DynamicImage, Rgba, RgbaImage};
use rayon::prelude::*;

use crate::errors::WatermarkError;

/// Something that can draw a text label onto an image
pub trait Stamp: Sync {
    fn stamp(&self, image: &DynamicImage, text: &str) -> Result<DynamicImage, WatermarkError>;
}

/// Stamp `text` onto every image in parallel.
///
/// The result has the same length and order as the input. An image that
/// cannot be stamped is passed through unchanged.
pub fn stamp_all<S: Stamp>(stamper: &S, images: Vec<DynamicImage>, text: &str) -> Vec<DynamicImage> {
    images
        .into_par_iter()
        .enumerate()
        .map(|(index, image)| match stamper.stamp(&image, text) {
            Ok(stamped) => stamped,
            Err(e) => {
                log::warn!("Skipping watermark on image {}: {}", index, e);
                image
            }
        })
        .collect()
}

/// Draws a label into the bottom-right corner using a TrueType/OpenType font
pub struct TextWatermark {
    font: FontVec,
    scale: PxScale,
    color: Rgba<u8>,
    margin: u32,
}

impl TextWatermark {
    /// Create from raw font file bytes
    pub fn new(font_data: Vec<u8>, px_size: f32) -> Result<Self, WatermarkError> {
        let font = FontVec::try_from_vec(font_data).map_err(|_| WatermarkError::InvalidFont)?;
        Ok(Self {
            font,
            scale: PxScale::from(px_size),
            color: Rgba([255, 255, 255, 200]),
            margin: 4,
        })
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Size of the rendered label in pixels
    pub fn measure(&self, text: &str) -> (u32, u32) {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        (width.ceil() as u32, scaled.height().ceil() as u32)
    }
}

impl Stamp for TextWatermark {
    fn stamp(&self, image: &DynamicImage, text: &str) -> Result<DynamicImage, WatermarkError> {
        let mut canvas = image.to_rgba8();
        if text.is_empty() {
            return Ok(DynamicImage::ImageRgba8(canvas));
        }

        let (label_width, label_height) = self.measure(text);
        let (width, height) = canvas.dimensions();
        let too_large = WatermarkError::LabelTooLarge {
            label_width,
            label_height,
            width,
            height,
        };

        let (Some(origin_x), Some(origin_y)) = (
            corner_offset(width, label_width, self.margin),
            corner_offset(height, label_height, self.margin),
        ) else {
            return Err(too_large);
        };
        let (origin_x, origin_y) = (origin_x as f32, origin_y as f32);

        let scaled = self.font.as_scaled(self.scale);
        let baseline = origin_y + scaled.ascent();
        let mut caret = origin_x;
        let mut previous = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(self.scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else { continue };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                blend_at(&mut canvas, x, y, self.color, coverage);
            });
        }

        Ok(DynamicImage::ImageRgba8(canvas))
    }
}

/// Start of a label of `extent` pixels placed `margin` pixels from the far
/// edge, or `None` if label and margins on both sides do not fit
fn corner_offset(size: u32, extent: u32, margin: u32) -> Option<u32> {
    let needed = margin.checked_mul(2)?.checked_add(extent)?;
    if needed > size {
        return None;
    }
    Some(size - margin - extent)
}

fn blend_at(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    blend_pixel(canvas.get_pixel_mut(x as u32, y as u32), color, coverage);
}

/// Source-over blend of `color` weighted by glyph `coverage` (0..=1)
pub fn blend_pixel(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let src_alpha = coverage.clamp(0.0, 1.0) * (color[3] as f32 / 255.0);
    if src_alpha <= 0.0 {
        return;
    }

    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    for channel in 0..3 {
        let src = color[channel] as f32 * src_alpha;
        let below = dst[channel] as f32 * dst_alpha * (1.0 - src_alpha);
        dst[channel] = ((src + below) / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_alpha * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inverts images that are wider than 1 pixel, fails on the rest
    struct InvertWide;

    impl Stamp for InvertWide {
        fn stamp(&self, image: &DynamicImage, _text: &str) -> Result<DynamicImage, WatermarkError> {
            if image.width() <= 1 {
                return Err(WatermarkError::LabelTooLarge {
                    label_width: 2,
                    label_height: 2,
                    width: image.width(),
                    height: image.height(),
                });
            }
            let mut inverted = image.clone();
            inverted.invert();
            Ok(inverted)
        }
    }

    fn solid(width: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, 1, Rgba([value, value, value, 255])))
    }

    #[test]
    fn test_stamp_all_keeps_length_and_order() {
        let images = vec![solid(2, 10), solid(1, 20), solid(3, 30)];
        let stamped = stamp_all(&InvertWide, images, "label");

        assert_eq!(stamped.len(), 3);
        assert_eq!(stamped[0].to_rgba8().get_pixel(0, 0)[0], 245);
        // Failed image passes through unchanged
        assert_eq!(stamped[1].to_rgba8().get_pixel(0, 0)[0], 20);
        assert_eq!(stamped[2].to_rgba8().get_pixel(0, 0)[0], 225);
    }

    #[test]
    fn test_blend_full_coverage() {
        let mut pixel = Rgba([0, 0, 0, 255]);
        blend_pixel(&mut pixel, Rgba([255, 255, 255, 255]), 1.0);
        assert_eq!(pixel, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_blend_partial_coverage() {
        let mut pixel = Rgba([0, 0, 0, 255]);
        blend_pixel(&mut pixel, Rgba([200, 100, 0, 255]), 0.5);
        assert_eq!(pixel, Rgba([100, 50, 0, 255]));
    }

    #[test]
    fn test_blend_zero_coverage() {
        let mut pixel = Rgba([10, 20, 30, 40]);
        blend_pixel(&mut pixel, Rgba([255, 255, 255, 255]), 0.0);
        assert_eq!(pixel, Rgba([10, 20, 30, 40]));
    }

    #[test]
    fn test_blend_onto_transparent_keeps_label_color() {
        let mut pixel = Rgba([0, 0, 0, 0]);
        blend_pixel(&mut pixel, Rgba([200, 100, 50, 255]), 0.5);
        assert_eq!(pixel, Rgba([200, 100, 50, 128]));
    }

    #[test]
    fn test_blend_over_translucent() {
        let mut pixel = Rgba([0, 0, 0, 51]);
        blend_pixel(&mut pixel, Rgba([200, 200, 200, 255]), 0.5);
        // 100 of label over 0.1 of black, total alpha 0.6
        assert_eq!(pixel[0], 167);
        assert_eq!(pixel[3], 153);
    }

    #[test]
    fn test_corner_offset() {
        assert_eq!(corner_offset(64, 20, 4), Some(40));
        assert_eq!(corner_offset(28, 20, 4), Some(4));
        assert_eq!(corner_offset(27, 20, 4), None);
        assert_eq!(corner_offset(64, 20, u32::MAX / 2 + 1), None);
        assert_eq!(corner_offset(64, u32::MAX, 1), None);
    }

    const FONT: &[u8] = include_bytes!("../tests/fonts/DejaVuSans.ttf");

    fn black(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
    }

    #[test]
    fn test_label_drawn_in_bottom_right() {
        let watermark = TextWatermark::new(FONT.to_vec(), 12.0).unwrap();
        let original = black(64, 64);
        let stamped = watermark.stamp(&original, "Hi").unwrap().to_rgba8();

        let changed: Vec<(u32, u32)> = original
            .to_rgba8()
            .enumerate_pixels()
            .filter(|(x, y, pixel)| stamped.get_pixel(*x, *y) != *pixel)
            .map(|(x, y, _)| (x, y))
            .collect();

        assert!(!changed.is_empty());
        assert!(changed.iter().all(|&(x, y)| x >= 32 && y >= 32));
        assert!(changed.iter().all(|&(x, y)| x < 64 - 4 + 1 && y < 64 - 4 + 1));
    }

    #[test]
    fn test_label_too_large() {
        let watermark = TextWatermark::new(FONT.to_vec(), 12.0).unwrap();
        let result = watermark.stamp(&black(16, 16), "Watermark");
        assert!(matches!(result, Err(WatermarkError::LabelTooLarge { width: 16, height: 16, .. })));
    }

    #[test]
    fn test_empty_label_leaves_image_unchanged() {
        let watermark = TextWatermark::new(FONT.to_vec(), 12.0).unwrap();
        let original = black(8, 8);
        assert_eq!(watermark.stamp(&original, "").unwrap(), original);
    }

    #[test]
    fn test_huge_margin_skips_image() {
        let watermark = TextWatermark::new(FONT.to_vec(), 12.0)
            .unwrap()
            .with_margin(u32::MAX / 2 + 1);
        let original = black(64, 64);

        let result = watermark.stamp(&original, "hi");
        assert!(matches!(result, Err(WatermarkError::LabelTooLarge { .. })));

        let stamped = stamp_all(&watermark, vec![original.clone()], "hi");
        assert_eq!(stamped, vec![original]);
    }

    #[test]
    fn test_invalid_font() {
        let result = TextWatermark::new(b"not a font".to_vec(), 12.0);
        assert!(matches!(result, Err(WatermarkError::InvalidFont)));
    }
}
