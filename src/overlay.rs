use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::annotation::{PixelBox, PlateClass};

const LINE_THICKNESS: i32 = 2;
/// Gap between the top edge of a box and the baseline of its label.
const LABEL_OFFSET: i32 = 5;
const GLYPH_W: i32 = 5;
const GLYPH_H: i32 = 7;
const GLYPH_SCALE: i32 = 2;

/// Draws the outline and label for one annotation into `img`.
pub fn draw_annotation(img: &mut RgbImage, bbox: PixelBox, class: PlateClass) {
    let color = Rgb(class.color());
    draw_box(img, bbox, color);
    draw_label(img, bbox.x1, bbox.y1.saturating_sub(LABEL_OFFSET), class.label(), color);
}

/// Outlines `bbox` with both corners inclusive. Anything outside the image
/// is clipped.
pub fn draw_box(img: &mut RgbImage, bbox: PixelBox, color: Rgb<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let left = bbox.x1.min(bbox.x2) as i64;
    let right = bbox.x1.max(bbox.x2) as i64;
    let top = bbox.y1.min(bbox.y2) as i64;
    let bottom = bbox.y1.max(bbox.y2) as i64;

    for inset in 0..LINE_THICKNESS as i64 {
        let (l, t, r, b) = (left + inset, top + inset, right - inset, bottom - inset);
        if r < l || b < t {
            break;
        }
        // One pixel past each edge is invisible either way; clamping there
        // keeps the line rasterizer from walking absurd coordinates.
        let (l, r) = (l.clamp(-1, w), r.clamp(-1, w));
        let (t, b) = (t.clamp(-1, h), b.clamp(-1, h));
        let rect = Rect::at(l as i32, t as i32).of_size((r - l + 1) as u32, (b - t + 1) as u32);
        draw_hollow_rect_mut(img, rect, color);
    }
}

/// Writes `text` with its bottom-left corner at (`x`, `baseline`).
pub fn draw_label(img: &mut RgbImage, x: i32, baseline: i32, text: &str, color: Rgb<u8>) {
    let top = baseline.saturating_sub(GLYPH_H * GLYPH_SCALE - 1);
    let advance = (GLYPH_W + 1) * GLYPH_SCALE;
    for (i, ch) in text.chars().enumerate() {
        let gx = x + i as i32 * advance;
        if gx >= img.width() as i32 {
            break;
        }
        draw_glyph(img, gx, top, ch, color);
    }
}

fn draw_glyph(img: &mut RgbImage, x: i32, y: i32, ch: char, color: Rgb<u8>) {
    let rows = glyph(ch);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_W {
            if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                continue;
            }
            let px = x + col * GLYPH_SCALE;
            let py = y + row as i32 * GLYPH_SCALE;
            let cell = Rect::at(px, py).of_size(GLYPH_SCALE as u32, GLYPH_SCALE as u32);
            draw_filled_rect_mut(img, cell, color);
        }
    }
}

/// 5x7 bitmaps for the lowercase letters used by class labels.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'b' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110],
        'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'h' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'i' => [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
        'k' => [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
        'l' => [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'n' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'o' => [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'p' => [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'r' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        't' => [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
        'u' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101],
        'w' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010],
        ' ' => [0; 7],
        // anything else shows as an empty box
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

    #[test]
    fn test_box_corners_are_inclusive() {
        let mut img = RgbImage::new(100, 200);
        draw_box(&mut img, PixelBox { x1: 40, y1: 90, x2: 60, y2: 110 }, GREEN);
        assert_eq!(*img.get_pixel(40, 90), GREEN);
        assert_eq!(*img.get_pixel(60, 110), GREEN);
        assert_eq!(*img.get_pixel(60, 90), GREEN);
        assert_eq!(*img.get_pixel(40, 110), GREEN);
        // second line of the outline
        assert_eq!(*img.get_pixel(41, 100), GREEN);
        assert_eq!(*img.get_pixel(59, 100), GREEN);
        // outside and inside stay untouched
        assert_eq!(*img.get_pixel(39, 100), BLACK);
        assert_eq!(*img.get_pixel(61, 100), BLACK);
        assert_eq!(*img.get_pixel(50, 100), BLACK);
        assert_eq!(*img.get_pixel(42, 100), BLACK);
    }

    #[test]
    fn test_box_outside_image_is_clipped() {
        let mut img = RgbImage::new(20, 20);
        draw_box(&mut img, PixelBox { x1: -10, y1: -10, x2: 10, y2: 10 }, GREEN);
        assert_eq!(*img.get_pixel(10, 0), GREEN);
        assert_eq!(*img.get_pixel(0, 10), GREEN);
        assert_eq!(*img.get_pixel(0, 0), BLACK);

        // huge coordinates must not hang or panic
        draw_box(&mut img, PixelBox { x1: i32::MIN, y1: i32::MIN, x2: i32::MAX, y2: i32::MAX }, GREEN);
        draw_box(&mut img, PixelBox { x1: 500, y1: 500, x2: 600, y2: 600 }, GREEN);

        // saturated corners reach the label too
        let mut img = RgbImage::new(20, 20);
        draw_annotation(
            &mut img,
            PixelBox { x1: 5, y1: i32::MIN, x2: 15, y2: i32::MIN },
            PlateClass::CharacterBroken,
        );
        draw_annotation(
            &mut img,
            PixelBox { x1: i32::MIN, y1: i32::MIN, x2: i32::MAX, y2: i32::MAX },
            PlateClass::Plate,
        );
        draw_annotation(
            &mut img,
            PixelBox { x1: i32::MAX, y1: i32::MAX, x2: i32::MAX, y2: i32::MAX },
            PlateClass::Unknown,
        );
        draw_label(&mut img, 0, i32::MIN, "plate", GREEN);
    }

    #[test]
    fn test_degenerate_box_draws_single_pixel() {
        let mut img = RgbImage::new(10, 10);
        draw_box(&mut img, PixelBox { x1: 5, y1: 5, x2: 5, y2: 5 }, GREEN);
        assert_eq!(*img.get_pixel(5, 5), GREEN);
        assert_eq!(*img.get_pixel(6, 5), BLACK);
    }

    #[test]
    fn test_label_sits_above_box() {
        let mut img = RgbImage::new(300, 200);
        draw_annotation(
            &mut img,
            PixelBox { x1: 40, y1: 90, x2: 60, y2: 110 },
            PlateClass::CharacterIntact,
        );
        let baseline = 90 - LABEL_OFFSET;
        let top = baseline - GLYPH_H * GLYPH_SCALE + 1;
        let mut lit_in_band = 0;
        let mut lit_between = 0;
        for (x, y, p) in img.enumerate_pixels() {
            if *p != GREEN {
                continue;
            }
            let y = y as i32;
            if y >= top && y <= baseline && x >= 40 {
                lit_in_band += 1;
            } else if y > baseline && y < 90 {
                lit_between += 1;
            }
        }
        assert!(lit_in_band > 0);
        assert_eq!(lit_between, 0);
    }

    #[test]
    fn test_label_near_top_edge_is_clipped() {
        let mut img = RgbImage::new(50, 10);
        draw_label(&mut img, 0, 2, "plate", GREEN);
        draw_label(&mut img, -20, -30, "broken", GREEN);
    }

    #[test]
    fn test_every_label_glyph_is_defined() {
        let fallback = glyph('?');
        for class in [
            PlateClass::Plate,
            PlateClass::CharacterIntact,
            PlateClass::CharacterBroken,
            PlateClass::Unknown,
        ] {
            for ch in class.label().chars() {
                assert_ne!(glyph(ch), fallback, "missing glyph for {ch:?}");
            }
        }
    }
}
