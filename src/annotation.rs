use std::io::BufRead;

use log::{debug, warn};

/// Detection classes found in the label files.
///
/// Ids outside 0..=2 map to `Unknown`: they are still drawn, in their own
/// color, but never counted toward the plate status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlateClass {
    Plate,
    CharacterIntact,
    CharacterBroken,
    Unknown,
}

impl PlateClass {
    pub fn from_id(id: i64) -> Self {
        match id {
            0 => PlateClass::Plate,
            1 => PlateClass::CharacterIntact,
            2 => PlateClass::CharacterBroken,
            _ => PlateClass::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlateClass::Plate => "plate",
            PlateClass::CharacterIntact => "character intact",
            PlateClass::CharacterBroken => "character broken",
            PlateClass::Unknown => "unknown",
        }
    }

    /// Overlay color as RGB.
    pub fn color(self) -> [u8; 3] {
        match self {
            PlateClass::Plate => [0, 0, 255],
            PlateClass::CharacterIntact => [0, 255, 0],
            PlateClass::CharacterBroken => [255, 0, 0],
            PlateClass::Unknown => [255, 255, 0],
        }
    }
}

/// One YOLO-style record: class plus a box in normalized coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub class_id: i64,
    pub class: PlateClass,
    pub cx: f64, // center x (ratio 0..1)
    pub cy: f64, // center y (ratio)
    pub w: f64,  // width (ratio)
    pub h: f64,  // height (ratio)
}

/// Box corners in absolute pixels, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Annotation {
    /// Parses `class_id x_center y_center width height`.
    ///
    /// Returns `None` unless the line has exactly five finite numeric fields.
    pub fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 5 {
            return None;
        }
        let mut values = [0.0f64; 5];
        for (slot, token) in values.iter_mut().zip(&parts) {
            let v = token.parse::<f64>().ok()?;
            if !v.is_finite() {
                return None;
            }
            *slot = v;
        }
        let [cls, cx, cy, w, h] = values;
        // `as` truncates toward zero, so "1.9" is still class 1
        let class_id = cls as i64;
        Some(Annotation {
            class_id,
            class: PlateClass::from_id(class_id),
            cx,
            cy,
            w,
            h,
        })
    }

    /// Scales the normalized box to an image of `width` x `height` pixels.
    ///
    /// Corners are truncated toward zero after scaling, so overlays land on
    /// the same pixels for the same label file every time.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelBox {
        let cx = self.cx * width as f64;
        let cy = self.cy * height as f64;
        let bw = self.w * width as f64;
        let bh = self.h * height as f64;
        PixelBox {
            x1: (cx - bw / 2.0) as i32,
            y1: (cy - bh / 2.0) as i32,
            x2: (cx + bw / 2.0) as i32,
            y2: (cy + bh / 2.0) as i32,
        }
    }
}

/// Annotations belonging to a single image, in file order.
#[derive(Clone, Debug, Default)]
pub struct AnnotationSet {
    pub annotations: Vec<Annotation>,
    /// Lines dropped for having the wrong shape or non-numeric fields.
    pub skipped_lines: usize,
}

impl AnnotationSet {
    pub fn from_reader<R: BufRead>(reader: R) -> Self {
        let mut set = AnnotationSet::default();
        // Split on raw bytes so a line of invalid UTF-8 is just another
        // malformed line instead of ending the read.
        for (line_no, bytes) in reader.split(b'\n').enumerate() {
            let bytes = match bytes {
                Ok(b) => b,
                Err(e) => {
                    warn!("stopped reading labels at line {}: {}", line_no + 1, e);
                    break;
                }
            };
            let line = String::from_utf8_lossy(&bytes);
            if line.trim().is_empty() {
                continue;
            }
            match Annotation::parse_line(&line) {
                Some(a) => {
                    if a.class == PlateClass::Unknown {
                        debug!("line {}: unrecognized class id {}", line_no + 1, a.class_id);
                    }
                    set.annotations.push(a);
                }
                None => {
                    debug!("line {}: skipping malformed annotation {:?}", line_no + 1, line);
                    set.skipped_lines += 1;
                }
            }
        }
        set
    }

    pub fn intact_count(&self) -> usize {
        self.count_of(PlateClass::CharacterIntact)
    }

    pub fn broken_count(&self) -> usize {
        self.count_of(PlateClass::CharacterBroken)
    }

    pub fn count_of(&self, class: PlateClass) -> usize {
        self.annotations.iter().filter(|a| a.class == class).count()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_well_formed_line() {
        let a = Annotation::parse_line("1 0.3 0.4 0.1 0.2").unwrap();
        assert_eq!(a.class, PlateClass::CharacterIntact);
        assert_eq!(a.cx, 0.3);
        assert_eq!(a.h, 0.2);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!(Annotation::parse_line("garbage line").is_none());
        assert!(Annotation::parse_line("0 0.5 0.5 0.1").is_none());
        assert!(Annotation::parse_line("0 0.5 0.5 0.1 0.1 0.9").is_none());
        assert!(Annotation::parse_line("").is_none());
    }

    #[test]
    fn test_parse_rejects_non_numeric_fields() {
        assert!(Annotation::parse_line("a b c d e").is_none());
        assert!(Annotation::parse_line("1 0.5 x 0.1 0.1").is_none());
        assert!(Annotation::parse_line("1 nan 0.5 0.1 0.1").is_none());
        assert!(Annotation::parse_line("1 0.5 inf 0.1 0.1").is_none());
    }

    #[test]
    fn test_class_id_truncates_and_maps_unknown() {
        assert_eq!(Annotation::parse_line("2.0 0.5 0.5 0.1 0.1").unwrap().class, PlateClass::CharacterBroken);
        assert_eq!(Annotation::parse_line("1.9 0.5 0.5 0.1 0.1").unwrap().class, PlateClass::CharacterIntact);
        let a = Annotation::parse_line("7 0.5 0.5 0.1 0.1").unwrap();
        assert_eq!(a.class, PlateClass::Unknown);
        assert_eq!(a.class_id, 7);
        assert_eq!(Annotation::parse_line("-1 0.5 0.5 0.1 0.1").unwrap().class, PlateClass::Unknown);
    }

    #[test]
    fn test_pixel_box_from_normalized() {
        let a = Annotation::parse_line("0 0.5 0.5 0.2 0.1").unwrap();
        assert_eq!(a.to_pixels(100, 200), PixelBox { x1: 40, y1: 90, x2: 60, y2: 110 });

        let a = Annotation::parse_line("0 0.5 0.5 0.2 0.05").unwrap();
        assert_eq!(a.to_pixels(100, 200), PixelBox { x1: 40, y1: 95, x2: 60, y2: 105 });
    }

    #[test]
    fn test_pixel_box_truncates_toward_zero() {
        // 0.333 * 10 = 3.33, half width 0.5 -> 2.83 and 3.83
        let a = Annotation::parse_line("0 0.333 0.333 0.1 0.1").unwrap();
        assert_eq!(a.to_pixels(10, 10), PixelBox { x1: 2, y1: 2, x2: 3, y2: 3 });

        // box hanging off the left edge: -0.5 truncates to 0, -1.5 to -1
        let a = Annotation::parse_line("0 0.0 0.0 0.1 0.3").unwrap();
        assert_eq!(a.to_pixels(10, 10), PixelBox { x1: 0, y1: -1, x2: 0, y2: 1 });
    }

    #[test]
    fn test_counts_skip_malformed_lines() {
        let text = "0 0.5 0.5 0.8 0.6\n1 0.3 0.4 0.1 0.1\n2 0.7 0.4 0.1 0.1\ngarbage line\n\n1 0.2 0.4 0.1 0.1\n";
        let set = AnnotationSet::from_reader(Cursor::new(text));
        assert_eq!(set.len(), 4);
        assert_eq!(set.skipped_lines, 1);
        assert_eq!(set.intact_count(), 2);
        assert_eq!(set.broken_count(), 1);
        assert_eq!(
            set.intact_count() + set.broken_count() + set.count_of(PlateClass::Plate),
            set.len()
        );
    }

    #[test]
    fn test_invalid_utf8_line_does_not_hide_later_lines() {
        let bytes: &[u8] = b"1 0.5 0.5 0.1 0.1\n\xff\xfe junk\n2 0.5 0.5 0.2 0.2\r\n\xff 0.5 0.5 0.1 0.1\n";
        let set = AnnotationSet::from_reader(Cursor::new(bytes));
        assert_eq!(set.intact_count(), 1);
        assert_eq!(set.broken_count(), 1);
        assert_eq!(set.skipped_lines, 2);
    }

    #[test]
    fn test_class_mapping_is_distinct() {
        let classes = [
            PlateClass::Plate,
            PlateClass::CharacterIntact,
            PlateClass::CharacterBroken,
            PlateClass::Unknown,
        ];
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                assert_ne!(a.color(), b.color());
                assert_ne!(a.label(), b.label());
            }
        }
    }
}
