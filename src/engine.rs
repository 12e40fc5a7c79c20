use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Result;
use glob::{MatchOptions, Pattern, glob_with};
use image::RgbImage;
use log::{debug, info, warn};

use crate::annotation::AnnotationSet;
use crate::error::OverlayError;
use crate::overlay;

const IMAGE_PATTERNS: [&str; 3] = ["*.jpg", "*.jpeg", "*.png"];

/// Overall verdict for one plate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlateStatus {
    Intact,
    Broken,
    /// No label file, or the image could not be decoded.
    Unknown,
}

impl PlateStatus {
    /// Broken as soon as a single broken character is seen; an image with
    /// no annotations at all counts as intact.
    pub fn from_counts(broken_count: usize) -> Self {
        if broken_count > 0 { PlateStatus::Broken } else { PlateStatus::Intact }
    }
}

impl fmt::Display for PlateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlateStatus::Intact => "Intact",
            PlateStatus::Broken => "Broken",
            PlateStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// An image found by [`scan_folder`]. Pixels are decoded on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRecord {
    pub path: PathBuf,
}

impl ImageRecord {
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

    /// `<label_dir>/<image stem>.txt`
    pub fn label_path(&self, label_dir: &Path) -> PathBuf {
        let mut name = self.path.file_stem().unwrap_or_default().to_os_string();
        name.push(".txt");
        label_dir.join(name)
    }

    pub fn classify(&self, label_dir: &Path) -> Result<ResultRecord, OverlayError> {
        load_and_classify(&self.path, &self.label_path(label_dir))
    }
}

/// Everything the viewer needs to show one image.
#[derive(Clone, Debug)]
pub struct ResultRecord {
    pub filename: String,
    pub intact_count: usize,
    pub broken_count: usize,
    pub status: PlateStatus,
    pub image: RgbImage,
}

/// One line of the summary table; a [`ResultRecord`] without its pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryRow {
    pub filename: String,
    pub intact_count: usize,
    pub broken_count: usize,
    pub status: PlateStatus,
    pub readable: bool,
}

impl From<&ResultRecord> for SummaryRow {
    fn from(r: &ResultRecord) -> Self {
        SummaryRow {
            filename: r.filename.clone(),
            intact_count: r.intact_count,
            broken_count: r.broken_count,
            status: r.status,
            readable: true,
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn decode_rgb(path: &Path) -> Result<RgbImage, OverlayError> {
    let unreadable = |source: image::ImageError| OverlayError::ImageUnreadable { path: path.to_path_buf(), source };
    let reader = image::io::Reader::open(path)
        .map_err(|e| unreadable(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| unreadable(image::ImageError::IoError(e)))?;
    let dynimg = reader.decode().map_err(unreadable)?;
    Ok(dynimg.to_rgb8())
}

/// Decodes `image_path`, draws the boxes from `label_path` onto it and
/// tallies the character classes.
///
/// Only an undecodable image is an error. A missing label file yields an
/// undecorated image with [`PlateStatus::Unknown`]; malformed lines are
/// skipped.
pub fn load_and_classify(image_path: &Path, label_path: &Path) -> Result<ResultRecord, OverlayError> {
    let mut image = decode_rgb(image_path)?;
    let filename = file_name_of(image_path);

    if !label_path.exists() {
        debug!("{}: no label file at {}", filename, label_path.display());
        return Ok(ResultRecord {
            filename,
            intact_count: 0,
            broken_count: 0,
            status: PlateStatus::Unknown,
            image,
        });
    }

    let set = match File::open(label_path) {
        Ok(file) => AnnotationSet::from_reader(BufReader::new(file)),
        Err(e) => {
            warn!("{}: cannot open {}: {}", filename, label_path.display(), e);
            AnnotationSet::default()
        }
    };
    debug!("{}: {} annotation(s)", filename, set.len());
    if set.skipped_lines > 0 {
        info!("{}: skipped {} malformed label line(s)", filename, set.skipped_lines);
    }

    let (width, height) = image.dimensions();
    for a in &set.annotations {
        overlay::draw_annotation(&mut image, a.to_pixels(width, height), a.class);
    }

    let intact_count = set.intact_count();
    let broken_count = set.broken_count();
    Ok(ResultRecord {
        filename,
        intact_count,
        broken_count,
        status: PlateStatus::from_counts(broken_count),
        image,
    })
}

/// Lists the .jpg/.jpeg/.png files directly inside `dir`, extension
/// matched case-insensitively, sorted by file name.
pub fn scan_folder(dir: &Path) -> Result<Vec<ImageRecord>> {
    if !dir.is_dir() {
        warn!("image folder {} does not exist", dir.display());
        return Ok(vec![]);
    }
    let options = MatchOptions { case_sensitive: false, ..MatchOptions::new() };
    let escaped_dir = Pattern::escape(&dir.to_string_lossy());
    let mut imgs = vec![];
    for pat in IMAGE_PATTERNS.iter() {
        let globpat = Path::new(&escaped_dir).join(pat).to_string_lossy().to_string();
        for entry in glob_with(&globpat, options)? {
            match entry {
                Ok(p) if p.is_file() => imgs.push(ImageRecord { path: p }),
                Ok(_) => {}
                Err(e) => warn!("skipping unreadable entry: {}", e),
            }
        }
    }
    imgs.sort_by_key(|r| r.file_name());
    info!("found {} image(s) in {}", imgs.len(), dir.display());
    Ok(imgs)
}

/// Classifies every record for the summary table. Unreadable images get a
/// row with zero counts and `Unknown` status instead of stopping the run.
pub fn summarize(records: &[ImageRecord], label_dir: &Path) -> Vec<SummaryRow> {
    records
        .iter()
        .map(|rec| match rec.classify(label_dir) {
            Ok(result) => SummaryRow::from(&result),
            Err(e) => {
                warn!("{}", e);
                SummaryRow {
                    filename: rec.file_name(),
                    intact_count: 0,
                    broken_count: 0,
                    status: PlateStatus::Unknown,
                    readable: false,
                }
            }
        })
        .collect()
}
