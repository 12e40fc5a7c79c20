use std::path::PathBuf;

use clap::Parser;

/// Step through plate images with their character annotations drawn on top.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "plate-inspector", version, about)]
pub struct Args {
    /// Folder of .jpg/.jpeg/.png images
    #[arg(default_value = "images")]
    pub image_dir: PathBuf,

    /// Folder of YOLO label files, paired with images by base name
    #[arg(default_value = "labels")]
    pub label_dir: PathBuf,
}
