use std::path::PathBuf;

use anyhow::Result;
use eframe::egui;
use egui::{Color32, Key, RichText, Vec2};
use log::{debug, info, warn};

use crate::config::Args;
use crate::engine::{self, ImageRecord, PlateStatus, ResultRecord, SummaryRow};
use crate::error::OverlayError;
use crate::navigation::Navigator;

const INTACT_TEXT: Color32 = Color32::from_rgb(0x39, 0xA2, 0xDB);
const BROKEN_TEXT: Color32 = Color32::from_rgb(0xDC, 0x35, 0x45);
const INTACT_ROW: Color32 = Color32::from_rgb(0x0D, 0x6E, 0xFD);
const BROKEN_ROW: Color32 = Color32::from_rgb(0xDC, 0x35, 0x45);
const MAX_UPSCALE: f32 = 2.0;
const FIT_MARGIN: f32 = 0.95;
const MIN_CANVAS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step { Next, Previous }

/// What the image area shows for the current position.
enum Current {
    Shown {
        info: String,
        status: PlateStatus,
        texture: egui::TextureHandle,
        size: (u32, u32),
    },
    Unreadable { filename: String },
}

pub struct ViewerApp {
    images: Vec<ImageRecord>,
    label_dir: PathBuf,
    nav: Navigator,
    summary: Vec<SummaryRow>,
    current: Option<Current>,
}

impl ViewerApp {
    /// Scans the image folder and classifies everything once for the
    /// summary table.
    pub fn new(args: &Args) -> Result<Self> {
        let images = engine::scan_folder(&args.image_dir)?;
        let summary = engine::summarize(&images, &args.label_dir);
        let broken = summary.iter().filter(|r| r.status == PlateStatus::Broken).count();
        info!("{} of {} plate(s) have broken characters", broken, summary.len());
        Ok(Self {
            nav: Navigator::new(images.len()),
            images,
            label_dir: args.label_dir.clone(),
            summary,
            current: None,
        })
    }

    /// Decodes and annotates the image at the current position and swaps
    /// it in as the displayed texture.
    pub fn load_current(&mut self, ctx: &egui::Context) {
        let Some(idx) = self.nav.current() else {
            self.current = None;
            return;
        };
        let record = &self.images[idx];
        self.current = Some(match record.classify(&self.label_dir) {
            Ok(result) => {
                let info = info_text(&result);
                let size = result.image.dimensions();
                let pixels = egui::ColorImage::from_rgb([size.0 as usize, size.1 as usize], result.image.as_raw());
                let texture = ctx.load_texture(&result.filename, pixels, egui::TextureOptions::LINEAR);
                Current::Shown { info, status: result.status, texture, size }
            }
            Err(e) => {
                warn!("{}", e);
                Current::Unreadable { filename: record.file_name() }
            }
        });
    }

    fn step(&mut self, ctx: &egui::Context, step: Step) {
        let moved = match step {
            Step::Next => self.nav.next(),
            Step::Previous => self.nav.previous(),
        };
        match moved {
            Ok(_) => self.load_current(ctx),
            Err(OverlayError::EmptyFolder) => debug!("{:?} ignored: no images", step),
            Err(e) => warn!("{}", e),
        }
    }

    fn jump_to(&mut self, ctx: &egui::Context, idx: usize) {
        if self.nav.current() == Some(idx) {
            return;
        }
        if self.nav.jump_to(idx).is_ok() {
            self.load_current(ctx);
        }
    }

    fn header_ui(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| match &self.current {
            Some(Current::Shown { info, status, .. }) => {
                ui.label(RichText::new(info).size(15.0).color(INTACT_TEXT));
                ui.label(
                    RichText::new(format!("Overall Plate: {}", status))
                        .size(17.0)
                        .strong()
                        .color(status_color(*status)),
                );
            }
            Some(Current::Unreadable { filename }) => {
                ui.label(RichText::new(format!("Cannot read {}", filename)).size(15.0).color(BROKEN_TEXT));
            }
            None => {
                ui.label("No images found. Launch with: plate-inspector <images dir> <labels dir>");
            }
        });
    }

    fn summary_ui(&self, ui: &mut egui::Ui) -> Option<usize> {
        let mut clicked_idx = None;
        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            egui::Grid::new("summary_table").striped(true).min_col_width(200.0).show(ui, |ui| {
                for heading in ["Filename", "Intact", "Broken", "Plate Status"] {
                    ui.label(RichText::new(heading).strong());
                }
                ui.end_row();

                for (i, row) in self.summary.iter().enumerate() {
                    let bg = row_color(row.status);
                    let name = RichText::new(&row.filename).color(Color32::WHITE).background_color(bg);
                    if ui.selectable_label(self.nav.current() == Some(i), name).clicked() {
                        clicked_idx = Some(i);
                    }
                    ui.label(RichText::new(row.intact_count.to_string()).background_color(bg));
                    ui.label(RichText::new(row.broken_count.to_string()).background_color(bg));
                    let status = if row.readable { row.status.to_string() } else { "Cannot read image".to_owned() };
                    ui.label(RichText::new(status).background_color(bg));
                    ui.end_row();
                }
            });
        });
        clicked_idx
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(Key::ArrowRight)) {
            self.step(ctx, Step::Next);
        }
        if ctx.input(|i| i.key_pressed(Key::ArrowLeft)) {
            self.step(ctx, Step::Previous);
        }

        egui::TopBottomPanel::top("status_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            self.header_ui(ui);
            ui.add_space(4.0);
        });

        let mut clicked_idx = None;
        egui::TopBottomPanel::bottom("summary_panel")
            .resizable(true)
            .default_height(220.0)
            .show(ctx, |ui| {
                clicked_idx = self.summary_ui(ui);
            });
        if let Some(i) = clicked_idx {
            self.jump_to(ctx, i);
        }

        egui::TopBottomPanel::bottom("nav_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(RichText::new("<< Previous").strong()).clicked() {
                    self.step(ctx, Step::Previous);
                }
                if ui.button(RichText::new("Next >>").strong()).clicked() {
                    self.step(ctx, Step::Next);
                }
                ui.separator();
                ui.label(self.nav.position_label());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(Current::Shown { texture, size, .. }) = &self.current {
                let available = ui.available_size();
                let (w, h) = fit_to_canvas((available.x, available.y), *size);
                ui.centered_and_justified(|ui| {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(Vec2::new(w as f32, h as f32)));
                });
            }
        });
    }
}

pub fn info_text(r: &ResultRecord) -> String {
    format!("{}: {} intact, {} broken characters", r.filename, r.intact_count, r.broken_count)
}

fn status_color(status: PlateStatus) -> Color32 {
    match status {
        PlateStatus::Intact => INTACT_TEXT,
        PlateStatus::Broken => BROKEN_TEXT,
        PlateStatus::Unknown => Color32::GRAY,
    }
}

/// Summary rows are blue only when the plate is known to be intact.
fn row_color(status: PlateStatus) -> Color32 {
    match status {
        PlateStatus::Intact => INTACT_ROW,
        PlateStatus::Broken | PlateStatus::Unknown => BROKEN_ROW,
    }
}

/// Display size for an image of `image` pixels in a `canvas` of logical
/// points: fit with a small margin, never upscale past 2x, never below 1px.
pub fn fit_to_canvas(canvas: (f32, f32), image: (u32, u32)) -> (u32, u32) {
    let (cw, ch) = (canvas.0.max(MIN_CANVAS), canvas.1.max(MIN_CANVAS));
    let (w, h) = (image.0.max(1) as f32, image.1.max(1) as f32);
    let scale = (cw * FIT_MARGIN / w).min(ch * FIT_MARGIN / h).min(MAX_UPSCALE);
    (((w * scale) as u32).max(1), ((h * scale) as u32).max(1))
}
