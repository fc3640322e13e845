use std::path::{Path, PathBuf};
use std::time::Duration;

use ab_glyph::{FontVec, PxScale};
use image::{imageops, DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::debug;

use crate::common::{color::WHITE, Error, Result};

// Typeface
//------------------------------------------------------------------------------

/// Measures and draws single lines of caption text.
pub trait Typeface: Send + Sync {
    fn text_width(&self, text: &str, px: f32) -> u32;

    /// Draws `text` with its top-left corner at `(x, y)`.
    fn draw_text(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, text: &str);
}

/// A TrueType/OpenType font used to draw captions.
pub struct CaptionFont {
    font: FontVec,
}

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/inter/Inter-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

impl CaptionFont {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self { font: FontVec::try_from_vec(bytes)? })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Loads the first usable font among well-known system locations.
    pub fn discover() -> Result<Self> {
        Self::discover_in(SYSTEM_FONTS.iter().map(PathBuf::from))
    }

    pub fn discover_in(candidates: impl IntoIterator<Item = PathBuf>) -> Result<Self> {
        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(font) => {
                    debug!(path = %path.display(), "Loaded caption font");
                    return Ok(font);
                }
                Err(err) => debug!(path = %path.display(), %err, "Skipping caption font"),
            }
        }
        Err(Error::FontUnavailable)
    }
}

impl Typeface for CaptionFont {
    fn text_width(&self, text: &str, px: f32) -> u32 {
        text_size(PxScale::from(px), &self.font, text).0
    }

    fn draw_text(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, text: &str) {
        draw_text_mut(canvas, color, x, y, PxScale::from(px), &self.font, text);
    }
}

// Word wrap
//------------------------------------------------------------------------------

/// Greedy word wrap. Words are appended to the current line until the next one would push its
/// measured width past `max_width`. A word that is too wide on its own keeps a line to itself.
pub fn wrap_words(text: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// Layout
//------------------------------------------------------------------------------

/// Geometry of the captioned export, in output pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionLayout {
    pub padding: u32,
    /// Gap between the caption block and the code.
    pub spacing: u32,
    pub qr_size: u32,
    pub font_px: f32,
    pub line_height: u32,
    pub text_color: Rgb<u8>,
    pub decode_timeout: Duration,
}

impl Default for CaptionLayout {
    fn default() -> Self {
        Self {
            padding: 256,
            spacing: 128,
            qr_size: 2000,
            font_px: 96.0,
            line_height: 128,
            text_color: Rgb([0x1f, 0x29, 0x37]),
            decode_timeout: Duration::from_secs(5),
        }
    }
}

impl CaptionLayout {
    pub fn wrap(&self, caption: &str, face: &dyn Typeface) -> Vec<String> {
        wrap_words(caption, self.qr_size, |s| face.text_width(s, self.font_px))
    }

    /// Canvas size for a caption of `lines` lines.
    pub fn canvas_size(&self, lines: usize) -> (u32, u32) {
        let block = lines as u32 * self.line_height;
        let w = self.padding * 2 + self.qr_size;
        let h = self.padding * 2 + block + self.spacing + self.qr_size;
        (w, h)
    }
}

/// Draws the wrapped caption centred above the code on a white canvas.
pub fn compose(qr: &DynamicImage, caption: &str, layout: &CaptionLayout, face: &dyn Typeface) -> RgbImage {
    let lines = layout.wrap(caption, face);
    let (w, h) = layout.canvas_size(lines.len());
    let mut canvas = RgbImage::from_pixel(w, h, WHITE);

    for (i, line) in lines.iter().enumerate() {
        let line_w = face.text_width(line, layout.font_px) as i64;
        let x = (w as i64 - line_w) / 2;
        let y = layout.padding + i as u32 * layout.line_height;
        face.draw_text(&mut canvas, layout.text_color, x as i32, y as i32, layout.font_px, line);
    }

    let mut qr = qr.to_rgb8();
    if qr.dimensions() != (layout.qr_size, layout.qr_size) {
        qr = imageops::resize(&qr, layout.qr_size, layout.qr_size, imageops::FilterType::Nearest);
    }
    let qr_y = layout.padding + lines.len() as u32 * layout.line_height + layout.spacing;
    imageops::overlay(&mut canvas, &qr, layout.padding as i64, qr_y as i64);

    debug!(lines = lines.len(), width = w, height = h, "Composed captioned QR");
    canvas
}
