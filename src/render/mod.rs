//! QR rendering.
//!
//! Symbol construction is delegated to the [`qrcode`] crate. This module turns the module
//! matrix into the two representations the rest of the crate works with: a PNG raster at print
//! resolution and SVG markup at screen size.

mod raster;
mod svg;

pub use raster::{rasterize, to_png};
pub use svg::to_svg;

use image::Rgb;
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use crate::common::{
    color::{parse_hex, BLACK, WHITE},
    Error, Result,
};

pub const DEFAULT_PIXEL_SIZE: u32 = 2000;
pub const DEFAULT_VECTOR_SIZE: u32 = 400;
pub const DEFAULT_MARGIN: u32 = 2;

const MAX_SIZE: u32 = 16384;
const MAX_MARGIN: u32 = 64;

// Render options
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub pixel_size: u32,
    pub vector_size: u32,
    pub margin: u32,
    pub dark: Rgb<u8>,
    pub light: Rgb<u8>,
    pub ec_level: EcLevel,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pixel_size: DEFAULT_PIXEL_SIZE,
            vector_size: DEFAULT_VECTOR_SIZE,
            margin: DEFAULT_MARGIN,
            dark: BLACK,
            light: WHITE,
            ec_level: EcLevel::M,
        }
    }
}

pub struct RenderBuilder {
    pixel_size: u32,
    vector_size: u32,
    margin: u32,
    dark: String,
    light: String,
    ec_level: EcLevel,
}

impl Default for RenderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBuilder {
    pub fn new() -> Self {
        Self {
            pixel_size: DEFAULT_PIXEL_SIZE,
            vector_size: DEFAULT_VECTOR_SIZE,
            margin: DEFAULT_MARGIN,
            dark: "#000000".to_string(),
            light: "#FFFFFF".to_string(),
            ec_level: EcLevel::M,
        }
    }

    pub fn pixel_size(&mut self, pixel_size: u32) -> &mut Self {
        self.pixel_size = pixel_size;
        self
    }

    pub fn vector_size(&mut self, vector_size: u32) -> &mut Self {
        self.vector_size = vector_size;
        self
    }

    pub fn margin(&mut self, margin: u32) -> &mut Self {
        self.margin = margin;
        self
    }

    pub fn dark(&mut self, hex: &str) -> &mut Self {
        self.dark = hex.to_string();
        self
    }

    pub fn light(&mut self, hex: &str) -> &mut Self {
        self.light = hex.to_string();
        self
    }

    pub fn ec_level(&mut self, ec_level: EcLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn build(&self) -> Result<RenderOptions> {
        for sz in [self.pixel_size, self.vector_size] {
            if sz == 0 || sz > MAX_SIZE {
                return Err(Error::InvalidSize(sz));
            }
        }
        if self.margin > MAX_MARGIN {
            return Err(Error::InvalidMargin(self.margin));
        }

        Ok(RenderOptions {
            pixel_size: self.pixel_size,
            vector_size: self.vector_size,
            margin: self.margin,
            dark: parse_hex(&self.dark)?,
            light: parse_hex(&self.light)?,
            ec_level: self.ec_level,
        })
    }
}


// Rendered code
//------------------------------------------------------------------------------

/// Output of one render pass. Regenerated whenever the encoded payload changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCode {
    /// PNG bytes at `pixel_size`.
    pub raster: Vec<u8>,
    /// SVG markup at `vector_size`.
    pub vector: String,
}

pub fn encode_symbol(text: &str, ec_level: EcLevel) -> Result<QrCode> {
    Ok(QrCode::with_error_correction_level(text.as_bytes(), ec_level)?)
}

/// Encodes and rasterises `text` on the blocking pool, returning PNG bytes.
pub async fn render_raster(text: &str, opts: &RenderOptions) -> Result<Vec<u8>> {
    let (text, opts) = (text.to_string(), *opts);
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let code = encode_symbol(&text, opts.ec_level)?;
        debug!(modules = code.width(), px = opts.pixel_size, "Rasterising QR");
        to_png(&rasterize(&code, &opts))
    })
    .await?
}

/// Encodes `text` on the blocking pool and returns SVG markup.
pub async fn render_vector(text: &str, opts: &RenderOptions) -> Result<String> {
    let (text, opts) = (text.to_string(), *opts);
    tokio::task::spawn_blocking(move || -> Result<String> {
        let code = encode_symbol(&text, opts.ec_level)?;
        debug!(modules = code.width(), size = opts.vector_size, "Rendering SVG");
        Ok(to_svg(&code, &opts))
    })
    .await?
}

/// Renders both representations from a single encoded symbol. Either failure fails the whole
/// pass so callers never see a half-updated code.
pub async fn render_code(text: &str, opts: &RenderOptions) -> Result<RenderedCode> {
    let (text, opts) = (text.to_string(), *opts);
    tokio::task::spawn_blocking(move || -> Result<RenderedCode> {
        let code = encode_symbol(&text, opts.ec_level)?;
        debug!(modules = code.width(), px = opts.pixel_size, size = opts.vector_size, "Rendering QR");
        let raster = to_png(&rasterize(&code, &opts))?;
        let vector = to_svg(&code, &opts);
        Ok(RenderedCode { raster, vector })
    })
    .await?
}
