use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use qrcode::{Color, QrCode};

use super::RenderOptions;
use crate::common::Result;

// Raster
//------------------------------------------------------------------------------

/// Rasterises the symbol into a square image of exactly `pixel_size` pixels, including a quiet
/// zone of `margin` modules. Module edges fall on `floor(p / scale)`, so modules may differ by
/// one pixel when the size is not a multiple of the module count. Symbols wider than
/// `pixel_size` are drawn at one pixel per module instead.
pub fn rasterize(code: &QrCode, opts: &RenderOptions) -> RgbImage {
    let qr_w = code.width() as u32;
    let total_modules = qr_w + 2 * opts.margin;
    let (img_w, scale) = if opts.pixel_size >= total_modules {
        (opts.pixel_size, opts.pixel_size as f64 / total_modules as f64)
    } else {
        (total_modules, 1.0)
    };
    let qz_sz = opts.margin as f64 * scale;
    let colors = code.to_colors();

    let mut canvas = RgbImage::from_pixel(img_w, img_w, opts.light);
    for i in 0..img_w {
        for j in 0..img_w {
            let (y, x) = (i as f64, j as f64);
            if y < qz_sz || x < qz_sz || y >= img_w as f64 - qz_sz || x >= img_w as f64 - qz_sz {
                continue;
            }
            let r = (((y - qz_sz) / scale) as u32).min(qr_w - 1);
            let c = (((x - qz_sz) / scale) as u32).min(qr_w - 1);
            if colors[(r * qr_w + c) as usize] == Color::Dark {
                canvas.put_pixel(j, i, opts.dark);
            }
        }
    }
    canvas
}

pub fn to_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
