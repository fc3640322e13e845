use std::fmt::Write;

use qrcode::{Color, QrCode};

use super::RenderOptions;
use crate::common::color::to_hex;

// Vector
//------------------------------------------------------------------------------

/// Renders the symbol as SVG markup. The view box is measured in modules, quiet zone included,
/// and dark modules are stroked as one path of horizontal runs.
pub fn to_svg(code: &QrCode, opts: &RenderOptions) -> String {
    let qr_w = code.width();
    let margin = opts.margin as usize;
    let total = qr_w + 2 * margin;
    let colors = code.to_colors();

    let mut path = String::new();
    for r in 0..qr_w {
        let row = &colors[r * qr_w..(r + 1) * qr_w];
        let mut c = 0;
        while c < qr_w {
            if row[c] != Color::Dark {
                c += 1;
                continue;
            }
            let start = c;
            while c < qr_w && row[c] == Color::Dark {
                c += 1;
            }
            let _ = write!(path, "M{} {}.5h{}", start + margin, r + margin, c - start);
        }
    }

    let sz = opts.vector_size;
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{sz}\" height=\"{sz}\" \
         viewBox=\"0 0 {total} {total}\" shape-rendering=\"crispEdges\">\
         <path fill=\"{light}\" d=\"M0 0h{total}v{total}H0z\"/>\
         <path stroke=\"{dark}\" d=\"{path}\"/></svg>\n",
        light = to_hex(opts.light),
        dark = to_hex(opts.dark),
    )
}
