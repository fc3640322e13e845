//! Export artifacts.
//!
//! PNG downloads pass the rendered raster through unchanged, except for Wi-Fi payloads with a
//! caption, which are composited onto a larger canvas first. SVG markup is always passed through
//! untouched.

mod caption;
mod download;

pub use caption::{compose, wrap_words, CaptionFont, CaptionLayout, Typeface};
pub use download::{DirectorySink, DownloadSink};

#[cfg(test)]
pub(crate) use caption::test_face;

use std::future::Future;
use std::time::Duration;

use image::DynamicImage;
use tracing::debug;

use crate::common::{Error, Result};
use crate::payload::{ActivePayload, PayloadKind};
use crate::render::{to_png, RenderedCode};

pub const PNG_MIME: &str = "image/png";
pub const SVG_MIME: &str = "image/svg+xml";

// Artifact
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// `qrcode-<kind>-<millis>.<ext>`
pub fn export_filename(kind: PayloadKind, ext: &str, millis: i64) -> String {
    format!("qrcode-{kind}-{millis}.{ext}")
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl ExportArtifact {
    pub fn png(kind: PayloadKind, bytes: Vec<u8>) -> Self {
        Self { filename: export_filename(kind, "png", now_millis()), mime: PNG_MIME, bytes }
    }

    pub fn svg(kind: PayloadKind, markup: &str) -> Self {
        Self {
            filename: export_filename(kind, "svg", now_millis()),
            mime: SVG_MIME,
            bytes: markup.as_bytes().to_vec(),
        }
    }
}


// Export
//------------------------------------------------------------------------------

/// Runs `fut` with a deadline, mapping expiry to [`Error::DecodeTimeout`].
pub(crate) async fn with_deadline<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut).await.map_err(|_| Error::DecodeTimeout(timeout))?
}

/// Decodes PNG bytes on the blocking pool, giving up after `timeout`.
pub async fn decode_raster(bytes: &[u8], timeout: Duration) -> Result<DynamicImage> {
    let bytes = bytes.to_vec();
    with_deadline(timeout, async move {
        Ok::<_, Error>(tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??)
    })
    .await
}

/// Builds the PNG download for the current state. Returns `Ok(None)` when nothing is rendered.
///
/// Wi-Fi payloads with a caption need a `face` to draw it; without one this fails with
/// [`Error::FontUnavailable`].
pub async fn export_png(
    payload: &ActivePayload,
    rendered: Option<&RenderedCode>,
    layout: &CaptionLayout,
    face: Option<&dyn Typeface>,
) -> Result<Option<ExportArtifact>> {
    let Some(rendered) = rendered.filter(|r| !r.raster.is_empty()) else {
        debug!("Nothing rendered, skipping PNG export");
        return Ok(None);
    };

    let kind = payload.kind();
    let bytes = match payload.caption() {
        Some(caption) => {
            let face = face.ok_or(Error::FontUnavailable)?;
            let qr = decode_raster(&rendered.raster, layout.decode_timeout).await?;
            to_png(&compose(&qr, caption, layout, face))?
        }
        None => rendered.raster.clone(),
    };
    Ok(Some(ExportArtifact::png(kind, bytes)))
}

/// Builds the SVG artifact for the current state. Returns `None` when nothing is rendered.
pub fn export_svg(kind: PayloadKind, rendered: Option<&RenderedCode>) -> Option<ExportArtifact> {
    rendered.filter(|r| !r.vector.is_empty()).map(|r| ExportArtifact::svg(kind, &r.vector))
}
