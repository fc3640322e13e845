use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{Rgb, RgbImage};

use qrmachine::clipboard::{ClipboardLadder, CopyOutcome, CopyStage};
use qrmachine::export::{CaptionLayout, DirectorySink, Typeface};
use qrmachine::payload::{ActivePayload, ContactPayload, WebsitePayload, WiFiPayload, WiFiSecurity};
use qrmachine::session::Notice;
use qrmachine::{Error, RenderBuilder, Result, Session};

/// Clipboard stage that remembers what it was given.
#[derive(Clone, Default)]
struct MemoryClipboard {
    fail: bool,
    copied: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl CopyStage for MemoryClipboard {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn copy(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(Error::Clipboard("memory clipboard disabled".to_string()));
        }
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Every glyph is a filled square `px / 2` wide.
struct SquareFace;

impl Typeface for SquareFace {
    fn text_width(&self, text: &str, px: f32) -> u32 {
        text.chars().count() as u32 * (px / 2.0) as u32
    }

    fn draw_text(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, text: &str) {
        let w = self.text_width(text, px);
        for dy in 0..px as u32 {
            for dx in 0..w {
                let (cx, cy) = (x as u32 + dx, y as u32 + dy);
                if cx < canvas.width() && cy < canvas.height() {
                    canvas.put_pixel(cx, cy, color);
                }
            }
        }
    }
}

fn session(payload: ActivePayload) -> Session {
    let opts = RenderBuilder::new().pixel_size(400).vector_size(200).build().unwrap();
    Session::new(payload, opts)
}

fn small_layout() -> CaptionLayout {
    CaptionLayout { padding: 16, spacing: 8, qr_size: 400, font_px: 16.0, line_height: 20, ..Default::default() }
}

#[tokio::test]
async fn test_website_end_to_end() {
    let mut s = session(ActivePayload::Website(WebsitePayload { url: "example.com".to_string() }));
    assert_eq!(s.encoded(), "https://example.com");
    assert!(s.refresh().await);

    let code = s.rendered().unwrap();
    assert!(!code.raster.is_empty());
    assert!(code.vector.starts_with("<svg"));

    let png = s.download(&small_layout(), None).await.unwrap().unwrap();
    let stamp = png.filename.strip_prefix("qrcode-website-").unwrap().strip_suffix(".png").unwrap();
    assert!(stamp.bytes().all(|b| b.is_ascii_digit()));
    let img = image::load_from_memory(&png.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (400, 400));
}

#[tokio::test]
async fn test_wifi_empty_ssid_is_cleared() {
    let wifi = WiFiPayload { ssid: String::new(), ..Default::default() };
    let mut s = session(ActivePayload::WiFi(wifi));
    assert_eq!(s.encoded(), "");
    assert!(s.refresh().await);
    assert!(s.rendered().is_none());

    assert!(s.download(&small_layout(), Some(&SquareFace)).await.unwrap().is_none());
    assert!(s.svg().is_none());

    let clipboard = MemoryClipboard::default();
    let tmp = tempfile::tempdir().unwrap();
    let ladder = ClipboardLadder::new(DirectorySink::new(tmp.path())).with_stage(clipboard.clone());
    assert_eq!(s.copy_svg(&ladder).await, None);
    assert!(clipboard.copied.lock().unwrap().is_empty());
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_wifi_captioned_export() {
    let wifi = WiFiPayload {
        ssid: "Home".to_string(),
        password: "secret".to_string(),
        security: WiFiSecurity::Wpa,
        caption: "Scan me".to_string(),
    };
    let mut s = session(ActivePayload::WiFi(wifi));
    assert!(s.refresh().await);

    let layout = small_layout();
    let png = s.download(&layout, Some(&SquareFace)).await.unwrap().unwrap();
    assert!(png.filename.starts_with("qrcode-wifi-"));
    let img = image::load_from_memory(&png.bytes).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), layout.canvas_size(1));

    // Caption is centred on the first line
    let caption_w = SquareFace.text_width("Scan me", layout.font_px);
    let x = (img.width() - caption_w) / 2;
    assert_eq!(img.get_pixel(x + 1, layout.padding + 1), &layout.text_color);
    assert_eq!(img.get_pixel(x - 1, layout.padding + 1), &Rgb([255, 255, 255]));
}

#[tokio::test]
async fn test_caption_without_font_fails() {
    let mut s = session(ActivePayload::WiFi(WiFiPayload::default()));
    assert!(s.refresh().await);
    let res = s.download(&small_layout(), None).await;
    assert!(matches!(res, Err(Error::FontUnavailable)));
}

#[tokio::test]
async fn test_copy_svg_to_clipboard() {
    let mut s = session(ActivePayload::Contact(ContactPayload::default()));
    assert!(s.refresh().await);

    let clipboard = MemoryClipboard::default();
    let tmp = tempfile::tempdir().unwrap();
    let ladder = ClipboardLadder::new(DirectorySink::new(tmp.path())).with_stage(clipboard.clone());

    let outcome = s.copy_svg(&ladder).await;
    assert_eq!(outcome, Some(CopyOutcome::Copied { stage: "memory" }));
    assert_eq!(clipboard.copied.lock().unwrap().as_slice(), [s.rendered().unwrap().vector.clone()]);
    assert_eq!(s.notice().map(Notice::message), Some("Copied!".to_string()));
}

#[tokio::test]
async fn test_copy_svg_falls_back_to_download() {
    let mut s = session(ActivePayload::default());
    assert!(s.refresh().await);

    let tmp = tempfile::tempdir().unwrap();
    let ladder = ClipboardLadder::new(DirectorySink::new(tmp.path()))
        .with_stage(MemoryClipboard { fail: true, ..Default::default() });

    let Some(CopyOutcome::Downloaded { path }) = s.copy_svg(&ladder).await else {
        panic!("expected a download");
    };
    assert_eq!(path.parent(), Some(tmp.path()));
    assert!(path.extension().is_some_and(|e| e == "svg"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), s.rendered().unwrap().vector);
    assert_eq!(s.notice(), Some(&Notice::DownloadedInstead { path: PathBuf::from(&path) }));
}
