//! # qrmachine
//!
//! Turn website links, Wi-Fi credentials and contact cards into print-ready QR codes.
//!
//! ## Features
//!
//! - **Payload formatting**: Website URLs, `WIFI:` network strings and vCard 3.0 contacts
//! - **Print resolution rasters**: 2000px PNG with a 2 module quiet zone by default
//! - **Vector output**: Compact SVG markup suitable for pasting into design tools
//! - **Captioned export**: Wi-Fi codes can carry a word-wrapped caption drawn above the code
//! - **Clipboard fallback**: Native clipboard and platform copy utilities (utilities first on Linux),
//!   then a file download
//!
//! ## Quick Start
//!
//! ### Formatting a payload
//!
//! ```rust
//! use qrmachine::payload::{ActivePayload, WiFiPayload, WiFiSecurity};
//!
//! let wifi = WiFiPayload {
//!     ssid: "Home".to_string(),
//!     password: "secret".to_string(),
//!     security: WiFiSecurity::Wpa,
//!     caption: "Scan to join".to_string(),
//! };
//! let payload = ActivePayload::WiFi(wifi);
//! assert_eq!(payload.encode(), "WIFI:T:WPA;S:Home;P:secret;H:true;;");
//! ```
//!
//! ### Rendering and exporting
//!
//! ```rust,no_run
//! use qrmachine::export::{CaptionFont, CaptionLayout, DirectorySink, DownloadSink, Typeface};
//! use qrmachine::payload::{ActivePayload, WebsitePayload};
//! use qrmachine::{RenderBuilder, Session};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = RenderBuilder::new().pixel_size(2000).margin(2).build()?;
//! let payload = ActivePayload::Website(WebsitePayload { url: "example.com".to_string() });
//! let mut session = Session::new(payload, opts);
//! session.refresh().await;
//!
//! let font = CaptionFont::discover().ok();
//! let face = font.as_ref().map(|f| f as &dyn Typeface);
//! if let Some(png) = session.download(&CaptionLayout::default(), face).await? {
//!     DirectorySink::new(".").save(&png)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Payload formats
//!
//! | Kind    | Encoded text                                              |
//! |---------|-----------------------------------------------------------|
//! | Website | URL, prefixed with `https://` unless it starts with `http` |
//! | Wi-Fi   | `WIFI:T:<WPA\|WEP\|nopass>;S:<ssid>;P:<password>;H:true;;` |
//! | Contact | vCard 3.0 with `FN`, `TEL` and `EMAIL` lines when present  |
//!
//! Fields are not escaped. SSIDs or passwords containing `;`, `:`, `,` or `\` produce payloads
//! that some scanners will misread.

pub mod clipboard;
pub(crate) mod common;
pub mod export;
pub mod payload;
pub mod render;
pub mod session;

pub use common::{color, Error, Result};
pub use payload::{ActivePayload, PayloadKind};
pub use render::{RenderBuilder, RenderOptions, RenderedCode};
pub use session::Session;
