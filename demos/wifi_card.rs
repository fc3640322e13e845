use std::error::Error;

use qrmachine::export::{CaptionFont, CaptionLayout, DirectorySink, DownloadSink, Typeface};
use qrmachine::payload::{ActivePayload, WiFiPayload, WiFiSecurity};
use qrmachine::{RenderBuilder, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let wifi = WiFiPayload {
        ssid: "Cafe Guest".to_string(),
        password: "espresso42".to_string(),
        security: WiFiSecurity::Wpa,
        caption: "Scan to join the guest network. Ask the staff if it does not work.".to_string(),
    };

    // Dark slate modules on white
    let opts = RenderBuilder::new().dark("#1F2937").build()?;
    let mut session = Session::new(ActivePayload::WiFi(wifi), opts);
    session.refresh().await;
    println!("Encoded payload: {}", session.encoded());

    // Captions need a font; fall back to the plain code when none is installed
    let font = CaptionFont::discover().ok();
    let face = font.as_ref().map(|f| f as &dyn Typeface);
    if face.is_none() {
        println!("No system font found, pass a font to CaptionFont::from_path for the caption");
        return Ok(());
    }

    let sink = DirectorySink::new("./assets");
    if let Some(png) = session.download(&CaptionLayout::default(), face).await? {
        let path = sink.save(&png)?;
        println!("Wi-Fi card saved to: {}", path.display());
    }
    if let Some(svg) = session.svg() {
        let path = sink.save(&svg)?;
        println!("SVG saved to: {}", path.display());
    }

    Ok(())
}
