use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use qrmachine::clipboard::ClipboardLadder;
use qrmachine::export::{CaptionFont, CaptionLayout, DirectorySink, DownloadSink, Typeface};
use qrmachine::payload::{ActivePayload, ContactPayload, WebsitePayload, WiFiPayload, WiFiSecurity};
use qrmachine::session::Notice;
use qrmachine::{RenderBuilder, Session};

#[derive(Parser, Debug)]
#[command(name = "qrmachine", version, about = "Generate QR codes for websites, Wi-Fi and contacts")]
struct Cli {
    #[arg(long, global = true, help = "Directory for exported files (defaults to the download folder)")]
    out: Option<PathBuf>,
    #[arg(long, global = true, help = "Also save the SVG markup")]
    svg: bool,
    #[arg(long, global = true, help = "Copy the SVG markup to the clipboard")]
    copy: bool,
    #[arg(long, global = true, help = "Font used to draw Wi-Fi captions")]
    font: Option<PathBuf>,
    #[arg(long, global = true, help = "Print the encoded payload and exit")]
    print: bool,
    #[arg(long, global = true, default_value_t = qrmachine::render::DEFAULT_PIXEL_SIZE, help = "PNG size in pixels")]
    size: u32,
    #[arg(long, global = true, default_value_t = qrmachine::render::DEFAULT_MARGIN, help = "Quiet zone in modules")]
    margin: u32,
    #[arg(short, long, global = true, help = "Verbose logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Link to a website
    Website { url: String },
    /// Join a Wi-Fi network
    Wifi {
        #[arg(long)]
        ssid: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "WPA", help = "WPA, WEP or nopass")]
        security: WiFiSecurity,
        #[arg(long, default_value = "", help = "Caption drawn above the code in the PNG")]
        caption: String,
    },
    /// Share a contact card
    Contact {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
    },
}

impl Commands {
    fn payload(self) -> ActivePayload {
        match self {
            Self::Website { url } => ActivePayload::Website(WebsitePayload { url }),
            Self::Wifi { ssid, password, security, caption } => {
                ActivePayload::WiFi(WiFiPayload { ssid, password, security, caption })
            }
            Self::Contact { name, phone, email } => {
                ActivePayload::Contact(ContactPayload { name, phone, email })
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_font(path: Option<&Path>) -> Result<CaptionFont> {
    match path {
        Some(p) => CaptionFont::from_path(p)
            .with_context(|| format!("failed to load caption font {}", p.display())),
        None => CaptionFont::discover()
            .context("no caption font found, pass --font or an empty --caption"),
    }
}

/// Prints the copy notice alongside the saved paths, independent of the log filter.
fn report_notice(out: &mut impl Write, notice: Option<&Notice>) -> std::io::Result<()> {
    match notice {
        Some(notice) => writeln!(out, "{}", notice.message()),
        None => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let payload = cli.command.payload();
    if cli.print {
        println!("{}", payload.encode());
        return Ok(());
    }

    let opts = RenderBuilder::new()
        .pixel_size(cli.size)
        .margin(cli.margin)
        .build()
        .context("invalid render options")?;
    let mut session = Session::new(payload, opts);
    session.refresh().await;

    if session.rendered().is_none() {
        if session.encoded().is_empty() {
            warn!(kind = %session.kind(), "Nothing to encode");
            return Ok(());
        }
        bail!("failed to generate QR code for {} payload", session.kind());
    }

    let sink = cli.out.map(DirectorySink::new).unwrap_or_else(DirectorySink::downloads);
    let font = match session.payload().caption() {
        Some(_) => Some(load_font(cli.font.as_deref())?),
        None => None,
    };
    let face = font.as_ref().map(|f| f as &dyn Typeface);

    if let Some(png) =
        session.download(&CaptionLayout::default(), face).await.context("failed to export PNG")?
    {
        let path = sink.save(&png).context("failed to save PNG")?;
        println!("{}", path.display());
    }

    if cli.svg {
        if let Some(svg) = session.svg() {
            let path = sink.save(&svg).context("failed to save SVG")?;
            println!("{}", path.display());
        }
    }

    if cli.copy {
        let ladder = ClipboardLadder::system(sink.clone());
        if session.copy_svg(&ladder).await.is_some() {
            report_notice(&mut std::io::stdout(), session.notice())?;
        }
    }

    Ok(())
}
