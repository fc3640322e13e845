//! Editing session state.
//!
//! A session owns the active payload, the last rendered code and the transient copy notice.
//! Renders are issued as numbered tickets. A finished render is applied only if its ticket is
//! still the latest one, so a slow render for old input can never overwrite the result for newer
//! input.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error};

use crate::clipboard::{ClipboardLadder, CopyOutcome};
use crate::common::{Error, Result};
use crate::export::{export_png, export_svg, CaptionLayout, ExportArtifact, Typeface};
use crate::payload::{ActivePayload, PayloadKind};
use crate::render::{render_code, RenderOptions, RenderedCode};

/// How long the "copied" notice stays visible.
pub const COPY_NOTICE_WINDOW: Duration = Duration::from_secs(2);

// Render tickets
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RenderTicket {
    seq: u64,
    text: String,
    options: RenderOptions,
}

impl RenderTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug)]
pub enum RenderResult {
    /// The payload was empty, so there is nothing to show.
    Cleared,
    Rendered(RenderedCode),
    Failed(Error),
}

#[derive(Debug)]
pub struct RenderOutcome {
    pub seq: u64,
    pub result: RenderResult,
}

/// Resolves a ticket. Empty payloads skip the encoder entirely.
pub async fn render_ticket(ticket: RenderTicket) -> RenderOutcome {
    let result = if ticket.text.is_empty() {
        RenderResult::Cleared
    } else {
        match render_code(&ticket.text, &ticket.options).await {
            Ok(code) => RenderResult::Rendered(code),
            Err(err) => RenderResult::Failed(err),
        }
    };
    RenderOutcome { seq: ticket.seq, result }
}

// Notices
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Copied,
    DownloadedInstead { path: PathBuf },
    CopyFailed,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::Copied => "Copied!".to_string(),
            Self::DownloadedInstead { path } => {
                format!("Clipboard not available. SVG file downloaded instead: {}", path.display())
            }
            Self::CopyFailed => "Failed to copy SVG. Please try again.".to_string(),
        }
    }
}

// Session
//------------------------------------------------------------------------------

pub struct Session {
    payload: ActivePayload,
    options: RenderOptions,
    rendered: Option<RenderedCode>,
    issued: u64,
    applied: u64,
    notice: Option<(Notice, Instant)>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ActivePayload::default(), RenderOptions::default())
    }
}

impl Session {
    pub fn new(payload: ActivePayload, options: RenderOptions) -> Self {
        Self { payload, options, rendered: None, issued: 0, applied: 0, notice: None }
    }

    pub fn payload(&self) -> &ActivePayload {
        &self.payload
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn rendered(&self) -> Option<&RenderedCode> {
        self.rendered.as_ref()
    }

    pub fn encoded(&self) -> String {
        self.payload.encode()
    }

    /// Whether the latest ticket has not been applied yet. While pending, the rendered code
    /// still belongs to the previous payload.
    pub fn is_pending(&self) -> bool {
        self.applied != self.issued
    }

    /// Replaces the payload and issues a ticket for it.
    pub fn set_payload(&mut self, payload: ActivePayload) -> RenderTicket {
        self.payload = payload;
        self.begin_render()
    }

    pub fn begin_render(&mut self) -> RenderTicket {
        self.issued += 1;
        RenderTicket { seq: self.issued, text: self.payload.encode(), options: self.options }
    }

    /// Applies a finished render. Returns `false` when the outcome was superseded by a newer
    /// ticket and dropped.
    pub fn apply(&mut self, outcome: RenderOutcome) -> bool {
        if outcome.seq != self.issued {
            debug!(seq = outcome.seq, latest = self.issued, "Dropping stale render");
            return false;
        }

        self.applied = outcome.seq;
        match outcome.result {
            RenderResult::Cleared => {
                debug!(seq = outcome.seq, "Payload empty, clearing rendered code");
                self.rendered = None;
            }
            RenderResult::Rendered(code) => {
                debug!(seq = outcome.seq, raster = code.raster.len(), "Rendered code updated");
                self.rendered = Some(code);
            }
            RenderResult::Failed(err) => {
                error!(seq = outcome.seq, %err, "Error generating QR code");
            }
        }
        true
    }

    /// Renders the current payload and applies the result.
    pub async fn refresh(&mut self) -> bool {
        let ticket = self.begin_render();
        let outcome = render_ticket(ticket).await;
        self.apply(outcome)
    }

    /// PNG download for the current state, or `None` when nothing is rendered.
    ///
    /// Call this once the pending ticket has been applied (see [`Session::is_pending`]). Before
    /// that, the kind and caption of the new payload are paired with the previous raster.
    pub async fn download(
        &self,
        layout: &CaptionLayout,
        face: Option<&dyn Typeface>,
    ) -> Result<Option<ExportArtifact>> {
        export_png(&self.payload, self.rendered.as_ref(), layout, face).await
    }

    pub fn svg(&self) -> Option<ExportArtifact> {
        export_svg(self.kind(), self.rendered.as_ref())
    }

    /// Runs the clipboard ladder on the SVG markup. A no-op returning `None` when nothing is
    /// rendered.
    pub async fn copy_svg(&mut self, ladder: &ClipboardLadder) -> Option<CopyOutcome> {
        let artifact = self.svg()?;
        let outcome = ladder.copy(&artifact).await;
        let notice = match &outcome {
            CopyOutcome::Copied { .. } => Notice::Copied,
            CopyOutcome::Downloaded { path } => Notice::DownloadedInstead { path: path.clone() },
            CopyOutcome::Failed => Notice::CopyFailed,
        };
        self.notice = Some((notice, Instant::now()));
        Some(outcome)
    }

    /// The notice to show right now. "Copied" clears itself after [`COPY_NOTICE_WINDOW`]; the
    /// others stay until the next copy.
    pub fn notice(&self) -> Option<&Notice> {
        match &self.notice {
            Some((Notice::Copied, at)) if at.elapsed() >= COPY_NOTICE_WINDOW => None,
            Some((notice, _)) => Some(notice),
            None => None,
        }
    }
}

#[cfg(test)]
mod session_tests {
    use std::time::Duration;

    use super::{render_ticket, Notice, RenderOutcome, RenderResult, Session};
    use crate::clipboard::{
        fakes::{Journal, ScriptedSink, ScriptedStage},
        ClipboardLadder, CopyOutcome,
    };
    use crate::payload::{ActivePayload, WebsitePayload, WiFiPayload};
    use crate::render::RenderBuilder;

    fn session(url: &str) -> Session {
        let opts = RenderBuilder::new().pixel_size(200).build().unwrap();
        Session::new(ActivePayload::Website(WebsitePayload { url: url.to_string() }), opts)
    }

    fn website(url: &str) -> ActivePayload {
        ActivePayload::Website(WebsitePayload { url: url.to_string() })
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let mut s = session("first.example");
        let old = s.begin_render();
        let new = s.set_payload(website("second.example"));
        assert!(new.seq() > old.seq());
        assert_eq!(new.text(), "https://second.example");

        // Newer render lands first, the stale one afterwards
        let new_outcome = render_ticket(new).await;
        let old_outcome = render_ticket(old).await;
        assert!(s.apply(new_outcome));
        let latest = s.rendered().cloned().unwrap();
        assert!(!s.apply(old_outcome));
        assert_eq!(s.rendered(), Some(&latest));
    }

    #[tokio::test]
    async fn test_stale_clear_ignored() {
        let mut s = session("example.com");
        assert!(s.refresh().await);
        let empty = s.set_payload(website(""));
        let back = s.set_payload(website("example.com"));

        assert!(s.apply(render_ticket(back).await));
        assert!(!s.apply(render_ticket(empty).await));
        assert!(s.rendered().is_some());
    }

    #[tokio::test]
    async fn test_pending_until_latest_applied() {
        let mut s = session("example.com");
        assert!(!s.is_pending());

        let old = s.begin_render();
        let new = s.set_payload(ActivePayload::WiFi(WiFiPayload::default()));
        assert!(s.is_pending());

        assert!(!s.apply(RenderOutcome { seq: old.seq(), result: RenderResult::Cleared }));
        assert!(s.is_pending());
        assert!(s.apply(render_ticket(new).await));
        assert!(!s.is_pending());
    }

    #[tokio::test]
    async fn test_encoder_failure_keeps_previous() {
        let mut s = session("example.com");
        assert!(s.refresh().await);
        let before = s.rendered().cloned();

        let ticket = s.set_payload(website(&"x".repeat(8000)));
        let outcome = render_ticket(ticket).await;
        assert!(matches!(outcome.result, RenderResult::Failed(_)));
        assert!(s.apply(outcome));
        assert_eq!(s.rendered().cloned(), before);
    }

    #[tokio::test]
    async fn test_empty_payload_clears() {
        let mut s = session("example.com");
        assert!(s.refresh().await);
        assert!(s.rendered().is_some());

        let wifi = WiFiPayload { ssid: String::new(), ..Default::default() };
        let ticket = s.set_payload(ActivePayload::WiFi(wifi));
        assert_eq!(ticket.text(), "");
        assert!(s.apply(render_ticket(ticket).await));
        assert!(s.rendered().is_none());
        assert!(s.svg().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_copied_notice_expires() {
        let mut s = session("example.com");
        assert!(s.refresh().await);

        let journal = Journal::default();
        let ladder = ClipboardLadder::new(ScriptedSink { ok: true, journal: journal.clone() })
            .with_stage(ScriptedStage { name: "async", ok: true, journal });

        let outcome = s.copy_svg(&ladder).await;
        assert_eq!(outcome, Some(CopyOutcome::Copied { stage: "async" }));
        assert_eq!(s.notice(), Some(&Notice::Copied));

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert_eq!(s.notice(), Some(&Notice::Copied));
        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(s.notice(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_notice_persists() {
        let mut s = session("example.com");
        assert!(s.refresh().await);

        let journal = Journal::default();
        let ladder = ClipboardLadder::new(ScriptedSink { ok: true, journal: journal.clone() })
            .with_stage(ScriptedStage { name: "async", ok: false, journal });

        let outcome = s.copy_svg(&ladder).await.unwrap();
        assert!(matches!(outcome, CopyOutcome::Downloaded { .. }));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(matches!(s.notice(), Some(Notice::DownloadedInstead { .. })));
        assert!(s.notice().unwrap().message().starts_with("Clipboard not available"));
    }

    #[tokio::test]
    async fn test_copy_without_render_is_noop() {
        let mut s = session("example.com");
        let journal = Journal::default();
        let ladder = ClipboardLadder::new(ScriptedSink { ok: true, journal: journal.clone() })
            .with_stage(ScriptedStage { name: "async", ok: true, journal: journal.clone() });

        assert_eq!(s.copy_svg(&ladder).await, None);
        assert!(journal.lock().unwrap().is_empty());
        assert_eq!(s.notice(), None);
    }
}
