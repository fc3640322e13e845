//! Copying SVG markup to the clipboard with an escalating fallback.
//!
//! Stages are tried strictly in order and each runs at most once. The first success ends the
//! ladder. When every stage fails the markup is offered as a download instead, and only if that
//! also fails does the copy report [`CopyOutcome::Failed`].

mod stages;

pub use stages::{CopyCommand, NativeClipboard};

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::common::Result;
use crate::export::{DownloadSink, ExportArtifact};

#[async_trait]
pub trait CopyStage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn copy(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied { stage: &'static str },
    /// No clipboard stage worked; the markup was saved as a file instead.
    Downloaded { path: PathBuf },
    Failed,
}

pub struct ClipboardLadder {
    stages: Vec<Box<dyn CopyStage>>,
    fallback: Box<dyn DownloadSink>,
}

impl ClipboardLadder {
    pub fn new(fallback: impl DownloadSink + 'static) -> Self {
        Self { stages: Vec::new(), fallback: Box::new(fallback) }
    }

    /// Native clipboard and the platform copy utilities, in the order that leaves the text on the
    /// clipboard after this process exits.
    ///
    /// On Linux the native clipboard is served by the owning process and is lost when it exits
    /// unless a clipboard manager takes over, so the copy utilities, which keep serving in the
    /// background, go first there.
    pub fn system(fallback: impl DownloadSink + 'static) -> Self {
        let ladder = Self::new(fallback);
        if cfg!(target_os = "linux") {
            ladder.with_stage(CopyCommand::platform()).with_stage(NativeClipboard)
        } else {
            ladder.with_stage(NativeClipboard).with_stage(CopyCommand::platform())
        }
    }

    pub fn with_stage(mut self, stage: impl CopyStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn copy(&self, artifact: &ExportArtifact) -> CopyOutcome {
        let text = String::from_utf8_lossy(&artifact.bytes);
        for stage in &self.stages {
            match stage.copy(&text).await {
                Ok(()) => {
                    info!(stage = stage.name(), bytes = artifact.bytes.len(), "Copied to clipboard");
                    return CopyOutcome::Copied { stage: stage.name() };
                }
                Err(err) => warn!(stage = stage.name(), %err, "Copy stage failed"),
            }
        }

        match self.fallback.save(artifact) {
            Ok(path) => {
                info!(path = %path.display(), "Clipboard unavailable, downloaded instead");
                CopyOutcome::Downloaded { path }
            }
            Err(err) => {
                error!(%err, "Download fallback failed");
                CopyOutcome::Failed
            }
        }
    }
}
