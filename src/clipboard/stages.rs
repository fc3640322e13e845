use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::CopyStage;
use crate::common::{Error, Result};

// Native clipboard
//------------------------------------------------------------------------------

/// Writes through the platform clipboard API.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeClipboard;

#[async_trait]
impl CopyStage for NativeClipboard {
    fn name(&self) -> &'static str {
        "native clipboard"
    }

    async fn copy(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(text)?;
            Ok(())
        })
        .await?
    }
}

// Copy command
//------------------------------------------------------------------------------

/// Pipes the text into a clipboard utility, trying each program in turn until one exits
/// successfully.
#[derive(Debug, Clone)]
pub struct CopyCommand {
    programs: Vec<(String, Vec<String>)>,
}

impl CopyCommand {
    pub fn new(programs: Vec<(String, Vec<String>)>) -> Self {
        Self { programs }
    }

    /// Clipboard utilities commonly installed on the current platform.
    pub fn platform() -> Self {
        let programs: Vec<(&str, Vec<&str>)> = if cfg!(target_os = "macos") {
            vec![("pbcopy", vec![])]
        } else if cfg!(windows) {
            vec![("clip", vec![])]
        } else {
            vec![
                ("wl-copy", vec![]),
                ("xclip", vec!["-selection", "clipboard"]),
                ("xsel", vec!["--clipboard", "--input"]),
            ]
        };
        Self::new(
            programs
                .into_iter()
                .map(|(p, args)| (p.to_string(), args.into_iter().map(String::from).collect()))
                .collect(),
        )
    }

    async fn run(program: &str, args: &[String], text: &str) -> Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }
        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::Clipboard(format!("{program} exited with {status}")))
        }
    }
}

#[async_trait]
impl CopyStage for CopyCommand {
    fn name(&self) -> &'static str {
        "copy command"
    }

    async fn copy(&self, text: &str) -> Result<()> {
        let mut last_err = Error::Clipboard("no clipboard utility configured".to_string());
        for (program, args) in &self.programs {
            match Self::run(program, args, text).await {
                Ok(()) => {
                    debug!(program, "Copied via clipboard utility");
                    return Ok(());
                }
                Err(err) => {
                    debug!(program, %err, "Clipboard utility failed");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}
