use std::path::{Path, PathBuf};

use tracing::info;

use super::ExportArtifact;
use crate::common::Result;

/// Destination for downloaded artifacts.
pub trait DownloadSink: Send + Sync {
    fn save(&self, artifact: &ExportArtifact) -> Result<PathBuf>;
}

/// Writes artifacts into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download directory, or the working directory when there is none.
    pub fn downloads() -> Self {
        Self::new(dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, artifact: &ExportArtifact) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.bytes)?;
        info!(path = %path.display(), mime = artifact.mime, bytes = artifact.bytes.len(), "Saved download");
        Ok(path)
    }
}

#[cfg(test)]
mod directory_sink_tests {
    use super::{DirectorySink, DownloadSink};
    use crate::export::ExportArtifact;
    use crate::payload::PayloadKind;

    #[test]
    fn test_save_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("nested/out"));
        let artifact = ExportArtifact::svg(PayloadKind::Contact, "<svg/>");

        let path = sink.save(&artifact).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), artifact.filename);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<svg/>");
    }
}
