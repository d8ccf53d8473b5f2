//! Per-job working area.

use std::io;
use std::path::{Path, PathBuf};

use reel_models::JobId;
use tempfile::TempDir;

/// Isolated temporary directory for one render job.
///
/// The directory name starts with the job ID. It is removed by [`close`]
/// or, if the job future is dropped first, by the `TempDir` drop guard.
///
/// [`close`]: JobWorkspace::close
#[derive(Debug)]
pub struct JobWorkspace {
    dir: TempDir,
}

impl JobWorkspace {
    /// Create a working area for `job_id` under `parent`.
    pub fn create(parent: &Path, job_id: &JobId) -> io::Result<Self> {
        std::fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-", job_id))
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Local copy of the source snapshot.
    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join("source.jpg")
    }

    /// Directory of the synthesized frame sequence.
    pub fn frames_dir(&self) -> PathBuf {
        self.dir.path().join("frames")
    }

    /// Encoder output.
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("output.mp4")
    }

    /// Remove the working area and everything in it.
    pub async fn close(self) -> io::Result<()> {
        tokio::task::spawn_blocking(move || self.dir.close())
            .await
            .map_err(io::Error::other)?
    }
}
