// Terminal archive routing
//
// After an attempt is decided, the archive file is moved to the archived or
// failed location (or deleted on success, per config). Routing failures are
// best-effort side events; the caller never lets them change an
// already-decided disposition.

use std::path::{Path, PathBuf};

use zip2store_core::PipelineError;
use zip2store_config::RoutingConfig;

/// Moves one archive to its terminal location.
pub trait ArchiveRouter: Send + Sync {
    fn route(&self, path: &Path, success: bool) -> Result<(), PipelineError>;
}

/// Filesystem router: rename into the archived/ or failed/ directory,
/// creating it on first use.
pub struct FsRouter {
    archived_dir: PathBuf,
    failed_dir: PathBuf,
    delete_on_success: bool,
}

impl FsRouter {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            archived_dir: PathBuf::from(&config.archived_dir),
            failed_dir: PathBuf::from(&config.failed_dir),
            delete_on_success: config.delete_on_success,
        }
    }
}

impl ArchiveRouter for FsRouter {
    fn route(&self, path: &Path, success: bool) -> Result<(), PipelineError> {
        let display = path.display().to_string();

        if success && self.delete_on_success {
            return std::fs::remove_file(path).map_err(|e| {
                PipelineError::routing(&display, "cannot delete archive", Some(Box::new(e)))
            });
        }

        let dest_dir = if success {
            &self.archived_dir
        } else {
            &self.failed_dir
        };
        std::fs::create_dir_all(dest_dir).map_err(|e| {
            PipelineError::routing(
                &display,
                format!("cannot create {}", dest_dir.display()),
                Some(Box::new(e)),
            )
        })?;

        let file_name = path.file_name().ok_or_else(|| {
            PipelineError::routing(&display, "archive path has no file name", None)
        })?;
        std::fs::rename(path, dest_dir.join(file_name)).map_err(|e| {
            PipelineError::routing(
                &display,
                format!("cannot move archive into {}", dest_dir.display()),
                Some(Box::new(e)),
            )
        })
    }
}
