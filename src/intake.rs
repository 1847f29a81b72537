// Intake listing and eligibility
//
// Thin filesystem collaborators behind traits so tests can substitute
// doubles. Listing failures terminate the invocation; age-probe failures
// fail open (the archive is included) because excluding a file on a stat
// hiccup could strand it forever.

use std::path::Path;
use std::time::Duration;

use zip2store_core::PipelineError;

/// Lists candidate file names in the intake directory.
pub trait DirectoryLister: Send + Sync {
    fn list(&self, dir: &Path) -> Result<Vec<String>, PipelineError>;
}

/// Reports how long ago a file was last modified.
pub trait AgeProbe: Send + Sync {
    fn age(&self, path: &Path) -> Result<Duration, PipelineError>;
}

/// An archive name is eligible when it is a `.zip` (ASCII case-insensitive)
/// and not a hidden dotfile.
pub fn is_eligible(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".zip") && lower.len() > ".zip".len()
}

/// `std::fs::read_dir`-backed lister. Returns plain file names, sorted for
/// a stable processing order across invocations.
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, dir: &Path) -> Result<Vec<String>, PipelineError> {
        let display = dir.display().to_string();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            PipelineError::listing(&display, "cannot read intake directory", Some(Box::new(e)))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                PipelineError::listing(&display, "cannot read directory entry", Some(Box::new(e)))
            })?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// mtime-backed age probe.
///
/// Stat failures share the `Listing` error variant: selection-phase errors
/// (enumerate, stat) are one family, and the taxonomy stays closed. Callers
/// fail open on them either way.
pub struct FsAgeProbe;

impl AgeProbe for FsAgeProbe {
    fn age(&self, path: &Path) -> Result<Duration, PipelineError> {
        let display = path.display().to_string();
        let metadata = std::fs::metadata(path).map_err(|e| {
            PipelineError::listing(&display, "cannot stat archive", Some(Box::new(e)))
        })?;
        let modified = metadata.modified().map_err(|e| {
            PipelineError::listing(&display, "no modification time", Some(Box::new(e)))
        })?;
        // A future mtime (clock skew) counts as brand new.
        Ok(modified.elapsed().unwrap_or(Duration::ZERO))
    }
}
