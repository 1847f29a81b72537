// zip2store-extract - Streaming zip extraction with resource bounds
//
// One extractor pass yields entries lazily, forward-only, and enforces
// three bounds: entry count, per-entry decompressed size, and cumulative
// decompressed size. The first bound crossed aborts the pass; entries
// already yielded stand. Per-entry size is enforced against the actual
// decompressed byte count, not just the declared size, since zip headers
// can lie. The archive file handle lives inside the iterator and is
// released by Drop on every exit path, including early abandonment.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;
use zip2store_core::error::BoxedCause;
use zip2store_core::{ExtractionKind, PipelineError};

/// Resource bounds for one extraction pass.
#[derive(Debug, Clone, Copy)]
pub struct ExtractLimits {
    pub max_entries: usize,
    pub max_entry_bytes: u64,
    pub max_total_bytes: u64,
}

/// One decompressed entry. Valid only within the owning extractor pass;
/// never persisted.
#[derive(Debug)]
pub struct ExtractedItem {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Lazy, finite, non-restartable sequence of archive entries.
///
/// Directory entries are skipped transparently. After the first error the
/// iterator is exhausted.
#[derive(Debug)]
pub struct ZipExtractor {
    path: String,
    archive: ZipArchive<File>,
    limits: ExtractLimits,
    index: usize,
    yielded: usize,
    total_bytes: u64,
    finished: bool,
}

impl ZipExtractor {
    /// Open an archive for one pass. Fails with a corruption error when the
    /// file cannot be opened or its central directory cannot be parsed.
    pub fn open(path: &Path, limits: ExtractLimits) -> Result<Self, PipelineError> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|e| {
            corrupt(&display, "cannot open archive", Some(Box::new(e)))
        })?;
        let archive = ZipArchive::new(file).map_err(|e| {
            corrupt(&display, "cannot parse archive structure", Some(Box::new(e)))
        })?;
        Ok(Self {
            path: display,
            archive,
            limits,
            index: 0,
            yielded: 0,
            total_bytes: 0,
            finished: false,
        })
    }

    /// Number of non-directory entries yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// Read the entry at `idx`. `Ok(None)` means a skipped directory entry.
    fn read_entry(&mut self, idx: usize) -> Result<Option<ExtractedItem>, PipelineError> {
        let mut entry = self.archive.by_index(idx).map_err(|e| {
            corrupt(
                &self.path,
                format!("cannot read entry {idx}"),
                Some(Box::new(e)),
            )
        })?;

        if entry.is_dir() {
            return Ok(None);
        }

        if self.yielded >= self.limits.max_entries {
            return Err(PipelineError::extraction(
                &self.path,
                ExtractionKind::EntryLimit,
                format!("archive holds more than {} entries", self.limits.max_entries),
                None,
            ));
        }

        let name = leaf_name(entry.name());

        // Declared size check first: rejects honest oversized entries
        // without decompressing them.
        if entry.size() > self.limits.max_entry_bytes {
            return Err(PipelineError::extraction(
                &self.path,
                ExtractionKind::EntrySizeLimit,
                format!(
                    "entry {} declares {} bytes, limit is {}",
                    name,
                    entry.size(),
                    self.limits.max_entry_bytes
                ),
                None,
            ));
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .by_ref()
            .take(self.limits.max_entry_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| {
                corrupt(
                    &self.path,
                    format!("cannot decompress entry {name}"),
                    Some(Box::new(e)),
                )
            })?;

        if bytes.len() as u64 > self.limits.max_entry_bytes {
            return Err(PipelineError::extraction(
                &self.path,
                ExtractionKind::EntrySizeLimit,
                format!(
                    "entry {} decompresses past the {}-byte limit",
                    name, self.limits.max_entry_bytes
                ),
                None,
            ));
        }

        self.total_bytes += bytes.len() as u64;
        if self.total_bytes > self.limits.max_total_bytes {
            return Err(PipelineError::extraction(
                &self.path,
                ExtractionKind::TotalSizeLimit,
                format!(
                    "cumulative decompressed size exceeds {} bytes",
                    self.limits.max_total_bytes
                ),
                None,
            ));
        }

        Ok(Some(ExtractedItem { name, bytes }))
    }
}

impl Iterator for ZipExtractor {
    type Item = Result<ExtractedItem, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.index >= self.archive.len() {
                self.finished = true;
                return None;
            }
            let idx = self.index;
            self.index += 1;
            match self.read_entry(idx) {
                Ok(None) => continue,
                Ok(Some(item)) => {
                    self.yielded += 1;
                    return Some(Ok(item));
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

fn corrupt(path: &str, message: impl Into<String>, source: Option<BoxedCause>) -> PipelineError {
    PipelineError::extraction(path, ExtractionKind::Corrupt, message, source)
}

/// Final path component of an entry name; embedded directories inside the
/// archive are transport detail, output keys are flat.
fn leaf_name(raw: &str) -> String {
    raw.rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or(raw)
        .to_string()
}
