// Pipeline error taxonomy
//
// A closed set of tagged variants, one per fallible stage. Every variant
// carries the path or key it was working on, a human-readable message, and
// an optional wrapped cause. Failures are captured as data at the processor
// and orchestrator boundaries; nothing here is meant to be panicked on.

use std::error::Error as StdError;

/// Boxed prior cause carried inside a [`PipelineError`] variant.
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Which extraction bound (or structural failure) aborted an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    /// The archive could not be opened or an entry could not be parsed.
    Corrupt,
    /// The entry-count bound was crossed.
    EntryLimit,
    /// A single entry exceeded the per-entry size bound.
    EntrySizeLimit,
    /// The cumulative decompressed size bound was crossed.
    TotalSizeLimit,
}

impl std::fmt::Display for ExtractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionKind::Corrupt => write!(f, "corrupt archive"),
            ExtractionKind::EntryLimit => write!(f, "entry limit exceeded"),
            ExtractionKind::EntrySizeLimit => write!(f, "entry size limit exceeded"),
            ExtractionKind::TotalSizeLimit => write!(f, "total size limit exceeded"),
        }
    }
}

/// Error raised by one stage of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to list {path}: {message}")]
    Listing {
        path: String,
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("failed to extract {path}: {kind}: {message}")]
    Extraction {
        path: String,
        kind: ExtractionKind,
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("failed to upload {key}: {message}")]
    Upload {
        key: String,
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("failed to route {path}: {message}")]
    Routing {
        path: String,
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },
}

impl PipelineError {
    pub fn listing(
        path: impl Into<String>,
        message: impl Into<String>,
        source: Option<BoxedCause>,
    ) -> Self {
        PipelineError::Listing {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    pub fn extraction(
        path: impl Into<String>,
        kind: ExtractionKind,
        message: impl Into<String>,
        source: Option<BoxedCause>,
    ) -> Self {
        PipelineError::Extraction {
            path: path.into(),
            kind,
            message: message.into(),
            source,
        }
    }

    pub fn upload(
        key: impl Into<String>,
        message: impl Into<String>,
        source: Option<BoxedCause>,
    ) -> Self {
        PipelineError::Upload {
            key: key.into(),
            message: message.into(),
            source,
        }
    }

    pub fn routing(
        path: impl Into<String>,
        message: impl Into<String>,
        source: Option<BoxedCause>,
    ) -> Self {
        PipelineError::Routing {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// The extraction failure kind, when this is an extraction error.
    pub fn extraction_kind(&self) -> Option<ExtractionKind> {
        match self {
            PipelineError::Extraction { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Walk the `source()` chain down to the innermost error.
///
/// Pure replacement for cause-chasing via virtual properties: callers that
/// need the original I/O or store error inspect the return value directly.
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}
