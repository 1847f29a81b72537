// zip2store-core - Pure processing logic for the zip intake pipeline
//
// This crate contains the stages that need no I/O and no async:
// content classification, output-name deduplication, batch assembly,
// and the pipeline error taxonomy. Everything here is deterministic
// for the same input, except the collision disambiguator, which is
// deliberately random.

pub mod batch;
pub mod classify;
pub mod dedup;
pub mod error;

pub use batch::{Batch, BatchAssembler, OutputItem};
pub use classify::{Classification, Classifier};
pub use dedup::NameDeduper;
pub use error::{root_cause, ExtractionKind, PipelineError};
