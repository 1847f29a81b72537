// Archive processor
//
// Drives one archive through extraction, classification, deduplication,
// batching and upload, then decides the terminal disposition and routes the
// file. All foreseeable failures are captured as data in the ArchiveResult;
// nothing escapes this boundary.
//
// Disposition rules: any extraction failure or any failed upload forces
// Failure; Success additionally requires at least one uploaded item, so an
// empty or fully-filtered archive is routed as Failure rather than silently
// archived.

use std::path::Path;
use std::sync::Arc;

use zip2store_core::batch::Batch;
use zip2store_core::{BatchAssembler, Classifier, NameDeduper, OutputItem, PipelineError};
use zip2store_extract::{ExtractLimits, ZipExtractor};
use zip2store_storage::{BatchUploader, UploadOutcome};

use crate::response::{ArchiveResult, Disposition};
use crate::routing::ArchiveRouter;

pub struct ArchiveProcessor {
    classifier: Classifier,
    limits: ExtractLimits,
    batch_size: usize,
    prefix_base: String,
    uploader: Arc<BatchUploader>,
    router: Arc<dyn ArchiveRouter>,
}

impl ArchiveProcessor {
    pub fn new(
        classifier: Classifier,
        limits: ExtractLimits,
        batch_size: usize,
        prefix_base: impl Into<String>,
        uploader: Arc<BatchUploader>,
        router: Arc<dyn ArchiveRouter>,
    ) -> Self {
        Self {
            classifier,
            limits,
            batch_size,
            prefix_base: prefix_base.into(),
            uploader,
            router,
        }
    }

    /// Run one full attempt for the archive at `path`. Always returns a
    /// terminal result; the per-attempt state (name set, pending batch) is
    /// owned here and dropped with the attempt.
    pub async fn process(&self, path: &Path) -> ArchiveResult {
        let archive = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!(archive = %archive, "processing archive");

        let mut extracted = 0usize;
        let mut filtered = 0usize;
        let mut uploaded = 0usize;
        let mut failed = 0usize;
        let mut extraction_error: Option<PipelineError> = None;
        let mut upload_cause: Option<String> = None;

        let mut deduper = NameDeduper::new();
        let mut assembler = BatchAssembler::new(self.batch_size, self.prefix_base.clone());

        match ZipExtractor::open(path, self.limits) {
            Err(err) => extraction_error = Some(err),
            Ok(extractor) => {
                for entry in extractor {
                    let item = match entry {
                        Ok(item) => item,
                        Err(err) => {
                            extraction_error = Some(err);
                            break;
                        }
                    };
                    extracted += 1;

                    let verdict = self.classifier.classify(&item.name, &item.bytes);
                    if !verdict.keep {
                        filtered += 1;
                        continue;
                    }

                    let name = deduper.resolve(verdict.output_name);
                    if let Some(batch) = assembler.push(OutputItem {
                        name,
                        bytes: item.bytes,
                    }) {
                        self.flush(batch, &mut uploaded, &mut failed, &mut upload_cause)
                            .await;
                    }
                }
            }
        }

        // An extraction failure drops the pending partial batch; batches
        // flushed before the abort stand, there is no rollback.
        if extraction_error.is_none() {
            if let Some(batch) = assembler.finish() {
                self.flush(batch, &mut uploaded, &mut failed, &mut upload_cause)
                    .await;
            }
        }

        let success = extraction_error.is_none() && failed == 0 && uploaded > 0;
        let cause = if let Some(err) = &extraction_error {
            Some(err.to_string())
        } else if failed > 0 {
            upload_cause
        } else if uploaded == 0 {
            Some("no files uploaded".to_string())
        } else {
            None
        };

        if let Err(err) = self.router.route(path, success) {
            // Side event only; the disposition is already decided.
            tracing::warn!(archive = %archive, error = %err, "routing failed");
        }

        let disposition = if success {
            Disposition::Success
        } else {
            Disposition::Failure
        };
        tracing::info!(
            archive = %archive,
            ?disposition,
            extracted,
            uploaded,
            filtered,
            failed,
            "archive attempt finished"
        );

        ArchiveResult {
            archive,
            disposition,
            extracted,
            uploaded,
            filtered,
            failed,
            cause,
        }
    }

    /// Synchronous hand-off of one sealed batch; extraction resumes only
    /// after the whole batch is accounted for.
    async fn flush(
        &self,
        batch: Batch,
        uploaded: &mut usize,
        failed: &mut usize,
        upload_cause: &mut Option<String>,
    ) {
        let batch_len = batch.len();
        match self.uploader.upload(batch).await {
            Ok(outcome) => {
                *uploaded += outcome.delivered();
                *failed += outcome.failed();
                if upload_cause.is_none() {
                    let first_failure = outcome.outcomes.iter().find_map(|o| match o {
                        UploadOutcome::Failed { key, error, .. } => {
                            Some(format!("upload of {key} failed: {error}"))
                        }
                        UploadOutcome::Delivered { .. } => None,
                    });
                    *upload_cause = first_failure;
                }
            }
            Err(err) => {
                // Sealed batches are never empty, so the precondition error
                // should not trip; account for every item if it ever does.
                *failed += batch_len;
                if upload_cause.is_none() {
                    *upload_cause = Some(format!("batch upload failed: {err:#}"));
                }
            }
        }
    }
}
