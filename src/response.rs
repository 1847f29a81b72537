// Invocation response types
//
// Every listed, eligible archive that was attempted ends in exactly one
// ArchiveResult; the invocation aggregates them into a single serializable
// response. Failures are data here, not errors.

use serde::Serialize;
use zip2store_core::PipelineError;

/// Terminal classification of one archive attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Success,
    Failure,
}

/// Terminal result of one archive attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveResult {
    pub archive: String,
    pub disposition: Disposition,
    pub extracted: usize,
    pub uploaded: usize,
    pub filtered: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ArchiveResult {
    pub fn is_success(&self) -> bool {
        self.disposition == Disposition::Success
    }
}

/// Aggregate over all archive results of one invocation.
#[derive(Debug, Serialize)]
pub struct InvocationResult {
    pub archives_processed: usize,
    pub archives_failed: usize,
    pub files_uploaded: usize,
    pub files_failed: usize,
    pub files_filtered: usize,
    pub stopped_early: bool,
    pub results: Vec<ArchiveResult>,
}

impl InvocationResult {
    pub fn from_results(results: Vec<ArchiveResult>, stopped_early: bool) -> Self {
        let archives_processed = results.iter().filter(|r| r.is_success()).count();
        Self {
            archives_processed,
            archives_failed: results.len() - archives_processed,
            files_uploaded: results.iter().map(|r| r.uploaded).sum(),
            files_failed: results.iter().map(|r| r.failed).sum(),
            files_filtered: results.iter().map(|r| r.filtered).sum(),
            stopped_early,
            results,
        }
    }

    /// Listing itself failed: one synthetic failure entry, zero counts, no
    /// archive attempted.
    pub fn listing_failure(err: &PipelineError) -> Self {
        let entry = ArchiveResult {
            archive: String::new(),
            disposition: Disposition::Failure,
            extracted: 0,
            uploaded: 0,
            filtered: 0,
            failed: 0,
            cause: Some(err.to_string()),
        };
        Self {
            archives_processed: 0,
            archives_failed: 0,
            files_uploaded: 0,
            files_failed: 0,
            files_filtered: 0,
            stopped_early: false,
            results: vec![entry],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(disposition: Disposition, uploaded: usize, filtered: usize, failed: usize) -> ArchiveResult {
        ArchiveResult {
            archive: "a.zip".to_string(),
            disposition,
            extracted: uploaded + filtered + failed,
            uploaded,
            filtered,
            failed,
            cause: None,
        }
    }

    #[test]
    fn aggregation_sums_counts_and_splits_dispositions() {
        let invocation = InvocationResult::from_results(
            vec![
                result(Disposition::Success, 3, 1, 0),
                result(Disposition::Failure, 1, 0, 2),
            ],
            false,
        );
        assert_eq!(invocation.archives_processed, 1);
        assert_eq!(invocation.archives_failed, 1);
        assert_eq!(invocation.files_uploaded, 4);
        assert_eq!(invocation.files_failed, 2);
        assert_eq!(invocation.files_filtered, 1);
        assert!(!invocation.stopped_early);
    }

    #[test]
    fn listing_failure_reports_one_synthetic_entry_with_zero_counts() {
        let err = PipelineError::listing("inbox", "unreachable", None);
        let invocation = InvocationResult::listing_failure(&err);
        assert_eq!(invocation.archives_processed, 0);
        assert_eq!(invocation.archives_failed, 0);
        assert_eq!(invocation.results.len(), 1);
        assert_eq!(invocation.results[0].disposition, Disposition::Failure);
        assert!(invocation.results[0].cause.as_ref().unwrap().contains("unreachable"));
    }
}
