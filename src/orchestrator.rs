// Invocation orchestrator
//
// One invocation: list the intake directory, keep eligible and sufficiently
// old archives, and process them strictly one at a time. The deadline is
// checked only between archives; a started archive always runs to
// completion, so the buffer must be sized against worst-case single-archive
// time.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use zip2store_config::RuntimeConfig;

use crate::intake::{is_eligible, AgeProbe, DirectoryLister};
use crate::processor::ArchiveProcessor;
use crate::response::InvocationResult;

/// Wall-clock budget for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn from_budget(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

pub struct Orchestrator {
    lister: Arc<dyn DirectoryLister>,
    ages: Arc<dyn AgeProbe>,
    processor: ArchiveProcessor,
    intake_dir: PathBuf,
    min_age: Duration,
    max_archives: usize,
    deadline_buffer: Duration,
}

impl Orchestrator {
    pub fn new(
        lister: Arc<dyn DirectoryLister>,
        ages: Arc<dyn AgeProbe>,
        processor: ArchiveProcessor,
        config: &RuntimeConfig,
    ) -> Self {
        Self {
            lister,
            ages,
            processor,
            intake_dir: PathBuf::from(&config.intake.dir),
            min_age: config.intake.min_age(),
            max_archives: config.intake.max_archives,
            deadline_buffer: config.invocation.deadline_buffer(),
        }
    }

    /// Run one invocation to completion under `deadline`. Never fails for
    /// enumerable inputs: every outcome, including a listing failure, is
    /// reported inside the InvocationResult.
    pub async fn run(&self, deadline: &Deadline) -> InvocationResult {
        let names = match self.lister.list(&self.intake_dir) {
            Ok(names) => names,
            Err(err) => {
                tracing::error!(error = %err, "intake listing failed; no archives attempted");
                return InvocationResult::listing_failure(&err);
            }
        };

        let mut selected = Vec::new();
        for name in names.into_iter().filter(|name| is_eligible(name)) {
            let path = self.intake_dir.join(&name);
            match self.ages.age(&path) {
                Ok(age) if age < self.min_age => {
                    tracing::debug!(archive = %name, "skipping archive still settling");
                }
                Ok(_) => selected.push(name),
                // Fail open: a stat hiccup must not strand the archive.
                Err(err) => {
                    tracing::warn!(archive = %name, error = %err, "age probe failed; including archive");
                    selected.push(name);
                }
            }
        }

        if selected.len() > self.max_archives {
            tracing::info!(
                eligible = selected.len(),
                cap = self.max_archives,
                "capping archives this invocation; surplus waits for the next one"
            );
            selected.truncate(self.max_archives);
        }

        let mut results = Vec::new();
        let mut stopped_early = false;
        for name in selected {
            if deadline.remaining() < self.deadline_buffer {
                tracing::info!(
                    remaining_ms = deadline.remaining().as_millis() as u64,
                    pending = %name,
                    "deadline buffer reached; stopping before next archive"
                );
                stopped_early = true;
                break;
            }
            let path = self.intake_dir.join(&name);
            results.push(self.processor.process(&path).await);
        }

        InvocationResult::from_results(results, stopped_early)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_remaining_counts_down_and_saturates() {
        let deadline = Deadline::from_budget(Duration::from_secs(60));
        assert!(deadline.remaining() <= Duration::from_secs(60));
        assert!(deadline.remaining() > Duration::from_secs(59));

        let expired = Deadline::from_budget(Duration::ZERO);
        assert_eq!(expired.remaining(), Duration::ZERO);
    }
}
