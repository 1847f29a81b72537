// zip2store binary entry point
//
// Runs exactly one invocation: load config, build the shared store handle,
// drain the intake directory under the configured time budget, and emit the
// invocation result as JSON on stdout. Archive failures are data inside the
// result; only config/init problems exit non-zero.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use zip2store_config::RuntimeConfig;
use zip2store_core::Classifier;
use zip2store_extract::ExtractLimits;
use zip2store_storage::{BatchUploader, OpenDalStore};

use zip2store::init;
use zip2store::intake::{FsAgeProbe, FsLister};
use zip2store::orchestrator::{Deadline, Orchestrator};
use zip2store::processor::ArchiveProcessor;
use zip2store::routing::FsRouter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::load()?;
    init::init_tracing(&config);
    info!(
        intake = %config.intake.dir,
        budget_secs = config.invocation.time_budget_secs,
        "starting invocation"
    );

    let operator = init::init_operator(&config)?;
    let store = Arc::new(OpenDalStore::new(operator));
    let uploader = Arc::new(BatchUploader::new(store, config.batch.upload_workers));

    let classifier = Classifier::new(
        config.classify.naming_pattern.as_deref(),
        config.classify.filter_pattern.as_deref(),
    )?;
    let limits = ExtractLimits {
        max_entries: config.limits.max_entries,
        max_entry_bytes: config.limits.max_entry_bytes,
        max_total_bytes: config.limits.max_total_bytes,
    };
    let processor = ArchiveProcessor::new(
        classifier,
        limits,
        config.batch.size,
        config.storage.prefix_base.clone(),
        uploader,
        Arc::new(FsRouter::new(&config.routing)),
    );
    let orchestrator = Orchestrator::new(Arc::new(FsLister), Arc::new(FsAgeProbe), processor, &config);

    let deadline = Deadline::from_budget(config.invocation.time_budget());
    let result = orchestrator.run(&deadline).await;

    info!(
        archives_processed = result.archives_processed,
        archives_failed = result.archives_failed,
        files_uploaded = result.files_uploaded,
        stopped_early = result.stopped_early,
        "invocation finished"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
