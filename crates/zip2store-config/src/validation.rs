// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_intake_config(&config.intake)?;
    validate_limits_config(&config.limits)?;
    validate_classify_config(&config.classify)?;
    validate_batch_config(&config.batch)?;
    validate_storage_config(&config.storage)?;
    validate_routing_config(&config.routing)?;
    validate_invocation_config(&config.invocation)?;
    Ok(())
}

fn validate_intake_config(config: &IntakeConfig) -> Result<()> {
    if config.dir.is_empty() {
        bail!("intake.dir must not be empty");
    }

    if config.max_archives == 0 {
        bail!("intake.max_archives must be greater than 0");
    }

    Ok(())
}

fn validate_limits_config(config: &LimitsConfig) -> Result<()> {
    if config.max_entries == 0 {
        bail!("limits.max_entries must be greater than 0");
    }

    if config.max_entry_bytes == 0 {
        bail!("limits.max_entry_bytes must be greater than 0");
    }

    if config.max_total_bytes == 0 {
        bail!("limits.max_total_bytes must be greater than 0");
    }

    if config.max_entry_bytes > config.max_total_bytes {
        warn!(
            max_entry_bytes = config.max_entry_bytes,
            max_total_bytes = config.max_total_bytes,
            "limits.max_entry_bytes exceeds limits.max_total_bytes; the total limit wins"
        );
    }

    Ok(())
}

fn validate_classify_config(config: &ClassifyConfig) -> Result<()> {
    // Patterns run over raw entry bytes; compile with the bytes engine the
    // classifier uses.
    if let Some(pattern) = &config.naming_pattern {
        if let Err(err) = regex::bytes::Regex::new(pattern) {
            bail!("classify.naming_pattern is not a valid regex: {err}");
        }
    }

    if let Some(pattern) = &config.filter_pattern {
        if let Err(err) = regex::bytes::Regex::new(pattern) {
            bail!("classify.filter_pattern is not a valid regex: {err}");
        }
    }

    Ok(())
}

fn validate_batch_config(config: &BatchConfig) -> Result<()> {
    if config.size == 0 {
        bail!("batch.size must be greater than 0");
    }

    if config.upload_workers == 0 {
        bail!("batch.upload_workers must be greater than 0");
    }

    if config.size > 10_000 {
        warn!(
            size = config.size,
            "batch.size is very large; one batch is held in memory while uploading"
        );
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<()> {
    match config.backend {
        StorageBackend::Fs => {
            let fs = config
                .fs
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("fs storage backend requires 'fs' configuration"))?;

            if fs.path.is_empty() {
                bail!("storage.fs.path must not be empty");
            }
        }
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("s3 storage backend requires 's3' configuration"))?;

            if s3.bucket.is_empty() {
                bail!("storage.s3.bucket is required for S3 backend");
            }

            if s3.region.is_empty() {
                bail!("storage.s3.region is required for S3 backend");
            }
        }
    }

    Ok(())
}

fn validate_routing_config(config: &RoutingConfig) -> Result<()> {
    if config.archived_dir.is_empty() {
        bail!("routing.archived_dir must not be empty");
    }

    if config.failed_dir.is_empty() {
        bail!("routing.failed_dir must not be empty");
    }

    if config.archived_dir == config.failed_dir {
        bail!("routing.archived_dir and routing.failed_dir must differ");
    }

    Ok(())
}

fn validate_invocation_config(config: &InvocationConfig) -> Result<()> {
    if config.time_budget_secs == 0 {
        bail!("invocation.time_budget_secs must be greater than 0");
    }

    if config.deadline_buffer_secs >= config.time_budget_secs {
        bail!("invocation.deadline_buffer_secs must be smaller than the time budget");
    }

    Ok(())
}
