// Initialization utilities
//
// Storage backend and logging/tracing setup

use anyhow::Result;
use opendal::Operator;
use tracing::info;
use zip2store_config::{LogFormat, RuntimeConfig, StorageBackend};

/// Build the shared OpenDAL operator from config. Constructed once at
/// process start and passed down explicitly; there is no global store
/// handle.
pub fn init_operator(config: &RuntimeConfig) -> Result<Operator> {
    info!(
        "initializing storage with backend: {}",
        config.storage.backend
    );

    let operator = match config.storage.backend {
        StorageBackend::Fs => {
            let fs = config
                .storage
                .fs
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("fs config required for filesystem backend"))?;
            info!("using filesystem storage at: {}", fs.path);

            let fs_builder = opendal::services::Fs::default().root(&fs.path);
            Operator::new(fs_builder)?.finish()
        }
        StorageBackend::S3 => {
            let s3 = config
                .storage
                .s3
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("s3 config required for S3 backend"))?;
            info!(
                "using S3 storage: bucket={}, region={}",
                s3.bucket, s3.region
            );

            let mut s3_builder = opendal::services::S3::default()
                .bucket(&s3.bucket)
                .region(&s3.region);

            if let Some(endpoint) = &s3.endpoint {
                s3_builder = s3_builder.endpoint(endpoint);
            }

            Operator::new(s3_builder)?.finish()
        }
    };

    Ok(operator)
}

/// Initialize tracing/logging from RuntimeConfig
pub fn init_tracing(config: &RuntimeConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            registry.with(fmt::layer().json()).init();
        }
        LogFormat::Text => {
            registry.with(fmt::layer()).init();
        }
    }
}
