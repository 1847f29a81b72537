// Destination store seam
//
// One shared, read-only store handle is constructed at process start and
// passed by reference into the orchestrator and uploader. No module-level
// singleton: explicit handles keep tests free to substitute clients.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use opendal::Operator;

/// User-metadata key carrying the content checksum alongside each object.
pub const CHECKSUM_METADATA_KEY: &str = "content-blake3";

/// Destination object store.
///
/// `put` returns a store token for the delivered object (the backend etag
/// when it provides one, otherwise the content checksum).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        checksum_hex: &str,
    ) -> Result<String>;
}

/// OpenDAL-backed store, shared across all batches and archives of a
/// process lifetime.
#[derive(Clone)]
pub struct OpenDalStore {
    operator: Operator,
}

impl OpenDalStore {
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }
}

#[async_trait]
impl ObjectStore for OpenDalStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        checksum_hex: &str,
    ) -> Result<String> {
        // Backends differ in which write options they honor; attaching an
        // unsupported option is a hard error in OpenDAL, so gate on the
        // advertised capability (fs has no content-type, s3 does).
        let capability = self.operator.info().full_capability();
        let mut write = self.operator.write_with(key, bytes);
        if capability.write_with_content_type {
            write = write.content_type(content_type);
        }
        if capability.write_with_user_metadata {
            write = write.user_metadata(HashMap::from([(
                CHECKSUM_METADATA_KEY.to_string(),
                checksum_hex.to_string(),
            )]));
        }
        let metadata = write.await?;

        Ok(metadata
            .etag()
            .map(str::to_string)
            .unwrap_or_else(|| checksum_hex.to_string()))
    }
}
