// zip2store-storage - Destination store abstraction and batch uploads
//
// The ObjectStore trait is the seam between the pipeline and the durable
// store; production uses the OpenDAL-backed implementation, tests
// substitute doubles. BatchUploader delivers one sealed batch under a
// bounded concurrency window.

mod store;
mod uploader;

pub use store::{ObjectStore, OpenDalStore};
pub use uploader::{BatchOutcome, BatchUploader, UploadOutcome};
