// zip2store - Deadline-aware zip intake pipeline
//
// Archives deposited in a watched intake directory are extracted under
// strict resource bounds, classified and filtered by content, grouped into
// uniquely-prefixed batches, and uploaded to the destination object store.
// Each invocation runs under a wall-clock budget and stops between archives
// when the remaining time drops below the configured buffer, so repeated,
// non-overlapping invocations can safely resume the backlog.
//
// Delivery is at-least-once: a failed archive that gets reprocessed will
// re-upload items already present under a different batch prefix. Duplicate
// objects with identical content and distinct keys are expected, not a bug.

pub mod init;
pub mod intake;
pub mod orchestrator;
pub mod processor;
pub mod response;
pub mod routing;

pub use intake::{is_eligible, AgeProbe, DirectoryLister, FsAgeProbe, FsLister};
pub use orchestrator::{Deadline, Orchestrator};
pub use processor::ArchiveProcessor;
pub use response::{ArchiveResult, Disposition, InvocationResult};
pub use routing::{ArchiveRouter, FsRouter};
