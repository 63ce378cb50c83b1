//! The persisted state of paired deployments: typed constructor arguments, the
//! record of each deployed artifact, and the stores that keep those records.
mod args;
mod record;
pub mod serde_utils;
mod store;

pub use args::ConstructorArg;
pub use record::DeploymentRecord;
pub use store::{JsonRecordStore, MemoryRecordStore, RecordStore};
