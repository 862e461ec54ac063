//! File tree transfers between environments

pub mod rsync;
pub mod target;

pub use rsync::{FileSyncAdapter, FileSyncRequest, TransferReport, RSYNC_PROGRAM};
pub use target::{Direction, SyncTarget};
