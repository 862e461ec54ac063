//! On-disk state: database dump retention and the operation log

pub mod backups;
pub mod oplog;

pub use backups::{BackupStore, DumpCategory};
pub use oplog::OperationLog;
