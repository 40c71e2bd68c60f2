//! Asset synchronization module
//!
//! Copies bundle assets into the vault with an overwrite-or-skip policy
//! and best-effort backups of replaced content.

mod assets;
mod backup;

pub use assets::{AssetSynchronizer, FileCopyOutcome, SyncReport, TreeSyncSummary};
pub use backup::{BackupOutcome, BackupPolicy};
