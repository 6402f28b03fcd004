//! Persistence for stage outputs.

pub mod snapshot;

pub use snapshot::{latest_name, new_version, version_at, SnapshotKind, SnapshotStore};
