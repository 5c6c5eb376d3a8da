//! Content revisioning for site sections.
//!
//! Live values live in [`SectionStore`]. The first edit of a key captures its
//! prior value in [`SnapshotStore`], and every write is appended to
//! [`RevisionLog`]. [`RestoreEngine`] resets keys back to their snapshot, or
//! removes them when there is nothing to restore.

mod error;
pub mod key;
mod restore;
mod revision;
mod section;
mod snapshot;
mod types;

pub use error::ContentError;
pub use key::KeyParts;
pub use restore::{ResetScope, RestoreEngine, RestoreOutcome, RestoreSummary};
pub use revision::RevisionLog;
pub use section::SectionStore;
pub use snapshot::SnapshotStore;
pub use types::{
    ChangeType, ContentKind, ParseContentKindError, SectionPayload, SnapshotPolicy, WriteContext,
};
