pub mod section;
pub mod section_revision;
pub mod section_snapshot;
