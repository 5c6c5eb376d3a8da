use std::fmt;
use std::str::FromStr;

use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

use crate::entity::{section, section_revision, section_snapshot};

/// The `(content, image)` pair stored for a key.
///
/// A field that is `None` or an empty string counts as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPayload {
    pub content: Option<String>,
    pub image: Option<String>,
}

impl SectionPayload {
    pub fn new(content: Option<String>, image: Option<String>) -> Self {
        Self { content, image }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            image: None,
        }
    }

    pub fn image(image: impl Into<String>) -> Self {
        Self {
            content: None,
            image: Some(image.into()),
        }
    }

    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        !self.has_content() && !self.has_image()
    }

    pub fn has_kind(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Text => self.has_content(),
            ContentKind::Image => self.has_image(),
        }
    }

    /// Change type recorded when this payload is written by an edit.
    pub fn change_type(&self) -> ChangeType {
        if self.has_image() {
            ChangeType::ImageUpload
        } else {
            ChangeType::TextUpdate
        }
    }
}

impl From<&section::Model> for SectionPayload {
    fn from(m: &section::Model) -> Self {
        Self::new(m.content.clone(), m.image.clone())
    }
}

impl From<&section_snapshot::Model> for SectionPayload {
    fn from(m: &section_snapshot::Model) -> Self {
        Self::new(m.content.clone(), m.image.clone())
    }
}

impl From<&section_revision::Model> for SectionPayload {
    fn from(m: &section_revision::Model) -> Self {
        Self::new(m.content.clone(), m.image.clone())
    }
}

/// Why a revision was written.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
    sea_orm::DeriveActiveEnum,
    sea_orm::EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    #[sea_orm(string_value = "text_update")]
    TextUpdate,
    #[sea_orm(string_value = "image_upload")]
    ImageUpload,
    #[sea_orm(string_value = "restore")]
    Restore,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextUpdate => "text_update",
            Self::ImageUpload => "image_upload",
            Self::Restore => "restore",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content type filter used by type-scoped resets and the change list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub const ALL: &'static [ContentKind] = &[Self::Text, Self::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid content kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContentKindError {
    invalid: String,
}

impl fmt::Display for ParseContentKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid type '{}'. Valid values: {}",
            self.invalid,
            ContentKind::ALL
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseContentKindError {}

impl FromStr for ContentKind {
    type Err = ParseContentKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(ParseContentKindError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Whether a write may create the key's baseline snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotPolicy {
    Capture,
    Suppress,
}

/// Per-call write context: who is writing and whether snapshots are taken.
///
/// Restores run with a suppressed context so their writes never become a
/// new baseline. Suppressing an already suppressed context is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct WriteContext<'a> {
    pub changed_by: &'a str,
    pub snapshots: SnapshotPolicy,
}

impl<'a> WriteContext<'a> {
    pub fn new(changed_by: &'a str) -> Self {
        Self {
            changed_by,
            snapshots: SnapshotPolicy::Capture,
        }
    }

    pub fn suppressed(self) -> Self {
        Self {
            snapshots: SnapshotPolicy::Suppress,
            ..self
        }
    }

    pub fn captures_snapshots(&self) -> bool {
        self.snapshots == SnapshotPolicy::Capture
    }
}
