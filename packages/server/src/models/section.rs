use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ContentConfig;
use crate::content::{ChangeType, ContentKind, KeyParts, SectionPayload};
use crate::entity::{section, section_revision};
use crate::error::AppError;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SectionsQuery {
    /// Only return keys under `{page}.`.
    pub page: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SectionValue {
    pub content: Option<String>,
    pub image: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SectionMapResponse {
    /// Live values keyed by section key.
    pub sections: BTreeMap<String, SectionValue>,
}

impl FromIterator<section::Model> for SectionMapResponse {
    fn from_iter<I: IntoIterator<Item = section::Model>>(iter: I) -> Self {
        Self {
            sections: iter
                .into_iter()
                .map(|s| {
                    (
                        s.key,
                        SectionValue {
                            content: s.content,
                            image: s.image,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SectionResponse {
    #[schema(example = "home.hero.1.image")]
    pub key: String,
    pub content: Option<String>,
    pub image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<section::Model> for SectionResponse {
    fn from(m: section::Model) -> Self {
        Self {
            key: m.key,
            content: m.content,
            image: m.image,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateSectionRequest {
    #[schema(example = "Discover the Dolomites")]
    pub content: Option<String>,
    pub image: Option<String>,
}

impl UpdateSectionRequest {
    pub fn validate(&self, limits: &ContentConfig) -> Result<(), AppError> {
        if self.content.is_none() && self.image.is_none() {
            return Err(AppError::Validation(
                "Either content or image must be provided".into(),
            ));
        }
        if let Some(content) = &self.content
            && content.len() > limits.max_content_bytes
        {
            return Err(AppError::Validation(format!(
                "Content exceeds maximum size of {} bytes",
                limits.max_content_bytes
            )));
        }
        if let Some(image) = &self.image
            && (image.len() > 512 || image.chars().any(|c| c.is_control()))
        {
            return Err(AppError::Validation(
                "Image reference must be at most 512 characters without control characters"
                    .into(),
            ));
        }
        Ok(())
    }

    pub fn into_payload(self) -> SectionPayload {
        SectionPayload::new(self.content, self.image)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageUploadResponse {
    #[schema(example = true)]
    pub status: bool,
    pub message: String,
    /// Stored media file name, served under `/media/{image}`.
    pub image: String,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RevisionsQuery {
    /// Number of revisions to return (default 10, clamped to 1-50).
    pub limit: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RevisionResponse {
    pub id: i32,
    pub key: String,
    pub content: Option<String>,
    pub image: Option<String>,
    #[schema(example = "maria")]
    pub changed_by: String,
    pub change_type: ChangeType,
    pub created_at: DateTime<Utc>,
}

impl From<section_revision::Model> for RevisionResponse {
    fn from(m: section_revision::Model) -> Self {
        Self {
            id: m.id,
            key: m.key,
            content: m.content,
            image: m.image,
            changed_by: m.changed_by,
            change_type: m.change_type,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RevisionListResponse {
    pub revisions: Vec<RevisionResponse>,
    /// Total revisions for the key, independent of `limit`.
    pub total: u64,
}

/// One edited section in the admin change list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ChangeItem {
    pub key: String,
    pub page: String,
    pub section: Option<String>,
    pub instance: Option<String>,
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub content: Option<String>,
    pub image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<section::Model> for ChangeItem {
    fn from(m: section::Model) -> Self {
        let parts = KeyParts::parse(&m.key);
        let kind = if SectionPayload::from(&m).has_image() {
            ContentKind::Image
        } else {
            ContentKind::Text
        };
        Self {
            page: parts.page,
            section: parts.section,
            instance: parts.instance,
            field: parts.field,
            key: m.key,
            kind,
            content: m.content,
            image: m.image,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChangeListResponse {
    pub changes: Vec<ChangeItem>,
    pub total: u64,
}
