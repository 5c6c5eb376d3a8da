use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use common::storage::{BoxReader, MediaRef, MediaStore};
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use crate::content::{RestoreEngine, RestoreSummary, RevisionLog, SectionStore, WriteContext};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::section::{
    ImageUploadResponse, RevisionListResponse, RevisionResponse, RevisionsQuery,
    SectionMapResponse, SectionResponse, SectionsQuery, UpdateSectionRequest,
};
use crate::models::shared::{StatusResponse, clamp_limit, validate_key, validate_page};
use crate::state::AppState;
use crate::utils::filename::upload_extension;

/// Body limit for image uploads: the configured image size plus multipart overhead.
pub fn image_upload_body_limit(max_image_size: u64) -> DefaultBodyLimit {
    let limit = usize::try_from(max_image_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(limit.saturating_add(64 * 1024))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Sections",
    operation_id = "listSections",
    summary = "Read live section values",
    description = "Returns every live section as a key to `{content, image}` map. Pass `page` to \
        restrict the map to keys under `{page}.`. Keys absent from the map use the site's \
        built-in defaults. Public.",
    params(SectionsQuery),
    responses(
        (status = 200, description = "Live sections", body = SectionMapResponse),
        (status = 400, description = "Invalid page (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(page = ?query.page))]
pub async fn list_sections(
    State(state): State<AppState>,
    Query(query): Query<SectionsQuery>,
) -> Result<Json<SectionMapResponse>, AppError> {
    let sections = SectionStore::new(&state.db);
    let rows = match query.page.as_deref() {
        Some(page) => {
            validate_page(page)?;
            sections.by_prefix(&format!("{page}.")).await?
        }
        None => sections.all().await?,
    };

    Ok(Json(rows.into_iter().collect()))
}

#[utoipa::path(
    get,
    path = "/{key}",
    tag = "Sections",
    operation_id = "getSection",
    summary = "Get one live section",
    params(("key" = String, Path, description = "Section key, e.g. `home.hero.1.image`")),
    responses(
        (status = 200, description = "Live section", body = SectionResponse),
        (status = 404, description = "Section has no live value (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_section(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SectionResponse>, AppError> {
    let section = SectionStore::new(&state.db)
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Section '{key}' not found")))?;

    Ok(Json(section.into()))
}

#[utoipa::path(
    put,
    path = "/{key}",
    tag = "Sections",
    operation_id = "updateSection",
    summary = "Write a section",
    description = "Sets the live value of a section. The first write of a key records its \
        previous value as the restore baseline; every write is added to the revision history. \
        Requires `content:edit` permission.",
    params(("key" = String, Path, description = "Section key")),
    request_body = UpdateSectionRequest,
    responses(
        (status = 200, description = "Section updated", body = StatusResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user = %auth_user.username))]
pub async fn update_section(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    AppJson(payload): AppJson<UpdateSectionRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    auth_user.require_permission("content:edit")?;
    validate_key(&key, state.config.content.max_key_length)?;
    payload.validate(&state.config.content)?;

    SectionStore::new(&state.db)
        .update_with_backup(
            &key,
            &payload.into_payload(),
            WriteContext::new(&auth_user.username),
        )
        .await?;

    Ok(Json(StatusResponse::ok(format!("Section '{key}' updated"))))
}

#[utoipa::path(
    post,
    path = "/{key}/image",
    tag = "Sections",
    operation_id = "uploadSectionImage",
    summary = "Upload an image for a section",
    description = "Stores the `file` multipart field and sets it as the section's image. The \
        section's text content is kept. Requires `content:edit` permission.",
    params(("key" = String, Path, description = "Section key")),
    request_body(content_type = "multipart/form-data", description = "Image file in the `file` field"),
    responses(
        (status = 200, description = "Image stored and section updated", body = ImageUploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user = %auth_user.username))]
pub async fn upload_section_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, AppError> {
    auth_user.require_permission("content:edit")?;
    validate_key(&key, state.config.content.max_key_length)?;

    let mut stored: Option<MediaRef> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
        let extension = upload_extension(&file_name)
            .map_err(|e| AppError::Validation(e.message().into()))?
            .to_owned();

        stored = Some(
            stream_field_to_store(
                field,
                &extension,
                &*state.media,
                state.config.storage.max_image_size,
            )
            .await?,
        );
    }

    let media = stored.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let image = media.file_name();

    let written = SectionStore::new(&state.db)
        .update_image(&key, &image, WriteContext::new(&auth_user.username))
        .await;
    if let Err(e) = written {
        discard_unreferenced(&state, &media).await;
        return Err(e.into());
    }

    Ok(Json(ImageUploadResponse {
        status: true,
        message: format!("Image for '{key}' uploaded"),
        image,
    }))
}

/// Remove a just-stored image that no revision points at.
async fn discard_unreferenced(state: &AppState, media: &MediaRef) {
    let name = media.file_name();
    match RevisionLog::new(&state.db).references_image(&name).await {
        Ok(true) => {}
        Ok(false) => {
            if let Err(e) = state.media.delete(media).await {
                tracing::warn!(media = %name, error = %e, "Failed to discard orphaned media");
            }
        }
        Err(e) => tracing::warn!(media = %name, error = %e, "Failed to check media references"),
    }
}

#[utoipa::path(
    get,
    path = "/{key}/revisions",
    tag = "Revisions",
    operation_id = "listRevisions",
    summary = "List recent revisions of a section",
    description = "Returns the most recent revisions, newest first, and the total number of \
        revisions for the key. Requires `content:edit` permission.",
    params(
        ("key" = String, Path, description = "Section key"),
        RevisionsQuery,
    ),
    responses(
        (status = 200, description = "Revision history", body = RevisionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_revisions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<RevisionsQuery>,
) -> Result<Json<RevisionListResponse>, AppError> {
    auth_user.require_permission("content:edit")?;

    let limits = &state.config.content;
    let limit = clamp_limit(
        query.limit,
        limits.default_revision_limit,
        limits.max_revision_limit,
    );

    let log = RevisionLog::new(&state.db);
    let revisions = log.list(&key, limit).await?;
    let total = log.count(&key).await?;

    Ok(Json(RevisionListResponse {
        revisions: revisions.into_iter().map(RevisionResponse::from).collect(),
        total,
    }))
}

#[utoipa::path(
    post,
    path = "/{key}/revisions/{revision_id}/restore",
    tag = "Revisions",
    operation_id = "restoreRevision",
    summary = "Restore a section to one revision",
    description = "Sets the live value to the payload of the given revision and records a \
        `restore` revision. The revision must belong to the key. Requires `content:restore` \
        permission.",
    params(
        ("key" = String, Path, description = "Section key"),
        ("revision_id" = i32, Path, description = "Revision ID"),
    ),
    responses(
        (status = 200, description = "Section restored", body = StatusResponse),
        (status = 400, description = "Revision belongs to another key (INTEGRITY_VIOLATION)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Section or revision not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user = %auth_user.username))]
pub async fn restore_revision(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((key, revision_id)): Path<(String, i32)>,
) -> Result<Json<StatusResponse>, AppError> {
    auth_user.require_permission("content:restore")?;

    SectionStore::new(&state.db)
        .restore_revision(
            &key,
            revision_id,
            WriteContext::new(&auth_user.username).suppressed(),
        )
        .await?;

    Ok(Json(StatusResponse::ok(format!(
        "Section '{key}' restored to revision {revision_id}"
    ))))
}

#[utoipa::path(
    post,
    path = "/{key}/reset",
    tag = "Reset",
    operation_id = "resetSection",
    summary = "Reset one section to its default",
    description = "Restores the key's pre-edit value, or removes the live value when the key had \
        none so the site falls back to its built-in default. Requires `content:restore` \
        permission.",
    params(("key" = String, Path, description = "Section key")),
    responses(
        (status = 200, description = "Reset counts", body = RestoreSummary),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user = %auth_user.username))]
pub async fn reset_section(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RestoreSummary>, AppError> {
    auth_user.require_permission("content:restore")?;

    let summary = RestoreEngine::new(&state.db)
        .reset_key(&key, WriteContext::new(&auth_user.username))
        .await?;

    Ok(Json(summary))
}

/// Stream a multipart field to the media store via a temp file.
async fn stream_field_to_store(
    mut field: axum::extract::multipart::Field<'_>,
    extension: &str,
    media: &dyn MediaStore,
    max_size: u64,
) -> Result<MediaRef, AppError> {
    let temp_path = std::env::temp_dir().join(format!("cms-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        if total_size == 0 {
            return Err(AppError::Validation("Uploaded file is empty".into()));
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        Ok(media.put_stream(reader, extension).await?)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}
