use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::content::{ContentKind, RestoreEngine, RestoreSummary, SectionStore, WriteContext};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::section::{ChangeItem, ChangeListResponse};
use crate::models::shared::validate_page;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/reset/hero",
    tag = "Reset",
    operation_id = "resetHeroImages",
    summary = "Reset all hero images",
    description = "Resets every key under the configured hero prefix ending in the hero suffix \
        (by default `home.hero.*.image`). Requires `content:restore` permission.",
    responses(
        (status = 200, description = "Reset counts", body = RestoreSummary),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user = %auth_user.username))]
pub async fn reset_hero(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RestoreSummary>, AppError> {
    auth_user.require_permission("content:restore")?;

    let content = &state.config.content;
    let summary = RestoreEngine::new(&state.db)
        .reset_hero(
            &content.hero_prefix,
            &content.hero_suffix,
            WriteContext::new(&auth_user.username),
        )
        .await?;

    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/reset/page/{page}",
    tag = "Reset",
    operation_id = "resetPage",
    summary = "Reset every section of a page",
    description = "Resets every known key under `{page}.`, whether it currently has a live value \
        or only a recorded baseline. Requires `content:restore` permission.",
    params(("page" = String, Path, description = "Page name, e.g. `home`")),
    responses(
        (status = 200, description = "Reset counts", body = RestoreSummary),
        (status = 400, description = "Invalid page (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user = %auth_user.username))]
pub async fn reset_page(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<RestoreSummary>, AppError> {
    auth_user.require_permission("content:restore")?;
    validate_page(&page)?;

    let summary = RestoreEngine::new(&state.db)
        .reset_page(&page, WriteContext::new(&auth_user.username))
        .await?;

    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/reset/type/{type}",
    tag = "Reset",
    operation_id = "resetType",
    summary = "Reset every section of one content type",
    description = "Resets every key whose baseline or live value holds text (`text`) or an image \
        (`image`). Requires `content:restore` permission.",
    params(("type" = String, Path, description = "Content type: `text` or `image`")),
    responses(
        (status = 200, description = "Reset counts", body = RestoreSummary),
        (status = 400, description = "Unknown type (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user = %auth_user.username))]
pub async fn reset_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<RestoreSummary>, AppError> {
    auth_user.require_permission("content:restore")?;
    let kind = kind
        .parse::<ContentKind>()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let summary = RestoreEngine::new(&state.db)
        .reset_kind(kind, WriteContext::new(&auth_user.username))
        .await?;

    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/reset",
    tag = "Reset",
    operation_id = "resetAll",
    summary = "Reset the whole site",
    description = "Resets every known key. Keys that had no value before they were first edited \
        are removed. Requires `content:restore` permission.",
    responses(
        (status = 200, description = "Reset counts", body = RestoreSummary),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user = %auth_user.username))]
pub async fn reset_all(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RestoreSummary>, AppError> {
    auth_user.require_permission("content:restore")?;

    let summary = RestoreEngine::new(&state.db)
        .reset_all(WriteContext::new(&auth_user.username))
        .await?;

    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/changes",
    tag = "Sections",
    operation_id = "listChanges",
    summary = "List edited sections",
    description = "Returns every live section, most recently updated first, with its key split \
        into page, section, instance and field. Requires `content:edit` permission.",
    responses(
        (status = 200, description = "Edited sections", body = ChangeListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_changes(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ChangeListResponse>, AppError> {
    auth_user.require_permission("content:edit")?;

    let rows = SectionStore::new(&state.db).recently_updated().await?;
    let total = rows.len() as u64;
    let changes = rows.into_iter().map(ChangeItem::from).collect();

    Ok(Json(ChangeListResponse { changes, total }))
}
