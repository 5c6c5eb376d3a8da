use serde::Serialize;

use crate::error::AppError;

/// `{status, message}` body returned by mutating endpoints.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    #[schema(example = true)]
    pub status: bool,
    #[schema(example = "Section updated")]
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
        }
    }
}

/// Validate a section key (1..=`max_len` characters).
pub fn validate_key(key: &str, max_len: usize) -> Result<(), AppError> {
    if key.is_empty() || key.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "Key must be 1-{max_len} characters"
        )));
    }
    if key.chars().any(|c| c.is_control()) {
        return Err(AppError::Validation(
            "Key must not contain control characters".into(),
        ));
    }
    Ok(())
}

/// Validate a page name used by page-scoped resets.
pub fn validate_page(page: &str) -> Result<(), AppError> {
    if page.is_empty() || page.contains('.') {
        return Err(AppError::Validation(
            "Page must be non-empty and must not contain '.'".into(),
        ));
    }
    Ok(())
}

/// Clamp an optional list limit into `1..=max`.
pub fn clamp_limit(limit: Option<u64>, default: u64, max: u64) -> u64 {
    limit.unwrap_or(default).clamp(1, max.max(1))
}
