/// Why an uploaded file name was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    Empty,
    /// Contains `/` or `\`.
    ContainsPathSeparator,
    NullByte,
    /// Starts with a dot.
    Hidden,
    /// CR, LF or another control character.
    ControlCharacter,
    MissingExtension,
}

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::MissingExtension => "Invalid filename: an image extension is required",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}

/// Extension of an uploaded file name, e.g. `"png"` for `"Hero Shot.PNG"`.
/// Case is left alone; the media store normalizes it.
pub fn upload_extension(filename: &str) -> Result<&str, FilenameError> {
    let name = validate_flat_filename(filename)?;
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Ok(ext),
        _ => Err(FilenameError::MissingExtension),
    }
}
