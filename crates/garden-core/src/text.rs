use crate::error::ValidationError;

/// Trim and collapse every run of whitespace to a single space.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapsed text that must be non-empty and at most `max` chars.
pub fn sanitize_required(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ValidationError> {
    match sanitize_optional(field, Some(raw), max)? {
        Some(text) => Ok(text),
        None => Err(ValidationError::Empty { field }),
    }
}

/// Collapsed text of at most `max` chars; absent or blank input maps to `None`.
pub fn sanitize_optional(
    field: &'static str,
    raw: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let text = collapse_whitespace(raw);
    if text.is_empty() {
        return Ok(None);
    }
    let actual = text.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(Some(text))
}
