use thiserror::Error;

/// Validation failure for user-entered form data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be a number (got \"{value}\")")]
    InvalidNumber { field: &'static str, value: String },
}

/// Trimmed text, `None` when blank.
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse an optional numeric field; blank is `None`.
pub fn optional_number<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<Option<T>, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| FormError::InvalidNumber {
            field,
            value: trimmed.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_number() {
        assert_eq!(optional_number::<u64>("Size", "  "), Ok(None));
        assert_eq!(optional_number::<u64>("Size", " 250 "), Ok(Some(250)));
        assert_eq!(
            optional_number::<u64>("Size", "lots"),
            Err(FormError::InvalidNumber { field: "Size", value: "lots".to_string() })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FormError::Required("Email").to_string(), "Email is required");
    }
}
