//! Identifier escaping and validation for generated DDL

use crate::error::ModelError;

/// Characters allowed in SQL identifiers (alphanumeric, underscore, dollar)
const ALLOWED_IDENTIFIER_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_$";

/// PostgreSQL truncates identifiers beyond this length
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Escape an SQL identifier by doubling quotes and wrapping it in double quotes
///
/// # Examples
/// ```
/// use elif_orm::security::escape_identifier;
///
/// assert_eq!(escape_identifier("user_table"), "\"user_table\"");
/// assert_eq!(escape_identifier("table\"name"), "\"table\"\"name\"");
/// ```
pub fn escape_identifier(identifier: &str) -> String {
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Validate that an identifier is safe for use as a table or column name.
///
/// Keywords are accepted: generated DDL always quotes identifiers.
pub fn validate_identifier(identifier: &str) -> Result<(), ModelError> {
    let Some(first) = identifier.chars().next() else {
        return Err(ModelError::Validation(
            "Identifier cannot be empty".to_string(),
        ));
    };

    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' is too long (max {} characters)",
            identifier, MAX_IDENTIFIER_LENGTH
        )));
    }

    if let Some(c) = identifier
        .chars()
        .find(|c| !ALLOWED_IDENTIFIER_CHARS.contains(*c))
    {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' contains invalid character '{}'",
            identifier, c
        )));
    }

    if first.is_ascii_digit() {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' cannot start with a number",
            identifier
        )));
    }

    Ok(())
}
