//! Helper utilities shared by the database-backed sources.

use serde_json::Value as JsonValue;

/// Blobs up to this size are shown inline as base64
const INLINE_BLOB_BYTES: usize = 24;

/// Quotes an identifier with double quotes (SQLite, PostgreSQL, ANSI SQL).
///
/// Embedded double quotes are doubled.
pub fn quote_double(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Quotes an identifier with backticks (MySQL, MariaDB).
///
/// Embedded backticks are doubled.
pub fn quote_backtick(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Builds the preview query for a table name that is already quoted.
pub fn select_all(quoted_table: &str) -> String {
    format!("SELECT * FROM {}", quoted_table)
}

/// Converts a float to a JSON cell; NaN and infinities become text.
pub fn float_cell(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value).map_or_else(
        || JsonValue::String(value.to_string()),
        JsonValue::Number,
    )
}

/// Converts binary data to a JSON cell.
///
/// Short values are shown inline as `base64:...`, longer ones only by size.
pub fn blob_cell(bytes: &[u8]) -> JsonValue {
    if bytes.len() <= INLINE_BLOB_BYTES {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        JsonValue::String(format!("base64:{}", encoded))
    } else {
        JsonValue::String(format!("<blob {} bytes>", bytes.len()))
    }
}

/// Placeholder for values whose type the source cannot decode.
pub fn unsupported_cell(type_name: &str) -> JsonValue {
    JsonValue::String(format!("<{}>", type_name.to_lowercase()))
}

/// Result of a decoder cascade; `None` means no decoder accepted the value.
///
/// An undecodable value is never reported as null, so `NA` in a preview
/// always means SQL NULL.
pub fn cell_or_unsupported(decoded: Option<JsonValue>, type_name: &str) -> JsonValue {
    decoded.unwrap_or_else(|| unsupported_cell(type_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_double() {
        assert_eq!(quote_double("mtcars"), "\"mtcars\"");
        assert_eq!(quote_double("weird\"name"), "\"weird\"\"name\"");
        assert_eq!(quote_double("has space"), "\"has space\"");
    }

    #[test]
    fn test_quote_backtick() {
        assert_eq!(quote_backtick("iris"), "`iris`");
        assert_eq!(quote_backtick("a`b"), "`a``b`");
    }

    #[test]
    fn test_select_all() {
        assert_eq!(select_all("\"iris\""), "SELECT * FROM \"iris\"");
    }

    #[test]
    fn test_float_cell() {
        assert_eq!(float_cell(21.5), serde_json::json!(21.5));
        assert_eq!(float_cell(f64::NAN), JsonValue::String("NaN".to_string()));
    }

    #[test]
    fn test_cell_or_unsupported() {
        assert_eq!(
            cell_or_unsupported(None, "DECIMAL"),
            JsonValue::String("<decimal>".to_string())
        );
        assert_eq!(cell_or_unsupported(Some(JsonValue::Null), "TIME"), JsonValue::Null);
        assert_eq!(
            cell_or_unsupported(Some(serde_json::json!(3)), "INT"),
            serde_json::json!(3)
        );
    }

    #[test]
    fn test_blob_cell() {
        assert_eq!(blob_cell(b"hi"), JsonValue::String("base64:aGk=".to_string()));
        assert_eq!(
            blob_cell(&[0u8; 100]),
            JsonValue::String("<blob 100 bytes>".to_string())
        );
    }
}
