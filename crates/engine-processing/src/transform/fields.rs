use crate::error::TransformError;
use model::{core::value::Value, records::row::SourceRow};

/// Trimmed text, with blanks and nulls collapsed to `None`.
pub fn optional_text(row: &SourceRow, column: &str) -> Option<String> {
    row.get(column)
        .and_then(Value::as_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn required_text(row: &SourceRow, column: &'static str) -> Result<String, TransformError> {
    optional_text(row, column).ok_or(TransformError::MissingField(column))
}

/// Integer column that tolerates garbage: anything unparsable becomes `None`.
pub fn optional_int(row: &SourceRow, column: &str) -> Option<i64> {
    row.get(column).and_then(Value::as_i64)
}

pub fn required_int(row: &SourceRow, column: &'static str) -> Result<i64, TransformError> {
    match row.get(column) {
        None | Some(Value::Null) => Err(TransformError::MissingField(column)),
        Some(value) => value.as_i64().ok_or_else(|| TransformError::InvalidInteger {
            field: column,
            value: value.to_string(),
        }),
    }
}

/// A natural key kept in its source type: integers pass through, text is
/// trimmed and must not be blank.
pub fn required_key(row: &SourceRow, column: &'static str) -> Result<Value, TransformError> {
    match row.get(column) {
        Some(Value::Int(v)) => Ok(Value::Int(*v)),
        _ => required_text(row, column).map(Value::String),
    }
}
