// src/error.rs
//! Error types for the gpsd client

use crate::gps::protocol::Field;
use std::fmt;

pub type Result<T> = std::result::Result<T, GpsError>;

#[derive(Debug)]
pub enum GpsError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Connection(String),
    Parse(String),
    Other(String),
}

impl fmt::Display for GpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsError::Io(e) => write!(f, "IO error: {}", e),
            GpsError::Json(e) => write!(f, "JSON error: {}", e),
            GpsError::Connection(msg) => write!(f, "Connection error: {}", msg),
            GpsError::Parse(msg) => write!(f, "Parse error: {}", msg),
            GpsError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for GpsError {}

impl From<std::io::Error> for GpsError {
    fn from(error: std::io::Error) -> Self {
        GpsError::Io(error)
    }
}

impl From<serde_json::Error> for GpsError {
    fn from(error: serde_json::Error) -> Self {
        GpsError::Json(error)
    }
}

impl From<FieldError> for GpsError {
    fn from(error: FieldError) -> Self {
        GpsError::Parse(error.to_string())
    }
}

/// A field whose payload did not have the shape its code requires.
///
/// Decoding keeps going after one of these; the offending group is left
/// exactly as it was before the line.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: Field,
    pub payload: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: Field, payload: &str, reason: impl Into<String>) -> Self {
        Self {
            field,
            payload: payload.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bad {} field ({}={:?}): {}",
            self.field.name(),
            self.field.code(),
            self.payload,
            self.reason
        )
    }
}

impl std::error::Error for FieldError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new(Field::Position, "abc", "expected two numbers");
        let msg = err.to_string();
        assert!(msg.contains("position"));
        assert!(msg.contains("P="));
        assert!(msg.contains("\"abc\""));
    }

    #[test]
    fn test_field_error_into_gps_error() {
        let err: GpsError = FieldError::new(Field::Mode, "9", "out of range").into();
        assert!(matches!(err, GpsError::Parse(_)));
    }
}
