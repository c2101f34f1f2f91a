//! Error types for the campus library.

use thiserror::Error;

/// Errors raised while turning values or identifiers into SQL text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EscapeError {
    /// Identifiers must contain at least one character.
    #[error("Cannot escape empty identifier")]
    EmptyIdentifier,

    /// NUL cannot appear in a quoted identifier.
    #[error("Cannot escape identifier containing a NUL character: {name:?}")]
    NulInIdentifier { name: String },

    /// The value has no safe literal representation.
    #[error("Unsupported value kind: {kind}")]
    UnsupportedValueKind { kind: &'static str },

    /// The connection charset name is not recognized.
    #[error("Unknown charset: {name}")]
    UnknownCharset { name: String },

    /// A placeholder has no matching parameter.
    #[error("Missing value for placeholder #{index}")]
    MissingParameter { index: usize },

    /// More parameters were supplied than the query has placeholders.
    #[error("Query has {expected} placeholders but {given} values were given")]
    UnusedParameters { expected: usize, given: usize },
}

/// Errors raised while framing a query packet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PacketError {
    /// A single packet payload is limited to 2^24 - 1 bytes.
    #[error("Query payload of {size} bytes exceeds the maximum packet size")]
    PayloadTooLarge { size: usize },
}

/// Errors that can occur when working with the school directory.
#[derive(Error, Debug)]
pub enum CampusError {
    /// SQL rendering failed.
    #[error(transparent)]
    Escape(#[from] EscapeError),

    /// Packet framing failed.
    #[error(transparent)]
    Packet(#[from] PacketError),

    /// Coordinates are not a valid WGS84 position.
    #[error("Coordinates out of bounds: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// A school field failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The backing repository failed.
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Result type alias using [`CampusError`].
pub type Result<T> = std::result::Result<T, CampusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CampusError::InvalidCoordinate {
            lat: 91.0,
            lon: 0.0,
        };
        assert!(err.to_string().contains("91"));

        let err = CampusError::InvalidField {
            field: "name",
            reason: "must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid name: must not be empty");

        let err = EscapeError::MissingParameter { index: 2 };
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn test_escape_error_is_transparent() {
        let err: CampusError = EscapeError::UnknownCharset {
            name: "klingon".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Unknown charset: klingon");
    }
}
