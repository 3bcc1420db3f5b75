use thiserror::Error;

/// A metadata profile could not be turned into a well-formed EXIF container.
///
/// Raised by the container builder before any bytes are written, so a caller
/// never sees a partially serialized IFD.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),
    #[error("tag `{0}` is an IFD pointer and is written by the serializer only")]
    ReservedTag(&'static str),
    #[error("field `{0}` contains a NUL byte and cannot be stored as ASCII")]
    EmbeddedNul(&'static str),
    #[error("timestamp {0:?} does not match YYYY:MM:DD HH:MM:SS")]
    InvalidTimestamp(String),
    #[error("{axis} reference {found:?} is not one of {expected}")]
    InvalidReference {
        axis: &'static str,
        found: char,
        expected: &'static str,
    },
    #[error("pixel dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: u32, height: u32 },
    #[error("EXIF container is {0} bytes, larger than a JPEG APP1 segment can hold")]
    ContainerTooLarge(usize),
}

/// Request-scoped failure of the decode → synthesize → encode pipeline.
///
/// Every variant is recoverable at the request boundary and maps to a
/// client error carrying [`Error::json_body`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid image: {0}")]
    Decode(String),
    #[error("could not fetch image: {0}")]
    Fetch(String),
    #[error("invalid metadata: {0}")]
    Encoding(#[from] EncodingError),
    #[error("could not encode image: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// All pipeline failures are attributable to the request, never fatal to the process.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }

    /// The `{"error": <message>}` body returned to callers.
    pub fn json_body(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_carries_message() {
        let err = Error::Decode("not an image".to_string());
        assert_eq!(
            err.json_body(),
            serde_json::json!({ "error": "invalid image: not an image" })
        );
    }

    #[test]
    fn encoding_error_converts() {
        let err: Error = EncodingError::MissingField("make").into();
        assert!(matches!(err, Error::Encoding(EncodingError::MissingField("make"))));
        assert!(err.is_client_error());
    }

    #[test]
    fn missing_field_message_covers_absent_tags() {
        let err = EncodingError::MissingField("GPSLongitudeRef");
        assert_eq!(err.to_string(), "required field `GPSLongitudeRef` is missing or empty");
    }

    #[test]
    fn io_is_not_a_client_error() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(!err.is_client_error());
    }
}
