use std::io;

#[derive(thiserror::Error, Debug)]
pub enum BodyError {
    /// A configuration value is missing or out of range. Raised before any layer opens.
    #[error("config: {0}")]
    Config(String),

    /// The value could not be represented as JSON.
    #[error("encode: {0}")]
    Encode(#[source] serde_json::Error),

    /// The body is not valid JSON for the requested type (syntax or shape).
    #[error("decode: {0}")]
    Decode(#[source] serde_json::Error),

    /// The body is larger than `FormatConfig::max_body_bytes`.
    #[error("body exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    /// The caller's cancellation token fired while the stream was in use.
    #[error("cancelled")]
    Cancelled,

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

impl BodyError {
    /// Finer classification of a decode failure (`Syntax`, `Data`, `Eof`).
    pub fn decode_category(&self) -> Option<serde_json::error::Category> {
        match self {
            BodyError::Decode(e) => Some(e.classify()),
            _ => None,
        }
    }

    /// Unwrap the markers our IO guards smuggle through `io::Error`.
    pub(crate) fn from_io(e: io::Error) -> Self {
        if let Some(inner) = e.get_ref() {
            if inner.is::<crate::io::cancel::CancelledMarker>() {
                return BodyError::Cancelled;
            }
            if let Some(m) = inner.downcast_ref::<crate::io::body_reader::TooLargeMarker>() {
                return BodyError::TooLarge { limit: m.limit };
            }
        }
        BodyError::Io(e)
    }

    pub(crate) fn from_encode(e: serde_json::Error) -> Self {
        if e.is_io() {
            BodyError::from_io(e.into())
        } else {
            BodyError::Encode(e)
        }
    }

    pub(crate) fn from_decode(e: serde_json::Error) -> Self {
        if e.is_io() {
            BodyError::from_io(e.into())
        } else {
            BodyError::Decode(e)
        }
    }
}
