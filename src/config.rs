// src/config.rs
use crate::Compression;
use crate::error::BodyError;

/// Runtime conventions for mapping values to and from JSON bodies.
/// Build with `FormatConfig::builder().foo(...).build()`, or use `FormatConfig::default()`.
///
/// Field naming and null omission belong to the value's type (serde attributes); this
/// struct only carries what varies per call site.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatConfig {
    /// Write every non-ASCII char as a `\uXXXX` escape (surrogate pairs above the BMP).
    /// Output stays compact either way.
    pub escape_non_ascii: bool,

    /// Upper bound on a decoded body in raw source bytes. `None` means unbounded.
    pub max_body_bytes: Option<u64>,
}

impl FormatConfig {
    /// Start building a config.
    ///
    /// Defaults:
    /// - escape_non_ascii = false
    /// - max_body_bytes   = None
    pub fn builder() -> FormatConfigBuilder {
        FormatConfigBuilder {
            escape_non_ascii: false,
            max_body_bytes: None,
        }
    }

    /// Fail-fast check run before any layer is opened.
    pub(crate) fn validate(&self) -> Result<(), BodyError> {
        if self.max_body_bytes == Some(0) {
            return Err(BodyError::Config("max_body_bytes must be > 0".into()));
        }
        Ok(())
    }

    pub(crate) fn validate_for(&self, compression: Compression) -> Result<(), BodyError> {
        self.validate()?;
        if let Compression::Gzip { level } = compression {
            if level > 9 {
                return Err(BodyError::Config(format!(
                    "gzip level must be 0..=9, got {level}"
                )));
            }
        }
        Ok(())
    }
}

/// Fluent builder for `FormatConfig`.
#[derive(Clone, Debug)]
pub struct FormatConfigBuilder {
    escape_non_ascii: bool,
    max_body_bytes: Option<u64>,
}

impl FormatConfigBuilder {
    pub fn escape_non_ascii(mut self, on: bool) -> Self {
        self.escape_non_ascii = on;
        self
    }
    pub fn max_body_bytes(mut self, bytes: u64) -> Self {
        self.max_body_bytes = Some(bytes);
        self
    }

    pub fn build(self) -> FormatConfig {
        FormatConfig {
            escape_non_ascii: self.escape_non_ascii,
            max_body_bytes: self.max_body_bytes,
        }
    }
}
