pub mod codec;
mod config;
mod error;
mod io;
mod reader;
mod writer;

pub use crate::config::{FormatConfig, FormatConfigBuilder};
pub use crate::error::BodyError;
pub use crate::io::body_sink::{GZIP_BUFFER_SIZE, PLAIN_BUFFER_SIZE};
pub use crate::reader::{decode, decode_async, read_all_text, read_all_text_async};
pub use crate::writer::{encode, encode_async};
pub use tokio_util::sync::CancellationToken;

/// Level used when compression is switched on with a plain `true`.
pub const DEFAULT_GZIP_LEVEL: u32 = 6;

/// Transform applied to an encoded body before it reaches the destination.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Compression {
    #[default]
    None,
    /// Single-member gzip stream, level 0..=9.
    Gzip { level: u32 },
}

impl Compression {
    pub fn gzip() -> Self {
        Compression::Gzip {
            level: DEFAULT_GZIP_LEVEL,
        }
    }

    /// `Content-Encoding` value a transport should send alongside the body.
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Gzip { .. } => Some("gzip"),
        }
    }
}

impl From<bool> for Compression {
    fn from(compress: bool) -> Self {
        if compress {
            Compression::gzip()
        } else {
            Compression::None
        }
    }
}
