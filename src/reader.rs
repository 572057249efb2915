//! reader.rs — decode path and diagnostic body capture.
//! Decompression is the transport's job; bytes arriving here are plain text.

use serde::de::DeserializeOwned;
use std::io::Read;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio_util::io::SyncIoBridge;
use tokio_util::sync::CancellationToken;

use crate::codec;
use crate::config::FormatConfig;
use crate::error::BodyError;
use crate::io::body_reader::{open_body, text_from_bytes};
use crate::io::cancel::CancelOnToken;

/// Decode one JSON document from `source`.
///
/// An absent source, a body that is empty or only whitespace, or a body that is a bare
/// `null`, yields `T::default()`. That is the empty-body policy, not error swallowing: a
/// body that is present but malformed (or of the wrong shape) is a `BodyError::Decode`.
///
/// `source` is owned for the duration of the call and dropped before returning, on
/// every path.
pub fn decode<T, R>(source: Option<R>, cfg: &FormatConfig) -> Result<T, BodyError>
where
    T: DeserializeOwned + Default,
    R: Read,
{
    cfg.validate()?;

    let Some(source) = source else {
        tracing::trace!("no body source, using default");
        return Ok(T::default());
    };
    match open_body(source, cfg).map_err(BodyError::from_io)? {
        Some(reader) => {
            codec::decode_from::<Option<T>, _>(reader, cfg).map(Option::unwrap_or_default)
        }
        None => {
            tracing::trace!("empty body, using default");
            Ok(T::default())
        }
    }
}

/// Async counterpart of [`decode`] for a tokio source; see [`crate::encode_async`]
/// for how the runtime flavor picks between streaming and buffering, and how `cancel`
/// is observed.
pub async fn decode_async<T, R>(
    source: Option<R>,
    cfg: &FormatConfig,
    cancel: &CancellationToken,
) -> Result<T, BodyError>
where
    T: DeserializeOwned + Default,
    R: AsyncRead + Unpin,
{
    cfg.validate()?;

    let Some(source) = source else {
        return Ok(T::default());
    };
    let handle = Handle::current();
    let guarded = CancelOnToken::new(source, cancel);
    match handle.runtime_flavor() {
        RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| {
            decode(Some(SyncIoBridge::new_with_handle(guarded, handle)), cfg)
        }),
        _ => decode_buffered(guarded, cfg).await,
    }
}

async fn decode_buffered<T, R>(source: R, cfg: &FormatConfig) -> Result<T, BodyError>
where
    T: DeserializeOwned + Default,
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    match cfg.max_body_bytes {
        Some(limit) => {
            source
                .take(limit.saturating_add(1))
                .read_to_end(&mut bytes)
                .await
                .map_err(BodyError::from_io)?;
            if bytes.len() as u64 > limit {
                return Err(BodyError::TooLarge { limit });
            }
        }
        None => {
            let mut source = source;
            source
                .read_to_end(&mut bytes)
                .await
                .map_err(BodyError::from_io)?;
        }
    }
    tracing::trace!(len = bytes.len(), "body buffered for non-blocking decode");
    decode(Some(&bytes[..]), cfg)
}

/// Whole body as text, for error reporting. `Ok(None)` when there is no source.
///
/// A leading BOM is dropped and invalid UTF-8 is replaced with U+FFFD. No size limit
/// applies; this is not the request/response hot path.
pub fn read_all_text<R: Read>(source: Option<R>) -> Result<Option<String>, BodyError> {
    let Some(mut source) = source else {
        return Ok(None);
    };
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes).map_err(BodyError::from_io)?;
    Ok(Some(text_from_bytes(bytes)))
}

/// Async counterpart of [`read_all_text`]. Runs natively on the runtime and gives up
/// with `BodyError::Cancelled` as soon as `cancel` fires.
pub async fn read_all_text_async<R>(
    source: Option<R>,
    cancel: &CancellationToken,
) -> Result<Option<String>, BodyError>
where
    R: AsyncRead + Unpin,
{
    let Some(mut source) = source else {
        return Ok(None);
    };
    let mut bytes = Vec::new();
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(BodyError::Cancelled),
        res = source.read_to_end(&mut bytes) => { res?; }
    }
    Ok(Some(text_from_bytes(bytes)))
}
