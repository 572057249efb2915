//! writer.rs — encode path: value -> compact JSON -> [gzip] -> caller's stream.
//! - The destination is flushed, never closed; its lifetime stays with the caller
//! - Layers are released inner-to-outer on every exit path
//! - Async entry runs the sync chain under block_in_place over a SyncIoBridge, or
//!   buffers the body when the runtime cannot block

use serde::Serialize;
use std::io::Write;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio_util::io::SyncIoBridge;
use tokio_util::sync::CancellationToken;

use crate::codec;
use crate::config::FormatConfig;
use crate::error::BodyError;
use crate::io::body_sink::{BodySink, Released};
use crate::io::cancel::CancelOnToken;
use crate::Compression;

/// Encode `value` into `dest`, gzip-wrapped when `compression` asks for it.
///
/// Returns the number of bytes delivered to `dest`. On success every layer has been
/// drained into `dest` and `dest` has been flushed. On error the bytes already in
/// `dest` are unspecified, but all layers have still been released. An encode error
/// takes precedence over any failure seen while releasing.
pub fn encode<T, W>(
    value: &T,
    dest: &mut W,
    cfg: &FormatConfig,
    compression: impl Into<Compression>,
) -> Result<u64, BodyError>
where
    T: Serialize + ?Sized,
    W: Write + ?Sized,
{
    let compression = compression.into();
    cfg.validate_for(compression)?;

    let mut sink = BodySink::open(&mut *dest, compression);
    tracing::debug!(
        ?compression,
        buffer = sink.buffer_capacity(),
        "body writer opened"
    );

    let encoded = codec::encode_into(value, &mut sink, cfg);
    let Released { delivered, outcome } = sink.release();
    tracing::trace!(delivered, "body writer released");

    encoded?;
    outcome.map_err(BodyError::from_io)?;
    Ok(delivered)
}

/// Async counterpart of [`encode`] for a tokio destination.
///
/// On the multi-threaded runtime the serializer streams through the chain inside
/// `block_in_place`. Other runtime flavors cannot block a worker, so the body is
/// encoded into memory first and then written out asynchronously.
///
/// `cancel` is polled alongside every write and flush into `dest`, including one that
/// is parked on a stalled peer; a cancelled call returns `BodyError::Cancelled` after
/// the layers were released.
pub async fn encode_async<T, W>(
    value: &T,
    dest: &mut W,
    cfg: &FormatConfig,
    compression: impl Into<Compression>,
    cancel: &CancellationToken,
) -> Result<u64, BodyError>
where
    T: Serialize + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let compression = compression.into();
    cfg.validate_for(compression)?;

    let handle = Handle::current();
    let guarded = CancelOnToken::new(&mut *dest, cancel);
    match handle.runtime_flavor() {
        RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| {
            let mut bridge = SyncIoBridge::new_with_handle(guarded, handle);
            encode(value, &mut bridge, cfg, compression)
        }),
        _ => encode_buffered(value, guarded, cfg, compression).await,
    }
}

async fn encode_buffered<T, W>(
    value: &T,
    mut dest: W,
    cfg: &FormatConfig,
    compression: Compression,
) -> Result<u64, BodyError>
where
    T: Serialize + ?Sized,
    W: AsyncWrite + Unpin,
{
    let mut body = Vec::new();
    encode(value, &mut body, cfg, compression)?;
    tracing::trace!(len = body.len(), "body buffered for non-blocking write");

    dest.write_all(&body).await.map_err(BodyError::from_io)?;
    dest.flush().await.map_err(BodyError::from_io)?;
    Ok(body.len() as u64)
}
