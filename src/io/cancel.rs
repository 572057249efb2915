use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Carried inside the `io::Error` a cancelled stream returns.
#[derive(thiserror::Error, Debug)]
#[error("operation cancelled")]
pub(crate) struct CancelledMarker;

/// Async stream guard: every poll also polls the token, so a read or write that is
/// parked on a stalled peer fails as soon as the token fires.
///
/// Whatever layer sits above sees an ordinary IO error and the usual release path runs;
/// once fired, every later call fails immediately.
pub(crate) struct CancelOnToken<S> {
    inner: S,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    fired: bool,
}

impl<S> CancelOnToken<S> {
    pub(crate) fn new(inner: S, token: &CancellationToken) -> Self {
        Self {
            inner,
            cancelled: Box::pin(token.clone().cancelled_owned()),
            fired: false,
        }
    }

    fn check(&mut self, cx: &mut Context<'_>) -> io::Result<()> {
        if !self.fired && self.cancelled.as_mut().poll(cx).is_ready() {
            self.fired = true;
        }
        if self.fired {
            return Err(io::Error::other(CancelledMarker));
        }
        Ok(())
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for CancelOnToken<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.check(cx)?;
        Pin::new(&mut this.inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        this.check(cx)?;
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for CancelOnToken<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        this.check(cx)?;
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}
