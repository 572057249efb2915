use crate::Compression;
use crate::io::metered::Metered;
use flate2::write::GzEncoder;
use std::io::{self, BufWriter, Write};

/// Text-layer buffer when writing straight to the destination.
pub const PLAIN_BUFFER_SIZE: usize = 1024;

/// Text-layer buffer in front of the gzip encoder; deflate works on larger chunks.
pub const GZIP_BUFFER_SIZE: usize = 8192;

/// Writer chain over a caller-owned destination:
/// text buffer -> [gzip] -> metered destination.
pub(crate) enum BodySink<W: Write> {
    Plain(BufWriter<Metered<W>>),
    Gzip(BufWriter<GzEncoder<Metered<W>>>),
}

/// What `BodySink::release` leaves behind.
pub(crate) struct Released {
    /// Bytes that reached the destination.
    pub(crate) delivered: u64,
    /// First failure across the release steps, if any.
    pub(crate) outcome: io::Result<()>,
}

impl<W: Write> BodySink<W> {
    /// Open the compression layer (if any), then the text layer on top of it.
    pub(crate) fn open(dest: W, compression: Compression) -> Self {
        let dest = Metered::new(dest);
        match compression {
            Compression::None => {
                BodySink::Plain(BufWriter::with_capacity(PLAIN_BUFFER_SIZE, dest))
            }
            Compression::Gzip { level } => {
                let gz = GzEncoder::new(dest, flate2::Compression::new(level));
                BodySink::Gzip(BufWriter::with_capacity(GZIP_BUFFER_SIZE, gz))
            }
        }
    }

    pub(crate) fn buffer_capacity(&self) -> usize {
        match self {
            BodySink::Plain(w) => w.capacity(),
            BodySink::Gzip(w) => w.capacity(),
        }
    }

    /// Release every layer inner-to-outer: drain the text buffer, finish the gzip
    /// member, flush the destination. Each step runs even if an earlier one failed.
    pub(crate) fn release(self) -> Released {
        match self {
            BodySink::Plain(text) => {
                let (mut dest, text_res) = release_text(text);
                let dest_res = dest.flush();
                Released {
                    delivered: dest.delivered(),
                    outcome: text_res.and(dest_res),
                }
            }
            BodySink::Gzip(text) => {
                let (mut gz, text_res) = release_text(text);
                let gz_res = gz.try_finish();
                let dest_res = gz.get_mut().flush();
                let delivered = gz.get_ref().delivered();
                tracing::trace!(
                    flushes = gz.get_ref().flushes(),
                    delivered,
                    "gzip member finished"
                );
                Released {
                    delivered,
                    outcome: text_res.and(gz_res).and(dest_res),
                }
            }
        }
    }
}

/// Drain a text buffer into its inner layer without flushing that layer.
/// The inner layer comes back even when draining fails; unwritten bytes are dropped.
fn release_text<I: Write>(text: BufWriter<I>) -> (I, io::Result<()>) {
    match text.into_inner() {
        Ok(inner) => (inner, Ok(())),
        Err(e) => {
            let (err, text) = e.into_parts();
            let (inner, _unwritten) = text.into_parts();
            (inner, Err(err))
        }
    }
}

impl<W: Write> Write for BodySink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            BodySink::Plain(w) => w.write(buf),
            BodySink::Gzip(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            BodySink::Plain(w) => w.write_all(buf),
            BodySink::Gzip(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            BodySink::Plain(w) => w.flush(),
            BodySink::Gzip(w) => w.flush(),
        }
    }
}
