use crate::config::FormatConfig;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read, Take};

pub(crate) const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

const READ_BUFFER_SIZE: usize = 8192;

/// Carried inside the `io::Error` raised when a body outgrows `max_body_bytes`.
#[derive(thiserror::Error, Debug)]
#[error("body exceeds {limit} bytes")]
pub(crate) struct TooLargeMarker {
    pub(crate) limit: u64,
}

/// Counts raw source bytes and fails once the limit is passed.
pub(crate) struct Limited<R> {
    inner: R,
    consumed: u64,
    limit: Option<u64>,
}

impl<R: Read> Limited<R> {
    fn new(inner: R, limit: Option<u64>) -> Self {
        Self {
            inner,
            consumed: 0,
            limit,
        }
    }
}

impl<R: Read> Read for Limited<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        if let Some(limit) = self.limit {
            if self.consumed > limit {
                return Err(io::Error::other(TooLargeMarker { limit }));
            }
        }
        Ok(n)
    }
}

/// Bytes peeked while looking for a BOM, replayed ahead of the rest of the source.
pub(crate) type Head = Take<Cursor<[u8; 3]>>;

/// Buffered text reader over a body source, positioned after any BOM.
pub(crate) type BodyReader<R> = BufReader<Chain<Head, Limited<R>>>;

/// Wrap `src` in the limit guard and a buffer, dropping a leading UTF-8 BOM.
fn open_text<R: Read>(src: R, limit: Option<u64>) -> io::Result<BodyReader<R>> {
    let mut src = Limited::new(src, limit);

    let mut head = [0u8; 3];
    let mut n = 0;
    while n < head.len() {
        match src.read(&mut head[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    let skip = if n == 3 && head == UTF8_BOM { 3 } else { 0 };
    let mut cursor = Cursor::new(head);
    cursor.set_position(skip as u64);
    let replay = cursor.take((n - skip) as u64);

    Ok(BufReader::with_capacity(READ_BUFFER_SIZE, replay.chain(src)))
}

/// Open a body for decoding. `Ok(None)` means there is nothing to decode: the body is
/// empty or only whitespace once the BOM is gone.
pub(crate) fn open_body<R: Read>(src: R, cfg: &FormatConfig) -> io::Result<Option<BodyReader<R>>> {
    let mut reader = open_text(src, cfg.max_body_bytes)?;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let ws = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
        if ws < buf.len() {
            reader.consume(ws);
            return Ok(Some(reader));
        }
        reader.consume(ws);
    }
}

/// Lossy text of a whole body, minus a leading BOM.
pub(crate) fn text_from_bytes(mut bytes: Vec<u8>) -> String {
    if bytes.starts_with(&UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out one byte per read, to exercise BOM detection across short reads.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((b, rest)) if !buf.is_empty() => {
                    buf[0] = *b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    fn body_of(src: &[u8]) -> Option<String> {
        let mut reader = open_body(Trickle(src), &FormatConfig::default()).unwrap()?;
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        Some(out)
    }

    #[test]
    fn bom_and_whitespace_are_skipped() {
        assert_eq!(body_of(b"\xEF\xBB\xBF  {}"), Some("{}".to_string()));
        assert_eq!(body_of(b"[1]"), Some("[1]".to_string()));
        assert_eq!(body_of(b"1"), Some("1".to_string()));
    }

    #[test]
    fn empty_or_blank_bodies_are_absent() {
        assert_eq!(body_of(b""), None);
        assert_eq!(body_of(b"\xEF\xBB\xBF"), None);
        assert_eq!(body_of(b" \r\n\t "), None);
    }

    #[test]
    fn limit_trips_past_the_bound() {
        let cfg = FormatConfig::builder().max_body_bytes(4).build();
        let mut ok = open_body(&b"[12]"[..], &cfg).unwrap().unwrap();
        let mut s = String::new();
        ok.read_to_string(&mut s).unwrap();
        assert_eq!(s, "[12]");

        let err = match open_body(&b"[123]"[..], &cfg) {
            Ok(Some(mut r)) => r.read_to_string(&mut String::new()).unwrap_err(),
            Ok(None) => panic!("body should not be empty"),
            Err(e) => e,
        };
        assert!(matches!(
            crate::BodyError::from_io(err),
            crate::BodyError::TooLarge { limit: 4 }
        ));
    }

    #[test]
    fn text_is_lossy_and_bom_free() {
        assert_eq!(text_from_bytes(b"\xEF\xBB\xBFhi".to_vec()), "hi");
        assert_eq!(text_from_bytes(b"a\xFFb".to_vec()), "a\u{FFFD}b");
    }
}
