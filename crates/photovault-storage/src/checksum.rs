//! Single-pass hashing of an upload stream.

use photovault_core::Checksum;
use sha1::{Digest, Sha1};
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// `AsyncRead` adapter that feeds every chunk it hands out into a SHA-1
/// accumulator.
///
/// The consumer (the disk writer) and the hash see the same bytes in the same
/// order, so the file is read exactly once. The accumulator is released either
/// by [`HashingReader::finalize`] or by [`HashingReader::abort`].
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha1,
    bytes_read: u64,
}

impl<R> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha1::new(),
            bytes_read: 0,
        }
    }

    /// Number of bytes that have passed through the reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Consume the reader and return the digest of everything read.
    pub fn finalize(self) -> Checksum {
        Checksum::from_bytes(self.hasher.finalize().into())
    }

    /// Discard the partial digest without finalizing it.
    pub fn abort(self) {
        tracing::debug!(
            bytes_read = self.bytes_read,
            "Discarding checksum of failed upload"
        );
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for HashingReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let already_filled = buf.filled().len();

        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;

        let chunk = &buf.filled()[already_filled..];
        this.hasher.update(chunk);
        this.bytes_read += chunk.len() as u64;

        Poll::Ready(Ok(()))
    }
}
