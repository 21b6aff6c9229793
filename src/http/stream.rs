//! Bounded file streaming module
//!
//! Transfers one inclusive byte span of a source in fixed-size chunks, either
//! into any async writer or as a hyper response body. Memory use is one chunk
//! buffer regardless of file size.

use super::range::ByteRange;
use super::response::ResponseBody;
use futures_util::stream;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Bytes, Frame};
use std::io::{self, SeekFrom};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};

/// Working buffer size for one read
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Streams `range` out of `source`, owning the source until dropped
///
/// Dropping the streamer (completion, error, or a body abandoned after the
/// client went away) closes the source.
pub struct ContentStreamer<R> {
    source: R,
    remaining: u64,
    buf: Box<[u8]>,
}

impl<R> ContentStreamer<R>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    /// Seek `source` to the start of `range` and prepare to stream it
    pub async fn open(mut source: R, range: ByteRange) -> io::Result<Self> {
        source.seek(SeekFrom::Start(range.start)).await?;
        Ok(Self {
            source,
            remaining: range.length(),
            buf: vec![0; CHUNK_SIZE].into_boxed_slice(),
        })
    }

    /// Bytes still to be produced
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Read the next chunk, `None` once the whole range was produced
    ///
    /// Reads are bounded by the remaining count, so the last chunk is cut at
    /// the range end even when the source has more data.
    pub async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let want = usize::try_from(self.remaining)
            .map_or(self.buf.len(), |r| r.min(self.buf.len()));
        let read = self.source.read(&mut self.buf[..want]).await?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("source ended with {} bytes of the range unread", self.remaining),
            ));
        }

        self.remaining -= read as u64;
        Ok(Some(Bytes::copy_from_slice(&self.buf[..read])))
    }

    /// Copy the whole range into `sink`, returning the number of bytes written
    pub async fn copy_to<W>(mut self, sink: &mut W) -> io::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.next_chunk().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        Ok(written)
    }
}

impl<R> ContentStreamer<R>
where
    R: AsyncRead + AsyncSeek + Unpin + Send + 'static,
{
    /// Turn the streamer into a response body yielding one frame per chunk
    ///
    /// A read error ends the body with that error, which makes hyper abort
    /// the connection since the head has already been sent.
    pub fn into_body(self) -> ResponseBody {
        let frames = stream::try_unfold(self, |mut streamer| async move {
            let chunk = streamer.next_chunk().await?;
            Ok::<_, io::Error>(chunk.map(|data| (Frame::data(data), streamer)))
        });
        StreamBody::new(frames).boxed_unsync()
    }
}
