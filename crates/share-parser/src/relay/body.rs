use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

/// Upstream media body, passed through chunk by chunk.
///
/// Counts the bytes handed out and logs how the transfer ended: complete,
/// failed mid-stream, or dropped early because the client went away.
/// Dropping the body releases the upstream connection.
pub struct RelayBody {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
    url: String,
    bytes_sent: u64,
    finished: bool,
}

impl RelayBody {
    pub fn new<S>(stream: S, url: impl Into<String>) -> Self
    where
        S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
            url: url.into(),
            bytes_sent: 0,
            finished: false,
        }
    }

    /// Writes the whole body into `sink`, returning the byte count.
    pub async fn copy_to<W>(mut self, sink: &mut W) -> io::Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        while let Some(chunk) = self.next().await {
            sink.write_all(&chunk?).await?;
        }
        sink.flush().await?;
        Ok(self.bytes_sent)
    }
}

impl Stream for RelayBody {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match this.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.bytes_sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                warn!(url = %this.url, bytes = this.bytes_sent, error = %e, "Relay body failed mid-stream");
                Poll::Ready(Some(Err(io::Error::other(e))))
            }
            Poll::Ready(None) => {
                this.finished = true;
                info!(url = %this.url, bytes = this.bytes_sent, "Relay complete");
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for RelayBody {
    fn drop(&mut self) {
        if !self.finished {
            warn!(url = %self.url, bytes = self.bytes_sent, "Relay aborted before upstream EOF");
        }
    }
}

impl std::fmt::Debug for RelayBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayBody")
            .field("url", &self.url)
            .field("bytes_sent", &self.bytes_sent)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
