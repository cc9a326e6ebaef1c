//! Audio source normalization
//!
//! Providers hand back audio in one of three shapes: a push stream of
//! chunks, a buffered whole body, or a pull reader that yields one chunk per
//! read. [`ReadableSource`] exposes whichever capabilities a source has and
//! [`write_to_sink`] checks them in that fixed order, so a source offering
//! several shapes is always consumed as the first one it supports.

use std::{future::Future, io};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{FutureExt, Stream, StreamExt, future::BoxFuture, stream::BoxStream};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;

use crate::error::{Result, TtsError};

/// Chunks pushed by the source as they become available
pub type ChunkStream = BoxStream<'static, io::Result<Bytes>>;

/// The entire payload, available once the future resolves
pub type WholeBody = BoxFuture<'static, io::Result<Bytes>>;

/// Boxed source as returned by providers
pub type AudioSource = Box<dyn ReadableSource>;

/// Incremental reader: each call yields the next chunk, `None` once done
#[async_trait]
pub trait ChunkReader: Send {
    async fn read(&mut self) -> io::Result<Option<Bytes>>;
}

/// Capability check over the three supported source shapes
///
/// Each accessor hands over ownership of the underlying source the first
/// time it returns `Some`. Implementors override only the shapes they
/// support.
pub trait ReadableSource: Send {
    fn push_stream(&mut self) -> Option<ChunkStream> {
        None
    }

    fn buffered_body(&mut self) -> Option<WholeBody> {
        None
    }

    fn chunk_reader(&mut self) -> Option<Box<dyn ChunkReader>> {
        None
    }
}

/// The shape a source was resolved to
pub enum SourceShape {
    Push(ChunkStream),
    Buffered(WholeBody),
    Pull(Box<dyn ChunkReader>),
}

impl SourceShape {
    /// Resolve a source, preferring push over buffered over pull
    pub fn detect(source: &mut dyn ReadableSource) -> Option<Self> {
        if let Some(stream) = source.push_stream() {
            return Some(Self::Push(stream));
        }

        if let Some(body) = source.buffered_body() {
            return Some(Self::Buffered(body));
        }

        source.chunk_reader().map(Self::Pull)
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Push(_) => "push",
            Self::Buffered(_) => "buffered",
            Self::Pull(_) => "pull",
        }
    }
}

/// Drain `source` into `sink`, then shut the sink down
///
/// Returns the number of bytes written. The sink is finished only after
/// every chunk was written; an error on either side aborts the copy and is
/// returned as [`TtsError::Stream`].
pub async fn write_to_sink<W>(mut source: AudioSource, sink: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let shape = SourceShape::detect(source.as_mut()).ok_or(TtsError::UnsupportedStreamType)?;

    tracing::trace!(shape = shape.kind(), "draining audio source");

    let written = match shape {
        SourceShape::Push(stream) => {
            let mut reader = StreamReader::new(stream);
            tokio::io::copy(&mut reader, sink).await?
        }
        SourceShape::Buffered(body) => {
            let bytes = body.await?;
            sink.write_all(&bytes).await?;
            bytes.len() as u64
        }
        SourceShape::Pull(mut reader) => {
            let mut total = 0;
            while let Some(chunk) = reader.read().await? {
                sink.write_all(&chunk).await?;
                total += chunk.len() as u64;
            }
            total
        }
    };

    sink.shutdown().await?;

    Ok(written)
}

/// Collect a source into a string, replacing invalid UTF-8
pub async fn read_text(source: AudioSource) -> Result<String> {
    let mut buffer = Vec::new();
    write_to_sink(source, &mut buffer).await?;

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Source backed by a stream of chunks
pub struct PushSource(Option<ChunkStream>);

impl PushSource {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self(Some(stream.boxed()))
    }
}

impl ReadableSource for PushSource {
    fn push_stream(&mut self) -> Option<ChunkStream> {
        self.0.take()
    }
}

/// Source backed by a future yielding the whole payload
pub struct BufferedSource(Option<WholeBody>);

impl BufferedSource {
    pub fn new<F>(body: F) -> Self
    where
        F: Future<Output = io::Result<Bytes>> + Send + 'static,
    {
        Self(Some(body.boxed()))
    }

    /// Source over bytes that are already in memory
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::new(async move { Ok(bytes) })
    }
}

impl ReadableSource for BufferedSource {
    fn buffered_body(&mut self) -> Option<WholeBody> {
        self.0.take()
    }
}

/// Source backed by a [`ChunkReader`]
pub struct PullSource(Option<Box<dyn ChunkReader>>);

impl PullSource {
    pub fn new(reader: impl ChunkReader + 'static) -> Self {
        Self(Some(Box::new(reader)))
    }
}

impl ReadableSource for PullSource {
    fn chunk_reader(&mut self) -> Option<Box<dyn ChunkReader>> {
        self.0.take()
    }
}
