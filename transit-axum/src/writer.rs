//! Streaming response body writer.
//!
//! Encoding runs on a blocking task that writes into a [`BodyWriter`]. The
//! writer buffers output, ignores `flush()` (serde's writer flushes after
//! every value) and hands fixed-size chunks to the response body through a
//! bounded channel. The encoder only starts once the body is first polled.

use std::convert::Infallible;
use std::io;

use axum::body::Body;
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use transit_axum_core::{Value, write_json, write_transit};

use crate::context::ResponseFormat;

/// Size at which buffered output is handed to the body.
pub const CHUNK_SIZE: usize = 16 * 1024;

const CHANNEL_CAPACITY: usize = 4;

/// Buffering writer feeding a response body channel.
///
/// The channel closes when the writer is closed or dropped, whichever comes
/// first, so the body always terminates.
#[derive(Debug)]
pub struct BodyWriter {
    buf: BytesMut,
    tx: mpsc::Sender<Bytes>,
}

impl BodyWriter {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self {
            buf: BytesMut::with_capacity(CHUNK_SIZE),
            tx,
        }
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = self.buf.split().freeze();
        self.tx
            .blocking_send(chunk)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))
    }

    /// Flush what is left and close the channel.
    pub fn close(mut self) -> io::Result<()> {
        self.send_buffered()
    }
}

impl io::Write for BodyWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= CHUNK_SIZE {
            self.send_buffered()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Whether an I/O error means the peer went away.
pub fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
    )
}

fn encode(writer: &mut BodyWriter, value: &Value, format: ResponseFormat) -> io::Result<()> {
    match format {
        ResponseFormat::Json => write_json(writer, value),
        ResponseFormat::Transit => write_transit(writer, value, false),
        ResponseFormat::TransitVerbose => write_transit(writer, value, true),
    }
}

/// Encode `value` into `writer`, then close it.
///
/// Failures never propagate: a disconnected peer is logged at debug level,
/// anything else at error level with the value attached.
pub fn write_body(mut writer: BodyWriter, value: &Value, format: ResponseFormat) {
    let result = encode(&mut writer, value, format).and_then(|()| writer.close());
    match result {
        Ok(()) => {}
        Err(err) if is_disconnect(&err) => {
            tracing::debug!(error = %err, "client disconnected while streaming response");
        }
        Err(err) => {
            tracing::error!(error = %err, value = ?value, "failed to encode response body");
        }
    }
}

/// Build a lazy response body streaming `value` in `format`.
pub fn stream_body(value: Value, format: ResponseFormat) -> Body {
    let stream = async_stream::stream! {
        let (tx, mut rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
        let task = tokio::task::spawn_blocking(move || {
            write_body(BodyWriter::new(tx), &value, format);
        });

        while let Some(chunk) = rx.recv().await {
            yield Ok::<_, Infallible>(chunk);
        }

        if let Err(err) = task.await {
            tracing::error!(error = %err, "response encoder task failed");
        }
    };
    Body::from_stream(stream)
}
