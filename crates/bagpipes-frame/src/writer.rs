use std::io::{ErrorKind, Write};

use bagpipes_fifo::{Interest, Readiness};
use bytes::BytesMut;
use tracing::trace;

use crate::codec::{armored_len, encode_frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::payload::Payload;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to a non-blocking stream.
///
/// The length header and the armored body are written in two phases, each
/// preceded by a "writable" readiness check. Short writes loop until the
/// segment is fully written.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write + Readiness> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Armor and send one payload.
    ///
    /// Returns the number of armored body bytes written, or `Ok(None)` if the
    /// stream did not become writable within the write timeout (nothing was
    /// sent). Text payloads are checked for ASCII before any I/O.
    pub fn send<'a>(&mut self, payload: impl Into<Payload<'a>>) -> Result<Option<usize>> {
        let raw = payload.into().as_bytes()?;

        let body_len = armored_len(raw.len());
        if let Some(max) = self.config.max_armored_size {
            if body_len > max {
                return Err(FrameError::PayloadTooLarge {
                    size: body_len,
                    max,
                });
            }
        }

        self.buf.clear();
        encode_frame(raw, &mut self.buf)?;

        if !self.wait_writable()? {
            trace!("outbound not writable; nothing sent");
            return Ok(None);
        }
        self.write_segment(0, HEADER_SIZE)?;

        if body_len > 0 {
            if !self.wait_writable()? {
                return Err(self.timeout());
            }
            self.write_segment(HEADER_SIZE, HEADER_SIZE + body_len)?;
        }

        self.flush()?;
        trace!(armored_len = body_len, "sent frame");
        Ok(Some(body_len))
    }

    fn write_segment(&mut self, start: usize, end: usize) -> Result<()> {
        let mut offset = start;
        while offset < end {
            match self.inner.write(&self.buf[offset..end]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if !self.wait_writable()? {
                        return Err(self.timeout());
                    }
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    fn wait_writable(&self) -> Result<bool> {
        Ok(self
            .inner
            .wait_ready(Interest::Writable, self.config.write_timeout)?)
    }

    fn timeout(&self) -> FrameError {
        FrameError::Timeout(self.config.write_timeout.unwrap_or_default())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if !self.wait_writable()? {
                        return Err(self.timeout());
                    }
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the write timeout for subsequent readiness waits.
    pub fn set_write_timeout(&mut self, timeout: Option<std::time::Duration>) {
        self.config.write_timeout = timeout;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
