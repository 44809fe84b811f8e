use std::io::{ErrorKind, Read};

use bagpipes_fifo::{Interest, Readiness};
use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_frame, peek_armored_len, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from a non-blocking stream.
///
/// Partial reads accumulate internally; callers always get whole frames. Bytes
/// of a frame that was interrupted by a timeout stay buffered, so the next
/// call resumes where the last one stopped.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read + Readiness> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Wait for and read the next complete frame.
    ///
    /// Returns `Ok(None)` when the stream stays unreadable for the configured
    /// read timeout and no part of a frame has arrived.
    pub fn recv(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = decode_frame(&mut self.buf, self.config.max_armored_size)? {
            return Ok(Some(frame));
        }

        if !self.wait_readable()? {
            return self.not_ready();
        }

        loop {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if self.wait_readable()? {
                        continue;
                    }
                    return self.not_ready();
                }
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(self.eof_error());
            }

            self.buf.extend_from_slice(&chunk[..read]);
            if let Some(frame) = decode_frame(&mut self.buf, self.config.max_armored_size)? {
                trace!(armored_len = frame.armored_len, "received frame");
                return Ok(Some(frame));
            }
        }
    }

    fn wait_readable(&self) -> Result<bool> {
        Ok(self
            .inner
            .wait_ready(Interest::Readable, self.config.read_timeout)?)
    }

    fn not_ready(&self) -> Result<Option<Frame>> {
        if self.buf.is_empty() {
            Ok(None)
        } else {
            Err(FrameError::Timeout(
                self.config.read_timeout.unwrap_or_default(),
            ))
        }
    }

    fn eof_error(&self) -> FrameError {
        if self.buf.is_empty() {
            return FrameError::ConnectionClosed;
        }
        let expected = match peek_armored_len(&self.buf) {
            Some(body_len) => HEADER_SIZE + body_len,
            None => HEADER_SIZE,
        };
        FrameError::Truncated {
            expected,
            received: self.buf.len(),
        }
    }

    /// Bytes received but not yet returned as a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream. Buffered bytes are
    /// discarded.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the read timeout for subsequent readiness waits.
    pub fn set_read_timeout(&mut self, timeout: Option<std::time::Duration>) {
        self.config.read_timeout = timeout;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
