use std::time::Duration;

/// Errors that can occur while sending or receiving frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Text payloads must be ASCII.
    #[error("text payload is not ASCII (first offending byte at index {index})")]
    NonAscii { index: usize },

    /// The frame body is not valid base64.
    #[error("frame body is not valid base64: {0}")]
    InvalidArmor(#[from] base64::DecodeError),

    /// The armored payload exceeds the configured maximum size.
    #[error("armored payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The stream ended part-way through a frame.
    #[error("stream ended mid-frame ({received} of {expected} bytes)")]
    Truncated { expected: usize, received: usize },

    /// The stream ended before a frame started.
    #[error("connection closed")]
    ConnectionClosed,

    /// A readiness wait elapsed after part of a frame was transferred.
    #[error("peer not ready after {0:?}")]
    Timeout(Duration),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
