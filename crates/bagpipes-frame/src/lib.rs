//! Length-prefixed, base64-armored message framing over FIFO pairs.
//!
//! Every message is framed as:
//! - A 4-byte little-endian length of the armored body
//! - The payload, base64-encoded (standard alphabet, padded)
//!
//! Reads and writes wait on handle readiness and loop over short transfers,
//! so callers only ever see whole frames.

#[cfg(unix)]
pub mod channel;
pub mod codec;
pub mod error;
pub mod payload;
#[cfg(unix)]
pub mod reader;
#[cfg(unix)]
pub mod writer;

#[cfg(unix)]
pub use channel::FramedChannel;
pub use codec::{
    armored_len, decode_frame, encode_frame, peek_armored_len, Frame, FrameConfig, HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use payload::Payload;
#[cfg(unix)]
pub use reader::FrameReader;
#[cfg(unix)]
pub use writer::FrameWriter;
