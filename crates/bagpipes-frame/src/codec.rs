use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: armored length (4, little-endian).
pub const HEADER_SIZE: usize = 4;

/// A decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The raw (un-armored) payload.
    pub payload: Bytes,
    /// Length of the base64 body as it appeared on the wire.
    pub armored_len: usize,
}

impl Frame {
    /// The frame `payload` would be sent as.
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            payload: Bytes::copy_from_slice(payload),
            armored_len: armored_len(payload.len()),
        }
    }

    /// The total wire size of this frame (header + armored body).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.armored_len
    }
}

/// Length of the standard, padded base64 encoding of `raw_len` bytes.
pub fn armored_len(raw_len: usize) -> usize {
    raw_len.div_ceil(3) * 4
}

/// Encode a payload into the wire format. Returns the armored body length.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────────────────────────────┐
/// │ Armored length   │ base64(payload)                      │
/// │ (4B LE, u32)     │ standard alphabet, padded, no breaks │
/// └──────────────────┴──────────────────────────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<usize> {
    let body_len = armored_len(payload.len());
    if body_len > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: body_len,
            max: u32::MAX as usize,
        });
    }

    dst.reserve(HEADER_SIZE + body_len);
    dst.put_u32_le(body_len as u32);
    let start = dst.len();
    dst.resize(start + body_len, 0);
    let written = STANDARD
        .encode_slice(payload, &mut dst[start..])
        .map_err(|err| FrameError::Io(std::io::Error::other(err)))?;
    debug_assert_eq!(written, body_len);
    Ok(body_len)
}

/// The armored length announced by a buffered header, if one is complete.
pub fn peek_armored_len(src: &[u8]) -> Option<usize> {
    let header: [u8; HEADER_SIZE] = src.get(..HEADER_SIZE)?.try_into().ok()?;
    Some(u32::from_le_bytes(header) as usize)
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. `max_armored`
/// bounds the announced body length when set.
pub fn decode_frame(src: &mut BytesMut, max_armored: Option<usize>) -> Result<Option<Frame>> {
    let Some(body_len) = peek_armored_len(&src[..]) else {
        return Ok(None); // Need more data
    };

    if let Some(max) = max_armored {
        if body_len > max {
            return Err(FrameError::PayloadTooLarge {
                size: body_len,
                max,
            });
        }
    }

    if src.len() < HEADER_SIZE + body_len {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let body = src.split_to(body_len);
    let payload = STANDARD.decode(&body[..])?;

    Ok(Some(Frame {
        payload: Bytes::from(payload),
        armored_len: body_len,
    }))
}

/// Configuration for framed I/O.
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    /// Upper bound on the armored body length. Default: unbounded.
    pub max_armored_size: Option<usize>,
    /// Longest a single "readable" readiness wait may take. Default: forever.
    pub read_timeout: Option<std::time::Duration>,
    /// Longest a single "writable" readiness wait may take. Default: forever.
    pub write_timeout: Option<std::time::Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_ping_bit_exact() {
        let mut buf = BytesMut::new();
        let len = encode_frame(b"ping", &mut buf).unwrap();

        assert_eq!(len, 8);
        assert_eq!(&buf[..], b"\x08\x00\x00\x00cGluZw==");
    }

    #[test]
    fn empty_payload_has_zero_length_header() {
        let mut buf = BytesMut::new();
        let len = encode_frame(b"", &mut buf).unwrap();

        assert_eq!(len, 0);
        assert_eq!(&buf[..], &[0u8, 0, 0, 0]);

        let frame = decode_frame(&mut buf, None).unwrap().unwrap();
        assert!(frame.payload.is_empty());
        assert_eq!(frame.wire_size(), HEADER_SIZE);
        assert!(buf.is_empty());
    }

    #[test]
    fn armored_len_matches_padded_base64() {
        assert_eq!(armored_len(0), 0);
        assert_eq!(armored_len(1), 4);
        assert_eq!(armored_len(3), 4);
        assert_eq!(armored_len(4), 8);
        assert_eq!(armored_len(5), STANDARD.encode([0u8; 5]).len());
    }

    #[test]
    fn binary_payload_survives() {
        let payload: Vec<u8> = (0..=255u8).collect();
        let mut buf = BytesMut::new();
        encode_frame(&payload, &mut buf).unwrap();

        let frame = decode_frame(&mut buf, None).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), payload.as_slice());
    }

    #[test]
    fn incomplete_header_needs_more() {
        let mut buf = BytesMut::from(&[0x08, 0x00][..]);
        assert!(decode_frame(&mut buf, None).unwrap().is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn incomplete_body_needs_more() {
        let mut buf = BytesMut::new();
        encode_frame(b"hello", &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 3);

        assert!(decode_frame(&mut buf, None).unwrap().is_none());
        assert_eq!(buf.len(), HEADER_SIZE + 3);
    }

    #[test]
    fn invalid_armor_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(4);
        buf.put_slice(b"!!!!");

        let err = decode_frame(&mut buf, None).unwrap_err();
        assert!(matches!(err, FrameError::InvalidArmor(_)));
    }

    #[test]
    fn announced_length_over_cap_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(1024);

        let err = decode_frame(&mut buf, Some(16)).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge {
                size: 1024,
                max: 16
            }
        ));
    }

    #[test]
    fn consecutive_frames_decode_in_order() {
        let mut buf = BytesMut::new();
        encode_frame(b"first", &mut buf).unwrap();
        encode_frame(b"", &mut buf).unwrap();
        encode_frame(b"third", &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, None).unwrap().unwrap();
        let f2 = decode_frame(&mut buf, None).unwrap().unwrap();
        let f3 = decode_frame(&mut buf, None).unwrap().unwrap();

        assert_eq!(f1.payload.as_ref(), b"first");
        assert!(f2.payload.is_empty());
        assert_eq!(f3.payload.as_ref(), b"third");
        assert!(buf.is_empty());
    }

    #[test]
    fn for_payload_matches_decoded_frame() {
        let mut buf = BytesMut::new();
        encode_frame(b"pong", &mut buf).unwrap();
        let decoded = decode_frame(&mut buf, None).unwrap().unwrap();

        let built = Frame::for_payload(b"pong");
        assert_eq!(built, decoded);
        assert_eq!(built.wire_size(), 12);
    }
}
