use crate::error::{FrameError, Result};

/// A payload to send: raw bytes, or text that must be ASCII.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
}

impl<'a> Payload<'a> {
    /// The bytes to armor, rejecting non-ASCII text.
    pub fn as_bytes(&self) -> Result<&'a [u8]> {
        match *self {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Text(text) => match text.bytes().position(|b| !b.is_ascii()) {
                Some(index) => Err(FrameError::NonAscii { index }),
                None => Ok(text.as_bytes()),
            },
        }
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Payload::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Payload<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Payload::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl<'a> From<&'a bytes::Bytes> for Payload<'a> {
    fn from(bytes: &'a bytes::Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Payload::Text(text)
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(text: &'a String) -> Self {
        Payload::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_passes_through() {
        let payload = Payload::from("ping");
        assert_eq!(payload.as_bytes().unwrap(), b"ping");
    }

    #[test]
    fn non_ascii_text_is_rejected_with_index() {
        let err = Payload::from("caf\u{e9}").as_bytes().unwrap_err();
        assert!(matches!(err, FrameError::NonAscii { index: 3 }));
    }

    #[test]
    fn raw_bytes_are_not_checked() {
        let raw = [0xff_u8, 0x00, 0x80];
        assert_eq!(Payload::from(&raw).as_bytes().unwrap(), &raw);
    }
}
