// Newline-delimited framing for the JSON-RPC channel

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, Encoder};

/// Longest accepted message, excluding the trailing newline
pub const MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// One newline-terminated unit read from the channel.
///
/// Bad frames are items rather than decode errors, because `FramedRead`
/// stops for good after the first error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Message(String),
    InvalidUtf8,
    /// Longer than the limit; the rest of that line is discarded
    Oversized,
}

/// Splits input on `\n` and writes each message followed by `\n`
#[derive(Debug, Clone)]
pub struct JsonLinesCodec {
    inner: AnyDelimiterCodec,
    max_length: usize,
}

impl JsonLinesCodec {
    pub fn new() -> Self {
        Self::with_max_length(MAX_FRAME_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_length),
            max_length,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for JsonLinesCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(
    chunk: Result<Option<Bytes>, AnyDelimiterCodecError>,
) -> Result<Option<Frame>, AnyDelimiterCodecError> {
    match chunk {
        Ok(Some(bytes)) => Ok(Some(match std::str::from_utf8(&bytes) {
            Ok(text) => Frame::Message(text.to_string()),
            Err(_) => Frame::InvalidUtf8,
        })),
        Ok(None) => Ok(None),
        Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Frame::Oversized)),
        Err(e) => Err(e),
    }
}

impl Decoder for JsonLinesCodec {
    type Item = Frame;
    type Error = AnyDelimiterCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        classify(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        classify(self.inner.decode_eof(buf))
    }
}

impl Encoder<String> for JsonLinesCodec {
    type Error = AnyDelimiterCodecError;

    fn encode(&mut self, message: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.inner.encode(message, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut JsonLinesCodec, input: &[u8]) -> Vec<Frame> {
        let mut buf = BytesMut::from(input);
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(&mut buf).unwrap() {
            frames.push(frame);
        }
        while let Some(frame) = codec.decode_eof(&mut buf).unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_splits_lines() {
        let mut codec = JsonLinesCodec::new();
        let frames = decode_all(&mut codec, b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(
            frames,
            vec![
                Frame::Message("{\"a\":1}".to_string()),
                Frame::Message("{\"b\":2}".to_string()),
            ]
        );
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut codec = JsonLinesCodec::new();
        let frames = decode_all(&mut codec, b"first\nsecond");
        assert_eq!(
            frames,
            vec![
                Frame::Message("first".to_string()),
                Frame::Message("second".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_does_not_poison_following_lines() {
        let mut codec = JsonLinesCodec::new();
        let frames = decode_all(&mut codec, b"{\"x\":\"\xff\"}\nok\n");
        assert_eq!(frames, vec![Frame::InvalidUtf8, Frame::Message("ok".to_string())]);
    }

    #[test]
    fn test_oversized_line_is_skipped() {
        let mut codec = JsonLinesCodec::with_max_length(8);
        let frames = decode_all(&mut codec, b"0123456789abcdef\nshort\n");
        assert_eq!(frames, vec![Frame::Oversized, Frame::Message("short".to_string())]);
        assert_eq!(codec.max_length(), 8);
    }

    #[test]
    fn test_encode_appends_newline() {
        let mut codec = JsonLinesCodec::new();
        let mut dst = BytesMut::new();
        codec.encode("{}".to_string(), &mut dst).unwrap();
        assert_eq!(&dst[..], b"{}\n");
    }
}
