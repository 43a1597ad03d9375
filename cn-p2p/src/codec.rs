//! Length-prefixed message framing.
//!
//! The event loop owns the sockets; the codec below is the boundary where
//! buffered transport bytes become fully-framed slices handed to the seria
//! decoder. A frame is a canonical varint payload length followed by the
//! payload. The codec is a pure state machine over caller-owned buffers and
//! needs no runtime of its own.

use std::io;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use cn_seria::{
    encode, from_bytes, read_varint, write_varint, DecodeLimits, ErrorKind, SliceStream,
};

use crate::message::Message;

/// Upper bound on a single frame's payload.
pub const MAX_FRAME_SIZE: usize = 32 * 1024 * 1024;

/// Framing codec for [`Message`] streams.
pub struct MessageCodec {
    limits: DecodeLimits,
    expected_len: Option<usize>,
}

impl MessageCodec {
    pub fn new(limits: DecodeLimits) -> Self {
        Self {
            limits,
            expected_len: None,
        }
    }

    /// Try to take a complete length prefix off the front of `src`.
    /// An incomplete varint is "need more bytes", not an error.
    fn read_length(src: &mut BytesMut) -> io::Result<Option<usize>> {
        if src.is_empty() {
            return Ok(None);
        }
        let mut stream = SliceStream::new(src.as_ref());
        match read_varint(&mut stream) {
            Ok(len) => {
                let consumed = stream.consumed();
                src.advance(consumed);
                Ok(Some(len as usize))
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEnd => Ok(None),
            Err(err) => Err(io::Error::new(io::ErrorKind::InvalidData, err)),
        }
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(DecodeLimits::default())
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut item = item;
        let mut payload = Vec::new();
        encode(&mut payload, &mut item)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        if payload.len() > MAX_FRAME_SIZE {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "frame too large"));
        }

        write_varint(dst, payload.len() as u64)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let len = match self.expected_len {
            Some(len) => len,
            None => match Self::read_length(src)? {
                Some(len) => {
                    if len > MAX_FRAME_SIZE {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "frame too large",
                        ));
                    }
                    self.expected_len = Some(len);
                    len
                }
                None => return Ok(None),
            },
        };

        if src.len() < len {
            src.reserve(len - src.len());
            return Ok(None);
        }

        let payload = src.split_to(len);
        self.expected_len = None;

        from_bytes::<Message>(payload.as_ref(), &self.limits)
            .map(Some)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}
