use crate::wire::constants::MAX_MESSAGE_DATA_SIZE;
use crate::wire::error::{Error, Result};
use crate::wire::message::{Message, MessageEncoding};
use crate::wire::stream;
use crate::wire::varint::{var_int_serialize_size, write_var_bytes};
use std::any::Any;
use std::io::{Read, Write};
use tracing::warn;

/// Worst-case encoded size of an unknown body: a payload of exactly
/// [`MAX_MESSAGE_DATA_SIZE`] bytes behind its CompactSize prefix.
pub const MAX_UNKNOWN_PAYLOAD_LENGTH: u32 =
    (var_int_serialize_size(MAX_MESSAGE_DATA_SIZE as u64) + MAX_MESSAGE_DATA_SIZE) as u32;

/// A message whose command this implementation does not understand.
///
/// The command string and the payload bytes are kept exactly as received,
/// so the message can be logged, relayed or dropped without interpreting
/// it. The command is never validated here; that is the job of whoever
/// parsed the header.
///
/// Decoding and encoding are asymmetric:
///
/// - [`decode`](Message::decode) takes every remaining byte of a stream the
///   framing layer has already cut to the header's length.
/// - [`encode`](Message::encode) writes the payload as a var-bytes field
///   (CompactSize length, then the bytes).
///
/// # Example
///
/// ```
/// use btc_wire::wire::{Message, MessageEncoding, MsgUnknown, PROTOCOL_VERSION};
///
/// let msg = MsgUnknown::new("foobar", vec![0x01, 0x02, 0x03]);
///
/// let mut body = Vec::new();
/// msg.encode(&mut body, PROTOCOL_VERSION, MessageEncoding::Base).unwrap();
///
/// assert_eq!(msg.command(), "foobar");
/// assert_eq!(body, vec![0x03, 0x01, 0x02, 0x03]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsgUnknown {
    command: String,
    payload: Vec<u8>,
}

impl MsgUnknown {
    /// No size check happens here; see [`Error::Oversize`].
    pub fn new(command: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            command: command.into(),
            payload,
        }
    }

    /// The raw body bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the message and returns its body bytes without copying.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

impl Message for MsgUnknown {
    fn command(&self) -> &str {
        &self.command
    }

    fn decode(&mut self, r: &mut dyn Read, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        let mut payload = Vec::new();
        stream::read_to_end(r, &mut payload)?;

        self.payload = payload;
        Ok(())
    }

    fn encode(&self, w: &mut dyn Write, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        let size = self.payload.len();
        if size > MAX_MESSAGE_DATA_SIZE {
            warn!(
                command = %self.command,
                size,
                max = MAX_MESSAGE_DATA_SIZE,
                "refusing to encode oversized unknown message"
            );
            return Err(Error::Oversize {
                actual: size,
                max: MAX_MESSAGE_DATA_SIZE,
            });
        }

        write_var_bytes(w, &self.payload)
    }

    fn max_payload_length(&self, _pver: u32) -> u32 {
        MAX_UNKNOWN_PAYLOAD_LENGTH
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
