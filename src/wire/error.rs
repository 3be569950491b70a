//! Errors produced while encoding, decoding or framing messages.

use std::io;
use thiserror::Error;

/// Wire errors.
///
/// `Read` and `Write` wrap failures of the caller's stream. Everything else
/// is detected by this crate before (or instead of) touching the stream.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying stream failed or ended early while decoding.
    #[error("read error: {0}")]
    Read(#[source] io::Error),

    /// The underlying stream failed while encoding.
    #[error("write error: {0}")]
    Write(#[source] io::Error),

    /// An unknown message payload exceeds [`MAX_MESSAGE_DATA_SIZE`].
    ///
    /// [`MAX_MESSAGE_DATA_SIZE`]: crate::wire::constants::MAX_MESSAGE_DATA_SIZE
    #[error("unknown size too large for message [size {actual}, max {max}]")]
    Oversize { actual: usize, max: usize },

    /// A length-prefixed field declares more bytes than its type allows.
    #[error("{field} is larger than the max allowed size [count {actual}, max {max}]")]
    FieldTooLarge {
        field: &'static str,
        actual: u64,
        max: u64,
    },

    /// A CompactSize integer used a wider form than its value needs.
    #[error("non-canonical varint {value:#x} - discriminant {discriminant:#04x} must encode a value of at least {min:#x}")]
    NonCanonicalVarInt {
        discriminant: u8,
        value: u64,
        min: u64,
    },

    /// The command does not fit the 12-byte header field.
    #[error("command [{command}] is too long [max {max}]")]
    CommandTooLong { command: String, max: usize },

    /// The header command field is not valid UTF-8.
    #[error("invalid command {0:02x?}")]
    InvalidCommand(Vec<u8>),

    /// A message body is larger than the frame or its type allows.
    #[error("message payload is too large - {actual} bytes, but maximum message payload size for messages of type [{command}] is {max}")]
    PayloadTooLarge {
        command: String,
        actual: u64,
        max: u64,
    },

    /// The header magic belongs to a different network.
    #[error("message from other network [{0:#010x}]")]
    WrongNetwork(u32),

    /// The header checksum does not match the payload.
    #[error("payload checksum failed - header indicates {expected}, but actual checksum is {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

pub type Result<T> = std::result::Result<T, Error>;
