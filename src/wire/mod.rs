//! Bitcoin P2P wire protocol primitives.
//!
//! This module provides the message contract every P2P message body
//! implements, and the framing needed to move those bodies over a stream.
//!
//! It implements:
//! - The [`Message`] trait (command, decode, encode, payload bound)
//! - [`MsgUnknown`], a lossless holder for commands this crate does not
//!   understand
//! - A handful of control messages (`verack`, `ping`, `pong`, ...)
//! - CompactSize integers and var-bytes fields
//! - Parsing and writing of the 24-byte message header
//!
//! Anything read from the wire whose command has no concrete type
//! comes back as a [`MsgUnknown`], never as an error.
//!
//! Protocol reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html
pub mod codec;
pub mod control;
pub mod error;
pub mod message;
pub mod msgunknown;
pub mod network;
pub mod stream;
pub mod varint;

pub mod constants;

pub use codec::{make_empty_message, read_message, write_message};
pub use constants::{MAX_MESSAGE_DATA_SIZE, PROTOCOL_VERSION};
pub use control::{MsgGetAddr, MsgPing, MsgPong, MsgSendAddrV2, MsgSendHeaders, MsgVerack};
pub use error::{Error, Result};
pub use message::{Command, Message, MessageEncoding};
pub use msgunknown::{MAX_UNKNOWN_PAYLOAD_LENGTH, MsgUnknown};
pub use network::BitcoinNet;
