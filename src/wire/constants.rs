/// Current Bitcoin P2P protocol version.
///
/// This value is sent in the `version` message during handshake
/// and is used for peer capability negotiation and feature gating.
///
/// The protocol version is defined in Bitcoin Core:
/// https://github.com/bitcoin/bitcoin/blob/707ad466968b947b364cfc25bcb4d6895e799418/src/node/protocol_version.h#L12
///
/// Message bodies receive it as `pver`. None of the messages in this crate
/// change shape with it, but the contract carries it for those that do.
pub const PROTOCOL_VERSION: u32 = 70016;

/// Maximum byte size of the opaque data carried by an unknown message.
///
/// Equal to the maximum size of a single script data element, so an
/// unrecognised command cannot be used to push blobs past the memory
/// budget of the framing layer.
pub const MAX_MESSAGE_DATA_SIZE: usize = 0x0200_0000;

/// Maximum payload size of any single message frame (32 MiB).
///
/// The length field of the 24-byte header is checked against this value
/// before a single payload byte is read.
pub const MAX_MESSAGE_PAYLOAD: u32 = 32 * 1024 * 1024;

/// Width of the NUL-padded command field in the message header.
pub const COMMAND_SIZE: usize = 12;

/// Size of the message header: magic (4) + command (12) + length (4) + checksum (4).
pub const MESSAGE_HEADER_SIZE: usize = 4 + COMMAND_SIZE + 4 + 4;
