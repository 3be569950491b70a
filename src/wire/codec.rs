use crate::wire::constants::{COMMAND_SIZE, MAX_MESSAGE_PAYLOAD, MESSAGE_HEADER_SIZE};
use crate::wire::control::{MsgGetAddr, MsgPing, MsgPong, MsgSendAddrV2, MsgSendHeaders, MsgVerack};
use crate::wire::error::{Error, Result};
use crate::wire::message::{Command, Message, MessageEncoding};
use crate::wire::msgunknown::MsgUnknown;
use crate::wire::network::BitcoinNet;
use crate::wire::stream;
use byteorder::{ByteOrder, LittleEndian};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use tracing::{debug, trace, warn};

/// The 24-byte header preceding every message payload.
///
/// ```text
/// +------------+--------------+---------------+------------+
/// | magic (4)  | command (12) | length (4 LE) | checksum(4)|
/// +------------+--------------+---------------+------------+
/// ```
///
/// https://developer.bitcoin.org/reference/p2p_networking.html#message-headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub magic: u32,
    pub command: [u8; COMMAND_SIZE],
    pub length: u32,
    pub checksum: [u8; 4],
}

impl MessageHeader {
    pub fn read<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut header = [0u8; MESSAGE_HEADER_SIZE];
        stream::read_exact(r, &mut header)?;

        let magic = LittleEndian::read_u32(&header[0..4]);

        let mut command = [0u8; COMMAND_SIZE];
        command.copy_from_slice(&header[4..16]);

        let length = LittleEndian::read_u32(&header[16..20]);

        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&header[20..24]);

        Ok(MessageHeader {
            magic,
            command,
            length,
            checksum,
        })
    }

    /// The command field with its NUL padding removed.
    ///
    /// Only invalid UTF-8 is rejected here. Whatever else the peer put in the field
    /// is passed through untouched, so unknown commands keep every byte.
    pub fn command(&self) -> Result<String> {
        let end = self
            .command
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);

        String::from_utf8(self.command[..end].to_vec())
            .map_err(|e| Error::InvalidCommand(e.into_bytes()))
    }
}

/// First four bytes of `SHA256(SHA256(payload))`.
pub fn checksum(payload: &[u8]) -> [u8; 4] {
    let hash = Sha256::digest(Sha256::digest(payload));

    let mut sum = [0u8; 4];
    sum.copy_from_slice(&hash[..4]);
    sum
}

/// Returns an empty message of the type registered for `command`.
///
/// Commands without a concrete type get a [`MsgUnknown`] carrying the
/// command, so this never fails and callers never special-case unknowns.
pub fn make_empty_message(command: &str) -> Box<dyn Message> {
    match Command::from_name(command) {
        Some(Command::Verack) => Box::new(MsgVerack),
        Some(Command::GetAddr) => Box::new(MsgGetAddr),
        Some(Command::SendAddrV2) => Box::new(MsgSendAddrV2),
        Some(Command::SendHeaders) => Box::new(MsgSendHeaders),
        Some(Command::Ping) => Box::new(MsgPing::default()),
        Some(Command::Pong) => Box::new(MsgPong::default()),
        None => {
            debug!(command, "no concrete type for command, holding it as unknown");
            Box::new(MsgUnknown::new(command, Vec::new()))
        }
    }
}

/// Writes a complete message frame (header and body) to `w`.
///
/// The body is encoded into memory first so the header can carry its
/// length and checksum. Nothing reaches `w` unless the body encodes and
/// fits both [`MAX_MESSAGE_PAYLOAD`] and the message's own
/// [`max_payload_length`](Message::max_payload_length). Returns the
/// number of bytes written.
///
/// # Example
///
/// ```
/// use btc_wire::wire::{self, BitcoinNet, MessageEncoding, MsgVerack, PROTOCOL_VERSION};
///
/// let mut buffer = Vec::new();
/// let n = wire::write_message(
///     &mut buffer,
///     &MsgVerack,
///     PROTOCOL_VERSION,
///     BitcoinNet::MainNet,
///     MessageEncoding::Base,
/// )
/// .unwrap();
///
/// assert_eq!(n, 24);
/// assert_eq!(&buffer[..4], &[0xF9, 0xBE, 0xB4, 0xD9]);
/// ```
pub fn write_message<W: Write + ?Sized>(
    w: &mut W,
    msg: &dyn Message,
    pver: u32,
    net: BitcoinNet,
    enc: MessageEncoding,
) -> Result<usize> {
    let command = msg.command();
    if command.len() > COMMAND_SIZE {
        return Err(Error::CommandTooLong {
            command: command.to_string(),
            max: COMMAND_SIZE,
        });
    }

    let mut payload = Vec::new();
    msg.encode(&mut payload, pver, enc)?;

    let length = payload.len() as u64;
    let max = u64::from(MAX_MESSAGE_PAYLOAD.min(msg.max_payload_length(pver)));
    if length > max {
        warn!(command, length, max, "refusing to write oversized message");
        return Err(Error::PayloadTooLarge {
            command: command.to_string(),
            actual: length,
            max,
        });
    }

    let mut frame = Vec::with_capacity(MESSAGE_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&net.magic().to_le_bytes());

    let mut padded = [0u8; COMMAND_SIZE];
    padded[..command.len()].copy_from_slice(command.as_bytes());
    frame.extend_from_slice(&padded);

    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&checksum(&payload));
    frame.extend_from_slice(&payload);

    stream::write_all(w, &frame)?;

    trace!(command, length, "wrote message");
    Ok(frame.len())
}

/// Reads the next message frame from `r`.
///
/// The header is validated (network magic, declared length, checksum)
/// before the body is decoded. The body is handed to the message's
/// [`decode`](Message::decode) as a stream holding exactly the declared
/// payload, which is what lets [`MsgUnknown`] read to end-of-stream.
///
/// Returns the decoded message together with the raw payload bytes.
///
/// A frame for another network, with a non-UTF-8 command, or longer than
/// its message type allows has its body skipped before the error is
/// returned, so the next call starts on the following frame. A declared
/// length above [`MAX_MESSAGE_PAYLOAD`] is not skipped and leaves the
/// stream unusable.
///
/// # Example
///
/// ```
/// use btc_wire::wire::{self, BitcoinNet, MessageEncoding, MsgUnknown, PROTOCOL_VERSION};
/// use std::io::Cursor;
///
/// let mut buffer = Vec::new();
/// let outbound = MsgUnknown::new("foobar", vec![0x01, 0x02, 0x03]);
/// wire::write_message(&mut buffer, &outbound, PROTOCOL_VERSION, BitcoinNet::MainNet, MessageEncoding::Base)
///     .unwrap();
///
/// let (msg, raw) = wire::read_message(
///     &mut Cursor::new(buffer),
///     PROTOCOL_VERSION,
///     BitcoinNet::MainNet,
///     MessageEncoding::Base,
/// )
/// .unwrap();
///
/// assert_eq!(msg.command(), "foobar");
/// assert_eq!(raw, vec![0x03, 0x01, 0x02, 0x03]);
/// ```
pub fn read_message<R: Read + ?Sized>(
    r: &mut R,
    pver: u32,
    net: BitcoinNet,
    enc: MessageEncoding,
) -> Result<(Box<dyn Message>, Vec<u8>)> {
    let header = MessageHeader::read(r)?;
    let length = u64::from(header.length);

    if header.magic != net.magic() {
        return Err(skip_body(r, length, Error::WrongNetwork(header.magic)));
    }

    let command = match header.command() {
        Ok(command) => command,
        Err(err) => return Err(skip_body(r, length, err)),
    };

    if header.length > MAX_MESSAGE_PAYLOAD {
        return Err(Error::PayloadTooLarge {
            command,
            actual: length,
            max: u64::from(MAX_MESSAGE_PAYLOAD),
        });
    }

    let mut msg = make_empty_message(&command);

    let max = msg.max_payload_length(pver);
    if header.length > max {
        let err = Error::PayloadTooLarge {
            command,
            actual: length,
            max: u64::from(max),
        };
        return Err(skip_body(r, length, err));
    }

    let mut payload = vec![0u8; header.length as usize];
    stream::read_exact(r, &mut payload)?;

    let actual = checksum(&payload);
    if actual != header.checksum {
        warn!(%command, length, "dropping message with bad checksum");
        return Err(Error::ChecksumMismatch {
            expected: hex::encode(header.checksum),
            actual: hex::encode(actual),
        });
    }

    msg.decode(&mut payload.as_slice(), pver, enc)?;

    trace!(%command, length, "read message");
    Ok((msg, payload))
}

/// Drops the `length` body bytes of a rejected frame and hands back `err`.
/// A failure while skipping is logged; the original error still wins.
fn skip_body<R: Read + ?Sized>(r: &mut R, length: u64, err: Error) -> Error {
    debug!(%err, length, "skipping body of rejected message");
    if let Err(skip_err) = stream::discard(r, length) {
        warn!(%skip_err, length, "could not skip body of rejected message");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::constants::PROTOCOL_VERSION;
    use std::io::Cursor;

    const MAINNET_MAGIC: [u8; 4] = [0xF9, 0xBE, 0xB4, 0xD9];

    /// Builds a full message frame (header + payload) by hand.
    fn build_frame(cmd_str: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![];

        // magic
        bytes.extend_from_slice(&MAINNET_MAGIC);

        // command padded to 12 bytes
        let mut cmd = [0u8; 12];
        cmd[..cmd_str.len()].copy_from_slice(cmd_str);
        bytes.extend_from_slice(&cmd);

        // length
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());

        // checksum
        bytes.extend_from_slice(&checksum(payload));

        // payload
        bytes.extend_from_slice(payload);

        bytes
    }

    fn read(bytes: Vec<u8>) -> Result<(Box<dyn Message>, Vec<u8>)> {
        read_message(
            &mut Cursor::new(bytes),
            PROTOCOL_VERSION,
            BitcoinNet::MainNet,
            MessageEncoding::Witness,
        )
    }

    fn write(msg: &dyn Message) -> Result<Vec<u8>> {
        let mut buf = vec![];
        write_message(
            &mut buf,
            msg,
            PROTOCOL_VERSION,
            BitcoinNet::MainNet,
            MessageEncoding::Witness,
        )?;
        Ok(buf)
    }

    #[test]
    fn checksum_of_empty_payload() {
        // SHA256(SHA256("")) starts with 5df6e0e2
        assert_eq!(checksum(&[]), [0x5D, 0xF6, 0xE0, 0xE2]);
    }

    #[test]
    fn make_empty_message_dispatches_known_commands() {
        for command in Command::ALL {
            let msg = make_empty_message(command.as_str());
            assert_eq!(msg.command(), command.as_str());
            assert!(msg.downcast_ref::<MsgUnknown>().is_none());
        }
        assert!(make_empty_message("ping").downcast_ref::<MsgPing>().is_some());
    }

    #[test]
    fn make_empty_message_falls_back_to_unknown() {
        let msg = make_empty_message("wtfmessage");

        let unknown = msg.downcast_ref::<MsgUnknown>().unwrap();
        assert_eq!(unknown.command(), "wtfmessage");
        assert!(unknown.payload().is_empty());
    }

    #[test]
    fn read_message_verack_has_empty_payload() {
        let (msg, raw) = read(build_frame(b"verack", &[])).unwrap();

        assert!(msg.downcast_ref::<MsgVerack>().is_some());
        assert!(raw.is_empty());
    }

    #[test]
    fn read_message_decodes_ping_nonce() {
        let (msg, _) = read(build_frame(b"ping", &7u64.to_le_bytes())).unwrap();

        assert_eq!(msg.downcast_ref::<MsgPing>(), Some(&MsgPing::new(7)));
    }

    #[test]
    fn read_message_unknown_command_preserved_in_payload() {
        let (msg, raw) = read(build_frame(b"wtfmessage", &[1, 2, 3])).unwrap();

        let unknown = msg.downcast_ref::<MsgUnknown>().unwrap();
        assert_eq!(unknown.command(), "wtfmessage");
        assert_eq!(unknown.payload(), &[1, 2, 3]);
        assert_eq!(raw, vec![1, 2, 3]);
    }

    #[test]
    fn read_message_unknown_command_with_empty_payload() {
        let (msg, _) = read(build_frame(b"mystery", &[])).unwrap();

        let unknown = msg.downcast_ref::<MsgUnknown>().unwrap();
        assert!(unknown.payload().is_empty());
    }

    #[test]
    fn read_message_full_width_command_has_no_padding() {
        let (msg, _) = read(build_frame(b"abcdefghijkl", &[0x01])).unwrap();
        assert_eq!(msg.command(), "abcdefghijkl");
    }

    #[test]
    fn read_message_leaves_following_frame_untouched() {
        let mut bytes = build_frame(b"unknowncmd", &[9, 9]);
        bytes.extend(build_frame(b"verack", &[]));
        let mut cursor = Cursor::new(bytes);

        let (first, _) = read_message(
            &mut cursor,
            PROTOCOL_VERSION,
            BitcoinNet::MainNet,
            MessageEncoding::Base,
        )
        .unwrap();
        let (second, _) = read_message(
            &mut cursor,
            PROTOCOL_VERSION,
            BitcoinNet::MainNet,
            MessageEncoding::Base,
        )
        .unwrap();

        assert_eq!(first.downcast_ref::<MsgUnknown>().unwrap().payload(), &[9, 9]);
        assert_eq!(second.command(), "verack");
    }

    #[test]
    fn read_message_rejects_other_network() {
        let mut bytes = build_frame(b"verack", &[]);
        bytes[..4].copy_from_slice(&BitcoinNet::Regtest.magic().to_le_bytes());

        let err = read(bytes).unwrap_err();
        assert!(matches!(err, Error::WrongNetwork(0xDAB5_BFFA)));
    }

    fn read_two(bytes: Vec<u8>) -> (Result<Box<dyn Message>>, Result<Box<dyn Message>>) {
        let mut cursor = Cursor::new(bytes);
        let mut next = || {
            read_message(
                &mut cursor,
                PROTOCOL_VERSION,
                BitcoinNet::MainNet,
                MessageEncoding::Base,
            )
            .map(|(msg, _)| msg)
        };
        let first = next();
        let second = next();
        (first, second)
    }

    #[test]
    fn read_message_skips_body_of_other_network_frame() {
        let mut bytes = build_frame(b"wtfmessage", &[1, 2, 3]);
        bytes[..4].copy_from_slice(&BitcoinNet::TestNet3.magic().to_le_bytes());
        bytes.extend(build_frame(b"verack", &[]));

        let (first, second) = read_two(bytes);

        assert!(matches!(first, Err(Error::WrongNetwork(_))));
        assert_eq!(second.unwrap().command(), "verack");
    }

    #[test]
    fn read_message_skips_body_of_non_utf8_command() {
        let mut bytes = build_frame(&[0xC3, 0x28], &[4, 5, 6, 7]);
        bytes.extend(build_frame(b"verack", &[]));

        let (first, second) = read_two(bytes);

        assert!(matches!(first, Err(Error::InvalidCommand(_))));
        assert_eq!(second.unwrap().command(), "verack");
    }

    #[test]
    fn read_message_skips_body_above_type_bound() {
        let mut bytes = build_frame(b"verack", &[0x00]);
        bytes.extend(build_frame(b"ping", &9u64.to_le_bytes()));

        let (first, second) = read_two(bytes);

        assert!(matches!(first, Err(Error::PayloadTooLarge { actual: 1, max: 0, .. })));
        let second = second.unwrap();
        assert_eq!(second.downcast_ref::<MsgPing>(), Some(&MsgPing::new(9)));
    }

    #[test]
    fn read_message_surfaces_interrupted_header_read() {
        struct Interrupting;

        impl Read for Interrupting {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::Interrupted.into())
            }
        }

        let err = read_message(
            &mut Interrupting,
            PROTOCOL_VERSION,
            BitcoinNet::MainNet,
            MessageEncoding::Base,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Read(e) if e.kind() == std::io::ErrorKind::Interrupted));
    }

    #[test]
    fn read_message_rejects_bad_checksum() {
        let mut bytes = build_frame(b"wtfmessage", &[1, 2, 3]);
        bytes[20] ^= 0xFF;

        let err = read(bytes).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }

    #[test]
    fn read_message_rejects_length_above_type_bound() {
        let err = read(build_frame(b"verack", &[0x00])).unwrap_err();
        assert!(matches!(
            err,
            Error::PayloadTooLarge {
                actual: 1,
                max: 0,
                ..
            }
        ));
    }

    #[test]
    fn read_message_rejects_length_above_frame_limit_before_reading_body() {
        let mut bytes = build_frame(b"wtfmessage", &[]);
        bytes[16..20].copy_from_slice(&(MAX_MESSAGE_PAYLOAD + 1).to_le_bytes());

        let err = read(bytes).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { command, .. } if command == "wtfmessage"));
    }

    #[test]
    fn read_message_truncated_body_returns_read_error() {
        let mut bytes = build_frame(b"wtfmessage", &[1, 2, 3, 4]);
        bytes.truncate(bytes.len() - 2);

        let err = read(bytes).unwrap_err();
        assert!(matches!(err, Error::Read(_)));
    }

    #[test]
    fn read_message_rejects_non_utf8_command() {
        let err = read(build_frame(&[0xC3, 0x28], &[])).unwrap_err();
        assert!(matches!(err, Error::InvalidCommand(bytes) if bytes == vec![0xC3, 0x28]));
    }

    #[test]
    fn write_message_matches_hand_built_frame() {
        let frame = write(&MsgUnknown::new("foobar", vec![1, 2, 3])).unwrap();
        assert_eq!(frame, build_frame(b"foobar", &[0x03, 1, 2, 3]));

        let frame = write(&MsgPong::new(5)).unwrap();
        assert_eq!(frame, build_frame(b"pong", &5u64.to_le_bytes()));
    }

    #[test]
    fn write_message_rejects_long_command_without_writing() {
        let mut buf = vec![];
        let err = write_message(
            &mut buf,
            &MsgUnknown::new("thirteenchars", vec![]),
            PROTOCOL_VERSION,
            BitcoinNet::MainNet,
            MessageEncoding::Base,
        )
        .unwrap_err();

        assert!(matches!(err, Error::CommandTooLong { max: 12, .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn write_message_propagates_oversize_unknown() {
        let msg = MsgUnknown::new("huge", vec![0u8; crate::wire::constants::MAX_MESSAGE_DATA_SIZE + 1]);

        let err = write(&msg).unwrap_err();
        assert!(matches!(err, Error::Oversize { .. }));
    }

    #[test]
    fn unknown_message_relays_through_two_hops() {
        // inbound frame -> MsgUnknown -> outbound frame re-wraps the body
        let (msg, raw) = read(build_frame(b"futurecmd", &[0xCA, 0xFE])).unwrap();
        let unknown = msg.downcast_ref::<MsgUnknown>().unwrap();

        let relayed = write(unknown).unwrap();
        let (again, _) = read(relayed).unwrap();
        let again = again.downcast_ref::<MsgUnknown>().unwrap();

        assert_eq!(again.command(), "futurecmd");
        let mut body = again.payload();
        let inner = crate::wire::varint::read_var_bytes(&mut body, 16, "payload").unwrap();
        assert_eq!(inner, raw);
    }
}
