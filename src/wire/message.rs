use crate::wire::error::Result;
use std::any::Any;
use std::fmt::Debug;
use std::io::{Read, Write};

/// Alternate body serializations negotiated for some message types.
///
/// Witness-aware messages (`tx`, `block`) change shape under
/// [`MessageEncoding::Witness`] (BIP144). Messages without witness data,
/// including [`MsgUnknown`](crate::wire::MsgUnknown), ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageEncoding {
    /// Legacy encoding, no witness data.
    Base,
    /// BIP144 witness encoding.
    #[default]
    Witness,
}

/// A Bitcoin P2P message body.
///
/// Every message type implements this trait, and the framing layer in
/// [`codec`](crate::wire::codec) only ever deals in `Box<dyn Message>`.
/// Adding a type means implementing the trait and registering its command
/// in [`make_empty_message`](crate::wire::codec::make_empty_message);
/// anything left unregistered is carried by
/// [`MsgUnknown`](crate::wire::MsgUnknown) instead.
///
/// See:
/// https://developer.bitcoin.org/reference/p2p_networking.html
pub trait Message: Debug + Send {
    /// The command string carried in the message header.
    fn command(&self) -> &str;

    /// Populates `self` from `r`.
    ///
    /// `r` is already limited to this message's payload, as declared by
    /// the header. Implementations read exactly their body.
    fn decode(&mut self, r: &mut dyn Read, pver: u32, enc: MessageEncoding) -> Result<()>;

    /// Writes the body of `self` to `w`.
    fn encode(&self, w: &mut dyn Write, pver: u32, enc: MessageEncoding) -> Result<()>;

    /// Upper bound on the encoded body size for protocol version `pver`.
    ///
    /// Not necessarily tight.
    fn max_payload_length(&self, pver: u32) -> u32;

    /// The message as `Any`, so [`downcast_ref`](#method.downcast_ref) can
    /// recover its concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Message {
    /// Returns the concrete message if it is a `T`.
    pub fn downcast_ref<T: Message + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Commands this crate decodes into a concrete type.
///
/// Anything else on the wire is held as a
/// [`MsgUnknown`](crate::wire::MsgUnknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Verack,
    GetAddr,
    SendAddrV2,
    SendHeaders,
    Ping,
    Pong,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Verack,
        Command::GetAddr,
        Command::SendAddrV2,
        Command::SendHeaders,
        Command::Ping,
        Command::Pong,
    ];

    /// The ASCII command string used in the message header.
    pub const fn as_str(self) -> &'static str {
        match self {
            Command::Verack => "verack",
            Command::GetAddr => "getaddr",
            Command::SendAddrV2 => "sendaddrv2",
            Command::SendHeaders => "sendheaders",
            Command::Ping => "ping",
            Command::Pong => "pong",
        }
    }

    /// Looks up a header command string. Matching is exact.
    pub fn from_name(name: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|c| c.as_str() == name)
    }
}
