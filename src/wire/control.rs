//! Version-invariant control messages.
//!
//! These are the messages a node needs to keep a connection alive and to
//! negotiate relay behaviour. Four of them have empty bodies; `ping` and
//! `pong` carry a single 8-byte nonce.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#control-messages

use crate::wire::error::Result;
use crate::wire::message::{Command, Message, MessageEncoding};
use crate::wire::stream;
use byteorder::{ByteOrder, LittleEndian};
use rand::Rng;
use std::any::Any;
use std::io::{Read, Write};

/// `verack`: acknowledges a peer's `version`. Empty body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgVerack;

impl Message for MsgVerack {
    fn command(&self) -> &str {
        Command::Verack.as_str()
    }

    fn decode(&mut self, _r: &mut dyn Read, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        Ok(())
    }

    fn encode(&self, _w: &mut dyn Write, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        Ok(())
    }

    fn max_payload_length(&self, _pver: u32) -> u32 {
        0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `getaddr`: asks the peer for known node addresses. Empty body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgGetAddr;

impl Message for MsgGetAddr {
    fn command(&self) -> &str {
        Command::GetAddr.as_str()
    }

    fn decode(&mut self, _r: &mut dyn Read, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        Ok(())
    }

    fn encode(&self, _w: &mut dyn Write, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        Ok(())
    }

    fn max_payload_length(&self, _pver: u32) -> u32 {
        0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `sendaddrv2`: signals BIP 155 support. Empty body.
///
/// Must be sent after `version` and before `verack`; peers that understand
/// it answer `getaddr` with `addrv2` instead of the legacy `addr`.
///
/// https://github.com/bitcoin/bips/blob/master/bip-0155.mediawiki
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgSendAddrV2;

impl Message for MsgSendAddrV2 {
    fn command(&self) -> &str {
        Command::SendAddrV2.as_str()
    }

    fn decode(&mut self, _r: &mut dyn Read, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        Ok(())
    }

    fn encode(&self, _w: &mut dyn Write, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        Ok(())
    }

    fn max_payload_length(&self, _pver: u32) -> u32 {
        0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `sendheaders`: asks the peer to announce new blocks with `headers`
/// instead of `inv` (BIP 130). Empty body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgSendHeaders;

impl Message for MsgSendHeaders {
    fn command(&self) -> &str {
        Command::SendHeaders.as_str()
    }

    fn decode(&mut self, _r: &mut dyn Read, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        Ok(())
    }

    fn encode(&self, _w: &mut dyn Write, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        Ok(())
    }

    fn max_payload_length(&self, _pver: u32) -> u32 {
        0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn read_nonce(r: &mut dyn Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    stream::read_exact(r, &mut buf)?;
    Ok(LittleEndian::read_u64(&buf))
}

fn write_nonce(w: &mut dyn Write, nonce: u64) -> Result<()> {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, nonce);
    stream::write_all(w, &buf)
}

/// `ping`: keep-alive carrying a nonce the peer echoes back in `pong`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgPing {
    pub nonce: u64,
}

impl MsgPing {
    pub fn new(nonce: u64) -> Self {
        Self { nonce }
    }

    /// A ping with a fresh random nonce.
    pub fn random() -> Self {
        Self::new(rand::thread_rng().r#gen())
    }

    /// The `pong` a well-behaved peer answers with.
    pub fn reply(&self) -> MsgPong {
        MsgPong::new(self.nonce)
    }
}

impl Message for MsgPing {
    fn command(&self) -> &str {
        Command::Ping.as_str()
    }

    fn decode(&mut self, r: &mut dyn Read, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        self.nonce = read_nonce(r)?;
        Ok(())
    }

    fn encode(&self, w: &mut dyn Write, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        write_nonce(w, self.nonce)
    }

    fn max_payload_length(&self, _pver: u32) -> u32 {
        8
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `pong`: answer to a `ping`, echoing its nonce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgPong {
    pub nonce: u64,
}

impl MsgPong {
    pub fn new(nonce: u64) -> Self {
        Self { nonce }
    }
}

impl Message for MsgPong {
    fn command(&self) -> &str {
        Command::Pong.as_str()
    }

    fn decode(&mut self, r: &mut dyn Read, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        self.nonce = read_nonce(r)?;
        Ok(())
    }

    fn encode(&self, w: &mut dyn Write, _pver: u32, _enc: MessageEncoding) -> Result<()> {
        write_nonce(w, self.nonce)
    }

    fn max_payload_length(&self, _pver: u32) -> u32 {
        8
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
