//! Bitcoin P2P message framing with a lossless fallback for unknown commands.
//!
//! Everything lives under [`wire`]. A node reads frames with
//! [`wire::read_message`], gets back a `Box<dyn wire::Message>`, and can
//! relay or re-encode it without caring whether the command was one this
//! crate understands.
pub mod wire;
