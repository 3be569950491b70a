use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::Cursor;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use btc_wire::wire::{self, BitcoinNet, Message, MessageEncoding, MsgPing, MsgUnknown};

#[derive(Parser)]
#[command(name = "btc-wire")]
#[command(about = "Build and inspect Bitcoin P2P message frames", long_about = None)]
struct Cli {
    /// Network whose magic frames are written with and checked against
    #[arg(long, global = true, default_value_t = BitcoinNet::MainNet)]
    network: BitcoinNet,

    /// Protocol version passed to message encoders and decoders
    #[arg(long, global = true, default_value_t = wire::PROTOCOL_VERSION)]
    protocol_version: u32,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an arbitrary command and payload as an unknown message
    Encode {
        /// Command string, up to 12 bytes when framed
        #[arg(long)]
        command: String,

        /// Payload as hex
        #[arg(long, default_value = "")]
        payload: String,

        /// Print the full frame (header + body) instead of the body alone
        #[arg(long)]
        framed: bool,
    },
    /// Decode a hex-encoded message frame
    Decode {
        #[arg(long)]
        hex: String,
    },
    /// Print a framed ping with a random nonce
    Ping,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Encode {
            command,
            payload,
            framed,
        } => encode(cli.network, cli.protocol_version, command, &payload, framed)?,
        Commands::Decode { hex } => decode(cli.network, cli.protocol_version, &hex)?,
        Commands::Ping => ping(cli.network, cli.protocol_version)?,
    }

    Ok(())
}

fn encode(
    net: BitcoinNet,
    pver: u32,
    command: String,
    payload_hex: &str,
    framed: bool,
) -> Result<(), Box<dyn Error>> {
    let msg = MsgUnknown::new(command, hex::decode(payload_hex)?);

    let mut out = Vec::new();
    if framed {
        wire::write_message(&mut out, &msg, pver, net, MessageEncoding::Base)?;
    } else {
        msg.encode(&mut out, pver, MessageEncoding::Base)?;
    }

    println!("{}", hex::encode(out));
    Ok(())
}

fn decode(net: BitcoinNet, pver: u32, frame_hex: &str) -> Result<(), Box<dyn Error>> {
    let bytes = hex::decode(frame_hex.trim())?;
    let mut cursor = Cursor::new(bytes);

    let (msg, raw) = wire::read_message(&mut cursor, pver, net, MessageEncoding::Witness)?;

    println!("Command: {}", msg.command());
    println!("Payload length: {}", raw.len());
    println!("Payload: {}", hex::encode(&raw));

    match msg.downcast_ref::<MsgUnknown>() {
        Some(_) => println!("Type: unknown (payload kept verbatim)"),
        None => println!("Type: {:?}", msg),
    }

    let trailing = cursor.get_ref().len() as u64 - cursor.position();
    if trailing > 0 {
        println!("Trailing bytes after frame: {}", trailing);
    }

    Ok(())
}

fn ping(net: BitcoinNet, pver: u32) -> Result<(), Box<dyn Error>> {
    let ping = MsgPing::random();

    let mut out = Vec::new();
    wire::write_message(&mut out, &ping, pver, net, MessageEncoding::Base)?;

    println!("Nonce: {}", ping.nonce);
    println!("{}", hex::encode(out));
    Ok(())
}
