use std::fmt;
use std::str::FromStr;

/// Bitcoin networks, identified on the wire by their header magic.
///
/// The first 4 bytes of every P2P message identify the network and act
/// as a message boundary marker in the TCP stream.
///
/// You can also see how Bitcoin Core maps magic values to networks
/// in `GetNetworkForMagic`:
/// https://github.com/bitcoin/bitcoin/blob/master/src/kernel/chainparams.cpp#L703-L723
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitcoinNet {
    #[default]
    MainNet,
    TestNet3,
    Regtest,
    Signet,
}

impl BitcoinNet {
    /// Magic value, serialized little-endian in the header.
    ///
    /// For mainnet this is `0xD9B4BEF9`, i.e. `F9 BE B4 D9` on the wire.
    pub const fn magic(self) -> u32 {
        match self {
            BitcoinNet::MainNet => 0xD9B4_BEF9,
            BitcoinNet::TestNet3 => 0x0709_110B,
            BitcoinNet::Regtest => 0xDAB5_BFFA,
            BitcoinNet::Signet => 0x40CF_030A,
        }
    }

    pub fn from_magic(magic: u32) -> Option<BitcoinNet> {
        [
            BitcoinNet::MainNet,
            BitcoinNet::TestNet3,
            BitcoinNet::Regtest,
            BitcoinNet::Signet,
        ]
        .into_iter()
        .find(|net| net.magic() == magic)
    }
}

impl fmt::Display for BitcoinNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BitcoinNet::MainNet => "mainnet",
            BitcoinNet::TestNet3 => "testnet3",
            BitcoinNet::Regtest => "regtest",
            BitcoinNet::Signet => "signet",
        };
        f.write_str(name)
    }
}

impl FromStr for BitcoinNet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(BitcoinNet::MainNet),
            "testnet3" | "testnet" => Ok(BitcoinNet::TestNet3),
            "regtest" => Ok(BitcoinNet::Regtest),
            "signet" => Ok(BitcoinNet::Signet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}
