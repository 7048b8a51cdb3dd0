//! Chain parameter definitions.
//!
//! Every value in here is consensus-level: changing one forks the node off
//! its network, so none of it is exposed to user configuration.

use std::fmt;

use crate::constants::{
    GENESIS_BLOCK_VERSION, GENESIS_MESSAGE, GENESIS_SCRIPT_TAG, GENESIS_TX_VERSION,
    MAX_BLOCK_HEIGHT,
};
use crate::Hash256;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "main",
            Self::Testnet => "test",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Some(Self::Mainnet),
            "test" | "testnet" => Some(Self::Testnet),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Mainnet => 0,
            Self::Testnet => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Mainnet),
            1 => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of Base58Check payloads that carry a network version prefix.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Base58Type {
    PubkeyAddress = 0,
    ScriptAddress = 1,
    SecretKey = 2,
    ExtPublicKey = 3,
    ExtSecretKey = 4,
}

pub const MAX_BASE58_TYPES: usize = 5;

impl Base58Type {
    pub const ALL: [Base58Type; MAX_BASE58_TYPES] = [
        Base58Type::PubkeyAddress,
        Base58Type::ScriptAddress,
        Base58Type::SecretKey,
        Base58Type::ExtPublicKey,
        Base58Type::ExtSecretKey,
    ];

    pub const fn as_usize(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PubkeyAddress => "pubkey_address",
            Self::ScriptAddress => "script_address",
            Self::SecretKey => "secret_key",
            Self::ExtPublicKey => "ext_public_key",
            Self::ExtSecretKey => "ext_secret_key",
        }
    }
}

/// A fixed bootstrap peer: 16 raw IPv6 address bytes plus a port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SeedSpec6 {
    pub addr: [u8; 16],
    pub port: u16,
}

impl SeedSpec6 {
    /// Builds an IPv4-mapped entry (`::ffff:a.b.c.d`).
    pub const fn ipv4(octets: [u8; 4], port: u16) -> Self {
        let [a, b, c, d] = octets;
        Self {
            addr: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, a, b, c, d],
            port,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DnsSeed {
    pub name: &'static str,
    pub host: &'static str,
}

/// Literal inputs of the genesis block together with its expected identity.
///
/// Hashes are given in display (big-endian) hex. `hash` is the block's
/// proof-of-work identity as peers know it. `header_digest` is the double
/// SHA-256 of the 80 serialized header bytes, which pins every header field
/// without needing the network's block hash function.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GenesisParams {
    pub message: &'static str,
    pub script_tag: i64,
    pub tx_version: i32,
    pub tx_time: u32,
    pub version: i32,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
    pub hash: &'static str,
    pub header_digest: &'static str,
    pub merkle_root: &'static str,
}

#[derive(Clone, Debug)]
pub struct ChainParams {
    pub network: Network,
    /// Prefix of every P2P message on this network.
    pub message_start: [u8; 4],
    /// Key that signs network alerts. Empty disables alert relay.
    pub alert_public_key: &'static [u8],
    pub default_port: u16,
    pub rpc_port: u16,
    /// The proof-of-work limit is the all-ones 256-bit value shifted right by this much.
    pub pow_limit_shift: u32,
    /// Subdirectory of the data dir used by this profile, if any.
    pub data_dir_suffix: Option<&'static str>,
    pub genesis: GenesisParams,
    pub dns_seeds: &'static [DnsSeed],
    pub fixed_seeds: &'static [SeedSpec6],
    pub base58_prefixes: [&'static [u8]; MAX_BASE58_TYPES],
    /// Last height validated under proof-of-work rules.
    pub last_pow_block: i32,
}

impl ChainParams {
    pub fn base58_prefix(&self, kind: Base58Type) -> &'static [u8] {
        self.base58_prefixes[kind.as_usize()]
    }

    pub fn is_pow_height(&self, height: i32) -> bool {
        height <= self.last_pow_block
    }
}

pub fn chain_params(network: Network) -> ChainParams {
    match network {
        Network::Mainnet => mainnet_chain_params(),
        Network::Testnet => testnet_chain_params(),
    }
}

const MAINNET_GENESIS: GenesisParams = GenesisParams {
    message: GENESIS_MESSAGE,
    script_tag: GENESIS_SCRIPT_TAG,
    tx_version: GENESIS_TX_VERSION,
    tx_time: 1_512_818_664,
    version: GENESIS_BLOCK_VERSION,
    time: 1_512_818_664,
    bits: 0x1e0f_ffff,
    nonce: 313_563,
    hash: "00000c7a44c2684992e1988b3fced0fcd2f121eef8730859770b296a94a8064c",
    header_digest: "e1cdb352995a1c9cfb66308f2b2a0097c2793f276d54d8c29dde942a528c439f",
    merkle_root: "810c5cbe8aa58deeaea1578aa8a45a084205453c15effe074b7d88c4a9aa8f48",
};

const MAINNET_DNS_SEEDS: [DnsSeed; 3] = [
    DnsSeed {
        name: "seed1",
        host: "91.92.136.77",
    },
    DnsSeed {
        name: "seed2",
        host: "85.217.170.89",
    },
    DnsSeed {
        name: "seed3",
        host: "91.92.136.192",
    },
];

// Not upstream data: one entry per DNS seed host on the default port.
const MAINNET_FIXED_SEEDS: [SeedSpec6; 3] = [
    SeedSpec6::ipv4([91, 92, 136, 77], 44_250),
    SeedSpec6::ipv4([85, 217, 170, 89], 44_250),
    SeedSpec6::ipv4([91, 92, 136, 192], 44_250),
];

const TESTNET_DNS_SEEDS: [DnsSeed; 0] = [];
const TESTNET_FIXED_SEEDS: [SeedSpec6; 0] = [];

const MAINNET_PUBKEY_PREFIX: [u8; 1] = [55];
const MAINNET_SCRIPT_PREFIX: [u8; 1] = [5];
const MAINNET_SECRET_PREFIX: [u8; 1] = [155];
const MAINNET_EXT_PUBLIC_PREFIX: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
const MAINNET_EXT_SECRET_PREFIX: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];

const TESTNET_PUBKEY_PREFIX: [u8; 1] = [117];
const TESTNET_SCRIPT_PREFIX: [u8; 1] = [196];
const TESTNET_SECRET_PREFIX: [u8; 1] = [239];
const TESTNET_EXT_PUBLIC_PREFIX: [u8; 4] = [0x04, 0x35, 0x87, 0xCF];
const TESTNET_EXT_SECRET_PREFIX: [u8; 4] = [0x04, 0x35, 0x83, 0x94];

fn mainnet_chain_params() -> ChainParams {
    ChainParams {
        network: Network::Mainnet,
        message_start: [0x25, 0xeb, 0x13, 0xed],
        alert_public_key: &[],
        default_port: 44_250,
        rpc_port: 44_260,
        pow_limit_shift: 20,
        data_dir_suffix: None,
        genesis: MAINNET_GENESIS,
        dns_seeds: &MAINNET_DNS_SEEDS,
        fixed_seeds: &MAINNET_FIXED_SEEDS,
        base58_prefixes: [
            &MAINNET_PUBKEY_PREFIX,
            &MAINNET_SCRIPT_PREFIX,
            &MAINNET_SECRET_PREFIX,
            &MAINNET_EXT_PUBLIC_PREFIX,
            &MAINNET_EXT_SECRET_PREFIX,
        ],
        last_pow_block: 200_000,
    }
}

// The test genesis keeps mainnet's time, nonce and bits, so both profiles
// share one genesis hash.
fn testnet_chain_params() -> ChainParams {
    let main = mainnet_chain_params();
    ChainParams {
        network: Network::Testnet,
        message_start: [0xe4, 0xc4, 0xfe, 0x24],
        alert_public_key: &[],
        default_port: 44_251,
        rpc_port: 44_261,
        pow_limit_shift: 16,
        data_dir_suffix: Some("testnet"),
        genesis: GenesisParams {
            time: 1_512_818_664,
            bits: 0x1e0f_ffff,
            nonce: 313_563,
            ..main.genesis
        },
        dns_seeds: &TESTNET_DNS_SEEDS,
        fixed_seeds: &TESTNET_FIXED_SEEDS,
        base58_prefixes: [
            &TESTNET_PUBKEY_PREFIX,
            &TESTNET_SCRIPT_PREFIX,
            &TESTNET_SECRET_PREFIX,
            &TESTNET_EXT_PUBLIC_PREFIX,
            &TESTNET_EXT_SECRET_PREFIX,
        ],
        last_pow_block: MAX_BLOCK_HEIGHT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexError {
    InvalidLength,
    InvalidHex,
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexError::InvalidLength => write!(f, "hash hex has invalid length"),
            HexError::InvalidHex => write!(f, "hash hex contains a non-hex character"),
        }
    }
}

impl std::error::Error for HexError {}

/// Parses a display-order (big-endian) hex hash into internal byte order.
///
/// Short inputs are zero-extended on the left, so `"00"` is the zero hash.
pub fn hash256_from_hex(input: &str) -> Result<Hash256, HexError> {
    let mut hex = input.trim();
    if let Some(stripped) = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")) {
        hex = stripped;
    }
    if hex.is_empty() || hex.len() > 64 {
        return Err(HexError::InvalidLength);
    }
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return Err(HexError::InvalidHex);
    }

    let padded = format!("{hex:0>64}");
    let mut bytes = [0u8; 32];
    for (i, byte_out) in bytes.iter_mut().enumerate() {
        let start = i * 2;
        *byte_out = u8::from_str_radix(&padded[start..start + 2], 16)
            .map_err(|_| HexError::InvalidHex)?;
    }
    bytes.reverse();
    Ok(bytes)
}

pub fn hash256_to_hex(hash: &Hash256) -> String {
    let mut display = *hash;
    display.reverse();
    bytes_to_hex(&display)
}

/// Lowercase hex of `bytes` in the order given.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
