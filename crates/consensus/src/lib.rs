//! Consensus constants and per-network chain parameters.

pub mod constants;
pub mod params;

pub use params::{
    bytes_to_hex, chain_params, hash256_from_hex, hash256_to_hex, Base58Type, ChainParams,
    DnsSeed, GenesisParams, HexError, Network, SeedSpec6, MAX_BASE58_TYPES,
};

/// 256-bit hash in internal (little-endian) byte order.
pub type Hash256 = [u8; 32];
