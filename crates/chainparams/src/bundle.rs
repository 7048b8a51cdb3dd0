//! The immutable per-network parameter bundle.

use pagarex_consensus::{
    bytes_to_hex, chain_params, hash256_to_hex, Base58Type, ChainParams, DnsSeed, Hash256,
    Network,
};
use pagarex_log::log_debug;
use pagarex_pow::difficulty::pow_limit;
use pagarex_primitives::Block;
use primitive_types::U256;
use rand::Rng;

use crate::error::ParamsError;
use crate::genesis::{checked_genesis, checked_genesis_with, BlockHasher, Genesis};
use crate::seeds::{convert_seed6, fixed_seed_addresses, SeedAddress};

/// Everything a node must agree on to join one network.
///
/// Only built through [`NetworkParams::build`] and friends, which verify the
/// genesis block first.
#[derive(Clone, Debug)]
pub struct NetworkParams {
    chain: ChainParams,
    pow_limit: U256,
    genesis: Genesis,
    fixed_seeds: Vec<SeedAddress>,
}

impl NetworkParams {
    pub fn build(network: Network) -> Result<Self, ParamsError> {
        Self::from_chain_params(chain_params(network))
    }

    pub fn from_chain_params(chain: ChainParams) -> Result<Self, ParamsError> {
        let genesis = checked_genesis(&chain)?;
        let fixed_seeds = fixed_seed_addresses(chain.fixed_seeds);
        Ok(Self::assemble(chain, genesis, fixed_seeds))
    }

    /// Like [`NetworkParams::from_chain_params`], and the genesis identity
    /// hash is recomputed with `hasher`.
    pub fn with_block_hasher(
        chain: ChainParams,
        hasher: &dyn BlockHasher,
    ) -> Result<Self, ParamsError> {
        let genesis = checked_genesis_with(&chain, hasher)?;
        let fixed_seeds = fixed_seed_addresses(chain.fixed_seeds);
        Ok(Self::assemble(chain, genesis, fixed_seeds))
    }

    /// Like [`NetworkParams::from_chain_params`] with a caller-supplied clock and RNG.
    pub fn with_seed_clock<R: Rng + ?Sized>(
        chain: ChainParams,
        now: i64,
        rng: &mut R,
    ) -> Result<Self, ParamsError> {
        let genesis = checked_genesis(&chain)?;
        let fixed_seeds = convert_seed6(chain.fixed_seeds, now, rng);
        Ok(Self::assemble(chain, genesis, fixed_seeds))
    }

    fn assemble(chain: ChainParams, genesis: Genesis, fixed_seeds: Vec<SeedAddress>) -> Self {
        log_debug!(
            "built {} params: genesis {}, magic {}, {} fixed seeds",
            chain.network,
            hash256_to_hex(&genesis.hash),
            bytes_to_hex(&chain.message_start),
            fixed_seeds.len()
        );
        Self {
            pow_limit: pow_limit(chain.pow_limit_shift),
            chain,
            genesis,
            fixed_seeds,
        }
    }

    pub fn network(&self) -> Network {
        self.chain.network
    }

    pub fn chain(&self) -> &ChainParams {
        &self.chain
    }

    pub fn network_magic(&self) -> [u8; 4] {
        self.chain.message_start
    }

    pub fn default_port(&self) -> u16 {
        self.chain.default_port
    }

    pub fn rpc_port(&self) -> u16 {
        self.chain.rpc_port
    }

    pub fn pow_limit(&self) -> U256 {
        self.pow_limit
    }

    pub fn base58_prefix(&self, kind: Base58Type) -> &'static [u8] {
        self.chain.base58_prefix(kind)
    }

    pub fn genesis_block(&self) -> &Block {
        &self.genesis.block
    }

    pub fn genesis_hash(&self) -> Hash256 {
        self.genesis.hash
    }

    pub fn genesis_header_digest(&self) -> Hash256 {
        self.genesis.header_digest
    }

    pub fn dns_seeds(&self) -> &'static [DnsSeed] {
        self.chain.dns_seeds
    }

    pub fn fixed_seeds(&self) -> &[SeedAddress] {
        &self.fixed_seeds
    }

    pub fn last_pow_block(&self) -> i32 {
        self.chain.last_pow_block
    }

    pub fn alert_public_key(&self) -> &'static [u8] {
        self.chain.alert_public_key
    }

    pub fn data_dir_suffix(&self) -> Option<&'static str> {
        self.chain.data_dir_suffix
    }
}
