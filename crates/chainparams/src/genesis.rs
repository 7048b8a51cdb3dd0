//! Deterministic genesis assembly and its self-check.

use pagarex_consensus::{hash256_from_hex, hash256_to_hex, ChainParams, GenesisParams, Hash256};
use pagarex_pow::difficulty::{check_bits_within_limit, hash_meets_target, pow_limit};
use pagarex_primitives::script::{push_data, push_num, OP_0};
use pagarex_primitives::{Block, BlockHeader, Transaction, TxIn, TxOut};

use crate::error::ParamsError;

/// A genesis block that matched its profile's literals.
#[derive(Clone, Debug, PartialEq)]
pub struct Genesis {
    pub block: Block,
    /// Proof-of-work identity of the block on its network.
    pub hash: Hash256,
    /// Double SHA-256 of the serialized header.
    pub header_digest: Hash256,
}

/// The network's block hash function, supplied by the caller.
pub trait BlockHasher {
    fn block_hash(&self, header: &BlockHeader) -> Hash256;
}

impl<F> BlockHasher for F
where
    F: Fn(&BlockHeader) -> Hash256,
{
    fn block_hash(&self, header: &BlockHeader) -> Hash256 {
        self(header)
    }
}

/// `OP_0`, the script-number tag, then the raw launch message.
pub fn genesis_script_sig(script_tag: i64, message: &str) -> Vec<u8> {
    let mut script = Vec::with_capacity(message.len() + 4);
    script.push(OP_0);
    push_num(&mut script, script_tag);
    push_data(&mut script, message.as_bytes());
    script
}

pub fn genesis_coinbase(genesis: &GenesisParams) -> Transaction {
    Transaction {
        version: genesis.tx_version,
        time: genesis.tx_time,
        vin: vec![TxIn::coinbase(genesis_script_sig(
            genesis.script_tag,
            genesis.message,
        ))],
        vout: vec![TxOut::empty()],
        lock_time: 0,
    }
}

/// Assembles the genesis block from its literals. No checks are made.
pub fn build_genesis_block(genesis: &GenesisParams) -> Block {
    let coinbase = genesis_coinbase(genesis);
    let mut block = Block {
        header: BlockHeader {
            version: genesis.version,
            prev_block: [0u8; 32],
            merkle_root: [0u8; 32],
            time: genesis.time,
            bits: genesis.bits,
            nonce: genesis.nonce,
        },
        transactions: vec![coinbase],
        block_sig: Vec::new(),
    };
    block.header.merkle_root = block.compute_merkle_root();
    block
}

/// Builds the genesis block for `params` and verifies it against the literals.
///
/// The header bytes are pinned by their double SHA-256 digest and the
/// literal identity hash must meet the target its bits encode. Use
/// [`checked_genesis_with`] to also recompute the identity hash.
pub fn checked_genesis(params: &ChainParams) -> Result<Genesis, ParamsError> {
    verify_genesis(params, None)
}

/// Like [`checked_genesis`], and `hasher` must reproduce the identity hash.
pub fn checked_genesis_with(
    params: &ChainParams,
    hasher: &dyn BlockHasher,
) -> Result<Genesis, ParamsError> {
    verify_genesis(params, Some(hasher))
}

fn verify_genesis(
    params: &ChainParams,
    hasher: Option<&dyn BlockHasher>,
) -> Result<Genesis, ParamsError> {
    let network = params.network;
    let literals = &params.genesis;
    let parse = |field: &'static str, value: &str| {
        hash256_from_hex(value).map_err(|_| ParamsError::InvalidHex { network, field })
    };
    let expected_root = parse("genesis.merkle_root", literals.merkle_root)?;
    let expected_digest = parse("genesis.header_digest", literals.header_digest)?;
    let expected_hash = parse("genesis.hash", literals.hash)?;

    let block = build_genesis_block(literals);
    if block.header.merkle_root != expected_root {
        return Err(ParamsError::MerkleRootMismatch {
            network,
            expected: hash256_to_hex(&expected_root),
            actual: hash256_to_hex(&block.header.merkle_root),
        });
    }

    let header_digest = block.header.hash();
    if header_digest != expected_digest {
        return Err(ParamsError::HeaderDigestMismatch {
            network,
            expected: hash256_to_hex(&expected_digest),
            actual: hash256_to_hex(&header_digest),
        });
    }

    if let Some(hasher) = hasher {
        let hash = hasher.block_hash(&block.header);
        if hash != expected_hash {
            return Err(ParamsError::GenesisHashMismatch {
                network,
                expected: hash256_to_hex(&expected_hash),
                actual: hash256_to_hex(&hash),
            });
        }
    }

    let bits = block.header.bits;
    let target = check_bits_within_limit(bits, pow_limit(params.pow_limit_shift))
        .map_err(|reason| ParamsError::GenesisBitsInvalid {
            network,
            bits,
            reason,
        })?;
    if !hash_meets_target(&expected_hash, &target.to_little_endian()) {
        return Err(ParamsError::GenesisHashAboveTarget {
            network,
            hash: hash256_to_hex(&expected_hash),
            bits,
        });
    }

    Ok(Genesis {
        block,
        hash: expected_hash,
        header_digest,
    })
}
