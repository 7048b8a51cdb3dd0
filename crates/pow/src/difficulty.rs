//! Difficulty and compact target utilities.

use std::cmp::Ordering;

use pagarex_consensus::{ChainParams, Hash256};
use primitive_types::U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactError {
    Negative,
    Overflow,
    Zero,
    AboveLimit,
}

impl std::fmt::Display for CompactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompactError::Negative => write!(f, "compact target has negative sign bit"),
            CompactError::Overflow => write!(f, "compact target overflows 256-bit range"),
            CompactError::Zero => write!(f, "compact target is zero"),
            CompactError::AboveLimit => write!(f, "compact target is easier than the pow limit"),
        }
    }
}

impl std::error::Error for CompactError {}

pub fn compact_to_u256(bits: u32) -> Result<U256, CompactError> {
    let size = bits >> 24;
    let mut word = bits & 0x007f_ffff;
    let negative = (bits & 0x0080_0000) != 0;

    if negative {
        return Err(CompactError::Negative);
    }

    let value = if size <= 3 {
        let shift = 8 * (3 - size);
        word >>= shift;
        U256::from(word)
    } else {
        let shift = 8 * (size - 3);
        U256::from(word) << shift
    };

    if word != 0 {
        let overflow = size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32);
        if overflow {
            return Err(CompactError::Overflow);
        }
    }

    Ok(value)
}

pub fn u256_to_compact(value: U256) -> u32 {
    if value.is_zero() {
        return 0;
    }

    let mut size = value.bits().div_ceil(8) as u32;
    let mut compact: u32;

    if size <= 3 {
        compact = value.low_u32() << (8 * (3 - size));
    } else {
        let shift = 8 * (size - 3);
        compact = (value >> shift).low_u32();
    }

    // Keep the mantissa positive.
    if (compact & 0x0080_0000) != 0 {
        compact >>= 8;
        size += 1;
    }

    (size << 24) | (compact & 0x007f_ffff)
}

pub fn compact_to_target(bits: u32) -> Result<Hash256, CompactError> {
    let value = compact_to_u256(bits)?;
    Ok(u256_to_hash(value))
}

pub fn target_to_compact(target: &Hash256) -> u32 {
    let value = U256::from_little_endian(target);
    u256_to_compact(value)
}

pub fn hash_meets_target(hash: &Hash256, target: &Hash256) -> bool {
    cmp_be(hash, target) != Ordering::Greater
}

/// Compares two little-endian hashes as 256-bit numbers.
pub fn cmp_be(a: &Hash256, b: &Hash256) -> Ordering {
    let left = U256::from_little_endian(a);
    let right = U256::from_little_endian(b);
    left.cmp(&right)
}

/// Easiest allowed target: all 256 bits set, shifted right by `shift`.
pub fn pow_limit(shift: u32) -> U256 {
    if shift >= 256 {
        return U256::zero();
    }
    U256::MAX >> shift
}

pub fn pow_limit_target(params: &ChainParams) -> Hash256 {
    u256_to_hash(pow_limit(params.pow_limit_shift))
}

/// Decodes `bits` and checks the target is no easier than `limit`.
pub fn check_bits_within_limit(bits: u32, limit: U256) -> Result<U256, CompactError> {
    let target = compact_to_u256(bits)?;
    if target.is_zero() {
        return Err(CompactError::Zero);
    }
    if target > limit {
        return Err(CompactError::AboveLimit);
    }
    Ok(target)
}

fn u256_to_hash(value: U256) -> Hash256 {
    value.to_little_endian()
}
