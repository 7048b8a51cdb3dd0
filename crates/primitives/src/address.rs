//! Base58Check encoding keyed off a network's version prefixes.
//!
//! Decoding always checks the prefix for the requested kind, so a payload
//! encoded for one network is rejected by the other.

use pagarex_consensus::{Base58Type, ChainParams};

use crate::hash::{hash160, sha256d};
use crate::script::{OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160};

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Serialized BIP32 key length without its 4-byte version.
const EXT_KEY_PAYLOAD_LEN: usize = 74;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    InvalidLength,
    InvalidCharacter,
    InvalidChecksum,
    UnknownPrefix,
}

impl std::fmt::Display for AddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressError::InvalidLength => write!(f, "invalid payload length"),
            AddressError::InvalidCharacter => write!(f, "invalid base58 character"),
            AddressError::InvalidChecksum => write!(f, "invalid base58 checksum"),
            AddressError::UnknownPrefix => write!(f, "version prefix does not match network"),
        }
    }
}

impl std::error::Error for AddressError {}

/// Encodes `payload` behind the network's prefix for `kind`.
pub fn encode_base58(kind: Base58Type, payload: &[u8], params: &ChainParams) -> String {
    let prefix = params.base58_prefix(kind);
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    base58check_encode(&data)
}

/// Decodes a string produced by [`encode_base58`] and returns the payload.
pub fn decode_base58(
    input: &str,
    kind: Base58Type,
    params: &ChainParams,
) -> Result<Vec<u8>, AddressError> {
    let data = base58check_decode(input)?;
    let prefix = params.base58_prefix(kind);
    let payload = data
        .strip_prefix(prefix)
        .ok_or(AddressError::UnknownPrefix)?;
    if !payload_len_valid(kind, payload) {
        return Err(AddressError::InvalidLength);
    }
    Ok(payload.to_vec())
}

fn payload_len_valid(kind: Base58Type, payload: &[u8]) -> bool {
    match kind {
        Base58Type::PubkeyAddress | Base58Type::ScriptAddress => payload.len() == 20,
        Base58Type::SecretKey => {
            payload.len() == 32 || (payload.len() == 33 && payload[32] == 0x01)
        }
        Base58Type::ExtPublicKey | Base58Type::ExtSecretKey => {
            payload.len() == EXT_KEY_PAYLOAD_LEN
        }
    }
}

pub fn pubkey_to_address(pubkey: &[u8], params: &ChainParams) -> String {
    encode_base58(Base58Type::PubkeyAddress, &hash160(pubkey), params)
}

pub fn address_to_script_pubkey(address: &str, params: &ChainParams) -> Result<Vec<u8>, AddressError> {
    match decode_base58(address, Base58Type::PubkeyAddress, params) {
        Ok(hash) => return Ok(p2pkh_script(&hash)),
        Err(AddressError::UnknownPrefix) => {}
        Err(err) => return Err(err),
    }
    let hash = decode_base58(address, Base58Type::ScriptAddress, params)?;
    Ok(p2sh_script(&hash))
}

pub fn script_pubkey_to_address(script: &[u8], params: &ChainParams) -> Option<String> {
    if is_p2pkh(script) {
        return Some(encode_base58(Base58Type::PubkeyAddress, &script[3..23], params));
    }
    if is_p2sh(script) {
        return Some(encode_base58(Base58Type::ScriptAddress, &script[2..22], params));
    }
    None
}

pub fn secret_key_to_wif(secret: &[u8; 32], params: &ChainParams, compressed: bool) -> String {
    let mut payload = Vec::with_capacity(33);
    payload.extend_from_slice(secret);
    if compressed {
        payload.push(0x01);
    }
    encode_base58(Base58Type::SecretKey, &payload, params)
}

pub fn wif_to_secret_key(wif: &str, params: &ChainParams) -> Result<([u8; 32], bool), AddressError> {
    let payload = decode_base58(wif, Base58Type::SecretKey, params)?;
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&payload[..32]);
    Ok((secret, payload.len() == 33))
}

fn p2pkh_script(hash: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.push(OP_DUP);
    script.push(OP_HASH160);
    script.push(0x14);
    script.extend_from_slice(hash);
    script.push(OP_EQUALVERIFY);
    script.push(OP_CHECKSIG);
    script
}

fn p2sh_script(hash: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(23);
    script.push(OP_HASH160);
    script.push(0x14);
    script.extend_from_slice(hash);
    script.push(OP_EQUAL);
    script
}

fn is_p2pkh(script: &[u8]) -> bool {
    script.len() == 25
        && script[0] == OP_DUP
        && script[1] == OP_HASH160
        && script[2] == 0x14
        && script[23] == OP_EQUALVERIFY
        && script[24] == OP_CHECKSIG
}

fn is_p2sh(script: &[u8]) -> bool {
    script.len() == 23 && script[0] == OP_HASH160 && script[1] == 0x14 && script[22] == OP_EQUAL
}

pub fn base58check_encode(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    let checksum = sha256d(payload);
    data.extend_from_slice(&checksum[..4]);
    base58_encode(&data)
}

pub fn base58check_decode(input: &str) -> Result<Vec<u8>, AddressError> {
    let bytes = base58_decode(input)?;
    if bytes.len() < 4 {
        return Err(AddressError::InvalidLength);
    }
    let (payload, checksum) = bytes.split_at(bytes.len() - 4);
    if checksum != &sha256d(payload)[..4] {
        return Err(AddressError::InvalidChecksum);
    }
    Ok(payload.to_vec())
}

fn base58_encode(data: &[u8]) -> String {
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for byte in data {
        let mut carry = u32::from(*byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    let leading_zeros = data.iter().take_while(|b| **b == 0).count();
    let mut out = String::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat('1').take(leading_zeros));
    out.extend(digits.iter().rev().map(|digit| ALPHABET[*digit as usize] as char));
    out
}

fn base58_decode(input: &str) -> Result<Vec<u8>, AddressError> {
    if input.is_empty() {
        return Err(AddressError::InvalidLength);
    }
    // Little-endian base-256 accumulator.
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len());
    for ch in input.bytes() {
        let mut carry = u32::from(base58_value(ch).ok_or(AddressError::InvalidCharacter)?);
        for byte in bytes.iter_mut() {
            carry += u32::from(*byte) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let leading_zeros = input.bytes().take_while(|b| *b == b'1').count();
    let mut out = vec![0u8; leading_zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

fn base58_value(byte: u8) -> Option<u8> {
    ALPHABET
        .iter()
        .position(|value| *value == byte)
        .map(|pos| pos as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagarex_consensus::{chain_params, Network};

    #[test]
    fn known_mainnet_vectors() {
        let main = chain_params(Network::Mainnet);
        assert_eq!(
            encode_base58(Base58Type::PubkeyAddress, &[0u8; 20], &main),
            "P8bB9yPr3vVByqfmM5KXftyGckAtAdu6f8"
        );
        let script_hash: Vec<u8> = (0u8..20).collect();
        assert_eq!(
            encode_base58(Base58Type::ScriptAddress, &script_hash, &main),
            "31h38a54tFMrR8kzBnP2241MFD2EUHtGha"
        );
        assert_eq!(
            secret_key_to_wif(&[0x11; 32], &main, true),
            "PwSunxcMt3Cb37KaktCwv854Pi9tT6FKquTsuJj1ojbmbVzzrdcG"
        );
    }

    #[test]
    fn known_testnet_vector() {
        let test = chain_params(Network::Testnet);
        let address = encode_base58(Base58Type::PubkeyAddress, &[0u8; 20], &test);
        assert_eq!(address, "p5YaChsi57DWgiK8s5yHjfr3e29NBSr2Lr");
        assert_eq!(
            decode_base58(&address, Base58Type::PubkeyAddress, &test),
            Ok(vec![0u8; 20])
        );
    }

    #[test]
    fn base58_keeps_leading_zero_bytes() {
        let data = [0u8, 0, 1, 2, 3];
        let encoded = base58_encode(&data);
        assert!(encoded.starts_with("11"));
        assert_eq!(base58_decode(&encoded), Ok(data.to_vec()));
    }

    #[test]
    fn rejects_bad_characters_and_checksums() {
        assert_eq!(base58check_decode("0OIl"), Err(AddressError::InvalidCharacter));
        assert_eq!(base58check_decode(""), Err(AddressError::InvalidLength));

        let main = chain_params(Network::Mainnet);
        let mut address = encode_base58(Base58Type::PubkeyAddress, &[7u8; 20], &main);
        let last = address.pop().expect("non-empty address");
        address.push(if last == '2' { '3' } else { '2' });
        assert_eq!(
            decode_base58(&address, Base58Type::PubkeyAddress, &main),
            Err(AddressError::InvalidChecksum)
        );
    }

    #[test]
    fn script_pubkey_roundtrip() {
        let main = chain_params(Network::Mainnet);
        let p2pkh = p2pkh_script(&[0x42; 20]);
        let address = script_pubkey_to_address(&p2pkh, &main).expect("p2pkh address");
        assert_eq!(address_to_script_pubkey(&address, &main), Ok(p2pkh));

        let p2sh = p2sh_script(&[0x24; 20]);
        let address = script_pubkey_to_address(&p2sh, &main).expect("p2sh address");
        assert_eq!(address_to_script_pubkey(&address, &main), Ok(p2sh));

        assert_eq!(script_pubkey_to_address(&[0x51], &main), None);
    }

    #[test]
    fn wrong_payload_length_is_rejected() {
        let main = chain_params(Network::Mainnet);
        let short = encode_base58(Base58Type::PubkeyAddress, &[1u8; 19], &main);
        assert_eq!(
            decode_base58(&short, Base58Type::PubkeyAddress, &main),
            Err(AddressError::InvalidLength)
        );
        let bad_flag = encode_base58(Base58Type::SecretKey, &[2u8; 33], &main);
        assert_eq!(
            wif_to_secret_key(&bad_flag, &main),
            Err(AddressError::InvalidLength)
        );
    }
}
