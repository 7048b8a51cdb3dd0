use pagarex_consensus::Network;
use pagarex_pow::difficulty::CompactError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    GenesisHashMismatch {
        network: Network,
        expected: String,
        actual: String,
    },
    MerkleRootMismatch {
        network: Network,
        expected: String,
        actual: String,
    },
    HeaderDigestMismatch {
        network: Network,
        expected: String,
        actual: String,
    },
    GenesisHashAboveTarget {
        network: Network,
        hash: String,
        bits: u32,
    },
    GenesisBitsInvalid {
        network: Network,
        bits: u32,
        reason: CompactError,
    },
    SelectionSealed {
        active: Network,
        requested: Network,
    },
    BundleNetworkMismatch {
        expected: Network,
        actual: Network,
    },
    NotInitialized,
    InvalidHex {
        network: Network,
        field: &'static str,
    },
}

impl std::fmt::Display for ParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamsError::GenesisHashMismatch {
                network,
                expected,
                actual,
            } => write!(
                f,
                "{network} genesis hash mismatch: expected {expected}, assembled {actual}"
            ),
            ParamsError::MerkleRootMismatch {
                network,
                expected,
                actual,
            } => write!(
                f,
                "{network} genesis merkle root mismatch: expected {expected}, assembled {actual}"
            ),
            ParamsError::HeaderDigestMismatch {
                network,
                expected,
                actual,
            } => write!(
                f,
                "{network} genesis header digest mismatch: expected {expected}, assembled {actual}"
            ),
            ParamsError::GenesisHashAboveTarget {
                network,
                hash,
                bits,
            } => write!(
                f,
                "{network} genesis hash {hash} does not meet the target of bits {bits:#010x}"
            ),
            ParamsError::GenesisBitsInvalid {
                network,
                bits,
                reason,
            } => write!(f, "{network} genesis bits {bits:#010x} invalid: {reason}"),
            ParamsError::SelectionSealed { active, requested } => write!(
                f,
                "cannot select {requested} parameters: {active} parameters are already in use"
            ),
            ParamsError::BundleNetworkMismatch { expected, actual } => {
                write!(f, "{actual} parameters supplied where {expected} was expected")
            }
            ParamsError::NotInitialized => write!(f, "chain parameters not initialized"),
            ParamsError::InvalidHex { network, field } => {
                write!(f, "{network} parameter {field} is not a valid hash hex")
            }
        }
    }
}

impl std::error::Error for ParamsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_network_and_values() {
        let err = ParamsError::GenesisHashMismatch {
            network: Network::Testnet,
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "test genesis hash mismatch: expected aa, assembled bb"
        );

        let err = ParamsError::GenesisBitsInvalid {
            network: Network::Mainnet,
            bits: 0x1f00_ffff,
            reason: CompactError::AboveLimit,
        };
        assert!(err.to_string().starts_with("main genesis bits 0x1f00ffff invalid"));

        let err = ParamsError::GenesisHashAboveTarget {
            network: Network::Mainnet,
            hash: "e1cd".to_string(),
            bits: 0x1e0f_ffff,
        };
        assert_eq!(
            err.to_string(),
            "main genesis hash e1cd does not meet the target of bits 0x1e0fffff"
        );

        let err = ParamsError::BundleNetworkMismatch {
            expected: Network::Mainnet,
            actual: Network::Testnet,
        };
        assert_eq!(
            err.to_string(),
            "test parameters supplied where main was expected"
        );
    }
}
