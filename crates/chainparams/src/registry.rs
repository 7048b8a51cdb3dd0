//! Selection of the one active parameter bundle.
//!
//! Both bundles are built up front. The active network may change only until
//! the first reader asks for it; after that the choice is sealed so no two
//! subsystems can observe different networks.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use pagarex_consensus::Network;
use pagarex_log::{log_debug, log_warn};

use crate::bundle::NetworkParams;
use crate::error::ParamsError;

// Low bit holds the network, this bit marks the selection as sealed.
const SEALED: u8 = 0b10;
const NETWORK_MASK: u8 = 0b01;

pub struct ParamsRegistry {
    main: Arc<NetworkParams>,
    test: Arc<NetworkParams>,
    state: AtomicU8,
}

impl ParamsRegistry {
    /// Builds and verifies both bundles. Mainnet starts out active.
    pub fn new() -> Result<Self, ParamsError> {
        let main = NetworkParams::build(Network::Mainnet)?;
        let test = NetworkParams::build(Network::Testnet)?;
        Self::from_bundles(main, test)
    }

    /// Wraps prebuilt bundles, which must belong to the slot they fill.
    pub fn from_bundles(main: NetworkParams, test: NetworkParams) -> Result<Self, ParamsError> {
        for (expected, bundle) in [(Network::Mainnet, &main), (Network::Testnet, &test)] {
            if bundle.network() != expected {
                return Err(ParamsError::BundleNetworkMismatch {
                    expected,
                    actual: bundle.network(),
                });
            }
        }
        Ok(Self {
            main: Arc::new(main),
            test: Arc::new(test),
            state: AtomicU8::new(Network::Mainnet.as_u8()),
        })
    }

    pub fn get(&self, network: Network) -> Arc<NetworkParams> {
        match network {
            Network::Mainnet => Arc::clone(&self.main),
            Network::Testnet => Arc::clone(&self.test),
        }
    }

    /// Makes `network` active. Fails once the selection has been read,
    /// unless `network` is already the active one.
    pub fn select(&self, network: Network) -> Result<(), ParamsError> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let active = network_of(current);
            if current & SEALED != 0 {
                if active == network {
                    return Ok(());
                }
                log_warn!("rejected switch to {network} params: {active} already in use");
                return Err(ParamsError::SelectionSealed {
                    active,
                    requested: network,
                });
            }
            match self.state.compare_exchange_weak(
                current,
                network.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    log_debug!("selected {network} params");
                    return Ok(());
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// The active bundle. Seals the selection.
    pub fn active(&self) -> Arc<NetworkParams> {
        let previous = self.state.fetch_or(SEALED, Ordering::AcqRel);
        self.get(network_of(previous))
    }

    /// The active network, without sealing.
    pub fn active_network(&self) -> Network {
        network_of(self.state.load(Ordering::Acquire))
    }

    pub fn is_sealed(&self) -> bool {
        self.state.load(Ordering::Acquire) & SEALED != 0
    }
}

fn network_of(state: u8) -> Network {
    Network::from_u8(state & NETWORK_MASK).unwrap_or(Network::Mainnet)
}

static REGISTRY: OnceLock<ParamsRegistry> = OnceLock::new();

/// Builds the process-wide registry on first call; later calls return it.
pub fn init_params() -> Result<&'static ParamsRegistry, ParamsError> {
    if let Some(registry) = REGISTRY.get() {
        return Ok(registry);
    }
    let built = ParamsRegistry::new()?;
    Ok(REGISTRY.get_or_init(|| built))
}

pub fn registry() -> Result<&'static ParamsRegistry, ParamsError> {
    REGISTRY.get().ok_or(ParamsError::NotInitialized)
}

pub fn select_params(network: Network) -> Result<(), ParamsError> {
    registry()?.select(network)
}

/// Maps the startup `testnet` flag onto a selection.
pub fn select_params_from_flag(testnet: bool) -> Result<Network, ParamsError> {
    let network = if testnet {
        Network::Testnet
    } else {
        Network::Mainnet
    };
    select_params(network)?;
    Ok(network)
}

pub fn params() -> Result<Arc<NetworkParams>, ParamsError> {
    Ok(registry()?.active())
}
