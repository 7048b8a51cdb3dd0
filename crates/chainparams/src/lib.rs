//! Checked per-network parameter bundles and the process-wide selector.
//!
//! Both bundles are assembled and verified before any consumer sees them; a
//! genesis literal that does not match the assembled block is an error, not
//! a silently wrong network.

pub mod bundle;
pub mod error;
pub mod genesis;
pub mod registry;
pub mod seeds;

pub use bundle::NetworkParams;
pub use error::ParamsError;
pub use genesis::{
    build_genesis_block, checked_genesis, checked_genesis_with, genesis_coinbase,
    genesis_script_sig, BlockHasher, Genesis,
};
pub use registry::{
    init_params, params, registry, select_params, select_params_from_flag, ParamsRegistry,
};
pub use seeds::{convert_seed6, fixed_seed_addresses, seed_socket_addr, SeedAddress};
