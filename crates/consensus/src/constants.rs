//! Network-wide constants shared by every profile.

/// Seconds in one week. Fixed seeds are aged between one and two weeks.
pub const ONE_WEEK: i64 = 7 * 24 * 60 * 60;

/// Highest representable block height.
///
/// A `last_pow_block` equal to this value means the profile never leaves
/// proof-of-work validation.
pub const MAX_BLOCK_HEIGHT: i32 = i32::MAX;

/// Size of a serialized block header, in bytes.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Header version of the genesis block.
pub const GENESIS_BLOCK_VERSION: i32 = 1;
/// Version of the genesis coinbase transaction.
pub const GENESIS_TX_VERSION: i32 = 1;
/// Script number pushed between `OP_0` and the launch message in the genesis coinbase.
pub const GENESIS_SCRIPT_TAG: i64 = 42;
/// Launch message embedded in the genesis coinbase input.
pub const GENESIS_MESSAGE: &str = "PagareX Blockchain - Genesis Launch 12/17";
