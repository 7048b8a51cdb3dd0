//! Compact difficulty encoding and proof-of-work limits.

pub mod difficulty;
