//! Data models used throughout the crate
//!
//! This module contains the receipt returned by the Ethereum node, hex helpers
//! and the compiled-contract artifact format read from disk.

// Hex quantity helpers
pub mod hex;

pub mod receipt;

pub mod artifact;
