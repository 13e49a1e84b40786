//! Lossless handling of 256-bit unsigned integers at text boundaries.
//!
//! JSON numbers lose precision above 2^53, so every `uint256` that leaves
//! the process is written as a decimal string.

pub mod conversions;
pub mod serialization;
