//! Addresses of the market contracts on a fresh local development node.

use alloy::primitives::{Address, address};

/// Address for the exchange contract, also used as the rent contract in
/// tests that only need some verifying contract.
pub const EXCHANGE: Address = address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0");

/// Chain id of a local hardhat node.
pub const CHAIN_ID: u64 = 31337;
