//! Addresses of the test tokens on a fresh local development node.

use alloy::primitives::{Address, address};

/// Address for the test `ERC20` payment token.
pub const ERC20: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// Address for the test `ERC721` collection.
pub const ERC721: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");

/// Address for the test `ERC1155` collection.
pub const ERC1155: Address = address!("Cf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9");
