//! Fixtures shared by the tests of the workspace: well known development
//! accounts and the addresses a fresh local hardhat node deploys the market
//! contracts to.
pub mod accounts;
pub mod contracts;
pub mod tokens;
