use alloy::{
    primitives::{Address, B256, b256},
    signers::local::PrivateKeySigner,
};

/// The first accounts of the default hardhat and anvil mnemonic.
const HARDHAT_KEYS: [B256; 3] = [
    b256!("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
    b256!("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"),
    b256!("5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a"),
];

#[derive(Clone, Debug)]
pub struct TestAccount {
    signer: PrivateKeySigner,
}

impl TestAccount {
    pub fn from_private_key(key: &B256) -> Self {
        Self {
            signer: PrivateKeySigner::from_bytes(key).expect("valid private key"),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// The raw key, for handing to binaries under test.
    pub fn private_key(&self) -> B256 {
        self.signer.to_bytes()
    }
}

/// Returns one of the well known development accounts.
///
/// # Panics
///
/// If `index` is not one of the accounts listed in `HARDHAT_KEYS`.
pub fn hardhat(index: usize) -> TestAccount {
    TestAccount::from_private_key(&HARDHAT_KEYS[index])
}
