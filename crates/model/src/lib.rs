//! Order types of the NFT market together with their canonical encoding,
//! hashing and signing as expected by the exchange and rent contracts.

pub mod asset;
pub mod order;
pub mod rent;
pub mod signature;

use {
    alloy::{
        primitives::{Address, B256, U256, keccak256},
        sol,
        sol_types::SolType,
    },
    std::{fmt, str::FromStr, sync::LazyLock},
};

type DomainSeparatorSol = sol! {
    tuple(
        bytes32, // EIP712_DOMAIN_TYPEHASH
        bytes32, // keccak(domain.name)
        bytes32, // keccak(domain.version)
        uint256, // block.chainid
        address, // verifyingContract
    )
};

/// EIP-712 domain separator binding typed data signatures to one contract
/// deployment.
#[derive(Copy, Clone, Default, Eq, PartialEq)]
pub struct DomainSeparator(pub B256);

impl DomainSeparator {
    /// EIP-712 domain name of the sale exchange contract.
    pub const SALE_NAME: &'static str = "NFT-LOAN-MARKET";
    /// EIP-712 domain name of the rent contract.
    pub const RENT_NAME: &'static str = "NFT-MARKET";
    /// EIP-712 domain version shared by both contracts.
    pub const VERSION: &'static str = "1";

    pub fn new(name: &str, version: &str, chain_id: u64, verifying_contract: Address) -> Self {
        static DOMAIN_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
            keccak256(
                b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
            )
        });

        Self(keccak256(DomainSeparatorSol::abi_encode_sequence(&(
            *DOMAIN_TYPE_HASH,
            keccak256(name.as_bytes()),
            keccak256(version.as_bytes()),
            U256::from(chain_id),
            verifying_contract,
        ))))
    }

    /// Domain of the exchange contract that settles sale orders.
    pub fn sale(chain_id: u64, exchange: Address) -> Self {
        Self::new(Self::SALE_NAME, Self::VERSION, chain_id, exchange)
    }

    /// Domain of the rent contract.
    pub fn rent(chain_id: u64, rent_contract: Address) -> Self {
        Self::new(Self::RENT_NAME, Self::VERSION, chain_id, rent_contract)
    }
}

impl FromStr for DomainSeparator {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(B256::from(const_hex::decode_to_array::<_, 32>(s)?)))
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode(self.0))
    }
}

/// Message that gets signed for typed data:
/// `keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))`.
///
/// https://eips.ethereum.org/EIPS/eip-712#specification
pub fn hashed_eip712_message(domain_separator: &DomainSeparator, struct_hash: &B256) -> B256 {
    let mut message = [0u8; 66];
    message[0..2].copy_from_slice(&[0x19, 0x01]);
    message[2..34].copy_from_slice(domain_separator.0.as_slice());
    message[34..66].copy_from_slice(struct_hash.as_slice());
    keccak256(message)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::{address, b256},
    };

    const CONTRACT: Address = address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0");

    #[test]
    fn domain_separator_from_str() {
        assert!(
            DomainSeparator::from_str(
                "7dc70652c2452820b20439a6ccd8b6d799abfdf9645ed191683617b6aedd86ab"
            )
            .is_ok()
        );
        assert!(DomainSeparator::from_str("7dc7").is_err());
    }

    #[test]
    fn sale_domain_separator() {
        assert_eq!(
            DomainSeparator::sale(31337, CONTRACT),
            DomainSeparator(b256!(
                "7dc70652c2452820b20439a6ccd8b6d799abfdf9645ed191683617b6aedd86ab"
            ))
        );
    }

    #[test]
    fn rent_domain_separator() {
        assert_eq!(
            DomainSeparator::rent(31337, CONTRACT),
            DomainSeparator(b256!(
                "06119383fe4594620460e4036f9b73da69f73308a546a852b470dbcb1183c403"
            ))
        );
    }

    #[test]
    fn domain_separator_depends_on_chain() {
        assert_ne!(
            DomainSeparator::sale(1, CONTRACT),
            DomainSeparator::sale(31337, CONTRACT)
        );
    }
}
