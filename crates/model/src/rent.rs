//! Orders for renting an NFT in or out over a time window. These are only
//! ever signed as EIP-712 typed data against the rent contract's domain.

use {
    crate::{
        DomainSeparator,
        asset::AssetType,
        order::{MalformedNumericField, parse_field, random_salt},
        signature::{self, EcdsaSignature, RecoveryError},
    },
    alloy::{
        primitives::{Address, B256, U256},
        signers::Signer,
        sol_types::SolStruct,
    },
    anyhow::Result,
    number::{conversions::u256_to_decimal_string, serialization::DecimalU256},
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    serde_with::serde_as,
};

/// Direction of a rent order as seen from its owner.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum RentOrderType {
    /// The owner wants to rent an NFT and pays for it.
    #[default]
    RentIn = 0,
    /// The owner lends out an NFT and gets paid for it.
    RentOut = 1,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("unknown rent order type {0}")]
pub struct UnknownRentOrderType(pub u8);

impl TryFrom<u8> for RentOrderType {
    type Error = UnknownRentOrderType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::RentIn),
            1 => Ok(Self::RentOut),
            other => Err(UnknownRentOrderType(other)),
        }
    }
}

impl From<RentOrderType> for u8 {
    fn from(value: RentOrderType) -> Self {
        value as u8
    }
}

impl Serialize for RentOrderType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl<'de> Deserialize<'de> for RentOrderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = u8::deserialize(deserializer)?;
        RentOrderType::try_from(tag).map_err(de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(into = "SequenceRentOrder", try_from = "SequenceRentOrder")]
pub struct RentOrder {
    pub owner: Address,
    pub salt: U256,
    pub nft: Address,
    pub nft_id: U256,
    /// Token the rent is paid in.
    pub token: Address,
    pub token_amount: U256,
    pub token_type: AssetType,
    pub order_type: RentOrderType,
    /// Unix timestamps in seconds bounding the rental.
    pub start_time: U256,
    pub end_time: U256,
}

/// Fees the marketplace charges on both sides of a rental. Signed by the
/// fee setter on top of the owner's order signature.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentFee {
    #[serde_as(as = "DecimalU256")]
    pub rent_in_fee: U256,
    #[serde_as(as = "DecimalU256")]
    pub rent_out_fee: U256,
}

impl RentOrder {
    /// Creates a new rent order. A random salt is generated if none is given.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        owner: Address,
        order_type: RentOrderType,
        nft: Address,
        nft_id: U256,
        payment: (Address, AssetType),
        token_amount: U256,
        (start_time, end_time): (U256, U256),
        salt: Option<U256>,
    ) -> Result<Self, rand::Error> {
        let salt = match salt {
            Some(salt) => salt,
            None => random_salt()?,
        };
        let (token, token_type) = payment;
        Ok(Self {
            owner,
            salt,
            nft,
            nft_id,
            token,
            token_amount,
            token_type,
            order_type,
            start_time,
            end_time,
        })
    }

    pub fn parse(wire: &SequenceRentOrder) -> Result<Self, MalformedNumericField> {
        Ok(Self {
            owner: wire.owner,
            salt: parse_field("salt", &wire.salt)?,
            nft: wire.nft,
            nft_id: parse_field("nftId", &wire.nft_id)?,
            token: wire.token,
            token_amount: parse_field("tokenAmount", &wire.token_amount)?,
            token_type: wire.token_type,
            order_type: wire.order_type,
            start_time: parse_field("startTime", &wire.start_time)?,
            end_time: parse_field("endTime", &wire.end_time)?,
        })
    }

    pub fn to_wire(&self) -> SequenceRentOrder {
        SequenceRentOrder {
            owner: self.owner,
            salt: u256_to_decimal_string(&self.salt),
            nft: self.nft,
            nft_id: u256_to_decimal_string(&self.nft_id),
            token: self.token,
            token_amount: u256_to_decimal_string(&self.token_amount),
            token_type: self.token_type,
            order_type: self.order_type,
            start_time: u256_to_decimal_string(&self.start_time),
            end_time: u256_to_decimal_string(&self.end_time),
        }
    }

    fn eip712_order(&self) -> eip712::Order {
        eip712::Order {
            owner: self.owner,
            salt: self.salt,
            nft: self.nft,
            nftId: self.nft_id,
            token: self.token,
            tokenAmount: self.token_amount,
            tokenType: self.token_type.into(),
            orderType: self.order_type.into(),
            startTime: self.start_time,
            endTime: self.end_time,
        }
    }

    pub fn eip712_struct_hash(&self) -> B256 {
        self.eip712_order().eip712_hash_struct()
    }

    pub fn eip712_fee_struct_hash(&self, fee: &RentFee) -> B256 {
        let order = self.eip712_order();
        eip712::Fee {
            owner: order.owner,
            salt: order.salt,
            nft: order.nft,
            nftId: order.nftId,
            token: order.token,
            tokenAmount: order.tokenAmount,
            tokenType: order.tokenType,
            orderType: order.orderType,
            startTime: order.startTime,
            endTime: order.endTime,
            rentInFee: fee.rent_in_fee,
            rentOutFee: fee.rent_out_fee,
        }
        .eip712_hash_struct()
    }

    pub async fn sign<S>(&self, domain: &DomainSeparator, signer: &S) -> Result<EcdsaSignature>
    where
        S: Signer + ?Sized + Sync,
    {
        let struct_hash = self.eip712_struct_hash();
        tracing::debug!(%struct_hash, signer = %signer.address(), "signing rent order");
        signature::sign_typed(domain, &struct_hash, signer).await
    }

    pub async fn sign_fee<S>(
        &self,
        domain: &DomainSeparator,
        fee: &RentFee,
        signer: &S,
    ) -> Result<EcdsaSignature>
    where
        S: Signer + ?Sized + Sync,
    {
        let struct_hash = self.eip712_fee_struct_hash(fee);
        tracing::debug!(%struct_hash, signer = %signer.address(), "signing rent fee");
        signature::sign_typed(domain, &struct_hash, signer).await
    }

    /// Returns whether `signature` was produced by the order owner.
    pub fn verify(
        &self,
        domain: &DomainSeparator,
        signature: &EcdsaSignature,
    ) -> Result<bool, RecoveryError> {
        let signer = signature::recover_typed(signature, domain, &self.eip712_struct_hash())?;
        Ok(signer == self.owner)
    }

    pub fn verify_fee(
        &self,
        domain: &DomainSeparator,
        fee: &RentFee,
        signature: &EcdsaSignature,
        fee_signer: Address,
    ) -> Result<bool, RecoveryError> {
        let signer =
            signature::recover_typed(signature, domain, &self.eip712_fee_struct_hash(fee))?;
        Ok(signer == fee_signer)
    }
}

impl From<RentOrder> for SequenceRentOrder {
    fn from(order: RentOrder) -> Self {
        order.to_wire()
    }
}

impl TryFrom<SequenceRentOrder> for RentOrder {
    type Error = MalformedNumericField;

    fn try_from(wire: SequenceRentOrder) -> Result<Self, Self::Error> {
        Self::parse(&wire)
    }
}

/// Wire representation of a [`RentOrder`] with integers as decimal strings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRentOrder {
    pub owner: Address,
    pub salt: String,
    pub nft: Address,
    pub nft_id: String,
    pub token: Address,
    pub token_amount: String,
    pub token_type: AssetType,
    pub order_type: RentOrderType,
    pub start_time: String,
    pub end_time: String,
}

mod eip712 {
    alloy::sol! {
        struct Order {
            address owner;
            uint256 salt;
            address nft;
            uint256 nftId;
            address token;
            uint256 tokenAmount;
            uint8 tokenType;
            uint8 orderType;
            uint256 startTime;
            uint256 endTime;
        }

        struct Fee {
            address owner;
            uint256 salt;
            address nft;
            uint256 nftId;
            address token;
            uint256 tokenAmount;
            uint8 tokenType;
            uint8 orderType;
            uint256 startTime;
            uint256 endTime;
            uint256 rentInFee;
            uint256 rentOutFee;
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::{b256, keccak256},
        serde_json::json,
        testlib::{accounts, contracts, tokens},
    };

    fn sample_order() -> RentOrder {
        RentOrder::new(
            accounts::hardhat(0).address(),
            RentOrderType::RentIn,
            tokens::ERC721,
            U256::from(2),
            (tokens::ERC20, AssetType::Erc20),
            U256::from(3_000_000_000_000_000_000_u64),
            (U256::from(100), U256::from(200)),
            Some(U256::from(12345)),
        )
        .unwrap()
    }

    fn sample_fee() -> RentFee {
        RentFee {
            rent_in_fee: U256::from(100),
            rent_out_fee: U256::from(150),
        }
    }

    #[test]
    fn type_hashes() {
        assert_eq!(
            keccak256(eip712::Order::eip712_encode_type().as_bytes()),
            b256!("c24223bac3d3c3c8413e8aa0dbbfed2e8e5d199d460fa9b1986fe96df98258c2")
        );
        assert_eq!(
            keccak256(eip712::Fee::eip712_encode_type().as_bytes()),
            b256!("2116f0ed349984c55e36b0137bd2ee9fb12745e14ca6b5c6028c04b236c78798")
        );
    }

    #[test]
    fn struct_hash_vectors() {
        let order = sample_order();
        assert_eq!(
            order.eip712_struct_hash(),
            b256!("124bf2b4c6d14cb77907dade8b0ee904da0bcff344f206074951e5deeb681eb3")
        );
        assert_eq!(
            order.eip712_fee_struct_hash(&sample_fee()),
            b256!("16901e195972377950a392da62855c920365d2d0d53450d46cb47274e3ed066c")
        );
        assert_eq!(
            crate::hashed_eip712_message(
                &DomainSeparator::rent(31337, contracts::EXCHANGE),
                &order.eip712_struct_hash()
            ),
            b256!("951d137dce9cbe07504f354bd2dbb89eb463291ca14068d3181f5c7cf50c8021")
        );
    }

    #[test]
    fn wire_format() {
        let order = sample_order();
        let json = json!({
            "owner": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "salt": "12345",
            "nft": "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512",
            "nftId": "2",
            "token": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "tokenAmount": "3000000000000000000",
            "tokenType": 1,
            "orderType": 0,
            "startTime": "100",
            "endTime": "200",
        });
        assert_eq!(json!(order), json);
        assert_eq!(serde_json::from_value::<RentOrder>(json).unwrap(), order);
        assert_eq!(
            json!(sample_fee()),
            json!({ "rentInFee": "100", "rentOutFee": "150" })
        );
    }

    #[test]
    fn order_type_tags() {
        for (order_type, tag) in [(RentOrderType::RentIn, 0), (RentOrderType::RentOut, 1)] {
            assert_eq!(u8::from(order_type), tag);
            assert_eq!(RentOrderType::try_from(tag).unwrap(), order_type);
            assert_eq!(json!(order_type), json!(tag));
        }
        assert!(matches!(
            RentOrderType::try_from(2),
            Err(UnknownRentOrderType(2))
        ));
    }

    #[test]
    fn parse_reports_field() {
        let mut wire = sample_order().to_wire();
        wire.end_time = "soon".to_string();
        assert_eq!(RentOrder::parse(&wire).unwrap_err().field, "endTime");

        let mut json = json!(sample_order());
        json["orderType"] = json!(2);
        assert!(serde_json::from_value::<RentOrder>(json).is_err());
    }

    #[test]
    fn random_salt_when_missing() {
        let order = RentOrder {
            salt: U256::ZERO,
            ..sample_order()
        };
        let a = RentOrder::new(
            order.owner,
            order.order_type,
            order.nft,
            order.nft_id,
            (order.token, order.token_type),
            order.token_amount,
            (order.start_time, order.end_time),
            None,
        )
        .unwrap();
        let b = RentOrder { salt: a.salt, ..order };
        assert_eq!(a, b);
        assert_ne!(a.salt, U256::ZERO);
    }

    #[tokio::test]
    async fn signatures() {
        let owner = accounts::hardhat(0);
        let fee_signer = accounts::hardhat(1);
        let domain = DomainSeparator::rent(31337, contracts::EXCHANGE);
        let order = sample_order();

        let signature = order.sign(&domain, owner.signer()).await.unwrap();
        assert!(order.verify(&domain, &signature).unwrap());
        let rent_out = RentOrder {
            order_type: RentOrderType::RentOut,
            ..order
        };
        assert!(!rent_out.verify(&domain, &signature).unwrap());
        // Sale and rent domains don't share signatures.
        assert!(
            !order
                .verify(&DomainSeparator::sale(31337, contracts::EXCHANGE), &signature)
                .unwrap()
        );

        let fee = sample_fee();
        let fee_signature = order
            .sign_fee(&domain, &fee, fee_signer.signer())
            .await
            .unwrap();
        assert!(
            order
                .verify_fee(&domain, &fee, &fee_signature, fee_signer.address())
                .unwrap()
        );
        let other_fee = RentFee {
            rent_out_fee: U256::from(151),
            ..fee
        };
        assert!(
            !order
                .verify_fee(&domain, &other_fee, &fee_signature, fee_signer.address())
                .unwrap()
        );
    }
}
