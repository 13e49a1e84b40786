//! The sale order as it is signed off-chain and settled by the exchange
//! contract, together with its JSON wire representation.

use {
    crate::{
        DomainSeparator,
        asset::{Asset, SequenceAsset},
        signature::{self, EcdsaSignature, RecoveryError, SigningScheme},
    },
    alloy::{
        primitives::{Address, B256, U256, keccak256},
        signers::Signer,
        sol_types::SolStruct,
    },
    anyhow::Result,
    number::{
        conversions::{ParseDecimalError, u256_from_decimal_str, u256_to_decimal_string},
        serialization::DecimalU256,
    },
    rand::{RngCore, rngs::OsRng},
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
};

/// A wire order field that is not a non-negative base 10 integer.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("{field} is not a valid non-negative integer: {value:?}")]
pub struct MalformedNumericField {
    /// Path of the offending field in the wire format, e.g. `key.salt`.
    pub field: &'static str,
    pub value: String,
    #[source]
    pub source: ParseDecimalError,
}

impl MalformedNumericField {
    pub(crate) fn new(field: &'static str, value: &str, source: ParseDecimalError) -> Self {
        Self {
            field,
            value: value.to_owned(),
            source,
        }
    }
}

pub(crate) fn parse_field(
    field: &'static str,
    value: &str,
) -> Result<U256, MalformedNumericField> {
    u256_from_decimal_str(value).map_err(|err| MalformedNumericField::new(field, value, err))
}

/// Returns 32 bytes of operating system randomness as a salt.
///
/// A predictable salt lets third parties precompute order hashes, so this
/// never falls back to a weaker generator.
pub fn random_salt() -> Result<U256, rand::Error> {
    let mut bytes = [0u8; 32];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(U256::from_be_bytes(bytes))
}

/// Identifies an order. The exchange contract tracks fills and
/// cancellations per key.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct OrderKey {
    pub owner: Address,
    pub salt: U256,
    pub sell_asset: Asset,
    pub buy_asset: Asset,
}

/// A signed proposal to exchange `selling` units of the sell asset for
/// `buying` units of the buy asset.
///
/// Orders can't be modified after construction; a retry with different
/// terms or salt is a new order.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(into = "SequenceOrder", try_from = "SequenceOrder")]
pub struct Order {
    key: OrderKey,
    selling: U256,
    buying: U256,
    seller_fee: U256,
}

impl Order {
    /// Size of the ABI encoded `OrderTuple`: eleven static words.
    pub const ENCODED_LEN: usize = 352;
    /// Size of the ABI encoded `(OrderTuple, uint256 buyerFee)` parameters.
    pub const ENCODED_WITH_BUYER_FEE_LEN: usize = Self::ENCODED_LEN + 32;

    /// Creates a new order. A random salt is generated if none is given.
    pub fn new(
        owner: Address,
        sell_asset: Asset,
        buy_asset: Asset,
        selling: U256,
        buying: U256,
        seller_fee: U256,
        salt: Option<U256>,
    ) -> Result<Self, rand::Error> {
        let salt = match salt {
            Some(salt) => salt,
            None => random_salt()?,
        };
        Ok(Self::from_parts(
            OrderKey {
                owner,
                salt,
                sell_asset,
                buy_asset,
            },
            selling,
            buying,
            seller_fee,
        ))
    }

    pub fn from_parts(key: OrderKey, selling: U256, buying: U256, seller_fee: U256) -> Self {
        Self {
            key,
            selling,
            buying,
            seller_fee,
        }
    }

    /// Converts the wire representation into an order.
    pub fn parse(wire: &SequenceOrder) -> Result<Self, MalformedNumericField> {
        Ok(Self {
            key: OrderKey {
                owner: wire.key.owner,
                salt: parse_field("key.salt", &wire.key.salt)?,
                sell_asset: Asset::parse(&wire.key.sell_asset, "key.sellAsset.tokenId")?,
                buy_asset: Asset::parse(&wire.key.buy_asset, "key.buyAsset.tokenId")?,
            },
            selling: parse_field("selling", &wire.selling)?,
            buying: parse_field("buying", &wire.buying)?,
            seller_fee: parse_field("sellerFee", &wire.seller_fee)?,
        })
    }

    pub fn to_wire(&self) -> SequenceOrder {
        SequenceOrder {
            key: SequenceOrderKey {
                salt: u256_to_decimal_string(&self.key.salt),
                owner: self.key.owner,
                sell_asset: self.key.sell_asset.to_wire(),
                buy_asset: self.key.buy_asset.to_wire(),
            },
            selling: u256_to_decimal_string(&self.selling),
            buying: u256_to_decimal_string(&self.buying),
            seller_fee: u256_to_decimal_string(&self.seller_fee),
        }
    }

    pub fn with_buyer_fee(&self, buyer_fee: U256) -> OrderWithBuyerFee {
        OrderWithBuyerFee {
            order: *self,
            buyer_fee,
        }
    }

    pub fn key(&self) -> &OrderKey {
        &self.key
    }

    pub fn owner(&self) -> Address {
        self.key.owner
    }

    pub fn salt(&self) -> U256 {
        self.key.salt
    }

    pub fn selling(&self) -> U256 {
        self.selling
    }

    pub fn buying(&self) -> U256 {
        self.buying
    }

    pub fn seller_fee(&self) -> U256 {
        self.seller_fee
    }

    /// ABI encoding of the order as a single `OrderTuple` parameter:
    ///
    /// ```text
    /// AssetTuple    = (address token, uint256 tokenId, uint8 assetType)
    /// OrderKeyTuple = (address owner, uint256 salt, AssetTuple sellAsset, AssetTuple buyAsset)
    /// OrderTuple    = (OrderKeyTuple key, uint256 selling, uint256 buying, uint256 sellerFee)
    /// ```
    ///
    /// All members are static so the tuples are laid out inline without
    /// offsets.
    pub fn abi_encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut data = [0u8; Self::ENCODED_LEN];
        data[12..32].copy_from_slice(self.key.owner.as_slice());
        data[32..64].copy_from_slice(&self.key.salt.to_be_bytes::<32>());
        self.key.sell_asset.encode_into(&mut data[64..160]);
        self.key.buy_asset.encode_into(&mut data[160..256]);
        data[256..288].copy_from_slice(&self.selling.to_be_bytes::<32>());
        data[288..320].copy_from_slice(&self.buying.to_be_bytes::<32>());
        data[320..352].copy_from_slice(&self.seller_fee.to_be_bytes::<32>());
        data
    }

    /// ABI encoding of the `(OrderTuple, uint256 buyerFee)` parameters.
    pub fn abi_encode_with_buyer_fee(
        &self,
        buyer_fee: U256,
    ) -> [u8; Self::ENCODED_WITH_BUYER_FEE_LEN] {
        let mut data = [0u8; Self::ENCODED_WITH_BUYER_FEE_LEN];
        data[..Self::ENCODED_LEN].copy_from_slice(&self.abi_encode());
        data[Self::ENCODED_LEN..].copy_from_slice(&buyer_fee.to_be_bytes::<32>());
        data
    }

    /// The message digest the order owner signs.
    pub fn hash(&self) -> B256 {
        keccak256(self.abi_encode())
    }

    /// The message digest binding a buyer fee to this order. It is signed by
    /// the fee setter independently of the owner's order signature.
    pub fn buyer_fee_hash(&self, buyer_fee: U256) -> B256 {
        keccak256(self.abi_encode_with_buyer_fee(buyer_fee))
    }

    /// Signs [`Self::hash`] as a personal message.
    pub async fn sign<S>(&self, signer: &S) -> Result<EcdsaSignature>
    where
        S: Signer + ?Sized + Sync,
    {
        let hash = self.hash();
        tracing::debug!(%hash, signer = %signer.address(), "signing order");
        EcdsaSignature::sign(SigningScheme::EthSign, &hash, signer).await
    }

    /// Signs [`Self::buyer_fee_hash`] as a personal message.
    pub async fn sign_buyer_fee<S>(&self, buyer_fee: U256, signer: &S) -> Result<EcdsaSignature>
    where
        S: Signer + ?Sized + Sync,
    {
        let hash = self.buyer_fee_hash(buyer_fee);
        tracing::debug!(%hash, %buyer_fee, signer = %signer.address(), "signing buyer fee");
        EcdsaSignature::sign(SigningScheme::EthSign, &hash, signer).await
    }

    /// Returns whether `signature` was produced by the order owner.
    ///
    /// Signatures from other keys yield `Ok(false)`; an error means the
    /// signature is corrupt and no signer could be recovered.
    pub fn verify(&self, signature: &EcdsaSignature) -> Result<bool, RecoveryError> {
        let signer = signature.recover(SigningScheme::EthSign, &self.hash())?;
        Ok(signer == self.key.owner)
    }

    /// Returns whether `signature` over the buyer fee digest was produced by
    /// `fee_signer`.
    pub fn verify_buyer_fee(
        &self,
        buyer_fee: U256,
        signature: &EcdsaSignature,
        fee_signer: Address,
    ) -> Result<bool, RecoveryError> {
        let signer = signature.recover(SigningScheme::EthSign, &self.buyer_fee_hash(buyer_fee))?;
        Ok(signer == fee_signer)
    }

    fn eip712_order(&self) -> eip712::Order {
        eip712::Order {
            owner: self.key.owner,
            salt: self.key.salt,
            sellToken: self.key.sell_asset.token,
            sellTokenId: self.key.sell_asset.token_id,
            sellAssetType: self.key.sell_asset.asset_type.into(),
            buyToken: self.key.buy_asset.token,
            buyTokenId: self.key.buy_asset.token_id,
            buyAssetType: self.key.buy_asset.asset_type.into(),
            selling: self.selling,
            buying: self.buying,
            sellerFee: self.seller_fee,
        }
    }

    /// EIP-712 `hashStruct` of the flattened order type accepted by the
    /// exchange contract.
    pub fn eip712_struct_hash(&self) -> B256 {
        self.eip712_order().eip712_hash_struct()
    }

    /// EIP-712 `hashStruct` of the flattened `BuyerFee` type.
    pub fn eip712_buyer_fee_struct_hash(&self, buyer_fee: U256) -> B256 {
        let order = self.eip712_order();
        eip712::BuyerFee {
            owner: order.owner,
            salt: order.salt,
            sellToken: order.sellToken,
            sellTokenId: order.sellTokenId,
            sellAssetType: order.sellAssetType,
            buyToken: order.buyToken,
            buyTokenId: order.buyTokenId,
            buyAssetType: order.buyAssetType,
            selling: order.selling,
            buying: order.buying,
            sellerFee: order.sellerFee,
            buyerFee: buyer_fee,
        }
        .eip712_hash_struct()
    }

    pub async fn sign_typed<S>(
        &self,
        domain: &DomainSeparator,
        signer: &S,
    ) -> Result<EcdsaSignature>
    where
        S: Signer + ?Sized + Sync,
    {
        signature::sign_typed(domain, &self.eip712_struct_hash(), signer).await
    }

    pub async fn sign_typed_buyer_fee<S>(
        &self,
        domain: &DomainSeparator,
        buyer_fee: U256,
        signer: &S,
    ) -> Result<EcdsaSignature>
    where
        S: Signer + ?Sized + Sync,
    {
        signature::sign_typed(domain, &self.eip712_buyer_fee_struct_hash(buyer_fee), signer).await
    }

    pub fn verify_typed(
        &self,
        domain: &DomainSeparator,
        signature: &EcdsaSignature,
    ) -> Result<bool, RecoveryError> {
        let signer = signature::recover_typed(signature, domain, &self.eip712_struct_hash())?;
        Ok(signer == self.key.owner)
    }

    pub fn verify_typed_buyer_fee(
        &self,
        domain: &DomainSeparator,
        buyer_fee: U256,
        signature: &EcdsaSignature,
        fee_signer: Address,
    ) -> Result<bool, RecoveryError> {
        let signer = signature::recover_typed(
            signature,
            domain,
            &self.eip712_buyer_fee_struct_hash(buyer_fee),
        )?;
        Ok(signer == fee_signer)
    }
}

impl From<Order> for SequenceOrder {
    fn from(order: Order) -> Self {
        order.to_wire()
    }
}

impl TryFrom<SequenceOrder> for Order {
    type Error = MalformedNumericField;

    fn try_from(wire: SequenceOrder) -> Result<Self, Self::Error> {
        Self::parse(&wire)
    }
}

mod eip712 {
    alloy::sol! {
        struct Order {
            address owner;
            uint256 salt;
            address sellToken;
            uint256 sellTokenId;
            uint8 sellAssetType;
            address buyToken;
            uint256 buyTokenId;
            uint8 buyAssetType;
            uint256 selling;
            uint256 buying;
            uint256 sellerFee;
        }

        struct BuyerFee {
            address owner;
            uint256 salt;
            address sellToken;
            uint256 sellTokenId;
            uint8 sellAssetType;
            address buyToken;
            uint256 buyTokenId;
            uint8 buyAssetType;
            uint256 selling;
            uint256 buying;
            uint256 sellerFee;
            uint256 buyerFee;
        }
    }
}

/// Wire representation of an [`OrderKey`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceOrderKey {
    pub salt: String,
    pub owner: Address,
    pub sell_asset: SequenceAsset,
    pub buy_asset: SequenceAsset,
}

/// Wire representation of an [`Order`]. Every integer is a decimal string
/// so values above 2^53 survive JSON consumers that parse numbers as
/// doubles.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceOrder {
    pub key: SequenceOrderKey,
    pub selling: String,
    pub buying: String,
    pub seller_fee: String,
}

/// An order together with the separately negotiated buyer fee.
#[serde_as]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithBuyerFee {
    pub order: Order,
    #[serde_as(as = "DecimalU256")]
    pub buyer_fee: U256,
}

impl OrderWithBuyerFee {
    pub fn hash(&self) -> B256 {
        self.order.buyer_fee_hash(self.buyer_fee)
    }
}

#[derive(Clone, Debug, Default)]
pub struct OrderBuilder {
    key: OrderKey,
    salt: Option<U256>,
    selling: U256,
    buying: U256,
    seller_fee: U256,
}

impl OrderBuilder {
    pub fn with_owner(mut self, owner: Address) -> Self {
        self.key.owner = owner;
        self
    }

    pub fn with_salt(mut self, salt: U256) -> Self {
        self.salt = Some(salt);
        self
    }

    pub fn with_sell_asset(mut self, asset: Asset) -> Self {
        self.key.sell_asset = asset;
        self
    }

    pub fn with_buy_asset(mut self, asset: Asset) -> Self {
        self.key.buy_asset = asset;
        self
    }

    pub fn with_selling(mut self, selling: U256) -> Self {
        self.selling = selling;
        self
    }

    pub fn with_buying(mut self, buying: U256) -> Self {
        self.buying = buying;
        self
    }

    pub fn with_seller_fee(mut self, seller_fee: U256) -> Self {
        self.seller_fee = seller_fee;
        self
    }

    /// Builds the order, drawing a random salt unless one was set.
    pub fn build(self) -> Result<Order, rand::Error> {
        Order::new(
            self.key.owner,
            self.key.sell_asset,
            self.key.buy_asset,
            self.selling,
            self.buying,
            self.seller_fee,
            self.salt,
        )
    }
}
