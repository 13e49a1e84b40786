use {
    crate::order::{MalformedNumericField, parse_field},
    alloy::primitives::{Address, U256},
    number::conversions::u256_to_decimal_string,
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    strum::{Display, EnumIter, EnumString},
};

/// Kind of token an [`Asset`] refers to.
///
/// The discriminants are part of the contract ABI and must never change.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[repr(u8)]
pub enum AssetType {
    #[default]
    Eth = 0,
    Erc20 = 1,
    Erc1155 = 2,
    Erc721 = 3,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("unknown asset type {0}")]
pub struct UnknownAssetType(pub u8);

impl TryFrom<u8> for AssetType {
    type Error = UnknownAssetType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Eth,
            1 => Self::Erc20,
            2 => Self::Erc1155,
            3 => Self::Erc721,
            other => return Err(UnknownAssetType(other)),
        })
    }
}

impl From<AssetType> for u8 {
    fn from(value: AssetType) -> Self {
        value as u8
    }
}

// Serialized as the bare integer tag the contracts use.
impl Serialize for AssetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl<'de> Deserialize<'de> for AssetType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = u8::deserialize(deserializer)?;
        AssetType::try_from(tag).map_err(de::Error::custom)
    }
}

/// A specific fungible or non-fungible holding.
///
/// No consistency between `asset_type` and `token_id` is enforced here (an
/// ERC20 asset with a non-zero token id is accepted), the contracts are
/// responsible for that.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Asset {
    pub token: Address,
    pub token_id: U256,
    pub asset_type: AssetType,
}

impl Asset {
    /// Size of the ABI encoded `(address,uint256,uint8)` tuple.
    pub const ENCODED_LEN: usize = 96;

    pub fn new(token: Address, token_id: U256, asset_type: AssetType) -> Self {
        Self {
            token,
            token_id,
            asset_type,
        }
    }

    /// Native ether.
    pub fn eth() -> Self {
        Self::default()
    }

    pub fn erc20(token: Address) -> Self {
        Self::new(token, U256::ZERO, AssetType::Erc20)
    }

    pub fn erc721(token: Address, token_id: U256) -> Self {
        Self::new(token, token_id, AssetType::Erc721)
    }

    pub fn erc1155(token: Address, token_id: U256) -> Self {
        Self::new(token, token_id, AssetType::Erc1155)
    }

    /// Writes the ABI encoding of the asset tuple into `out`, which must be
    /// exactly [`Self::ENCODED_LEN`] zeroed bytes.
    pub(crate) fn encode_into(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), Self::ENCODED_LEN);
        // Addresses and the uint8 tag are right aligned in their words.
        out[12..32].copy_from_slice(self.token.as_slice());
        out[32..64].copy_from_slice(&self.token_id.to_be_bytes::<32>());
        out[95] = self.asset_type.into();
    }

    pub fn to_wire(&self) -> SequenceAsset {
        SequenceAsset {
            token: self.token,
            token_id: u256_to_decimal_string(&self.token_id),
            asset_type: self.asset_type,
        }
    }

    pub(crate) fn parse(
        wire: &SequenceAsset,
        token_id_field: &'static str,
    ) -> Result<Self, MalformedNumericField> {
        Ok(Self {
            token: wire.token,
            token_id: parse_field(token_id_field, &wire.token_id)?,
            asset_type: wire.asset_type,
        })
    }
}

/// Wire representation of an [`Asset`] with the token id as decimal string.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceAsset {
    pub token: Address,
    pub token_id: String,
    pub asset_type: AssetType,
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address, serde_json::json, strum::IntoEnumIterator};

    #[test]
    fn asset_type_tags_are_stable() {
        assert_eq!(u8::from(AssetType::Eth), 0);
        assert_eq!(u8::from(AssetType::Erc20), 1);
        assert_eq!(u8::from(AssetType::Erc1155), 2);
        assert_eq!(u8::from(AssetType::Erc721), 3);
        for asset_type in AssetType::iter() {
            assert_eq!(AssetType::try_from(u8::from(asset_type)), Ok(asset_type));
        }
        assert_eq!(AssetType::try_from(4), Err(UnknownAssetType(4)));
    }

    #[test]
    fn asset_type_serializes_as_tag() {
        assert_eq!(json!(AssetType::Erc721), json!(3));
        assert_eq!(
            serde_json::from_value::<AssetType>(json!(1)).unwrap(),
            AssetType::Erc20
        );
        assert!(serde_json::from_value::<AssetType>(json!(4)).is_err());
        assert!(serde_json::from_value::<AssetType>(json!("ERC20")).is_err());
    }

    #[test]
    fn asset_type_from_name() {
        assert_eq!("erc1155".parse::<AssetType>().unwrap(), AssetType::Erc1155);
        assert_eq!("ETH".parse::<AssetType>().unwrap(), AssetType::Eth);
        assert_eq!(AssetType::Erc721.to_string(), "ERC721");
        assert!("erc777".parse::<AssetType>().is_err());
    }

    #[test]
    fn encodes_asset_tuple() {
        let asset = Asset::erc721(
            address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
            U256::from(0x0102),
        );
        let mut encoded = [0u8; Asset::ENCODED_LEN];
        asset.encode_into(&mut encoded);

        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..32], asset.token.as_slice());
        assert_eq!(&encoded[32..62], &[0u8; 30]);
        assert_eq!(&encoded[62..64], &[0x01, 0x02]);
        assert_eq!(&encoded[64..95], &[0u8; 31]);
        assert_eq!(encoded[95], 3);
    }

    #[test]
    fn parse_reports_field() {
        let wire = SequenceAsset {
            token_id: "one".to_string(),
            ..Default::default()
        };
        let err = Asset::parse(&wire, "key.buyAsset.tokenId").unwrap_err();
        assert_eq!(err.field, "key.buyAsset.tokenId");
        assert_eq!(err.value, "one");
    }
}
