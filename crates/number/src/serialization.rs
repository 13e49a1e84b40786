use {
    crate::conversions::{u256_from_decimal_str, u256_to_decimal_string},
    alloy::primitives::U256,
    serde::{Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
    std::fmt,
};

/// Serialize and deserialize [`U256`] as a decimal string.
///
/// Deserialization is strict: only plain base 10 digits are accepted, JSON
/// numbers are rejected because they can't carry 256 bits without loss.
#[derive(Debug)]
pub struct DecimalU256;

impl<'de> DeserializeAs<'de, U256> for DecimalU256 {
    fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a u256 encoded as a decimal string")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u256_from_decimal_str(s).map_err(|err| {
                    de::Error::custom(format!("failed to decode {s:?} as decimal u256: {err}"))
                })
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

impl SerializeAs<U256> for DecimalU256 {
    fn serialize_as<S: Serializer>(source: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&u256_to_decimal_string(source))
    }
}

/// Parses a `0x` prefixed hex string or a decimal string into a [`U256`].
pub fn parse_hex_or_decimal(s: &str) -> Result<U256, String> {
    match s.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16)
            .map_err(|err| format!("failed to decode {s:?} as hex u256: {err}")),
        None => u256_from_decimal_str(s)
            .map_err(|err| format!("failed to decode {s:?} as decimal u256: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        serde::{Deserialize, Serialize},
        serde_json::json,
        serde_with::serde_as,
    };

    #[serde_as]
    #[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
    struct Strict(#[serde_as(as = "DecimalU256")] U256);

    #[test]
    fn decimal_serialization() {
        assert_eq!(json!(Strict(U256::from(10))), json!("10"));
        assert_eq!(
            json!(Strict(U256::MAX)),
            json!(
                "115792089237316195423570985008687907853269984665640564039457584007913129639935"
            )
        );
    }

    #[test]
    fn decimal_deserialization() {
        assert_eq!(
            serde_json::from_value::<Strict>(json!("10")).unwrap(),
            Strict(U256::from(10))
        );
        assert!(serde_json::from_value::<Strict>(json!("0x10")).is_err());
        assert!(serde_json::from_value::<Strict>(json!(10)).is_err());
        assert!(serde_json::from_value::<Strict>(json!("10e")).is_err());
        assert!(serde_json::from_value::<Strict>(json!("")).is_err());
    }

    #[test]
    fn hex_or_decimal_parsing() {
        assert_eq!(parse_hex_or_decimal("0x10").unwrap(), U256::from(16));
        assert_eq!(parse_hex_or_decimal("10").unwrap(), U256::from(10));
        assert_eq!(
            parse_hex_or_decimal(&format!("0x{}", "ff".repeat(32))).unwrap(),
            U256::MAX
        );
        assert!(parse_hex_or_decimal("0xx1").is_err());
        assert!(parse_hex_or_decimal("0AFF").is_err());
        assert!(parse_hex_or_decimal("").is_err());
        assert!(
            parse_hex_or_decimal("12a")
                .unwrap_err()
                .contains("as decimal u256")
        );
    }
}
