use {alloy::primitives::U256, thiserror::Error};

/// Reasons a string is rejected as a decimal encoded `uint256`.
#[derive(Debug, Clone, Copy, Error, Eq, PartialEq)]
pub enum ParseDecimalError {
    #[error("empty string")]
    Empty,
    #[error("invalid character {0:?} at position {1}")]
    InvalidCharacter(char, usize),
    #[error("value does not fit into 256 bits")]
    Overflow,
}

/// Parses a non-negative base 10 integer that must fit into a `uint256`.
///
/// Stricter than [`U256::from_str`]: no `0x` prefix, no sign, no `_`
/// separators and no surrounding whitespace are accepted. Leading zeros are.
pub fn u256_from_decimal_str(s: &str) -> Result<U256, ParseDecimalError> {
    if s.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    if let Some((position, c)) = s.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        return Err(ParseDecimalError::InvalidCharacter(c, position));
    }

    s.bytes().try_fold(U256::ZERO, |acc, digit| {
        acc.checked_mul(U256::from(10))
            .and_then(|acc| acc.checked_add(U256::from(digit - b'0')))
            .ok_or(ParseDecimalError::Overflow)
    })
}

/// Formats a `uint256` as the canonical decimal string used on the wire.
pub fn u256_to_decimal_string(value: &U256) -> String {
    value.to_string()
}
