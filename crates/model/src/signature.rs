use {
    crate::{DomainSeparator, hashed_eip712_message},
    alloy::{
        primitives::{self, Address, B256, SignatureError, U256, keccak256},
        signers::Signer,
    },
    anyhow::{Context as _, Result},
    serde::{Deserialize, Serialize, de},
    std::fmt,
};

/// How the 32 byte message was prepared before it was signed.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SigningScheme {
    /// The message is an EIP-712 typed data hash and is signed as is.
    ///
    /// https://eips.ethereum.org/EIPS/eip-712
    Eip712,
    /// The message is signed according to EIP-191's personal_sign format.
    ///
    /// https://eips.ethereum.org/EIPS/eip-191
    #[default]
    EthSign,
}

/// Errors for signatures whose signer can't be recovered at all.
///
/// A signature that is well formed but produced by another key is not an
/// error, it simply recovers a different address.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("ECDSA signature must be 65 bytes long but is {0}")]
    InvalidLength(usize),
    #[error("invalid recovery id {0}, expected one of 0, 1, 27 or 28")]
    InvalidRecoveryId(u8),
    #[error("failed to recover signer: {0}")]
    Recovery(#[from] SignatureError),
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Hash)]
pub struct EcdsaSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

/// Returns the message used for signing and recovery for the specified hash.
pub fn signing_message(signing_scheme: SigningScheme, hash: &B256) -> B256 {
    match signing_scheme {
        SigningScheme::Eip712 => *hash,
        SigningScheme::EthSign => {
            let mut buffer = [0u8; 60];
            buffer[..28].copy_from_slice(b"\x19Ethereum Signed Message:\n32");
            buffer[28..].copy_from_slice(hash.as_slice());
            keccak256(buffer)
        }
    }
}

impl EcdsaSignature {
    /// r + s + v
    pub fn to_bytes(self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecoveryError> {
        let bytes: &[u8; 65] = bytes
            .try_into()
            .map_err(|_| RecoveryError::InvalidLength(bytes.len()))?;
        Ok(Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        })
    }

    /// Recovers the address that produced this signature over `hash`.
    pub fn recover(
        &self,
        signing_scheme: SigningScheme,
        hash: &B256,
    ) -> Result<Address, RecoveryError> {
        let message = signing_message(signing_scheme, hash);
        let y_parity = match self.v {
            0 | 27 => false,
            1 | 28 => true,
            v => return Err(RecoveryError::InvalidRecoveryId(v)),
        };
        let signature = primitives::Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            y_parity,
        );
        Ok(signature.recover_address_from_prehash(&message)?)
    }

    /// Signs `hash` with the given signing scheme.
    ///
    /// The signer only ever sees the prepared message, so any alloy signer
    /// backend (local key, hardware wallet, remote custody) can be used.
    pub async fn sign<S>(signing_scheme: SigningScheme, hash: &B256, signer: &S) -> Result<Self>
    where
        S: Signer + ?Sized + Sync,
    {
        let signature = match signing_scheme {
            SigningScheme::Eip712 => signer.sign_hash(hash).await,
            // `sign_message` applies the EIP-191 prefix itself.
            SigningScheme::EthSign => signer.sign_message(hash.as_slice()).await,
        }
        .with_context(|| format!("signer {} failed to sign message", signer.address()))?;

        tracing::trace!(signer = %signer.address(), ?signing_scheme, %hash, "signed message");
        Ok(Self::from(signature))
    }

    /// Returns an arbitrary non-zero signature that can be used for recovery
    /// when you don't actually care about the owner.
    pub fn non_zero() -> Self {
        Self {
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
            v: 27,
        }
    }
}

impl From<primitives::Signature> for EcdsaSignature {
    fn from(signature: primitives::Signature) -> Self {
        Self {
            r: B256::from(signature.r().to_be_bytes::<32>()),
            s: B256::from(signature.s().to_be_bytes::<32>()),
            v: 27 + u8::from(signature.v()),
        }
    }
}

impl fmt::Display for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode_prefixed(self.to_bytes()))
    }
}

impl Serialize for EcdsaSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EcdsaSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;
        impl de::Visitor<'_> for Visitor {
            type Value = EcdsaSignature;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "the 65 ecdsa signature bytes as a hex encoded string, ordered as r, s, v, \
                     where v is either 27 or 28"
                )
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                s.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

impl std::str::FromStr for EcdsaSignature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").with_context(|| {
            format!(
                "{s:?} can't be decoded as hex ecdsa signature because it does not start with \
                 '0x'"
            )
        })?;
        let bytes = const_hex::decode(hex)
            .with_context(|| format!("failed to decode {s:?} as hex ecdsa signature"))?;
        Ok(Self::from_bytes(&bytes)?)
    }
}

/// Signs an EIP-712 struct hash for the given domain.
pub async fn sign_typed<S>(
    domain: &DomainSeparator,
    struct_hash: &B256,
    signer: &S,
) -> Result<EcdsaSignature>
where
    S: Signer + ?Sized + Sync,
{
    let message = hashed_eip712_message(domain, struct_hash);
    EcdsaSignature::sign(SigningScheme::Eip712, &message, signer).await
}

/// Recovers the signer of an EIP-712 signature over `struct_hash`.
pub fn recover_typed(
    signature: &EcdsaSignature,
    domain: &DomainSeparator,
    struct_hash: &B256,
) -> Result<Address, RecoveryError> {
    signature.recover(
        SigningScheme::Eip712,
        &hashed_eip712_message(domain, struct_hash),
    )
}
