//! Authentication envelope domain models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SplitEntry;

/// `authenticationEnvelope` sent with every tokenization request.
///
/// Single use: it embeds a fresh AES key and IV bound to one amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Hex of the RSA-encrypted `aes_key || sha256(ciphertext)` blob
    pub data: String,
    /// Hex of the AES-CBC IV
    pub iv: String,
}

/// Base string layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeMode<'a> {
    /// Single settlement, marker `00`
    Plain,
    /// Split settlement, marker `01` followed by every split
    Multiplex(&'a [SplitEntry]),
}

impl EnvelopeMode<'_> {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Plain => "00",
            Self::Multiplex(_) => "01",
        }
    }
}

/// Padding used when wrapping the key blob with the gateway's RSA key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsaPadding {
    /// PKCS#1 v1.5
    #[default]
    Pkcs1,
    /// OAEP with SHA-1 and MGF1-SHA-1 (OpenSSL's `PKCS1_OAEP_PADDING`)
    Oaep,
}

impl FromStr for RsaPadding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pkcs1" | "pkcs1v15" | "pkcs1-v1_5" => Ok(Self::Pkcs1),
            "oaep" => Ok(Self::Oaep),
            other => Err(format!("unknown RSA padding '{}', expected pkcs1 or oaep", other)),
        }
    }
}

impl fmt::Display for RsaPadding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pkcs1 => f.write_str("pkcs1"),
            Self::Oaep => f.write_str("oaep"),
        }
    }
}

/// Case of the hex digits in `data` and `iv`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexCase {
    #[default]
    Upper,
    Lower,
}

impl HexCase {
    pub fn encode(&self, bytes: impl AsRef<[u8]>) -> String {
        match self {
            Self::Upper => hex::encode_upper(bytes),
            Self::Lower => hex::encode(bytes),
        }
    }
}

impl FromStr for HexCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper" => Ok(Self::Upper),
            "lower" => Ok(Self::Lower),
            other => Err(format!("unknown hex case '{}', expected upper or lower", other)),
        }
    }
}

impl fmt::Display for HexCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upper => f.write_str("upper"),
            Self::Lower => f.write_str("lower"),
        }
    }
}
