//! Merchant credentials issued by IranKish

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

pub const TERMINAL_ID_LEN: usize = 8;
pub const PASS_PHRASE_LEN: usize = 16;

/// Terminal, pass-phrase, acceptor and RSA public key for one merchant.
///
/// `public_key` holds PEM text. Reading it from a file is done by the
/// configuration layer before this value is built.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub terminal_id: String,
    pub pass_phrase: String,
    pub acceptor_id: String,
    pub public_key: String,
}

impl Credentials {
    pub fn new(
        terminal_id: impl Into<String>,
        pass_phrase: impl Into<String>,
        acceptor_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            terminal_id: terminal_id.into(),
            pass_phrase: pass_phrase.into(),
            acceptor_id: acceptor_id.into(),
            public_key: public_key.into(),
        }
    }

    /// Check terminal id and pass-phrase shape
    pub fn validate(&self) -> Result<()> {
        validate_terminal_id(&self.terminal_id)?;
        validate_pass_phrase(&self.pass_phrase)
    }
}

// Never print the pass-phrase or the key
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("terminal_id", &self.terminal_id)
            .field("pass_phrase", &"<redacted>")
            .field("acceptor_id", &self.acceptor_id)
            .field("public_key", &format!("<{} bytes>", self.public_key.len()))
            .finish()
    }
}

/// Terminal id must be exactly 8 ASCII digits
pub fn validate_terminal_id(terminal_id: &str) -> Result<()> {
    if terminal_id.len() != TERMINAL_ID_LEN || !terminal_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_credential(format!(
            "terminal id must be exactly {} digits",
            TERMINAL_ID_LEN
        )));
    }
    Ok(())
}

/// Pass-phrase must be exactly 16 characters
pub fn validate_pass_phrase(pass_phrase: &str) -> Result<()> {
    let len = pass_phrase.chars().count();
    if len != PASS_PHRASE_LEN {
        return Err(Error::invalid_credential(format!(
            "pass-phrase must be exactly {} characters, got {}",
            PASS_PHRASE_LEN, len
        )));
    }
    Ok(())
}
