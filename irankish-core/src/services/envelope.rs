//! Envelope builder - authentication envelope for tokenization
//!
//! The gateway authenticates each tokenization request with an envelope built
//! from the terminal credentials and the exact amount:
//!
//! 1. base string = `amount(12) + pass-phrase + terminal-id + marker [+ splits]`
//! 2. AES-128-CBC / PKCS#7 over the base string with a fresh key and IV
//! 3. SHA-256 over the raw ciphertext
//! 4. RSA-encrypt `aes_key || hash` (48 bytes) with the gateway public key
//! 5. hex-encode the RSA output (`data`) and the IV (`iv`)
//!
//! The ciphertext itself is never sent; the gateway rebuilds the base string
//! from the request fields and checks the hash.

use std::fmt;

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::domain::result::{Error, Result};
use crate::domain::{
    validate_pass_phrase, validate_terminal_id, Credentials, Envelope, EnvelopeMode, HexCase,
    RsaPadding, SplitEntry, MAX_AMOUNT,
};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// AES-128 key length
pub const AES_KEY_LEN: usize = 16;
/// AES block size, which is also the CBC IV length
pub const IV_LEN: usize = 16;
/// `aes_key || sha256` length
pub const BLOB_LEN: usize = AES_KEY_LEN + 32;

/// Builds authentication envelopes for one terminal
///
/// Holds only immutable inputs; every [`EnvelopeBuilder::build`] call draws
/// a fresh key and IV, so one builder can be shared across threads.
#[derive(Clone)]
pub struct EnvelopeBuilder {
    terminal_id: String,
    pass_phrase: String,
    public_key: RsaPublicKey,
    padding: RsaPadding,
    hex_case: HexCase,
}

impl EnvelopeBuilder {
    /// Validate the credentials and parse the gateway public key
    pub fn new(credentials: &Credentials, padding: RsaPadding, hex_case: HexCase) -> Result<Self> {
        validate_terminal_id(&credentials.terminal_id)?;
        validate_pass_phrase(&credentials.pass_phrase)?;
        let public_key = parse_public_key(&credentials.public_key)?;

        Ok(Self {
            terminal_id: credentials.terminal_id.clone(),
            pass_phrase: credentials.pass_phrase.clone(),
            public_key,
            padding,
            hex_case,
        })
    }

    pub fn padding(&self) -> RsaPadding {
        self.padding
    }

    pub fn hex_case(&self) -> HexCase {
        self.hex_case
    }

    /// RSA modulus size in bytes, i.e. the decoded length of `data`
    pub fn modulus_len(&self) -> usize {
        self.public_key.size()
    }

    /// Build a fresh envelope for `amount`
    pub fn build(&self, amount: i64, mode: EnvelopeMode<'_>) -> Result<Envelope> {
        let base = build_base_string(&self.terminal_id, &self.pass_phrase, amount, mode)?;

        let mut rng = OsRng;
        let mut aes_key = [0u8; AES_KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        rng.fill_bytes(&mut aes_key);
        rng.fill_bytes(&mut iv);

        let envelope = self.seal(base.as_bytes(), &aes_key, &iv, &mut rng)?;

        let splits = match mode {
            EnvelopeMode::Plain => 0,
            EnvelopeMode::Multiplex(splits) => splits.len(),
        };
        tracing::debug!(
            mode = mode.marker(),
            splits,
            padding = %self.padding,
            "built authentication envelope"
        );

        Ok(envelope)
    }

    /// Encrypt, hash and wrap a base string with the given key and IV
    fn seal<R: CryptoRng + RngCore>(
        &self,
        base: &[u8],
        aes_key: &[u8; AES_KEY_LEN],
        iv: &[u8; IV_LEN],
        rng: &mut R,
    ) -> Result<Envelope> {
        let ciphertext =
            Aes128CbcEnc::new(aes_key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(base);
        let hash = Sha256::digest(&ciphertext);

        let mut blob = Vec::with_capacity(BLOB_LEN);
        blob.extend_from_slice(aes_key);
        blob.extend_from_slice(&hash);

        let wrapped = match self.padding {
            RsaPadding::Pkcs1 => self.public_key.encrypt(rng, Pkcs1v15Encrypt, &blob),
            RsaPadding::Oaep => self.public_key.encrypt(rng, Oaep::new::<sha1::Sha1>(), &blob),
        }
        .map_err(|e| Error::crypto(format!("RSA encryption failed: {}", e)))?;

        Ok(Envelope {
            data: self.hex_case.encode(&wrapped),
            iv: self.hex_case.encode(iv),
        })
    }
}

impl fmt::Debug for EnvelopeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeBuilder")
            .field("terminal_id", &self.terminal_id)
            .field("modulus_bits", &(self.public_key.size() * 8))
            .field("padding", &self.padding)
            .field("hex_case", &self.hex_case)
            .finish_non_exhaustive()
    }
}

/// Parse an RSA public key from SPKI (`BEGIN PUBLIC KEY`) or PKCS#1
/// (`BEGIN RSA PUBLIC KEY`) PEM text
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey> {
    let pem = pem.trim();
    if pem.is_empty() {
        return Err(Error::InvalidPublicKey("public key is empty".to_string()));
    }

    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|spki_err| {
            RsaPublicKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
                Error::InvalidPublicKey(format!(
                    "not an RSA public key (SPKI: {}; PKCS#1: {})",
                    spki_err, pkcs1_err
                ))
            })
        })
}

/// Build the plaintext base string
///
/// Plain: `amount(12) + pass-phrase + terminal-id + "00"`.
/// Multiplex: same prefix with marker `"01"`, then `iban + amount(12)` for
/// every split in input order.
pub fn build_base_string(
    terminal_id: &str,
    pass_phrase: &str,
    amount: i64,
    mode: EnvelopeMode<'_>,
) -> Result<String> {
    validate_terminal_id(terminal_id)?;
    validate_pass_phrase(pass_phrase)?;
    let amount = pad_amount(amount).ok_or_else(|| {
        Error::invalid_amount(format!(
            "amount must be between 1 and {}, got {}",
            MAX_AMOUNT, amount
        ))
    })?;
    if amount == "000000000000" {
        return Err(Error::invalid_amount("amount must be greater than zero"));
    }

    let mut base = String::with_capacity(12 + pass_phrase.len() + terminal_id.len() + 2);
    base.push_str(&amount);
    base.push_str(pass_phrase);
    base.push_str(terminal_id);
    base.push_str(mode.marker());

    if let EnvelopeMode::Multiplex(splits) = mode {
        append_splits(&mut base, splits)?;
    }

    Ok(base)
}

fn append_splits(base: &mut String, splits: &[SplitEntry]) -> Result<()> {
    if splits.is_empty() {
        return Err(Error::invalid_split_set("multiplex mode requires at least one split"));
    }

    for (i, split) in splits.iter().enumerate() {
        let iban = normalize_iban(&split.iban);
        if iban.is_empty() {
            return Err(Error::invalid_split_set(format!("split {} has an empty account", i)));
        }
        let amount = pad_amount(split.amount).ok_or_else(|| {
            Error::invalid_split_set(format!(
                "split {} amount must be between 0 and {}, got {}",
                i, MAX_AMOUNT, split.amount
            ))
        })?;
        base.push_str(&iban);
        base.push_str(&amount);
    }

    Ok(())
}

/// Uppercase, drop spaces, and transcode a leading `IR` to `2718`
pub fn normalize_iban(iban: &str) -> String {
    let iban: String = iban
        .chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_uppercase();

    match iban.strip_prefix("IR") {
        Some(rest) => format!("2718{}", rest),
        None => iban,
    }
}

/// Zero-pad to 12 digits; `None` if negative or wider than 12 digits
fn pad_amount(amount: i64) -> Option<String> {
    (0..=MAX_AMOUNT)
        .contains(&amount)
        .then(|| format!("{:012}", amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERMINAL: &str = "12345678";
    const PASS: &str = "TESTPASS........";

    #[test]
    fn test_plain_base_string() {
        let base = build_base_string(TERMINAL, PASS, 10000, EnvelopeMode::Plain).unwrap();
        assert_eq!(base, "000000010000TESTPASS........1234567800");
    }

    #[test]
    fn test_multiplex_base_string() {
        let splits = [SplitEntry::new("IR000000000000000000000001", 500)];
        let base = build_base_string(TERMINAL, PASS, 10000, EnvelopeMode::Multiplex(&splits)).unwrap();

        let prefix = "000000010000TESTPASS........1234567801";
        assert!(base.starts_with(prefix));
        assert_eq!(&base[prefix.len()..], "2718000000000000000000000001000000000500");
    }

    #[test]
    fn test_multiplex_keeps_split_order() {
        let splits = [
            SplitEntry::new("IR11", 1),
            SplitEntry::new("DE22", 2),
        ];
        let base = build_base_string(TERMINAL, PASS, 3, EnvelopeMode::Multiplex(&splits)).unwrap();
        assert!(base.ends_with("271811000000000001DE22000000000002"));
    }

    #[test]
    fn test_normalize_iban() {
        assert_eq!(normalize_iban("ir12 3456 7890"), "27181234567890");
        assert_eq!(normalize_iban("IR0001"), "27180001");
        assert_eq!(normalize_iban("DE89 3704"), "DE893704");
        // Only a leading prefix is transcoded
        assert_eq!(normalize_iban("12IR34"), "12IR34");
    }

    #[test]
    fn test_amount_padding() {
        assert_eq!(pad_amount(500).as_deref(), Some("000000000500"));
        assert_eq!(pad_amount(MAX_AMOUNT).as_deref(), Some("999999999999"));
        assert_eq!(pad_amount(MAX_AMOUNT + 1), None);
        assert_eq!(pad_amount(-1), None);
    }

    #[test]
    fn test_reject_non_positive_amount() {
        assert!(matches!(
            build_base_string(TERMINAL, PASS, 0, EnvelopeMode::Plain),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            build_base_string(TERMINAL, PASS, -10, EnvelopeMode::Plain),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            build_base_string(TERMINAL, PASS, 1_000_000_000_000, EnvelopeMode::Plain),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_reject_bad_credentials() {
        assert!(matches!(
            build_base_string("12AB5678", PASS, 1, EnvelopeMode::Plain),
            Err(Error::InvalidCredential(_))
        ));
        assert!(matches!(
            build_base_string(TERMINAL, "TESTPASS.......", 1, EnvelopeMode::Plain),
            Err(Error::InvalidCredential(_))
        ));
        assert!(matches!(
            build_base_string(TERMINAL, "TESTPASS.........", 1, EnvelopeMode::Plain),
            Err(Error::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_reject_empty_split_set() {
        assert!(matches!(
            build_base_string(TERMINAL, PASS, 1, EnvelopeMode::Multiplex(&[])),
            Err(Error::InvalidSplitSet(_))
        ));
    }

    #[test]
    fn test_reject_bad_split_entries() {
        let negative = [SplitEntry::new("IR01", -1)];
        assert!(matches!(
            build_base_string(TERMINAL, PASS, 1, EnvelopeMode::Multiplex(&negative)),
            Err(Error::InvalidSplitSet(_))
        ));

        let blank = [SplitEntry::new("   ", 1)];
        assert!(matches!(
            build_base_string(TERMINAL, PASS, 1, EnvelopeMode::Multiplex(&blank)),
            Err(Error::InvalidSplitSet(_))
        ));

        // Zero-amount splits are allowed
        let zero = [SplitEntry::new("IR01", 0)];
        assert!(build_base_string(TERMINAL, PASS, 1, EnvelopeMode::Multiplex(&zero)).is_ok());
    }

    #[test]
    fn test_reject_invalid_public_key() {
        let creds = Credentials::new(TERMINAL, PASS, "acceptor", "-----BEGIN PUBLIC KEY-----\nnope\n-----END PUBLIC KEY-----");
        let result = EnvelopeBuilder::new(&creds, RsaPadding::Pkcs1, HexCase::Upper);
        assert!(matches!(result, Err(Error::InvalidPublicKey(_))));

        let empty = Credentials::new(TERMINAL, PASS, "acceptor", "");
        assert!(matches!(
            EnvelopeBuilder::new(&empty, RsaPadding::Pkcs1, HexCase::Upper),
            Err(Error::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_credentials_checked_before_key() {
        let creds = Credentials::new("1234", PASS, "acceptor", "");
        assert!(matches!(
            EnvelopeBuilder::new(&creds, RsaPadding::Pkcs1, HexCase::Upper),
            Err(Error::InvalidCredential(_))
        ));
    }
}
