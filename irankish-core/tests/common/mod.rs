//! Shared helpers for irankish-core integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

use irankish_core::config::GatewayConfig;
use irankish_core::domain::{Envelope, RsaPadding};
use irankish_core::ports::{HttpResponse, HttpTransport, TransportError};
use irankish_core::Credentials;

pub const TERMINAL_ID: &str = "12345678";
pub const PASS_PHRASE: &str = "1234567890123456";
pub const ACCEPTOR_ID: &str = "992180001234";
pub const REVERT_URL: &str = "https://shop.example/irankish/callback";

/// 1024-bit key pair shared by every test in the binary
pub fn private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("generate RSA key"))
}

pub fn public_key_pem() -> String {
    private_key()
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encode public key")
}

pub fn credentials() -> Credentials {
    Credentials::new(TERMINAL_ID, PASS_PHRASE, ACCEPTOR_ID, public_key_pem())
}

pub fn config() -> GatewayConfig {
    GatewayConfig {
        credentials: credentials(),
        revert_url: REVERT_URL.to_string(),
        ..Default::default()
    }
}

/// Unwrap an envelope with the test private key
///
/// Returns `(aes_key, sha256_of_ciphertext, iv)`.
pub fn open_envelope(envelope: &Envelope, padding: RsaPadding) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let wrapped = hex::decode(&envelope.data).expect("data is hex");
    let blob = match padding {
        RsaPadding::Pkcs1 => private_key().decrypt(Pkcs1v15Encrypt, &wrapped),
        RsaPadding::Oaep => private_key().decrypt(Oaep::new::<sha1::Sha1>(), &wrapped),
    }
    .expect("envelope decrypts with the matching private key");
    assert_eq!(blob.len(), 48, "blob is AES key plus SHA-256");

    let iv = hex::decode(&envelope.iv).expect("iv is hex");
    (blob[..16].to_vec(), blob[16..].to_vec(), iv)
}

/// SHA-256 of AES-128-CBC/PKCS#7 over `base`
pub fn ciphertext_hash(base: &str, key: &[u8], iv: &[u8]) -> Vec<u8> {
    let ciphertext = cbc::Encryptor::<aes::Aes128>::new(key.into(), iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(base.as_bytes());
    Sha256::digest(&ciphertext).to_vec()
}

/// Transport answering from a queue and recording every call
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<(String, JsonValue)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(body: JsonValue) -> Self {
        let transport = Self::new();
        transport.push(200, body);
        transport
    }

    pub fn push(&self, status: u16, body: JsonValue) {
        self.responses
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<(String, JsonValue)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_payload(&self) -> JsonValue {
        self.requests()
            .last()
            .map(|(_, payload)| payload.clone())
            .expect("at least one request")
    }
}

impl HttpTransport for RecordingTransport {
    fn post_json(
        &self,
        url: &str,
        payload: &JsonValue,
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Connect("no canned response".to_string()))
    }
}
