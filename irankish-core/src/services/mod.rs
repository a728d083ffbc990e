//! Service layer - gateway protocol logic
//!
//! - **envelope**: builds the `authenticationEnvelope` for tokenization
//! - **gateway**: the transaction client issuing the four operations

mod envelope;
mod gateway;

pub use envelope::{
    build_base_string, normalize_iban, parse_public_key, EnvelopeBuilder, AES_KEY_LEN, BLOB_LEN,
    IV_LEN,
};
pub use gateway::{
    generate_request_id, interpret_response, TransactionClient, CONFIRM_PATH, INQUIRY_PATH,
    REVERSE_PATH, SPECIAL_TOKENIZE_PATH, TOKENIZE_PATH,
};
