//! Core domain entities
//!
//! All gateway entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod credentials;
mod envelope;
mod redirect;
mod response_code;
pub mod result;
mod transaction;

pub use credentials::{validate_pass_phrase, validate_terminal_id, Credentials, PASS_PHRASE_LEN, TERMINAL_ID_LEN};
pub use envelope::{Envelope, EnvelopeMode, HexCase, RsaPadding};
pub use redirect::RedirectTarget;
pub use response_code::ResponseCode;
pub use transaction::{
    FindOption, GatewayReply, InquiryCriteria, SpecialTokenOptions, SplitEntry, TokenGrant,
    TokenOptions, TransactionType, MAX_AMOUNT, MAX_REQUEST_ID_LEN,
};
