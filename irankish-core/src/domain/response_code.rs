//! Gateway response codes
//!
//! Every IranKish endpoint answers with a two-character `responseCode`. Only
//! `"00"` means success; the rest are decline or error reasons. Codes the
//! gateway adds later land in [`ResponseCode::Unmapped`] so parsing never fails.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gateway response code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseCode {
    Success,
    ReferToCardIssuer,
    InvalidMerchant,
    PickUpCard,
    DoNotHonor,
    InvalidTransaction,
    InvalidAmount,
    InvalidCardNumber,
    InsufficientFunds,
    ExpiredCard,
    IncorrectPin,
    TransactionNotPermitted,
    SuspectedFraud,
    SystemMalfunction,
    UnknownFailure,
    /// A code outside the documented table, kept verbatim
    Unmapped(String),
}

impl ResponseCode {
    /// Map a raw wire code. Never fails.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "00" => Self::Success,
            "01" => Self::ReferToCardIssuer,
            "03" => Self::InvalidMerchant,
            "04" => Self::PickUpCard,
            "05" => Self::DoNotHonor,
            "12" => Self::InvalidTransaction,
            "13" => Self::InvalidAmount,
            "14" => Self::InvalidCardNumber,
            "51" => Self::InsufficientFunds,
            "54" => Self::ExpiredCard,
            "55" => Self::IncorrectPin,
            "57" => Self::TransactionNotPermitted,
            "59" => Self::SuspectedFraud,
            "96" => Self::SystemMalfunction,
            "99" => Self::UnknownFailure,
            other => Self::Unmapped(other.to_string()),
        }
    }

    /// The wire code
    pub fn as_code(&self) -> &str {
        match self {
            Self::Success => "00",
            Self::ReferToCardIssuer => "01",
            Self::InvalidMerchant => "03",
            Self::PickUpCard => "04",
            Self::DoNotHonor => "05",
            Self::InvalidTransaction => "12",
            Self::InvalidAmount => "13",
            Self::InvalidCardNumber => "14",
            Self::InsufficientFunds => "51",
            Self::ExpiredCard => "54",
            Self::IncorrectPin => "55",
            Self::TransactionNotPermitted => "57",
            Self::SuspectedFraud => "59",
            Self::SystemMalfunction => "96",
            Self::UnknownFailure => "99",
            Self::Unmapped(code) => code,
        }
    }

    /// Human-readable description from the gateway's code table
    pub fn description(&self) -> &'static str {
        match self {
            Self::Success => "Transaction successful.",
            Self::ReferToCardIssuer => "Refer to card issuer.",
            Self::InvalidMerchant => "Invalid acceptor/terminal or not allowed.",
            Self::PickUpCard => "Pick up card.",
            Self::DoNotHonor => "Do not honor.",
            Self::InvalidTransaction => "Invalid transaction.",
            Self::InvalidAmount => "Invalid amount.",
            Self::InvalidCardNumber => "Invalid card number.",
            Self::InsufficientFunds => "Insufficient funds.",
            Self::ExpiredCard => "Expired card.",
            Self::IncorrectPin => "Incorrect PIN.",
            Self::TransactionNotPermitted => "Transaction not permitted.",
            Self::SuspectedFraud => "Suspected fraud.",
            Self::SystemMalfunction => "System malfunction.",
            Self::UnknownFailure => "General/unknown failure.",
            Self::Unmapped(_) => "Unmapped gateway response code.",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<String> for ResponseCode {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<ResponseCode> for String {
    fn from(code: ResponseCode) -> Self {
        code.as_code().to_string()
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}
