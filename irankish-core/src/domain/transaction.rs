//! Transaction domain models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::result::{Error, Result};
use super::ResponseCode;

/// Largest amount representable in the 12-digit base string field
pub const MAX_AMOUNT: i64 = 999_999_999_999;

/// Maximum length of a tokenization `requestId`
pub const MAX_REQUEST_ID_LEN: usize = 20;

/// Transaction types accepted by the tokenization endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    #[serde(rename = "Purchase")]
    Purchase,
    #[serde(rename = "Bill")]
    Bill,
    /// EasyBuy with prepayment
    #[serde(rename = "AsanShpWPP")]
    EasyBuyPrepay,
    /// Bill with confirmation
    #[serde(rename = "SpecialBill")]
    SpecialBill,
    #[serde(rename = "AsanShpWPPDrug")]
    EasyBuyPrepayDrug,
    /// ISACO credit purchase
    #[serde(rename = "IsacoWPP")]
    IsacoCredit,
}

impl TransactionType {
    pub const ALL: [TransactionType; 6] = [
        Self::Purchase,
        Self::Bill,
        Self::EasyBuyPrepay,
        Self::SpecialBill,
        Self::EasyBuyPrepayDrug,
        Self::IsacoCredit,
    ];

    /// Wire string the gateway expects in `transactionType`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "Purchase",
            Self::Bill => "Bill",
            Self::EasyBuyPrepay => "AsanShpWPP",
            Self::SpecialBill => "SpecialBill",
            Self::EasyBuyPrepayDrug => "AsanShpWPPDrug",
            Self::IsacoCredit => "IsacoWPP",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    /// Accepts the wire string or the Rust variant name, case-insensitively
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| {
                t.as_str().eq_ignore_ascii_case(s) || format!("{:?}", t).eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| format!("unknown transaction type: {}", s))
    }
}

/// One recipient of a split ("multiplex") settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEntry {
    pub iban: String,
    pub amount: i64,
}

impl SplitEntry {
    pub fn new(iban: impl Into<String>, amount: i64) -> Self {
        Self {
            iban: iban.into(),
            amount,
        }
    }
}

impl FromStr for SplitEntry {
    type Err = String;

    /// Parses `IBAN:AMOUNT`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (iban, amount) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected IBAN:AMOUNT, got '{}'", s))?;
        let amount = amount
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid split amount '{}': {}", amount, e))?;
        Ok(Self::new(iban.trim(), amount))
    }
}

/// Optional fields for `tokenization/make`
///
/// Every `None` is left out of the wire payload.
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    pub bill_info: Option<JsonValue>,
    pub payment_id: Option<String>,
    pub request_id: Option<String>,
    pub request_timestamp: Option<i64>,
    pub revert_uri: Option<String>,
    /// Split settlement; switches the envelope to multiplex mode
    pub multiplex_parameters: Option<Vec<SplitEntry>>,
    pub additional_parameters: Option<JsonValue>,
    pub cms_preservation_id: Option<String>,
    pub asan_shp: Option<JsonValue>,
    pub is_behdad_transaction: Option<bool>,
}

/// Optional fields for `tokenization/makeSpecial`
#[derive(Debug, Clone, Default)]
pub struct SpecialTokenOptions {
    pub bill_info: Option<JsonValue>,
    pub payment_id: Option<String>,
    pub request_id: Option<String>,
    pub request_timestamp: Option<i64>,
    pub revert_uri: Option<String>,
    pub additional_parameters: Option<JsonValue>,
    pub cms_preservation_id: Option<String>,
}

impl From<SpecialTokenOptions> for TokenOptions {
    fn from(options: SpecialTokenOptions) -> Self {
        Self {
            bill_info: options.bill_info,
            payment_id: options.payment_id,
            request_id: options.request_id,
            request_timestamp: options.request_timestamp,
            revert_uri: options.revert_uri,
            additional_parameters: options.additional_parameters,
            cms_preservation_id: options.cms_preservation_id,
            ..Default::default()
        }
    }
}

/// Lookup mode for `inquiry/single`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FindOption {
    ByRetrievalReferenceNumber = 1,
    ByTokenIdentity = 2,
    ByRequestId = 3,
}

impl From<FindOption> for u8 {
    fn from(option: FindOption) -> Self {
        option as u8
    }
}

impl TryFrom<u8> for FindOption {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ByRetrievalReferenceNumber),
            2 => Ok(Self::ByTokenIdentity),
            3 => Ok(Self::ByRequestId),
            other => Err(format!("findOption must be 1, 2 or 3, got {}", other)),
        }
    }
}

/// Inquiry criteria
///
/// `find_option` selects which identifier is sent. Exactly that identifier
/// must be set; [`InquiryCriteria::validate`] enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryCriteria {
    pub find_option: FindOption,
    pub retrieval_reference_number: Option<String>,
    pub token_identity: Option<String>,
    pub request_id: Option<String>,
    /// Overrides the configured pass-phrase for this lookup
    pub pass_phrase: Option<String>,
}

impl InquiryCriteria {
    fn empty(find_option: FindOption) -> Self {
        Self {
            find_option,
            retrieval_reference_number: None,
            token_identity: None,
            request_id: None,
            pass_phrase: None,
        }
    }

    pub fn by_rrn(rrn: impl Into<String>) -> Self {
        Self {
            retrieval_reference_number: Some(rrn.into()),
            ..Self::empty(FindOption::ByRetrievalReferenceNumber)
        }
    }

    pub fn by_token(token: impl Into<String>) -> Self {
        Self {
            token_identity: Some(token.into()),
            ..Self::empty(FindOption::ByTokenIdentity)
        }
    }

    pub fn by_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            ..Self::empty(FindOption::ByRequestId)
        }
    }

    pub fn with_pass_phrase(mut self, pass_phrase: impl Into<String>) -> Self {
        self.pass_phrase = Some(pass_phrase.into());
        self
    }

    /// Returns the identifier selected by `find_option`
    pub fn validate(&self) -> Result<&str> {
        let fields = [
            (FindOption::ByRetrievalReferenceNumber, "retrievalReferenceNumber", &self.retrieval_reference_number),
            (FindOption::ByTokenIdentity, "tokenIdentity", &self.token_identity),
            (FindOption::ByRequestId, "requestId", &self.request_id),
        ];

        let mut selected = None;
        for (option, name, value) in fields {
            let value = value.as_deref().filter(|v| !v.trim().is_empty());
            if option == self.find_option {
                selected = Some(value.ok_or_else(|| {
                    Error::invalid_query(format!("findOption {} requires {}", option as u8, name))
                })?);
            } else if value.is_some() {
                return Err(Error::invalid_query(format!(
                    "{} must not be set when findOption is {}",
                    name, self.find_option as u8
                )));
            }
        }

        selected.ok_or_else(|| Error::invalid_query("no identifier selected"))
    }
}

/// Token granted by `tokenization/make` or `tokenization/makeSpecial`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub token: String,
    pub transaction_type: TransactionType,
    pub request_id: String,
    pub raw: JsonValue,
}

/// Success-coded gateway reply from confirm, reverse or inquiry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayReply {
    pub response_code: ResponseCode,
    pub description: Option<String>,
    pub result: Option<JsonValue>,
    pub raw: JsonValue,
}

impl GatewayReply {
    /// Look a field up in `result`, falling back to the top level
    fn field(&self, name: &str) -> Option<&JsonValue> {
        self.result
            .as_ref()
            .and_then(|r| r.get(name))
            .or_else(|| self.raw.get(name))
            .filter(|v| !v.is_null())
    }

    fn string_field(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.string_field("token")
            .or_else(|| self.string_field("tokenIdentity"))
    }

    pub fn rrn(&self) -> Option<String> {
        self.string_field("retrievalReferenceNumber")
    }

    pub fn stan(&self) -> Option<String> {
        self.string_field("systemTraceAuditNumber")
    }

    pub fn amount(&self) -> Option<i64> {
        match self.field("amount")? {
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
