//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ResponseCode;

/// Core library error type
///
/// The first group is raised while building the authentication envelope, the
/// second by the transaction protocol. None of them are retried internally.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid split set: {0}")]
    InvalidSplitSet(String),

    #[error("Crypto operation failed: {0}")]
    CryptoOperationFailed(String),

    #[error("Gateway unreachable: {0}")]
    GatewayUnreachable(String),

    #[error("Gateway HTTP error: HTTP {status}")]
    GatewayHttpError { status: u16, body: String },

    #[error("Gateway rejected the request ({code}): {description}")]
    GatewayRejected {
        code: ResponseCode,
        description: String,
    },

    #[error("Gateway reported success but returned no token")]
    TokenMissing,

    #[error("Invalid inquiry: {0}")]
    InvalidQuery(String),

    #[error("Invalid request id: {0}")]
    InvalidRequestId(String),

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_credential(msg: impl Into<String>) -> Self {
        Self::InvalidCredential(msg.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn invalid_split_set(msg: impl Into<String>) -> Self {
        Self::InvalidSplitSet(msg.into())
    }

    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::CryptoOperationFailed(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Stable name of the failure kind, used in serialized results
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredential(_) => "invalidCredential",
            Self::InvalidAmount(_) => "invalidAmount",
            Self::InvalidPublicKey(_) => "invalidPublicKey",
            Self::InvalidSplitSet(_) => "invalidSplitSet",
            Self::CryptoOperationFailed(_) => "cryptoOperationFailed",
            Self::GatewayUnreachable(_) => "gatewayUnreachable",
            Self::GatewayHttpError { .. } => "gatewayHttpError",
            Self::GatewayRejected { .. } => "gatewayRejected",
            Self::TokenMissing => "tokenMissing",
            Self::InvalidQuery(_) => "invalidQuery",
            Self::InvalidRequestId(_) => "invalidRequestId",
            Self::MalformedResponse(_) => "malformedResponse",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// Gateway response code, for rejections
    pub fn gateway_code(&self) -> Option<&ResponseCode> {
        match self {
            Self::GatewayRejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of one gateway call, in serializable form
///
/// `Success` is only ever produced from an `Ok`, so a caller holding a
/// `Success` always has the usable data (token, confirmation fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransactionResult<T> {
    Success {
        data: T,
    },
    #[serde(rename_all = "camelCase")]
    Failure {
        kind: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        description: String,
    },
}

impl<T> TransactionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }
}

impl<T> From<Result<T>> for TransactionResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::Success { data },
            Err(Error::GatewayRejected { code, description }) => Self::Failure {
                kind: "gatewayRejected".to_string(),
                code: Some(code.as_code().to_string()),
                description,
            },
            Err(e) => Self::Failure {
                kind: e.kind().to_string(),
                code: None,
                description: e.to_string(),
            },
        }
    }
}
