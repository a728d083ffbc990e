//! Transaction client - the four gateway operations
//!
//! Standard flow:
//!   1. `request_token` → token for the payment page
//!   2. `redirect_form` / `redirect_url` → buyer pays on the IranKish page
//!   3. `confirm` with the token, RRN and STAN from the callback
//!   (optional) `reverse` / `inquiry`
//!
//! The client keeps no state between calls. Every identifier linking the
//! calls (token, RRN, STAN, request id) is supplied by the caller.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::config::GatewayConfig;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Envelope, EnvelopeMode, FindOption, GatewayReply, InquiryCriteria, RedirectTarget,
    ResponseCode, SpecialTokenOptions, SplitEntry, TokenGrant, TokenOptions, TransactionType,
    MAX_REQUEST_ID_LEN,
};
use crate::ports::HttpTransport;

use super::envelope::EnvelopeBuilder;

pub const TOKENIZE_PATH: &str = "tokenization/make";
pub const SPECIAL_TOKENIZE_PATH: &str = "tokenization/makeSpecial";
pub const CONFIRM_PATH: &str = "confirmation/purchase";
pub const REVERSE_PATH: &str = "confirmation/reversePurchase";
pub const INQUIRY_PATH: &str = "inquiry/single";

// =============================================================================
// Wire payloads
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeBody<'a> {
    authentication_envelope: &'a Envelope,
    request: TokenizeRequest<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeRequest<'a> {
    acceptor_id: &'a str,
    amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    bill_info: Option<&'a JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_id: Option<&'a str>,
    request_id: &'a str,
    request_timestamp: i64,
    revert_uri: &'a str,
    terminal_id: &'a str,
    transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    multiplex_parameters: Option<&'a [SplitEntry]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_parameters: Option<&'a JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cms_preservation_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asan_shp: Option<&'a JsonValue>,
    #[serde(rename = "isbehdadtransaction", skip_serializing_if = "Option::is_none")]
    is_behdad_transaction: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationBody<'a> {
    terminal_id: &'a str,
    retrieval_reference_number: &'a str,
    system_trace_audit_number: &'a str,
    token_identity: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InquiryBody<'a> {
    terminal_id: &'a str,
    pass_phrase: &'a str,
    find_option: FindOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    retrieval_reference_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_identity: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

// =============================================================================
// TransactionClient
// =============================================================================

/// IranKish transaction client
///
/// Safe to share between threads when the transport is; it only holds the
/// immutable configuration and the envelope builder.
pub struct TransactionClient<T: HttpTransport> {
    config: GatewayConfig,
    envelopes: EnvelopeBuilder,
    transport: T,
}

impl<T: HttpTransport> TransactionClient<T> {
    /// Create a client, validating credentials and the public key up front
    pub fn new(config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;
        if config.credentials.acceptor_id.trim().is_empty() {
            return Err(Error::invalid_credential("acceptor id is required"));
        }
        let envelopes = EnvelopeBuilder::new(&config.credentials, config.rsa_padding, config.hex_case)?;

        Ok(Self {
            config,
            envelopes,
            transport,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn envelope_builder(&self) -> &EnvelopeBuilder {
        &self.envelopes
    }

    /// Request a payment token (`tokenization/make`)
    ///
    /// When `options.multiplex_parameters` is set the envelope is built in
    /// multiplex mode from the same splits that go on the wire.
    pub fn request_token(
        &self,
        amount: i64,
        transaction_type: TransactionType,
        options: TokenOptions,
    ) -> Result<TokenGrant> {
        let mode = match options.multiplex_parameters.as_deref() {
            Some(splits) => EnvelopeMode::Multiplex(splits),
            None => EnvelopeMode::Plain,
        };
        self.tokenize("tokenize", TOKENIZE_PATH, amount, transaction_type, mode, &options)
    }

    /// Request a token for special merchants (`tokenization/makeSpecial`)
    pub fn request_special_token(
        &self,
        amount: i64,
        transaction_type: TransactionType,
        options: SpecialTokenOptions,
    ) -> Result<TokenGrant> {
        let options = TokenOptions::from(options);
        self.tokenize(
            "special_tokenize",
            SPECIAL_TOKENIZE_PATH,
            amount,
            transaction_type,
            EnvelopeMode::Plain,
            &options,
        )
    }

    fn tokenize(
        &self,
        operation: &'static str,
        path: &str,
        amount: i64,
        transaction_type: TransactionType,
        mode: EnvelopeMode<'_>,
        options: &TokenOptions,
    ) -> Result<TokenGrant> {
        let request_id = match options.request_id.as_deref() {
            Some(id) => validate_request_id(id)?.to_string(),
            None => generate_request_id(),
        };

        let revert_uri = options
            .revert_uri
            .as_deref()
            .unwrap_or(&self.config.revert_url);
        if revert_uri.trim().is_empty() {
            return Err(Error::Config(
                "revertUri is required: pass one or configure revertUrl".to_string(),
            ));
        }

        let envelope = self.envelopes.build(amount, mode)?;

        let body = TokenizeBody {
            authentication_envelope: &envelope,
            request: TokenizeRequest {
                acceptor_id: &self.config.credentials.acceptor_id,
                amount,
                bill_info: options.bill_info.as_ref(),
                payment_id: options.payment_id.as_deref(),
                request_id: &request_id,
                request_timestamp: options
                    .request_timestamp
                    .unwrap_or_else(|| chrono::Utc::now().timestamp()),
                revert_uri,
                terminal_id: &self.config.credentials.terminal_id,
                transaction_type,
                multiplex_parameters: options.multiplex_parameters.as_deref(),
                additional_parameters: options.additional_parameters.as_ref(),
                cms_preservation_id: options.cms_preservation_id.as_deref(),
                asan_shp: options.asan_shp.as_ref(),
                is_behdad_transaction: options.is_behdad_transaction,
            },
        };
        let payload = serde_json::to_value(&body)?;

        tracing::debug!(
            operation,
            request_id = %request_id,
            amount,
            transaction_type = %transaction_type,
            "requesting token"
        );

        let reply = self.post(operation, path, &payload)?;

        let token = reply
            .result
            .as_ref()
            .and_then(|r| r.get("token"))
            .and_then(JsonValue::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string);

        let Some(token) = token else {
            tracing::warn!(operation, request_id = %request_id, "success response without token");
            return Err(Error::TokenMissing);
        };

        Ok(TokenGrant {
            token,
            transaction_type,
            request_id,
            raw: reply.raw,
        })
    }

    /// Confirm (settle) a paid transaction after the buyer returns
    pub fn confirm(&self, token: &str, rrn: &str, stan: &str) -> Result<GatewayReply> {
        self.confirmation("confirm", CONFIRM_PATH, token, rrn, stan)
    }

    /// Reverse a transaction that must not settle
    pub fn reverse(&self, token: &str, rrn: &str, stan: &str) -> Result<GatewayReply> {
        self.confirmation("reverse", REVERSE_PATH, token, rrn, stan)
    }

    fn confirmation(
        &self,
        operation: &'static str,
        path: &str,
        token: &str,
        rrn: &str,
        stan: &str,
    ) -> Result<GatewayReply> {
        let payload = serde_json::to_value(ConfirmationBody {
            terminal_id: &self.config.credentials.terminal_id,
            retrieval_reference_number: rrn,
            system_trace_audit_number: stan,
            token_identity: token,
        })?;

        tracing::debug!(operation, rrn, stan, "sending confirmation");
        self.post(operation, path, &payload)
    }

    /// Look a single transaction up by RRN, token or request id
    ///
    /// The criteria are checked before anything is sent.
    pub fn inquiry(&self, criteria: &InquiryCriteria) -> Result<GatewayReply> {
        let identifier = criteria.validate()?;
        let pass_phrase = criteria
            .pass_phrase
            .as_deref()
            .unwrap_or(&self.config.credentials.pass_phrase);

        let pick = |option: FindOption| (criteria.find_option == option).then_some(identifier);
        let payload = serde_json::to_value(InquiryBody {
            terminal_id: &self.config.credentials.terminal_id,
            pass_phrase,
            find_option: criteria.find_option,
            retrieval_reference_number: pick(FindOption::ByRetrievalReferenceNumber),
            token_identity: pick(FindOption::ByTokenIdentity),
            request_id: pick(FindOption::ByRequestId),
        })?;

        tracing::debug!(operation = "inquiry", find_option = criteria.find_option as u8, "sending inquiry");
        self.post("inquiry", INQUIRY_PATH, &payload)
    }

    /// POST-form hand-off to the payment page
    pub fn redirect_form(&self, token: &str) -> RedirectTarget {
        RedirectTarget::post_form(&self.config.endpoints.ipg_url, token)
    }

    /// Query-string hand-off to the payment page
    pub fn redirect_url(&self, token: &str) -> Result<RedirectTarget> {
        RedirectTarget::query(&self.config.endpoints.payment_url, token)
    }

    fn post(&self, operation: &'static str, path: &str, payload: &JsonValue) -> Result<GatewayReply> {
        let url = self.config.endpoints.url(path);
        tracing::info!(operation, %url, "calling gateway");

        let response = self
            .transport
            .post_json(&url, payload, self.config.http.timeout())
            .map_err(|e| {
                tracing::warn!(operation, %url, error = %e, "gateway unreachable");
                Error::GatewayUnreachable(e.to_string())
            })?;

        if !response.is_success() {
            tracing::warn!(operation, %url, status = response.status, "gateway HTTP error");
            return Err(Error::GatewayHttpError {
                status: response.status,
                body: response.body,
            });
        }

        interpret_response(&response.body).map_err(|e| {
            if let Some(code) = e.gateway_code() {
                tracing::warn!(operation, code = %code, "gateway rejected request");
            }
            e
        })
    }
}

/// Interpret a gateway response body
///
/// Shared by every operation: `00` is success, any other code is a
/// [`Error::GatewayRejected`] carrying the mapped code and the gateway's
/// description (or the code table's when the gateway sent none).
pub fn interpret_response(body: &str) -> Result<GatewayReply> {
    let raw: JsonValue = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("body is not JSON: {}", e)))?;

    let code = match raw.get("responseCode") {
        Some(JsonValue::String(code)) => ResponseCode::from_code(code),
        Some(JsonValue::Number(n)) => match n.as_u64() {
            Some(n) => ResponseCode::from_code(&format!("{:02}", n)),
            None => return Err(Error::MalformedResponse(format!("responseCode {} is not a code", n))),
        },
        _ => return Err(Error::MalformedResponse("missing responseCode".to_string())),
    };

    let description = raw
        .get("description")
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    if !code.is_success() {
        return Err(Error::GatewayRejected {
            description: description.unwrap_or_else(|| code.description().to_string()),
            code,
        });
    }

    let result = raw.get("result").filter(|r| !r.is_null()).cloned();

    Ok(GatewayReply {
        response_code: code,
        description,
        result,
        raw,
    })
}

/// 20 hex characters from 10 CSPRNG bytes
pub fn generate_request_id() -> String {
    let mut bytes = [0u8; MAX_REQUEST_ID_LEN / 2];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn validate_request_id(request_id: &str) -> Result<&str> {
    let len = request_id.chars().count();
    if request_id.trim().is_empty() || len > MAX_REQUEST_ID_LEN {
        return Err(Error::InvalidRequestId(format!(
            "requestId must be 1 to {} characters, got {}",
            MAX_REQUEST_ID_LEN, len
        )));
    }
    Ok(request_id)
}
