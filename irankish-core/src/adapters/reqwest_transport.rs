//! Blocking reqwest transport for the IranKish API
//!
//! One pooled client per process. The connect timeout and TLS policy are fixed
//! at construction; the total timeout is applied per request.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value as JsonValue;

use crate::config::HttpSettings;
use crate::domain::result::{Error, Result};
use crate::ports::{HttpResponse, HttpTransport, TransportError};

/// [`HttpTransport`] backed by `reqwest::blocking`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        if !settings.verify_tls {
            tracing::warn!("TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.timeout())
            .danger_accept_invalid_certs(!settings.verify_tls)
            .user_agent(concat!("irankish-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn map_request_error(&self, error: reqwest::Error, timeout: Duration) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(format!("no answer within {} seconds", timeout.as_secs_f32()))
        } else if error.is_connect() {
            TransportError::Connect(format!("unable to connect to IranKish: {}", error))
        } else {
            TransportError::Other(error.to_string())
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_json(
        &self,
        url: &str,
        payload: &JsonValue,
        timeout: Duration,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .map_err(|e| self.map_request_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| self.map_request_error(e, timeout))?;

        tracing::debug!(%url, status, bytes = body.len(), "gateway answered");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_gateway::{test_config, MockConfig, MockGatewayServer};
    use crate::domain::{InquiryCriteria, ResponseCode, TokenOptions, TransactionType};
    use crate::services::TransactionClient;

    fn client_for(server: &MockGatewayServer) -> TransactionClient<ReqwestTransport> {
        let mut config = test_config(&server.base_url());
        config.http.timeout_secs = 1;
        let transport = ReqwestTransport::new(&config.http).unwrap();
        TransactionClient::new(config, transport).unwrap()
    }

    #[test]
    fn test_token_over_http() {
        let server = MockGatewayServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);

        let grant = client
            .request_token(10000, TransactionType::Purchase, TokenOptions::default())
            .unwrap();
        assert_eq!(grant.token, "FAKETOKEN123");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/v3/tokenization/make");
        assert_eq!(requests[0].body["request"]["terminalId"], "12345678");
        assert_eq!(requests[0].body["request"]["amount"], 10000);
        assert!(requests[0].body["authenticationEnvelope"]["data"].is_string());
    }

    #[test]
    fn test_confirm_over_http() {
        let server = MockGatewayServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server);

        let reply = client.confirm("FAKETOKEN123", "123456789012", "123456").unwrap();
        assert_eq!(reply.rrn().as_deref(), Some("123456789012"));
        assert_eq!(reply.stan().as_deref(), Some("123456"));
        assert_eq!(server.requests()[0].path, "/api/v3/confirmation/purchase");
    }

    #[test]
    fn test_rejection_over_http() {
        let server = MockGatewayServer::start(MockConfig {
            response_code: "12".to_string(),
            description: "Invalid Terminal ID".to_string(),
            ..Default::default()
        })
        .unwrap();
        let client = client_for(&server);

        let result = client.inquiry(&InquiryCriteria::by_rrn("123456789012"));
        assert!(matches!(
            result,
            Err(Error::GatewayRejected { code: ResponseCode::InvalidTransaction, .. })
        ));
    }

    #[test]
    fn test_server_error_status() {
        let server = MockGatewayServer::start(MockConfig {
            status: 500,
            ..Default::default()
        })
        .unwrap();
        let client = client_for(&server);

        let result = client.request_token(10000, TransactionType::Purchase, TokenOptions::default());
        match result {
            Err(Error::GatewayHttpError { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("Internal"));
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn test_slow_gateway_times_out() {
        let server = MockGatewayServer::start(MockConfig {
            delay_ms: 2500,
            ..Default::default()
        })
        .unwrap();
        let client = client_for(&server);

        let result = client.request_token(10000, TransactionType::Purchase, TokenOptions::default());
        assert!(matches!(result, Err(Error::GatewayUnreachable(_))));
    }

    #[test]
    fn test_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = test_config(&format!("http://127.0.0.1:{}/api/v3", port));
        let transport = ReqwestTransport::new(&config.http).unwrap();
        let client = TransactionClient::new(config, transport).unwrap();

        let result = client.confirm("T", "1", "2");
        assert!(matches!(result, Err(Error::GatewayUnreachable(_))));
    }
}
