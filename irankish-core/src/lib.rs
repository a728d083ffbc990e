//! IranKish Core - Client for the IranKish (IKC) card-payment gateway
//!
//! This crate implements the gateway protocol following hexagonal architecture:
//!
//! - **domain**: Protocol entities (Credentials, Envelope, ResponseCode, etc.)
//! - **ports**: Trait definitions for external dependencies (HttpTransport)
//! - **services**: Envelope construction and the transaction client
//! - **adapters**: Concrete implementations (reqwest)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::Path;

use adapters::ReqwestTransport;
use config::GatewayConfig;

// Re-export commonly used types at crate root
pub use domain::{
    Credentials, Envelope, FindOption, GatewayReply, InquiryCriteria, RedirectTarget,
    ResponseCode, SpecialTokenOptions, SplitEntry, TokenGrant, TokenOptions, TransactionType,
};
pub use domain::result::{Error, Result, TransactionResult};
pub use services::{EnvelopeBuilder, TransactionClient};

/// Main context for IranKish operations
///
/// Holds the loaded configuration and a client wired to the reqwest transport.
pub struct GatewayContext {
    pub config: GatewayConfig,
    pub client: TransactionClient<ReqwestTransport>,
}

impl GatewayContext {
    /// Load configuration from `config_dir` and build the client
    pub fn new(config_dir: &Path) -> Result<Self> {
        let config = GatewayConfig::load(config_dir)?;
        let transport = ReqwestTransport::new(&config.http)?;
        let client = TransactionClient::new(config.clone(), transport)?;

        Ok(Self { config, client })
    }
}
