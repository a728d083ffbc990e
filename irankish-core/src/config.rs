//! Configuration management
//!
//! Settings live in `irankish.json` inside the configuration directory:
//! ```json
//! {
//!   "terminalId": "12345678",
//!   "passPhrase": "...16 chars...",
//!   "acceptorId": "992180001234",
//!   "publicKey": "/etc/irankish/public.pem",
//!   "revertUrl": "https://shop.example/irankish/callback",
//!   "endpoints": { "baseUrl": "https://ikc.shaparak.ir/api/v3" },
//!   "http": { "timeoutSecs": 20, "connectTimeoutSecs": 10, "verifyTls": true },
//!   "rsaPadding": "pkcs1",
//!   "hexCase": "upper"
//! }
//! ```
//! Every field can be overridden with an `IRANKISH_*` environment variable.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{Credentials, HexCase, RsaPadding};

pub const SETTINGS_FILE: &str = "irankish.json";

pub const DEFAULT_BASE_URL: &str = "https://ikc.shaparak.ir/api/v3";
pub const DEFAULT_PAYMENT_URL: &str = "https://ikc.shaparak.ir/TPayment/Payment/Index";
pub const DEFAULT_IPG_URL: &str = "https://ikc.shaparak.ir/iuiv3/IPG/Index/";

const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Gateway endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoints {
    /// API root; operation paths are appended to it
    pub base_url: String,
    /// Query-string redirect target (`?token=...`)
    pub payment_url: String,
    /// POST-form redirect target
    pub ipg_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            payment_url: DEFAULT_PAYMENT_URL.to_string(),
            ipg_url: DEFAULT_IPG_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Absolute URL of an API operation path such as `tokenization/make`
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Outbound HTTP policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub verify_tls: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            verify_tls: true,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Gateway configuration
///
/// Loaded once and passed by value into the client; nothing in the core
/// reads the environment after this point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Default `revertUri` for tokenization
    pub revert_url: String,
    pub endpoints: Endpoints,
    pub http: HttpSettings,
    pub rsa_padding: RsaPadding,
    pub hex_case: HexCase,
}

impl GatewayConfig {
    /// Load config from a configuration directory
    ///
    /// Reads `irankish.json` when present, then applies `IRANKISH_*`
    /// environment overrides and resolves the public key.
    pub fn load(config_dir: &Path) -> Result<Self> {
        Self::load_with_env(config_dir, |name| std::env::var(name).ok())
    }

    /// Same as [`GatewayConfig::load`] with an explicit variable lookup
    pub fn load_with_env<F>(config_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings_path = config_dir.join(SETTINGS_FILE);

        let mut config: GatewayConfig = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("invalid {}: {}", settings_path.display(), e))
            })?
        } else {
            GatewayConfig::default()
        };

        config.apply_env(|name| env(name).filter(|v| !v.trim().is_empty()))?;
        config.credentials.public_key = resolve_public_key(&config.credentials.public_key, config_dir)?;
        config.validate()?;

        tracing::debug!(
            terminal_id = %config.credentials.terminal_id,
            base_url = %config.endpoints.base_url,
            "loaded gateway configuration"
        );

        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("IRANKISH_TERMINAL_ID") {
            self.credentials.terminal_id = v;
        }
        if let Some(v) = env("IRANKISH_PASSWORD") {
            self.credentials.pass_phrase = v;
        }
        if let Some(v) = env("IRANKISH_ACCEPTOR_ID") {
            self.credentials.acceptor_id = v;
        }
        if let Some(v) = env("IRANKISH_PUBLIC_KEY") {
            self.credentials.public_key = v;
        }
        if let Some(v) = env("IRANKISH_REVERT_URL") {
            self.revert_url = v;
        }
        if let Some(v) = env("IRANKISH_BASE_URL") {
            self.endpoints.base_url = v;
        }
        if let Some(v) = env("IRANKISH_PAYMENT_URL") {
            self.endpoints.payment_url = v;
        }
        if let Some(v) = env("IRANKISH_IPG_URL") {
            self.endpoints.ipg_url = v;
        }
        if let Some(v) = env("IRANKISH_RSA_PADDING") {
            self.rsa_padding = v.parse().map_err(Error::Config)?;
        }
        if let Some(v) = env("IRANKISH_HEX_CASE") {
            self.hex_case = v.parse().map_err(Error::Config)?;
        }
        if let Some(v) = env("IRANKISH_TIMEOUT_SECS") {
            self.http.timeout_secs = parse_secs("IRANKISH_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env("IRANKISH_CONNECT_TIMEOUT_SECS") {
            self.http.connect_timeout_secs = parse_secs("IRANKISH_CONNECT_TIMEOUT_SECS", &v)?;
        }
        // Case-insensitive
        if let Some(v) = env("IRANKISH_VERIFY_TLS") {
            self.http.verify_tls = match v.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(Error::Config(format!(
                        "IRANKISH_VERIFY_TLS must be true or false, got '{}'",
                        v
                    )))
                }
            };
        }
        Ok(())
    }

    /// Check the settings the transport and redirects depend on
    ///
    /// Terminal id, pass-phrase and key are checked by the envelope builder.
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            return Err(Error::Config("HTTP timeouts must be greater than zero".to_string()));
        }
        for (name, value) in [
            ("baseUrl", &self.endpoints.base_url),
            ("paymentUrl", &self.endpoints.payment_url),
            ("ipgUrl", &self.endpoints.ipg_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::Config(format!("invalid {} '{}': {}", name, value, e)))?;
        }
        Ok(())
    }

    /// Write the settings file back to the configuration directory
    ///
    /// The public key is written as resolved PEM text.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a whole number of seconds, got '{}'", name, value)))
}

/// Accept PEM text, or a path to a PEM file (relative paths resolve against
/// the configuration directory)
pub fn resolve_public_key(value: &str, config_dir: &Path) -> Result<String> {
    let value = value.trim();
    if value.is_empty() || value.contains("-----BEGIN") {
        // Single-line env values often carry escaped newlines
        return Ok(value.replace("\\n", "\n"));
    }

    let path = Path::new(value);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    };

    if !path.is_file() {
        return Err(Error::Config(format!(
            "public key is neither PEM text nor a readable file: {}",
            path.display()
        )));
    }

    Ok(std::fs::read_to_string(&path)?)
}
