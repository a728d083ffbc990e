//! Redirect hand-off to the IranKish payment page
//!
//! The core only describes where the buyer goes; rendering the HTML form or
//! issuing the HTTP redirect belongs to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::result::{Error, Result};

/// Where to send the buyer once a token is granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RedirectTarget {
    /// Auto-submitted POST form carrying `tokenIdentity`
    #[serde(rename_all = "camelCase")]
    PostForm {
        url: String,
        method: String,
        fields: BTreeMap<String, String>,
    },
    /// Plain GET to `<payment-url>?token=<token>`
    Query { url: String },
}

impl RedirectTarget {
    pub fn post_form(ipg_url: &str, token: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("tokenIdentity".to_string(), token.to_string());
        Self::PostForm {
            url: ipg_url.to_string(),
            method: "POST".to_string(),
            fields,
        }
    }

    pub fn query(payment_url: &str, token: &str) -> Result<Self> {
        let mut url = Url::parse(payment_url)
            .map_err(|e| Error::Config(format!("invalid payment URL '{}': {}", payment_url, e)))?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(Self::Query { url: url.into() })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::PostForm { url, .. } | Self::Query { url } => url,
        }
    }
}
