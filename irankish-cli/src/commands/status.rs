//! Status command - show the effective configuration with secrets redacted

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use irankish_core::config::GatewayConfig;
use irankish_core::EnvelopeBuilder;

use crate::output;

use super::{get_config_dir, load_config};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    config_dir: String,
    terminal_id: String,
    pass_phrase: String,
    acceptor_id: String,
    public_key: String,
    revert_url: String,
    base_url: String,
    payment_url: String,
    ipg_url: String,
    timeout_secs: u64,
    connect_timeout_secs: u64,
    verify_tls: bool,
    rsa_padding: String,
    hex_case: String,
    ready: bool,
}

impl StatusReport {
    fn new(config_dir: String, config: &GatewayConfig) -> Self {
        let builder = EnvelopeBuilder::new(&config.credentials, config.rsa_padding, config.hex_case);
        let public_key = match &builder {
            Ok(builder) => format!("RSA {} bits", builder.modulus_len() * 8),
            Err(e) => format!("unusable: {}", e),
        };
        let pass_phrase = if config.credentials.pass_phrase.is_empty() {
            "(not set)".to_string()
        } else {
            format!("******** ({} chars)", config.credentials.pass_phrase.chars().count())
        };

        Self {
            config_dir,
            terminal_id: config.credentials.terminal_id.clone(),
            pass_phrase,
            acceptor_id: config.credentials.acceptor_id.clone(),
            public_key,
            revert_url: config.revert_url.clone(),
            base_url: config.endpoints.base_url.clone(),
            payment_url: config.endpoints.payment_url.clone(),
            ipg_url: config.endpoints.ipg_url.clone(),
            timeout_secs: config.http.timeout_secs,
            connect_timeout_secs: config.http.connect_timeout_secs,
            verify_tls: config.http.verify_tls,
            rsa_padding: config.rsa_padding.to_string(),
            hex_case: config.hex_case.to_string(),
            ready: builder.is_ok() && !config.credentials.acceptor_id.trim().is_empty(),
        }
    }
}

pub fn run(json: bool) -> Result<()> {
    let config_dir = get_config_dir()?;
    let config = load_config()?;
    let report = StatusReport::new(config_dir.display().to_string(), &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "IranKish Gateway Configuration".bold());
    println!();

    let mut table = output::create_table();
    let or_unset = |v: &str| if v.is_empty() { "(not set)".to_string() } else { v.to_string() };
    table.add_row(vec!["Config directory".to_string(), report.config_dir.clone()]);
    table.add_row(vec!["Terminal ID".to_string(), or_unset(&report.terminal_id)]);
    table.add_row(vec!["Pass-phrase".to_string(), report.pass_phrase.clone()]);
    table.add_row(vec!["Acceptor ID".to_string(), or_unset(&report.acceptor_id)]);
    table.add_row(vec!["Public key".to_string(), report.public_key.clone()]);
    table.add_row(vec!["Revert URL".to_string(), or_unset(&report.revert_url)]);
    table.add_row(vec!["API base URL".to_string(), report.base_url.clone()]);
    table.add_row(vec!["Payment URL".to_string(), report.payment_url.clone()]);
    table.add_row(vec!["IPG URL".to_string(), report.ipg_url.clone()]);
    table.add_row(vec![
        "Timeouts".to_string(),
        format!("{}s total, {}s connect", report.timeout_secs, report.connect_timeout_secs),
    ]);
    table.add_row(vec!["TLS verification".to_string(), report.verify_tls.to_string()]);
    table.add_row(vec!["RSA padding".to_string(), report.rsa_padding.clone()]);
    table.add_row(vec!["Hex case".to_string(), report.hex_case.clone()]);
    println!("{}", table);
    println!();

    if report.ready {
        output::success("Ready to talk to the gateway");
    } else {
        output::warning("Configuration incomplete: set the credentials in irankish.json or IRANKISH_* variables");
    }
    if !report.verify_tls {
        output::warning("TLS certificate verification is disabled");
    }

    Ok(())
}
