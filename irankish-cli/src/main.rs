//! IranKish CLI - card payments from your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{confirm, envelope, inquiry, redirect, reverse, status, token};

/// ikc - talk to the IranKish payment gateway
#[derive(Parser)]
#[command(name = "ikc", version, about, long_about = None)]
struct Cli {
    /// Log protocol details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a payment token
    Token(token::TokenArgs),

    /// Confirm a paid transaction
    Confirm {
        /// Token identity from tokenization
        token: String,
        /// Retrieval reference number from the callback
        rrn: String,
        /// System trace audit number from the callback
        stan: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reverse a transaction
    Reverse {
        /// Token identity from tokenization
        token: String,
        /// Retrieval reference number from the callback
        rrn: String,
        /// System trace audit number from the callback
        stan: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up a single transaction
    Inquiry(inquiry::InquiryArgs),

    /// Show where to send the buyer for a token
    Redirect {
        /// Token identity from tokenization
        token: String,
        /// Print the query-string URL instead of the POST form
        #[arg(long)]
        query: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build an authentication envelope without calling the gateway
    Envelope {
        /// Amount in Rials
        amount: i64,
        /// Settlement split as IBAN:AMOUNT (repeatable)
        #[arg(long = "split")]
        splits: Vec<irankish_core::SplitEntry>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Token(args) => token::run(args),
        Commands::Confirm { token, rrn, stan, json } => confirm::run(&token, &rrn, &stan, json),
        Commands::Reverse { token, rrn, stan, force, json } => {
            reverse::run(&token, &rrn, &stan, force, json)
        }
        Commands::Inquiry(args) => inquiry::run(args),
        Commands::Redirect { token, query, json } => redirect::run(&token, query, json),
        Commands::Envelope { amount, splits, json } => envelope::run(amount, splits, json),
        Commands::Status { json } => status::run(json),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_token_with_splits() {
        let cli = Cli::try_parse_from([
            "ikc", "token", "10000", "--type", "bill",
            "--split", "IR000000000000000000000001:6000",
            "--split", "IR000000000000000000000002:4000",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Token(_)));
    }

    #[test]
    fn test_split_rejected_with_special() {
        let result = Cli::try_parse_from([
            "ikc", "token", "10000", "--special", "--split", "IR01:1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inquiry_needs_exactly_one_identifier() {
        assert!(Cli::try_parse_from(["ikc", "inquiry"]).is_err());
        assert!(Cli::try_parse_from(["ikc", "inquiry", "--rrn", "1", "--token", "T"]).is_err());
        assert!(Cli::try_parse_from(["ikc", "inquiry", "--request-id", "abc"]).is_ok());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["ikc", "status", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }
}
