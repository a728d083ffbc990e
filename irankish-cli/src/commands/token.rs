//! Token command - request a payment token

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use irankish_core::{SpecialTokenOptions, SplitEntry, TokenOptions, TransactionType};

use super::{emit_json, get_context};

#[derive(Args)]
pub struct TokenArgs {
    /// Amount in Rials
    amount: i64,
    /// Transaction type (Purchase, Bill, AsanShpWPP, SpecialBill, AsanShpWPPDrug, IsacoWPP)
    #[arg(long = "type", default_value = "Purchase")]
    transaction_type: TransactionType,
    /// Merchant payment id shown on the receipt
    #[arg(long)]
    payment_id: Option<String>,
    /// Request id (up to 20 characters; generated when omitted)
    #[arg(long)]
    request_id: Option<String>,
    /// Callback URL (defaults to the configured revertUrl)
    #[arg(long)]
    revert_uri: Option<String>,
    /// Bill information as a JSON object
    #[arg(long)]
    bill_info: Option<String>,
    /// Settlement split as IBAN:AMOUNT (repeatable)
    #[arg(long = "split", conflicts_with = "special")]
    splits: Vec<SplitEntry>,
    /// Use the special-merchant tokenization endpoint
    #[arg(long)]
    special: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TokenArgs) -> Result<()> {
    let ctx = get_context()?;

    let bill_info = args
        .bill_info
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--bill-info must be valid JSON")?;

    let result = if args.special {
        ctx.client.request_special_token(
            args.amount,
            args.transaction_type,
            SpecialTokenOptions {
                bill_info,
                payment_id: args.payment_id,
                request_id: args.request_id,
                revert_uri: args.revert_uri,
                ..Default::default()
            },
        )
    } else {
        ctx.client.request_token(
            args.amount,
            args.transaction_type,
            TokenOptions {
                bill_info,
                payment_id: args.payment_id,
                request_id: args.request_id,
                revert_uri: args.revert_uri,
                multiplex_parameters: (!args.splits.is_empty()).then_some(args.splits),
                ..Default::default()
            },
        )
    };

    if args.json {
        return emit_json(result);
    }

    let grant = result?;
    println!("\n{} Token granted\n", "✓".green());
    println!("  Token:       {}", grant.token.bold());
    println!("  Request id:  {}", grant.request_id);
    println!("  Type:        {}", grant.transaction_type);
    println!("  Payment URL: {}", ctx.client.redirect_form(&grant.token).url().dimmed());
    println!();

    Ok(())
}
