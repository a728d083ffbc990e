//! Inquiry command - look up a single transaction

use anyhow::Result;
use clap::{ArgGroup, Args};

use irankish_core::InquiryCriteria;

use crate::output;

use super::{emit_json, get_context};

#[derive(Args)]
#[command(group(
    ArgGroup::new("lookup")
        .required(true)
        .args(["rrn", "token", "request_id"]),
))]
pub struct InquiryArgs {
    /// Find by retrieval reference number
    #[arg(long)]
    rrn: Option<String>,
    /// Find by token identity
    #[arg(long)]
    token: Option<String>,
    /// Find by request id
    #[arg(long)]
    request_id: Option<String>,
    /// Pass-phrase to use instead of the configured one
    #[arg(long)]
    pass_phrase: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl InquiryArgs {
    fn criteria(&self) -> Option<InquiryCriteria> {
        let criteria = match (&self.rrn, &self.token, &self.request_id) {
            (Some(rrn), None, None) => InquiryCriteria::by_rrn(rrn),
            (None, Some(token), None) => InquiryCriteria::by_token(token),
            (None, None, Some(request_id)) => InquiryCriteria::by_request_id(request_id),
            _ => return None,
        };
        Some(match &self.pass_phrase {
            Some(pass_phrase) => criteria.with_pass_phrase(pass_phrase),
            None => criteria,
        })
    }
}

pub fn run(args: InquiryArgs) -> Result<()> {
    // ArgGroup guarantees exactly one identifier
    let Some(criteria) = args.criteria() else {
        anyhow::bail!("Pass exactly one of --rrn, --token or --request-id");
    };

    let ctx = get_context()?;
    let result = ctx.client.inquiry(&criteria);

    if args.json {
        return emit_json(result);
    }

    let reply = result?;
    println!("{}", output::reply_table(&reply));

    Ok(())
}
