//! Confirm command - settle a paid transaction

use anyhow::Result;
use colored::Colorize;

use crate::output;

use super::{emit_json, get_context};

pub fn run(token: &str, rrn: &str, stan: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.client.confirm(token, rrn, stan);

    if json {
        return emit_json(result);
    }

    let reply = result?;
    println!("\n{} Transaction confirmed\n", "✓".green());
    println!("{}", output::reply_table(&reply));
    println!();

    Ok(())
}
