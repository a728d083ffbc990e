//! Reverse command - undo a transaction that must not settle

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use crate::output;

use super::{emit_json, get_context};

pub fn run(token: &str, rrn: &str, stan: &str, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    // Confirm reversal unless --force
    if !force {
        eprintln!("\n{}", format!("This will reverse transaction RRN {}.", rrn).yellow());
        eprintln!("{}\n", "The buyer's money is returned and the sale is void.".dimmed());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            eprintln!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let result = ctx.client.reverse(token, rrn, stan);

    if json {
        return emit_json(result);
    }

    let reply = result?;
    output::success(&format!("\nTransaction {} reversed\n", rrn));
    println!("{}", output::reply_table(&reply));
    println!();

    Ok(())
}
