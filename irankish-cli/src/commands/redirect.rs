//! Redirect command - show the hand-off to the payment page

use anyhow::Result;

use irankish_core::RedirectTarget;

use crate::output;

use super::{emit_json, load_config};

pub fn run(token: &str, query: bool, json: bool) -> Result<()> {
    let config = load_config()?;

    let result = if query {
        RedirectTarget::query(&config.endpoints.payment_url, token)
    } else {
        Ok(RedirectTarget::post_form(&config.endpoints.ipg_url, token))
    };

    if json {
        return emit_json(result);
    }

    match result? {
        RedirectTarget::Query { url } => println!("{}", url),
        RedirectTarget::PostForm { url, method, fields } => {
            output::info(&format!("{} {}", method, url));
            let mut table = output::create_table();
            table.set_header(vec!["Field", "Value"]);
            for (name, value) in fields {
                table.add_row(vec![name, value]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
