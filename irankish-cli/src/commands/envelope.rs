//! Envelope command - build an authentication envelope offline

use anyhow::Result;

use irankish_core::domain::EnvelopeMode;
use irankish_core::{EnvelopeBuilder, SplitEntry};

use crate::output;

use super::{emit_json, load_config};

pub fn run(amount: i64, splits: Vec<SplitEntry>, json: bool) -> Result<()> {
    let config = load_config()?;

    let mode = if splits.is_empty() {
        EnvelopeMode::Plain
    } else {
        EnvelopeMode::Multiplex(&splits)
    };
    let result = EnvelopeBuilder::new(&config.credentials, config.rsa_padding, config.hex_case)
        .and_then(|builder| builder.build(amount, mode));

    if json {
        return emit_json(result);
    }

    let envelope = result?;
    let padding = config.rsa_padding.to_string();
    let mut table = output::create_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["mode", mode.marker()]);
    table.add_row(vec!["padding", padding.as_str()]);
    table.add_row(vec!["iv", envelope.iv.as_str()]);
    table.add_row(vec!["data", envelope.data.as_str()]);
    println!("{}", table);

    output::warning("Each envelope carries a fresh key; do not reuse it for another request.");

    Ok(())
}
