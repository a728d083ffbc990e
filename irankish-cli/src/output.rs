//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

use irankish_core::GatewayReply;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Key-value table of the fields a gateway reply usually carries
pub fn reply_table(reply: &GatewayReply) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Field", "Value"]);

    let code = format!("{} ({})", reply.response_code, reply.response_code.description());
    table.add_row(vec!["Response code".to_string(), code]);
    if let Some(description) = &reply.description {
        table.add_row(vec!["Description".to_string(), description.clone()]);
    }

    let fields = [
        ("Token", reply.token()),
        ("RRN", reply.rrn()),
        ("STAN", reply.stan()),
        ("Amount", reply.amount().map(|a| format!("{} Rials", a))),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            table.add_row(vec![name.to_string(), value]);
        }
    }

    table
}
