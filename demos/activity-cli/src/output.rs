//! Terminal output for records returned by the API

use console::style;
use iaconnector::{Record, TokenPair};
use serde_json::Value;

/// Print the tokens of a fresh login so they can be reused
pub fn print_tokens(tokens: &TokenPair) {
    println!();
    println!("{}", style("Logged in").green().bold());
    if let Some(access) = &tokens.access_token {
        println!("  access token: {access}");
    }
    if let Some(renew) = &tokens.renew_token {
        println!("  renew token:  {renew}");
    }
    if let Some(expires_at) = tokens.expires_at {
        println!("  expires at:   {}", expires_at.to_rfc3339());
    }
    println!();
}

fn field<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(*key))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One line per activity
pub fn print_activities(activities: &[Record]) {
    if activities.is_empty() {
        println!("{}", style("No activities in this period").dim());
        return;
    }

    for activity in activities {
        let id = field(activity, &["id"]).map(display).unwrap_or_default();
        let title = field(activity, &["title", "summary", "name"])
            .map(display)
            .unwrap_or_else(|| "(untitled)".to_string());
        let begin = field(activity, &["beginDate", "begin"])
            .map(display)
            .unwrap_or_default();

        println!(
            "{:>6}  {}  {}",
            style(id).dim(),
            style(begin).cyan(),
            style(title).bold()
        );
    }
}

/// All fields of a record, nested values as JSON
pub fn print_record(title: &str, record: &Record) {
    println!("{}", style(title).bold().underlined());
    let width = record.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in record {
        println!("  {}  {}", style(format!("{key:width$}")).dim(), display(value));
    }
}
