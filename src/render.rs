//! Server-rendered HTML for receipt snapshots and the admin listing.
//!
//! The markup is static enough that plain string assembly costs less than a
//! template engine would.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::db::models::Transaction;

/// Fixed offset applied when rendering gateway timestamps (Nairobi, UTC+3).
const LOCAL_UTC_OFFSET_HOURS: i64 = 3;

/// Everything a rendered receipt shows, captured at the moment the charge
/// reached success. The snapshot is stored verbatim, so later changes to the
/// transaction row never alter an issued receipt.
pub struct ReceiptData<'a> {
    pub reference: &'a str,
    pub email: Option<&'a str>,
    pub amount: Decimal,
    pub currency: Option<&'a str>,
    pub channel: Option<&'a str>,
    /// Bank name or mobile money number from the gateway's authorization
    /// object, when present.
    pub paid_via: Option<String>,
    pub status: &'a str,
    pub paid_at: DateTime<Utc>,
    pub receipt_number: String,
}

pub fn receipt_content(data: &ReceiptData) -> String {
    let paid_at_local = data.paid_at + Duration::hours(LOCAL_UTC_OFFSET_HOURS);
    let email = match data.email {
        Some(email) => mask_email(email),
        None => "-".to_string(),
    };
    let channel = match data.channel {
        Some(channel) => channel.replace('_', " "),
        None => "-".to_string(),
    };

    let mut lines = vec![
        "<div class=\"receipt\">".to_string(),
        "<h2>Payment Receipt</h2>".to_string(),
        format!("<p>Receipt no: {}</p>", escape_html(&data.receipt_number)),
        format!("<p>Reference: {}</p>", escape_html(data.reference)),
        format!("<p>Status: {}</p>", escape_html(data.status)),
        format!("<p>Email: {}</p>", escape_html(&email)),
        format!(
            "<p>Amount: {} {}</p>",
            data.amount,
            escape_html(data.currency.unwrap_or("-"))
        ),
        format!("<p>Channel: {}</p>", escape_html(&channel)),
    ];
    if let Some(paid_via) = &data.paid_via {
        lines.push(format!("<p>Paid via: {}</p>", escape_html(paid_via)));
    }
    lines.push(format!(
        "<p>Paid at: {} (UTC+03:00)</p>",
        paid_at_local.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push("</div>".to_string());

    lines.join("\n")
}

pub fn admin_page(transactions: &[Transaction]) -> String {
    let mut rows = String::new();
    for tx in transactions {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            tx.id,
            escape_html(&tx.reference),
            escape_html(tx.email.as_deref().unwrap_or("-")),
            tx.amount,
            escape_html(tx.currency.as_deref().unwrap_or("")),
            tx.status,
            escape_html(tx.channel.as_deref().unwrap_or("-")),
            tx.created_at.format("%Y-%m-%d %H:%M:%S"),
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Transactions</title>\n<style>\nbody {{ font-family: sans-serif; margin: 2em; }}\ntable {{ border-collapse: collapse; }}\ntd, th {{ border: 1px solid #ccc; padding: 6px 10px; }}\n</style>\n</head>\n<body>\n<h1>Transactions</h1>\n<p>{} most recent, newest first.</p>\n<table>\n<tr><th>id</th><th>reference</th><th>email</th><th>amount</th><th>status</th><th>channel</th><th>created (UTC)</th></tr>\n{}</table>\n</body>\n</html>\n",
        transactions.len(),
        rows
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Keeps the first two characters of the local part and the full domain.
/// Short local parts are masked whole rather than leaked.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let kept: String = local.chars().take(2).collect();
            if kept.chars().count() < local.chars().count() {
                format!("{kept}****@{domain}")
            } else {
                format!("****@{domain}")
            }
        }
        None => "****".to_string(),
    }
}
