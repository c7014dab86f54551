// src/ingest/mod.rs
//! Inbound message rows: text cleanup, per-sender history counts and
//! selection of the rows still waiting for analysis.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::analyze::MessageInput;

/// Length cap for a cleaned message, in chars.
pub const MAX_MESSAGE_CHARS: usize = 1500;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("valid tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// One inbound row as exported from the inbox sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRecord {
    pub username: String,
    pub message: String,
    /// Unparseable cells become `None`.
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<DateTime<Utc>>,
    /// Product named by the ad the message came from.
    #[serde(default)]
    pub post_product: Option<String>,
    /// Sheet exports write "Yes"/"No"; booleans work too.
    #[serde(default, deserialize_with = "yes_no_flag")]
    pub processed: bool,
}

/// RFC 3339, then `YYYY-MM-DD HH:MM:SS`, then a bare date at midnight UTC.
pub fn parse_sheet_date(cell: &str) -> Option<DateTime<Utc>> {
    let cell = cell.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => parse_sheet_date(&s),
        _ => None,
    })
}

fn yes_no_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
        Value::Number(n) => n.as_u64() == Some(1),
        _ => false,
    })
}

impl InboundRecord {
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
            date: None,
            post_product: None,
            processed: false,
        }
    }

    pub fn processed(mut self) -> Self {
        self.processed = true;
        self
    }

    pub fn with_post_product(mut self, product: impl Into<String>) -> Self {
        self.post_product = Some(product.into());
        self
    }
}

/// Decode entities, strip tags, straighten curly quotes, collapse whitespace.
/// Punctuation is kept: aliases such as "s24+" depend on it.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let out = html_escape::decode_html_entities(s);

    // 2) Strip HTML tags
    let out = RE_TAGS.replace_all(&out, "");

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    let out = RE_WS.replace_all(&out, " ");
    let out = out.trim();

    // 5) Length cap
    if out.chars().count() > MAX_MESSAGE_CHARS {
        return out.chars().take(MAX_MESSAGE_CHARS).collect();
    }
    out.to_string()
}

/// Processed rows per (trimmed) username.
pub fn prior_counts(records: &[InboundRecord]) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for r in records.iter().filter(|r| r.processed) {
        *counts.entry(r.username.trim().to_string()).or_default() += 1;
    }
    counts
}

/// Unprocessed rows with a non-blank message, in input order.
///
/// A sender's earlier pending rows in the same batch count toward the history
/// of their later rows, the same as if the batch were processed row by row.
pub fn pending(records: &[InboundRecord]) -> Vec<MessageInput> {
    let mut counts = prior_counts(records);
    let mut out = Vec::new();
    let mut skipped = 0u64;

    for r in records.iter().filter(|r| !r.processed) {
        let text = normalize_text(&r.message);
        if text.is_empty() {
            skipped += 1;
            continue;
        }
        let sender = r.username.trim().to_string();
        let seen = counts.entry(sender.clone()).or_default();
        let prior = *seen;
        *seen += 1;

        out.push(MessageInput {
            sender_id: sender,
            text,
            ad_context_product: r
                .post_product
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            prior_processed_count: prior,
        });
    }

    if skipped > 0 {
        counter!("triage_ingest_skipped_total").increment(skipped);
    }
    out
}
