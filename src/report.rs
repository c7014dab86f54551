// src/report.rs
//! Batch summary over analysis records: tier counts, priority leads,
//! product demand and the most asked-about topics. Pure; writes nothing.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analyze::products::NOT_SPECIFIED;
use crate::analyze::{AnalysisRecord, CustomerSegment, IntentTier, Timeframe};

/// Rows kept in the product demand table.
pub const DEMAND_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityLead {
    pub sender_id: String,
    pub primary_product: String,
    pub topics_formatted: String,
    pub intent_tier: IntentTier,
    pub intent_percent: String,
    pub timeframe: Timeframe,
    pub ready_to_buy: bool,
    pub customer_segment: CustomerSegment,
    pub reply_within: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub date: NaiveDate,
    pub total: usize,
    pub very_high: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub priority: Vec<PriorityLead>,
    pub product_demand: Vec<CountRow>,
    pub question_counts: Vec<CountRow>,
}

pub fn summarize(date: NaiveDate, records: &[AnalysisRecord]) -> BatchSummary {
    let tier_count = |tier: IntentTier| records.iter().filter(|r| r.intent_tier == tier).count();

    let mut leads: Vec<&AnalysisRecord> = records
        .iter()
        .filter(|r| matches!(r.intent_tier, IntentTier::High | IntentTier::VeryHigh))
        .collect();
    leads.sort_by(|a, b| {
        let a_top = a.intent_tier == IntentTier::VeryHigh;
        let b_top = b.intent_tier == IntentTier::VeryHigh;
        b_top
            .cmp(&a_top)
            .then(b.intent_score.total_cmp(&a.intent_score))
    });

    let priority = leads
        .into_iter()
        .map(|r| PriorityLead {
            sender_id: r.sender_id.clone(),
            primary_product: r.primary_product.clone(),
            topics_formatted: r.topics_formatted.clone(),
            intent_tier: r.intent_tier,
            intent_percent: r.intent_percent.clone(),
            timeframe: r.timeframe,
            ready_to_buy: r.ready_to_buy,
            customer_segment: r.customer_segment,
            reply_within: reply_within(r.intent_tier).to_string(),
        })
        .collect();

    let mut product_demand = count_rows(
        records
            .iter()
            .map(|r| r.primary_product.as_str())
            .filter(|p| *p != NOT_SPECIFIED),
    );
    product_demand.truncate(DEMAND_LIMIT);

    let question_counts = count_rows(
        records
            .iter()
            .flat_map(|r| r.topics_formatted.split(", "))
            .filter(|q| !q.is_empty()),
    );

    BatchSummary {
        date,
        total: records.len(),
        very_high: tier_count(IntentTier::VeryHigh),
        high: tier_count(IntentTier::High),
        medium: tier_count(IntentTier::Medium),
        low: tier_count(IntentTier::Low),
        priority,
        product_demand,
        question_counts,
    }
}

fn reply_within(tier: IntentTier) -> &'static str {
    if tier == IntentTier::VeryHigh {
        "30 minutes"
    } else {
        "2 hours"
    }
}

/// Count descending, then name ascending.
fn count_rows<'a>(names: impl Iterator<Item = &'a str>) -> Vec<CountRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for n in names {
        *counts.entry(n).or_default() += 1;
    }
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(name, count)| CountRow {
            name: name.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{Analyzer, MessageInput};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    #[test]
    fn empty_batch() {
        let s = summarize(day(), &[]);
        assert_eq!(s.total, 0);
        assert!(s.priority.is_empty());
        assert!(s.product_demand.is_empty());
    }

    #[test]
    fn tiers_priority_and_demand() {
        let a = Analyzer::with_builtin_catalog().unwrap();
        let inputs = vec![
            // price, ready, tomorrow, eager and urgency: clamps to 1.0
            MessageInput::new("a", "s24 ultra price? coming tomorrow"),
            // base + ready = 0.6
            MessageInput::new("b", "want to buy s24 ultra"),
            MessageInput::new("c", "hello"),
            MessageInput::new("d", "pixel 9 warranty"),
        ];
        let records = a.analyze_many(&inputs);
        let s = summarize(day(), &records);

        assert_eq!(s.total, 4);
        assert_eq!(s.very_high + s.high + s.medium + s.low, 4);
        assert_eq!(s.priority.len(), 2);
        assert_eq!(s.priority[0].sender_id, "a");
        assert_eq!(s.priority[0].reply_within, "30 minutes");
        assert_eq!(s.priority[1].sender_id, "b");
        assert_eq!(s.priority[1].reply_within, "2 hours");

        assert_eq!(
            s.product_demand[0],
            CountRow {
                name: "S24 Ultra".into(),
                count: 2
            }
        );
        assert_eq!(s.product_demand[1].name, "Pixel 9");
        assert!(s
            .question_counts
            .iter()
            .any(|q| q.name == "General Inquiry" && q.count == 2));
    }

    #[test]
    fn count_rows_break_ties_by_name() {
        let rows = count_rows(["b", "a", "b", "c", "a"].into_iter());
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
