// tests/batch_report.rs
//
// Inbox export -> pending inputs -> records -> daily summary.

use chrono::NaiveDate;
use dm_intent_triage::analyze::{Analyzer, CustomerSegment, IntentTier};
use dm_intent_triage::ingest::{self, InboundRecord};
use dm_intent_triage::report::{self, CountRow};

fn inbox() -> Vec<InboundRecord> {
    vec![
        InboundRecord::new("kasun", "iphone 16 pro max price? will come tomorrow"),
        InboundRecord::new("dilini", "ps5 available?"),
        InboundRecord::new("amal", "hi").processed(),
        InboundRecord::new("amal", "keep one s24 ultra for me"),
        InboundRecord::new("ruwan", "is it <i>original</i>?"),
        InboundRecord::new("kasun", "iphone 16 pro max color?"),
        InboundRecord::new("nuwan", "&nbsp;"),
    ]
}

#[test]
fn daily_batch_summary() {
    let inputs = ingest::pending(&inbox());
    assert_eq!(inputs.len(), 5);

    let records = Analyzer::with_builtin_catalog()
        .expect("built-in catalog compiles")
        .analyze_many(&inputs);
    let day = NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date");
    let s = report::summarize(day, &records);

    assert_eq!(s.total, 5);
    assert_eq!(
        (s.very_high, s.high, s.medium, s.low),
        (2, 0, 1, 2),
        "tiers: {:?}",
        records.iter().map(|r| r.intent_tier).collect::<Vec<_>>()
    );

    assert_eq!(s.priority.len(), 2);
    assert_eq!(s.priority[0].sender_id, "kasun");
    assert_eq!(s.priority[0].intent_percent, "100%");
    assert_eq!(s.priority[0].customer_segment, CustomerSegment::HotLead);
    assert_eq!(s.priority[1].sender_id, "amal");
    assert_eq!(s.priority[1].intent_percent, "95%");
    assert_eq!(s.priority[1].customer_segment, CustomerSegment::EngagedBuyer);
    assert!(s.priority.iter().all(|p| p.intent_tier == IntentTier::VeryHigh));
    assert!(s.priority.iter().all(|p| p.reply_within == "30 minutes"));

    assert_eq!(
        s.product_demand,
        vec![
            CountRow {
                name: "Iphone 16 Pro Max".into(),
                count: 2
            },
            CountRow {
                name: "Ps5".into(),
                count: 1
            },
            CountRow {
                name: "S24 Ultra".into(),
                count: 1
            },
        ]
    );

    assert_eq!(s.question_counts.len(), 6);
    assert!(s.question_counts.iter().all(|q| q.count == 1));
    assert_eq!(s.question_counts[0].name, "Availability");
}

#[test]
fn repeat_sender_in_one_batch_builds_history() {
    let inputs = ingest::pending(&inbox());
    let kasun: Vec<u32> = inputs
        .iter()
        .filter(|i| i.sender_id == "kasun")
        .map(|i| i.prior_processed_count)
        .collect();
    assert_eq!(kasun, vec![0, 1]);

    let records = Analyzer::with_builtin_catalog()
        .expect("built-in catalog compiles")
        .analyze_many(&inputs);
    let second = records
        .iter()
        .rfind(|r| r.sender_id == "kasun")
        .expect("second kasun record");
    assert_eq!(second.message_number, 2);
    assert_eq!(second.conversation_stage, "Follow-up");
    // 30 + one prior contact
    assert_eq!(second.intent_score, 0.35);
    assert_eq!(second.customer_segment, CustomerSegment::Browsing);
}

#[test]
fn summary_serializes_for_export() {
    let day = NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date");
    let s = report::summarize(day, &[]);
    let v = serde_json::to_value(&s).expect("serialize summary");
    assert_eq!(v["date"], "2025-01-05");
    assert_eq!(v["total"], 0);
    assert!(v["product_demand"].as_array().is_some_and(Vec::is_empty));
}
