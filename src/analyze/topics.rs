//! Multi-label topic tagging by keyword containment.

use serde::{Deserialize, Serialize};

use super::phrases::{normalize, PhraseSet};
use crate::catalog::{CatalogStore, UrgencyTier};

pub const GENERAL_INQUIRY: &str = "General Inquiry";
pub const GENERAL_INQUIRY_PRIORITY: u32 = 99;

/// Topics shown in `format`.
const FORMAT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMatch {
    pub name: String,
    pub priority: u32,
    pub urgency: UrgencyTier,
}

impl TopicMatch {
    pub fn general_inquiry() -> Self {
        Self {
            name: GENERAL_INQUIRY.to_string(),
            priority: GENERAL_INQUIRY_PRIORITY,
            urgency: UrgencyTier::Low,
        }
    }
}

#[derive(Debug, Clone)]
struct TopicRule {
    name: String,
    priority: u32,
    urgency: UrgencyTier,
    keywords: PhraseSet,
}

#[derive(Debug, Clone)]
pub struct TopicTagger {
    rules: Vec<TopicRule>,
}

impl TopicTagger {
    pub fn new(catalog: &CatalogStore) -> Self {
        let rules = catalog
            .topics
            .iter()
            .map(|t| TopicRule {
                name: t.name.clone(),
                priority: t.priority,
                urgency: t.urgency,
                keywords: PhraseSet::new(&t.keywords),
            })
            .collect();
        Self { rules }
    }

    /// Every topic with a contained keyword, ascending priority (stable).
    /// Never empty.
    pub fn tag(&self, text: &str) -> Vec<TopicMatch> {
        let text = normalize(text);
        let mut found: Vec<TopicMatch> = self
            .rules
            .iter()
            .filter(|r| r.keywords.any_in(&text))
            .map(|r| TopicMatch {
                name: r.name.clone(),
                priority: r.priority,
                urgency: r.urgency,
            })
            .collect();

        if found.is_empty() {
            return vec![TopicMatch::general_inquiry()];
        }
        found.sort_by_key(|t| t.priority);
        found
    }
}

/// First three names joined with ", ".
pub fn format(topics: &[TopicMatch]) -> String {
    if topics.is_empty() {
        return GENERAL_INQUIRY.to_string();
    }
    topics
        .iter()
        .take(FORMAT_LIMIT)
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Highest urgency tier present.
pub fn rollup_urgency(topics: &[TopicMatch]) -> UrgencyTier {
    topics
        .iter()
        .map(|t| t.urgency)
        .max()
        .unwrap_or(UrgencyTier::Low)
}

pub fn primary(topics: &[TopicMatch]) -> &str {
    topics
        .first()
        .map(|t| t.name.as_str())
        .unwrap_or(GENERAL_INQUIRY)
}

/// Number of matched topics carrying high urgency.
pub fn high_urgency_count(topics: &[TopicMatch]) -> usize {
    topics
        .iter()
        .filter(|t| t.urgency == UrgencyTier::High)
        .count()
}
