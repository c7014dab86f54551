//! Purchase intent: timeframe, readiness, and the composite score.
//!
//! The composite is accumulated in integer hundredths (points) and divided
//! once at the end, so tier boundaries such as exactly 0.60 are exact.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::phrases::{normalize, PhraseSet};
use super::topics::{high_urgency_count, TopicMatch};
use crate::catalog::CatalogStore;
use crate::sentiment::SentimentResult;

const BASE_POINTS: u32 = 30;
const HIGH_TOPIC_POINTS: u32 = 15;
const READY_POINTS: u32 = 30;
const IMMINENT_POINTS: u32 = 25;
const LATER_POINTS: u32 = 10;
const HISTORY_POINTS_PER_CONTACT: u32 = 5;
const HISTORY_POINTS_CAP: u32 = 15;
const POSITIVE_POINTS: u32 = 10;
const EAGER_POINTS: u32 = 15;
const URGENCY_POINTS_PER_UNIT: u32 = 2;
const URGENCY_POINTS_CAP: u32 = 20;
const MAX_POINTS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    Today,
    Tomorrow,
    #[serde(rename = "This Weekend")]
    ThisWeekend,
    #[serde(rename = "Next Week")]
    NextWeek,
    #[serde(rename = "This Month")]
    ThisMonth,
    #[serde(rename = "Not specified")]
    NotSpecified,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Today => "Today",
            Timeframe::Tomorrow => "Tomorrow",
            Timeframe::ThisWeekend => "This Weekend",
            Timeframe::NextWeek => "Next Week",
            Timeframe::ThisMonth => "This Month",
            Timeframe::NotSpecified => "Not specified",
        }
    }

    pub fn is_imminent(&self) -> bool {
        matches!(self, Timeframe::Today | Timeframe::Tomorrow)
    }

    pub fn is_specified(&self) -> bool {
        *self != Timeframe::NotSpecified
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentTier {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl IntentTier {
    /// Inclusive lower bounds: 0.8 / 0.6 / 0.4.
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            IntentTier::VeryHigh
        } else if score >= 0.6 {
            IntentTier::High
        } else if score >= 0.4 {
            IntentTier::Medium
        } else {
            IntentTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentTier::Low => "Low",
            IntentTier::Medium => "Medium",
            IntentTier::High => "High",
            IntentTier::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for IntentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    /// In [0, 1].
    pub score: f32,
    pub tier: IntentTier,
}

impl IntentResult {
    fn from_points(points: u32) -> Self {
        let score = points.min(MAX_POINTS) as f32 / MAX_POINTS as f32;
        Self {
            score,
            tier: IntentTier::from_score(score),
        }
    }

    pub fn percent(&self) -> String {
        format!("{:.0}%", self.score * 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct IntentScorer {
    timeframes: Vec<(Timeframe, PhraseSet)>,
    readiness: PhraseSet,
}

impl IntentScorer {
    pub fn new(catalog: &CatalogStore) -> Self {
        let tf = &catalog.timeframes;
        Self {
            timeframes: vec![
                (Timeframe::Today, PhraseSet::new(&tf.today)),
                (Timeframe::Tomorrow, PhraseSet::new(&tf.tomorrow)),
                (Timeframe::ThisWeekend, PhraseSet::new(&tf.this_weekend)),
                (Timeframe::NextWeek, PhraseSet::new(&tf.next_week)),
                (Timeframe::ThisMonth, PhraseSet::new(&tf.this_month)),
            ],
            readiness: PhraseSet::new(&catalog.intent.readiness),
        }
    }

    /// First bucket (Today -> This Month) with a contained keyword.
    pub fn timeframe(&self, text: &str) -> Timeframe {
        let text = normalize(text);
        self.timeframes
            .iter()
            .find(|(_, phrases)| phrases.any_in(&text))
            .map(|(tf, _)| *tf)
            .unwrap_or(Timeframe::NotSpecified)
    }

    pub fn ready_to_buy(&self, text: &str) -> bool {
        self.readiness.any_in(&normalize(text))
    }

    /// Composite purchase-intent score; see the module docs for precision.
    pub fn score(
        &self,
        topics: &[TopicMatch],
        ready_to_buy: bool,
        timeframe: Timeframe,
        prior_count: u32,
        sentiment: &SentimentResult,
        urgency_modifier_score: u8,
    ) -> IntentResult {
        let mut points = BASE_POINTS;

        let high_topics = u32::try_from(high_urgency_count(topics)).unwrap_or(u32::MAX);
        points += high_topics.saturating_mul(HIGH_TOPIC_POINTS).min(MAX_POINTS);

        if ready_to_buy {
            points += READY_POINTS;
        }

        if timeframe.is_imminent() {
            points += IMMINENT_POINTS;
        } else if timeframe.is_specified() {
            points += LATER_POINTS;
        }

        points += prior_count
            .saturating_mul(HISTORY_POINTS_PER_CONTACT)
            .min(HISTORY_POINTS_CAP);

        if sentiment.label.is_positive() {
            points += POSITIVE_POINTS;
        } else if sentiment.is_eager {
            points += EAGER_POINTS;
        }

        points += (u32::from(urgency_modifier_score) * URGENCY_POINTS_PER_UNIT)
            .min(URGENCY_POINTS_CAP);

        IntentResult::from_points(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::topics::TopicTagger;

    fn scorer() -> IntentScorer {
        IntentScorer::new(&CatalogStore::builtin())
    }

    fn none() -> Vec<TopicMatch> {
        vec![TopicMatch::general_inquiry()]
    }

    #[test]
    fn timeframe_scan_order() {
        let s = scorer();
        assert_eq!(s.timeframe("tomorrow or today"), Timeframe::Today);
        assert_eq!(s.timeframe("tmrw pls"), Timeframe::Tomorrow);
        assert_eq!(s.timeframe("on saturday"), Timeframe::ThisWeekend);
        assert_eq!(s.timeframe("next week"), Timeframe::NextWeek);
        assert_eq!(s.timeframe("this month"), Timeframe::ThisMonth);
        assert_eq!(s.timeframe(""), Timeframe::NotSpecified);
    }

    #[test]
    fn readiness_phrases() {
        let s = scorer();
        assert!(s.ready_to_buy("I will come to the shop"));
        assert!(s.ready_to_buy("ගන්නම්"));
        assert!(!s.ready_to_buy("just looking"));
    }

    #[test]
    fn base_score_is_low() {
        let n = SentimentResult::neutral();
        let r = scorer().score(&none(), false, Timeframe::NotSpecified, 0, &n, 0);
        assert_eq!(r.score, 0.3);
        assert_eq!(r.tier, IntentTier::Low);
        assert_eq!(r.percent(), "30%");
    }

    #[test]
    fn every_contribution_adds_up_and_clamps() {
        let s = scorer();
        let topics = TopicTagger::new(&CatalogStore::builtin()).tag("price? keep one");
        let mut sentiment = SentimentResult::neutral();
        sentiment.is_eager = true;
        let r = s.score(&topics, true, Timeframe::Today, 10, &sentiment, 10);
        assert_eq!(r.score, 1.0);
        assert_eq!(r.tier, IntentTier::VeryHigh);
        assert_eq!(r.percent(), "100%");
    }

    #[test]
    fn positive_sentiment_shadows_eagerness() {
        let s = scorer();
        let mut sentiment = SentimentResult::neutral();
        sentiment.label = crate::sentiment::SentimentLabel::Positive;
        sentiment.is_eager = true;
        let r = s.score(&none(), false, Timeframe::NotSpecified, 0, &sentiment, 0);
        assert_eq!(r.score, 0.4);
    }

    #[test]
    fn history_and_urgency_are_capped() {
        let s = scorer();
        let n = SentimentResult::neutral();
        let r = s.score(&none(), false, Timeframe::NotSpecified, u32::MAX, &n, u8::MAX);
        // 30 + 15 + 20
        assert_eq!(r.score, 0.65);
    }

    #[test]
    fn later_timeframe_adds_less() {
        let s = scorer();
        let n = SentimentResult::neutral();
        let r = s.score(&none(), false, Timeframe::ThisMonth, 0, &n, 0);
        assert_eq!(r.score, 0.4);
        assert_eq!(r.tier, IntentTier::Medium);
    }

    #[test]
    fn tier_thresholds_are_inclusive() {
        assert_eq!(IntentTier::from_score(0.8), IntentTier::VeryHigh);
        assert_eq!(IntentTier::from_score(0.79), IntentTier::High);
        assert_eq!(IntentTier::from_score(0.6), IntentTier::High);
        assert_eq!(IntentTier::from_score(0.59), IntentTier::Medium);
        assert_eq!(IntentTier::from_score(0.4), IntentTier::Medium);
        assert_eq!(IntentTier::from_score(0.39), IntentTier::Low);
    }
}
