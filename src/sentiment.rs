use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analyze::ml_adapter::MlAugmenter;
use crate::analyze::phrases::{normalize, PhraseSet};
use crate::catalog::{CatalogStore, WeightedTerm};

pub const SENTIMENT_MIN: f32 = -10.0;
pub const SENTIMENT_MAX: f32 = 10.0;
pub const URGENCY_MAX: u8 = 10;

const MODEL_BLEND: f32 = 0.7;
const KEYWORD_BLEND: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Very Positive")]
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    #[serde(rename = "Very Negative")]
    VeryNegative,
}

impl SentimentLabel {
    /// `>3` very positive, `>0` positive, `<-3` very negative, `<0` negative.
    pub fn from_score(score: f32) -> Self {
        if score > 3.0 {
            SentimentLabel::VeryPositive
        } else if score > 0.0 {
            SentimentLabel::Positive
        } else if score < -3.0 {
            SentimentLabel::VeryNegative
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, SentimentLabel::VeryPositive | SentimentLabel::Positive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryPositive => "Very Positive",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::VeryNegative => "Very Negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyLabel {
    #[serde(rename = "Extreme Urgency")]
    Extreme,
    #[serde(rename = "High Urgency")]
    High,
    #[serde(rename = "Medium Urgency")]
    Medium,
    #[serde(rename = "Low Urgency")]
    Low,
    #[serde(rename = "Not Specified")]
    NotSpecified,
}

impl UrgencyLabel {
    pub fn score(&self) -> u8 {
        match self {
            UrgencyLabel::Extreme => 10,
            UrgencyLabel::High => 8,
            UrgencyLabel::Medium => 5,
            UrgencyLabel::Low => 2,
            UrgencyLabel::NotSpecified => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLabel::Extreme => "Extreme Urgency",
            UrgencyLabel::High => "High Urgency",
            UrgencyLabel::Medium => "Medium Urgency",
            UrgencyLabel::Low => "Low Urgency",
            UrgencyLabel::NotSpecified => "Not Specified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallSignal {
    #[serde(rename = "Strong Buy Signal")]
    StrongBuy,
    #[serde(rename = "Good Signal")]
    Good,
    #[serde(rename = "Neutral Signal")]
    Neutral,
    #[serde(rename = "Weak Signal")]
    Weak,
    #[serde(rename = "Poor Signal")]
    Poor,
}

impl OverallSignal {
    /// `urgency + (sentiment + 10) / 4`, `+3` eager, `-2` doubtful, clamped to [0, 10].
    pub fn combine(sentiment: f32, urgency: u8, eager: bool, doubtful: bool) -> Self {
        let mut signal = f32::from(urgency) + (sentiment + 10.0) / 4.0;
        if eager {
            signal += 3.0;
        }
        if doubtful {
            signal -= 2.0;
        }
        let signal = signal.clamp(0.0, 10.0);

        if signal >= 8.0 {
            OverallSignal::StrongBuy
        } else if signal >= 6.0 {
            OverallSignal::Good
        } else if signal >= 4.0 {
            OverallSignal::Neutral
        } else if signal >= 2.0 {
            OverallSignal::Weak
        } else {
            OverallSignal::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallSignal::StrongBuy => "Strong Buy Signal",
            OverallSignal::Good => "Good Signal",
            OverallSignal::Neutral => "Neutral Signal",
            OverallSignal::Weak => "Weak Signal",
            OverallSignal::Poor => "Poor Signal",
        }
    }
}

macro_rules! display_via_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}
display_via_as_str!(SentimentLabel, UrgencyLabel, OverallSignal);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// In [-10, 10].
    pub score: f32,
    pub urgency: UrgencyLabel,
    /// In [0, 10].
    pub urgency_score: u8,
    pub is_eager: bool,
    pub has_doubts: bool,
    pub overall_signal: OverallSignal,
}

impl SentimentResult {
    /// What an empty message scores.
    pub fn neutral() -> Self {
        Self::assemble(0.0, UrgencyLabel::NotSpecified, false, false)
    }

    fn assemble(score: f32, urgency: UrgencyLabel, is_eager: bool, has_doubts: bool) -> Self {
        let score = score.clamp(SENTIMENT_MIN, SENTIMENT_MAX);
        let urgency_score = urgency.score();
        Self {
            label: SentimentLabel::from_score(score),
            score,
            urgency,
            urgency_score,
            is_eager,
            has_doubts,
            overall_signal: OverallSignal::combine(score, urgency_score, is_eager, has_doubts),
        }
    }
}

#[derive(Debug, Clone)]
struct WeightedPhrase {
    phrase: String,
    weight: f32,
}

fn weighted(terms: &[WeightedTerm]) -> Vec<WeightedPhrase> {
    terms
        .iter()
        .map(|t| WeightedPhrase {
            phrase: normalize(&t.term),
            weight: t.weight,
        })
        .filter(|w| !w.phrase.is_empty())
        .collect()
}

/// Bilingual lexicon scorer for sentiment, urgency, eagerness and doubt.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    positive: Vec<WeightedPhrase>,
    negative: Vec<WeightedPhrase>,
    extreme: PhraseSet,
    high: PhraseSet,
    medium: PhraseSet,
    low: PhraseSet,
    eagerness: PhraseSet,
    doubt: PhraseSet,
    ml: MlAugmenter,
}

impl SentimentAnalyzer {
    pub fn new(catalog: &CatalogStore) -> Self {
        let lex = &catalog.sentiment;
        let urgency = &catalog.urgency;
        Self {
            positive: weighted(&lex.positive),
            negative: weighted(&lex.negative),
            extreme: PhraseSet::new(&urgency.extreme),
            high: PhraseSet::new(&urgency.high),
            medium: PhraseSet::new(&urgency.medium),
            low: PhraseSet::new(&urgency.low),
            eagerness: PhraseSet::new(&lex.eagerness),
            doubt: PhraseSet::new(&lex.doubt),
            ml: MlAugmenter::disabled(),
        }
    }

    pub fn with_augmenter(mut self, ml: MlAugmenter) -> Self {
        self.ml = ml;
        self
    }

    pub fn score(&self, text: &str) -> SentimentResult {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return SentimentResult::neutral();
        }

        let keyword = self.keyword_score(&normalized);
        let score = match self.ml.polarity(text) {
            Some(p) => MODEL_BLEND * p.signed_score() + KEYWORD_BLEND * keyword,
            None => keyword,
        };

        SentimentResult::assemble(
            score,
            self.urgency(&normalized),
            self.eagerness.any_in(&normalized),
            self.doubt.any_in(&normalized),
        )
    }

    /// Σ positive − Σ negative over contained terms, clamped.
    pub fn keyword_score(&self, normalized: &str) -> f32 {
        let sum = |terms: &[WeightedPhrase]| -> f32 {
            terms
                .iter()
                .filter(|t| normalized.contains(t.phrase.as_str()))
                .map(|t| t.weight)
                .sum()
        };
        (sum(&self.positive) - sum(&self.negative)).clamp(SENTIMENT_MIN, SENTIMENT_MAX)
    }

    /// Highest matching tier wins, so the label always agrees with the
    /// score. Low only when nothing else fired.
    pub fn urgency(&self, normalized: &str) -> UrgencyLabel {
        if self.extreme.any_in(normalized) {
            return UrgencyLabel::Extreme;
        }
        if self.high.any_in(normalized) {
            return UrgencyLabel::High;
        }
        if self.medium.any_in(normalized) {
            return UrgencyLabel::Medium;
        }
        if self.low.any_in(normalized) {
            return UrgencyLabel::Low;
        }
        UrgencyLabel::NotSpecified
    }
}
