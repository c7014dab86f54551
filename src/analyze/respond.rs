//! Reply planning: how fast, in what tone, with which action.

use serde::{Deserialize, Serialize};

use crate::sentiment::{SentimentLabel, SentimentResult, UrgencyLabel};

/// Reply priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplyPriority {
    Critical,
    High,
    Medium,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePlan {
    pub priority: ReplyPriority,
    pub response_time: String,
    pub tone: String,
    pub action: String,
}

impl ResponsePlan {
    fn new(priority: ReplyPriority, response_time: &str, tone: &str, action: &str) -> Self {
        Self {
            priority,
            response_time: response_time.to_string(),
            tone: tone.to_string(),
            action: action.to_string(),
        }
    }
}

/// First matching rule wins.
pub fn plan_response(sentiment: &SentimentResult) -> ResponsePlan {
    if sentiment.is_eager && sentiment.urgency == UrgencyLabel::Extreme {
        return ResponsePlan::new(
            ReplyPriority::Critical,
            "< 5 minutes",
            "Friendly & Fast",
            "Call customer immediately",
        );
    }
    if sentiment.urgency == UrgencyLabel::High || sentiment.is_eager {
        return ResponsePlan::new(
            ReplyPriority::High,
            "< 30 minutes",
            "Professional & Warm",
            "Quick response with all details",
        );
    }
    if sentiment.has_doubts {
        return ResponsePlan::new(
            ReplyPriority::Medium,
            "< 2 hours",
            "Informative & Reassuring",
            "Address concerns, provide comparisons",
        );
    }
    if sentiment.label == SentimentLabel::VeryNegative {
        return ResponsePlan::new(
            ReplyPriority::Medium,
            "< 1 hour",
            "Empathetic & Solution-focused",
            "Address issues, offer solutions",
        );
    }
    ResponsePlan::new(
        ReplyPriority::Normal,
        "Same day",
        "Friendly & Informative",
        "Standard response",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SentimentResult {
        SentimentResult::neutral()
    }

    #[test]
    fn eager_and_extreme_is_critical() {
        let mut s = base();
        s.is_eager = true;
        s.urgency = UrgencyLabel::Extreme;
        assert_eq!(plan_response(&s).priority, ReplyPriority::Critical);
    }

    #[test]
    fn extreme_without_eagerness_is_not_critical() {
        let mut s = base();
        s.urgency = UrgencyLabel::Extreme;
        assert_eq!(plan_response(&s).priority, ReplyPriority::Normal);
    }

    #[test]
    fn high_urgency_or_eager_is_high() {
        let mut s = base();
        s.urgency = UrgencyLabel::High;
        assert_eq!(plan_response(&s).response_time, "< 30 minutes");

        let mut s = base();
        s.is_eager = true;
        s.has_doubts = true;
        assert_eq!(plan_response(&s).priority, ReplyPriority::High);
    }

    #[test]
    fn doubt_beats_very_negative() {
        let mut s = base();
        s.has_doubts = true;
        s.label = SentimentLabel::VeryNegative;
        assert_eq!(plan_response(&s).response_time, "< 2 hours");

        s.has_doubts = false;
        let plan = plan_response(&s);
        assert_eq!(plan.priority, ReplyPriority::Medium);
        assert_eq!(plan.response_time, "< 1 hour");
    }

    #[test]
    fn default_is_normal_same_day() {
        let plan = plan_response(&base());
        assert_eq!(plan.priority, ReplyPriority::Normal);
        assert_eq!(serde_json::to_value(&plan).unwrap()["priority"], "NORMAL");
    }
}
