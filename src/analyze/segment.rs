//! Customer segmentation from contact history depth and intent score.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{CatalogStore, SegmentationThresholds};

/// How far into the conversation the sender is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryBucket {
    /// No prior processed messages.
    #[serde(rename = "Initial Contact")]
    FirstContact,
    /// One or two.
    #[serde(rename = "Follow-up")]
    FollowUp,
    /// Three or more.
    #[serde(rename = "Active Discussion")]
    Established,
}

impl HistoryBucket {
    pub fn from_prior_count(prior_count: u32) -> Self {
        match prior_count {
            0 => HistoryBucket::FirstContact,
            1..=2 => HistoryBucket::FollowUp,
            _ => HistoryBucket::Established,
        }
    }

    /// Conversation stage label shown next to each lead.
    pub fn stage_label(&self) -> &'static str {
        match self {
            HistoryBucket::FirstContact => "Initial Contact",
            HistoryBucket::FollowUp => "Follow-up",
            HistoryBucket::Established => "Active Discussion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerSegment {
    #[serde(rename = "Hot Lead")]
    HotLead,
    #[serde(rename = "Warm Lead")]
    WarmLead,
    #[serde(rename = "New Prospect")]
    NewProspect,
    #[serde(rename = "Engaged Buyer")]
    EngagedBuyer,
    Interested,
    Browsing,
    #[serde(rename = "VIP Customer")]
    VipCustomer,
    #[serde(rename = "Regular Customer")]
    RegularCustomer,
    Returning,
}

impl CustomerSegment {
    pub const ALL: [CustomerSegment; 9] = [
        CustomerSegment::HotLead,
        CustomerSegment::WarmLead,
        CustomerSegment::NewProspect,
        CustomerSegment::EngagedBuyer,
        CustomerSegment::Interested,
        CustomerSegment::Browsing,
        CustomerSegment::VipCustomer,
        CustomerSegment::RegularCustomer,
        CustomerSegment::Returning,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            CustomerSegment::HotLead => "Hot Lead",
            CustomerSegment::WarmLead => "Warm Lead",
            CustomerSegment::NewProspect => "New Prospect",
            CustomerSegment::EngagedBuyer => "Engaged Buyer",
            CustomerSegment::Interested => "Interested",
            CustomerSegment::Browsing => "Browsing",
            CustomerSegment::VipCustomer => "VIP Customer",
            CustomerSegment::RegularCustomer => "Regular Customer",
            CustomerSegment::Returning => "Returning",
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CustomerSegmenter {
    thresholds: SegmentationThresholds,
}

impl CustomerSegmenter {
    pub fn new(catalog: &CatalogStore) -> Self {
        Self {
            thresholds: catalog.segmentation,
        }
    }

    pub fn with_thresholds(thresholds: SegmentationThresholds) -> Self {
        Self { thresholds }
    }

    /// Both score comparisons are strict: exactly 0.8 is not "strong".
    pub fn segment(&self, prior_count: u32, score: f32) -> CustomerSegment {
        let strong = score > self.thresholds.strong;
        let moderate = score > self.thresholds.moderate;
        match (HistoryBucket::from_prior_count(prior_count), strong, moderate) {
            (HistoryBucket::FirstContact, true, _) => CustomerSegment::HotLead,
            (HistoryBucket::FirstContact, false, true) => CustomerSegment::WarmLead,
            (HistoryBucket::FirstContact, false, false) => CustomerSegment::NewProspect,
            (HistoryBucket::FollowUp, true, _) => CustomerSegment::EngagedBuyer,
            (HistoryBucket::FollowUp, false, true) => CustomerSegment::Interested,
            (HistoryBucket::FollowUp, false, false) => CustomerSegment::Browsing,
            (HistoryBucket::Established, true, _) => CustomerSegment::VipCustomer,
            (HistoryBucket::Established, false, true) => CustomerSegment::RegularCustomer,
            (HistoryBucket::Established, false, false) => CustomerSegment::Returning,
        }
    }
}
