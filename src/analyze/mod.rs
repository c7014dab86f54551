// src/analyze/mod.rs
//! Analysis pipeline entry: one call per message, producing the output record.
//!
//! Order:
//! 1) products, topics and sentiment, each evaluated independently on the text
//! 2) timeframe + readiness
//! 3) composite intent score (the only aggregator)
//! 4) customer segment and reply plan

pub mod intent;
pub mod ml_adapter;
pub mod phrases;
pub mod products;
pub mod respond;
pub mod segment;
pub mod token_model;
pub mod topics;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, CatalogStore, UrgencyTier};
use crate::devlog;
use crate::sentiment::{OverallSignal, SentimentAnalyzer, SentimentLabel, UrgencyLabel};

// Re-export convenient types.
pub use crate::analyze::intent::{IntentResult, IntentScorer, IntentTier, Timeframe};
pub use crate::analyze::ml_adapter::{MlAugmenter, Prediction, TextClassifier};
pub use crate::analyze::products::{DetectedProduct, ProductMatcher};
pub use crate::analyze::respond::{plan_response, ReplyPriority, ResponsePlan};
pub use crate::analyze::segment::{CustomerSegment, CustomerSegmenter, HistoryBucket};
pub use crate::analyze::topics::{TopicMatch, TopicTagger};

/// One inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInput {
    pub sender_id: String,
    pub text: String,
    #[serde(default)]
    pub ad_context_product: Option<String>,
    /// Messages from this sender already processed before this one.
    #[serde(default)]
    pub prior_processed_count: u32,
}

impl MessageInput {
    pub fn new(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_ad_context(mut self, product: impl Into<String>) -> Self {
        self.ad_context_product = Some(product.into());
        self
    }

    pub fn with_prior_count(mut self, count: u32) -> Self {
        self.prior_processed_count = count;
        self
    }
}

/// Structured triage result for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub sender_id: String,
    /// Product names in detection order.
    pub detected_products: Vec<String>,
    pub primary_product: String,
    pub products_formatted: String,
    /// Topic names in priority order.
    pub topics: Vec<String>,
    pub topics_formatted: String,
    pub primary_topic: String,
    pub topic_urgency: UrgencyTier,
    pub intent_score: f32,
    pub intent_percent: String,
    pub intent_tier: IntentTier,
    pub timeframe: Timeframe,
    pub ready_to_buy: bool,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f32,
    pub urgency_label: UrgencyLabel,
    pub urgency_score: u8,
    pub is_eager: bool,
    pub has_doubts: bool,
    pub overall_signal: OverallSignal,
    pub customer_segment: CustomerSegment,
    pub conversation_stage: String,
    /// 1-based position of this message in the sender's history.
    pub message_number: u32,
    pub response_plan: ResponsePlan,
    /// Category, confidence and source per detected product.
    pub product_details: Vec<DetectedProduct>,
    /// Priority and urgency per topic.
    pub topic_details: Vec<TopicMatch>,
}

/// All components, compiled once from one catalog.
#[derive(Debug)]
pub struct Analyzer {
    catalog: Arc<CatalogStore>,
    ml: MlAugmenter,
    products: ProductMatcher,
    topics: TopicTagger,
    sentiment: SentimentAnalyzer,
    intent: IntentScorer,
    segmenter: CustomerSegmenter,
}

impl Analyzer {
    pub fn new(catalog: Arc<CatalogStore>, ml: MlAugmenter) -> Result<Self, CatalogError> {
        let products = ProductMatcher::new(&catalog)?.with_augmenter(ml.clone());
        let sentiment = SentimentAnalyzer::new(&catalog).with_augmenter(ml.clone());
        Ok(Self {
            topics: TopicTagger::new(&catalog),
            intent: IntentScorer::new(&catalog),
            segmenter: CustomerSegmenter::new(&catalog),
            products,
            sentiment,
            ml,
            catalog,
        })
    }

    /// Embedded catalog, no ML.
    pub fn with_builtin_catalog() -> Result<Self, CatalogError> {
        Self::new(CatalogStore::builtin(), MlAugmenter::disabled())
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn ml(&self) -> &MlAugmenter {
        &self.ml
    }

    pub fn analyze_text(&self, text: &str) -> AnalysisRecord {
        self.analyze(&MessageInput::new("", text))
    }

    /// Total: never fails, never panics on any text.
    pub fn analyze(&self, input: &MessageInput) -> AnalysisRecord {
        let started = Instant::now();
        let text = input.text.as_str();
        let prior = input.prior_processed_count;

        let detected = self
            .products
            .detect(text, input.ad_context_product.as_deref());
        let topics = self.topics.tag(text);
        let sentiment = self.sentiment.score(text);

        let timeframe = self.intent.timeframe(text);
        let ready_to_buy = self.intent.ready_to_buy(text);
        let intent = self.intent.score(
            &topics,
            ready_to_buy,
            timeframe,
            prior,
            &sentiment,
            sentiment.urgency_score,
        );
        let segment = self.segmenter.segment(prior, intent.score);

        let record = AnalysisRecord {
            sender_id: input.sender_id.clone(),
            primary_product: products::primary(&detected).to_string(),
            products_formatted: products::format(&detected),
            topics_formatted: topics::format(&topics),
            primary_topic: topics::primary(&topics).to_string(),
            topic_urgency: topics::rollup_urgency(&topics),
            intent_score: intent.score,
            intent_percent: intent.percent(),
            intent_tier: intent.tier,
            timeframe,
            ready_to_buy,
            sentiment_label: sentiment.label,
            sentiment_score: sentiment.score,
            urgency_label: sentiment.urgency,
            urgency_score: sentiment.urgency_score,
            is_eager: sentiment.is_eager,
            has_doubts: sentiment.has_doubts,
            overall_signal: sentiment.overall_signal,
            customer_segment: segment,
            conversation_stage: HistoryBucket::from_prior_count(prior)
                .stage_label()
                .to_string(),
            message_number: prior.saturating_add(1),
            response_plan: plan_response(&sentiment),
            detected_products: detected.iter().map(|p| p.name.clone()).collect(),
            topics: topics.iter().map(|t| t.name.clone()).collect(),
            product_details: detected,
            topic_details: topics,
        };

        counter!("triage_messages_total").increment(1);
        counter!("triage_intent_tier_total", "tier" => record.intent_tier.as_str()).increment(1);
        histogram!("triage_analyze_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        devlog::log_analysis(
            text,
            &record.detected_products,
            &record.topics,
            record.intent_tier.as_str(),
            record.intent_score,
            record.customer_segment.display_name(),
        );

        record
    }

    pub fn analyze_many(&self, inputs: &[MessageInput]) -> Vec<AnalysisRecord> {
        inputs.iter().map(|i| self.analyze(i)).collect()
    }
}
