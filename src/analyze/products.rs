//! Product detection: ad-context, optional ML category, then whole-word alias
//! matching over the catalog with storage-variant extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ml_adapter::MlAugmenter;
use crate::catalog::{CatalogError, CatalogStore, UNKNOWN_CATEGORY};

pub const NOT_SPECIFIED: &str = "Not specified";

/// ML category candidates at or below this confidence are ignored.
pub const ML_INCLUDE_ABOVE: f32 = 0.5;
/// ML category candidates above this confidence are reported as medium.
pub const ML_MEDIUM_ABOVE: f32 = 0.7;

// Storage variants, tried in order; first match wins.
static STORAGE_SPACED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)\s?(gb|tb)\b").expect("valid storage regex"));
static STORAGE_COMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)(gb|tb)\b").expect("valid storage regex"));
static STORAGE_DUAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)\s?[-/]\s?(\d+)").expect("valid storage regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSource {
    AdContext,
    TextMatch,
    Ml,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedProduct {
    pub name: String,
    pub category: String,
    pub confidence: ConfidenceTier,
    pub source: ProductSource,
}

impl DetectedProduct {
    pub fn not_specified() -> Self {
        Self {
            name: NOT_SPECIFIED.to_string(),
            category: UNKNOWN_CATEGORY.to_string(),
            confidence: ConfidenceTier::None,
            source: ProductSource::None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.source == ProductSource::None
    }
}

#[derive(Debug)]
struct CompiledModel {
    category: String,
    display: String,
    aliases: Vec<Regex>,
}

impl CompiledModel {
    fn matches(&self, lowered: &str) -> bool {
        self.aliases.iter().any(|re| re.is_match(lowered))
    }
}

#[derive(Debug)]
pub struct ProductMatcher {
    models: Vec<CompiledModel>,
    ml: MlAugmenter,
}

impl ProductMatcher {
    /// Compile every alias once. Fails only on a pattern the regex engine
    /// rejects (e.g. an alias past the size limit).
    pub fn new(catalog: &CatalogStore) -> Result<Self, CatalogError> {
        let models = catalog
            .products
            .iter()
            .map(|entry| {
                let aliases = entry
                    .aliases
                    .iter()
                    .map(|alias| {
                        Regex::new(&whole_word_pattern(alias)).map_err(|source| {
                            CatalogError::Pattern {
                                model: entry.model.clone(),
                                alias: alias.clone(),
                                source,
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledModel {
                    category: entry.category.clone(),
                    display: title_case(&entry.model),
                    aliases,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Self {
            models,
            ml: MlAugmenter::disabled(),
        })
    }

    pub fn with_augmenter(mut self, ml: MlAugmenter) -> Self {
        self.ml = ml;
        self
    }

    /// Ordered, never-empty product list for one message.
    pub fn detect(&self, text: &str, ad_context: Option<&str>) -> Vec<DetectedProduct> {
        let mut accepted: Vec<DetectedProduct> = Vec::new();

        if let Some(ad) = ad_context.map(str::trim).filter(|s| !s.is_empty()) {
            accepted.push(DetectedProduct {
                name: ad.to_string(),
                category: self.category_for(ad),
                confidence: ConfidenceTier::High,
                source: ProductSource::AdContext,
            });
        }

        if let Some(pred) = self.ml.category(text) {
            if pred.confidence > ML_INCLUDE_ABOVE {
                let confidence = if pred.confidence > ML_MEDIUM_ABOVE {
                    ConfidenceTier::Medium
                } else {
                    ConfidenceTier::Low
                };
                push_unique(
                    &mut accepted,
                    DetectedProduct {
                        name: pred.label.clone(),
                        category: pred.label,
                        confidence,
                        source: ProductSource::Ml,
                    },
                );
            }
        }

        let lowered = text.to_lowercase();
        let mut storage: Option<Option<String>> = None;
        for model in &self.models {
            if !model.matches(&lowered) {
                continue;
            }
            let suffix = storage.get_or_insert_with(|| extract_storage(text));
            let name = match suffix {
                Some(s) => format!("{} {}", model.display, s),
                None => model.display.clone(),
            };
            push_unique(
                &mut accepted,
                DetectedProduct {
                    name,
                    category: model.category.clone(),
                    confidence: ConfidenceTier::High,
                    source: ProductSource::TextMatch,
                },
            );
        }

        if accepted.is_empty() {
            accepted.push(DetectedProduct::not_specified());
        }
        accepted
    }

    /// Category of the first model with an alias matching `name`.
    pub fn category_for(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        self.models
            .iter()
            .find(|m| m.matches(&lowered))
            .map(|m| m.category.clone())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }
}

/// Ad-context product if present, else the first discovered one.
pub fn primary(products: &[DetectedProduct]) -> &str {
    products
        .iter()
        .find(|p| p.source == ProductSource::AdContext)
        .or_else(|| products.first())
        .map(|p| p.name.as_str())
        .unwrap_or(NOT_SPECIFIED)
}

/// Unique names in order, joined with ", ".
pub fn format(products: &[DetectedProduct]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for p in products.iter().filter(|p| !p.is_sentinel()) {
        if !names.contains(&p.name.as_str()) {
            names.push(p.name.as_str());
        }
    }
    if names.is_empty() {
        return NOT_SPECIFIED.to_string();
    }
    names.join(", ")
}

/// Bidirectional case-insensitive substring dedup. This can drop a distinct
/// model whose name overlaps an accepted one ("S24" vs "S24 Ultra").
fn push_unique(accepted: &mut Vec<DetectedProduct>, candidate: DetectedProduct) {
    let name = candidate.name.to_lowercase();
    let duplicate = accepted.iter().any(|p| {
        let existing = p.name.to_lowercase();
        existing.contains(&name) || name.contains(&existing)
    });
    if !duplicate {
        accepted.push(candidate);
    }
}

/// `" 256GB"`-style suffix body from the raw text, if any.
fn extract_storage(text: &str) -> Option<String> {
    for re in [&*STORAGE_SPACED, &*STORAGE_COMPACT] {
        if let Some(c) = re.captures(text) {
            return Some(format!("{}{}", &c[1], c[2].to_ascii_uppercase()));
        }
    }
    STORAGE_DUAL
        .captures(text)
        .map(|c| format!("{}/{}GB", &c[1], &c[2]))
}

/// Whole-word regex for an alias. Word-character edges use `\b`; an alias
/// starting or ending in punctuation (e.g. "s24+") needs a non-word neighbour
/// or the text edge instead.
fn whole_word_pattern(alias: &str) -> String {
    let starts_word = alias.chars().next().is_some_and(is_word_char);
    let ends_word = alias.chars().last().is_some_and(is_word_char);
    let head = if starts_word { r"\b" } else { r"(?:^|\W)" };
    let tail = if ends_word { r"\b" } else { r"(?:\W|$)" };
    format!("(?i){head}{}{tail}", regex::escape(alias))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn title_case(model: &str) -> String {
    model
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
