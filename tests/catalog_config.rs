// tests/catalog_config.rs
//
// Loading the catalog from CATALOG_CONFIG_PATH and running the pipeline on a
// small custom catalog. Env-mutating tests are serialized.

use std::io::Write;
use std::sync::Arc;

use dm_intent_triage::analyze::{Analyzer, IntentTier, MlAugmenter, Timeframe};
use dm_intent_triage::catalog::{CatalogError, CatalogStore, ENV_CATALOG_PATH};
use serial_test::serial;

const SHOP_TOML: &str = r#"
[segmentation]
strong = 0.9
moderate = 0.5

[sentiment]
positive = [{ term = "lovely", weight = 2.0 }]
negative = [{ term = "awful", weight = 3.0 }]
eagerness = ["on my way"]
doubt = ["not sure"]

[urgency]
high = ["tonight"]

[timeframes]
today = ["tonight"]
next_week = ["next week"]

[intent]
readiness = ["on my way", "ordering"]

[[topics]]
name = "Price"
priority = 1
urgency = "high"
keywords = ["price", "how much"]

[[topics]]
name = "Delivery & Shipping"
priority = 2
urgency = "low"
keywords = ["delivery"]

[[products]]
category = "Kettles"
model = "Aqua Boil 2"
aliases = ["aqua boil 2", "ab2"]

[[products]]
category = "Kettles"
model = "Aqua Boil"
aliases = ["aqua boil"]
"#;

fn write_catalog(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(body.as_bytes()).expect("write catalog");
    f
}

#[test]
#[serial]
fn env_path_selects_catalog_file() {
    let f = write_catalog(SHOP_TOML);
    std::env::set_var(ENV_CATALOG_PATH, f.path());
    let loaded = CatalogStore::from_toml();
    std::env::remove_var(ENV_CATALOG_PATH);

    let catalog = loaded.expect("custom catalog loads");
    assert_eq!(catalog.products.len(), 2);
    assert_eq!(catalog.categories(), vec!["Kettles"]);
    assert_eq!(catalog.segmentation.strong, 0.9);

    let summary = catalog.summary();
    assert_eq!(summary.models, 2);
    assert_eq!(summary.aliases, 3);
    assert_eq!(summary.topics, 2);
}

#[test]
#[serial]
fn missing_file_is_a_read_error() {
    std::env::set_var(ENV_CATALOG_PATH, "/nonexistent/catalog.toml");
    let err = CatalogStore::from_toml().unwrap_err();
    std::env::remove_var(ENV_CATALOG_PATH);
    assert!(matches!(err, CatalogError::Read { .. }), "{err}");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let f = write_catalog("[[products]\ncategory = ");
    let err = CatalogStore::from_path(f.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)), "{err}");
}

#[test]
fn custom_catalog_drives_the_pipeline() {
    let catalog = CatalogStore::from_toml_str(SHOP_TOML).expect("valid catalog");
    let a = Analyzer::new(Arc::new(catalog), MlAugmenter::disabled()).expect("compiles");

    let r = a.analyze_text("AB2 price? on my way tonight, lovely");
    assert_eq!(r.primary_product, "Aqua Boil 2");
    assert_eq!(r.product_details[0].category, "Kettles");
    assert_eq!(r.topics_formatted, "Price");
    assert_eq!(r.timeframe, Timeframe::Today);
    assert!(r.ready_to_buy);
    assert!(r.is_eager);
    // 30 + 15 + 30 + 25 + 10 (positive) + 16 (urgency high 8*2), capped
    assert_eq!(r.intent_score, 1.0);
    assert_eq!(r.intent_tier, IntentTier::VeryHigh);

    let r = a.analyze_text("kettle delivery next week? not sure, awful reviews");
    assert_eq!(r.primary_product, "Not specified");
    assert_eq!(r.topics_formatted, "Delivery & Shipping");
    assert_eq!(r.timeframe, Timeframe::NextWeek);
    assert!(r.has_doubts);
    assert!(r.sentiment_score < 0.0);
    // 30 + 10
    assert_eq!(r.intent_score, 0.4);
}

#[test]
fn longer_alias_does_not_shadow_shorter_model() {
    let catalog = CatalogStore::from_toml_str(SHOP_TOML).expect("valid catalog");
    let a = Analyzer::new(Arc::new(catalog), MlAugmenter::disabled()).expect("compiles");

    let r = a.analyze_text("is the aqua boil still sold?");
    assert_eq!(r.products_formatted, "Aqua Boil");
}
