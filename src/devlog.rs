// src/devlog.rs
//! Anonymized dev logging for the analysis pipeline.
//!
//! Gate: TRIAGE_DEV_LOG=1 AND a dev environment (debug build or SHUTTLE_ENV
//! in {local, development, dev}). Raw message text is never logged; events
//! carry a short SHA-256 prefix of the text instead.

use tracing::info;

pub const ENV_DEV_LOG: &str = "TRIAGE_DEV_LOG";

pub fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    is_dev_env()
}

pub fn is_dev_env() -> bool {
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// First 6 bytes of SHA-256, hex.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

/// One line per analyzed message.
pub(crate) fn log_analysis(
    text: &str,
    products: &[String],
    topics: &[String],
    intent_tier: &str,
    intent_score: f32,
    segment: &str,
) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    info!(
        target: "triage",
        %id, %intent_score, intent_tier, segment,
        products = ?truncate_vec(products, 5),
        topics = ?truncate_vec(topics, 3)
    );
}
