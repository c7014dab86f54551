// src/config/mod.rs
pub mod ml;

pub use ml::{MlConfig, ModelLocation};
