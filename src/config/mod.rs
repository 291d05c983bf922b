// src/config/mod.rs
pub mod insights;

pub use insights::{
    AnalysisConfig, DatasetConfig, InsightsConfig, RankingConfig, DEFAULT_CONFIG_PATH,
    ENV_CONFIG_PATH,
};
