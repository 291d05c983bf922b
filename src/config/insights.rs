// src/config/insights.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::analyze::{EngagementParams, FlagThresholds, RowFailurePolicy};

pub const DEFAULT_CONFIG_PATH: &str = "config/insights.toml";
pub const ENV_CONFIG_PATH: &str = "CRM_INSIGHTS_CONFIG_PATH";

/// Scoring, ranking and dataset settings. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub engagement: EngagementParams,
    pub flags: FlagThresholds,
    pub ranking: RankingConfig,
    pub analysis: AnalysisConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// `n` used by `/analyze/top` when the query omits it.
    pub default_n: i64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { default_n: 5 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub on_invalid_row: RowFailurePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Serve the built-in sample clients until the first upload.
    pub seed_sample: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self { seed_sample: true }
    }
}

impl InsightsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: InsightsConfig = toml::from_str(s).context("parsing insights config")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading insights config from {}", path.display()))?;
        let cfg = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "insights config loaded");
        Ok(cfg)
    }

    /// Load using env var + fallback:
    /// 1) $CRM_INSIGHTS_CONFIG_PATH (must exist)
    /// 2) config/insights.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let pb = PathBuf::from(DEFAULT_CONFIG_PATH);
        if pb.exists() {
            return Self::load_from(&pb);
        }
        Ok(Self::default())
    }

    /// Put out-of-range values back to their defaults.
    fn sanitized(mut self) -> Self {
        if self.engagement.decay_days == 0 {
            warn!("engagement.decay_days must be positive; using default");
            self.engagement.decay_days = EngagementParams::default().decay_days;
        }
        if self
            .engagement
            .decay_days
            .checked_add(self.engagement.email_boost_cap)
            .is_none()
        {
            warn!(
                decay_days = self.engagement.decay_days,
                email_boost_cap = self.engagement.email_boost_cap,
                "engagement score range overflows u32; using defaults"
            );
            self.engagement = EngagementParams::default();
        }

        let default_flags = FlagThresholds::default();
        if !(-1.0..=1.0).contains(&self.flags.min_healthy_sentiment) {
            warn!(
                value = self.flags.min_healthy_sentiment,
                "flags.min_healthy_sentiment outside [-1, 1]; using default"
            );
            self.flags.min_healthy_sentiment = default_flags.min_healthy_sentiment;
        }
        if self.flags.at_risk_below > self.flags.attention_below {
            // swap to keep the bands ordered
            std::mem::swap(
                &mut self.flags.at_risk_below,
                &mut self.flags.attention_below,
            );
        }

        if self.ranking.default_n < 0 {
            warn!(
                value = self.ranking.default_n,
                "ranking.default_n is negative; using default"
            );
            self.ranking.default_n = RankingConfig::default().default_n;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = InsightsConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, InsightsConfig::default());
        assert_eq!(cfg.engagement.decay_days, 100);
        assert_eq!(cfg.flags.at_risk_below, 40);
        assert_eq!(cfg.ranking.default_n, 5);
        assert_eq!(cfg.analysis.on_invalid_row, RowFailurePolicy::Abort);
        assert!(cfg.dataset.seed_sample);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = InsightsConfig::from_toml_str(
            r#"
[engagement]
email_boost_cap = 30

[analysis]
on_invalid_row = "skip"

[dataset]
seed_sample = false
"#,
        )
        .unwrap();
        assert_eq!(cfg.engagement.email_boost_cap, 30);
        assert_eq!(cfg.engagement.per_email_boost, 5);
        assert_eq!(cfg.analysis.on_invalid_row, RowFailurePolicy::Skip);
        assert!(!cfg.dataset.seed_sample);
    }

    #[test]
    fn out_of_range_values_are_sanitized() {
        let cfg = InsightsConfig::from_toml_str(
            r#"
[engagement]
decay_days = 0

[flags]
at_risk_below = 70
attention_below = 30
min_healthy_sentiment = 4.0

[ranking]
default_n = -3
"#,
        )
        .unwrap();
        assert_eq!(cfg.engagement.decay_days, 100);
        assert_eq!(cfg.flags.at_risk_below, 30);
        assert_eq!(cfg.flags.attention_below, 70);
        assert_eq!(cfg.flags.min_healthy_sentiment, 0.2);
        assert_eq!(cfg.ranking.default_n, 5);
    }

    #[test]
    fn overflowing_engagement_range_falls_back_to_defaults() {
        let cfg = InsightsConfig::from_toml_str("[engagement]\ndecay_days = 4294967295\n").unwrap();
        assert_eq!(cfg.engagement, EngagementParams::default());

        let cfg = InsightsConfig::from_toml_str(
            "[engagement]\ndecay_days = 4000000000\nemail_boost_cap = 4000000000\n",
        )
        .unwrap();
        assert_eq!(cfg.engagement, EngagementParams::default());

        let cfg = InsightsConfig::from_toml_str("[engagement]\ndecay_days = 365\n").unwrap();
        assert_eq!(cfg.engagement.decay_days, 365);
    }

    #[test]
    fn unknown_policy_is_an_error() {
        let err = InsightsConfig::from_toml_str("[analysis]\non_invalid_row = \"retry\"\n");
        assert!(err.is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD so a real config/ in the repo does not interfere
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        // No files → defaults
        assert_eq!(InsightsConfig::load_default().unwrap(), InsightsConfig::default());

        // Default path is picked up
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(
            tmp.path().join(DEFAULT_CONFIG_PATH),
            "[ranking]\ndefault_n = 8\n",
        )
        .unwrap();
        assert_eq!(InsightsConfig::load_default().unwrap().ranking.default_n, 8);

        // Env wins
        let p = tmp.path().join("custom.toml");
        fs::write(&p, "[ranking]\ndefault_n = 2\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        assert_eq!(InsightsConfig::load_default().unwrap().ranking.default_n, 2);

        // Env pointing nowhere is an error
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
        assert!(InsightsConfig::load_default().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::set_current_dir(&old).unwrap();
    }
}
