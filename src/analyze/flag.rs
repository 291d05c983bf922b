//! Risk flag classification from engagement score and average sentiment.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    Healthy,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Healthy => "Healthy",
            Flag::NeedsAttention => "Needs Attention",
            Flag::AtRisk => "At Risk",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlagThresholds {
    pub at_risk_below: u32,
    pub attention_below: u32,
    pub min_healthy_sentiment: f64,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self {
            at_risk_below: 40,
            attention_below: 60,
            min_healthy_sentiment: 0.2,
        }
    }
}

/// First match wins: low score is `AtRisk`, then a middling score or cool
/// sentiment is `NeedsAttention`, everything else is `Healthy`.
///
/// Scores are unsigned, so there is no separate negative-score case.
pub fn classify(score: u32, sentiment: f64, t: &FlagThresholds) -> Flag {
    if score < t.at_risk_below {
        Flag::AtRisk
    } else if score < t.attention_below || sentiment < t.min_healthy_sentiment {
        Flag::NeedsAttention
    } else {
        Flag::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(score: u32, sentiment: f64) -> Flag {
        classify(score, sentiment, &FlagThresholds::default())
    }

    #[test]
    fn low_score_is_at_risk_regardless_of_sentiment() {
        assert_eq!(c(0, 1.0), Flag::AtRisk);
        assert_eq!(c(39, 0.9), Flag::AtRisk);
    }

    #[test]
    fn boundaries() {
        assert_eq!(c(40, 0.9), Flag::NeedsAttention);
        assert_eq!(c(59, 0.9), Flag::NeedsAttention);
        assert_eq!(c(60, 0.2), Flag::Healthy);
        assert_eq!(c(60, 0.19), Flag::NeedsAttention);
    }

    #[test]
    fn negative_sentiment_with_high_score_needs_attention() {
        assert_eq!(c(150, -0.8), Flag::NeedsAttention);
    }

    #[test]
    fn healthy_client() {
        assert_eq!(c(110, 0.85), Flag::Healthy);
    }

    #[test]
    fn serializes_with_display_labels() {
        let json = serde_json::to_string(&[Flag::Healthy, Flag::NeedsAttention, Flag::AtRisk])
            .unwrap();
        assert_eq!(json, r#"["Healthy","Needs Attention","At Risk"]"#);
        assert_eq!(Flag::NeedsAttention.to_string(), "Needs Attention");
    }
}
