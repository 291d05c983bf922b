//! Top-N ranking of analysis results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AnalysisResult;
use crate::error::ValidationError;

/// Field a ranking is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Engagement,
    Sentiment,
}

impl Metric {
    fn key(&self, r: &AnalysisResult) -> f64 {
        match self {
            Metric::Engagement => f64::from(r.engagement_score),
            Metric::Sentiment => r.sentiment,
        }
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    /// Case-insensitive: "engagement" | "sentiment".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "engagement" => Ok(Metric::Engagement),
            "sentiment" => Ok(Metric::Sentiment),
            _ => Err(ValidationError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Engagement => f.write_str("engagement"),
            Metric::Sentiment => f.write_str("sentiment"),
        }
    }
}

/// Highest `n` results by `metric`. Equal keys keep their input order.
/// `n <= 0` yields nothing, `n` beyond the population yields everything.
pub fn top(mut results: Vec<AnalysisResult>, metric: Metric, n: i64) -> Vec<AnalysisResult> {
    if n <= 0 {
        return Vec::new();
    }
    // sort_by is stable
    results.sort_by(|a, b| metric.key(b).total_cmp(&metric.key(a)));
    results.truncate(usize::try_from(n).unwrap_or(usize::MAX));
    results
}

/// Parse the raw `n` query value. Absent means `default`.
pub fn parse_count(raw: Option<&str>, default: i64) -> Result<i64, ValidationError> {
    match raw {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidCount(s.to_string())),
    }
}

/// Validate `/analyze/top` parameters. The count is checked before the metric.
pub fn parse_top_params(
    by: Option<&str>,
    n: Option<&str>,
    default_n: i64,
) -> Result<(Metric, i64), ValidationError> {
    let n = parse_count(n, default_n)?;
    let metric = match by {
        Some(raw) => raw.parse::<Metric>()?,
        None => Metric::default(),
    };
    Ok((metric, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Flag;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn r(name: &str, score: u32, sentiment: f64) -> AnalysisResult {
        AnalysisResult {
            name: name.to_string(),
            engagement_score: score,
            sentiment,
            trend: 0.0,
            flag: Flag::Healthy,
        }
    }

    fn names(v: &[AnalysisResult]) -> Vec<&str> {
        v.iter().map(|x| x.name.as_str()).collect()
    }

    fn population() -> Vec<AnalysisResult> {
        vec![
            r("a", 50, 0.1),
            r("b", 120, -0.3),
            r("c", 50, 0.7),
            r("d", 90, 0.1),
        ]
    }

    #[test]
    fn ranks_by_engagement_descending_with_stable_ties() {
        let out = top(population(), Metric::Engagement, 10);
        assert_eq!(names(&out), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn ranks_by_sentiment() {
        let out = top(population(), Metric::Sentiment, 3);
        assert_eq!(names(&out), vec!["c", "a", "d"]);
    }

    #[test]
    fn zero_or_negative_n_is_empty() {
        assert!(top(population(), Metric::Engagement, 0).is_empty());
        assert!(top(population(), Metric::Engagement, -2).is_empty());
    }

    #[test]
    fn n_beyond_population_returns_all() {
        assert_eq!(top(population(), Metric::Sentiment, i64::MAX).len(), 4);
    }

    #[test]
    fn ties_preserve_insertion_order_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let input: Vec<AnalysisResult> = (0..30)
                .map(|i| r(&format!("{i:02}"), rng.random_range(0..5) * 10, 0.0))
                .collect();
            let out = top(input, Metric::Engagement, 30);
            for w in out.windows(2) {
                assert!(w[0].engagement_score >= w[1].engagement_score);
                if w[0].engagement_score == w[1].engagement_score {
                    assert!(w[0].name < w[1].name, "tie order broken: {} {}", w[0].name, w[1].name);
                }
            }
        }
    }

    #[test]
    fn nan_sentiment_does_not_break_ordering() {
        let mut rng = StdRng::seed_from_u64(7);
        let input: Vec<AnalysisResult> = (0..200)
            .map(|i| {
                let s = if i % 7 == 0 { f64::NAN } else { rng.random_range(-1.0..=1.0) };
                r(&format!("{i:03}"), 0, s)
            })
            .collect();
        let out = top(input, Metric::Sentiment, 200);
        assert_eq!(out.len(), 200);
        let finite: Vec<f64> = out.iter().map(|x| x.sentiment).filter(|s| !s.is_nan()).collect();
        assert!(finite.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn metric_parsing_is_case_insensitive() {
        assert_eq!("Engagement".parse::<Metric>(), Ok(Metric::Engagement));
        assert_eq!("SENTIMENT".parse::<Metric>(), Ok(Metric::Sentiment));
        assert_eq!(
            "trend".parse::<Metric>(),
            Err(ValidationError::UnknownMetric("trend".into()))
        );
    }

    #[test]
    fn top_params_defaults_and_errors() {
        assert_eq!(parse_top_params(None, None, 5), Ok((Metric::Engagement, 5)));
        assert_eq!(
            parse_top_params(Some("sentiment"), Some(" 3 "), 5),
            Ok((Metric::Sentiment, 3))
        );
        assert_eq!(
            parse_top_params(Some("engagement"), Some("three"), 5),
            Err(ValidationError::InvalidCount("three".into()))
        );
        assert_eq!(
            parse_top_params(Some("volume"), Some("2.5"), 5),
            Err(ValidationError::InvalidCount("2.5".into())),
            "count is validated first"
        );
        assert_eq!(
            parse_top_params(Some("volume"), Some("2"), 5),
            Err(ValidationError::UnknownMetric("volume".into()))
        );
    }
}
