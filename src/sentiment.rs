//! # Sentiment Provider
//! Polarity of a single message text in `[-1.0, 1.0]`.
//!
//! The scoring engine only depends on [`PolarityProvider`]; the service wires in
//! [`LexiconPolarity`], tests usually inject a closure with fixed values.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)[\w']+").expect("tokenizer regex"));

/// Negated words keep half of their magnitude with the sign flipped.
const NEGATION_FACTOR: f64 = -0.5;

/// Injected sentiment capability. Must be deterministic and total.
pub trait PolarityProvider: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

impl<F> PolarityProvider for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Word-lexicon scorer: mean polarity of the known words in the text.
#[derive(Debug, Clone, Default)]
pub struct LexiconPolarity;

impl LexiconPolarity {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> Option<f64> {
        LEXICON.get(w).copied()
    }
}

impl PolarityProvider for LexiconPolarity {
    /// Each lexicon hit is scaled by a directly preceding intensifier and
    /// flipped if a negator appears in the previous 1..=3 tokens.
    /// Texts without any lexicon hit are neutral (0.0).
    fn polarity(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum = 0.0;
        let mut hits = 0usize;

        for i in 0..tokens.len() {
            let Some(base) = self.word_score(tokens[i].as_str()) else {
                continue;
            };

            let mut value = base;
            if i >= 1 {
                value *= intensity(tokens[i - 1].as_str());
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            if negated {
                value *= NEGATION_FACTOR;
            }

            sum += value.clamp(-1.0, 1.0);
            hits += 1;
        }

        if hits == 0 {
            0.0
        } else {
            (sum / hits as f64).clamp(-1.0, 1.0)
        }
    }
}

/// Lower-cased word tokens; apostrophes stay inside words ("isn't", "let's").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_RE.find_iter(s).map(|m| m.as_str().to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "don't"
            | "doesn't"
            | "didn't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
    )
}

fn intensity(tok: &str) -> f64 {
    match tok {
        "very" | "really" | "truly" => 1.3,
        "extremely" | "incredibly" => 1.5,
        "so" | "too" => 1.2,
        "quite" => 1.1,
        "slightly" | "somewhat" => 0.7,
        _ => 1.0,
    }
}
