//! Sentiment aggregation over an ordered message history.

use crate::sentiment::PolarityProvider;

/// Mean polarity of all messages; `0.0` for an empty history.
pub fn average_sentiment<P, S>(provider: &P, emails: &[S]) -> f64
where
    P: PolarityProvider + ?Sized,
    S: AsRef<str>,
{
    mean_polarity(provider, emails).unwrap_or(0.0)
}

/// Second-half mean minus first-half mean.
///
/// The split index is `n / 2`, so with an odd count the later half holds the
/// extra message. Fewer than two messages give `0.0`.
pub fn sentiment_trend<P, S>(provider: &P, emails: &[S]) -> f64
where
    P: PolarityProvider + ?Sized,
    S: AsRef<str>,
{
    if emails.len() < 2 {
        return 0.0;
    }
    let (first, second) = emails.split_at(emails.len() / 2);
    match (mean_polarity(provider, first), mean_polarity(provider, second)) {
        (Some(a), Some(b)) => b - a,
        _ => 0.0,
    }
}

fn mean_polarity<P, S>(provider: &P, texts: &[S]) -> Option<f64>
where
    P: PolarityProvider + ?Sized,
    S: AsRef<str>,
{
    if texts.is_empty() {
        return None;
    }
    let sum: f64 = texts.iter().map(|t| provider.polarity(t.as_ref())).sum();
    Some(sum / texts.len() as f64)
}
