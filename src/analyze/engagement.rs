//! Engagement score: linear recency decay plus a capped per-message boost.
//!
//! `score = clamp(decay_days - days_since, 0, decay_days) + min(count * per_email_boost, email_boost_cap)`

use chrono::NaiveDate;
use serde::Deserialize;

/// Tunables for the engagement score. Defaults give a score in `[0, 150]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngagementParams {
    /// Days until the recency part decays to zero (also its maximum).
    pub decay_days: u32,
    pub per_email_boost: u32,
    pub email_boost_cap: u32,
}

impl Default for EngagementParams {
    fn default() -> Self {
        Self {
            decay_days: 100,
            per_email_boost: 5,
            email_boost_cap: 50,
        }
    }
}

impl EngagementParams {
    /// Upper bound of any score produced with these params.
    pub fn max_score(&self) -> u32 {
        self.decay_days.saturating_add(self.email_boost_cap)
    }
}

/// Score one client as of `today`.
///
/// A `last_contact` in the future is not rejected; it counts as same-day contact.
pub fn engagement_score(
    last_contact: NaiveDate,
    email_count: usize,
    today: NaiveDate,
    params: &EngagementParams,
) -> u32 {
    let days_since = (today - last_contact).num_days();
    let decay = i64::from(params.decay_days);
    let base = (decay - days_since).clamp(0, decay) as u32;

    let boost = u32::try_from(email_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(params.per_email_boost)
        .min(params.email_boost_cap);

    base.saturating_add(boost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn score(days_ago: i64, emails: usize) -> u32 {
        engagement_score(
            today() - Duration::days(days_ago),
            emails,
            today(),
            &EngagementParams::default(),
        )
    }

    #[test]
    fn same_day_contact_saturates_base() {
        assert_eq!(score(0, 0), 100);
        assert_eq!(score(0, 2), 110);
    }

    #[test]
    fn ninety_days_without_mail() {
        assert_eq!(score(90, 0), 10);
    }

    #[test]
    fn base_floors_at_zero() {
        assert_eq!(score(100, 0), 0);
        assert_eq!(score(365, 3), 15);
        assert_eq!(score(100_000, 0), 0);
    }

    #[test]
    fn boost_caps_at_fifty() {
        assert_eq!(score(0, 10), 150);
        assert_eq!(score(0, 11), 150);
        assert_eq!(score(0, usize::MAX), 150);
    }

    #[test]
    fn future_contact_counts_as_today() {
        assert_eq!(score(-30, 1), 105);
    }

    #[test]
    fn matches_closed_form_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..500 {
            let days: i64 = rng.random_range(0..=100);
            let emails: usize = rng.random_range(0..=40);
            let expected = (100 - days + (emails as i64 * 5).min(50)).clamp(0, 150);
            assert_eq!(i64::from(score(days, emails)), expected, "days={days} emails={emails}");
        }
    }

    #[test]
    fn custom_params_are_honored() {
        let params = EngagementParams {
            decay_days: 30,
            per_email_boost: 2,
            email_boost_cap: 10,
        };
        let s = engagement_score(today() - Duration::days(10), 7, today(), &params);
        assert_eq!(s, 20 + 10);
        assert_eq!(params.max_score(), 40);
    }

    #[test]
    fn huge_decay_saturates_instead_of_overflowing() {
        let params = EngagementParams {
            decay_days: u32::MAX,
            ..EngagementParams::default()
        };
        assert_eq!(engagement_score(today(), 1, today(), &params), u32::MAX);
        assert_eq!(params.max_score(), u32::MAX);
    }
}
