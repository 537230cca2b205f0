//! Aggregate statistics over donation logs and weight distributions.

use serde::{Deserialize, Serialize};

use crate::donation_log::RawDonation;

/// Cumulative donations for one character, from the aggregate-only path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub name: String,
    pub total_amount: f64,
}

/// Total the raw donations per character, in first-seen order.
#[must_use]
pub fn character_totals(donations: &[RawDonation]) -> Vec<CharacterStats> {
    let mut totals: Vec<CharacterStats> = Vec::new();
    for donation in donations {
        match totals.iter_mut().find(|t| t.name == donation.character) {
            Some(existing) => existing.total_amount += donation.amount,
            None => totals.push(CharacterStats {
                name: donation.character.clone(),
                total_amount: donation.amount,
            }),
        }
    }
    totals
}

#[must_use]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean, `0.0` for an empty list.
#[must_use]
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

/// Median, `0.0` for an empty list.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Gini coefficient over an ascending-sorted value list. `0.0` for empty
/// or all-zero input.
#[must_use]
pub fn gini(sorted_values: &[f64]) -> f64 {
    let total = sum(sorted_values);
    let count = sorted_values.len();
    if count == 0 || total == 0.0 {
        return 0.0;
    }
    let mut diff = 0.0;
    let mut acc = 0.0;
    for (i, value) in sorted_values.iter().enumerate() {
        acc += value;
        let acc_if_perfect = total / count as f64 * (i + 1) as f64;
        diff += acc_if_perfect - acc;
    }
    diff * 2.0 / count as f64 / total
}

/// How many of the smallest values combined still weigh less than `value`.
/// Saturates at the list length when `value` exceeds the whole total.
#[must_use]
pub fn bigger_than_the_x_smallest_combined(sorted_values: &[f64], value: f64) -> usize {
    let mut acc = 0.0;
    let mut taken = 0;
    while acc < value {
        let Some(next) = sorted_values.get(taken) else {
            return sorted_values.len();
        };
        acc += next;
        taken += 1;
    }
    taken.saturating_sub(1)
}
