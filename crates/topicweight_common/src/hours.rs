//! Hours aggregation.
//!
//! Turns per-category weights and a days-per-year budget into a single
//! recommended number of research hours:
//!
//! ```text
//! available = days * 24
//! modifier  = 1 + personal_relevance_weight / 10   (1 when absent)
//! average   = mean of all weights, Personal Relevance included
//! hours     = round(average / 10 * available / 5 * modifier)
//! ```
//!
//! Days are capped at [`MAX_DAYS_PER_YEAR`].

use crate::types::{Category, CategoryName};

/// Upper bound on a days-per-year budget
pub const MAX_DAYS_PER_YEAR: f64 = 366.0;

/// Result of [`aggregate_hours`]
#[derive(Debug, Clone, PartialEq)]
pub struct HoursEstimate {
    pub total_hours: u32,
    pub description: String,
    pub average_weight: f64,
    pub relevance_modifier: f64,
    pub total_available_hours: f64,
}

/// Compute total recommended hours and the derivation text.
///
/// Only the first Personal Relevance category contributes a modifier. An
/// empty category list or a non-positive budget yields zero hours.
pub fn aggregate_hours(categories: &[Category], days_per_year: f64) -> HoursEstimate {
    let days = if days_per_year.is_finite() && days_per_year > 0.0 {
        days_per_year.min(MAX_DAYS_PER_YEAR)
    } else {
        0.0
    };
    let total_available_hours = days * 24.0;

    let relevance_modifier = categories
        .iter()
        .find(|c| c.name == CategoryName::PersonalRelevance)
        .map(|c| 1.0 + c.weight / 10.0)
        .unwrap_or(1.0);

    let average_weight = if categories.is_empty() {
        0.0
    } else {
        categories.iter().map(|c| c.weight).sum::<f64>() / categories.len() as f64
    };

    let raw = (average_weight / 10.0) * (total_available_hours / 5.0) * relevance_modifier;
    let total_hours = if raw.is_finite() && raw > 0.0 {
        raw.round() as u32
    } else {
        0
    };

    let mut description = format!(
        "{} hours recommended: average weight {:.1} across {} categories applied to one fifth of {} available hours",
        total_hours,
        round_half_up(average_weight),
        categories.len(),
        total_available_hours
    );
    if relevance_modifier > 1.0 {
        description.push_str(&format!(" × personal relevance modifier {}", relevance_modifier));
    }

    HoursEstimate {
        total_hours,
        description,
        average_weight,
        relevance_modifier,
        total_available_hours,
    }
}

/// One decimal place, halves away from zero (`{:.1}` alone rounds half to even)
fn round_half_up(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
