//! Data-quality → uncertainty band and confidence label

use crate::aggregator::round_to;
use crate::types::{ConfidenceLevel, DataQuality, EmissionRange};

/// Relative half-width of the uncertainty band for a quality label
pub fn uncertainty_of(quality: DataQuality) -> f64 {
    match quality {
        DataQuality::PrimaryResearch => 0.10,
        DataQuality::Secondary => 0.20,
        DataQuality::InferenceEstimated => 0.25,
        DataQuality::Extrapolated => 0.30,
        DataQuality::ErrorFallback => 0.50,
        DataQuality::Default => 0.25,
    }
}

/// Discrete label for a relative uncertainty
pub fn confidence_of(uncertainty: f64) -> ConfidenceLevel {
    if !uncertainty.is_finite() {
        ConfidenceLevel::VeryLow
    } else if uncertainty <= 0.10 {
        ConfidenceLevel::VeryHigh
    } else if uncertainty <= 0.20 {
        ConfidenceLevel::High
    } else if uncertainty <= 0.25 {
        ConfidenceLevel::Medium
    } else if uncertainty <= 0.30 {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::VeryLow
    }
}

/// Uncertainty for an ingredient whose weight and context came from inference
pub fn enriched_uncertainty(factor_quality: DataQuality) -> f64 {
    uncertainty_of(factor_quality).max(uncertainty_of(DataQuality::InferenceEstimated))
}

/// Relative half-width of a range around `total`; infinite for a zero total
///
/// Rounded to 9 decimals so a band built from a table value lands back on
/// that value and not one ulp above a label boundary.
pub fn relative_half_width(range: &EmissionRange, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() {
        return f64::INFINITY;
    }
    round_to((range.upper - range.lower) / (2.0 * total), 9)
}
