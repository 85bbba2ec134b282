//! Threshold comparison.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of comparing a period's total against the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdResult {
    /// Total cost for the period.
    pub total_cost: Decimal,
    /// Configured threshold.
    pub threshold: Decimal,
    /// Whether the total is strictly above the threshold.
    pub exceeded: bool,
    /// Amount above the threshold, zero when not exceeded.
    pub overage: Decimal,
}

impl ThresholdResult {
    /// Compare `total_cost` against `threshold`.
    #[must_use]
    pub fn evaluate(total_cost: Decimal, threshold: Decimal) -> Self {
        let exceeded = total_cost > threshold;
        let overage = if exceeded {
            total_cost - threshold
        } else {
            Decimal::ZERO
        };

        Self {
            total_cost,
            threshold,
            exceeded,
            overage,
        }
    }
}
