//! Price drift between add-to-cart time and checkout.

use rust_decimal::Decimal;

/// Tolerance used when none is configured, in percent.
pub const DEFAULT_PRICE_DRIFT_TOLERANCE_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// How far a live price may move from the price a buyer saw before the
/// order is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceDriftPolicy {
    tolerance_percent: Decimal,
}

impl Default for PriceDriftPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_DRIFT_TOLERANCE_PERCENT)
    }
}

impl PriceDriftPolicy {
    /// Negative tolerances are treated as zero.
    #[must_use]
    pub fn new(tolerance_percent: Decimal) -> Self {
        Self {
            tolerance_percent: tolerance_percent.max(Decimal::ZERO),
        }
    }

    #[must_use]
    pub fn tolerance_percent(&self) -> Decimal {
        self.tolerance_percent
    }

    /// Whether `|live - added| / added` is above the tolerance.
    ///
    /// Any change from a zero add-time price counts as drift.
    #[must_use]
    pub fn exceeded(&self, added: u64, live: u64) -> bool {
        if added == live {
            return false;
        }

        if added == 0 {
            return true;
        }

        let diff = Decimal::from(added.abs_diff(live));
        let allowed = Decimal::from(added)
            .checked_mul(self.tolerance_percent)
            .map(|scaled| scaled / Decimal::ONE_HUNDRED);

        match allowed {
            Some(allowed) => diff > allowed,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerance_is_five_percent() {
        assert_eq!(PriceDriftPolicy::default().tolerance_percent(), Decimal::new(5, 0));
    }

    #[test]
    fn change_within_tolerance_is_accepted() {
        let policy = PriceDriftPolicy::default();

        assert!(!policy.exceeded(10_00, 10_00));
        assert!(!policy.exceeded(10_00, 10_50));
        assert!(!policy.exceeded(10_00, 9_50));
    }

    #[test]
    fn change_beyond_tolerance_is_drift() {
        let policy = PriceDriftPolicy::default();

        assert!(policy.exceeded(10_00, 10_51));
        assert!(policy.exceeded(10_00, 9_49));
    }

    #[test]
    fn zero_tolerance_rejects_any_change() {
        let policy = PriceDriftPolicy::new(Decimal::ZERO);

        assert!(policy.exceeded(10_00, 10_01));
        assert!(!policy.exceeded(10_00, 10_00));
    }

    #[test]
    fn negative_tolerance_is_clamped() {
        assert_eq!(
            PriceDriftPolicy::new(Decimal::new(-3, 0)).tolerance_percent(),
            Decimal::ZERO
        );
    }

    #[test]
    fn leaving_a_free_price_is_drift() {
        assert!(PriceDriftPolicy::default().exceeded(0, 1));
        assert!(!PriceDriftPolicy::default().exceeded(0, 0));
    }
}
