//! Referral commission rates.

use crate::domain::{Decimal, ReferralLayer};
use rust_decimal::Decimal as RustDecimal;

/// Commission rate for a referral layer: 5% direct, 2.5% second-degree.
pub fn layer_rate(layer: ReferralLayer) -> Decimal {
    match layer {
        ReferralLayer::Direct => Decimal::new(RustDecimal::new(5, 2)),
        ReferralLayer::Second => Decimal::new(RustDecimal::new(25, 3)),
    }
}

/// Commission owed to a layer's beneficiary on `earned`, rounded to cents.
///
/// Each layer is computed from the earning account's tick total directly,
/// never from another layer's rounded amount.
pub fn commission_for(layer: ReferralLayer, earned: Decimal) -> Decimal {
    (earned * layer_rate(layer)).round_cents()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_reference_rates() {
        assert_eq!(commission_for(ReferralLayer::Direct, d("100")), d("5"));
        assert_eq!(commission_for(ReferralLayer::Second, d("100")), d("2.5"));
    }

    #[test]
    fn test_layers_round_independently() {
        // 0.30: layer-1 would be 0.015 -> 0.02; layer-2 is 0.0075 -> 0.01,
        // not 2.5/5 of the rounded layer-1 amount.
        assert_eq!(commission_for(ReferralLayer::Direct, d("0.30")), d("0.02"));
        assert_eq!(commission_for(ReferralLayer::Second, d("0.30")), d("0.01"));
    }

    #[test]
    fn test_sub_cent_commission_rounds_to_zero() {
        assert_eq!(
            commission_for(ReferralLayer::Second, d("0.01")),
            Decimal::zero()
        );
    }
}
