//! The rig catalog: the fixed set of purchasable tiers.

use crate::domain::Decimal;
use rust_decimal::Decimal as RustDecimal;
use serde::Serialize;

/// Fraction of the purchase price returned per day (2%).
pub fn daily_rate() -> Decimal {
    Decimal::new(RustDecimal::new(2, 2))
}

/// Mining duration applied to every catalog tier.
pub const MINING_DAYS: u32 = 90;

/// One purchasable rig tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RigTier {
    pub rig_type: String,
    pub price: Decimal,
    pub daily_return: Decimal,
    pub mining_days: u32,
}

impl RigTier {
    fn priced(price: i64) -> Self {
        let price = Decimal::from_i64(price);
        RigTier {
            rig_type: format!("rig_{}", price.to_canonical_string()),
            price,
            daily_return: (price * daily_rate()).round_cents(),
            mining_days: MINING_DAYS,
        }
    }
}

/// The catalog of offered rig tiers. Purchases are only valid for an exact
/// (rig_type, price) pair from this list.
#[derive(Debug, Clone)]
pub struct RigCatalog {
    tiers: Vec<RigTier>,
}

impl RigCatalog {
    /// The standard platform catalog.
    pub fn standard() -> Self {
        RigCatalog {
            tiers: [1_000, 4_000, 8_000, 15_000, 60_000, 200_000]
                .into_iter()
                .map(RigTier::priced)
                .collect(),
        }
    }

    pub fn tiers(&self) -> &[RigTier] {
        &self.tiers
    }

    /// Look up the tier matching both the requested type and price.
    pub fn find(&self, rig_type: &str, price: Decimal) -> Option<&RigTier> {
        self.tiers
            .iter()
            .find(|t| t.rig_type == rig_type && t.price == price)
    }
}
