//! Pricing engine.
//!
//! Pure computation, no side effects, no I/O. The same [`quote`] call
//! prices the live cart display and, once at order-creation time, the
//! immutable totals snapshotted onto the order - so the two can never
//! disagree.

use rust_decimal::Decimal;
use serde::Serialize;

use luxe_core::Money;

/// Pricing thresholds and rates.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Subtotal at which shipping becomes free. The comparison is
    /// inclusive: a subtotal exactly at the threshold ships free.
    pub free_shipping_threshold: Money,
    /// Shipping cost charged below the threshold.
    pub flat_shipping_cost: Money,
    /// Tax rate as a fraction of the subtotal (e.g. 0.08), never negative.
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_cents(10_000),
            flat_shipping_cost: Money::from_cents(999),
            tax_rate: Decimal::new(8, 2),
        }
    }
}

/// Computed totals for a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Sum of line totals, rounded to cents.
    pub subtotal: Money,
    /// Zero at or above the free-shipping threshold, flat cost below it.
    pub shipping_cost: Money,
    /// Tax on the subtotal, rounded to cents.
    pub tax_amount: Money,
    /// `subtotal + shipping_cost + tax_amount`.
    pub total_amount: Money,
}

impl Totals {
    /// How much more must be spent to reach free shipping, if anything.
    #[must_use]
    pub fn amount_to_free_shipping(&self, config: &PricingConfig) -> Option<Money> {
        if self.subtotal >= config.free_shipping_threshold {
            return None;
        }
        Money::new(config.free_shipping_threshold.amount() - self.subtotal.amount()).ok()
    }
}

/// Compute totals for a sequence of `(quantity, unit_price)` lines.
///
/// Line totals accumulate exactly; rounding to cents happens once on the
/// accumulated subtotal and once on the tax, never at intermediate steps.
/// An empty sequence yields a zero subtotal, which still pays flat
/// shipping unless the threshold is itself zero.
#[must_use]
pub fn quote<I>(lines: I, config: &PricingConfig) -> Totals
where
    I: IntoIterator<Item = (u32, Money)>,
{
    let raw: Money = lines
        .into_iter()
        .map(|(quantity, unit_price)| unit_price.times(quantity))
        .sum();
    let subtotal = raw.round2();

    let shipping_cost = if subtotal >= config.free_shipping_threshold {
        Money::ZERO
    } else {
        config.flat_shipping_cost
    };

    // tax_rate is validated non-negative at config load, so the product of
    // two non-negatives is safe to clamp.
    let tax_amount = Money::new(subtotal.amount() * config.tax_rate)
        .unwrap_or(Money::ZERO)
        .round2();

    Totals {
        subtotal,
        shipping_cost,
        tax_amount,
        total_amount: subtotal + shipping_cost + tax_amount,
    }
}
