//! Effective price calculation for store products and carts.
//!
//! Three discount sources stack as follows:
//!
//! 1. the product's own discount and the site-wide bulk discount compete, and
//!    whichever yields the lower unit price wins;
//! 2. a `product_discount` coupon is then taken off that already-reduced price;
//! 3. a `cart_discount` coupon is taken once off the cart subtotal.
//!
//! `free_product` coupons carry no arithmetic. No price ever goes below zero.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::coupon::{validate_coupon, CouponRejection};
use crate::marketplace::{BulkDiscount, Coupon, CouponType, DiscountKind, Product};

/// Which per-product discount source produced [`UnitPrice::discounted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedDiscount {
    None,
    Product,
    Bulk,
}

/// Per-unit pricing breakdown for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitPrice {
    pub original: Decimal,
    /// Best of the product and bulk discounts, before any coupon.
    pub discounted: Decimal,
    pub applied: AppliedDiscount,
    /// Amount the winning discount took off `original`.
    pub discount_amount: Decimal,
    /// Amount a product coupon took off `discounted`.
    pub coupon_amount: Decimal,
    pub final_price: Decimal,
}

impl UnitPrice {
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.final_price < self.original
    }

    #[must_use]
    pub fn label(&self) -> PriceLabel {
        PriceLabel::from(self.final_price)
    }
}

/// Ways pricing a cart can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("cart total is too large to price")]
    Overflow,

    #[error(transparent)]
    Coupon(#[from] CouponRejection),
}

/// `original` reduced by a discount of `value`, floored at zero by the caller.
fn reduce(
    original: Decimal,
    kind: DiscountKind,
    value: Decimal,
) -> Result<Decimal, PricingError> {
    kind.amount_off(original, value)
        .and_then(|off| original.checked_sub(off))
        .ok_or(PricingError::Overflow)
}

/// Computes the effective unit price of `product`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if a discount does not fit in a `Decimal`.
pub fn price_unit(
    product: &Product,
    bulk: Option<&BulkDiscount>,
    coupon: Option<&Coupon>,
) -> Result<UnitPrice, PricingError> {
    let original = product.price;

    let product_price = product
        .product_discount()
        .map(|(kind, value)| reduce(original, kind, value))
        .transpose()?;
    let bulk_price = bulk
        .filter(|b| b.covers(&product.id))
        .map(|b| reduce(original, b.kind, b.amount))
        .transpose()?;

    let (discounted, applied) = match (product_price, bulk_price) {
        (Some(p), Some(b)) if b < p => (b, AppliedDiscount::Bulk),
        (Some(p), _) => (p, AppliedDiscount::Product),
        (None, Some(b)) => (b, AppliedDiscount::Bulk),
        (None, None) => (original, AppliedDiscount::None),
    };
    let discounted = discounted.max(Decimal::ZERO);

    let coupon_amount = match coupon.filter(|c| c.discounts_product(&product.id)) {
        Some(c) => c
            .discount_type
            .amount_off(discounted, c.discount_value)
            .ok_or(PricingError::Overflow)?
            .clamp(Decimal::ZERO, discounted),
        None => Decimal::ZERO,
    };

    Ok(UnitPrice {
        original,
        discounted,
        applied,
        discount_amount: original.checked_sub(discounted).ok_or(PricingError::Overflow)?,
        coupon_amount,
        final_price: discounted - coupon_amount,
    })
}

/// One cart entry to be priced.
#[derive(Debug, Clone, Copy)]
pub struct QuoteLine<'a> {
    pub product: &'a Product,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricedLine {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit: UnitPrice,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartQuote {
    pub lines: Vec<PricedLine>,
    /// Sum of line totals, after per-item discounts and product coupons.
    pub subtotal: Decimal,
    /// Amount a cart coupon took off `subtotal`.
    pub cart_discount: Decimal,
    pub total: Decimal,
    pub total_label: PriceLabel,
    pub coupon_code: Option<String>,
}

impl CartQuote {
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }
}

/// Prices every line and applies a cart-wide coupon once to the subtotal.
///
/// The coupon is applied as given; use [`quote_cart_with_coupon`] to check
/// eligibility first.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if a line total or the subtotal does not
/// fit in a `Decimal`.
pub fn quote_cart(
    lines: &[QuoteLine<'_>],
    bulk: Option<&BulkDiscount>,
    coupon: Option<&Coupon>,
) -> Result<CartQuote, PricingError> {
    let priced = lines
        .iter()
        .map(|line| {
            let unit = price_unit(line.product, bulk, coupon)?;
            let line_total = unit
                .final_price
                .checked_mul(Decimal::from(line.quantity))
                .ok_or(PricingError::Overflow)?;
            Ok(PricedLine {
                product_id: line.product.id.clone(),
                name: line.product.name.clone(),
                quantity: line.quantity,
                line_total,
                unit,
            })
        })
        .collect::<Result<Vec<_>, PricingError>>()?;

    let subtotal = priced
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.line_total))
        .ok_or(PricingError::Overflow)?;

    let cart_discount = match coupon.filter(|c| c.coupon_type == CouponType::CartDiscount) {
        Some(c) => c
            .discount_type
            .amount_off(subtotal, c.discount_value)
            .ok_or(PricingError::Overflow)?
            .clamp(Decimal::ZERO, subtotal),
        None => Decimal::ZERO,
    };

    let total = subtotal - cart_discount;

    Ok(CartQuote {
        lines: priced,
        subtotal,
        cart_discount,
        total,
        total_label: PriceLabel::from(total),
        coupon_code: coupon.map(|c| c.code.clone()),
    })
}

/// Validates `coupon` against the coupon-free quote, then prices with it.
///
/// # Errors
///
/// Returns [`PricingError::Coupon`] with the first rule the coupon fails, or
/// [`PricingError::Overflow`] if the cart cannot be priced.
pub fn quote_cart_with_coupon(
    lines: &[QuoteLine<'_>],
    bulk: Option<&BulkDiscount>,
    coupon: &Coupon,
) -> Result<CartQuote, PricingError> {
    let base = quote_cart(lines, bulk, None)?;
    let product_ids: Vec<&str> = base.lines.iter().map(|l| l.product_id.as_str()).collect();
    validate_coupon(coupon, base.subtotal, &product_ids)?;
    quote_cart(lines, bulk, Some(coupon))
}

/// How a price is presented: zero (or less) reads as free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceLabel {
    Free,
    Amount(Decimal),
}

impl From<Decimal> for PriceLabel {
    fn from(price: Decimal) -> Self {
        if price <= Decimal::ZERO {
            Self::Free
        } else {
            Self::Amount(price.round_dp(2))
        }
    }
}

impl std::fmt::Display for PriceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceLabel::Free => write!(f, "Free"),
            PriceLabel::Amount(amount) => write!(f, "{amount:.2} ₺"),
        }
    }
}

impl Serialize for PriceLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
