use rust_decimal::Decimal;
use thiserror::Error;

use crate::marketplace::{Coupon, CouponType};

/// Why a coupon cannot be applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("coupon {code} is no longer active")]
    Inactive { code: String },

    #[error("coupon {code} requires a cart value of at least {minimum:.2}")]
    BelowMinimum { code: String, minimum: Decimal },

    #[error("coupon {code} only applies to product {product_id}, which is not in the cart")]
    ProductNotInCart { code: String, product_id: String },
}

/// Checks whether `coupon` may be applied to a cart.
///
/// `subtotal` is the cart value after per-item discounts but before any
/// coupon. Checks run in order: active flag, minimum cart value, then the
/// target product of a `product_discount` coupon.
///
/// # Errors
///
/// Returns the first [`CouponRejection`] that applies.
pub fn validate_coupon(
    coupon: &Coupon,
    subtotal: Decimal,
    product_ids: &[&str],
) -> Result<(), CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive {
            code: coupon.code.clone(),
        });
    }

    if let Some(minimum) = coupon.min_cart_value.filter(|m| *m > Decimal::ZERO) {
        if subtotal < minimum {
            return Err(CouponRejection::BelowMinimum {
                code: coupon.code.clone(),
                minimum,
            });
        }
    }

    if coupon.coupon_type == CouponType::ProductDiscount {
        if let Some(target) = coupon.product_id.as_deref() {
            if !product_ids.contains(&target) {
                return Err(CouponRejection::ProductNotInCart {
                    code: coupon.code.clone(),
                    product_id: target.to_string(),
                });
            }
        }
    }

    Ok(())
}
