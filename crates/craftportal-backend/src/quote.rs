//! Prices a cart against live backend data.
//!
//! Shared by the HTTP quote endpoint and the CLI so both show exactly what
//! checkout will charge.

use chrono::Utc;
use craftportal_core::{
    quote_cart, quote_cart_with_coupon, Cart, CartQuote, PricingError, Product, QuoteLine,
};
use futures::future::join_all;
use thiserror::Error;

use crate::client::BackendClient;
use crate::error::BackendError;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("coupon {0} does not exist")]
    UnknownCoupon(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Loads every product in `cart` concurrently together with the marketplace
/// settings, then prices the cart with the active bulk discount and the
/// optional coupon.
///
/// Products the backend no longer knows are skipped with a warning.
///
/// # Errors
///
/// Returns [`QuoteError::UnknownCoupon`] when the coupon does not exist,
/// [`QuoteError::Pricing`] when it is rejected or the cart is too large to
/// price, and [`QuoteError::Backend`] for any other backend failure.
pub async fn load_cart_quote(
    client: &BackendClient,
    cart: &Cart,
    coupon_code: Option<&str>,
) -> Result<CartQuote, QuoteError> {
    let (products, settings) = futures::join!(
        join_all(
            cart.lines()
                .iter()
                .map(|line| client.get_product(&line.product_id))
        ),
        client.get_marketplace_settings()
    );
    let settings = settings?;

    let mut loaded: Vec<(Product, u32)> = Vec::with_capacity(products.len());
    for (line, result) in cart.lines().iter().zip(products) {
        match result {
            Ok(product) => loaded.push((product, line.quantity)),
            Err(e) if e.is_not_found() => {
                tracing::warn!(product_id = %line.product_id, "skipping unknown product");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let lines: Vec<QuoteLine<'_>> = loaded
        .iter()
        .map(|(product, quantity)| QuoteLine {
            product,
            quantity: *quantity,
        })
        .collect();
    let bulk = settings.active_bulk_discount(Utc::now());

    let Some(code) = coupon_code.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(quote_cart(&lines, bulk, None)?);
    };

    let coupon = match client.get_coupon(code).await {
        Ok(coupon) => coupon,
        Err(e) if e.is_not_found() => return Err(QuoteError::UnknownCoupon(code.to_string())),
        Err(e) => return Err(e.into()),
    };

    Ok(quote_cart_with_coupon(&lines, bulk, &coupon)?)
}
