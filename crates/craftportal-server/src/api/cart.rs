use axum::{extract::State, http::HeaderMap, Extension, Json};
use craftportal_backend::{load_cart_quote, QuoteError};
use craftportal_core::{Cart, CartQuote};
use serde::Deserialize;

use crate::middleware::{bearer_token, RequestId};

use super::{map_backend_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct QuoteRequest {
    #[serde(default)]
    items: Vec<QuoteItem>,
    #[serde(default)]
    coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteItem {
    product_id: String,
    quantity: u32,
}

/// `POST /api/v1/cart/quote`
///
/// Prices a cart the same way checkout will: live product data, the active
/// bulk discount and an optional coupon, validated before it is applied.
pub(super) async fn quote_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<CartQuote>>, ApiError> {
    let mut cart = Cart::new();
    for item in &body.items {
        cart.add(&item.product_id, item.quantity).map_err(|e| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                format!("{}: {e}", item.product_id),
            )
        })?;
    }

    let backend = state
        .backend
        .clone()
        .with_optional_token(bearer_token(&headers));

    let quote = load_cart_quote(&backend, &cart, body.coupon_code.as_deref())
        .await
        .map_err(|e| match e {
            QuoteError::Backend(err) => map_backend_error(req_id.0.clone(), &err),
            other => ApiError::new(req_id.0.clone(), "validation_error", other.to_string()),
        })?;

    tracing::debug!(
        lines = quote.lines.len(),
        total = %quote.total,
        coupon = ?quote.coupon_code,
        "cart quoted"
    );

    Ok(Json(ApiResponse {
        data: quote,
        meta: ResponseMeta::new(req_id.0),
    }))
}
