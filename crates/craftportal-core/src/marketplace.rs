//! Storefront view models shared by the pricing code and the backend client.
//!
//! Field names follow the backend's camelCase JSON. Money fields go through
//! [`crate::money`] so a malformed amount degrades to "no discount" rather than
//! a decode failure.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::money::{lenient_decimal, lenient_price};

/// How a discount value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is a percentage of the price it is applied to.
    Percentage,
    /// `value` is a flat amount in store currency.
    #[default]
    Fixed,
}

impl DiscountKind {
    /// Parses the backend's free-form discount type; anything unknown is `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "percentage" => Some(Self::Percentage),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }

    /// Amount taken off `base` by a discount of `value`, or `None` when the
    /// result does not fit in a `Decimal`.
    #[must_use]
    pub fn amount_off(self, base: Decimal, value: Decimal) -> Option<Decimal> {
        match self {
            Self::Percentage => base.checked_mul(value)?.checked_div(Decimal::ONE_HUNDRED),
            Self::Fixed => Some(value),
        }
    }

    /// Short label such as `%10` or `5₺`, as shown on discount badges.
    #[must_use]
    pub fn label(self, value: Decimal) -> String {
        match self {
            Self::Percentage => format!("%{}", value.normalize()),
            Self::Fixed => format!("{}₺", value.round_dp(2).normalize()),
        }
    }
}

/// Bulk and coupon types: only `"percentage"` is a percentage, anything else
/// (including `null` or a missing field) is a flat amount.
fn lenient_kind<'de, D>(deserializer: D) -> Result<DiscountKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw.as_ref().and_then(Value::as_str).map(str::trim) {
        Some("percentage") => DiscountKind::Percentage,
        _ => DiscountKind::Fixed,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountKind::Percentage => write!(f, "percentage"),
            DiscountKind::Fixed => write!(f, "fixed"),
        }
    }
}

/// A store product as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Decimal,
    /// Raw discount type; only `"percentage"` and `"fixed"` are honoured.
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub discount_value: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// The product's own discount, if it is well-formed and positive.
    #[must_use]
    pub fn product_discount(&self) -> Option<(DiscountKind, Decimal)> {
        let kind = DiscountKind::parse(self.discount_type.as_deref()?)?;
        let value = self.discount_value?;
        (value > Decimal::ZERO).then_some((kind, value))
    }
}

/// Site-wide promotional rule from the marketplace settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDiscount {
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: DiscountKind,
    #[serde(default, deserialize_with = "lenient_price")]
    pub amount: Decimal,
    /// Raw expiry as sent by the backend; see [`BulkDiscount::expires_at`].
    #[serde(default)]
    pub expire_date: Option<String>,
    /// Product ids the rule is restricted to. Empty means every product.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub products: Vec<String>,
}

impl BulkDiscount {
    /// Whether the rule covers `product_id` (ignores expiry).
    #[must_use]
    pub fn covers(&self, product_id: &str) -> bool {
        self.amount > Decimal::ZERO
            && (self.products.is_empty() || self.products.iter().any(|p| p == product_id))
    }

    /// Parsed expiry. Accepts RFC 3339 or `YYYY-MM-DD HH:MM:SS` (taken as UTC).
    /// An unparseable value is treated as "no expiry".
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expire_date.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expiry| expiry <= now)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSettings {
    #[serde(default)]
    pub bulk_discount: Option<BulkDiscount>,
}

impl MarketplaceSettings {
    /// The bulk discount to price with at `now`, dropping an expired one.
    #[must_use]
    pub fn active_bulk_discount(&self, now: DateTime<Utc>) -> Option<&BulkDiscount> {
        self.bulk_discount
            .as_ref()
            .filter(|bulk| !bulk.is_expired_at(now))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
    CartDiscount,
    ProductDiscount,
    FreeProduct,
}

/// A coupon looked up by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    #[serde(rename = "type")]
    pub coupon_type: CouponType,
    #[serde(default, deserialize_with = "lenient_kind")]
    pub discount_type: DiscountKind,
    #[serde(default, deserialize_with = "lenient_price")]
    pub discount_value: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub min_cart_value: Option<Decimal>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl Coupon {
    /// Whether a `product_discount` coupon reduces `product_id`.
    ///
    /// Other coupon types never discount individual products.
    #[must_use]
    pub fn discounts_product(&self, product_id: &str) -> bool {
        self.coupon_type == CouponType::ProductDiscount
            && self
                .product_id
                .as_deref()
                .is_none_or(|target| target == product_id)
    }

    /// One-line summary shown after the coupon is applied.
    #[must_use]
    pub fn summary(&self) -> String {
        let off = self.discount_type.label(self.discount_value);
        match self.coupon_type {
            CouponType::ProductDiscount => {
                format!("{} applied: {off} off selected products", self.code)
            }
            CouponType::CartDiscount => format!("{} applied: {off} off the cart", self.code),
            CouponType::FreeProduct => format!("{} applied: free product added", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn product_decodes_string_price_and_ignores_garbage_discount() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "VIP Rank",
            "price": "100",
            "discountType": "percentage",
            "discountValue": "lots"
        }))
        .expect("product should decode");
        assert_eq!(product.price, Decimal::from(100));
        assert!(product.product_discount().is_none());
    }

    #[test]
    fn product_discount_requires_known_type_and_positive_value() {
        let mut product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "VIP Rank",
            "price": 100,
            "discountType": "bogus",
            "discountValue": 10
        }))
        .expect("product should decode");
        assert!(product.product_discount().is_none());

        product.discount_type = Some("fixed".to_string());
        assert_eq!(
            product.product_discount(),
            Some((DiscountKind::Fixed, Decimal::from(10)))
        );

        product.discount_value = Some(Decimal::ZERO);
        assert!(product.product_discount().is_none());
    }

    #[test]
    fn bulk_discount_covers_all_products_when_list_empty() {
        let bulk = BulkDiscount {
            kind: DiscountKind::Fixed,
            amount: Decimal::from(5),
            expire_date: None,
            products: vec![],
        };
        assert!(bulk.covers("anything"));

        let restricted = BulkDiscount {
            products: vec!["p2".to_string()],
            ..bulk.clone()
        };
        assert!(!restricted.covers("p1"));
        assert!(restricted.covers("p2"));

        let zero = BulkDiscount {
            amount: Decimal::ZERO,
            ..bulk
        };
        assert!(!zero.covers("p1"));
    }

    #[test]
    fn expired_bulk_discount_is_dropped_from_settings() {
        let settings: MarketplaceSettings = serde_json::from_value(json!({
            "bulkDiscount": {
                "type": "percentage",
                "amount": 15,
                "expireDate": "2026-01-01T00:00:00Z",
                "products": []
            }
        }))
        .expect("settings should decode");

        let before = Utc.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        assert!(settings.active_bulk_discount(before).is_some());
        assert!(settings.active_bulk_discount(after).is_none());
    }

    #[test]
    fn bulk_discount_accepts_space_separated_expiry() {
        let bulk = BulkDiscount {
            kind: DiscountKind::Percentage,
            amount: Decimal::from(10),
            expire_date: Some("2026-03-01 10:00:00".to_string()),
            products: vec![],
        };
        assert_eq!(
            bulk.expires_at(),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn unparseable_expiry_never_expires() {
        let bulk = BulkDiscount {
            kind: DiscountKind::Percentage,
            amount: Decimal::from(10),
            expire_date: Some("next tuesday".to_string()),
            products: vec![],
        };
        assert!(!bulk.is_expired_at(Utc::now()));
    }

    #[test]
    fn disabled_bulk_rule_with_null_type_still_decodes() {
        let settings: MarketplaceSettings = serde_json::from_value(json!({
            "bulkDiscount": {
                "type": null,
                "amount": 0,
                "expireDate": null,
                "products": null
            }
        }))
        .expect("settings should decode");

        let bulk = settings.bulk_discount.expect("rule kept");
        assert_eq!(bulk.kind, DiscountKind::Fixed);
        assert!(bulk.products.is_empty());
        assert!(!bulk.covers("p1"));
    }

    #[test]
    fn unknown_bulk_and_coupon_types_are_flat_amounts() {
        let bulk: BulkDiscount =
            serde_json::from_value(json!({ "type": "amount", "amount": "7.5" })).unwrap();
        assert_eq!(bulk.kind, DiscountKind::Fixed);
        assert!(bulk.covers("p1"));

        let coupon: Coupon = serde_json::from_value(json!({
            "code": "FLAT",
            "type": "cart_discount",
            "discountType": "flat",
            "discountValue": 3,
            "isActive": true
        }))
        .unwrap();
        assert_eq!(coupon.discount_type, DiscountKind::Fixed);
    }

    #[test]
    fn percentage_amount_off_overflow_is_none() {
        assert_eq!(
            DiscountKind::Percentage.amount_off(Decimal::from(200), Decimal::from(10)),
            Some(Decimal::from(20))
        );
        assert_eq!(
            DiscountKind::Percentage.amount_off(Decimal::MAX, Decimal::from(1000)),
            None
        );
    }

    #[test]
    fn coupon_decodes_backend_shape() {
        let coupon: Coupon = serde_json::from_value(json!({
            "code": "SPRING10",
            "type": "cart_discount",
            "discountType": "percentage",
            "discountValue": 10,
            "minCartValue": null,
            "isActive": true
        }))
        .expect("coupon should decode");
        assert_eq!(coupon.coupon_type, CouponType::CartDiscount);
        assert!(coupon.min_cart_value.is_none());
        assert_eq!(coupon.summary(), "SPRING10 applied: %10 off the cart");
    }

    #[test]
    fn untargeted_product_coupon_discounts_every_product() {
        let coupon = Coupon {
            code: "ALL5".to_string(),
            coupon_type: CouponType::ProductDiscount,
            discount_type: DiscountKind::Fixed,
            discount_value: Decimal::from(5),
            min_cart_value: None,
            product_id: None,
            is_active: true,
        };
        assert!(coupon.discounts_product("p1"));
        assert!(coupon.discounts_product("p2"));

        let cart_wide = Coupon {
            coupon_type: CouponType::CartDiscount,
            ..coupon
        };
        assert!(!cart_wide.discounts_product("p1"));
    }
}
