pub mod app_config;
pub mod cart;
pub mod config;
pub mod coupon;
pub mod marketplace;
pub mod money;
pub mod pricing;
pub mod status;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cart::{Cart, CartError, CartLine};
pub use config::{load_app_config, load_app_config_from_env};
pub use coupon::{validate_coupon, CouponRejection};
pub use marketplace::{
    BulkDiscount, Coupon, CouponType, DiscountKind, MarketplaceSettings, Product,
};
pub use pricing::{
    price_unit, quote_cart, quote_cart_with_coupon, AppliedDiscount, CartQuote, PriceLabel,
    PricedLine, PricingError, QuoteLine, UnitPrice,
};
pub use status::{Edition, PlayerCounts, ServerStatus, BEDROCK_PORT, DEFAULT_JAVA_PORT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
