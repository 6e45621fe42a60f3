pub mod client;
pub mod error;
pub mod quote;
pub mod types;

pub use client::BackendClient;
pub use error::BackendError;
pub use quote::{load_cart_quote, QuoteError};
pub use types::{
    primary_server, ChestCounts, ChestItem, GameServer, PurchaseResult, RedeemResult,
    RedeemedProduct, VoteProvider, VoteResult,
};
