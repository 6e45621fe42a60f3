//! Session cart command handlers.
//!
//! The cart lives in a JSON file (`CRAFTPORTAL_CART_PATH`). Pricing always
//! goes back to the backend so a quote reflects current prices, the active
//! bulk discount and the coupon as checkout will see them.

use std::fmt::Write as _;

use clap::Subcommand;
use craftportal_backend::{load_cart_quote, QuoteError};
use craftportal_core::{AppConfig, AppliedDiscount, Cart, CartQuote, PriceLabel};
use rust_decimal::Decimal;

use crate::store::CartStore;
use crate::{backend_client, signed_in_client, user_facing};

/// Sub-commands available under `cart`.
#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// Add a product, merging with an existing line
    Add {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product line
    Remove { product_id: String },
    /// Set a line's quantity; 0 removes it
    Set { product_id: String, quantity: u32 },
    /// Empty the cart
    Clear,
    /// Show cart lines without prices
    Show,
    /// Price the cart against the live store
    Quote {
        /// Coupon code to validate and apply
        #[arg(long)]
        coupon: Option<String>,
    },
    /// Buy everything in the cart, then empty it
    Checkout {
        /// Coupon code to validate and apply
        #[arg(long)]
        coupon: Option<String>,
    },
}

pub(crate) async fn run(config: &AppConfig, command: CartCommands) -> anyhow::Result<()> {
    let store = CartStore::new(config.cart_path.clone());

    match command {
        CartCommands::Add {
            product_id,
            quantity,
        } => {
            let mut cart = store.load()?;
            cart.add(&product_id, quantity)?;
            store.save(&cart)?;
            println!(
                "added {quantity} x {product_id} ({} items in cart)",
                cart.item_count()
            );
        }
        CartCommands::Remove { product_id } => {
            let mut cart = store.load()?;
            cart.remove(&product_id)?;
            store.save(&cart)?;
            println!("removed {product_id}");
        }
        CartCommands::Set {
            product_id,
            quantity,
        } => {
            let mut cart = store.load()?;
            cart.update_quantity(&product_id, quantity)?;
            store.save(&cart)?;
            println!("{product_id} quantity set to {quantity}");
        }
        CartCommands::Clear => {
            store.save(&Cart::new())?;
            println!("cart cleared");
        }
        CartCommands::Show => print!("{}", render_cart(&store.load()?)),
        CartCommands::Quote { coupon } => {
            let cart = store.load()?;
            if cart.is_empty() {
                println!("cart is empty");
                return Ok(());
            }
            let quote = quote(config, &cart, coupon.as_deref()).await?;
            print!("{}", render_quote(&quote));
        }
        CartCommands::Checkout { coupon } => {
            run_checkout(config, &store, coupon.as_deref()).await?;
        }
    }

    Ok(())
}

async fn quote(
    config: &AppConfig,
    cart: &Cart,
    coupon: Option<&str>,
) -> anyhow::Result<CartQuote> {
    let client = backend_client(config)?;
    load_cart_quote(&client, cart, coupon).await.map_err(|e| match e {
        QuoteError::Backend(err) => user_facing(err),
        other => anyhow::anyhow!(other),
    })
}

/// Quotes first so an unusable coupon is rejected before anything is bought.
async fn run_checkout(
    config: &AppConfig,
    store: &CartStore,
    coupon: Option<&str>,
) -> anyhow::Result<()> {
    let client = signed_in_client(config)?;
    let cart = store.load()?;
    if cart.is_empty() {
        anyhow::bail!("cart is empty; add products before checking out");
    }

    let quote = quote(config, &cart, coupon).await?;
    if quote.lines.is_empty() {
        anyhow::bail!("none of the products in the cart are available any more");
    }
    print!("{}", render_quote(&quote));

    let product_ids: Vec<String> = quote.lines.iter().map(|l| l.product_id.clone()).collect();
    let result = client
        .purchase(&product_ids, quote.coupon_code.as_deref())
        .await
        .map_err(user_facing)?;

    store.save(&Cart::new())?;
    tracing::info!(products = product_ids.len(), total = %quote.total, "checkout complete");
    println!(
        "{}",
        result
            .message
            .as_deref()
            .unwrap_or("purchase complete; items are waiting in your chest")
    );
    Ok(())
}

fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "cart is empty\n".to_string();
    }
    let mut out = String::new();
    for line in cart.lines() {
        let _ = writeln!(out, "{:>4} x {}", line.quantity, line.product_id);
    }
    let _ = writeln!(out, "{} items", cart.item_count());
    out
}

pub(crate) fn render_quote(quote: &CartQuote) -> String {
    let mut out = String::new();

    for line in &quote.lines {
        let unit = &line.unit;
        let _ = write!(out, "{:>4} x {:<30} {}", line.quantity, line.name, unit.label());
        if unit.is_discounted() {
            let source = match unit.applied {
                AppliedDiscount::Product => "product discount",
                AppliedDiscount::Bulk => "bulk discount",
                AppliedDiscount::None => "coupon",
            };
            let _ = write!(out, " (was {}, {source})", PriceLabel::from(unit.original));
        }
        let _ = writeln!(out, " = {}", PriceLabel::from(line.line_total));
    }

    let _ = writeln!(out, "Subtotal: {}", PriceLabel::from(quote.subtotal));
    if quote.cart_discount > Decimal::ZERO {
        let code = quote.coupon_code.as_deref().unwrap_or("coupon");
        let _ = writeln!(out, "{code}: -{:.2} ₺", quote.cart_discount);
    } else if let Some(code) = &quote.coupon_code {
        let _ = writeln!(out, "Coupon: {code}");
    }
    let _ = writeln!(out, "Total: {}", quote.total_label);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftportal_core::{quote_cart, Coupon, CouponType, DiscountKind, Product, QuoteLine};

    fn product(id: &str, price: i64, discount: Option<(&str, i64)>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Decimal::from(price),
            discount_type: discount.map(|(kind, _)| kind.to_string()),
            discount_value: discount.map(|(_, value)| Decimal::from(value)),
            description: None,
            image: None,
        }
    }

    #[test]
    fn render_cart_lists_lines() {
        let mut cart = Cart::new();
        cart.add("p1", 2).expect("add");
        let out = render_cart(&cart);
        assert!(out.contains("2 x p1"));
        assert!(out.contains("2 items"));
        assert_eq!(render_cart(&Cart::new()), "cart is empty\n");
    }

    #[test]
    fn render_quote_shows_discount_source_and_coupon() {
        let p1 = product("p1", 100, Some(("percentage", 20)));
        let coupon = Coupon {
            code: "SPRING10".to_string(),
            coupon_type: CouponType::CartDiscount,
            discount_type: DiscountKind::Percentage,
            discount_value: Decimal::from(10),
            min_cart_value: None,
            product_id: None,
            is_active: true,
        };
        let quote = quote_cart(
            &[QuoteLine {
                product: &p1,
                quantity: 1,
            }],
            None,
            Some(&coupon),
        )
        .expect("quote");

        let out = render_quote(&quote);
        assert!(out.contains("80.00 ₺ (was 100.00 ₺, product discount)"));
        assert!(out.contains("SPRING10: -8.00 ₺"));
        assert!(out.contains("Total: 72.00 ₺"));
    }

    #[test]
    fn render_quote_free_total() {
        let p1 = product("p1", 10, Some(("fixed", 50)));
        let quote = quote_cart(
            &[QuoteLine {
                product: &p1,
                quantity: 1,
            }],
            None,
            None,
        )
        .expect("quote");
        assert!(render_quote(&quote).contains("Total: Free"));
    }
}
