//! Signed-in user commands: chest, redeem codes and voting.

use std::fmt::Write as _;

use clap::Subcommand;
use craftportal_backend::{ChestCounts, ChestItem, VoteProvider};
use craftportal_core::AppConfig;

use crate::{backend_client, signed_in_client, user_facing};

/// Sub-commands available under `vote`.
#[derive(Debug, Subcommand)]
pub enum VoteCommands {
    /// List vote providers
    Providers,
    /// Vote through a provider
    Send {
        /// Provider id as shown by `vote providers`
        provider_id: String,
    },
}

pub(crate) async fn run_chest(config: &AppConfig, user: &str) -> anyhow::Result<()> {
    let items = signed_in_client(config)?
        .get_chest_items(user)
        .await
        .map_err(user_facing)?;
    print!("{}", render_chest(&items));
    Ok(())
}

pub(crate) async fn run_redeem(config: &AppConfig, code: &str) -> anyhow::Result<()> {
    let result = signed_in_client(config)?
        .redeem_code(code)
        .await
        .map_err(user_facing)?;

    if !result.granted_anything() {
        anyhow::bail!(
            "{}",
            result
                .message
                .unwrap_or_else(|| format!("code {code} did not grant anything"))
        );
    }

    println!("code {code} redeemed");
    if let Some(bonus) = result.bonus.filter(|b| !b.is_zero()) {
        println!("  wallet credit: {bonus:.2} ₺");
    }
    for product in &result.products {
        println!("  product: {}", product.name);
    }
    Ok(())
}

pub(crate) async fn run_vote(config: &AppConfig, command: VoteCommands) -> anyhow::Result<()> {
    match command {
        VoteCommands::Providers => {
            let providers = backend_client(config)?
                .list_vote_providers()
                .await
                .map_err(user_facing)?;
            print!("{}", render_providers(&providers));
        }
        VoteCommands::Send { provider_id } => {
            let client = signed_in_client(config)?;
            let provider = client
                .get_vote_provider(&provider_id)
                .await
                .map_err(user_facing)?;
            if !provider.is_active {
                anyhow::bail!("{} voting is currently disabled", provider.display_name());
            }

            let result = client.send_vote(&provider_id).await.map_err(user_facing)?;
            if !result.status {
                anyhow::bail!("{}", result.message);
            }
            println!("{}", result.message);
            if let Some(next) = result.can_vote_at {
                println!("next vote available at {next}");
            }
        }
    }
    Ok(())
}

fn render_chest(items: &[ChestItem]) -> String {
    let counts = ChestCounts::from_items(items);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} items: {} available, {} used",
        counts.total, counts.available, counts.used
    );
    for item in items {
        let name = item
            .name
            .as_deref()
            .or(item.product_id.as_deref())
            .unwrap_or(&item.id);
        let state = if item.used { "used" } else { "available" };
        let _ = writeln!(out, "  [{state:>9}] {name}");
    }
    out
}

fn render_providers(providers: &[VoteProvider]) -> String {
    if providers.is_empty() {
        return "no vote providers configured\n".to_string();
    }
    let mut out = String::new();
    for provider in providers {
        let state = if provider.is_active { "" } else { " (disabled)" };
        let _ = writeln!(out, "{} {}{state}", provider.id, provider.display_name());
    }
    out
}
