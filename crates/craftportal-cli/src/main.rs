mod account;
mod cart;
mod servers;
mod store;

use clap::{Parser, Subcommand};
use craftportal_backend::{BackendClient, BackendError};
use craftportal_core::{AppConfig, DEFAULT_JAVA_PORT};
use craftportal_mcstatus::McStatusClient;
use tracing_subscriber::EnvFilter;

use crate::account::VoteCommands;
use crate::cart::CartCommands;

#[derive(Debug, Parser)]
#[command(name = "craftportal")]
#[command(about = "Craftportal community store command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Query the live status of a Minecraft server
    Status {
        /// Server host name or address
        #[arg(long)]
        ip: String,
        /// Server port; 19132 is queried as Bedrock
        #[arg(long, default_value_t = DEFAULT_JAVA_PORT)]
        port: u16,
    },
    /// Manage the session cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// List chest items waiting for in-game delivery
    Chest {
        /// User whose chest to list
        #[arg(long)]
        user: String,
    },
    /// Redeem a gift or promo code
    Redeem {
        /// The code to redeem
        code: String,
    },
    /// Vote for the server on a server-list site
    Vote {
        #[command(subcommand)]
        command: VoteCommands,
    },
    /// List the community's game servers with live status
    Servers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("craftportal: no command given, see --help");
        return Ok(());
    };

    let config = craftportal_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Status { ip, port } => servers::run_status(&config, &ip, port).await,
        Commands::Cart { command } => cart::run(&config, command).await,
        Commands::Chest { user } => account::run_chest(&config, &user).await,
        Commands::Redeem { code } => account::run_redeem(&config, &code).await,
        Commands::Vote { command } => account::run_vote(&config, command).await,
        Commands::Servers => servers::run_servers(&config).await,
    }
}

/// Backend client acting as the configured user, if a token is set.
pub(crate) fn backend_client(config: &AppConfig) -> anyhow::Result<BackendClient> {
    let client = BackendClient::new(
        &config.website_base_url(),
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build backend client: {e}"))?;
    Ok(client.with_optional_token(config.api_token.clone()))
}

/// Like [`backend_client`], but fails up front when no user token is set.
pub(crate) fn signed_in_client(config: &AppConfig) -> anyhow::Result<BackendClient> {
    if config.api_token.is_none() {
        anyhow::bail!("CRAFTPORTAL_API_TOKEN is not set; this command needs a signed-in user");
    }
    backend_client(config)
}

pub(crate) fn status_client(config: &AppConfig) -> anyhow::Result<McStatusClient> {
    McStatusClient::new(
        &config.status_api_url,
        config.status_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build status client: {e}"))
}

/// Turns a backend failure into the message the user should see, keeping
/// the full error in the debug log.
pub(crate) fn user_facing(error: BackendError) -> anyhow::Error {
    tracing::debug!(error = ?error, "backend request failed");
    anyhow::anyhow!(error.user_message())
}
