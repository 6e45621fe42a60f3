use std::fmt::Write as _;

use craftportal_backend::{primary_server, GameServer};
use craftportal_core::{AppConfig, ServerStatus};
use futures::future::join_all;

use crate::{backend_client, status_client, user_facing};

pub(crate) async fn run_status(config: &AppConfig, ip: &str, port: u16) -> anyhow::Result<()> {
    let client = status_client(config)?;
    let status = client.fetch_or_offline(ip, port).await;
    println!("{ip}:{port} {}", render_status(&status));
    if let Some(motd) = status.motd.as_deref().filter(|m| !m.trim().is_empty()) {
        println!("{motd}");
    }
    Ok(())
}

/// Lists every server with its live status, the advertised one first.
pub(crate) async fn run_servers(config: &AppConfig) -> anyhow::Result<()> {
    let servers = backend_client(config)?
        .list_servers()
        .await
        .map_err(user_facing)?;
    if servers.is_empty() {
        println!("no servers configured");
        return Ok(());
    }

    let ordered = primary_first(&servers);
    let status = status_client(config)?;
    let statuses = join_all(
        ordered
            .iter()
            .map(|server| status.fetch_or_offline(&server.ip, server.port)),
    )
    .await;

    let mut out = String::new();
    for (index, (server, live)) in ordered.iter().zip(&statuses).enumerate() {
        let marker = if index == 0 { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {} ({}:{}) {}",
            server.name,
            server.ip,
            server.port,
            render_status(live)
        );
    }
    print!("{out}");
    Ok(())
}

fn primary_first(servers: &[GameServer]) -> Vec<&GameServer> {
    let primary = primary_server(servers);
    primary
        .into_iter()
        .chain(
            servers
                .iter()
                .filter(|s| !primary.is_some_and(|p| std::ptr::eq(*s, p))),
        )
        .collect()
}

fn render_status(status: &ServerStatus) -> String {
    if !status.online {
        return "offline".to_string();
    }
    let mut out = String::from("online");
    if let Some(edition) = status.edition {
        let _ = write!(out, " [{edition}]");
    }
    if let Some(players) = status.players {
        let _ = write!(out, " {}/{} players", players.online, players.max);
    }
    if let Some(version) = &status.version {
        let _ = write!(out, " {version}");
    }
    out
}
