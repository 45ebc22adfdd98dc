//! # persona-relay
//!
//! Binary entry point: loads settings, wires the pipeline between Discord,
//! Gemini, and the display clients, and runs until Ctrl-C.

#![deny(unsafe_code)]

mod app;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use relay_discord::{DiscordBot, RelayHandler};
use relay_settings::{RelaySettings, load_persona, load_settings};
use tracing::{info, warn};

/// Discord persona relay.
#[derive(Parser, Debug)]
#[command(name = "persona-relay", about = "Discord persona relay with live display clients")]
struct Cli {
    /// JSON settings file, merged over the defaults.
    #[arg(long, env = "RELAY_SETTINGS")]
    settings: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Knowledge directory (overrides settings).
    #[arg(long)]
    knowledge_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, settings: &mut RelaySettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(dir) = &self.knowledge_dir {
            settings.paths.knowledge_dir = dir.display().to_string();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.settings.as_deref()).context("Failed to load settings")?;
    cli.apply(&mut settings);
    relay_logging::init_subscriber(&settings.logging).context("Failed to initialise logging")?;
    settings.validate().context("Invalid configuration")?;

    let persona = load_persona(&settings.paths.persona_file()).context("Failed to load persona")?;
    let model = Arc::new(app::gemini_model(&settings, persona));
    let services = app::build_services(&settings, model);

    let _ = services.knowledge.reload().await;

    let (addr, server_handle) = services
        .server
        .listen()
        .await
        .context("Failed to bind display server")?;
    info!("display server listening on ws://{addr}");

    let handler = RelayHandler::new(services.pipeline.clone(), services.commands.clone());
    let bot = DiscordBot::connect(&settings.discord.token, handler)
        .await
        .context("Failed to create Discord client")?;

    let shutdown = services.server.shutdown().clone();
    let discord_handle = bot.spawn(shutdown.token());

    let token = shutdown.token();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for ctrl-c")?;
        }
        () = token.cancelled() => {
            warn!("a component failed, shutting down");
        }
    }

    info!("Shutting down...");
    shutdown
        .graceful_shutdown(
            vec![server_handle, discord_handle],
            Some(settings.server.shutdown_timeout()),
        )
        .await;
    info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_leave_settings_alone() {
        let cli = Cli::parse_from(["persona-relay"]);
        let mut settings = RelaySettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.port, 8765);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.paths.knowledge_dir, "knowledge_base");
    }

    #[test]
    fn cli_overrides_win() {
        let cli = Cli::parse_from([
            "persona-relay",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--knowledge-dir",
            "/srv/kb",
        ]);
        let mut settings = RelaySettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.paths.knowledge_dir, "/srv/kb");
    }

    #[test]
    fn cli_settings_path() {
        let cli = Cli::parse_from(["persona-relay", "--settings", "/etc/relay.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/etc/relay.json")));
    }
}
