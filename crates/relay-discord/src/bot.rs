//! Discord client lifecycle.

use serenity::Client;
use serenity::prelude::GatewayIntents;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::handler::RelayHandler;

/// A connected-but-not-started Discord client.
pub struct DiscordBot {
    client: Client,
}

impl DiscordBot {
    /// Gateway intents the relay needs: guild metadata, guild messages, and
    /// their content.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }

    /// Build the client.
    pub async fn connect(token: &str, handler: RelayHandler) -> Result<Self, serenity::Error> {
        let client = Client::builder(token, Self::intents())
            .event_handler(handler)
            .await?;
        Ok(Self { client })
    }

    /// Run the gateway until `shutdown` fires.
    ///
    /// A gateway failure (bad token, missing intents) cancels `shutdown`,
    /// taking the rest of the process down with it.
    pub fn spawn(mut self, shutdown: CancellationToken) -> JoinHandle<()> {
        let shard_manager = self.client.shard_manager.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = self.client.start() => {
                    if let Err(e) = result {
                        error!(error = %e, "Discord client stopped");
                        shutdown.cancel();
                    }
                }
                () = shutdown.cancelled() => {
                    info!("shutting down Discord shards");
                    shard_manager.shutdown_all().await;
                }
            }
        })
    }
}
