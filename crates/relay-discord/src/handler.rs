//! Gateway event handler.

use std::sync::Arc;

use relay_runtime::{AdminCommands, MessagePipeline};
use serenity::async_trait;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
};
use serenity::model::application::{Command, CommandInteraction, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::mention::Mentionable;
use serenity::prelude::*;
use tracing::{debug, error, info, instrument, warn};

use crate::channel::{DiscordChannel, fit_message};
use crate::commands::{self, SlashCommand};
use crate::convert;

/// Routes chat messages into the pipeline and slash commands into the
/// admin commands.
pub struct RelayHandler {
    pipeline: Arc<MessagePipeline>,
    commands: AdminCommands,
}

impl RelayHandler {
    /// Handler over the shared pipeline and commands.
    pub fn new(pipeline: Arc<MessagePipeline>, commands: AdminCommands) -> Self {
        Self { pipeline, commands }
    }

    #[instrument(skip_all, fields(command = %command.data.name, user = %command.user.name))]
    async fn handle_command(&self, ctx: &Context, command: &CommandInteraction) {
        let Some(kind) = SlashCommand::from_name(&command.data.name) else {
            warn!("unknown slash command");
            return;
        };
        let invoked_in = convert::channel_id(command.channel_id);

        let result = match kind {
            SlashCommand::SetChannel => {
                let is_admin = command
                    .member
                    .as_ref()
                    .and_then(|m| m.permissions)
                    .is_some_and(|p| p.administrator());
                let Some(channel) = commands::channel_option(&command.data.options) else {
                    respond(ctx, command, "Please choose a channel.", true).await;
                    return;
                };
                self.commands.set_channel(is_admin, convert::channel_id(channel))
            }
            SlashCommand::NewConversation => {
                let guild_id = command.guild_id.map(convert::guild_id);
                let mention = command.user.mention().to_string();
                self.commands.new_conversation(guild_id.as_ref(), invoked_in, &mention)
            }
            SlashCommand::ReloadKnowledge => {
                if let Err(e) = self.commands.require_active(invoked_in) {
                    respond(ctx, command, &e.to_string(), true).await;
                    return;
                }
                // Loading may outlast the interaction's response window.
                if let Err(e) = command.defer(&ctx.http).await {
                    warn!(error = %e, "failed to defer interaction");
                    return;
                }
                let text = match self.commands.reload_knowledge(invoked_in).await {
                    Ok(text) => text,
                    Err(e) => e.to_string(),
                };
                let followup = CreateInteractionResponseFollowup::new().content(fit_message(&text));
                if let Err(e) = command.create_followup(&ctx.http, followup).await {
                    warn!(error = %e, "failed to send followup");
                }
                return;
            }
        };

        match result {
            Ok(text) => respond(ctx, command, &text, false).await,
            Err(e) => {
                info!(error = %e, "command refused");
                respond(ctx, command, &e.to_string(), true).await;
            }
        }
    }
}

async fn respond(ctx: &Context, command: &CommandInteraction, text: &str, ephemeral: bool) {
    let message = CreateInteractionResponseMessage::new()
        .content(fit_message(text))
        .ephemeral(ephemeral);
    if let Err(e) = command
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
    {
        warn!(error = %e, "failed to respond to interaction");
    }
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        let own_id = ctx.cache.current_user().id;
        let inbound = convert::inbound_message(&msg, own_id);
        let channel = DiscordChannel::new(ctx.http.clone(), msg.channel_id);
        let outcome = self.pipeline.handle(inbound, &channel).await;
        debug!(message_id = %msg.id, ?outcome, "message handled");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_command(&ctx, &command).await;
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "connected to Discord");
        match Command::set_global_commands(&ctx.http, commands::definitions()).await {
            Ok(registered) => info!(count = registered.len(), "slash commands registered"),
            Err(e) => error!(error = %e, "failed to register slash commands"),
        }
    }
}
