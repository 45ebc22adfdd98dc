//! Slash command definitions.

use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{CommandDataOption, CommandOptionType};
use serenity::model::channel::ChannelType;
use serenity::model::id::ChannelId;
use serenity::model::permissions::Permissions;

/// Name of the channel option of `set_channel`.
pub const CHANNEL_OPTION: &str = "channel";

/// The administrative slash commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlashCommand {
    /// Choose the channel Yuuka talks in.
    SetChannel,
    /// Start a fresh conversation for the guild.
    NewConversation,
    /// Re-read the knowledge directory.
    ReloadKnowledge,
}

impl SlashCommand {
    /// Every command, in registration order.
    pub const ALL: [Self; 3] = [Self::SetChannel, Self::NewConversation, Self::ReloadKnowledge];

    /// Registered command name.
    pub fn name(self) -> &'static str {
        match self {
            Self::SetChannel => "set_channel",
            Self::NewConversation => "new_conversation",
            Self::ReloadKnowledge => "reload_knowledge",
        }
    }

    /// Look up a command by its registered name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Builder for global registration.
    pub fn definition(self) -> CreateCommand {
        let command = CreateCommand::new(self.name());
        match self {
            Self::SetChannel => command
                .description("Choose the channel (text or voice) Yuuka talks in.")
                .default_member_permissions(Permissions::ADMINISTRATOR)
                .add_option(
                    CreateCommandOption::new(
                        CommandOptionType::Channel,
                        CHANNEL_OPTION,
                        "Channel to talk in",
                    )
                    .channel_types(vec![ChannelType::Text, ChannelType::Voice])
                    .required(true),
                ),
            Self::NewConversation => command.description("Start a new conversation with Yuuka."),
            Self::ReloadKnowledge => {
                command.description("Reload the files in the knowledge base folder.")
            }
        }
    }
}

/// Builders for every command.
pub fn definitions() -> Vec<CreateCommand> {
    SlashCommand::ALL.into_iter().map(SlashCommand::definition).collect()
}

/// The `channel` option's value.
pub fn channel_option(options: &[CommandDataOption]) -> Option<ChannelId> {
    options
        .iter()
        .find(|o| o.name == CHANNEL_OPTION)
        .and_then(|o| o.value.as_channel_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for command in SlashCommand::ALL {
            assert_eq!(SlashCommand::from_name(command.name()), Some(command));
        }
        assert_eq!(SlashCommand::from_name("ping"), None);
    }

    #[test]
    fn set_channel_requires_a_text_or_voice_channel() {
        let json = serde_json::to_value(SlashCommand::SetChannel.definition()).unwrap();
        assert_eq!(json["name"], "set_channel");
        let option = &json["options"][0];
        assert_eq!(option["name"], CHANNEL_OPTION);
        assert_eq!(option["required"], true);
        assert_eq!(option["channel_types"], serde_json::json!([0, 2]));
    }

    #[test]
    fn all_commands_are_defined() {
        let names: Vec<String> = definitions()
            .into_iter()
            .map(|c| serde_json::to_value(c).unwrap()["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["set_channel", "new_conversation", "reload_knowledge"]);
    }
}
