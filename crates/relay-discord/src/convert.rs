//! serenity models → relay types.

use relay_core::{ChannelId, GuildId};
use relay_runtime::{Attachment, Author, InboundMessage};
use serenity::model::channel::{Attachment as DiscordAttachment, Message};
use serenity::model::id::{ChannelId as DiscordChannelId, GuildId as DiscordGuildId, UserId};

/// Guild id as the registry keys it.
pub fn guild_id(id: DiscordGuildId) -> GuildId {
    GuildId::from(id.get())
}

/// Channel id as the active-channel store keeps it.
pub fn channel_id(id: DiscordChannelId) -> ChannelId {
    ChannelId::new(id.get())
}

/// Guild nickname if set, else the account's display name.
pub fn display_name<'a>(nick: Option<&'a str>, account_name: &'a str) -> &'a str {
    nick.filter(|n| !n.trim().is_empty()).unwrap_or(account_name)
}

/// Attachment metadata.
pub fn attachment(a: &DiscordAttachment) -> Attachment {
    Attachment {
        filename: a.filename.clone(),
        url: a.url.clone(),
        content_type: a.content_type.clone(),
        size: u64::from(a.size),
    }
}

/// Build the pipeline's view of a gateway message.
pub fn inbound_message(msg: &Message, own_id: UserId) -> InboundMessage {
    let nick = msg.member.as_ref().and_then(|m| m.nick.as_deref());
    InboundMessage {
        guild_id: msg.guild_id.map(guild_id),
        channel_id: channel_id(msg.channel_id),
        author: Author {
            display_name: display_name(nick, msg.author.display_name()).to_string(),
            is_self: msg.author.id == own_id,
        },
        content: msg.content.clone(),
        attachments: msg.attachments.iter().map(attachment).collect(),
    }
}
