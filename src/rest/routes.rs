//! Routes of the REST endpoints the structures use.

use crate::model::{
    ApplicationId, ChannelId, EmojiId, GuildId, InteractionId, MessageId, UserId,
};

/// `/channels/{channel.id}`
pub fn channel(channel: ChannelId) -> String {
    format!("/channels/{}", channel)
}

/// `/channels/{channel.id}/messages`
pub fn channel_messages(channel: ChannelId) -> String {
    format!("/channels/{}/messages", channel)
}

/// `/channels/{channel.id}/messages/{message.id}`
pub fn channel_message(channel: ChannelId, message: MessageId) -> String {
    format!("/channels/{}/messages/{}", channel, message)
}

/// `/channels/{channel.id}/pins`
pub fn channel_pins(channel: ChannelId) -> String {
    format!("/channels/{}/pins", channel)
}

/// `/channels/{channel.id}/thread-members/@me`
pub fn thread_member_me(thread: ChannelId) -> String {
    format!("/channels/{}/thread-members/@me", thread)
}

/// `/channels/{channel.id}/polls/{message.id}/expire`
pub fn poll_expire(channel: ChannelId, message: MessageId) -> String {
    format!("/channels/{}/polls/{}/expire", channel, message)
}

/// `/channels/{channel.id}/polls/{message.id}/answers/{answer_id}`
pub fn poll_answer_voters(channel: ChannelId, message: MessageId, answer: u32) -> String {
    format!("/channels/{}/polls/{}/answers/{}", channel, message, answer)
}

/// `/guilds/{guild.id}/bans/{user.id}`
pub fn guild_ban(guild: GuildId, user: UserId) -> String {
    format!("/guilds/{}/bans/{}", guild, user)
}

/// `/guilds/{guild.id}/emojis/{emoji.id}`
pub fn guild_emoji(guild: GuildId, emoji: EmojiId) -> String {
    format!("/guilds/{}/emojis/{}", guild, emoji)
}

/// `/guilds/{guild.id}/widget.json`
pub fn guild_widget(guild: GuildId) -> String {
    format!("/guilds/{}/widget.json", guild)
}

/// `/invites/{invite.code}`
pub fn invite(code: &str) -> String {
    format!("/invites/{}", code)
}

/// `/interactions/{interaction.id}/{interaction.token}/callback`
pub fn interaction_callback(interaction: InteractionId, token: &str) -> String {
    format!("/interactions/{}/{}/callback", interaction, token)
}

/// `/webhooks/{application.id}/{interaction.token}`
pub fn webhook(application: ApplicationId, token: &str) -> String {
    format!("/webhooks/{}/{}", application, token)
}

/// `/webhooks/{application.id}/{interaction.token}/messages/{message}`
///
/// `message` is a message ID or `@original`.
pub fn webhook_message(application: ApplicationId, token: &str, message: &str) -> String {
    format!("/webhooks/{}/{}/messages/{}", application, token, message)
}
