//! Guild members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GuildId, Mention, Permissions, RoleId, User, UserId};

/// Information about a member of a guild.
///
/// Members sent inside an interaction or a message leave out the user, which
/// is delivered alongside them instead.
///
/// https://discord.com/developers/docs/resources/guild#guild-member-object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// The guild this member belongs to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    /// The user this member represents.
    #[serde(default)]
    pub user: Option<User>,
    /// The member's nickname, if set.
    #[serde(default)]
    pub nick: Option<String>,
    /// The member's guild avatar hash.
    #[serde(default)]
    pub avatar: Option<String>,
    /// The roles this member has, not including `@everyone`.
    #[serde(default)]
    pub roles: Vec<RoleId>,
    /// When the member joined the guild.
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    /// When the member started boosting the guild.
    #[serde(default)]
    pub premium_since: Option<DateTime<Utc>>,
    /// Whether the member is deafened in voice channels.
    #[serde(default)]
    pub deaf: bool,
    /// Whether the member is muted in voice channels.
    #[serde(default)]
    pub mute: bool,
    /// Whether the member has yet to pass the membership screening.
    #[serde(default)]
    pub pending: bool,
    /// Total permissions of the member in the channel, sent with interactions.
    #[serde(default)]
    pub permissions: Option<Permissions>,
    /// When the member's timeout will expire.
    #[serde(default)]
    pub communication_disabled_until: Option<DateTime<Utc>>,
}

impl Member {
    /// The ID of the member's user, if the user was delivered with it.
    pub fn id(&self) -> Option<UserId> {
        self.user.as_ref().map(|user| user.id)
    }

    /// Return a `Mention` which will ping this member.
    pub fn mention(&self) -> Option<Mention> {
        self.id().map(|id| id.mention())
    }

    /// The name shown for the member: nickname, then display name, then username.
    pub fn display_name(&self) -> Option<&str> {
        self.nick
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(User::display_name))
    }

    /// Whether the member is timed out at the moment.
    pub fn is_communication_disabled(&self) -> bool {
        self.communication_disabled_until
            .map_or(false, |until| until > Utc::now())
    }

    /// Returns the formatted URL of the member's guild avatar.
    pub fn avatar_url(&self) -> Option<String> {
        let guild = self.guild_id?;
        let user = self.id()?;
        self.avatar.as_ref().map(|hash| {
            format!(
                cdn_concat!("/guilds/{}/users/{}/avatars/{}.{}"),
                guild,
                user,
                hash,
                super::base::image_ext(hash)
            )
        })
    }
}
