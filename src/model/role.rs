//! Roles and permissions.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::base::hex_color;
use super::{GuildId, Mention, RoleId};
use crate::serial::bitfield;

/// Roles represent a set of permissions attached to a group of users.
///
/// Roles have names, colors, and can be "pinned" to the side bar,
/// causing their members to be listed separately.
///
/// Roles can have separate permission profiles for the global context (guild) and channel context.
/// The `@everyone` role has the same ID as the guild it belongs to.
///
/// https://discord.com/developers/docs/topics/permissions#role-object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// The ID of the role.
    pub id: RoleId,
    /// The guild this role belongs to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    /// The name of the role.
    pub name: String,

    /// Color in `0xRRGGBB` form
    #[serde(default)]
    pub color: u32,

    /// Hash of the role icon image.
    #[serde(default)]
    pub icon: Option<String>,

    /// The unicode icon of the emoji.
    #[serde(default)]
    pub unicode_emoji: Option<String>,

    /// If this role is pinned in the user listing
    #[serde(default)]
    pub hoist: bool,

    /// If this role belongs to a bot user and is managed by their application.
    #[serde(default)]
    pub managed: bool,

    /// Position of this role.
    #[serde(default)]
    pub position: i64,

    /// Whether this role can be mentioned.
    #[serde(default)] // default to false
    pub mentionable: bool,

    /// The permissions granted by this role.
    #[serde(default)]
    pub permissions: Permissions,

    /// Other flags.
    #[serde(default)]
    pub flags: RoleFlags,
}

impl Role {
    /// Return a `Mention` which will ping members of this role.
    #[inline(always)]
    pub fn mention(&self) -> Mention {
        self.id.mention()
    }

    /// The role color as a `#rrggbb` string.
    pub fn hex_color(&self) -> String {
        hex_color(self.color)
    }

    /// Whether this is the guild's `@everyone` role.
    pub fn is_everyone(&self) -> bool {
        self.guild_id.map_or(false, |guild| guild.everyone() == self.id)
    }

    /// Returns the formatted URL of the role's icon.
    ///
    /// Returns `None` if the role does not have an icon.
    pub fn icon_url(&self) -> Option<String> {
        self.icon
            .as_ref()
            .map(|icon| format!(cdn_concat!("/role-icons/{}/{}.png"), self.id, icon))
    }
}

bitflags! {
    /// Additional role flags.
    #[derive(Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RoleFlags: u8 {
        /// The role is selectable in the onboarding prompt.
        const AVAILABLE_IN_PROMPT = 1;
    }
}

// Permissions

bitflags! {
    /// Set of permissions assignable to a Role or PermissionOverwrite
    ///
    /// Sent over the wire as a decimal string.
    #[derive(Default)]
    pub struct Permissions: u64 {
        const CREATE_INVITE = 1;
        const KICK_MEMBERS = 1 << 1;
        const BAN_MEMBERS = 1 << 2;
        /// Grant all permissions, bypassing channel-specific permissions
        const ADMINISTRATOR = 1 << 3;
        /// Create channels or edit existing ones
        const MANAGE_CHANNELS = 1 << 4;
        /// Change the guild's name or settings
        const MANAGE_GUILD = 1 << 5;
        /// Add emoji reactions to messages
        const ADD_REACTIONS = 1 << 6;
        const VIEW_AUDIT_LOG = 1 << 7;
        const PRIORITY_SPEAKER = 1 << 8;
        const STREAM = 1 << 9;
        const VIEW_CHANNEL = 1 << 10;
        const SEND_MESSAGES = 1 << 11;
        /// Send text-to-speech messages to those focused on the channel
        const SEND_TTS_MESSAGES = 1 << 12;
        /// Delete messages by other users
        const MANAGE_MESSAGES = 1 << 13;
        const EMBED_LINKS = 1 << 14;
        const ATTACH_FILES = 1 << 15;
        const READ_MESSAGE_HISTORY = 1 << 16;
        /// Trigger a push notification for an entire channel with "@everyone"
        const MENTION_EVERYONE = 1 << 17;
        /// Use emojis from other guilds
        const USE_EXTERNAL_EMOJIS = 1 << 18;
        const VIEW_GUILD_INSIGHTS = 1 << 19;
        const CONNECT = 1 << 20;
        const SPEAK = 1 << 21;
        const MUTE_MEMBERS = 1 << 22;
        const DEAFEN_MEMBERS = 1 << 23;
        /// Move users out of this channel into another
        const MOVE_MEMBERS = 1 << 24;
        /// When denied, members must use push-to-talk
        const USE_VAD = 1 << 25;
        /// Change their own nickname
        const CHANGE_NICKNAME = 1 << 26;
        /// Change the nickname of other users
        const MANAGE_NICKNAMES = 1 << 27;
        /// Modify roles below their own
        const MANAGE_ROLES = 1 << 28;
        /// Manage channel webhooks
        const MANAGE_WEBHOOKS = 1 << 29;
        /// Manage the emojis and stickers in a guild.
        const MANAGE_GUILD_EXPRESSIONS = 1 << 30;
        const USE_APPLICATION_COMMANDS = 1 << 31;
        const REQUEST_TO_SPEAK = 1 << 32;
        const MANAGE_EVENTS = 1 << 33;
        /// Archive, delete and edit threads
        const MANAGE_THREADS = 1 << 34;
        const CREATE_PUBLIC_THREADS = 1 << 35;
        const CREATE_PRIVATE_THREADS = 1 << 36;
        const USE_EXTERNAL_STICKERS = 1 << 37;
        const SEND_MESSAGES_IN_THREADS = 1 << 38;
        const USE_EMBEDDED_ACTIVITIES = 1 << 39;
        /// Time out members
        const MODERATE_MEMBERS = 1 << 40;
        const VIEW_CREATOR_MONETIZATION_ANALYTICS = 1 << 41;
        const USE_SOUNDBOARD = 1 << 42;
        const CREATE_GUILD_EXPRESSIONS = 1 << 43;
        const CREATE_EVENTS = 1 << 44;
        const USE_EXTERNAL_SOUNDS = 1 << 45;
        const SEND_VOICE_MESSAGES = 1 << 46;
        const SEND_POLLS = 1 << 49;
        const USE_EXTERNAL_APPS = 1 << 50;
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        bitfield::serialize(&self.bits(), s)
    }
}

impl<'d> Deserialize<'d> for Permissions {
    fn deserialize<D: Deserializer<'d>>(d: D) -> Result<Self, D::Error> {
        bitfield::deserialize(d).map(Permissions::from_bits_truncate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn permissions_are_strings() {
        let perms: Permissions = serde_json::from_value(json!("2048")).unwrap();
        assert_eq!(perms, Permissions::SEND_MESSAGES);
        assert_eq!(
            serde_json::to_value(Permissions::SEND_POLLS).unwrap(),
            json!((1u64 << 49).to_string())
        );
        // older payloads use plain integers
        let perms: Permissions = serde_json::from_value(json!(8)).unwrap();
        assert!(perms.contains(Permissions::ADMINISTRATOR));
    }

    #[test]
    fn role_getters() {
        let role: Role = serde_json::from_value(json!({
            "id": "41771983423143936",
            "guild_id": "41771983423143936",
            "name": "@everyone",
            "color": 3447003,
            "permissions": "66321471",
            "icon": "cf3ced8600b777c9486c0ab8b5e2c1c6",
        }))
        .unwrap();

        assert!(role.is_everyone());
        assert_eq!(role.hex_color(), "#3498db");
        assert_eq!(role.mention().to_string(), "<@&41771983423143936>");
        assert_eq!(
            role.icon_url().as_deref(),
            Some("https://cdn.discordapp.com/role-icons/41771983423143936/cf3ced8600b777c9486c0ab8b5e2c1c6.png")
        );
        assert!(role.permissions.contains(Permissions::KICK_MEMBERS));
    }
}
