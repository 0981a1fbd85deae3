//! Invites to guilds and group DMs.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base::{image_ext, update_field_opt, update_nullable};
use super::{
    flatten, ChannelId, ChannelType, Context, Entity, GuildId, NsfwLevel, User, UserData,
    VerificationLevel,
};
use crate::rest::{self, routes, RestRequest};
use crate::serial::nullable;
use crate::Result;

/// Extract the code from an invite link, or return the input if it is not one.
///
/// ```
/// # use discord_structures::model::resolve_code;
/// assert_eq!(resolve_code("https://discord.gg/djs"), "djs");
/// assert_eq!(resolve_code("djs"), "djs");
/// ```
pub fn resolve_code(text: &str) -> &str {
    lazy_static! {
        static ref RE_INVITE: Option<Regex> =
            RegexBuilder::new(r"discord(?:(?:app)?\.com/invite|\.gg(?:/invite)?)/([a-zA-Z0-9_-]{2,255})")
                .case_insensitive(true)
                .build()
                .ok();
    }

    RE_INVITE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|cap| cap.get(1))
        .map_or(text, |code| code.as_str())
}

open_enum! {
/// What an invite to a voice channel leads to.
pub enum InviteTargetType {
    /// A user's stream.
    Stream = 1,
    /// An embedded application.
    EmbeddedApplication = 2,
}
}

/// The guild an invite leads to, as far as the invite tells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteGuild {
    /// The ID of the guild.
    pub id: GuildId,
    /// The name of the guild.
    pub name: String,
    /// The splash hash of the guild.
    #[serde(default)]
    pub splash: Option<String>,
    /// The banner hash of the guild.
    #[serde(default)]
    pub banner: Option<String>,
    /// The icon hash of the guild.
    #[serde(default)]
    pub icon: Option<String>,
    /// The description of the guild.
    #[serde(default)]
    pub description: Option<String>,
    /// The enabled guild features.
    #[serde(default)]
    pub features: Vec<String>,
    /// The verification level of the guild.
    #[serde(default)]
    pub verification_level: VerificationLevel,
    /// The NSFW level of the guild.
    #[serde(default)]
    pub nsfw_level: NsfwLevel,
    /// The vanity invite code of the guild.
    #[serde(default)]
    pub vanity_url_code: Option<String>,
    /// The number of boosts the guild has.
    #[serde(default)]
    pub premium_subscription_count: Option<u64>,
}

impl InviteGuild {
    /// The URL of the guild's icon.
    pub fn icon_url(&self) -> Option<String> {
        self.icon.as_ref().map(|hash| {
            format!(cdn_concat!("/icons/{}/{}.{}"), self.id, hash, image_ext(hash))
        })
    }

    /// When the guild was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}

/// The channel an invite leads to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteChannel {
    /// The ID of the channel.
    pub id: ChannelId,
    /// The type of the channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The name of the channel.
    #[serde(default)]
    pub name: Option<String>,
}

/// The raw payload of an invite.
///
/// https://discord.com/developers/docs/resources/invite#invite-object
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct InviteData {
    pub code: String,
    #[serde(default)]
    pub guild: Option<InviteGuild>,
    #[serde(default, deserialize_with = "nullable")]
    pub channel: Option<Option<InviteChannel>>,
    #[serde(default)]
    pub inviter: Option<UserData>,
    #[serde(default)]
    pub target_type: Option<InviteTargetType>,
    #[serde(default)]
    pub target_user: Option<UserData>,
    #[serde(default)]
    pub approximate_presence_count: Option<u64>,
    #[serde(default)]
    pub approximate_member_count: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub uses: Option<u64>,
    #[serde(default)]
    pub max_uses: Option<u64>,
    #[serde(default)]
    pub max_age: Option<u64>,
    #[serde(default)]
    pub temporary: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An invite to a guild channel or group DM.
///
/// Usage metadata (`uses`, `max_uses`, `max_age`, `temporary`, `created_at`)
/// is only known for invites fetched through a guild or created by the bot.
#[derive(Debug, Clone, Serialize)]
pub struct Invite {
    #[serde(skip)]
    ctx: Context,
    /// The invite code.
    pub code: String,
    /// The guild the invite leads to.
    pub guild: Option<InviteGuild>,
    /// The channel the invite leads to.
    pub channel: Option<InviteChannel>,
    /// The user that created the invite.
    pub inviter: Option<User>,
    /// What the invite leads to inside a voice channel.
    pub target_type: Option<InviteTargetType>,
    /// The user whose stream the invite leads to.
    pub target_user: Option<User>,
    /// Approximate number of online members of the guild.
    pub approximate_presence_count: Option<u64>,
    /// Approximate number of members of the guild.
    pub approximate_member_count: Option<u64>,
    /// How many times the invite has been used.
    pub uses: Option<u64>,
    /// How many times the invite can be used, `0` for unlimited.
    pub max_uses: Option<u64>,
    /// Seconds after creation the invite expires, `0` for never.
    pub max_age: Option<u64>,
    /// Whether the invite only grants temporary membership.
    pub temporary: Option<bool>,
    /// When the invite was created.
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    explicit_expiry: Option<DateTime<Utc>>,
}

impl Entity for Invite {
    type Data = InviteData;

    fn from_data(ctx: &Context, data: &InviteData) -> Self {
        let mut invite = Invite {
            ctx: ctx.clone(),
            code: data.code.clone(),
            guild: None,
            channel: None,
            inviter: None,
            target_type: None,
            target_user: None,
            approximate_presence_count: None,
            approximate_member_count: None,
            uses: None,
            max_uses: None,
            max_age: None,
            temporary: None,
            created_at: None,
            explicit_expiry: None,
        };
        invite.patch(data);
        invite
    }

    fn patch(&mut self, data: &InviteData) {
        update_field_opt(&mut self.guild, &data.guild);
        update_nullable(&mut self.channel, &data.channel);
        update_field_opt(&mut self.inviter, &data.inviter.as_ref().map(User::new));
        update_field_opt(&mut self.target_type, &data.target_type);
        update_field_opt(&mut self.target_user, &data.target_user.as_ref().map(User::new));
        update_field_opt(&mut self.approximate_presence_count, &data.approximate_presence_count);
        update_field_opt(&mut self.approximate_member_count, &data.approximate_member_count);
        update_nullable(&mut self.explicit_expiry, &data.expires_at);
        update_field_opt(&mut self.uses, &data.uses);
        update_field_opt(&mut self.max_uses, &data.max_uses);
        update_field_opt(&mut self.max_age, &data.max_age);
        update_field_opt(&mut self.temporary, &data.temporary);
        update_field_opt(&mut self.created_at, &data.created_at);
    }

    fn to_json(&self) -> Value {
        flatten(
            self,
            [
                ("url", json!(self.url())),
                ("expires_at", json!(self.expires_at())),
            ],
        )
    }
}

impl Invite {
    /// The link to the invite.
    pub fn url(&self) -> String {
        format!("https://discord.gg/{}", self.code)
    }

    /// When the invite expires.
    ///
    /// Taken from the payload when Discord sent it, otherwise derived from the
    /// creation date and `max_age`. `None` for invites that never expire or
    /// whose expiry is unknown.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.explicit_expiry.or_else(|| match (self.created_at, self.max_age) {
            (Some(created), Some(age)) if age > 0 => Duration::from_std(StdDuration::from_secs(age))
                .ok()
                .and_then(|age| created.checked_add_signed(age)),
            _ => None,
        })
    }

    /// The ID of the guild the invite leads to.
    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild.as_ref().map(|guild| guild.id)
    }

    /// The ID of the channel the invite leads to.
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel.as_ref().map(|channel| channel.id)
    }

    /// Delete the invite.
    pub async fn delete(&self) -> Result<()> {
        rest::send(self.ctx.rest(), RestRequest::delete(routes::invite(&self.code))).await
    }
}
