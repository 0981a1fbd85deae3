//! Guilds and guild bans.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base::{image_ext, update_field, update_field_opt, update_nullable};
use super::{flatten, Context, Entity, GuildId, User, UserData, UserId, Widget};
use crate::rest::{self, routes, RestRequest};
use crate::serial::nullable;
use crate::Result;

open_enum! {
/// The level of verification a guild requires from members before they can
/// send messages.
#[derive(Default)]
pub enum VerificationLevel {
    /// Unrestricted.
    #[default]
    None = 0,
    /// Must have a verified email.
    Low = 1,
    /// Must also have been registered for longer than 5 minutes.
    Medium = 2,
    /// Must also have been a member of this guild for longer than 10 minutes.
    High = 3,
    /// Must have a verified phone number.
    VeryHigh = 4,
}
}

open_enum! {
/// The age restriction level of a guild.
#[derive(Default)]
pub enum NsfwLevel {
    /// No level set.
    #[default]
    Default = 0,
    /// Explicit content.
    Explicit = 1,
    /// Safe for everyone.
    Safe = 2,
    /// Restricted to adults.
    AgeRestricted = 3,
}
}

/// The raw guild payload.
///
/// https://discord.com/developers/docs/resources/guild#guild-object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildData {
    /// The ID of the guild.
    pub id: GuildId,
    /// True if this guild is unavailable due to an outage.
    #[serde(default)]
    pub unavailable: Option<bool>,
    /// The name of the guild.
    #[serde(default)]
    pub name: Option<String>,
    /// The icon hash of the guild.
    #[serde(default, deserialize_with = "nullable")]
    pub icon: Option<Option<String>>,
    /// The banner hash of the guild.
    #[serde(default, deserialize_with = "nullable")]
    pub banner: Option<Option<String>>,
    /// The invite splash hash of the guild.
    #[serde(default, deserialize_with = "nullable")]
    pub splash: Option<Option<String>>,
    /// The owner of the guild.
    #[serde(default)]
    pub owner_id: Option<UserId>,
    /// The description of a discoverable guild.
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    /// Enabled guild features.
    #[serde(default)]
    pub features: Option<Vec<String>>,
    /// Sent with the guild create event, or with `approximate_member_count`.
    #[serde(default)]
    pub member_count: Option<u64>,
    /// Approximate number of members, sent with REST fetches.
    #[serde(default)]
    pub approximate_member_count: Option<u64>,
    /// The preferred locale of a community guild.
    #[serde(default)]
    pub preferred_locale: Option<String>,
    /// The verification level required for the guild.
    #[serde(default)]
    pub verification_level: Option<VerificationLevel>,
    /// The age restriction level of the guild.
    #[serde(default)]
    pub nsfw_level: Option<NsfwLevel>,
    /// The boost level of the guild.
    #[serde(default)]
    pub premium_tier: Option<u8>,
    /// The vanity invite code of the guild.
    #[serde(default, deserialize_with = "nullable")]
    pub vanity_url_code: Option<Option<String>>,
}

/// A guild, the collection of channels and members users know as a "server".
#[derive(Debug, Clone, Serialize)]
pub struct Guild {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the guild.
    pub id: GuildId,
    /// The name of the guild (2-100 characters).
    pub name: Option<String>,
    /// The icon hash of the guild.
    ///
    /// https://discord.com/developers/docs/reference#image-formatting
    pub icon: Option<String>,
    /// The banner hash of the guild.
    pub banner: Option<String>,
    /// The invite splash hash of the guild.
    pub splash: Option<String>,
    /// The owner of the guild
    pub owner_id: Option<UserId>,
    /// The description of a guild with the "DISCOVERABLE" feature.
    pub description: Option<String>,
    /// Enabled guild features.
    pub features: Vec<String>,
    /// Number of members in the guild, when known.
    pub member_count: Option<u64>,
    /// Whether the guild is available, false during an outage.
    pub available: bool,
    /// The preferred locale of a community guild.
    pub preferred_locale: Option<String>,
    /// User verification level to be able to use the guild
    pub verification_level: VerificationLevel,
    /// The guild's age restriction level.
    pub nsfw_level: NsfwLevel,
    /// The boost level of the guild.
    pub premium_tier: u8,
    /// The vanity invite code of the guild.
    pub vanity_url_code: Option<String>,
}

impl Entity for Guild {
    type Data = GuildData;

    fn from_data(ctx: &Context, data: &GuildData) -> Self {
        let mut guild = Guild {
            ctx: ctx.clone(),
            id: data.id,
            name: None,
            icon: None,
            banner: None,
            splash: None,
            owner_id: None,
            description: None,
            features: Vec::new(),
            member_count: None,
            available: true,
            preferred_locale: None,
            verification_level: VerificationLevel::default(),
            nsfw_level: NsfwLevel::default(),
            premium_tier: 0,
            vanity_url_code: None,
        };
        guild.patch(data);
        guild
    }

    fn patch(&mut self, data: &GuildData) {
        // only unavailable guilds carry the flag
        self.available = !data.unavailable.unwrap_or(false);
        update_field_opt(&mut self.name, &data.name);
        update_nullable(&mut self.icon, &data.icon);
        update_nullable(&mut self.banner, &data.banner);
        update_nullable(&mut self.splash, &data.splash);
        update_field_opt(&mut self.owner_id, &data.owner_id);
        update_nullable(&mut self.description, &data.description);
        update_field(&mut self.features, &data.features);
        update_field_opt(&mut self.member_count, &data.member_count);
        update_field_opt(&mut self.member_count, &data.approximate_member_count);
        update_field_opt(&mut self.preferred_locale, &data.preferred_locale);
        update_field(&mut self.verification_level, &data.verification_level);
        update_field(&mut self.nsfw_level, &data.nsfw_level);
        update_field(&mut self.premium_tier, &data.premium_tier);
        update_nullable(&mut self.vanity_url_code, &data.vanity_url_code);
    }

    fn to_json(&self) -> Value {
        flatten(
            self,
            [
                ("created_timestamp", json!(self.id.timestamp())),
                ("icon_url", json!(self.icon_url())),
                ("banner_url", json!(self.banner_url())),
                ("splash_url", json!(self.splash_url())),
            ],
        )
    }
}

impl Guild {
    /// Whether the guild is only known by ID: unavailable, or never fetched.
    pub fn partial(&self) -> bool {
        !self.available || self.name.is_none()
    }

    /// Returns the formatted URL of the guild's icon.
    ///
    /// Returns None if the guild does not have an icon.
    pub fn icon_url(&self) -> Option<String> {
        self.icon.as_ref().map(|hash| {
            format!(cdn_concat!("/icons/{}/{}.{}"), self.id, hash, image_ext(hash))
        })
    }

    /// Returns the formatted URL of the guild's banner.
    pub fn banner_url(&self) -> Option<String> {
        self.banner.as_ref().map(|hash| {
            format!(cdn_concat!("/banners/{}/{}.{}"), self.id, hash, image_ext(hash))
        })
    }

    /// Returns the formatted URL of the guild's invite splash.
    pub fn splash_url(&self) -> Option<String> {
        self.splash
            .as_ref()
            .map(|hash| format!(cdn_concat!("/splashes/{}/{}.png"), self.id, hash))
    }

    /// Fetch the ban of a user from this guild.
    pub async fn fetch_ban(&self, user: UserId) -> Result<GuildBan> {
        GuildBan::fetch_from(&self.ctx, self.id, user).await
    }

    /// Fetch the guild's widget. The widget must be enabled.
    pub async fn fetch_widget(&self) -> Result<Widget> {
        Widget::fetch_from(&self.ctx, self.id).await
    }
}

/// The raw payload of a guild ban.
///
/// https://discord.com/developers/docs/resources/guild#ban-object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildBanData {
    /// The guild the ban is in. Not part of the REST payload, the receiver fills it in.
    #[serde(default)]
    pub guild_id: GuildId,
    /// The banned user.
    pub user: UserData,
    /// The reason for the ban. Gateway ban events leave it out.
    #[serde(default, deserialize_with = "nullable")]
    pub reason: Option<Option<String>>,
}

/// A user's ban from a guild.
#[derive(Debug, Clone, Serialize)]
pub struct GuildBan {
    #[serde(skip)]
    ctx: Context,
    /// The guild the ban is in.
    pub guild_id: GuildId,
    /// The banned user.
    pub user: User,
    /// The reason for the ban.
    ///
    /// `None` while the reason was never received, `Some(None)` if the ban
    /// was issued without one.
    pub reason: Option<Option<String>>,
}

impl Entity for GuildBan {
    type Data = GuildBanData;

    fn from_data(ctx: &Context, data: &GuildBanData) -> Self {
        let mut ban = GuildBan {
            ctx: ctx.clone(),
            guild_id: data.guild_id,
            user: User::new(&data.user),
            reason: None,
        };
        ban.patch(data);
        ban
    }

    fn patch(&mut self, data: &GuildBanData) {
        self.user.patch(&data.user);
        if data.reason.is_some() {
            self.reason = data.reason.clone();
        }
    }
}

impl GuildBan {
    /// Whether the ban's reason was never received.
    pub fn partial(&self) -> bool {
        self.reason.is_none()
    }

    /// The reason for the ban, if there was one and it is known.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_ref().and_then(Option::as_deref)
    }

    /// The guild the ban is in, if it is cached.
    pub fn guild(&self) -> Option<Guild> {
        self.ctx.cache().guilds.get(&self.guild_id)
    }

    /// Fetch the full ban, reason included, and patch this one with it.
    pub async fn fetch(&mut self) -> Result<GuildBan> {
        let fresh = GuildBan::fetch_from(&self.ctx, self.guild_id, self.user.id).await?;
        self.user = fresh.user.clone();
        self.reason = fresh.reason.clone();
        Ok(fresh)
    }

    async fn fetch_from(ctx: &Context, guild: GuildId, user: UserId) -> Result<GuildBan> {
        let mut data: GuildBanData =
            rest::fetch(ctx.rest(), RestRequest::get(routes::guild_ban(guild, user))).await?;
        data.guild_id = guild;
        // a fetched ban always knows its reason
        if data.reason.is_none() {
            data.reason = Some(None);
        }
        Ok(GuildBan::from_data(ctx, &data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Offline;

    impl crate::Rest for Offline {
        fn request(
            &self,
            _: RestRequest,
        ) -> futures::future::BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(crate::Error::Other("offline")) })
        }
    }

    fn ctx() -> Context {
        Context::new(Offline)
    }

    #[test]
    fn ban_is_partial_until_reason_seen() {
        let event: GuildBanData = serde_json::from_value(json!({
            "guild_id": "1",
            "user": { "id": "2", "username": "spammer" },
        }))
        .unwrap();
        let mut ban = GuildBan::from_data(&ctx(), &event);
        assert!(ban.partial());
        assert_eq!(ban.reason(), None);

        ban.patch(&serde_json::from_value(json!({ "user": { "id": "2" }, "reason": null })).unwrap());
        assert!(!ban.partial());
        assert_eq!(ban.reason(), None);
        assert_eq!(ban.user.username.as_deref(), Some("spammer"));

        ban.patch(&serde_json::from_value(json!({ "user": { "id": "2" }, "reason": "spam" })).unwrap());
        assert_eq!(ban.reason(), Some("spam"));
    }

    #[test]
    fn guild_patch_and_urls() {
        let ctx = ctx();
        let mut guild = Guild::from_data(
            &ctx,
            &serde_json::from_value(json!({
                "id": "197038439483310086",
                "name": "Discord Testers",
                "icon": "a_f64c3e8a1c77e4d2d88f7c3fa4b6ca0b",
                "features": ["COMMUNITY"],
                "verification_level": 3,
                "approximate_member_count": 1000,
            }))
            .unwrap(),
        );
        assert!(!guild.partial());
        assert_eq!(guild.verification_level, VerificationLevel::High);
        assert_eq!(guild.member_count, Some(1000));
        assert_eq!(
            guild.icon_url().as_deref(),
            Some("https://cdn.discordapp.com/icons/197038439483310086/a_f64c3e8a1c77e4d2d88f7c3fa4b6ca0b.gif")
        );

        let old = guild.update(
            &serde_json::from_value(json!({ "id": "197038439483310086", "unavailable": true }))
                .unwrap(),
        );
        assert!(!old.partial());
        assert!(guild.partial());
        assert_eq!(guild.name.as_deref(), Some("Discord Testers"));
    }

    #[test]
    fn ban_guild_is_looked_up_in_the_cache() {
        let ctx = ctx();
        let ban = GuildBan::from_data(
            &ctx,
            &serde_json::from_value(json!({ "guild_id": "5", "user": { "id": "2" } })).unwrap(),
        );
        assert!(ban.guild().is_none());

        ctx.cache().guilds.add(
            &ctx,
            GuildId(5),
            &serde_json::from_value(json!({ "id": "5", "name": "cached" })).unwrap(),
        );
        assert_eq!(ban.guild().and_then(|g| g.name).as_deref(), Some("cached"));
    }
}
