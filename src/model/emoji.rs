//! Emojis, both custom and unicode.

use std::fmt;

use lazy_static::lazy_static;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::base::{update_field, update_field_opt, update_nullable};
use super::{Context, EmojiId, Entity, Guild, GuildId, RoleId, User, UserData};
use crate::builders::EditGuildEmoji;
use crate::rest::{self, routes, RestRequest};
use crate::serial::nullable;
use crate::Result;

/// The characters `encodeURIComponent` leaves alone, which is what Discord
/// expects in reaction routes.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A custom or unicode emoji, as it appears in reactions, buttons, select
/// options and messages.
///
/// Unicode emojis have no ID, and their name is the emoji itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Emoji {
    /// The ID of a custom emoji.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmojiId>,
    /// The name of a custom emoji, or the unicode emoji itself.
    ///
    /// Missing for deleted custom emojis in reactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether a custom emoji is animated.
    #[serde(default)]
    pub animated: bool,
}

impl Emoji {
    /// Parse an emoji from its shorthand form.
    ///
    /// Accepts a unicode emoji (`"🔥"`), a custom emoji mention
    /// (`"<:name:id>"`, `"<a:name:id>"`) or an identifier (`"name:id"`), in
    /// plain or percent-encoded form. Text that looks like none of these
    /// yields `None`.
    pub fn parse(text: &str) -> Option<Emoji> {
        lazy_static! {
            static ref RE_EMOJI: Regex = Regex::new(r"<?(?:(a):)?([a-zA-Z0-9_]{2,32}):([0-9]{16,20})?>?").unwrap();
        }

        let decoded;
        let text = if text.contains('%') {
            decoded = percent_decode_str(text).decode_utf8_lossy().into_owned();
            decoded.as_str()
        } else {
            text
        };

        if !text.contains(':') {
            return Some(Emoji {
                id: None,
                name: Some(text.to_owned()),
                animated: false,
            });
        }

        let cap = RE_EMOJI.captures(text)?;
        Some(Emoji {
            id: cap.get(3).and_then(|id| id.as_str().parse().ok()),
            name: cap.get(2).map(|name| name.as_str().to_owned()),
            animated: cap.get(1).is_some(),
        })
    }

    /// Resolve a shorthand string into an emoji without checking it exists.
    ///
    /// A bare snowflake is taken as the ID of a custom emoji, anything else
    /// is [`parse`](Emoji::parse)d. Empty input yields `None`.
    pub fn resolve(text: &str) -> Option<Emoji> {
        lazy_static! {
            static ref RE_ID: Regex = Regex::new(r"^[0-9]{16,20}$").unwrap();
        }

        if text.is_empty() {
            None
        } else if RE_ID.is_match(text) {
            Some(Emoji {
                id: text.parse().ok(),
                name: None,
                animated: false,
            })
        } else {
            Emoji::parse(text)
        }
    }

    /// The identifier used to refer to this emoji in routes: `name:id` for
    /// custom emojis, the percent-encoded emoji for unicode ones.
    pub fn identifier(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        match self.id {
            Some(id) if self.animated => format!("a:{}:{}", name, id),
            Some(id) => format!("{}:{}", name, id),
            None => utf8_percent_encode(name, COMPONENT).to_string(),
        }
    }

    /// The URL of a custom emoji's image.
    pub fn url(&self) -> Option<String> {
        self.id.map(|id| {
            format!(
                cdn_concat!("/emojis/{}.{}"),
                id,
                if self.animated { "gif" } else { "png" }
            )
        })
    }
}

/// Formats the emoji the way it is written in message content.
impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or_default();
        match self.id {
            Some(id) => write!(f, "<{}:{}:{}>", if self.animated { "a" } else { "" }, name, id),
            None => f.write_str(name),
        }
    }
}

/// The raw payload of a guild's custom emoji.
///
/// https://discord.com/developers/docs/resources/emoji#emoji-object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildEmojiData {
    /// The ID of the emoji.
    pub id: EmojiId,
    /// The guild the emoji belongs to. Not part of the payload, the
    /// receiver fills it in.
    #[serde(default)]
    pub guild_id: GuildId,
    /// The emoji's name.
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    /// Whether the emoji is animated.
    #[serde(default)]
    pub animated: Option<bool>,
    /// Roles allowed to use this emoji.
    #[serde(default)]
    pub roles: Option<Vec<RoleId>>,
    /// The user that created this emoji.
    #[serde(default)]
    pub user: Option<UserData>,
    /// Whether this emoji must be wrapped in colons.
    #[serde(default)]
    pub require_colons: Option<bool>,
    /// Whether this emoji is managed by an integration.
    #[serde(default)]
    pub managed: Option<bool>,
    /// Whether this emoji can be used, which may be false due to loss of boosts.
    #[serde(default)]
    pub available: Option<bool>,
}

/// A custom emoji uploaded to a guild.
#[derive(Debug, Clone, Serialize)]
pub struct GuildEmoji {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the emoji.
    pub id: EmojiId,
    /// The guild the emoji belongs to.
    pub guild_id: GuildId,
    /// The emoji's name.
    pub name: Option<String>,
    /// Whether the emoji is animated.
    pub animated: bool,
    /// Roles allowed to use this emoji. Empty if everyone may.
    pub roles: Vec<RoleId>,
    /// The user that created this emoji, only known with `MANAGE_GUILD_EXPRESSIONS`.
    pub author: Option<User>,
    /// Whether this emoji must be wrapped in colons.
    pub require_colons: bool,
    /// Whether this emoji is managed by an integration.
    pub managed: bool,
    /// Whether this emoji can be used.
    pub available: bool,
}

impl Entity for GuildEmoji {
    type Data = GuildEmojiData;

    fn from_data(ctx: &Context, data: &GuildEmojiData) -> Self {
        let mut emoji = GuildEmoji {
            ctx: ctx.clone(),
            id: data.id,
            guild_id: data.guild_id,
            name: None,
            animated: false,
            roles: Vec::new(),
            author: None,
            require_colons: true,
            managed: false,
            available: true,
        };
        emoji.patch(data);
        emoji
    }

    fn patch(&mut self, data: &GuildEmojiData) {
        update_nullable(&mut self.name, &data.name);
        update_field(&mut self.animated, &data.animated);
        update_field(&mut self.roles, &data.roles);
        update_field_opt(&mut self.author, &data.user.as_ref().map(User::new));
        update_field(&mut self.require_colons, &data.require_colons);
        update_field(&mut self.managed, &data.managed);
        update_field(&mut self.available, &data.available);
    }
}

impl GuildEmoji {
    /// This emoji in the form it is referenced with in messages and components.
    pub fn emoji(&self) -> Emoji {
        Emoji {
            id: Some(self.id),
            name: self.name.clone(),
            animated: self.animated,
        }
    }

    /// The URL of the emoji's image.
    pub fn url(&self) -> String {
        format!(
            cdn_concat!("/emojis/{}.{}"),
            self.id,
            if self.animated { "gif" } else { "png" }
        )
    }

    /// The guild this emoji belongs to, if it is cached.
    pub fn guild(&self) -> Option<Guild> {
        self.ctx.cache().guilds.get(&self.guild_id)
    }

    /// Edit the emoji's name or role restrictions.
    ///
    /// ```ignore
    /// emoji.edit(|e| e.name("blobwave").reason("rename")).await?;
    /// ```
    pub async fn edit<F>(&mut self, f: F) -> Result<GuildEmoji>
    where
        F: FnOnce(EditGuildEmoji) -> EditGuildEmoji,
    {
        let request = EditGuildEmoji::build(f)
            .into_request(RestRequest::patch(routes::guild_emoji(self.guild_id, self.id)));
        let mut data: GuildEmojiData = rest::fetch(self.ctx.rest(), request).await?;
        data.guild_id = self.guild_id;

        self.patch(&data);
        self.ctx.cache().emojis.add(&self.ctx, self.id, &data);
        Ok(self.clone())
    }

    /// Set a new name for the emoji.
    pub async fn set_name(&mut self, name: &str) -> Result<GuildEmoji> {
        self.edit(|e| e.name(name)).await
    }

    /// Delete the emoji from its guild.
    pub async fn delete(&self) -> Result<()> {
        rest::send(
            self.ctx.rest(),
            RestRequest::delete(routes::guild_emoji(self.guild_id, self.id)),
        )
        .await?;
        self.ctx.cache().emojis.remove(&self.id);
        Ok(())
    }
}

impl fmt::Display for GuildEmoji {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.emoji(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unicode() {
        assert_eq!(
            Emoji::parse("🔥"),
            Some(Emoji {
                id: None,
                name: Some("🔥".to_owned()),
                animated: false,
            })
        );
        // percent-encoded reaction identifier
        assert_eq!(Emoji::parse("%F0%9F%94%A5").and_then(|e| e.name), Some("🔥".to_owned()));
    }

    #[test]
    fn parse_custom() {
        let emoji = Emoji::parse("<a:blobwave:1234567890123456789>").unwrap();
        assert!(emoji.animated);
        assert_eq!(emoji.name.as_deref(), Some("blobwave"));
        assert_eq!(emoji.id, Some(EmojiId(1234567890123456789)));
        assert_eq!(emoji.to_string(), "<a:blobwave:1234567890123456789>");
        assert_eq!(emoji.identifier(), "a:blobwave:1234567890123456789");

        let plain = Emoji::parse("thonk:1234567890123456789").unwrap();
        assert!(!plain.animated);
        assert_eq!(
            plain.url().as_deref(),
            Some("https://cdn.discordapp.com/emojis/1234567890123456789.png")
        );
    }

    #[test]
    fn unparseable_shorthand_is_none() {
        assert_eq!(Emoji::parse(":"), None);
        assert_eq!(Emoji::resolve(""), None);
    }

    #[test]
    fn resolve_bare_id() {
        let emoji = Emoji::resolve("1234567890123456789").unwrap();
        assert_eq!(emoji.id, Some(EmojiId(1234567890123456789)));
        assert_eq!(emoji.name, None);
    }

    #[test]
    fn unicode_identifier_is_encoded() {
        assert_eq!(Emoji::parse("🔥").unwrap().identifier(), "%F0%9F%94%A5");
    }
}
