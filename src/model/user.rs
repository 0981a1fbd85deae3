//! Users.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base::{hex_color, image_ext, update_field, update_field_opt, update_nullable};
use super::{flatten, Context, Entity, Mention, UserId};
use crate::serial::nullable;

/// The raw user payload.
///
/// https://discord.com/developers/docs/resources/user#user-object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserData {
    /// The user's ID
    pub id: UserId,
    /// The user's username, not unique across the platform.
    #[serde(default)]
    pub username: Option<String>,
    /// The user's display name, if set.
    #[serde(default, deserialize_with = "nullable")]
    pub global_name: Option<Option<String>>,
    /// The user's Discord-tag, `"0"` for users on the new username system.
    #[serde(default)]
    pub discriminator: Option<String>,
    /// The user's avatar hash
    #[serde(default, deserialize_with = "nullable")]
    pub avatar: Option<Option<String>>,
    /// The user's banner hash
    #[serde(default, deserialize_with = "nullable")]
    pub banner: Option<Option<String>>,
    /// The user's banner color as an integer
    #[serde(default, deserialize_with = "nullable")]
    pub accent_color: Option<Option<u32>>,
    /// Whether the user belongs to an OAuth2 application
    #[serde(default)]
    pub bot: Option<bool>,
    /// Whether the user is an official Discord system user
    #[serde(default)]
    pub system: Option<bool>,
    /// The public flags on the user's account
    #[serde(default)]
    pub public_flags: Option<u64>,
}

/// A Discord user.
///
/// Users in Discord are generally considered the base entity.
/// Users can spawn across the entire platform, be members of guilds,
/// participate in text and voice chat, and much more.
///
/// A user seen only by ID (for example in a partial gateway event)
/// is [`partial`](User::partial) until a payload with a username arrives.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// The user's ID
    pub id: UserId,
    /// The user's username.
    pub username: Option<String>,
    /// The user's display name, if it is set.
    pub global_name: Option<String>,
    /// The user's Discord-tag.
    pub discriminator: Option<String>,
    /// The user's avatar hash
    pub avatar: Option<String>,
    /// The user's banner hash.
    ///
    /// Only known once the user has been fetched.
    pub banner: Option<String>,
    /// The user's banner color.
    ///
    /// Only known once the user has been fetched.
    pub accent_color: Option<u32>,
    /// Whether the user belongs to an OAuth2 application
    pub bot: bool,
    /// Whether the user is an official Discord system user
    pub system: bool,
    /// The public flags on the user's account
    pub flags: u64,
}

impl Entity for User {
    type Data = UserData;

    fn from_data(_: &Context, data: &UserData) -> Self {
        User::new(data)
    }

    fn patch(&mut self, data: &UserData) {
        update_field_opt(&mut self.username, &data.username);
        update_nullable(&mut self.global_name, &data.global_name);
        update_field_opt(&mut self.discriminator, &data.discriminator);
        update_nullable(&mut self.avatar, &data.avatar);
        update_nullable(&mut self.banner, &data.banner);
        update_nullable(&mut self.accent_color, &data.accent_color);
        update_field(&mut self.bot, &data.bot);
        update_field(&mut self.system, &data.system);
        update_field(&mut self.flags, &data.public_flags);
    }

    fn to_json(&self) -> Value {
        flatten(
            self,
            [
                ("created_timestamp", json!(self.id.timestamp())),
                ("default_avatar_url", json!(self.default_avatar_url())),
                ("avatar_url", json!(self.avatar_url())),
                ("banner_url", json!(self.banner_url())),
                ("tag", json!(self.tag())),
            ],
        )
    }
}

impl User {
    /// Build a user straight from its payload.
    ///
    /// Users carry no behaviour that needs a [`Context`].
    pub fn new(data: &UserData) -> Self {
        let mut user = User {
            id: data.id,
            username: None,
            global_name: None,
            discriminator: None,
            avatar: None,
            banner: None,
            accent_color: None,
            bot: false,
            system: false,
            flags: 0,
        };
        user.patch(data);
        user
    }

    /// Whether this user is only known by ID.
    pub fn partial(&self) -> bool {
        self.username.is_none()
    }

    /// Return a `Mention` which will ping this user.
    #[inline(always)]
    pub fn mention(&self) -> Mention {
        self.id.mention()
    }

    /// The user's tag: `username#discriminator`, or just the username
    /// for users on the new username system.
    pub fn tag(&self) -> Option<String> {
        let username = self.username.as_ref()?;
        Some(match self.discriminator.as_deref() {
            None | Some("0") => username.clone(),
            Some(discriminator) => format!("{}#{}", username, discriminator),
        })
    }

    /// The name shown for this user: the display name if set, the username otherwise.
    pub fn display_name(&self) -> Option<&str> {
        self.global_name.as_deref().or(self.username.as_deref())
    }

    /// Returns the formatted URL of the user's avatar.
    ///
    /// Returns None if the user does not have an avatar.
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar.as_ref().map(|hash| {
            format!(
                cdn_concat!("/avatars/{}/{}.{}"),
                self.id,
                hash,
                image_ext(hash)
            )
        })
    }

    /// The URL of the default avatar Discord shows for this user.
    pub fn default_avatar_url(&self) -> String {
        let index = match self.discriminator.as_deref().map(str::parse::<u64>) {
            Some(Ok(discriminator)) if discriminator != 0 => discriminator % 5,
            _ => (self.id.0 >> 22) % 6,
        };
        format!(cdn_concat!("/embed/avatars/{}.png"), index)
    }

    /// The URL of the avatar actually displayed: the custom avatar
    /// or the default one.
    pub fn display_avatar_url(&self) -> String {
        self.avatar_url()
            .unwrap_or_else(|| self.default_avatar_url())
    }

    /// Returns the formatted URL of the user's banner.
    ///
    /// Returns None if the user does not have a banner, or if it is not known.
    pub fn banner_url(&self) -> Option<String> {
        self.banner.as_ref().map(|hash| {
            format!(
                cdn_concat!("/banners/{}/{}.{}"),
                self.id,
                hash,
                image_ext(hash)
            )
        })
    }

    /// The banner color as a `#rrggbb` string.
    pub fn hex_accent_color(&self) -> Option<String> {
        self.accent_color.map(hex_color)
    }
}

impl<'d> Deserialize<'d> for User {
    fn deserialize<D: serde::Deserializer<'d>>(d: D) -> Result<Self, D::Error> {
        UserData::deserialize(d).map(|data| User::new(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: Value) -> User {
        User::new(&serde_json::from_value(value).unwrap())
    }

    #[test]
    fn partial_until_username_seen() {
        let mut partial = user(json!({ "id": "80351110224678912" }));
        assert!(partial.partial());
        assert_eq!(partial.tag(), None);

        let old = partial.update(
            &serde_json::from_value(json!({
                "id": "80351110224678912",
                "username": "Nelly",
                "discriminator": "1337",
            }))
            .unwrap(),
        );
        assert!(old.partial());
        assert!(!partial.partial());
        assert_eq!(partial.tag().as_deref(), Some("Nelly#1337"));
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let mut nelly = user(json!({
            "id": "80351110224678912",
            "username": "Nelly",
            "discriminator": "0",
            "global_name": "Nelly!",
            "avatar": "8342729096ea3675442027381ff50dfe",
        }));
        nelly.patch(&serde_json::from_value(json!({ "id": "80351110224678912", "global_name": null })).unwrap());

        assert_eq!(nelly.username.as_deref(), Some("Nelly"));
        assert_eq!(nelly.global_name, None);
        assert_eq!(nelly.display_name(), Some("Nelly"));
        assert_eq!(nelly.tag().as_deref(), Some("Nelly"));
        assert_eq!(
            nelly.avatar_url().as_deref(),
            Some("https://cdn.discordapp.com/avatars/80351110224678912/8342729096ea3675442027381ff50dfe.png")
        );
    }

    #[test]
    fn default_avatar_index() {
        let legacy = user(json!({ "id": "1", "username": "a", "discriminator": "0007" }));
        assert_eq!(
            legacy.default_avatar_url(),
            "https://cdn.discordapp.com/embed/avatars/2.png"
        );

        let migrated = user(json!({ "id": "80351110224678912", "username": "a", "discriminator": "0" }));
        let index = (80351110224678912u64 >> 22) % 6;
        assert_eq!(
            migrated.default_avatar_url(),
            format!("https://cdn.discordapp.com/embed/avatars/{}.png", index)
        );
        assert_eq!(migrated.display_avatar_url(), migrated.default_avatar_url());
    }

    #[test]
    fn accent_color_formatting() {
        let colored = user(json!({ "id": "1", "accent_color": 16711680 }));
        assert_eq!(colored.hex_accent_color().as_deref(), Some("#ff0000"));

        let uncolored = user(json!({ "id": "1", "accent_color": null }));
        assert_eq!(uncolored.hex_accent_color(), None);
    }

    #[test]
    fn json_snapshot_has_computed_props() {
        let nelly = user(json!({ "id": "80351110224678912", "username": "Nelly", "discriminator": "0" }));
        let json = nelly.to_json();
        assert_eq!(json["id"], json!("80351110224678912"));
        assert_eq!(json["tag"], json!("Nelly"));
        assert_eq!(json["created_timestamp"], json!(nelly.id.timestamp()));
        assert!(json.get("avatar_url").is_none());
    }
}
