//! Snowflake identifiers and mentions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Milliseconds between the Unix epoch and the first second of 2015,
/// the epoch Discord snowflakes count from.
pub const DISCORD_EPOCH: u64 = 1_420_070_400_000;

/// Decode the creation timestamp, in milliseconds since the Unix epoch,
/// embedded in a snowflake.
#[inline]
pub fn snowflake_timestamp(snowflake: u64) -> u64 {
    (snowflake >> 22) + DISCORD_EPOCH
}

/// Decode the creation date embedded in a snowflake.
pub fn snowflake_date(snowflake: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(snowflake_timestamp(snowflake) as i64)
        .single()
        .unwrap_or_default()
}

macro_rules! snowflake {
    ($(#[$attr:meta] $name:ident;)*) => {
        $(
            #[$attr]
            ///
            /// Identifiers can be debug-printed using the `{:?}` specifier, or their
            /// raw number value printed using the `{}` specifier.
            /// Some identifiers have `mention()` methods as well.
            #[derive(Copy, Clone, Hash, Eq, PartialEq, Debug, Ord, PartialOrd, Default)]
            pub struct $name(pub u64);

            impl $name {
                /// Milliseconds since the Unix epoch at which the object referred to by this ID was created.
                pub fn timestamp(&self) -> u64 {
                    snowflake_timestamp(self.0)
                }

                /// Get the creation date of the object referred to by this ID.
                ///
                /// Discord generates identifiers using a scheme based on [Twitter Snowflake]
                /// (https://github.com/twitter/snowflake/tree/b3f6a3c6ca8e1b6847baa6ff42bf72201e2c2231#snowflake).
                pub fn created_at(&self) -> DateTime<Utc> {
                    snowflake_date(self.0)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = std::num::ParseIntError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    s.parse().map($name)
                }
            }

            impl From<u64> for $name {
                fn from(id: u64) -> Self {
                    $name(id)
                }
            }

            impl Serialize for $name {
                fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                    s.collect_str(&self.0)
                }
            }

            impl<'d> Deserialize<'d> for $name {
                fn deserialize<D: Deserializer<'d>>(d: D) -> Result<Self, D::Error> {
                    crate::serial::deserialize_id(d).map($name)
                }
            }
        )*
    }
}

snowflake! {
    /// An identifier for an application, which bots are sometimes identified by
    ApplicationId;
    /// An identifier for a User
    UserId;
    /// An identifier for a Guild
    GuildId;
    /// An identifier for a Channel
    ChannelId;
    /// An identifier for a Message
    MessageId;
    /// An identifier for a Role
    RoleId;
    /// An identifier for an Emoji
    EmojiId;
    /// An identifier for an Interaction
    InteractionId;
    /// An identifier for an application command
    CommandId;
    /// An identifier for a message attachment
    AttachmentId;
    /// An identifier for a developer Team
    TeamId;
    /// An identifier for a Webhook
    WebhookId;
    /// An identifier for a purchasable SKU
    SkuId;
}

// Mentions

/// A mention targeted at a specific user, channel, or other entity.
///
/// A mention can be constructed by calling `.mention()` on a mentionable item
/// or an ID type which refers to it, and can be formatted into a string using
/// the `format!` macro:
///
/// ```ignore
/// let message = format!("Hey, {}, ping!", user.mention());
/// ```
///
/// If a `String` is required, call `mention.to_string()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mention {
    prefix: &'static str,
    id: u64,
}

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.prefix)?;
        fmt::Display::fmt(&self.id, f)?;
        fmt::Write::write_char(f, '>')
    }
}

impl UserId {
    /// Return a `Mention` which will ping this user.
    #[inline(always)]
    pub fn mention(&self) -> Mention {
        Mention {
            prefix: "<@",
            id: self.0,
        }
    }
}

impl RoleId {
    /// Return a `Mention` which will ping members of this role.
    #[inline(always)]
    pub fn mention(&self) -> Mention {
        Mention {
            prefix: "<@&",
            id: self.0,
        }
    }
}

impl ChannelId {
    /// Return a `Mention` which will link to this channel.
    #[inline(always)]
    pub fn mention(&self) -> Mention {
        Mention {
            prefix: "<#",
            id: self.0,
        }
    }
}

impl GuildId {
    /// Get the ID of the guild's `@everyone` role.
    ///
    /// ```ignore
    /// let mention_everyone = guild.id.everyone().mention();
    /// ````
    pub fn everyone(&self) -> RoleId {
        RoleId(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mention_test() {
        assert_eq!(UserId(1234).mention().to_string(), "<@1234>");
        assert_eq!(RoleId(1234).mention().to_string(), "<@&1234>");
        assert_eq!(ChannelId(1234).mention().to_string(), "<#1234>");
    }

    #[test]
    fn creation_date_is_decoded_from_the_id() {
        // 175928847299117063 is the example snowflake from the API documentation.
        let id = UserId(175928847299117063);
        assert_eq!(id.timestamp(), 1462015105796);
        assert_eq!(id.created_at().timestamp_millis(), 1462015105796);
        assert_eq!(id.created_at(), UserId(id.0).created_at());
    }

    #[test]
    fn ids_accept_strings_and_numbers() {
        let from_str: ChannelId = serde_json::from_value(json!("81384788765712384")).unwrap();
        let from_num: ChannelId = serde_json::from_value(json!(81384788765712384u64)).unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(
            serde_json::to_value(from_str).unwrap(),
            json!("81384788765712384")
        );
    }
}
