//! Channels of every kind.
//!
//! Each concrete channel type is a plain struct made of the field groups it
//! supports ([`GuildChannelFields`], [`TextFields`], [`VoiceFields`]). The
//! capability traits ([`Channel`], [`GuildChannel`], [`TextBased`],
//! [`VoiceBased`]) are implemented per type on top of those groups.
//! [`AnyChannel`] holds any of them, chosen by the payload's `type`.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::base::{image_ext, update_field, update_field_opt, update_nullable};
use super::{
    flatten, ApplicationId, ChannelId, Context, Emoji, EmojiId, Entity, Guild, GuildId, Mention, Message,
    MessageData, MessageId, Permissions, RoleId, ThreadChannel, ThreadMetadata, User, UserData,
    UserId,
};
use crate::builders::{EditChannel, SendMessage};
use crate::rest::{self, routes, RestRequest};
use crate::serial::{nullable, Eq};
use crate::{Error, Object, Result};

/// The type of a channel.
///
/// Types this crate does not know about are kept as `Unknown`.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelType {
    /// A text channel in a guild.
    GuildText,
    /// A direct message between users.
    Dm,
    /// A voice channel in a guild.
    GuildVoice,
    /// A direct message between multiple users.
    GroupDm,
    /// An organizational category containing up to 50 channels.
    GuildCategory,
    /// A channel that users can follow and crosspost into their own guild.
    GuildAnnouncement,
    /// A thread within an announcement channel.
    AnnouncementThread,
    /// A thread within a text or forum channel.
    PublicThread,
    /// A thread only viewable by those invited and those with `MANAGE_THREADS`.
    PrivateThread,
    /// A voice channel for hosting events with an audience.
    GuildStageVoice,
    /// The channel in a hub containing the listed guilds.
    GuildDirectory,
    /// A channel that can only contain threads.
    GuildForum,
    /// A channel that can only contain threads, laid out as a media gallery.
    GuildMedia,
    /// A channel type this crate does not know about.
    Unknown(u8),
}

impl From<u8> for ChannelType {
    fn from(value: u8) -> Self {
        match value {
            0 => ChannelType::GuildText,
            1 => ChannelType::Dm,
            2 => ChannelType::GuildVoice,
            3 => ChannelType::GroupDm,
            4 => ChannelType::GuildCategory,
            5 => ChannelType::GuildAnnouncement,
            10 => ChannelType::AnnouncementThread,
            11 => ChannelType::PublicThread,
            12 => ChannelType::PrivateThread,
            13 => ChannelType::GuildStageVoice,
            14 => ChannelType::GuildDirectory,
            15 => ChannelType::GuildForum,
            16 => ChannelType::GuildMedia,
            other => ChannelType::Unknown(other),
        }
    }
}

impl From<ChannelType> for u8 {
    fn from(kind: ChannelType) -> u8 {
        match kind {
            ChannelType::GuildText => 0,
            ChannelType::Dm => 1,
            ChannelType::GuildVoice => 2,
            ChannelType::GroupDm => 3,
            ChannelType::GuildCategory => 4,
            ChannelType::GuildAnnouncement => 5,
            ChannelType::AnnouncementThread => 10,
            ChannelType::PublicThread => 11,
            ChannelType::PrivateThread => 12,
            ChannelType::GuildStageVoice => 13,
            ChannelType::GuildDirectory => 14,
            ChannelType::GuildForum => 15,
            ChannelType::GuildMedia => 16,
            ChannelType::Unknown(other) => other,
        }
    }
}

impl ChannelType {
    /// Whether channels of this type are threads.
    pub fn is_thread(self) -> bool {
        matches!(
            self,
            ChannelType::AnnouncementThread | ChannelType::PublicThread | ChannelType::PrivateThread
        )
    }

    /// Whether messages can be sent in channels of this type.
    pub fn is_text_based(self) -> bool {
        matches!(
            self,
            ChannelType::GuildText
                | ChannelType::Dm
                | ChannelType::GuildVoice
                | ChannelType::GroupDm
                | ChannelType::GuildAnnouncement
                | ChannelType::GuildStageVoice
        ) || self.is_thread()
    }

    /// Whether users can connect to channels of this type.
    pub fn is_voice_based(self) -> bool {
        matches!(self, ChannelType::GuildVoice | ChannelType::GuildStageVoice)
    }

    /// Whether channels of this type belong to a guild.
    pub fn is_guild(self) -> bool {
        !matches!(self, ChannelType::Dm | ChannelType::GroupDm)
    }
}

/// A channel-specific permission overwrite for a role or member.
///
/// https://discord.com/developers/docs/resources/channel#overwrite-object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionOverwrite {
    /// A permission overwrite targeting users with a given role.
    Role {
        /// The ID of the role this overwrite is about.
        id: RoleId,

        /// Permissions to allow for this role.
        #[serde(default)]
        allow: Permissions,
        /// Permissions to deny for this role.
        #[serde(default)]
        deny: Permissions,

        /// Always `0`.
        #[serde(rename = "type")]
        kind: Eq<0>,
    },

    /// A permission overwrite targeting a specific user.
    Member {
        /// The ID of the member this overwrite is about.
        id: UserId,

        /// Permissions to allow for this member.
        #[serde(default)]
        allow: Permissions,
        /// Permissions to deny for this member.
        #[serde(default)]
        deny: Permissions,

        /// Always `1`.
        #[serde(rename = "type")]
        kind: Eq<1>,
    },
}

impl PermissionOverwrite {
    /// The permissions this overwrite allows.
    pub fn allow(&self) -> Permissions {
        match *self {
            PermissionOverwrite::Role { allow, .. } | PermissionOverwrite::Member { allow, .. } => {
                allow
            }
        }
    }

    /// The permissions this overwrite denies.
    pub fn deny(&self) -> Permissions {
        match *self {
            PermissionOverwrite::Role { deny, .. } | PermissionOverwrite::Member { deny, .. } => {
                deny
            }
        }
    }
}

/// A tag that can be applied to threads in a forum or media channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumTag {
    /// The ID of the tag.
    #[serde(deserialize_with = "crate::serial::deserialize_id")]
    pub id: u64,
    /// The name of the tag (0-20 characters).
    pub name: String,
    /// Whether the tag can only be applied by moderators.
    #[serde(default)]
    pub moderated: bool,
    /// The ID of a guild's custom emoji.
    #[serde(default)]
    pub emoji_id: Option<EmojiId>,
    /// The unicode character of the emoji.
    #[serde(default)]
    pub emoji_name: Option<String>,
}

/// The default reaction shown on posts of a forum channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultReaction {
    /// The ID of a guild's custom emoji.
    #[serde(default)]
    pub emoji_id: Option<EmojiId>,
    /// The unicode character of the emoji.
    #[serde(default)]
    pub emoji_name: Option<String>,
}

impl DefaultReaction {
    /// The reaction as an emoji.
    pub fn emoji(&self) -> Emoji {
        Emoji {
            id: self.emoji_id,
            name: self.emoji_name.clone(),
            animated: false,
        }
    }
}

/// The raw payload of any channel.
///
/// Every channel type shares this one payload shape, most fields are only
/// sent for some of them. Fields this crate does not know are kept in `extra`.
///
/// https://discord.com/developers/docs/resources/channel#channel-object
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelData {
    /// The ID of this channel.
    pub id: ChannelId,
    /// The type of channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[doc(hidden)]
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[doc(hidden)]
    #[serde(default)]
    pub position: Option<i64>,
    #[doc(hidden)]
    #[serde(default)]
    pub permission_overwrites: Option<Vec<PermissionOverwrite>>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub topic: Option<Option<String>>,
    #[doc(hidden)]
    #[serde(default)]
    pub nsfw: Option<bool>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub last_message_id: Option<Option<MessageId>>,
    #[doc(hidden)]
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[doc(hidden)]
    #[serde(default)]
    pub user_limit: Option<u64>,
    #[doc(hidden)]
    #[serde(default)]
    pub rate_limit_per_user: Option<u64>,
    #[doc(hidden)]
    #[serde(default)]
    pub recipients: Option<Vec<UserData>>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub icon: Option<Option<String>>,
    #[doc(hidden)]
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[doc(hidden)]
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub parent_id: Option<Option<ChannelId>>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub last_pin_timestamp: Option<Option<DateTime<Utc>>>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub rtc_region: Option<Option<String>>,
    #[doc(hidden)]
    #[serde(default)]
    pub video_quality_mode: Option<u8>,
    #[doc(hidden)]
    #[serde(default)]
    pub message_count: Option<u64>,
    #[doc(hidden)]
    #[serde(default)]
    pub member_count: Option<u64>,
    #[doc(hidden)]
    #[serde(default)]
    pub thread_metadata: Option<ThreadMetadata>,
    #[doc(hidden)]
    #[serde(default)]
    pub default_auto_archive_duration: Option<u64>,
    #[doc(hidden)]
    #[serde(default)]
    pub flags: Option<u64>,
    #[doc(hidden)]
    #[serde(default)]
    pub total_message_sent: Option<u64>,
    #[doc(hidden)]
    #[serde(default)]
    pub available_tags: Option<Vec<ForumTag>>,
    #[doc(hidden)]
    #[serde(default)]
    pub applied_tags: Option<Vec<String>>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub default_reaction_emoji: Option<Option<DefaultReaction>>,
    #[doc(hidden)]
    #[serde(default)]
    pub default_thread_rate_limit_per_user: Option<u64>,
    #[doc(hidden)]
    #[serde(default, deserialize_with = "nullable")]
    pub default_sort_order: Option<Option<u8>>,
    #[doc(hidden)]
    #[serde(default)]
    pub default_forum_layout: Option<u8>,
    /// Fields of the payload not covered above.
    #[serde(flatten)]
    pub extra: Object,
}

// Field groups

/// The fields every guild channel has.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GuildChannelFields {
    /// The guild this channel belongs to.
    pub guild_id: GuildId,
    /// The name of the channel.
    pub name: String,
    /// Sorting position of the channel.
    pub position: i64,
    /// The category this channel is in, or the parent channel of a thread.
    pub parent_id: Option<ChannelId>,
    /// Explicit permission overwrites for members and roles.
    pub permission_overwrites: Vec<PermissionOverwrite>,
    /// Whether the channel is age-restricted.
    pub nsfw: bool,
    /// Channel flags combined as a bitfield.
    pub flags: u64,
}

impl GuildChannelFields {
    pub(super) fn new(data: &ChannelData) -> Self {
        let mut fields = GuildChannelFields {
            guild_id: data.guild_id.unwrap_or_default(),
            ..Default::default()
        };
        fields.patch(data);
        fields
    }

    pub(super) fn patch(&mut self, data: &ChannelData) {
        update_field(&mut self.guild_id, &data.guild_id);
        if let Some(Some(ref name)) = data.name {
            self.name = name.clone();
        }
        update_field(&mut self.position, &data.position);
        update_nullable(&mut self.parent_id, &data.parent_id);
        update_field(&mut self.permission_overwrites, &data.permission_overwrites);
        update_field(&mut self.nsfw, &data.nsfw);
        update_field(&mut self.flags, &data.flags);
    }
}

/// The fields of channels messages can be sent in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextFields {
    /// The ID of the last message sent in the channel. It may not point to an existing message.
    pub last_message_id: Option<MessageId>,
    /// When the last pinned message was pinned.
    pub last_pin_timestamp: Option<DateTime<Utc>>,
    /// Seconds a user has to wait before sending another message.
    pub rate_limit_per_user: u64,
}

impl TextFields {
    pub(super) fn new(data: &ChannelData) -> Self {
        let mut fields = TextFields::default();
        fields.patch(data);
        fields
    }

    pub(super) fn patch(&mut self, data: &ChannelData) {
        update_nullable(&mut self.last_message_id, &data.last_message_id);
        update_nullable(&mut self.last_pin_timestamp, &data.last_pin_timestamp);
        update_field(&mut self.rate_limit_per_user, &data.rate_limit_per_user);
    }
}

/// The fields of channels users can connect to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VoiceFields {
    /// The bitrate of the channel, in bits.
    pub bitrate: u64,
    /// The user limit of the channel, `0` for none.
    pub user_limit: u64,
    /// The voice region of the channel, automatic when `None`.
    pub rtc_region: Option<String>,
    /// The camera video quality mode.
    pub video_quality_mode: u8,
}

impl VoiceFields {
    pub(super) fn new(data: &ChannelData) -> Self {
        let mut fields = VoiceFields {
            video_quality_mode: 1,
            ..Default::default()
        };
        fields.patch(data);
        fields
    }

    pub(super) fn patch(&mut self, data: &ChannelData) {
        update_field(&mut self.bitrate, &data.bitrate);
        update_field(&mut self.user_limit, &data.user_limit);
        update_nullable(&mut self.rtc_region, &data.rtc_region);
        update_field(&mut self.video_quality_mode, &data.video_quality_mode);
    }
}

// Capabilities

/// What every channel can do.
pub trait Channel: Send + Sync {
    /// The ID of the channel.
    fn id(&self) -> ChannelId;

    /// The type of the channel.
    fn kind(&self) -> ChannelType;

    /// The context this channel was created with.
    fn context(&self) -> &Context;

    /// The guild this channel belongs to, if any.
    fn guild_id(&self) -> Option<GuildId> {
        None
    }

    /// When the channel was created.
    fn created_at(&self) -> DateTime<Utc> {
        self.id().created_at()
    }

    /// A link to the channel in the Discord client.
    fn url(&self) -> String {
        match self.guild_id() {
            Some(guild) => format!("https://discord.com/channels/{}/{}", guild, self.id()),
            None => format!("https://discord.com/channels/@me/{}", self.id()),
        }
    }

    /// Return a `Mention` which will link to this channel.
    fn mention(&self) -> Mention {
        self.id().mention()
    }

    /// Fetch the current state of the channel.
    fn fetch(&self) -> impl Future<Output = Result<AnyChannel>> + Send {
        let ctx = self.context().clone();
        let id = self.id();
        async move {
            let data: ChannelData =
                rest::fetch(ctx.rest(), RestRequest::get(routes::channel(id))).await?;
            Ok(ctx.cache().channels.add(&ctx, id, &data))
        }
    }

    /// Delete the channel, or close a private message.
    ///
    /// Deleting a guild channel cannot be undone.
    fn delete(&self) -> impl Future<Output = Result<()>> + Send {
        let ctx = self.context().clone();
        let id = self.id();
        async move {
            rest::send(ctx.rest(), RestRequest::delete(routes::channel(id))).await?;
            ctx.cache().channels.remove(&id);
            Ok(())
        }
    }
}

/// Channels that belong to a guild.
pub trait GuildChannel: Channel {
    /// The guild channel fields of this channel.
    fn guild_fields(&self) -> &GuildChannelFields;

    /// The name of the channel.
    fn name(&self) -> &str {
        &self.guild_fields().name
    }

    /// Sorting position of the channel.
    fn position(&self) -> i64 {
        self.guild_fields().position
    }

    /// The category this channel is in.
    fn parent_id(&self) -> Option<ChannelId> {
        self.guild_fields().parent_id
    }

    /// Explicit permission overwrites for members and roles.
    fn permission_overwrites(&self) -> &[PermissionOverwrite] {
        &self.guild_fields().permission_overwrites
    }

    /// The guild this channel belongs to, if it is cached.
    fn guild(&self) -> Option<Guild> {
        self.context().cache().guilds.get(&self.guild_fields().guild_id)
    }

    /// The category this channel is in, if it is cached.
    fn parent(&self) -> Option<AnyChannel> {
        self.parent_id()
            .and_then(|id| self.context().cache().channels.get(&id))
    }

    /// Edit the channel. See [`EditChannel`] for the editable fields.
    ///
    /// ```ignore
    /// channel.edit(|ch| ch.name("general").topic("Welcome to the general chat!")).await?;
    /// ```
    fn edit<F>(&self, f: F) -> impl Future<Output = Result<AnyChannel>> + Send
    where
        F: FnOnce(EditChannel) -> EditChannel,
    {
        let id = self.id();
        let request = EditChannel::build(f).into_request(RestRequest::patch(routes::channel(id)));
        let ctx = self.context().clone();
        async move {
            let data: ChannelData = rest::fetch(ctx.rest(), request).await?;
            Ok(ctx.cache().channels.add(&ctx, id, &data))
        }
    }

    /// Rename the channel.
    fn set_name(&self, name: &str) -> impl Future<Output = Result<AnyChannel>> + Send {
        self.edit(move |ch| ch.name(name))
    }

    /// Move the channel.
    fn set_position(&self, position: i64) -> impl Future<Output = Result<AnyChannel>> + Send {
        self.edit(move |ch| ch.position(position))
    }

    /// Move the channel into a category, or out of it with `None`.
    fn set_parent(
        &self,
        parent: Option<ChannelId>,
    ) -> impl Future<Output = Result<AnyChannel>> + Send {
        self.edit(move |ch| ch.parent(parent))
    }
}

/// Channels messages can be sent in.
pub trait TextBased: Channel {
    /// The message related fields of this channel.
    fn text_fields(&self) -> &TextFields;

    /// The ID of the last message sent in the channel.
    fn last_message_id(&self) -> Option<MessageId> {
        self.text_fields().last_message_id
    }

    /// When the last pinned message was pinned.
    fn last_pin_at(&self) -> Option<DateTime<Utc>> {
        self.text_fields().last_pin_timestamp
    }

    /// Send a message to the channel.
    ///
    /// ```ignore
    /// channel.send(|m| m.content("Hello!")).await?;
    /// ```
    fn send<F>(&self, f: F) -> impl Future<Output = Result<Message>> + Send
    where
        F: FnOnce(SendMessage) -> SendMessage,
    {
        let id = self.id();
        let request =
            SendMessage::build(f).into_request(RestRequest::post(routes::channel_messages(id)));
        let ctx = self.context().clone();
        async move {
            let data: MessageData = rest::fetch(ctx.rest(), request).await?;
            Ok(Message::from_data(&ctx, &data))
        }
    }

    /// Fetch a message from the channel.
    fn fetch_message(&self, message: MessageId) -> impl Future<Output = Result<Message>> + Send {
        let ctx = self.context().clone();
        let id = self.id();
        async move {
            let request = RestRequest::get(routes::channel_message(id, message));
            let data: MessageData = rest::fetch(ctx.rest(), request).await?;
            Ok(Message::from_data(&ctx, &data))
        }
    }

    /// Fetch the pinned messages of the channel.
    fn fetch_pins(&self) -> impl Future<Output = Result<Vec<Message>>> + Send {
        let ctx = self.context().clone();
        let id = self.id();
        async move {
            let data: Vec<MessageData> =
                rest::fetch(ctx.rest(), RestRequest::get(routes::channel_pins(id))).await?;
            Ok(data
                .iter()
                .map(|message| Message::from_data(&ctx, message))
                .collect())
        }
    }
}

/// Channels users can connect to.
pub trait VoiceBased: GuildChannel {
    /// The voice related fields of this channel.
    fn voice_fields(&self) -> &VoiceFields;

    /// The bitrate of the channel, in bits.
    fn bitrate(&self) -> u64 {
        self.voice_fields().bitrate
    }

    /// The user limit of the channel, `None` if unlimited.
    fn user_limit(&self) -> Option<u64> {
        Some(self.voice_fields().user_limit).filter(|&limit| limit != 0)
    }

    /// The voice region of the channel, `None` when automatic.
    fn rtc_region(&self) -> Option<&str> {
        self.voice_fields().rtc_region.as_deref()
    }

    /// Change the bitrate of the channel.
    fn set_bitrate(&self, bitrate: u64) -> impl Future<Output = Result<AnyChannel>> + Send {
        self.edit(move |ch| ch.bitrate(bitrate))
    }

    /// Change the user limit of the channel, `0` for none.
    fn set_user_limit(&self, limit: u64) -> impl Future<Output = Result<AnyChannel>> + Send {
        self.edit(move |ch| ch.user_limit(limit))
    }
}

// Concrete channels

macro_rules! channel_base {
    ($name:ident) => {
        impl Channel for $name {
            fn id(&self) -> ChannelId {
                self.id
            }

            fn kind(&self) -> ChannelType {
                self.kind
            }

            fn context(&self) -> &Context {
                &self.ctx
            }

            fn guild_id(&self) -> Option<GuildId> {
                Some(self.guild.guild_id)
            }
        }

        impl GuildChannel for $name {
            fn guild_fields(&self) -> &GuildChannelFields {
                &self.guild
            }
        }
    };
}

macro_rules! guild_text_channel {
    ($(#[$attr:meta] $name:ident;)*) => {
        $(
            #[$attr]
            #[derive(Debug, Clone, Serialize)]
            pub struct $name {
                #[serde(skip)]
                ctx: Context,
                /// The ID of the channel.
                pub id: ChannelId,
                /// The type of the channel.
                #[serde(rename = "type")]
                pub kind: ChannelType,
                /// The guild channel fields.
                #[serde(flatten)]
                pub guild: GuildChannelFields,
                /// The message related fields.
                #[serde(flatten)]
                pub text: TextFields,
                /// The channel topic (0-1024 characters).
                pub topic: Option<String>,
                /// The default archive duration of threads created in this channel, in minutes.
                pub default_auto_archive_duration: Option<u64>,
            }

            impl Entity for $name {
                type Data = ChannelData;

                fn from_data(ctx: &Context, data: &ChannelData) -> Self {
                    let mut channel = $name {
                        ctx: ctx.clone(),
                        id: data.id,
                        kind: data.kind,
                        guild: GuildChannelFields::new(data),
                        text: TextFields::new(data),
                        topic: None,
                        default_auto_archive_duration: None,
                    };
                    channel.patch_own(data);
                    channel
                }

                fn patch(&mut self, data: &ChannelData) {
                    self.guild.patch(data);
                    self.text.patch(data);
                    self.patch_own(data);
                }

                fn to_json(&self) -> Value {
                    flatten(self, [("created_timestamp", json!(self.id.timestamp()))])
                }
            }

            impl $name {
                fn patch_own(&mut self, data: &ChannelData) {
                    update_nullable(&mut self.topic, &data.topic);
                    update_field_opt(
                        &mut self.default_auto_archive_duration,
                        &data.default_auto_archive_duration,
                    );
                }

                /// Set a new topic for the channel.
                pub async fn set_topic(&self, topic: Option<&str>) -> Result<AnyChannel> {
                    self.edit(|ch| ch.topic(topic)).await
                }
            }

            channel_base!($name);

            impl TextBased for $name {
                fn text_fields(&self) -> &TextFields {
                    &self.text
                }
            }
        )*
    };
}

guild_text_channel! {
    /// A text channel in a guild.
    TextChannel;
    /// An announcement channel, whose messages other guilds can follow.
    AnnouncementChannel;
}

/// A voice channel in a guild. Voice channels have a text chat as well.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceChannel {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the channel.
    pub id: ChannelId,
    /// The type of the channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The guild channel fields.
    #[serde(flatten)]
    pub guild: GuildChannelFields,
    /// The message related fields.
    #[serde(flatten)]
    pub text: TextFields,
    /// The voice related fields.
    #[serde(flatten)]
    pub voice: VoiceFields,
}

impl Entity for VoiceChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        VoiceChannel {
            ctx: ctx.clone(),
            id: data.id,
            kind: data.kind,
            guild: GuildChannelFields::new(data),
            text: TextFields::new(data),
            voice: VoiceFields::new(data),
        }
    }

    fn patch(&mut self, data: &ChannelData) {
        self.guild.patch(data);
        self.text.patch(data);
        self.voice.patch(data);
    }
}

channel_base!(VoiceChannel);

impl TextBased for VoiceChannel {
    fn text_fields(&self) -> &TextFields {
        &self.text
    }
}

impl VoiceBased for VoiceChannel {
    fn voice_fields(&self) -> &VoiceFields {
        &self.voice
    }
}

/// A stage channel, a voice channel for hosting events with an audience.
#[derive(Debug, Clone, Serialize)]
pub struct StageChannel {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the channel.
    pub id: ChannelId,
    /// The type of the channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The guild channel fields.
    #[serde(flatten)]
    pub guild: GuildChannelFields,
    /// The message related fields.
    #[serde(flatten)]
    pub text: TextFields,
    /// The voice related fields.
    #[serde(flatten)]
    pub voice: VoiceFields,
    /// The topic of the stage.
    pub topic: Option<String>,
}

impl Entity for StageChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        let mut channel = StageChannel {
            ctx: ctx.clone(),
            id: data.id,
            kind: data.kind,
            guild: GuildChannelFields::new(data),
            text: TextFields::new(data),
            voice: VoiceFields::new(data),
            topic: None,
        };
        update_nullable(&mut channel.topic, &data.topic);
        channel
    }

    fn patch(&mut self, data: &ChannelData) {
        self.guild.patch(data);
        self.text.patch(data);
        self.voice.patch(data);
        update_nullable(&mut self.topic, &data.topic);
    }
}

channel_base!(StageChannel);

impl TextBased for StageChannel {
    fn text_fields(&self) -> &TextFields {
        &self.text
    }
}

impl VoiceBased for StageChannel {
    fn voice_fields(&self) -> &VoiceFields {
        &self.voice
    }
}

/// A category that groups up to 50 channels.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryChannel {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the channel.
    pub id: ChannelId,
    /// The type of the channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The guild channel fields.
    #[serde(flatten)]
    pub guild: GuildChannelFields,
}

impl Entity for CategoryChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        CategoryChannel {
            ctx: ctx.clone(),
            id: data.id,
            kind: data.kind,
            guild: GuildChannelFields::new(data),
        }
    }

    fn patch(&mut self, data: &ChannelData) {
        self.guild.patch(data);
    }
}

impl CategoryChannel {
    /// The cached channels in this category.
    pub fn children(&self) -> Vec<AnyChannel> {
        self.ctx.cache().channels.filter(|channel| {
            channel.parent_id() == Some(self.id) && !channel.kind().is_thread()
        })
    }
}

channel_base!(CategoryChannel);

/// A forum or media channel, which only contains threads.
#[derive(Debug, Clone, Serialize)]
pub struct ForumChannel {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the channel.
    pub id: ChannelId,
    /// The type of the channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The guild channel fields.
    #[serde(flatten)]
    pub guild: GuildChannelFields,
    /// The guidelines shown when creating a post.
    pub topic: Option<String>,
    /// Seconds a user has to wait before creating another post.
    pub rate_limit_per_user: u64,
    /// The tags that can be applied to posts.
    pub available_tags: Vec<ForumTag>,
    /// The emoji shown as the default reaction on posts.
    pub default_reaction_emoji: Option<DefaultReaction>,
    /// The initial slowmode of new posts.
    pub default_thread_rate_limit_per_user: u64,
    /// The default archive duration of posts, in minutes.
    pub default_auto_archive_duration: Option<u64>,
    /// The default sort order of posts.
    pub default_sort_order: Option<u8>,
    /// The default layout of posts.
    pub default_forum_layout: u8,
}

impl Entity for ForumChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        let mut channel = ForumChannel {
            ctx: ctx.clone(),
            id: data.id,
            kind: data.kind,
            guild: GuildChannelFields::new(data),
            topic: None,
            rate_limit_per_user: 0,
            available_tags: Vec::new(),
            default_reaction_emoji: None,
            default_thread_rate_limit_per_user: 0,
            default_auto_archive_duration: None,
            default_sort_order: None,
            default_forum_layout: 0,
        };
        channel.patch_own(data);
        channel
    }

    fn patch(&mut self, data: &ChannelData) {
        self.guild.patch(data);
        self.patch_own(data);
    }
}

impl ForumChannel {
    fn patch_own(&mut self, data: &ChannelData) {
        update_nullable(&mut self.topic, &data.topic);
        update_field(&mut self.rate_limit_per_user, &data.rate_limit_per_user);
        update_field(&mut self.available_tags, &data.available_tags);
        update_nullable(&mut self.default_reaction_emoji, &data.default_reaction_emoji);
        update_field(
            &mut self.default_thread_rate_limit_per_user,
            &data.default_thread_rate_limit_per_user,
        );
        update_field_opt(
            &mut self.default_auto_archive_duration,
            &data.default_auto_archive_duration,
        );
        update_nullable(&mut self.default_sort_order, &data.default_sort_order);
        update_field(&mut self.default_forum_layout, &data.default_forum_layout);
    }

    /// Look up an available tag by name.
    pub fn tag(&self, name: &str) -> Option<&ForumTag> {
        self.available_tags.iter().find(|tag| tag.name == name)
    }
}

channel_base!(ForumChannel);

/// A direct message channel between the bot and one user.
#[derive(Debug, Clone, Serialize)]
pub struct DmChannel {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the channel.
    pub id: ChannelId,
    /// The type of the channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The user on the other side of the channel.
    pub recipient: Option<User>,
    /// The message related fields.
    #[serde(flatten)]
    pub text: TextFields,
}

impl Entity for DmChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        let mut channel = DmChannel {
            ctx: ctx.clone(),
            id: data.id,
            kind: data.kind,
            recipient: None,
            text: TextFields::new(data),
        };
        channel.patch_recipient(data);
        channel
    }

    fn patch(&mut self, data: &ChannelData) {
        self.text.patch(data);
        self.patch_recipient(data);
    }
}

impl DmChannel {
    fn patch_recipient(&mut self, data: &ChannelData) {
        if let Some(user) = data.recipients.as_ref().and_then(|users| users.first()) {
            self.recipient = Some(User::new(user));
        }
    }

    /// Whether the channel was only seen without its message state.
    pub fn partial(&self) -> bool {
        self.text.last_message_id.is_none()
    }
}

impl Channel for DmChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn kind(&self) -> ChannelType {
        self.kind
    }

    fn context(&self) -> &Context {
        &self.ctx
    }
}

impl TextBased for DmChannel {
    fn text_fields(&self) -> &TextFields {
        &self.text
    }
}

/// A group direct message, as seen by a bot.
///
/// Bots cannot be part of group DMs, they only see them partially through
/// interactions. Fetching and deleting are not supported.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDmChannel {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the channel.
    pub id: ChannelId,
    /// The type of the channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The name of the group.
    pub name: Option<String>,
    /// The icon hash of the group.
    pub icon: Option<String>,
    /// The creator of the group.
    pub owner_id: Option<UserId>,
    /// The application that created the group, if any.
    pub application_id: Option<ApplicationId>,
    /// The users in the group.
    pub recipients: Vec<User>,
}

impl Entity for GroupDmChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        let mut channel = GroupDmChannel {
            ctx: ctx.clone(),
            id: data.id,
            kind: data.kind,
            name: None,
            icon: None,
            owner_id: None,
            application_id: None,
            recipients: Vec::new(),
        };
        channel.patch(data);
        channel
    }

    fn patch(&mut self, data: &ChannelData) {
        update_nullable(&mut self.name, &data.name);
        update_nullable(&mut self.icon, &data.icon);
        update_field_opt(&mut self.owner_id, &data.owner_id);
        update_field_opt(&mut self.application_id, &data.application_id);
        if let Some(ref users) = data.recipients {
            self.recipients = users.iter().map(User::new).collect();
        }
    }
}

impl GroupDmChannel {
    /// Returns the formatted URL of the group's icon.
    pub fn icon_url(&self) -> Option<String> {
        self.icon.as_ref().map(|hash| {
            format!(cdn_concat!("/channel-icons/{}/{}.{}"), self.id, hash, image_ext(hash))
        })
    }
}

impl Channel for GroupDmChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn kind(&self) -> ChannelType {
        self.kind
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn fetch(&self) -> impl Future<Output = Result<AnyChannel>> + Send {
        async { Err(Error::Unsupported("fetching a group DM channel")) }
    }

    fn delete(&self) -> impl Future<Output = Result<()>> + Send {
        async { Err(Error::Unsupported("deleting a group DM channel")) }
    }
}

/// A channel of a type this crate does not know about.
#[derive(Debug, Clone, Serialize)]
pub struct UnknownChannel {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the channel.
    pub id: ChannelId,
    /// The type of the channel.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The guild the channel belongs to, if any.
    pub guild_id: Option<GuildId>,
    /// The name of the channel.
    pub name: Option<String>,
    /// The remaining fields of the payload, as received.
    #[serde(flatten)]
    pub extra: Object,
}

impl Entity for UnknownChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        let mut channel = UnknownChannel {
            ctx: ctx.clone(),
            id: data.id,
            kind: data.kind,
            guild_id: None,
            name: None,
            extra: Object::new(),
        };
        channel.patch(data);
        channel
    }

    fn patch(&mut self, data: &ChannelData) {
        update_field_opt(&mut self.guild_id, &data.guild_id);
        update_nullable(&mut self.name, &data.name);
        for (key, value) in &data.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

impl Channel for UnknownChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn kind(&self) -> ChannelType {
        self.kind
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }
}

// Any channel

/// A channel of any type.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnyChannel {
    /// A text channel in a guild.
    Text(TextChannel),
    /// An announcement channel.
    Announcement(AnnouncementChannel),
    /// A voice channel.
    Voice(VoiceChannel),
    /// A stage channel.
    Stage(StageChannel),
    /// A category.
    Category(CategoryChannel),
    /// A forum or media channel.
    Forum(ForumChannel),
    /// A direct message.
    Dm(DmChannel),
    /// A group direct message.
    GroupDm(GroupDmChannel),
    /// A thread.
    Thread(ThreadChannel),
    /// A channel of a type this crate does not know about.
    Unknown(UnknownChannel),
}

macro_rules! dispatch {
    ($self:expr, $channel:ident => $e:expr) => {
        match $self {
            AnyChannel::Text($channel) => $e,
            AnyChannel::Announcement($channel) => $e,
            AnyChannel::Voice($channel) => $e,
            AnyChannel::Stage($channel) => $e,
            AnyChannel::Category($channel) => $e,
            AnyChannel::Forum($channel) => $e,
            AnyChannel::Dm($channel) => $e,
            AnyChannel::GroupDm($channel) => $e,
            AnyChannel::Thread($channel) => $e,
            AnyChannel::Unknown($channel) => $e,
        }
    };
}

impl Entity for AnyChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        match data.kind {
            ChannelType::GuildText => AnyChannel::Text(TextChannel::from_data(ctx, data)),
            ChannelType::GuildAnnouncement => {
                AnyChannel::Announcement(AnnouncementChannel::from_data(ctx, data))
            }
            ChannelType::GuildVoice => AnyChannel::Voice(VoiceChannel::from_data(ctx, data)),
            ChannelType::GuildStageVoice => AnyChannel::Stage(StageChannel::from_data(ctx, data)),
            ChannelType::GuildCategory => {
                AnyChannel::Category(CategoryChannel::from_data(ctx, data))
            }
            ChannelType::GuildForum | ChannelType::GuildMedia => {
                AnyChannel::Forum(ForumChannel::from_data(ctx, data))
            }
            ChannelType::Dm => AnyChannel::Dm(DmChannel::from_data(ctx, data)),
            ChannelType::GroupDm => AnyChannel::GroupDm(GroupDmChannel::from_data(ctx, data)),
            ChannelType::AnnouncementThread
            | ChannelType::PublicThread
            | ChannelType::PrivateThread => AnyChannel::Thread(ThreadChannel::from_data(ctx, data)),
            ChannelType::GuildDirectory | ChannelType::Unknown(_) => {
                warn!("Unknown channel type {:?} for channel {}", data.kind, data.id);
                AnyChannel::Unknown(UnknownChannel::from_data(ctx, data))
            }
        }
    }

    fn patch(&mut self, data: &ChannelData) {
        if data.kind != self.kind() {
            // the channel was converted, e.g. a text channel into an announcement channel
            let ctx = self.context().clone();
            *self = AnyChannel::from_data(&ctx, data);
            return;
        }
        dispatch!(self, channel => channel.patch(data))
    }

    fn to_json(&self) -> Value {
        dispatch!(self, channel => channel.to_json())
    }
}

impl AnyChannel {
    /// Decode a channel payload.
    pub fn from_value(ctx: &Context, value: Value) -> Result<AnyChannel> {
        let data: ChannelData = serde_json::from_value(value)?;
        Ok(AnyChannel::from_data(ctx, &data))
    }

    /// The category or parent channel of this channel.
    pub fn parent_id(&self) -> Option<ChannelId> {
        self.guild_fields().and_then(|fields| fields.parent_id)
    }

    /// The guild channel fields, if this channel belongs to a guild.
    pub fn guild_fields(&self) -> Option<&GuildChannelFields> {
        match self {
            AnyChannel::Text(channel) => Some(&channel.guild),
            AnyChannel::Announcement(channel) => Some(&channel.guild),
            AnyChannel::Voice(channel) => Some(&channel.guild),
            AnyChannel::Stage(channel) => Some(&channel.guild),
            AnyChannel::Category(channel) => Some(&channel.guild),
            AnyChannel::Forum(channel) => Some(&channel.guild),
            AnyChannel::Thread(channel) => Some(&channel.guild),
            AnyChannel::Dm(_) | AnyChannel::GroupDm(_) | AnyChannel::Unknown(_) => None,
        }
    }

    /// The thread in this channel, if it is one.
    pub fn as_thread(&self) -> Option<&ThreadChannel> {
        match self {
            AnyChannel::Thread(thread) => Some(thread),
            _ => None,
        }
    }

    /// The message related fields, if this channel is text based.
    pub fn text_fields(&self) -> Option<&TextFields> {
        match self {
            AnyChannel::Text(channel) => Some(channel.text_fields()),
            AnyChannel::Announcement(channel) => Some(channel.text_fields()),
            AnyChannel::Voice(channel) => Some(channel.text_fields()),
            AnyChannel::Stage(channel) => Some(channel.text_fields()),
            AnyChannel::Dm(channel) => Some(channel.text_fields()),
            AnyChannel::Thread(channel) => Some(channel.text_fields()),
            _ => None,
        }
    }
}

impl Channel for AnyChannel {
    fn id(&self) -> ChannelId {
        dispatch!(self, channel => channel.id)
    }

    fn kind(&self) -> ChannelType {
        dispatch!(self, channel => channel.kind)
    }

    fn context(&self) -> &Context {
        dispatch!(self, channel => channel.context())
    }

    fn guild_id(&self) -> Option<GuildId> {
        dispatch!(self, channel => channel.guild_id())
    }

    fn fetch(&self) -> impl Future<Output = Result<AnyChannel>> + Send {
        async move { dispatch!(self, channel => channel.fetch().await) }
    }

    fn delete(&self) -> impl Future<Output = Result<()>> + Send {
        async move { dispatch!(self, channel => channel.delete().await) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[derive(Debug)]
    struct Offline;

    impl crate::Rest for Offline {
        fn request(
            &self,
            _: RestRequest,
        ) -> futures::future::BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    fn channel(value: Value) -> AnyChannel {
        AnyChannel::from_value(&Context::new(Offline), value).unwrap()
    }

    #[test]
    fn dispatch_on_type() {
        let text = channel(json!({
            "id": "41771983423143937",
            "guild_id": "41771983423143937",
            "name": "general",
            "type": 0,
            "position": 6,
            "permission_overwrites": [
                { "id": "41771983423143937", "type": 0, "allow": "1024", "deny": "0" },
                { "id": "80351110224678912", "type": 1, "allow": "0", "deny": "2048" },
            ],
            "rate_limit_per_user": 2,
            "nsfw": true,
            "topic": "24/7 chat about how to gank Mike #2",
            "last_message_id": "155117677105512449",
            "parent_id": "399942396007890945",
        }));

        let text = match text {
            AnyChannel::Text(text) => text,
            other => panic!("expected a text channel, got {:?}", other.kind()),
        };
        assert_eq!(text.name(), "general");
        assert_eq!(text.parent_id(), Some(ChannelId(399942396007890945)));
        assert_eq!(text.last_message_id(), Some(MessageId(155117677105512449)));
        assert_eq!(text.permission_overwrites()[0].allow(), Permissions::VIEW_CHANNEL);
        assert_eq!(text.permission_overwrites()[1].deny(), Permissions::SEND_MESSAGES);
        assert_eq!(
            text.url(),
            "https://discord.com/channels/41771983423143937/41771983423143937"
        );
        assert_eq!(text.created_at(), text.id.created_at());

        let json = text.to_json();
        assert_eq!(json["type"], json!(0));
        assert_eq!(json["name"], json!("general"));
        assert!(json.get("ctx").is_none());
    }

    #[test]
    fn voice_capabilities() {
        let voice = channel(json!({
            "id": "155101607195836416",
            "guild_id": "41771983423143937",
            "name": "ROCKET CHEESE",
            "type": 2,
            "bitrate": 64000,
            "user_limit": 0,
            "rtc_region": null,
        }));
        match voice {
            AnyChannel::Voice(ref voice) => {
                assert_eq!(voice.bitrate(), 64000);
                assert_eq!(voice.user_limit(), None);
                assert_eq!(voice.rtc_region(), None);
            }
            ref other => panic!("expected a voice channel, got {:?}", other.kind()),
        }
        assert!(voice.kind().is_voice_based());
        assert!(voice.kind().is_text_based());
    }

    #[test]
    fn unknown_types_keep_their_payload() {
        let unknown = channel(json!({
            "id": "1",
            "type": 99,
            "name": "future",
            "hologram_depth": 3,
        }));
        match unknown {
            AnyChannel::Unknown(ref unknown) => {
                assert_eq!(unknown.kind, ChannelType::Unknown(99));
                assert_eq!(unknown.extra["hologram_depth"], json!(3));
            }
            ref other => panic!("expected an unknown channel, got {:?}", other.kind()),
        }
        let json = unknown.to_json();
        assert_eq!(json["type"], json!(99));
        assert_eq!(json["hologram_depth"], json!(3));
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let mut text = channel(json!({
            "id": "1", "type": 0, "guild_id": "2", "name": "general", "topic": "hi",
        }));
        let patch: ChannelData =
            serde_json::from_value(json!({ "id": "1", "type": 0, "position": 3 })).unwrap();
        let before = text.update(&patch);
        text.patch(&patch);

        match (&before, &text) {
            (AnyChannel::Text(before), AnyChannel::Text(after)) => {
                assert_eq!(before.position(), 0);
                assert_eq!(after.position(), 3);
                assert_eq!(after.name(), "general");
                assert_eq!(after.topic.as_deref(), Some("hi"));
            }
            _ => panic!("expected text channels"),
        }
    }

    #[test]
    fn type_change_rebuilds_the_channel() {
        let mut channel = channel(json!({ "id": "1", "type": 0, "guild_id": "2", "name": "news" }));
        channel.patch(
            &serde_json::from_value(json!({ "id": "1", "type": 5, "guild_id": "2", "name": "news" }))
                .unwrap(),
        );
        assert_eq!(channel.kind(), ChannelType::GuildAnnouncement);
    }

    #[test]
    fn group_dm_cannot_be_deleted() {
        let group = channel(json!({
            "id": "319674150115610528",
            "type": 3,
            "name": "Some test channel",
            "icon": null,
            "recipients": [{ "id": "82198898841029460", "username": "test" }],
        }));
        assert_eq!(group.url(), "https://discord.com/channels/@me/319674150115610528");

        let err = futures::executor::block_on(group.delete()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn channel_type_round_trip() {
        for raw in [0u8, 1, 2, 3, 4, 5, 10, 11, 12, 13, 14, 15, 16, 42] {
            let kind = ChannelType::from(raw);
            assert_eq!(u8::from(kind), raw);
        }
        assert_eq!(
            serde_json::to_value(ChannelType::PrivateThread).unwrap(),
            json!(12)
        );
    }
}
