//! Messages and their attachments.

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base::{update_field, update_field_opt, update_nullable};
use super::{
    find_component, flatten, AnyChannel, ApplicationId, AttachmentId, ChannelId, Component,
    Context, Entity, GuildId, MessageId, Poll, PollData, ToJson, User, UserData, WebhookId,
};
use crate::rest::{self, routes, RestRequest};
use crate::serial::nullable;
use crate::Result;

bitflags! {
    /// Flags of a message.
    #[derive(Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MessageFlags: u64 {
        /// The message has been published to following channels.
        const CROSSPOSTED = 1;
        /// The message was crossposted from a followed channel.
        const IS_CROSSPOST = 1 << 1;
        /// Embeds are not shown.
        const SUPPRESS_EMBEDS = 1 << 2;
        /// The crossposted source message was deleted.
        const SOURCE_MESSAGE_DELETED = 1 << 3;
        /// The message came from the urgent message system.
        const URGENT = 1 << 4;
        /// A thread was started from the message.
        const HAS_THREAD = 1 << 5;
        /// Only the user receiving the message can see it.
        const EPHEMERAL = 1 << 6;
        /// The message is an interaction response and the bot is "thinking".
        const LOADING = 1 << 7;
        /// Some roles were not mentioned and added to the thread.
        const FAILED_TO_MENTION_SOME_ROLES_IN_THREAD = 1 << 8;
        /// The message does not trigger push and desktop notifications.
        const SUPPRESS_NOTIFICATIONS = 1 << 12;
        /// The message is a voice message.
        const IS_VOICE_MESSAGE = 1 << 13;
        /// The message has a snapshot of a forwarded message.
        const HAS_SNAPSHOT = 1 << 14;
        /// The message is laid out with components only.
        const IS_COMPONENTS_V2 = 1 << 15;
    }
}

/// A file attached to a message.
///
/// https://discord.com/developers/docs/resources/message#attachment-object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// The ID of the attachment.
    pub id: AttachmentId,
    /// The name of the file.
    pub filename: String,
    /// The title of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Alt text of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The media type of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// The size of the file in bytes.
    pub size: u64,
    /// The source URL of the file.
    pub url: String,
    /// A proxied URL of the file.
    pub proxy_url: String,
    /// The height of an image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    /// The width of an image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    /// Whether the attachment is ephemeral.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,
    /// The length of a voice message, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    /// The base64 encoded waveform of a voice message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waveform: Option<String>,
    /// Attachment flags combined as a bitfield.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl Attachment {
    /// Whether the file is marked as a spoiler.
    pub fn spoiler(&self) -> bool {
        self.filename.starts_with("SPOILER_")
    }

    /// The `(width, height)` of an image or video.
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some((width, height)),
            _ => None,
        }
    }

    /// Whether this attachment serializes to the same payload as `other`.
    pub fn equals(&self, other: &impl ToJson) -> bool {
        self.to_json() == other.to_json()
    }
}

impl ToJson for Attachment {
    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// The raw payload of a message.
///
/// https://discord.com/developers/docs/resources/message#message-object
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct MessageData {
    pub id: MessageId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub author: Option<UserData>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub edited_timestamp: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub tts: Option<bool>,
    #[serde(default)]
    pub mention_everyone: Option<bool>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(rename = "type", default)]
    pub kind: Option<u8>,
    #[serde(default)]
    pub flags: Option<MessageFlags>,
    #[serde(default)]
    pub embeds: Option<Vec<Value>>,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    pub components: Option<Vec<Component>>,
    #[serde(default)]
    pub poll: Option<PollData>,
    #[serde(default)]
    pub webhook_id: Option<WebhookId>,
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
}

/// A message sent in a channel.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the message.
    pub id: MessageId,
    /// The channel the message was sent in.
    pub channel_id: ChannelId,
    /// The guild the message was sent in, if any.
    pub guild_id: Option<GuildId>,
    /// The author of the message.
    pub author: Option<User>,
    /// The text of the message.
    pub content: String,
    /// When the message was last edited.
    pub edited_timestamp: Option<DateTime<Utc>>,
    /// Whether the message was sent as text-to-speech.
    pub tts: bool,
    /// Whether the message mentions everyone.
    pub mention_everyone: bool,
    /// Whether the message is pinned.
    pub pinned: bool,
    /// The type of the message.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Flags of the message.
    pub flags: MessageFlags,
    /// The embeds of the message, as received.
    pub embeds: Vec<Value>,
    /// The files attached to the message.
    pub attachments: Vec<Attachment>,
    /// The component trees of the message.
    pub components: Vec<Component>,
    /// The poll of the message.
    pub poll: Option<Poll>,
    /// The webhook that sent the message.
    pub webhook_id: Option<WebhookId>,
    /// The application of an interaction response.
    pub application_id: Option<ApplicationId>,
}

impl Entity for Message {
    type Data = MessageData;

    fn from_data(ctx: &Context, data: &MessageData) -> Self {
        let mut message = Message {
            ctx: ctx.clone(),
            id: data.id,
            channel_id: data.channel_id,
            guild_id: None,
            author: None,
            content: String::new(),
            edited_timestamp: None,
            tts: false,
            mention_everyone: false,
            pinned: false,
            kind: 0,
            flags: MessageFlags::empty(),
            embeds: Vec::new(),
            attachments: Vec::new(),
            components: Vec::new(),
            poll: None,
            webhook_id: None,
            application_id: None,
        };
        message.patch(data);
        message
    }

    fn patch(&mut self, data: &MessageData) {
        update_field_opt(&mut self.guild_id, &data.guild_id);
        update_field_opt(&mut self.author, &data.author.as_ref().map(User::new));
        update_field(&mut self.content, &data.content);
        update_nullable(&mut self.edited_timestamp, &data.edited_timestamp);
        update_field(&mut self.tts, &data.tts);
        update_field(&mut self.mention_everyone, &data.mention_everyone);
        update_field(&mut self.pinned, &data.pinned);
        update_field(&mut self.kind, &data.kind);
        update_field(&mut self.flags, &data.flags);
        update_field(&mut self.embeds, &data.embeds);
        update_field(&mut self.attachments, &data.attachments);
        update_field(&mut self.components, &data.components);
        update_field_opt(&mut self.webhook_id, &data.webhook_id);
        update_field_opt(&mut self.application_id, &data.application_id);

        if let Some(ref poll) = data.poll {
            let mut poll = poll.clone();
            poll.channel_id = self.channel_id;
            poll.message_id = self.id;
            match self.poll {
                Some(ref mut existing) => existing.patch(&poll),
                None => self.poll = Some(Poll::from_data(&self.ctx, &poll)),
            }
        }
    }

    fn to_json(&self) -> Value {
        flatten(
            self,
            [
                ("created_timestamp", json!(self.id.timestamp())),
                ("url", json!(self.url())),
            ],
        )
    }
}

impl Message {
    /// When the message was sent.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// A link to the message in the Discord client.
    pub fn url(&self) -> String {
        match self.guild_id {
            Some(guild) => format!(
                "https://discord.com/channels/{}/{}/{}",
                guild, self.channel_id, self.id
            ),
            None => format!("https://discord.com/channels/@me/{}/{}", self.channel_id, self.id),
        }
    }

    /// The channel the message was sent in, if it is cached.
    pub fn channel(&self) -> Option<AnyChannel> {
        self.ctx.cache().channels.get(&self.channel_id)
    }

    /// Find a component of the message by custom ID.
    pub fn component(&self, custom_id: &str) -> Option<&Component> {
        find_component(&self.components, custom_id)
    }

    /// Whether the message was sent by a webhook or an interaction response.
    pub fn is_webhook(&self) -> bool {
        self.webhook_id.is_some()
    }

    /// Fetch the current state of the message and patch it in.
    pub async fn fetch(&mut self) -> Result<&mut Message> {
        let request = RestRequest::get(routes::channel_message(self.channel_id, self.id));
        let data: MessageData = rest::fetch(self.ctx.rest(), request).await?;
        self.patch(&data);
        Ok(self)
    }

    /// Delete the message.
    pub async fn delete(&self) -> Result<()> {
        rest::send(
            self.ctx.rest(),
            RestRequest::delete(routes::channel_message(self.channel_id, self.id)),
        )
        .await
    }
}
