//! Threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base::{update_field, update_field_opt};
use super::{
    flatten, AnyChannel, Channel, ChannelData, ChannelId, ChannelType, Context, Entity,
    GuildChannel, GuildChannelFields, GuildId, Message, MessageData, MessageId, TextBased,
    TextFields, UserId,
};
use crate::builders::EditThread;
use crate::rest::{self, routes, RestRequest};
use crate::{Error, Object, Result};

/// Thread-specific fields of a channel payload.
///
/// https://discord.com/developers/docs/resources/channel#thread-metadata-object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMetadata {
    /// Whether the thread is archived.
    pub archived: bool,
    /// Minutes of inactivity after which the thread is archived.
    pub auto_archive_duration: u64,
    /// When the archive status was last changed.
    pub archive_timestamp: DateTime<Utc>,
    /// Whether only moderators can unarchive the thread.
    #[serde(default)]
    pub locked: bool,
    /// Whether non-moderators can add other non-moderators, private threads only.
    #[serde(default)]
    pub invitable: Option<bool>,
    /// When the thread was created, only set for threads created after 2022-01-09.
    #[serde(default)]
    pub create_timestamp: Option<DateTime<Utc>>,
}

/// A thread inside a text, announcement, forum or media channel.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadChannel {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the thread.
    pub id: ChannelId,
    /// The type of the thread.
    #[serde(rename = "type")]
    pub kind: ChannelType,
    /// The guild channel fields. `parent_id` is the channel the thread was created in.
    #[serde(flatten)]
    pub guild: GuildChannelFields,
    /// The message related fields.
    #[serde(flatten)]
    pub text: TextFields,
    /// The user that started the thread.
    pub owner_id: Option<UserId>,
    /// Whether the thread is archived.
    pub archived: Option<bool>,
    /// Whether only moderators can unarchive the thread.
    pub locked: Option<bool>,
    /// Whether non-moderators can add other non-moderators, private threads only.
    pub invitable: Option<bool>,
    /// Minutes of inactivity after which the thread is archived.
    pub auto_archive_duration: Option<u64>,
    /// When the archive status was last changed.
    pub archive_timestamp: Option<DateTime<Utc>>,
    /// When the thread was created, if Discord recorded it.
    pub create_timestamp: Option<DateTime<Utc>>,
    /// Approximate number of members in the thread, stops counting at 50.
    pub member_count: Option<u64>,
    /// Approximate number of messages in the thread, not counting the starter message.
    pub message_count: Option<u64>,
    /// Number of messages ever sent in the thread.
    pub total_message_sent: Option<u64>,
    /// IDs of the forum tags applied to the thread.
    pub applied_tags: Vec<String>,
}

impl Entity for ThreadChannel {
    type Data = ChannelData;

    fn from_data(ctx: &Context, data: &ChannelData) -> Self {
        let mut thread = ThreadChannel {
            ctx: ctx.clone(),
            id: data.id,
            kind: data.kind,
            guild: GuildChannelFields::new(data),
            text: TextFields::new(data),
            owner_id: None,
            archived: None,
            locked: None,
            invitable: None,
            auto_archive_duration: None,
            archive_timestamp: None,
            create_timestamp: None,
            member_count: None,
            message_count: None,
            total_message_sent: None,
            applied_tags: Vec::new(),
        };
        thread.patch(data);
        thread
    }

    fn patch(&mut self, data: &ChannelData) {
        self.guild.patch(data);
        self.text.patch(data);

        if let Some(ref meta) = data.thread_metadata {
            self.archived = Some(meta.archived);
            self.locked = Some(meta.locked);
            self.auto_archive_duration = Some(meta.auto_archive_duration);
            self.archive_timestamp = Some(meta.archive_timestamp);
            if self.kind == ChannelType::PrivateThread {
                self.invitable = Some(meta.invitable.unwrap_or(false));
            }
            update_field_opt(&mut self.create_timestamp, &meta.create_timestamp);
        }

        update_field_opt(&mut self.owner_id, &data.owner_id);
        update_field_opt(&mut self.member_count, &data.member_count);
        update_field_opt(&mut self.message_count, &data.message_count);
        update_field_opt(&mut self.total_message_sent, &data.total_message_sent);
        update_field(&mut self.applied_tags, &data.applied_tags);
    }

    fn to_json(&self) -> Value {
        flatten(
            self,
            [
                ("created_timestamp", json!(self.created_at().timestamp_millis())),
                ("archived_timestamp", json!(self.archived_at().map(|at| at.timestamp_millis()))),
            ],
        )
    }
}

impl ThreadChannel {
    /// When the archive status of the thread last changed.
    ///
    /// For threads never archived or unarchived this is when they were created.
    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archive_timestamp
    }

    /// Edit the thread. See [`EditThread`] for the editable fields.
    ///
    /// ```ignore
    /// thread.edit(|t| t.archived(true).reason("resolved")).await?;
    /// ```
    pub async fn edit<F>(&self, f: F) -> Result<ThreadChannel>
    where
        F: FnOnce(EditThread) -> EditThread,
    {
        let mut current = Object::new();
        current.insert("name".to_owned(), json!(self.guild.name.trim()));
        let mut edit = EditThread::apply(f, current);
        if self.kind != ChannelType::PrivateThread {
            edit = edit.unset("invitable");
        }

        let request = edit.into_request(RestRequest::patch(routes::channel(self.id)));
        let data: ChannelData = rest::fetch(self.ctx.rest(), request).await?;
        match self.ctx.cache().channels.add(&self.ctx, self.id, &data) {
            AnyChannel::Thread(thread) => Ok(thread),
            _ => Err(Error::Protocol("Expected a thread in the response")),
        }
    }

    /// Archive or unarchive the thread.
    pub async fn set_archived(&self, archived: bool) -> Result<ThreadChannel> {
        self.edit(|t| t.archived(archived)).await
    }

    /// Lock or unlock the thread.
    pub async fn set_locked(&self, locked: bool) -> Result<ThreadChannel> {
        self.edit(|t| t.locked(locked)).await
    }

    /// Set the minutes of inactivity after which the thread is archived.
    pub async fn set_auto_archive_duration(&self, minutes: u64) -> Result<ThreadChannel> {
        self.edit(|t| t.auto_archive_duration(minutes)).await
    }

    /// Set whether non-moderators can add other non-moderators.
    ///
    /// Only private threads can be made invitable.
    pub async fn set_invitable(&self, invitable: bool) -> Result<ThreadChannel> {
        if self.kind != ChannelType::PrivateThread {
            return Err(Error::Unsupported("invitable can only be set on private threads"));
        }
        self.edit(|t| t.invitable(invitable)).await
    }

    /// Rename the thread.
    pub async fn rename(&self, name: &str) -> Result<ThreadChannel> {
        self.edit(|t| t.name(name)).await
    }

    /// Add the current user to the thread.
    pub async fn join(&self) -> Result<()> {
        rest::send(
            self.ctx.rest(),
            RestRequest::put(routes::thread_member_me(self.id)),
        )
        .await
    }

    /// Remove the current user from the thread.
    pub async fn leave(&self) -> Result<()> {
        rest::send(
            self.ctx.rest(),
            RestRequest::delete(routes::thread_member_me(self.id)),
        )
        .await
    }

    /// Fetch the message that started this thread, if it was started from one.
    pub async fn fetch_starter_message(&self) -> Result<Message> {
        let parent = self
            .guild
            .parent_id
            .ok_or(Error::Other("The thread has no parent channel"))?;
        let request = RestRequest::get(routes::channel_message(parent, MessageId(self.id.0)));
        let data: MessageData = rest::fetch(self.ctx.rest(), request).await?;
        Ok(Message::from_data(&self.ctx, &data))
    }
}

impl Channel for ThreadChannel {
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

    /// When the thread was created, falling back to the date in its ID for
    /// threads created before Discord recorded it.
    fn created_at(&self) -> DateTime<Utc> {
        self.create_timestamp.unwrap_or_else(|| self.id.created_at())
    }
}

impl GuildChannel for ThreadChannel {
    fn guild_fields(&self) -> &GuildChannelFields {
        &self.guild
    }
}

impl TextBased for ThreadChannel {
    fn text_fields(&self) -> &TextFields {
        &self.text
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
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    fn thread(value: Value) -> ThreadChannel {
        let data: ChannelData = serde_json::from_value(value).unwrap();
        ThreadChannel::from_data(&Context::new(Offline), &data)
    }

    #[test]
    fn metadata_is_patched() {
        let mut thread = thread(json!({
            "id": "41771983423143937",
            "guild_id": "41771983423143937",
            "parent_id": "41771983423143937",
            "owner_id": "41771983423143937",
            "name": "don't buy dota-2",
            "type": 12,
            "last_message_id": "155117677105512449",
            "message_count": 1,
            "member_count": 5,
            "rate_limit_per_user": 2,
            "thread_metadata": {
                "archived": false,
                "auto_archive_duration": 1440,
                "archive_timestamp": "2021-04-12T23:40:39.855793+00:00",
                "locked": false,
                "create_timestamp": "2021-04-12T23:40:39.855793+00:00",
            },
            "total_message_sent": 1,
        }));

        assert_eq!(thread.name(), "don't buy dota-2");
        assert_eq!(thread.archived, Some(false));
        assert_eq!(thread.invitable, Some(false));
        assert_eq!(thread.auto_archive_duration, Some(1440));
        assert_eq!(thread.created_at().timestamp(), 1618270839);
        assert_eq!(thread.archived_at(), thread.create_timestamp);

        thread.patch(
            &serde_json::from_value(json!({
                "id": "41771983423143937",
                "type": 12,
                "thread_metadata": {
                    "archived": true,
                    "auto_archive_duration": 60,
                    "archive_timestamp": "2021-04-13T00:00:00+00:00",
                },
            }))
            .unwrap(),
        );
        assert_eq!(thread.archived, Some(true));
        assert_eq!(thread.auto_archive_duration, Some(60));
        assert_eq!(thread.name(), "don't buy dota-2");
        assert_eq!(thread.member_count, Some(5));
        // still known from the first payload
        assert_eq!(thread.created_at().timestamp(), 1618270839);
    }

    #[test]
    fn created_at_falls_back_to_the_id() {
        let thread = thread(json!({
            "id": "175928847299117063",
            "type": 11,
            "guild_id": "1",
            "name": "old thread",
        }));
        assert_eq!(thread.created_at(), thread.id.created_at());
        assert_eq!(thread.invitable, None);
        assert_eq!(thread.archived_at(), None);
    }

    #[test]
    fn only_private_threads_are_invitable() {
        let public = thread(json!({ "id": "1", "type": 11, "guild_id": "1", "name": "t" }));
        let err = futures::executor::block_on(public.set_invitable(true)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedOperation);
    }
}
