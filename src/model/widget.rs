//! Guild widgets.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base::{update_field, update_nullable};
use super::{flatten, ChannelId, Context, Entity, GuildId};
use crate::rest::{self, routes, RestRequest};
use crate::serial::nullable;
use crate::Result;

/// A voice channel shown on a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetChannel {
    /// The ID of the channel.
    pub id: ChannelId,
    /// The name of the channel.
    pub name: String,
    /// The sorting position of the channel.
    #[serde(default)]
    pub position: i64,
}

/// The activity of a widget member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetActivity {
    /// The name of the activity.
    pub name: String,
}

/// An online member shown on a widget.
///
/// Widget members are anonymized: the ID is only an index and usernames may
/// be altered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetMember {
    /// The anonymized ID of the member, `0` through `99`.
    pub id: String,
    /// The username of the member.
    pub username: String,
    /// The status of the member: `online`, `idle` or `dnd`.
    pub status: String,
    /// The avatar of the member.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// The voice channel the member is in.
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// Whether the member is deafened.
    #[serde(default)]
    pub deaf: Option<bool>,
    /// Whether the member is muted.
    #[serde(default)]
    pub mute: Option<bool>,
    /// Whether the member deafened themselves.
    #[serde(default)]
    pub self_deaf: Option<bool>,
    /// Whether the member muted themselves.
    #[serde(default)]
    pub self_mute: Option<bool>,
    /// Whether the member is suppressed in a stage channel.
    #[serde(default)]
    pub suppress: Option<bool>,
    /// What the member is doing.
    #[serde(default)]
    pub activity: Option<WidgetActivity>,
}

/// The raw payload of `GET /guilds/{id}/widget.json`.
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct WidgetData {
    pub id: GuildId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub instant_invite: Option<Option<String>>,
    #[serde(default)]
    pub channels: Option<Vec<WidgetChannel>>,
    #[serde(default)]
    pub members: Option<Vec<WidgetMember>>,
    #[serde(default)]
    pub presence_count: Option<u64>,
}

/// The public widget of a guild.
#[derive(Debug, Clone, Serialize)]
pub struct Widget {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the guild.
    pub id: GuildId,
    /// The name of the guild.
    pub name: String,
    /// The invite URL of the widget's invite channel.
    pub instant_invite: Option<String>,
    /// The voice channels of the guild, sorted by position.
    pub channels: Vec<WidgetChannel>,
    /// The online members, capped at 100.
    pub members: Vec<WidgetMember>,
    /// The number of online members.
    pub presence_count: u64,
}

impl Entity for Widget {
    type Data = WidgetData;

    fn from_data(ctx: &Context, data: &WidgetData) -> Self {
        let mut widget = Widget {
            ctx: ctx.clone(),
            id: data.id,
            name: String::new(),
            instant_invite: None,
            channels: Vec::new(),
            members: Vec::new(),
            presence_count: 0,
        };
        widget.patch(data);
        widget
    }

    fn patch(&mut self, data: &WidgetData) {
        update_field(&mut self.name, &data.name);
        update_nullable(&mut self.instant_invite, &data.instant_invite);
        if let Some(ref channels) = data.channels {
            self.channels = channels.clone();
            self.channels.sort_by_key(|channel| channel.position);
        }
        update_field(&mut self.members, &data.members);
        update_field(&mut self.presence_count, &data.presence_count);
    }

    fn to_json(&self) -> Value {
        flatten(self, [("image_url", json!(self.image_url("shield")))])
    }
}

impl Widget {
    pub(crate) async fn fetch_from(ctx: &Context, guild: GuildId) -> Result<Widget> {
        let request = RestRequest::get(routes::guild_widget(guild)).unauthenticated();
        let data: WidgetData = rest::fetch(ctx.rest(), request).await?;
        Ok(Widget::from_data(ctx, &data))
    }

    /// Refresh the widget with its current state.
    pub async fn fetch(&mut self) -> Result<&mut Widget> {
        let request = RestRequest::get(routes::guild_widget(self.id)).unauthenticated();
        let data: WidgetData = rest::fetch(self.ctx.rest(), request).await?;
        self.patch(&data);
        Ok(self)
    }

    /// Look up a channel shown on the widget.
    pub fn channel(&self, id: ChannelId) -> Option<&WidgetChannel> {
        self.channels.iter().find(|channel| channel.id == id)
    }

    /// The members in a voice channel.
    pub fn members_in(&self, channel: ChannelId) -> impl Iterator<Item = &WidgetMember> {
        self.members
            .iter()
            .filter(move |member| member.channel_id == Some(channel))
    }

    /// The URL of the widget image in the given style, such as `shield` or
    /// `banner1`.
    pub fn image_url(&self, style: &str) -> String {
        format!(
            "https://discord.com/api/guilds/{}/widget.png?style={}",
            self.id, style
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Rest};
    use futures::future::BoxFuture;

    #[derive(Debug)]
    struct Offline;

    impl Rest for Offline {
        fn request(&self, _: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    #[test]
    fn widget_payload() {
        let data: WidgetData = serde_json::from_value(json!({
            "id": "290926798626357999",
            "name": "Rust",
            "instant_invite": "https://discord.com/invite/rust",
            "channels": [
                { "id": "705186997612511363", "name": "Chill", "position": 2 },
                { "id": "290926798999357250", "name": "General", "position": 0 },
            ],
            "members": [
                {
                    "id": "0",
                    "username": "Ferris",
                    "discriminator": "0000",
                    "avatar": null,
                    "status": "online",
                    "avatar_url": "https://cdn.discordapp.com/widget-avatars/abc/def",
                    "channel_id": "290926798999357250",
                    "self_mute": true,
                    "activity": { "name": "cargo build" },
                },
                { "id": "1", "username": "Corro", "status": "idle" },
            ],
            "presence_count": 2,
        }))
        .unwrap();
        let mut widget = Widget::from_data(&Context::new(Offline), &data);

        assert_eq!(widget.channels[0].name, "General");
        assert_eq!(widget.channel(ChannelId(705186997612511363)).map(|c| c.position), Some(2));
        let in_general: Vec<_> = widget.members_in(ChannelId(290926798999357250)).collect();
        assert_eq!(in_general.len(), 1);
        assert_eq!(in_general[0].self_mute, Some(true));
        assert_eq!(
            in_general[0].activity.as_ref().map(|a| a.name.as_str()),
            Some("cargo build")
        );
        assert_eq!(
            widget.to_json()["image_url"],
            json!("https://discord.com/api/guilds/290926798626357999/widget.png?style=shield")
        );

        widget.patch(
            &serde_json::from_value(json!({ "id": "290926798626357999", "instant_invite": null }))
                .unwrap(),
        );
        assert_eq!(widget.instant_invite, None);
        assert_eq!(widget.presence_count, 2);
    }
}
