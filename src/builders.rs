//! Builder types used for outbound payloads.
//!
//! Request builders are handed to a closure which chains setters on them:
//!
//! ```ignore
//! channel.edit(|ch| ch.name("general").topic(Some("Welcome!"))).await?;
//! ```
//!
//! Component builders accept the field names developers write (`camelCase`,
//! emoji shorthand such as `"<:blob:123456789012345678>"`) and produce the
//! `snake_case` wire shape.

use serde_json::{json, Value};

use crate::model::{
    ChannelId, ChannelType, ComponentType, Emoji, MessageFlags, MessageId, RoleId, ToJson,
};
use crate::rest::RestRequest;
use crate::serial::snake_case_keys;
use crate::Object;

macro_rules! request_builder {
    ($(#[$attr:meta])* $name:ident;) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            map: Object,
            reason: Option<String>,
        }

        impl $name {
            /// Run `f` on an empty builder.
            pub fn build<F: FnOnce($name) -> $name>(f: F) -> Self {
                Self::apply(f, Object::new())
            }

            /// Run `f` on a builder filled with the current values in `map`.
            pub fn apply<F: FnOnce($name) -> $name>(f: F, map: Object) -> Self {
                f($name { map, reason: None })
            }

            /// The JSON body built so far.
            pub fn body(&self) -> &Object {
                &self.map
            }

            /// Remove a field from the body.
            pub fn unset(mut self, key: &str) -> Self {
                self.map.remove(key);
                self
            }

            /// Attach the body, and the audit log reason if one was set, to a request.
            pub fn into_request(self, request: RestRequest) -> RestRequest {
                request.json(Value::Object(self.map)).reason(self.reason)
            }

            fn set(mut self, key: &str, value: Value) -> Self {
                self.map.insert(key.to_owned(), value);
                self
            }
        }

        impl ToJson for $name {
            fn to_json(&self) -> Value {
                Value::Object(self.map.clone())
            }
        }
    };
}

macro_rules! audit_reason {
    ($name:ident) => {
        impl $name {
            /// The reason recorded in the guild's audit log.
            pub fn reason(mut self, reason: &str) -> Self {
                self.reason = Some(reason.to_owned());
                self
            }
        }
    };
}

request_builder! {
    /// Patch content for the `edit_channel` call.
    EditChannel;
}
audit_reason!(EditChannel);

impl EditChannel {
    /// Edit the channel's name.
    pub fn name(self, name: &str) -> Self {
        self.set("name", json!(name))
    }

    /// Edit the position of the channel.
    pub fn position(self, position: i64) -> Self {
        self.set("position", json!(position))
    }

    /// Edit the topic of a text channel, or clear it with `None`.
    pub fn topic(self, topic: Option<&str>) -> Self {
        self.set("topic", json!(topic))
    }

    /// Edit whether the channel is age restricted.
    pub fn nsfw(self, nsfw: bool) -> Self {
        self.set("nsfw", json!(nsfw))
    }

    /// Edit the slowmode of the channel, in seconds.
    pub fn rate_limit_per_user(self, seconds: u64) -> Self {
        self.set("rate_limit_per_user", json!(seconds))
    }

    /// Edit the bitrate of a voice channel.
    pub fn bitrate(self, bitrate: u64) -> Self {
        self.set("bitrate", json!(bitrate))
    }

    /// Edit the member limit of a voice channel, `0` for no limit.
    pub fn user_limit(self, limit: u64) -> Self {
        self.set("user_limit", json!(limit))
    }

    /// Move the channel into a category, or out of any with `None`.
    pub fn parent(self, parent: Option<ChannelId>) -> Self {
        self.set("parent_id", json!(parent))
    }

    /// Edit the voice region of a voice channel, `None` for automatic.
    pub fn rtc_region(self, region: Option<&str>) -> Self {
        self.set("rtc_region", json!(region))
    }

    /// Edit the archive duration threads in this channel get by default.
    pub fn default_auto_archive_duration(self, minutes: u64) -> Self {
        self.set("default_auto_archive_duration", json!(minutes))
    }
}

request_builder! {
    /// Patch content for a thread.
    EditThread;
}
audit_reason!(EditThread);

impl EditThread {
    /// Rename the thread.
    pub fn name(self, name: &str) -> Self {
        self.set("name", json!(name))
    }

    /// Archive or unarchive the thread.
    pub fn archived(self, archived: bool) -> Self {
        self.set("archived", json!(archived))
    }

    /// Lock or unlock the thread.
    pub fn locked(self, locked: bool) -> Self {
        self.set("locked", json!(locked))
    }

    /// The minutes of inactivity after which the thread is archived:
    /// 60, 1440, 4320 or 10080.
    pub fn auto_archive_duration(self, minutes: u64) -> Self {
        self.set("auto_archive_duration", json!(minutes))
    }

    /// Whether non-moderators can add other non-moderators to a private thread.
    pub fn invitable(self, invitable: bool) -> Self {
        self.set("invitable", json!(invitable))
    }

    /// The slowmode of the thread, in seconds.
    pub fn rate_limit_per_user(self, seconds: u64) -> Self {
        self.set("rate_limit_per_user", json!(seconds))
    }

    /// The tags of a forum post.
    pub fn applied_tags(self, tags: &[&str]) -> Self {
        self.set("applied_tags", json!(tags))
    }
}

request_builder! {
    /// Patch content for a guild emoji.
    EditGuildEmoji;
}
audit_reason!(EditGuildEmoji);

impl EditGuildEmoji {
    /// Rename the emoji.
    pub fn name(self, name: &str) -> Self {
        self.set("name", json!(name))
    }

    /// Restrict the emoji to members with one of the roles. An empty list
    /// lifts the restriction.
    pub fn roles(self, roles: &[RoleId]) -> Self {
        self.set("roles", json!(roles))
    }
}

request_builder! {
    /// Send content for the `send_message` call.
    SendMessage;
}

impl SendMessage {
    /// Set the text content of the message.
    pub fn content(self, content: &str) -> Self {
        self.set("content", json!(content))
    }

    /// Have the message read out loud.
    pub fn tts(self, tts: bool) -> Self {
        self.set("tts", json!(tts))
    }

    /// Add an embed to the message.
    pub fn embed(mut self, embed: Value) -> Self {
        push(&mut self.map, "embeds", embed);
        self
    }

    /// Add a component, usually an action row, to the message.
    pub fn component(mut self, component: impl ToJson) -> Self {
        push(&mut self.map, "components", component.to_json());
        self
    }

    /// Reply to a message in the same channel.
    pub fn reply(self, message: MessageId) -> Self {
        self.set("message_reference", json!({ "message_id": message }))
    }

    /// Set the message flags. Only some flags can be sent.
    pub fn flags(self, flags: MessageFlags) -> Self {
        self.set("flags", json!(flags.bits()))
    }

    /// Restrict who is pinged by the message.
    pub fn allowed_mentions(self, allowed_mentions: Value) -> Self {
        self.set("allowed_mentions", allowed_mentions)
    }

    /// Attach a poll to the message.
    pub fn poll(self, poll: Value) -> Self {
        self.set("poll", poll)
    }
}

request_builder! {
    /// Message content of an interaction response, follow-up or edit.
    InteractionReply;
}

impl InteractionReply {
    /// Set the text content of the message.
    pub fn content(self, content: &str) -> Self {
        self.set("content", json!(content))
    }

    /// Have the message read out loud.
    pub fn tts(self, tts: bool) -> Self {
        self.set("tts", json!(tts))
    }

    /// Add an embed to the message.
    pub fn embed(mut self, embed: Value) -> Self {
        push(&mut self.map, "embeds", embed);
        self
    }

    /// Add a component, usually an action row, to the message.
    pub fn component(mut self, component: impl ToJson) -> Self {
        push(&mut self.map, "components", component.to_json());
        self
    }

    /// Remove every component from the message.
    pub fn clear_components(self) -> Self {
        self.set("components", json!([]))
    }

    /// Restrict who is pinged by the message.
    pub fn allowed_mentions(self, allowed_mentions: Value) -> Self {
        self.set("allowed_mentions", allowed_mentions)
    }

    /// Set the message flags. Only some flags can be sent.
    pub fn flags(self, flags: MessageFlags) -> Self {
        self.set("flags", json!(flags.bits()))
    }

    /// Only show the message to the user who invoked the interaction.
    pub fn ephemeral(self, ephemeral: bool) -> Self {
        let mut flags = self.message_flags();
        flags.set(MessageFlags::EPHEMERAL, ephemeral);
        self.flags(flags)
    }

    /// The flags set on the message.
    pub fn message_flags(&self) -> MessageFlags {
        self.map
            .get("flags")
            .and_then(Value::as_u64)
            .map(MessageFlags::from_bits_truncate)
            .unwrap_or_default()
    }
}

fn push(map: &mut Object, key: &str, value: Value) {
    match map.entry(key).or_insert_with(|| json!([])) {
        Value::Array(items) => items.push(value),
        other => *other = json!([value]),
    }
}

// Components

/// Rename keys to `snake_case` and resolve emoji shorthand.
fn normalize(input: Value) -> Object {
    match resolve_emojis(snake_case_keys(input)) {
        Value::Object(map) => map,
        _ => Object::new(),
    }
}

fn resolve_emojis(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| match value {
                    Value::String(ref text) if key == "emoji" => {
                        let emoji = emoji_value(text);
                        (key, emoji)
                    }
                    Value::Object(emoji) if key == "emoji" => (key, partial_emoji(emoji)),
                    other => (key, resolve_emojis(other)),
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(resolve_emojis).collect()),
        other => other,
    }
}

/// Keep the `id`, `name` and `animated` keys of an emoji object, or `null`
/// when it has neither an ID nor a name.
fn partial_emoji(mut emoji: Object) -> Value {
    let given = |value: Option<&Value>| match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    };
    if !given(emoji.get("id")) && !given(emoji.get("name")) {
        return Value::Null;
    }

    let animated = match emoji.get("animated") {
        Some(Value::Bool(animated)) => *animated,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |n| n != 0.0),
        other => given(other),
    };
    let mut out = Object::new();
    for key in ["id", "name"] {
        if let Some(value) = emoji.remove(key) {
            out.insert(key.to_owned(), value);
        }
    }
    out.insert("animated".to_owned(), json!(animated));
    Value::Object(out)
}

fn emoji_value(text: &str) -> Value {
    Emoji::resolve(text)
        .and_then(|emoji| serde_json::to_value(emoji).ok())
        .unwrap_or(Value::Null)
}

macro_rules! component_builder {
    ($(#[$attr:meta])* $name:ident = $kind:expr;) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            data: Object,
        }

        impl $name {
            /// Create a builder from developer input.
            ///
            /// Keys may be written in `camelCase`, emojis as shorthand
            /// strings. Shorthand that cannot be parsed becomes `null`.
            pub fn new(input: Value) -> Self {
                let mut data = normalize(input);
                let kind: Option<ComponentType> = $kind;
                if let Some(kind) = kind {
                    data.entry("type").or_insert_with(|| json!(u64::from(kind)));
                }
                $name { data }
            }

            /// The payload built so far.
            pub fn data(&self) -> &Object {
                &self.data
            }

            fn set(mut self, key: &str, value: Value) -> Self {
                self.data.insert(key.to_owned(), value);
                self
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new(json!({}))
            }
        }

        /// Copy an existing payload, component or builder.
        impl<T: ToJson> From<&T> for $name {
            fn from(other: &T) -> Self {
                Self::new(other.to_json())
            }
        }

        impl ToJson for $name {
            fn to_json(&self) -> Value {
                Value::Object(self.data.clone())
            }
        }
    };
}

component_builder! {
    /// Builds a button.
    ButtonBuilder = Some(ComponentType::Button);
}

/// The look of a button.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ButtonStyle {
    Primary = 1,
    Secondary = 2,
    Success = 3,
    Danger = 4,
    Link = 5,
    Premium = 6,
}

impl ButtonBuilder {
    /// Set the style of the button.
    pub fn style(self, style: ButtonStyle) -> Self {
        self.set("style", json!(style as u8))
    }

    /// Set the developer-defined identifier of the button.
    pub fn custom_id(self, custom_id: &str) -> Self {
        self.set("custom_id", json!(custom_id))
    }

    /// Set the text on the button.
    pub fn label(self, label: &str) -> Self {
        self.set("label", json!(label))
    }

    /// Set the emoji on the button from its shorthand.
    pub fn emoji(self, emoji: &str) -> Self {
        self.set("emoji", emoji_value(emoji))
    }

    /// Set the URL a link button opens.
    pub fn url(self, url: &str) -> Self {
        self.set("url", json!(url))
    }

    /// Disable the button.
    pub fn disabled(self, disabled: bool) -> Self {
        self.set("disabled", json!(disabled))
    }
}

component_builder! {
    /// Builds a select menu of any kind, a string select by default.
    SelectMenuBuilder = Some(ComponentType::StringSelect);
}

impl SelectMenuBuilder {
    /// Set what the menu selects: strings, users, roles, mentionables or
    /// channels.
    pub fn kind(self, kind: ComponentType) -> Self {
        self.set("type", json!(u64::from(kind)))
    }

    /// Set the developer-defined identifier of the menu.
    pub fn custom_id(self, custom_id: &str) -> Self {
        self.set("custom_id", json!(custom_id))
    }

    /// Set the text shown while nothing is selected.
    pub fn placeholder(self, placeholder: &str) -> Self {
        self.set("placeholder", json!(placeholder))
    }

    /// Set how many items must at least be selected.
    pub fn min_values(self, min: u64) -> Self {
        self.set("min_values", json!(min))
    }

    /// Set how many items may at most be selected.
    pub fn max_values(self, max: u64) -> Self {
        self.set("max_values", json!(max))
    }

    /// Add an option to a string select.
    pub fn option(mut self, option: SelectMenuOptionBuilder) -> Self {
        push(&mut self.data, "options", option.to_json());
        self
    }

    /// Restrict the channels of a channel select to some types.
    pub fn channel_types(self, types: &[ChannelType]) -> Self {
        self.set("channel_types", json!(types))
    }

    /// Disable the menu.
    pub fn disabled(self, disabled: bool) -> Self {
        self.set("disabled", json!(disabled))
    }
}

component_builder! {
    /// Builds an option of a string select.
    SelectMenuOptionBuilder = None;
}

impl SelectMenuOptionBuilder {
    /// Set the text shown for the option.
    pub fn label(self, label: &str) -> Self {
        self.set("label", json!(label))
    }

    /// Set the value submitted when the option is selected.
    pub fn value(self, value: &str) -> Self {
        self.set("value", json!(value))
    }

    /// Set the text shown below the label.
    pub fn description(self, description: &str) -> Self {
        self.set("description", json!(description))
    }

    /// Set the emoji of the option from its shorthand.
    pub fn emoji(self, emoji: &str) -> Self {
        self.set("emoji", emoji_value(emoji))
    }

    /// Select the option by default.
    pub fn selected(self, selected: bool) -> Self {
        self.set("default", json!(selected))
    }
}

component_builder! {
    /// Builds a text input of a modal.
    TextInputBuilder = Some(ComponentType::TextInput);
}

/// The size of a text input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextInputStyle {
    /// A single line.
    Short = 1,
    /// Multiple lines.
    Paragraph = 2,
}

impl TextInputBuilder {
    /// Set the developer-defined identifier of the input.
    pub fn custom_id(self, custom_id: &str) -> Self {
        self.set("custom_id", json!(custom_id))
    }

    /// Set the size of the input.
    pub fn style(self, style: TextInputStyle) -> Self {
        self.set("style", json!(style as u8))
    }

    /// Set the label of the input.
    pub fn label(self, label: &str) -> Self {
        self.set("label", json!(label))
    }

    /// Set the minimum length of the input.
    pub fn min_length(self, min: u64) -> Self {
        self.set("min_length", json!(min))
    }

    /// Set the maximum length of the input.
    pub fn max_length(self, max: u64) -> Self {
        self.set("max_length", json!(max))
    }

    /// Set whether the input must be filled in.
    pub fn required(self, required: bool) -> Self {
        self.set("required", json!(required))
    }

    /// Pre-fill the input.
    pub fn value(self, value: &str) -> Self {
        self.set("value", json!(value))
    }

    /// Set the text shown while the input is empty.
    pub fn placeholder(self, placeholder: &str) -> Self {
        self.set("placeholder", json!(placeholder))
    }
}

component_builder! {
    /// Builds an action row.
    ActionRowBuilder = Some(ComponentType::ActionRow);
}

impl ActionRowBuilder {
    /// Add a component to the row.
    pub fn component(mut self, component: impl ToJson) -> Self {
        push(&mut self.data, "components", component.to_json());
        self
    }
}

component_builder! {
    /// Builds a container.
    ContainerBuilder = Some(ComponentType::Container);
}

impl ContainerBuilder {
    /// Add a component to the container.
    pub fn component(mut self, component: impl ToJson) -> Self {
        push(&mut self.data, "components", component.to_json());
        self
    }

    /// Set the color of the bar on the left, or remove it with `None`.
    pub fn accent_color(self, color: Option<u32>) -> Self {
        self.set("accent_color", json!(color))
    }

    /// Blur the contents of the container.
    pub fn spoiler(self, spoiler: bool) -> Self {
        self.set("spoiler", json!(spoiler))
    }
}

component_builder! {
    /// Builds a text display.
    TextDisplayBuilder = Some(ComponentType::TextDisplay);
}

impl TextDisplayBuilder {
    /// Set the markdown content of the text display.
    pub fn content(self, content: &str) -> Self {
        self.set("content", json!(content))
    }
}

component_builder! {
    /// Builds a modal.
    ModalBuilder = None;
}

impl ModalBuilder {
    /// Set the developer-defined identifier of the modal.
    pub fn custom_id(self, custom_id: &str) -> Self {
        self.set("custom_id", json!(custom_id))
    }

    /// Set the title of the modal.
    pub fn title(self, title: &str) -> Self {
        self.set("title", json!(title))
    }

    /// Add a component, a label or an action row, to the modal.
    pub fn component(mut self, component: impl ToJson) -> Self {
        push(&mut self.data, "components", component.to_json());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Component;
    use reqwest::Method;

    #[test]
    fn camel_case_input() {
        let button = ButtonBuilder::new(json!({
            "customId": "confirm",
            "label": "Confirm",
            "style": 3,
            "emoji": "<a:party:123456789012345678>",
        }));

        assert_eq!(
            button.to_json(),
            json!({
                "type": 2,
                "custom_id": "confirm",
                "label": "Confirm",
                "style": 3,
                "emoji": { "id": "123456789012345678", "name": "party", "animated": true },
            })
        );
    }

    #[test]
    fn emoji_objects_are_trimmed() {
        let button = ButtonBuilder::new(json!({
            "customId": "a",
            "emoji": { "name": "party", "extra": 1 },
        }));
        assert_eq!(button.data()["emoji"], json!({ "name": "party", "animated": false }));

        let empty = ButtonBuilder::new(json!({ "customId": "b", "emoji": { "id": null, "name": "" } }));
        assert_eq!(empty.data()["emoji"], Value::Null);
    }

    #[test]
    fn options_can_be_preselected() {
        let option = SelectMenuOptionBuilder::default().label("A").value("a").selected(true);
        assert_eq!(option.data()["default"], json!(true));
        assert_eq!(option.to_json()["value"], json!("a"));
    }

    #[test]
    fn broken_emoji_shorthand_becomes_null() {
        let option = SelectMenuOptionBuilder::default().label("Nope").emoji(":");
        assert_eq!(option.data()["emoji"], Value::Null);

        let raw = SelectMenuBuilder::new(json!({
            "customId": "pick",
            "options": [{ "label": "Fire", "value": "fire", "emoji": "🔥" }],
        }));
        assert_eq!(
            raw.data()["options"][0]["emoji"],
            json!({ "name": "🔥", "animated": false })
        );
    }

    #[test]
    fn builders_from_components() {
        let payload = json!({
            "type": 1,
            "components": [{ "type": 2, "style": 1, "custom_id": "a", "label": "Go" }],
        });
        let row = Component::from_value(payload.clone()).unwrap();

        let from_component = ActionRowBuilder::from(&row);
        let from_raw = ActionRowBuilder::from(&payload);
        let from_builder = ActionRowBuilder::from(&from_raw);
        assert_eq!(from_component, from_raw);
        assert_eq!(from_builder.to_json(), payload);
        assert!(row.equals(&from_builder));
    }

    #[test]
    fn chained_component_tree() {
        let modal = ModalBuilder::default()
            .custom_id("feedback")
            .title("Feedback")
            .component(
                ActionRowBuilder::default().component(
                    TextInputBuilder::default()
                        .custom_id("text")
                        .label("What do you think?")
                        .style(TextInputStyle::Paragraph)
                        .required(false),
                ),
            );

        assert_eq!(
            modal.to_json(),
            json!({
                "custom_id": "feedback",
                "title": "Feedback",
                "components": [{
                    "type": 1,
                    "components": [{
                        "type": 4,
                        "custom_id": "text",
                        "label": "What do you think?",
                        "style": 2,
                        "required": false,
                    }],
                }],
            })
        );

        let container = ContainerBuilder::new(json!({ "accentColor": 0x5865f2 }))
            .component(TextDisplayBuilder::default().content("# Hello"));
        let parsed = Component::from_value(container.to_json()).unwrap();
        assert_eq!(parsed.kind(), ComponentType::Container);
        assert_eq!(parsed.children().len(), 1);
    }

    #[test]
    fn request_builders_carry_reasons() {
        let request = EditThread::build(|t| t.archived(true).reason("résolu"))
            .into_request(RestRequest::patch("/channels/1"));
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.body, Some(json!({ "archived": true })));
        assert_eq!(request.reason.as_deref(), Some("résolu"));

        let mut current = Object::new();
        current.insert("name".to_owned(), json!("bugs"));
        let edit = EditThread::apply(|t| t.locked(true).invitable(false), current).unset("invitable");
        assert_eq!(edit.to_json(), json!({ "name": "bugs", "locked": true }));
    }

    #[test]
    fn ephemeral_replies() {
        let reply = InteractionReply::build(|r| r.content("psst").ephemeral(true));
        assert!(reply.message_flags().contains(MessageFlags::EPHEMERAL));
        assert_eq!(reply.body()["flags"], json!(64));

        let reply = InteractionReply::build(|r| r.ephemeral(true).ephemeral(false));
        assert!(reply.message_flags().is_empty());
    }
}
