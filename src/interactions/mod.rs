//! Incoming interactions: slash commands, context menus, autocompletion,
//! message components and modal submissions.
//!
//! An interaction payload is decoded with [`AnyInteraction::from_value`],
//! which picks the structure matching its type. Every structure owns an
//! [`Interaction`] with the fields all interactions share and the state of
//! its initial response; responding goes through the
//! [`InteractionResponses`], [`ComponentResponses`] and [`ModalResponses`]
//! traits.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::model::{
    AnyChannel, ApplicationId, ChannelData, ChannelId, Context, Entity, Guild, GuildId,
    InteractionId, Member, Message, MessageData, Permissions, User,
};
use crate::{Error, Result};

mod options;
pub use self::options::*;

mod responses;
pub use self::responses::*;

mod command;
pub use self::command::*;

mod autocomplete;
pub use self::autocomplete::*;

mod component;
pub use self::component::*;

mod modal;
pub use self::modal::*;

/// The type of an interaction.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InteractionType {
    /// A ping sent to verify an interactions endpoint.
    Ping,
    /// An application command was used.
    ApplicationCommand,
    /// A message component was used.
    MessageComponent,
    /// A command option is being filled in.
    ApplicationCommandAutocomplete,
    /// A modal was submitted.
    ModalSubmit,
    /// An interaction type this crate does not know about.
    Unknown(u8),
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => InteractionType::Ping,
            2 => InteractionType::ApplicationCommand,
            3 => InteractionType::MessageComponent,
            4 => InteractionType::ApplicationCommandAutocomplete,
            5 => InteractionType::ModalSubmit,
            other => InteractionType::Unknown(other),
        }
    }
}

impl From<InteractionType> for u8 {
    fn from(kind: InteractionType) -> u8 {
        match kind {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::ApplicationCommandAutocomplete => 4,
            InteractionType::ModalSubmit => 5,
            InteractionType::Unknown(other) => other,
        }
    }
}

/// The raw payload of an interaction.
///
/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct InteractionData {
    pub id: InteractionId,
    pub application_id: ApplicationId,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    /// The type specific data, decoded by the interaction structures.
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub channel: Option<ChannelData>,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
    pub token: String,
    #[serde(default)]
    pub message: Option<MessageData>,
    #[serde(default)]
    pub app_permissions: Option<Permissions>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub guild_locale: Option<String>,
}

impl InteractionData {
    /// Decode the type specific data.
    pub(crate) fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        match self.data {
            Some(ref data) => Ok(serde_json::from_value(data.clone())?),
            None => Err(Error::Decode("Interaction without data", Value::Null)),
        }
    }
}

/// The fields every interaction shares, and the state of its response.
#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    #[serde(skip)]
    pub(crate) ctx: Context,
    /// The ID of the interaction.
    pub id: InteractionId,
    /// The application the interaction is for.
    pub application_id: ApplicationId,
    /// The type of the interaction.
    pub kind: InteractionType,
    #[serde(skip)]
    pub(crate) token: String,
    /// The guild the interaction was sent from.
    pub guild_id: Option<GuildId>,
    /// The channel the interaction was sent from.
    pub channel_id: Option<ChannelId>,
    #[serde(skip)]
    channel: Option<AnyChannel>,
    /// The user who invoked the interaction.
    pub user: Option<User>,
    /// The guild member who invoked the interaction, for interactions in guilds.
    pub member: Option<Member>,
    /// The locale of the invoking user.
    pub locale: Option<String>,
    /// The preferred locale of the guild.
    pub guild_locale: Option<String>,
    /// The permissions of the application in the channel.
    pub app_permissions: Permissions,
    /// The message a component was attached to.
    #[serde(skip)]
    pub message: Option<Message>,
    /// Whether the reply was deferred.
    pub deferred: bool,
    /// Whether an initial response was sent.
    pub replied: bool,
    /// Whether the reply is only visible to the invoking user, once known.
    pub ephemeral: Option<bool>,
}

impl Interaction {
    /// Build the shared fields from an interaction payload.
    ///
    /// The invoking user is added to the cache.
    pub fn new(ctx: &Context, data: &InteractionData) -> Interaction {
        let user = data
            .user
            .clone()
            .or_else(|| data.member.as_ref().and_then(|member| member.user.clone()));
        if let Some(ref user) = user {
            ctx.cache().users.insert(user.id, user.clone());
        }

        let member = data.member.clone().map(|mut member| {
            member.guild_id = member.guild_id.or(data.guild_id);
            if member.user.is_none() {
                member.user = user.clone();
            }
            member
        });

        let channel = data
            .channel
            .as_ref()
            .map(|channel| AnyChannel::from_data(ctx, channel));

        Interaction {
            ctx: ctx.clone(),
            id: data.id,
            application_id: data.application_id,
            kind: data.kind,
            token: data.token.clone(),
            guild_id: data.guild_id,
            channel_id: data
                .channel
                .as_ref()
                .map(|channel| channel.id)
                .or(data.channel_id),
            channel,
            user,
            member,
            locale: data.locale.clone(),
            guild_locale: data.guild_locale.clone(),
            app_permissions: data.app_permissions.unwrap_or_default(),
            message: data
                .message
                .as_ref()
                .map(|message| Message::from_data(ctx, message)),
            deferred: false,
            replied: false,
            ephemeral: None,
        }
    }

    /// The context the interaction was created with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The token used to respond to the interaction, valid for 15 minutes.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// When the interaction was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// The channel the interaction was sent from, from the payload or the
    /// cache.
    pub fn channel(&self) -> Option<AnyChannel> {
        self.channel.clone().or_else(|| {
            self.channel_id
                .and_then(|id| self.ctx.cache().channels.get(&id))
        })
    }

    /// The guild the interaction was sent from, if it is cached.
    pub fn guild(&self) -> Option<Guild> {
        self.guild_id
            .and_then(|id| self.ctx.cache().guilds.get(&id))
    }

    /// Whether the interaction was sent from a guild.
    pub fn in_guild(&self) -> bool {
        self.guild_id.is_some() && self.member.is_some()
    }

    /// Whether the interaction can be replied to with a message.
    pub fn is_repliable(&self) -> bool {
        !matches!(
            self.kind,
            InteractionType::Ping | InteractionType::ApplicationCommandAutocomplete
        )
    }
}

/// Any interaction, by type.
#[derive(Debug, Clone)]
pub enum AnyInteraction {
    /// A ping.
    Ping(Interaction),
    /// A slash command.
    ChatInput(ChatInputCommandInteraction),
    /// A user or message context menu command.
    ContextMenu(ContextMenuCommandInteraction),
    /// An autocompletion request.
    Autocomplete(AutocompleteInteraction),
    /// A button press.
    Button(ButtonInteraction),
    /// A select menu selection.
    SelectMenu(SelectMenuInteraction),
    /// A modal submission.
    ModalSubmit(ModalSubmitInteraction),
    /// An interaction of a type this crate does not know about.
    Unknown(Interaction),
}

/// The command and component type discriminants nested in `data`.
#[derive(Deserialize)]
struct Discriminants {
    #[serde(default, rename = "type")]
    command_type: Option<u8>,
    #[serde(default)]
    component_type: Option<u64>,
}

impl AnyInteraction {
    /// Decode an interaction payload.
    pub fn from_value(ctx: &Context, value: Value) -> Result<AnyInteraction> {
        let data: InteractionData = serde_json::from_value(value)?;
        AnyInteraction::from_data(ctx, &data)
    }

    /// Build the structure matching the type of an interaction payload.
    pub fn from_data(ctx: &Context, data: &InteractionData) -> Result<AnyInteraction> {
        let discriminants: Option<Discriminants> = match data.kind {
            InteractionType::ApplicationCommand | InteractionType::MessageComponent => {
                Some(data.decode()?)
            }
            _ => None,
        };
        let command_type = discriminants
            .as_ref()
            .and_then(|d| d.command_type)
            .map(CommandType::from);
        let component_type = discriminants
            .as_ref()
            .and_then(|d| d.component_type)
            .map(crate::model::ComponentType::from);

        Ok(match (data.kind, command_type, component_type) {
            (InteractionType::Ping, _, _) => AnyInteraction::Ping(Interaction::new(ctx, data)),
            (InteractionType::ApplicationCommand, Some(CommandType::ChatInput), _) => {
                AnyInteraction::ChatInput(ChatInputCommandInteraction::from_data(ctx, data)?)
            }
            (InteractionType::ApplicationCommand, Some(CommandType::User), _)
            | (InteractionType::ApplicationCommand, Some(CommandType::Message), _) => {
                AnyInteraction::ContextMenu(ContextMenuCommandInteraction::from_data(ctx, data)?)
            }
            (InteractionType::ApplicationCommandAutocomplete, _, _) => {
                AnyInteraction::Autocomplete(AutocompleteInteraction::from_data(ctx, data)?)
            }
            (InteractionType::MessageComponent, _, Some(kind)) if kind.is_select_menu() => {
                AnyInteraction::SelectMenu(SelectMenuInteraction::from_data(ctx, data)?)
            }
            (InteractionType::MessageComponent, _, Some(crate::model::ComponentType::Button)) => {
                AnyInteraction::Button(ButtonInteraction::from_data(ctx, data)?)
            }
            (InteractionType::ModalSubmit, _, _) => {
                AnyInteraction::ModalSubmit(ModalSubmitInteraction::from_data(ctx, data)?)
            }
            (kind, command_type, component_type) => {
                warn!(
                    "Unknown interaction {:?} (command type {:?}, component type {:?})",
                    kind, command_type, component_type
                );
                AnyInteraction::Unknown(Interaction::new(ctx, data))
            }
        })
    }

    /// The fields every interaction shares.
    pub fn interaction(&self) -> &Interaction {
        match self {
            AnyInteraction::Ping(interaction) | AnyInteraction::Unknown(interaction) => interaction,
            AnyInteraction::ChatInput(command) => &command.interaction,
            AnyInteraction::ContextMenu(command) => &command.interaction,
            AnyInteraction::Autocomplete(autocomplete) => &autocomplete.interaction,
            AnyInteraction::Button(button) => &button.interaction,
            AnyInteraction::SelectMenu(menu) => &menu.interaction,
            AnyInteraction::ModalSubmit(modal) => &modal.interaction,
        }
    }

    /// The type of the interaction.
    pub fn kind(&self) -> InteractionType {
        self.interaction().kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::RestRequest;
    use crate::{ErrorKind, Rest};
    use futures::future::BoxFuture;
    use serde_json::json;

    #[derive(Debug)]
    struct Offline;

    impl Rest for Offline {
        fn request(&self, _: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    fn base(kind: u8, data: Value) -> Value {
        json!({
            "id": "1197361004581261344",
            "application_id": "1097541239145476096",
            "type": kind,
            "data": data,
            "guild_id": "613425648685547541",
            "channel": { "id": "613425648685547543", "type": 0, "name": "general" },
            "member": {
                "user": { "id": "53908232506183680", "username": "mason", "discriminator": "0" },
                "roles": [],
                "nick": "Mace",
                "permissions": "2147483647",
            },
            "token": "aW50ZXJhY3Rpb246",
            "app_permissions": "442368",
            "locale": "en-US",
            "guild_locale": "en-US",
        })
    }

    #[test]
    fn shared_fields() {
        let ctx = Context::new(Offline);
        let value = base(2, json!({ "id": "1", "name": "ping", "type": 1 }));
        let any = AnyInteraction::from_value(&ctx, value).unwrap();
        let interaction = any.interaction();

        assert!(matches!(any, AnyInteraction::ChatInput(_)));
        assert_eq!(interaction.kind, InteractionType::ApplicationCommand);
        assert_eq!(interaction.token(), "aW50ZXJhY3Rpb246");
        assert_eq!(interaction.channel_id, Some(ChannelId(613425648685547543)));
        assert_eq!(
            interaction.user.as_ref().map(|u| u.id),
            interaction.member.as_ref().and_then(Member::id)
        );
        assert_eq!(
            interaction.member.as_ref().and_then(|m| m.guild_id),
            Some(GuildId(613425648685547541))
        );
        assert!(interaction.in_guild());
        assert!(interaction.is_repliable());
        assert!(!interaction.deferred && !interaction.replied);
        assert!(ctx.cache().users.contains(&crate::model::UserId(53908232506183680)));
        assert_eq!(interaction.created_at(), interaction.id.created_at());
        assert!(interaction.channel().is_some());
    }

    #[test]
    fn dispatch_by_type() {
        let ctx = Context::new(Offline);
        let decode = |kind: u8, data: Value| AnyInteraction::from_value(&ctx, base(kind, data)).unwrap();

        assert!(matches!(decode(1, Value::Null), AnyInteraction::Ping(_)));
        assert!(matches!(
            decode(2, json!({ "id": "1", "name": "Report", "type": 3, "target_id": "5", "resolved": {} })),
            AnyInteraction::ContextMenu(_)
        ));
        assert!(matches!(
            decode(4, json!({ "id": "1", "name": "tag", "type": 1, "options": [] })),
            AnyInteraction::Autocomplete(_)
        ));
        assert!(matches!(
            decode(3, json!({ "custom_id": "ok", "component_type": 2 })),
            AnyInteraction::Button(_)
        ));
        assert!(matches!(
            decode(3, json!({ "custom_id": "pick", "component_type": 3, "values": ["a"] })),
            AnyInteraction::SelectMenu(_)
        ));
        assert!(matches!(
            decode(5, json!({ "custom_id": "form", "components": [] })),
            AnyInteraction::ModalSubmit(_)
        ));

        let unknown = decode(42, json!({}));
        assert!(matches!(unknown, AnyInteraction::Unknown(_)));
        assert_eq!(unknown.kind(), InteractionType::Unknown(42));
    }

    #[test]
    fn missing_data_is_a_decode_error() {
        let ctx = Context::new(Offline);
        let mut value = base(2, Value::Null);
        value.as_object_mut().unwrap().remove("data");
        let err = AnyInteraction::from_value(&ctx, value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
