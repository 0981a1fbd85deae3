//! Interactions with message components.

use serde::Deserialize;

use super::{Interaction, InteractionData, ResolvedData};
use crate::model::{
    AnyChannel, ChannelId, Component, ComponentType, Context, Member, Role, RoleId, User, UserId,
};
use crate::Result;

/// The `data` of a message component interaction.
///
/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object-message-component-data-structure
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct MessageComponentData {
    pub custom_id: String,
    pub component_type: ComponentType,
    #[serde(default)]
    pub values: Option<Vec<String>>,
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
}

/// Find the component with the given custom ID in the message an interaction
/// came from.
fn message_component<'a>(interaction: &'a Interaction, custom_id: &str) -> Option<&'a Component> {
    interaction
        .message
        .as_ref()
        .and_then(|message| message.component(custom_id))
}

/// A button being pressed.
#[derive(Debug, Clone)]
pub struct ButtonInteraction {
    /// The shared interaction fields.
    pub interaction: Interaction,
    /// The custom ID of the button.
    pub custom_id: String,
    /// The type of the component, always a button.
    pub component_type: ComponentType,
}

impl ButtonInteraction {
    /// Build the interaction from its payload.
    pub fn from_data(ctx: &Context, data: &InteractionData) -> Result<Self> {
        let component: MessageComponentData = data.decode()?;
        Ok(ButtonInteraction {
            interaction: Interaction::new(ctx, data),
            custom_id: component.custom_id,
            component_type: component.component_type,
        })
    }

    /// The button in the message it is attached to.
    pub fn component(&self) -> Option<&Component> {
        message_component(&self.interaction, &self.custom_id)
    }
}

/// A selection being made in a select menu.
///
/// The selected entities are resolved in the order they were selected, and
/// only for the select kinds that can pick them: users and members for user
/// and mentionable selects, roles for role and mentionable selects and
/// channels for channel selects.
#[derive(Debug, Clone)]
pub struct SelectMenuInteraction {
    /// The shared interaction fields.
    pub interaction: Interaction,
    /// The custom ID of the select menu.
    pub custom_id: String,
    /// The kind of select menu.
    pub component_type: ComponentType,
    /// The selected values; IDs for entity selects.
    pub values: Vec<String>,
    /// The selected users.
    pub users: Vec<User>,
    /// The selected users that are members of the guild.
    pub members: Vec<Member>,
    /// The selected roles.
    pub roles: Vec<Role>,
    /// The selected channels.
    pub channels: Vec<AnyChannel>,
}

impl SelectMenuInteraction {
    /// Build the interaction from its payload.
    pub fn from_data(ctx: &Context, data: &InteractionData) -> Result<Self> {
        let component: MessageComponentData = data.decode()?;
        let values = component.values.unwrap_or_default();
        let mut menu = SelectMenuInteraction {
            interaction: Interaction::new(ctx, data),
            custom_id: component.custom_id,
            component_type: component.component_type,
            values,
            users: Vec::new(),
            members: Vec::new(),
            roles: Vec::new(),
            channels: Vec::new(),
        };

        let resolved = match component.resolved {
            Some(ref resolved) => resolved,
            None => return Ok(menu),
        };
        let ids: Vec<u64> = menu.values.iter().filter_map(|value| value.parse().ok()).collect();
        let kind = menu.component_type;

        if matches!(kind, ComponentType::UserSelect | ComponentType::MentionableSelect) {
            for &id in &ids {
                if let Some(user) = resolved.users.get(&UserId(id)) {
                    menu.users.push(user.clone());
                }
                if let Some(member) = resolved.member(UserId(id), data.guild_id) {
                    menu.members.push(member);
                }
            }
        }
        if matches!(kind, ComponentType::RoleSelect | ComponentType::MentionableSelect) {
            menu.roles = ids
                .iter()
                .filter_map(|&id| resolved.roles.get(&RoleId(id)).cloned())
                .collect();
        }
        if kind == ComponentType::ChannelSelect {
            menu.channels = ids
                .iter()
                .filter_map(|&id| resolved.channel(ctx, ChannelId(id)))
                .collect();
        }
        Ok(menu)
    }

    /// The select menu in the message it is attached to.
    pub fn component(&self) -> Option<&Component> {
        message_component(&self.interaction, &self.custom_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Channel, ChannelType};
    use crate::rest::RestRequest;
    use crate::{Error, Rest};
    use futures::future::BoxFuture;
    use serde_json::{json, Value};

    #[derive(Debug)]
    struct Offline;

    impl Rest for Offline {
        fn request(&self, _: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    fn payload(data: Value) -> InteractionData {
        serde_json::from_value(json!({
            "id": "1",
            "application_id": "2",
            "type": 3,
            "guild_id": "3",
            "token": "t",
            "data": data,
            "message": {
                "id": "4",
                "channel_id": "5",
                "content": "",
                "components": [{
                    "type": 1,
                    "components": [
                        { "type": 2, "style": 1, "custom_id": "ok", "label": "OK" },
                        { "type": 7, "custom_id": "who" },
                    ],
                }],
            },
        }))
        .unwrap()
    }

    #[test]
    fn button_finds_its_component() {
        let ctx = Context::new(Offline);
        let button = ButtonInteraction::from_data(
            &ctx,
            &payload(json!({ "custom_id": "ok", "component_type": 2 })),
        )
        .unwrap();

        assert_eq!(button.component_type, ComponentType::Button);
        let component = button.component().unwrap();
        assert_eq!(component.kind(), ComponentType::Button);
        assert_eq!(component.data()["label"], json!("OK"));
    }

    #[test]
    fn mentionable_selection() {
        let ctx = Context::new(Offline);
        let menu = SelectMenuInteraction::from_data(
            &ctx,
            &payload(json!({
                "custom_id": "who",
                "component_type": 7,
                "values": ["80351110224678912", "41771983423143936"],
                "resolved": {
                    "users": {
                        "80351110224678912": { "id": "80351110224678912", "username": "Nelly" },
                    },
                    "members": {
                        "80351110224678912": { "nick": "nel", "roles": [] },
                    },
                    "roles": {
                        "41771983423143936": { "id": "41771983423143936", "name": "mods", "permissions": "0" },
                    },
                    "channels": {
                        "41771983423143937": { "id": "41771983423143937", "type": 0, "name": "general" },
                    },
                },
            })),
        )
        .unwrap();

        assert_eq!(menu.values.len(), 2);
        assert_eq!(menu.users.len(), 1);
        assert_eq!(menu.members[0].user.as_ref().map(|u| u.id), Some(UserId(80351110224678912)));
        assert_eq!(menu.roles[0].name, "mods");
        // channels are only resolved for channel selects
        assert!(menu.channels.is_empty());
        assert_eq!(menu.component().map(Component::kind), Some(ComponentType::MentionableSelect));
    }

    #[test]
    fn channel_selection() {
        let ctx = Context::new(Offline);
        let menu = SelectMenuInteraction::from_data(
            &ctx,
            &payload(json!({
                "custom_id": "where",
                "component_type": 8,
                "values": ["41771983423143937"],
                "resolved": {
                    "channels": {
                        "41771983423143937": { "id": "41771983423143937", "type": 0, "name": "general" },
                    },
                },
            })),
        )
        .unwrap();

        assert_eq!(menu.channels.len(), 1);
        assert_eq!(menu.channels[0].kind(), ChannelType::GuildText);
        assert!(ctx.cache().channels.contains(&ChannelId(41771983423143937)));
        assert!(menu.users.is_empty());
        assert!(menu.component().is_none());
    }
}
