//! Modal submissions.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::{Interaction, InteractionData, ResolvedData};
use crate::model::{
    AnyChannel, Attachment, AttachmentId, Channel, ChannelId, ChannelType, Component, ComponentType,
    Context, GuildId, Member, Role, RoleId, User, UserId,
};
use crate::{Error, Result};

/// The `data` of a modal submit interaction.
///
/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object-modal-submit-data-structure
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct ModalSubmitData {
    pub custom_id: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
}

/// A submitted modal field with the entities it selected.
///
/// Entity lists are `None` when nothing of that kind was selected.
#[derive(Debug, Clone)]
pub struct ModalField {
    /// The component type of the field.
    pub kind: ComponentType,
    /// The custom ID of the field.
    pub custom_id: String,
    /// The text of a text input.
    pub value: Option<String>,
    /// The selected values of a select menu, or the IDs of uploaded files.
    pub values: Option<Vec<String>>,
    /// The selected users.
    pub users: Option<Vec<User>>,
    /// The selected users that are members of the guild.
    pub members: Option<Vec<Member>>,
    /// The selected roles.
    pub roles: Option<Vec<Role>>,
    /// The selected channels.
    pub channels: Option<Vec<AnyChannel>>,
    /// The uploaded files.
    pub attachments: Option<Vec<Attachment>>,
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

impl ModalField {
    fn new(
        ctx: &Context,
        component: &Component,
        resolved: Option<&ResolvedData>,
        guild_id: Option<GuildId>,
    ) -> Option<ModalField> {
        let data = component.data();
        let custom_id = data.get("custom_id").and_then(Value::as_str)?.to_owned();
        let values: Option<Vec<String>> = data.get("values").and_then(Value::as_array).map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        });

        let mut field = ModalField {
            kind: component.kind(),
            custom_id,
            value: data.get("value").and_then(Value::as_str).map(str::to_owned),
            values,
            users: None,
            members: None,
            roles: None,
            channels: None,
            attachments: None,
        };

        let resolved = match resolved {
            Some(resolved) => resolved,
            None => return Some(field),
        };
        let ids: Vec<u64> = field
            .values
            .iter()
            .flatten()
            .filter_map(|value| value.parse().ok())
            .collect();

        if matches!(field.kind, ComponentType::UserSelect | ComponentType::MentionableSelect) {
            field.users = non_empty(
                ids.iter()
                    .filter_map(|&id| resolved.users.get(&UserId(id)).cloned())
                    .collect(),
            );
            field.members = non_empty(
                ids.iter()
                    .filter_map(|&id| resolved.member(UserId(id), guild_id))
                    .collect(),
            );
        }
        if matches!(field.kind, ComponentType::RoleSelect | ComponentType::MentionableSelect) {
            field.roles = non_empty(
                ids.iter()
                    .filter_map(|&id| resolved.roles.get(&RoleId(id)).cloned())
                    .collect(),
            );
        }
        match field.kind {
            ComponentType::ChannelSelect => {
                field.channels = non_empty(
                    ids.iter()
                        .filter_map(|&id| resolved.channel(ctx, ChannelId(id)))
                        .collect(),
                );
            }
            ComponentType::FileUpload => {
                field.attachments = non_empty(
                    ids.iter()
                        .filter_map(|&id| resolved.attachments.get(&AttachmentId(id)).cloned())
                        .collect(),
                );
            }
            _ => {}
        }
        Some(field)
    }

    fn has(&self, property: FieldProperty) -> bool {
        match property {
            FieldProperty::Value => self.value.is_some(),
            FieldProperty::Values => self.values.is_some(),
            FieldProperty::Users => self.users.is_some(),
            FieldProperty::Members => self.members.is_some(),
            FieldProperty::Roles => self.roles.is_some(),
            FieldProperty::Channels => self.channels.is_some(),
            FieldProperty::Attachments => self.attachments.is_some(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FieldProperty {
    Value,
    Values,
    Users,
    Members,
    Roles,
    Channels,
    Attachments,
}

/// The entities picked in a mentionable select.
#[derive(Debug, Clone, Copy)]
pub struct SelectedMentionables<'a> {
    /// The selected users.
    pub users: &'a [User],
    /// The selected users that are members of the guild.
    pub members: &'a [Member],
    /// The selected roles.
    pub roles: &'a [Role],
}

/// Typed getters over the fields of a submitted modal.
///
/// Fields are collected from action rows and labels and looked up by custom
/// ID. Getters check that the field exists, then its component type, then
/// (if `required`) that it selected something.
#[derive(Debug, Clone, Default)]
pub struct ModalSubmitFields {
    fields: HashMap<String, ModalField>,
}

impl ModalSubmitFields {
    /// Collect the fields of the top level components of a modal.
    pub fn new(
        ctx: &Context,
        components: &[Component],
        resolved: Option<&ResolvedData>,
        guild_id: Option<GuildId>,
    ) -> Self {
        let fields = components
            .iter()
            .filter(|top| matches!(top.kind(), ComponentType::ActionRow | ComponentType::Label))
            .flat_map(|top| top.children())
            .filter_map(|component| ModalField::new(ctx, component, resolved, guild_id))
            .map(|field| (field.custom_id.clone(), field))
            .collect();
        ModalSubmitFields { fields }
    }

    /// The fields by custom ID.
    pub fn fields(&self) -> &HashMap<String, ModalField> {
        &self.fields
    }

    /// Look up a field, checking its type if one is given.
    pub fn get_field(&self, custom_id: &str, kind: Option<ComponentType>) -> Result<&ModalField> {
        let field = self
            .fields
            .get(custom_id)
            .ok_or_else(|| Error::ModalFieldNotFound(custom_id.to_owned()))?;
        match kind {
            Some(kind) if field.kind != kind => Err(Error::ModalFieldType {
                custom_id: custom_id.to_owned(),
                found: field.kind,
                expected: vec![kind],
            }),
            _ => Ok(field),
        }
    }

    fn typed_field(
        &self,
        custom_id: &str,
        types: &[ComponentType],
        properties: &[FieldProperty],
        required: bool,
    ) -> Result<&ModalField> {
        let field = self.get_field(custom_id, None)?;
        if !types.contains(&field.kind) {
            return Err(Error::ModalFieldType {
                custom_id: custom_id.to_owned(),
                found: field.kind,
                expected: types.to_vec(),
            });
        }
        if required && properties.iter().all(|&property| !field.has(property)) {
            return Err(Error::ModalFieldEmpty {
                custom_id: custom_id.to_owned(),
                kind: field.kind,
            });
        }
        Ok(field)
    }

    /// The text entered in a text input.
    pub fn get_text_input_value(&self, custom_id: &str) -> Result<&str> {
        let field = self.typed_field(custom_id, &[ComponentType::TextInput], &[FieldProperty::Value], false)?;
        Ok(field.value.as_deref().unwrap_or_default())
    }

    /// The values picked in a string select.
    pub fn get_string_select_values(&self, custom_id: &str) -> Result<&[String]> {
        let field =
            self.typed_field(custom_id, &[ComponentType::StringSelect], &[FieldProperty::Values], false)?;
        Ok(field.values.as_deref().unwrap_or_default())
    }

    /// The users picked in a user or mentionable select.
    pub fn get_selected_users(&self, custom_id: &str, required: bool) -> Result<Option<&[User]>> {
        let field = self.typed_field(
            custom_id,
            &[ComponentType::UserSelect, ComponentType::MentionableSelect],
            &[FieldProperty::Users],
            required,
        )?;
        Ok(field.users.as_deref())
    }

    /// The members picked in a user or mentionable select. Never required,
    /// since users outside the guild have no member.
    pub fn get_selected_members(&self, custom_id: &str) -> Result<Option<&[Member]>> {
        let field = self.typed_field(
            custom_id,
            &[ComponentType::UserSelect, ComponentType::MentionableSelect],
            &[FieldProperty::Members],
            false,
        )?;
        Ok(field.members.as_deref())
    }

    /// The roles picked in a role or mentionable select.
    pub fn get_selected_roles(&self, custom_id: &str, required: bool) -> Result<Option<&[Role]>> {
        let field = self.typed_field(
            custom_id,
            &[ComponentType::RoleSelect, ComponentType::MentionableSelect],
            &[FieldProperty::Roles],
            required,
        )?;
        Ok(field.roles.as_deref())
    }

    /// The channels picked in a channel select.
    ///
    /// When `channel_types` is not empty every channel must have one of
    /// them, or [`Error::InvalidChannelType`] is returned.
    pub fn get_selected_channels(
        &self,
        custom_id: &str,
        required: bool,
        channel_types: &[ChannelType],
    ) -> Result<Option<&[AnyChannel]>> {
        let field = self.typed_field(
            custom_id,
            &[ComponentType::ChannelSelect],
            &[FieldProperty::Channels],
            required,
        )?;
        if let Some(ref channels) = field.channels {
            if !channel_types.is_empty() {
                if let Some(channel) = channels.iter().find(|c| !channel_types.contains(&c.kind())) {
                    return Err(Error::InvalidChannelType {
                        name: custom_id.to_owned(),
                        found: channel.kind(),
                        expected: channel_types.to_vec(),
                    });
                }
            }
        }
        Ok(field.channels.as_deref())
    }

    /// The users, members and roles picked in a mentionable select.
    pub fn get_selected_mentionables(
        &self,
        custom_id: &str,
        required: bool,
    ) -> Result<Option<SelectedMentionables<'_>>> {
        let field = self.typed_field(
            custom_id,
            &[ComponentType::MentionableSelect],
            &[FieldProperty::Users, FieldProperty::Members, FieldProperty::Roles],
            required,
        )?;
        if field.users.is_none() && field.members.is_none() && field.roles.is_none() {
            return Ok(None);
        }
        Ok(Some(SelectedMentionables {
            users: field.users.as_deref().unwrap_or_default(),
            members: field.members.as_deref().unwrap_or_default(),
            roles: field.roles.as_deref().unwrap_or_default(),
        }))
    }

    /// The files uploaded in a file upload field.
    pub fn get_uploaded_files(&self, custom_id: &str, required: bool) -> Result<Option<&[Attachment]>> {
        let field = self.typed_field(
            custom_id,
            &[ComponentType::FileUpload],
            &[FieldProperty::Attachments],
            required,
        )?;
        Ok(field.attachments.as_deref())
    }
}

/// A modal being submitted.
#[derive(Debug, Clone)]
pub struct ModalSubmitInteraction {
    /// The shared interaction fields.
    pub interaction: Interaction,
    /// The custom ID of the modal.
    pub custom_id: String,
    /// The submitted component tree.
    pub components: Vec<Component>,
    /// The submitted fields.
    pub fields: ModalSubmitFields,
}

impl ModalSubmitInteraction {
    /// Build the interaction from its payload.
    pub fn from_data(ctx: &Context, data: &InteractionData) -> Result<Self> {
        let modal: ModalSubmitData = data.decode()?;
        let fields = ModalSubmitFields::new(ctx, &modal.components, modal.resolved.as_ref(), data.guild_id);
        Ok(ModalSubmitInteraction {
            interaction: Interaction::new(ctx, data),
            custom_id: modal.custom_id,
            components: modal.components,
            fields,
        })
    }

    /// Whether the modal was shown from a message component, so the message
    /// can be updated.
    pub fn is_from_message(&self) -> bool {
        self.interaction.message.is_some()
    }
}
