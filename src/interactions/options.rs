//! Typed access to the options submitted with a command.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::model::{
    AnyChannel, Attachment, AttachmentId, Channel, ChannelData, ChannelId, ChannelType,
    CommandOptionData, Context, GuildId, Member, Message, MessageData, MessageId, OptionType, Role,
    RoleId, User, UserId,
};
use crate::{Error, Result};

/// The entities referenced by ID in options, selections and modal fields.
///
/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object-resolved-data-structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvedData {
    /// Users by ID.
    #[serde(default)]
    pub users: HashMap<UserId, User>,
    /// Guild members by user ID, without their user.
    #[serde(default)]
    pub members: HashMap<UserId, Member>,
    /// Roles by ID.
    #[serde(default)]
    pub roles: HashMap<RoleId, Role>,
    /// Partial channels by ID.
    #[serde(default)]
    pub channels: HashMap<ChannelId, ChannelData>,
    /// Partial messages by ID.
    #[serde(default)]
    pub messages: HashMap<MessageId, MessageData>,
    /// Uploaded files by ID.
    #[serde(default)]
    pub attachments: HashMap<AttachmentId, Attachment>,
}

impl ResolvedData {
    /// The member with the given user ID, with its user filled in.
    pub(crate) fn member(&self, id: UserId, guild_id: Option<GuildId>) -> Option<Member> {
        self.members.get(&id).map(|member| {
            let mut member = member.clone();
            if member.user.is_none() {
                member.user = self.users.get(&id).cloned();
            }
            member.guild_id = member.guild_id.or(guild_id);
            member
        })
    }

    /// The channel with the given ID, added to the cache.
    pub(crate) fn channel(&self, ctx: &Context, id: ChannelId) -> Option<AnyChannel> {
        self.channels
            .get(&id)
            .map(|data| ctx.cache().channels.add(ctx, id, data))
    }
}

/// A submitted option, with the entity it refers to resolved.
#[derive(Debug, Clone)]
pub struct CommandOption {
    /// The name of the option.
    pub name: String,
    /// The type of the option.
    pub kind: OptionType,
    /// The value of the option: the string, number or boolean, or the ID of
    /// the entity for entity options.
    pub value: Option<Value>,
    /// Whether the option is being autocompleted.
    pub focused: bool,
    /// The options of a subcommand or subcommand group.
    pub options: Vec<CommandOption>,
    /// The resolved user of a user or mentionable option.
    pub user: Option<User>,
    /// The resolved member of a user or mentionable option, in guilds.
    pub member: Option<Member>,
    /// The resolved channel of a channel option.
    pub channel: Option<AnyChannel>,
    /// The resolved role of a role or mentionable option.
    pub role: Option<Role>,
    /// The resolved file of an attachment option.
    pub attachment: Option<Attachment>,
    /// The target of a message context menu command.
    pub message: Option<Message>,
}

impl CommandOption {
    /// An option with nothing resolved.
    pub fn new(name: &str, kind: OptionType, value: Option<Value>) -> Self {
        CommandOption {
            name: name.to_owned(),
            kind,
            value,
            focused: false,
            options: Vec::new(),
            user: None,
            member: None,
            channel: None,
            role: None,
            attachment: None,
            message: None,
        }
    }

    /// Resolve the entity an option refers to.
    pub fn resolve(
        ctx: &Context,
        data: &CommandOptionData,
        resolved: Option<&ResolvedData>,
        guild_id: Option<GuildId>,
    ) -> Self {
        let mut option = CommandOption::new(&data.name, data.kind, data.value.clone());
        option.focused = data.focused;
        option.options = data
            .options
            .iter()
            .flatten()
            .map(|child| CommandOption::resolve(ctx, child, resolved, guild_id))
            .collect();

        let (resolved, id) = match (resolved, option.id()) {
            (Some(resolved), Some(id)) => (resolved, id),
            _ => return option,
        };
        match option.kind {
            OptionType::User => {
                option.user = resolved.users.get(&UserId(id)).cloned();
                option.member = resolved.member(UserId(id), guild_id);
            }
            OptionType::Mentionable => {
                option.user = resolved.users.get(&UserId(id)).cloned();
                option.member = resolved.member(UserId(id), guild_id);
                option.role = resolved.roles.get(&RoleId(id)).cloned();
            }
            OptionType::Channel => option.channel = resolved.channel(ctx, ChannelId(id)),
            OptionType::Role => option.role = resolved.roles.get(&RoleId(id)).cloned(),
            OptionType::Attachment => {
                option.attachment = resolved.attachments.get(&AttachmentId(id)).cloned()
            }
            _ => {}
        }
        option
    }

    /// The value as a snowflake, for entity options.
    fn id(&self) -> Option<u64> {
        match self.value {
            Some(Value::String(ref id)) => id.parse().ok(),
            Some(Value::Number(ref id)) => id.as_u64(),
            _ => None,
        }
    }

    fn has(&self, property: Property) -> bool {
        match property {
            Property::Value => self.value.as_ref().map_or(false, |value| !value.is_null()),
            Property::User => self.user.is_some(),
            Property::Member => self.member.is_some(),
            Property::Channel => self.channel.is_some(),
            Property::Role => self.role.is_some(),
            Property::Attachment => self.attachment.is_some(),
            Property::Message => self.message.is_some(),
        }
    }
}

/// Where an option keeps what it resolved to.
#[derive(Copy, Clone, Debug)]
enum Property {
    Value,
    User,
    Member,
    Channel,
    Role,
    Attachment,
    Message,
}

/// The name and options of the first option, if it has the given type.
fn hoist(options: &[CommandOption], kind: OptionType) -> Option<(String, Vec<CommandOption>)> {
    options
        .first()
        .filter(|option| option.kind == kind)
        .map(|option| (option.name.clone(), option.options.clone()))
}

/// The entity a mentionable option resolved to.
#[derive(Debug, Clone, Copy)]
pub enum Mentionable<'a> {
    /// A guild member.
    Member(&'a Member),
    /// A user, outside guilds or when the member was not sent.
    User(&'a User),
    /// A role.
    Role(&'a Role),
}

/// Typed getters over the options of a command.
///
/// The options of a selected subcommand, and of its group, are hoisted so
/// they can be looked up by name directly. Every getter checks in order that
/// the option exists (if `required`), that it has one of the expected types
/// regardless of its value, and finally (if `required`) that it carries a
/// value.
///
/// ```ignore
/// let user = interaction.options.get_user("target", true)?;
/// let reason = interaction.options.get_string("reason", false)?.unwrap_or("none");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandInteractionOptionResolver {
    data: Vec<CommandOption>,
    hoisted: Vec<CommandOption>,
    group: Option<String>,
    subcommand: Option<String>,
    resolved: Option<ResolvedData>,
}

impl CommandInteractionOptionResolver {
    /// Wrap the top level options of a command.
    pub fn new(options: Vec<CommandOption>, resolved: Option<ResolvedData>) -> Self {
        let mut hoisted = options.clone();
        let mut group = None;
        let mut subcommand = None;

        if let Some((name, children)) = hoist(&hoisted, OptionType::SubcommandGroup) {
            group = Some(name);
            hoisted = children;
        }
        if let Some((name, children)) = hoist(&hoisted, OptionType::Subcommand) {
            subcommand = Some(name);
            hoisted = children;
        }

        CommandInteractionOptionResolver {
            data: options,
            hoisted,
            group,
            subcommand,
            resolved,
        }
    }

    /// The top level options, as submitted.
    pub fn data(&self) -> &[CommandOption] {
        &self.data
    }

    /// The options of the selected subcommand, or the top level options.
    pub fn hoisted(&self) -> &[CommandOption] {
        &self.hoisted
    }

    /// The entities referenced by the options.
    pub fn resolved(&self) -> Option<&ResolvedData> {
        self.resolved.as_ref()
    }

    /// Look up an option by name.
    ///
    /// Fails with [`Error::OptionNotFound`] if the option is `required` but
    /// absent.
    pub fn get(&self, name: &str, required: bool) -> Result<Option<&CommandOption>> {
        match self.hoisted.iter().find(|option| option.name == name) {
            Some(option) => Ok(Some(option)),
            None if required => Err(Error::OptionNotFound(name.to_owned())),
            None => Ok(None),
        }
    }

    fn typed_option(
        &self,
        name: &str,
        types: &[OptionType],
        properties: &[Property],
        required: bool,
    ) -> Result<Option<&CommandOption>> {
        let option = match self.get(name, required)? {
            Some(option) => option,
            None => return Ok(None),
        };
        if !types.contains(&option.kind) {
            return Err(Error::OptionType {
                name: name.to_owned(),
                found: option.kind,
                expected: types.to_vec(),
            });
        }
        if required && properties.iter().all(|&property| !option.has(property)) {
            return Err(Error::OptionEmpty {
                name: name.to_owned(),
                kind: option.kind,
            });
        }
        Ok(Some(option))
    }

    /// The name of the selected subcommand.
    ///
    /// Fails with [`Error::NoSubcommand`] if `required` and none was selected.
    pub fn get_subcommand(&self, required: bool) -> Result<Option<&str>> {
        match self.subcommand {
            None if required => Err(Error::NoSubcommand),
            ref subcommand => Ok(subcommand.as_deref()),
        }
    }

    /// The name of the selected subcommand group.
    ///
    /// Fails with [`Error::NoSubcommandGroup`] if `required` and none was
    /// selected.
    pub fn get_subcommand_group(&self, required: bool) -> Result<Option<&str>> {
        match self.group {
            None if required => Err(Error::NoSubcommandGroup),
            ref group => Ok(group.as_deref()),
        }
    }

    /// The option being autocompleted.
    pub fn get_focused(&self) -> Result<&CommandOption> {
        self.hoisted
            .iter()
            .find(|option| option.focused)
            .ok_or(Error::NoFocusedOption)
    }

    /// Get a boolean option.
    pub fn get_boolean(&self, name: &str, required: bool) -> Result<Option<bool>> {
        let option = self.typed_option(name, &[OptionType::Boolean], &[Property::Value], required)?;
        Ok(option.and_then(|o| o.value.as_ref()).and_then(Value::as_bool))
    }

    /// Get a string option.
    pub fn get_string(&self, name: &str, required: bool) -> Result<Option<&str>> {
        let option = self.typed_option(name, &[OptionType::String], &[Property::Value], required)?;
        Ok(option.and_then(|o| o.value.as_ref()).and_then(Value::as_str))
    }

    /// Get an integer option.
    pub fn get_integer(&self, name: &str, required: bool) -> Result<Option<i64>> {
        let option = self.typed_option(name, &[OptionType::Integer], &[Property::Value], required)?;
        Ok(option.and_then(|o| o.value.as_ref()).and_then(Value::as_i64))
    }

    /// Get a number option.
    pub fn get_number(&self, name: &str, required: bool) -> Result<Option<f64>> {
        let option = self.typed_option(name, &[OptionType::Number], &[Property::Value], required)?;
        Ok(option.and_then(|o| o.value.as_ref()).and_then(Value::as_f64))
    }

    /// Get a channel option.
    ///
    /// When `channel_types` is not empty the channel must have one of them,
    /// or [`Error::InvalidChannelType`] is returned.
    pub fn get_channel(
        &self,
        name: &str,
        required: bool,
        channel_types: &[ChannelType],
    ) -> Result<Option<&AnyChannel>> {
        let option = self.typed_option(name, &[OptionType::Channel], &[Property::Channel], required)?;
        let channel = option.and_then(|o| o.channel.as_ref());
        if let Some(channel) = channel {
            if !channel_types.is_empty() && !channel_types.contains(&channel.kind()) {
                return Err(Error::InvalidChannelType {
                    name: name.to_owned(),
                    found: channel.kind(),
                    expected: channel_types.to_vec(),
                });
            }
        }
        Ok(channel)
    }

    /// Get a user option, or the user of a mentionable option.
    pub fn get_user(&self, name: &str, required: bool) -> Result<Option<&User>> {
        let option = self.typed_option(
            name,
            &[OptionType::User, OptionType::Mentionable],
            &[Property::User],
            required,
        )?;
        Ok(option.and_then(|o| o.user.as_ref()))
    }

    /// Get the member of a user or mentionable option.
    ///
    /// Members are only sent for users in the guild, so this is never
    /// required.
    pub fn get_member(&self, name: &str) -> Result<Option<&Member>> {
        let option = self.typed_option(
            name,
            &[OptionType::User, OptionType::Mentionable],
            &[Property::Member],
            false,
        )?;
        Ok(option.and_then(|o| o.member.as_ref()))
    }

    /// Get a role option, or the role of a mentionable option.
    pub fn get_role(&self, name: &str, required: bool) -> Result<Option<&Role>> {
        let option = self.typed_option(
            name,
            &[OptionType::Role, OptionType::Mentionable],
            &[Property::Role],
            required,
        )?;
        Ok(option.and_then(|o| o.role.as_ref()))
    }

    /// Get an attachment option.
    pub fn get_attachment(&self, name: &str, required: bool) -> Result<Option<&Attachment>> {
        let option = self.typed_option(
            name,
            &[OptionType::Attachment],
            &[Property::Attachment],
            required,
        )?;
        Ok(option.and_then(|o| o.attachment.as_ref()))
    }

    /// Get a mentionable option: the member, else the user, else the role.
    pub fn get_mentionable(&self, name: &str, required: bool) -> Result<Option<Mentionable<'_>>> {
        let option = self.typed_option(
            name,
            &[OptionType::Mentionable],
            &[Property::User, Property::Member, Property::Role],
            required,
        )?;
        Ok(option.and_then(|o| {
            o.member
                .as_ref()
                .map(Mentionable::Member)
                .or_else(|| o.user.as_ref().map(Mentionable::User))
                .or_else(|| o.role.as_ref().map(Mentionable::Role))
        }))
    }

    /// Get the target message of a message context menu command.
    pub fn get_message(&self, name: &str, required: bool) -> Result<Option<&Message>> {
        let option = self.typed_option(name, &[OptionType::Message], &[Property::Message], required)?;
        Ok(option.and_then(|o| o.message.as_ref()))
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

    fn resolver(options: Value, resolved: Value) -> CommandInteractionOptionResolver {
        let ctx = Context::new(Offline);
        let options: Vec<CommandOptionData> = serde_json::from_value(options).unwrap();
        let resolved: ResolvedData = serde_json::from_value(resolved).unwrap();
        let options = options
            .iter()
            .map(|option| CommandOption::resolve(&ctx, option, Some(&resolved), Some(GuildId(1))))
            .collect();
        CommandInteractionOptionResolver::new(options, Some(resolved))
    }

    #[test]
    fn missing_options() {
        let options = resolver(json!([{ "name": "count", "type": 4, "value": 3 }]), json!({}));

        assert_eq!(options.get("other", true).unwrap_err().kind(), ErrorKind::NotFound);
        assert!(options.get("other", false).unwrap().is_none());
        assert_eq!(options.get_string("other", false).unwrap(), None);
        assert_eq!(options.get_integer("count", true).unwrap(), Some(3));
    }

    #[test]
    fn type_is_checked_before_emptiness() {
        let options = resolver(
            json!([
                { "name": "flag", "type": 5, "value": true },
                { "name": "empty", "type": 3 },
            ]),
            json!({}),
        );

        // a populated option of the wrong type
        let err = options.get_string("flag", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        // an empty option of the wrong type blames the type
        let err = options.get_integer("empty", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = options.get_string("empty", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyValue);
        assert_eq!(options.get_string("empty", false).unwrap(), None);
    }

    #[test]
    fn subcommands_are_hoisted() {
        let options = resolver(
            json!([{
                "name": "config",
                "type": 2,
                "options": [{
                    "name": "set",
                    "type": 1,
                    "options": [{ "name": "key", "type": 3, "value": "prefix" }],
                }],
            }]),
            json!({}),
        );

        assert_eq!(options.get_subcommand_group(true).unwrap(), Some("config"));
        assert_eq!(options.get_subcommand(true).unwrap(), Some("set"));
        assert_eq!(options.get_string("key", true).unwrap(), Some("prefix"));
        assert_eq!(options.data().len(), 1);
        assert_eq!(options.data()[0].name, "config");

        let flat = resolver(json!([{ "name": "key", "type": 3, "value": "x" }]), json!({}));
        assert_eq!(flat.get_subcommand(true).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(flat.get_subcommand(false).unwrap(), None);
        assert_eq!(flat.get_subcommand_group(false).unwrap(), None);
        assert_eq!(flat.get_focused().unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn entities_are_resolved() {
        let options = resolver(
            json!([
                { "name": "who", "type": 6, "value": "80351110224678912" },
                { "name": "what", "type": 9, "value": "41771983423143936" },
                { "name": "where", "type": 7, "value": "41771983423143937" },
                { "name": "file", "type": 11, "value": "1065784537394282579" },
            ]),
            json!({
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
                    "41771983423143937": { "id": "41771983423143937", "type": 2, "name": "Lounge" },
                },
                "attachments": {
                    "1065784537394282579": {
                        "id": "1065784537394282579",
                        "filename": "cat.png",
                        "size": 2048,
                        "url": "https://cdn.discordapp.com/attachments/1/2/cat.png",
                        "proxy_url": "https://media.discordapp.net/attachments/1/2/cat.png",
                    },
                },
            }),
        );

        assert_eq!(options.get_user("who", true).unwrap().map(|u| u.id), Some(UserId(80351110224678912)));
        let member = options.get_member("who").unwrap().unwrap();
        assert_eq!(member.display_name(), Some("nel"));
        assert_eq!(member.guild_id, Some(GuildId(1)));

        match options.get_mentionable("what", true).unwrap() {
            Some(Mentionable::Role(role)) => assert_eq!(role.name, "mods"),
            other => panic!("expected a role, got {:?}", other),
        }
        assert_eq!(options.get_role("what", true).unwrap().map(|r| r.id), Some(RoleId(41771983423143936)));
        // a user getter accepts a mentionable option, which resolved to no user
        assert_eq!(options.get_user("what", true).unwrap_err().kind(), ErrorKind::EmptyValue);

        let voice = options.get_channel("where", true, &[]).unwrap().unwrap();
        assert_eq!(voice.kind(), ChannelType::GuildVoice);
        assert!(options.get_channel("where", true, &[ChannelType::GuildVoice]).is_ok());
        let err = options
            .get_channel("where", true, &[ChannelType::GuildText])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        assert_eq!(
            options.get_attachment("file", true).unwrap().map(|a| a.filename.as_str()),
            Some("cat.png")
        );
        assert_eq!(options.get_message("file", false).unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn focused_option() {
        let options = resolver(
            json!([
                { "name": "query", "type": 3, "value": "ru", "focused": true },
                { "name": "limit", "type": 4, "value": 5 },
            ]),
            json!({}),
        );
        let focused = options.get_focused().unwrap();
        assert_eq!(focused.name, "query");
        assert_eq!(focused.value, Some(json!("ru")));
    }
}
