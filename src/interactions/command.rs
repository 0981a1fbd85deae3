//! Slash commands and context menu commands.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CommandInteractionOptionResolver, CommandOption, Interaction, InteractionData, ResolvedData};
use crate::model::{
    CommandId, CommandOptionData, Context, Entity, GuildId, Member, Message, MessageId, OptionType,
    User, UserId,
};
use crate::Result;

/// The type of an application command.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CommandType {
    /// A slash command.
    ChatInput,
    /// A command in the context menu of a user.
    User,
    /// A command in the context menu of a message.
    Message,
    /// The command launching an activity.
    PrimaryEntryPoint,
    /// A command type this crate does not know about.
    Unknown(u8),
}

impl Default for CommandType {
    fn default() -> Self {
        CommandType::ChatInput
    }
}

impl From<u8> for CommandType {
    fn from(value: u8) -> Self {
        match value {
            1 => CommandType::ChatInput,
            2 => CommandType::User,
            3 => CommandType::Message,
            4 => CommandType::PrimaryEntryPoint,
            other => CommandType::Unknown(other),
        }
    }
}

impl From<CommandType> for u8 {
    fn from(kind: CommandType) -> u8 {
        match kind {
            CommandType::ChatInput => 1,
            CommandType::User => 2,
            CommandType::Message => 3,
            CommandType::PrimaryEntryPoint => 4,
            CommandType::Unknown(other) => other,
        }
    }
}

/// The `data` of a command or autocomplete interaction.
///
/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object-application-command-data-structure
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct CommandData {
    pub id: CommandId,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: CommandType,
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub options: Option<Vec<CommandOptionData>>,
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
    #[serde(default)]
    pub target_id: Option<String>,
}

impl CommandData {
    /// The top level options with their entities resolved.
    pub(crate) fn resolve_options(&self, ctx: &Context, guild_id: Option<GuildId>) -> Vec<CommandOption> {
        self.options
            .iter()
            .flatten()
            .map(|option| CommandOption::resolve(ctx, option, self.resolved.as_ref(), guild_id))
            .collect()
    }
}

/// A slash command being used.
#[derive(Debug, Clone)]
pub struct ChatInputCommandInteraction {
    /// The shared interaction fields.
    pub interaction: Interaction,
    /// The ID of the command.
    pub command_id: CommandId,
    /// The name of the command.
    pub command_name: String,
    /// The type of the command.
    pub command_type: CommandType,
    /// The guild the command is registered in, for guild commands.
    pub command_guild_id: Option<GuildId>,
    /// The submitted options.
    pub options: CommandInteractionOptionResolver,
}

impl ChatInputCommandInteraction {
    /// Build the interaction from its payload.
    pub fn from_data(ctx: &Context, data: &InteractionData) -> Result<Self> {
        let command: CommandData = data.decode()?;
        let options = command.resolve_options(ctx, data.guild_id);
        Ok(ChatInputCommandInteraction {
            interaction: Interaction::new(ctx, data),
            command_id: command.id,
            command_name: command.name,
            command_type: command.kind,
            command_guild_id: command.guild_id,
            options: CommandInteractionOptionResolver::new(options, command.resolved),
        })
    }
}

/// The command as typed, such as `/config set key:prefix`.
impl fmt::Display for ChatInputCommandInteraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}", self.command_name)?;
        if let Ok(Some(group)) = self.options.get_subcommand_group(false) {
            write!(f, " {}", group)?;
        }
        if let Ok(Some(subcommand)) = self.options.get_subcommand(false) {
            write!(f, " {}", subcommand)?;
        }
        for option in self.options.hoisted() {
            match option.value {
                Some(Value::String(ref value)) => write!(f, " {}:{}", option.name, value)?,
                Some(ref value) => write!(f, " {}:{}", option.name, value)?,
                None => write!(f, " {}:", option.name)?,
            }
        }
        Ok(())
    }
}

/// A user or message context menu command being used.
///
/// The target is exposed as a `user` option (with its `member`) or a
/// `message` option, so it can be read with the usual getters.
#[derive(Debug, Clone)]
pub struct ContextMenuCommandInteraction {
    /// The shared interaction fields.
    pub interaction: Interaction,
    /// The ID of the command.
    pub command_id: CommandId,
    /// The name of the command.
    pub command_name: String,
    /// The type of the command.
    pub command_type: CommandType,
    /// The guild the command is registered in, for guild commands.
    pub command_guild_id: Option<GuildId>,
    /// The ID of the user or message the command was used on.
    pub target_id: u64,
    /// The target as an option.
    pub options: CommandInteractionOptionResolver,
}

impl ContextMenuCommandInteraction {
    /// Build the interaction from its payload.
    pub fn from_data(ctx: &Context, data: &InteractionData) -> Result<Self> {
        let command: CommandData = data.decode()?;
        let target_id = command
            .target_id
            .as_deref()
            .and_then(|id| id.parse().ok())
            .unwrap_or_default();

        let mut options = Vec::new();
        if let Some(ref resolved) = command.resolved {
            if let Some(user) = resolved.users.get(&UserId(target_id)) {
                let mut option =
                    CommandOption::new("user", OptionType::User, Some(Value::from(target_id.to_string())));
                option.user = Some(user.clone());
                option.member = resolved.member(UserId(target_id), data.guild_id);
                options.push(option);
            }
            if let Some(message) = resolved.messages.get(&MessageId(target_id)) {
                let mut option = CommandOption::new(
                    "message",
                    OptionType::Message,
                    Some(Value::from(target_id.to_string())),
                );
                option.message = Some(Message::from_data(ctx, message));
                options.push(option);
            }
        }

        Ok(ContextMenuCommandInteraction {
            interaction: Interaction::new(ctx, data),
            command_id: command.id,
            command_name: command.name,
            command_type: command.kind,
            command_guild_id: command.guild_id,
            target_id,
            options: CommandInteractionOptionResolver::new(options, command.resolved),
        })
    }

    /// The targeted user, for user commands.
    pub fn target_user(&self) -> Option<&User> {
        self.options.get_user("user", false).ok().flatten()
    }

    /// The targeted member, for user commands in guilds.
    pub fn target_member(&self) -> Option<&Member> {
        self.options.get_member("user").ok().flatten()
    }

    /// The targeted message, for message commands.
    pub fn target_message(&self) -> Option<&Message> {
        self.options.get_message("message", false).ok().flatten()
    }
}
