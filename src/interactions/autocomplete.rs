//! Autocompletion of command options.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::responses::callback;
use super::{CommandData, CommandInteractionOptionResolver, CommandType, Interaction, InteractionData};
use crate::model::{CommandId, Context, GuildId};
use crate::{Error, Result};

/// A suggestion for the option being autocompleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOptionChoice {
    /// The name shown to the user.
    pub name: String,
    /// The value submitted when the choice is picked: a string or a number,
    /// matching the option type.
    pub value: Value,
}

impl CommandOptionChoice {
    /// A choice.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        CommandOptionChoice {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A user filling in a command option that has autocompletion.
///
/// Only the suggestions can be sent back, once.
#[derive(Debug, Clone)]
pub struct AutocompleteInteraction {
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
    /// The options filled in so far, one of them focused.
    pub options: CommandInteractionOptionResolver,
    /// Whether the suggestions were sent.
    pub responded: bool,
}

impl AutocompleteInteraction {
    /// Build the interaction from its payload.
    pub fn from_data(ctx: &Context, data: &InteractionData) -> Result<Self> {
        let command: CommandData = data.decode()?;
        let options = command.resolve_options(ctx, data.guild_id);
        Ok(AutocompleteInteraction {
            interaction: Interaction::new(ctx, data),
            command_id: command.id,
            command_name: command.name,
            command_type: command.kind,
            command_guild_id: command.guild_id,
            options: CommandInteractionOptionResolver::new(options, command.resolved),
            responded: false,
        })
    }

    /// Send the suggestions for the focused option, at most 25.
    pub async fn respond(&mut self, choices: &[CommandOptionChoice]) -> Result<()> {
        if self.responded {
            return Err(Error::AlreadyReplied);
        }
        self.interaction
            .callback(callback::AUTOCOMPLETE_RESULT, Some(json!({ "choices": choices })))
            .await?;
        self.responded = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::RestRequest;
    use crate::Rest;
    use futures::future::BoxFuture;

    #[derive(Debug)]
    struct Offline;

    impl Rest for Offline {
        fn request(&self, _: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    #[test]
    fn focused_option_and_choices() {
        let data: InteractionData = serde_json::from_value(json!({
            "id": "1",
            "application_id": "2",
            "type": 4,
            "token": "t",
            "data": {
                "id": "10",
                "name": "tag",
                "type": 1,
                "options": [{ "name": "name", "type": 3, "value": "ru", "focused": true }],
            },
        }))
        .unwrap();
        let autocomplete = AutocompleteInteraction::from_data(&Context::new(Offline), &data).unwrap();

        assert_eq!(autocomplete.command_name, "tag");
        assert!(!autocomplete.responded);
        assert!(!autocomplete.interaction.is_repliable());
        assert_eq!(autocomplete.options.get_focused().unwrap().name, "name");
        assert_eq!(
            serde_json::to_value(CommandOptionChoice::new("rust", "rust")).unwrap(),
            json!({ "name": "rust", "value": "rust" })
        );
    }
}
