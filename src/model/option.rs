//! Application command options, as submitted with an interaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The type of a command option.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum OptionType {
    /// A subcommand, carrying its own options.
    Subcommand,
    /// A group of subcommands.
    SubcommandGroup,
    /// A string.
    String,
    /// An integer between -2^53 and 2^53.
    Integer,
    /// A boolean.
    Boolean,
    /// A user.
    User,
    /// A channel, threads and categories included.
    Channel,
    /// A role.
    Role,
    /// A user or a role.
    Mentionable,
    /// A double between -2^53 and 2^53.
    Number,
    /// An uploaded file.
    Attachment,
    /// The target message of a message context menu command.
    ///
    /// Discord has no such option type; it is made up for the target so it
    /// can be read like any other option. It is written as `0`.
    Message,
    /// An option type this crate does not know about.
    Unknown(u8),
}

impl From<u8> for OptionType {
    fn from(value: u8) -> Self {
        match value {
            0 => OptionType::Message,
            1 => OptionType::Subcommand,
            2 => OptionType::SubcommandGroup,
            3 => OptionType::String,
            4 => OptionType::Integer,
            5 => OptionType::Boolean,
            6 => OptionType::User,
            7 => OptionType::Channel,
            8 => OptionType::Role,
            9 => OptionType::Mentionable,
            10 => OptionType::Number,
            11 => OptionType::Attachment,
            other => OptionType::Unknown(other),
        }
    }
}

impl From<OptionType> for u8 {
    fn from(kind: OptionType) -> u8 {
        match kind {
            OptionType::Message => 0,
            OptionType::Subcommand => 1,
            OptionType::SubcommandGroup => 2,
            OptionType::String => 3,
            OptionType::Integer => 4,
            OptionType::Boolean => 5,
            OptionType::User => 6,
            OptionType::Channel => 7,
            OptionType::Role => 8,
            OptionType::Mentionable => 9,
            OptionType::Number => 10,
            OptionType::Attachment => 11,
            OptionType::Unknown(other) => other,
        }
    }
}

/// One submitted option, as sent by Discord.
///
/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object-application-command-interaction-data-option-structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOptionData {
    /// The name of the option.
    pub name: String,
    /// The type of the option.
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// The value of the option. IDs for entity options, resolved separately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// The options of a subcommand or subcommand group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<CommandOptionData>>,
    /// Whether this option is the one being autocompleted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub focused: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_options() {
        let option: CommandOptionData = serde_json::from_value(json!({
            "name": "config",
            "type": 2,
            "options": [{
                "name": "set",
                "type": 1,
                "options": [{ "name": "key", "type": 3, "value": "prefix", "focused": true }],
            }],
        }))
        .unwrap();

        assert_eq!(option.kind, OptionType::SubcommandGroup);
        let sub = &option.options.as_ref().unwrap()[0];
        assert_eq!(sub.kind, OptionType::Subcommand);
        let key = &sub.options.as_ref().unwrap()[0];
        assert!(key.focused);
        assert_eq!(key.value, Some(json!("prefix")));

        assert_eq!(
            serde_json::to_value(key).unwrap(),
            json!({ "name": "key", "type": 3, "value": "prefix", "focused": true })
        );
    }

    #[test]
    fn unknown_types_survive() {
        assert_eq!(OptionType::from(42), OptionType::Unknown(42));
        assert_eq!(u8::from(OptionType::Unknown(42)), 42);
    }
}
