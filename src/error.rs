use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt::{self, Display};
use tracing::debug;

use crate::model::{ChannelType, ComponentType, OptionType};

/// Discord API `Result` alias type.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Discord API error type.
#[derive(Debug)]
pub enum Error {
    /// A `reqwest` crate error
    Reqwest(ReqwestError),
    /// A `serde_json` crate error
    Json(JsonError),
    /// A json decoding error, with a description and the offending value
    Decode(&'static str, Value),
    /// A generic non-success response from the REST API
    Status(reqwest::StatusCode, Option<Value>),
    /// A rate limit error, with how many milliseconds to wait before retrying
    RateLimited(u64),
    /// A Discord protocol error, with a description
    Protocol(&'static str),

    /// A command option with the given name was required but not submitted.
    OptionNotFound(String),
    /// A command option was submitted with a type other than the one asked for.
    OptionType {
        /// The name of the option.
        name: String,
        /// The type the option was submitted with.
        found: OptionType,
        /// The types the getter accepts.
        expected: Vec<OptionType>,
    },
    /// A required command option was present but carried no value.
    OptionEmpty {
        /// The name of the option.
        name: String,
        /// The type the option was submitted with.
        kind: OptionType,
    },
    /// A channel option resolved to a channel of a disallowed type.
    InvalidChannelType {
        /// The name of the option.
        name: String,
        /// The type of the resolved channel.
        found: ChannelType,
        /// The channel types the caller allowed.
        expected: Vec<ChannelType>,
    },
    /// A subcommand was required but none was selected.
    NoSubcommand,
    /// A subcommand group was required but none was selected.
    NoSubcommandGroup,
    /// An autocomplete interaction carried no focused option.
    NoFocusedOption,

    /// A modal field with the given custom id was not submitted.
    ModalFieldNotFound(String),
    /// A modal field was submitted as a different component type.
    ModalFieldType {
        /// The custom id of the field.
        custom_id: String,
        /// The component type the field was submitted as.
        found: ComponentType,
        /// The component types the getter accepts.
        expected: Vec<ComponentType>,
    },
    /// A required modal field was present but carried no value.
    ModalFieldEmpty {
        /// The custom id of the field.
        custom_id: String,
        /// The component type the field was submitted as.
        kind: ComponentType,
    },

    /// The interaction has already been deferred or replied to.
    AlreadyReplied,
    /// The interaction has not been deferred or replied to yet.
    NotReplied,
    /// The operation is not available for this kind of entity.
    Unsupported(&'static str),

    /// A miscellaneous error, with a description
    Other(&'static str),
}

/// The broad category an [`Error`] belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Something that was required is absent.
    NotFound,
    /// Something is present, but of the wrong type.
    TypeMismatch,
    /// Something required is present, but its value is unset.
    EmptyValue,
    /// An initial interaction response was attempted twice.
    AlreadyResponded,
    /// A follow-up style response was attempted before the initial response.
    NotResponded,
    /// The entity does not support the operation.
    UnsupportedOperation,
    /// The request failed on the way to or from Discord.
    Http,
    /// A payload could not be decoded.
    Decode,
    /// Anything else.
    Other,
}

impl Error {
    #[doc(hidden)]
    pub async fn from_response(response: reqwest::Response) -> Error {
        let status = response.status();

        let value = response
            .bytes()
            .await
            .ok()
            .and_then(|b| serde_json::from_slice(&b).ok());

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            if let Some(Value::Object(ref map)) = value {
                if let Some(delay) = map.get("retry_after").and_then(|v| v.as_f64()) {
                    return Error::RateLimited((delay * 1000.0) as u64);
                }
            }
        }
        Error::Status(status, value)
    }

    /// The category this error falls under.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::OptionNotFound(_)
            | Error::ModalFieldNotFound(_)
            | Error::NoSubcommand
            | Error::NoSubcommandGroup
            | Error::NoFocusedOption => ErrorKind::NotFound,
            Error::OptionType { .. }
            | Error::ModalFieldType { .. }
            | Error::InvalidChannelType { .. } => ErrorKind::TypeMismatch,
            Error::OptionEmpty { .. } | Error::ModalFieldEmpty { .. } => ErrorKind::EmptyValue,
            Error::AlreadyReplied => ErrorKind::AlreadyResponded,
            Error::NotReplied => ErrorKind::NotResponded,
            Error::Unsupported(_) => ErrorKind::UnsupportedOperation,
            Error::Reqwest(_) | Error::Status(..) | Error::RateLimited(_) => ErrorKind::Http,
            Error::Json(_) | Error::Decode(..) | Error::Protocol(_) => ErrorKind::Decode,
            Error::Other(_) => ErrorKind::Other,
        }
    }
}

impl From<ReqwestError> for Error {
    fn from(err: ReqwestError) -> Error {
        Error::Reqwest(err)
    }
}

impl From<JsonError> for Error {
    fn from(err: JsonError) -> Error {
        Error::Json(err)
    }
}

fn join<T: fmt::Debug>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("{:?}", item))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Reqwest(ref inner) => inner.fmt(f),
            Error::Json(ref inner) => inner.fmt(f),
            Error::Decode(msg, _) | Error::Protocol(msg) | Error::Other(msg) => f.write_str(msg),
            Error::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::Status(status, _) => f.write_str(
                status
                    .canonical_reason()
                    .unwrap_or("Unknown bad HTTP status"),
            ),
            Error::RateLimited(ms) => write!(f, "Rate limited, retry after {}ms", ms),
            Error::OptionNotFound(ref name) => {
                write!(f, "Required option \"{}\" not found", name)
            }
            Error::OptionType {
                ref name,
                found,
                ref expected,
            } => write!(
                f,
                "Option \"{}\" is of type: {:?}; expected {}",
                name,
                found,
                join(expected)
            ),
            Error::OptionEmpty { ref name, kind } => write!(
                f,
                "Required option \"{}\" is of type: {:?}; expected a non-empty value",
                name, kind
            ),
            Error::InvalidChannelType {
                ref name,
                found,
                ref expected,
            } => write!(
                f,
                "The type of channel of the option \"{}\" is: {:?}; expected {}",
                name,
                found,
                join(expected)
            ),
            Error::NoSubcommand => f.write_str("No subcommand specified for interaction"),
            Error::NoSubcommandGroup => {
                f.write_str("No subcommand group specified for interaction")
            }
            Error::NoFocusedOption => f.write_str("No focused option for autocomplete interaction"),
            Error::ModalFieldNotFound(ref custom_id) => {
                write!(f, "Required field with custom id \"{}\" not found", custom_id)
            }
            Error::ModalFieldType {
                ref custom_id,
                found,
                ref expected,
            } => write!(
                f,
                "Field with custom id \"{}\" is of type: {:?}; expected {}",
                custom_id,
                found,
                join(expected)
            ),
            Error::ModalFieldEmpty {
                ref custom_id,
                kind,
            } => write!(
                f,
                "Required field with custom id \"{}\" is of type: {:?}; expected a non-empty value",
                custom_id, kind
            ),
            Error::AlreadyReplied => {
                f.write_str("The reply to this interaction has already been sent or deferred")
            }
            Error::NotReplied => {
                f.write_str("The reply to this interaction has not been sent or deferred")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Reqwest(ref inner) => Some(inner),
            Error::Json(ref inner) => Some(inner),
            _ => None,
        }
    }
}

/// Extension trait for checking the status and discarding failed discord HTTP requests.
pub(crate) trait CheckStatus {
    /// Convert non-success statuses to discord crate errors, tossing info.
    async fn check_status(self) -> Result<reqwest::Response>;
}

impl CheckStatus for reqwest::Result<reqwest::Response> {
    async fn check_status(self) -> Result<reqwest::Response> {
        let response = self?;
        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }
        Ok(response)
    }
}

/// Extension trait for reading the body of a checked discord HTTP response.
pub(crate) trait StatusChecks {
    /// Read the response body as JSON, or `None` for `204 No Content`
    /// and empty bodies.
    async fn json_or_empty(self) -> Result<Option<Value>>;
}

impl StatusChecks for reqwest::Response {
    async fn json_or_empty(self) -> Result<Option<Value>> {
        if self.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let content = self.bytes().await?;
        if content.is_empty() {
            debug!("Expected a JSON body, got an empty response");
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&content)?))
    }
}
