use crate::{Error, Result};

use super::{Discord, RestOptions};

/// User agent to use when logging into a bot account.
pub(crate) const BOT_USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/spicesw/discord-structures, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Login methods for creating a [`Discord`] API client.
pub trait LoginExt: Sized {
    /// Log in as a bot account using the given bot authentication token.
    /// The token will automatically be prefixed with `Bot `.
    fn from_bot_token(token: &str) -> Result<Self>;

    /// Log in as a bot account, reaching the API as `options` describe.
    fn with_options(token: &str, options: RestOptions) -> Result<Self>;
}

impl LoginExt for Discord {
    fn from_bot_token(token: &str) -> Result<Discord> {
        Self::with_options(token, RestOptions::default())
    }

    fn with_options(token: &str, options: RestOptions) -> Result<Discord> {
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.as_str())
            .build()
            .map_err(Error::Reqwest)?;

        Ok(Discord {
            client,
            token: format!("Bot {}", token.trim()),
            options,
        })
    }
}
