//! Discord Rest API requests, as made by the structures in [`model`](crate::model).
//!
//! Entities never talk to the network by themselves. Every mutating or
//! fetching operation is turned into a [`RestRequest`] and handed to the
//! [`Rest`] client stored in the entity's [`Context`](crate::model::Context).
//! The [`Discord`] client is the `reqwest` backed implementation; tests and
//! applications with their own HTTP stack can provide another.
//!
//! Rate limits and retries are left to the implementation.

mod login;
pub use login::*;
use login::BOT_USER_AGENT;

pub mod routes;

use std::fmt;

use futures::future::BoxFuture;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{CheckStatus, Error, Result, StatusChecks};

/// A request against a route of the Discord REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    /// The HTTP method.
    pub method: Method,
    /// The route, relative to the versioned API base, starting with `/`.
    pub route: String,
    /// The JSON body, if any.
    pub body: Option<Value>,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// Whether the bot token should be sent along.
    ///
    /// Interaction callbacks and webhook routes are authorized by the token
    /// in the route instead.
    pub auth: bool,
    /// The audit log reason, for routes that accept one.
    pub reason: Option<String>,
}

impl RestRequest {
    /// A request without body or query parameters.
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        RestRequest {
            method,
            route: route.into(),
            body: None,
            query: Vec::new(),
            auth: true,
            reason: None,
        }
    }

    /// A `GET` request.
    pub fn get(route: impl Into<String>) -> Self {
        Self::new(Method::GET, route)
    }

    /// A `POST` request.
    pub fn post(route: impl Into<String>) -> Self {
        Self::new(Method::POST, route)
    }

    /// A `PATCH` request.
    pub fn patch(route: impl Into<String>) -> Self {
        Self::new(Method::PATCH, route)
    }

    /// A `PUT` request.
    pub fn put(route: impl Into<String>) -> Self {
        Self::new(Method::PUT, route)
    }

    /// A `DELETE` request.
    pub fn delete(route: impl Into<String>) -> Self {
        Self::new(Method::DELETE, route)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query string parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Do not send the bot token with this request.
    pub fn unauthenticated(mut self) -> Self {
        self.auth = false;
        self
    }

    /// Record a reason in the guild's audit log.
    pub fn reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}

/// A client able to perform requests against the Discord REST API.
///
/// A successful response resolves to its JSON body, or `None` for
/// `204 No Content`. Failed requests are reported as they are, without
/// retrying.
pub trait Rest: Send + Sync + fmt::Debug {
    /// Perform a request.
    fn request(&self, request: RestRequest) -> BoxFuture<'_, Result<Option<Value>>>;
}

/// Perform a request and decode its JSON body.
pub(crate) async fn fetch<T: DeserializeOwned>(rest: &dyn Rest, request: RestRequest) -> Result<T> {
    match rest.request(request).await? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Err(Error::Protocol("Expected a JSON body, got an empty response")),
    }
}

/// Perform a request, discarding whatever it responds with.
pub(crate) async fn send(rest: &dyn Rest, request: RestRequest) -> Result<()> {
    rest.request(request).await.map(drop)
}

/// Where and how the [`Discord`] client reaches the API.
#[derive(Debug, Clone)]
pub struct RestOptions {
    /// Where the Discord API is mounted on the web.
    pub api_base: String,
    /// The API version requests are made against.
    pub api_version: u8,
    /// The `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for RestOptions {
    fn default() -> Self {
        RestOptions {
            api_base: "https://discord.com/api".to_owned(),
            api_version: 10,
            user_agent: BOT_USER_AGENT.to_owned(),
        }
    }
}

/// Client for the Discord REST API.
///
/// As requests need only immutable access (`&self`) to the client,
/// it is advisable to share one client between contexts, behind an [`Arc`].
///
/// [`Arc`]: std::sync::Arc
#[derive(Debug)]
pub struct Discord {
    /// Configured `reqwest` client for making request.
    client: reqwest::Client,
    /// The used token for making authorized requests.
    token: String,
    options: RestOptions,
}

impl Discord {
    fn url(&self, route: &str) -> String {
        format!(
            "{}/v{}{}{}",
            self.options.api_base.trim_end_matches('/'),
            self.options.api_version,
            if route.starts_with('/') { "" } else { "/" },
            route
        )
    }

    /// Make a request with authorization taken care of.
    async fn execute(&self, request: RestRequest) -> Result<Option<Value>> {
        debug!("{} {}", request.method, request.route);

        let mut builder = self
            .client
            .request(request.method, self.url(&request.route));
        if request.auth {
            builder = builder.header(reqwest::header::AUTHORIZATION, self.token.as_str());
        }
        if let Some(ref reason) = request.reason {
            let reason = utf8_percent_encode(reason, NON_ALPHANUMERIC).to_string();
            builder = builder.header("X-Audit-Log-Reason", reason);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        builder.send().await.check_status().await?.json_or_empty().await
    }
}

impl Rest for Discord {
    fn request(&self, request: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
        Box::pin(self.execute(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_versioned() {
        let discord = Discord::from_bot_token("token").unwrap();
        assert_eq!(
            discord.url("/channels/1"),
            "https://discord.com/api/v10/channels/1"
        );

        let options = RestOptions {
            api_base: "http://localhost:8080/api/".to_owned(),
            api_version: 9,
            ..RestOptions::default()
        };
        let local = Discord::with_options("token", options).unwrap();
        assert_eq!(local.url("gateway"), "http://localhost:8080/api/v9/gateway");
    }

    #[test]
    fn request_builders() {
        let request = RestRequest::post("/interactions/1/abc/callback")
            .json(serde_json::json!({ "type": 5 }))
            .query("with_response", true)
            .unauthenticated();

        assert_eq!(request.method, Method::POST);
        assert!(!request.auth);
        assert_eq!(request.query, vec![("with_response".to_owned(), "true".to_owned())]);
    }
}
