//! Resource structures for the [Discord](https://discord.com) API.
//!
//! Every type in [`model`] wraps one API resource: it keeps the raw payload
//! fields under friendlier names, derives values such as creation dates, CDN
//! URLs and mention strings from them, and hands mutating operations to the
//! REST client it was constructed with.
//!
//! Entities are created from JSON payloads obtained elsewhere (a REST
//! response, a gateway dispatch) together with a [`Context`](model::Context),
//! the explicit handle to the REST client and the shared cache. They are
//! patched in place when a later payload about the same resource arrives;
//! [`Entity::update`](model::Entity::update) returns the state from before the
//! patch so that callers can compare both views.
//!
//! Incoming interactions live in [`interactions`]. They expose typed getters
//! over the submitted options and modal fields, and track whether an initial
//! response has been sent so that illegal response sequences fail early.
//!
//! Outbound payloads are assembled with the types in [`builders`].
//!
//! The gateway connection, rate limiting and request retries are not part of
//! this crate.

#![warn(missing_docs)]

/// A raw JSON object, as sent by the API.
pub type Object = serde_json::Map<String, serde_json::Value>;

macro_rules! cdn_concat {
    ($e:expr) => {
        // Out of everything, only the CDN still uses the old domain.
        concat!("https://cdn.discordapp.com", $e)
    };
}

/// A numeric enum that keeps values it does not know as `Unknown`.
macro_rules! open_enum {
    (
        $(#[$attr:meta])*
        pub enum $name:ident {
            $($(#[$vattr:meta])* $variant:ident = $value:literal,)*
        }
    ) => {
        $(#[$attr])*
        #[derive(Copy, Clone, Hash, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        #[serde(from = "u8", into = "u8")]
        pub enum $name {
            $($(#[$vattr])* $variant,)*
            /// A value this crate does not know about.
            Unknown(u8),
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    $($value => $name::$variant,)*
                    other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $value,)*
                    $name::Unknown(other) => other,
                }
            }
        }
    };
}

/// Struct and enum definitions of values in the Discord model.
pub mod model {
    mod id;
    pub use self::id::*;

    mod base;
    pub use self::base::*;

    mod cache;
    pub use self::cache::*;

    mod user;
    pub use self::user::*;

    mod role;
    pub use self::role::*;

    mod member;
    pub use self::member::*;

    mod emoji;
    pub use self::emoji::*;

    mod guild;
    pub use self::guild::*;

    mod channel;
    pub use self::channel::*;

    mod thread;
    pub use self::thread::*;

    mod invite;
    pub use self::invite::*;

    mod component;
    pub use self::component::*;

    mod message;
    pub use self::message::*;

    mod poll;
    pub use self::poll::*;

    mod team;
    pub use self::team::*;

    mod widget;
    pub use self::widget::*;

    mod option;
    pub use self::option::*;
}

pub mod interactions;

mod serial;
pub mod builders;

mod error;
pub use error::{Error, ErrorKind, Result};

mod rest;
pub use rest::*;
