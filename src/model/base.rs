//! The contract shared by every API-backed structure.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::Cache;
use crate::{Object, Rest};

/// The handle every entity is constructed with.
///
/// A context bundles the REST client that mutating operations are sent through
/// and the cache that back-references (a channel's guild, a thread's parent)
/// are looked up in. Cloning a context is cheap and all clones share the same
/// client and cache.
#[derive(Clone)]
pub struct Context {
    rest: Arc<dyn Rest>,
    cache: Arc<Cache>,
}

impl Context {
    /// Create a context around a REST client, with an empty cache.
    pub fn new<R: Rest + 'static>(rest: R) -> Self {
        Self::from_parts(Arc::new(rest), Arc::default())
    }

    /// Create a context from an already shared REST client and cache.
    pub fn from_parts(rest: Arc<dyn Rest>, cache: Arc<Cache>) -> Self {
        Self { rest, cache }
    }

    /// The REST client requests are made through.
    pub fn rest(&self) -> &dyn Rest {
        &*self.rest
    }

    /// The cache shared by all entities created with this context.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}

/// An API resource that is created from a payload and patched by later ones.
///
/// `Data` is the raw payload type. Its fields are optional wherever the API
/// may leave them out of a partial update: a field present in the payload
/// overwrites the current value, an absent one keeps it. Patching twice with
/// the same payload leaves the entity as it was after the first patch.
pub trait Entity: Clone + Serialize {
    /// The raw payload this entity is built and patched from.
    type Data;

    /// Construct the entity from its first payload.
    fn from_data(ctx: &Context, data: &Self::Data) -> Self;

    /// Merge a (possibly partial) payload into this entity.
    fn patch(&mut self, data: &Self::Data);

    /// Patch this entity, returning a snapshot of how it looked before.
    fn update(&mut self, data: &Self::Data) -> Self {
        let previous = self.clone();
        self.patch(data);
        previous
    }

    /// A plain JSON snapshot of the entity's fields.
    ///
    /// Internal handles are left out. Implementors add computed properties
    /// with [`flatten`].
    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Types that can be turned into their JSON wire form.
pub trait ToJson {
    /// The JSON form of this value.
    fn to_json(&self) -> Value;
}

impl ToJson for Value {
    fn to_json(&self) -> Value {
        self.clone()
    }
}

impl ToJson for Object {
    fn to_json(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl<T: ToJson + ?Sized> ToJson for &T {
    fn to_json(&self) -> Value {
        (**self).to_json()
    }
}

/// Add computed properties to a serialized entity.
///
/// Properties with a `null` value replace nothing and are skipped, so getters
/// returning `None` do not show up in the snapshot.
pub fn flatten<I>(entity: &impl Serialize, props: I) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    let mut value = serde_json::to_value(entity).unwrap_or(Value::Null);
    if let Value::Object(ref mut map) = value {
        for (key, prop) in props {
            if !prop.is_null() {
                map.insert(key.to_owned(), prop);
            }
        }
    }
    value
}

// Random **NECESSARY** utilities

/// Overwrite a field if the patch carries a value for it.
pub(crate) fn update_field<T: Clone>(item: &mut T, patch: &Option<T>) {
    if let Some(value) = patch.clone() {
        *item = value;
    }
}

/// Fill an optional field if the patch carries a value for it.
pub(crate) fn update_field_opt<T: Clone>(item: &mut Option<T>, patch: &Option<T>) {
    if let Some(value) = patch.clone() {
        *item = Some(value);
    }
}

/// Overwrite a nullable field if the patch mentions it, clearing it on `null`.
pub(crate) fn update_nullable<T: Clone>(item: &mut Option<T>, patch: &Option<Option<T>>) {
    if let Some(value) = patch.clone() {
        *item = value;
    }
}

/// The file extension for a CDN image hash: animated hashes start with `a_`.
pub(crate) fn image_ext(hash: &str) -> &'static str {
    if hash.starts_with("a_") {
        "gif"
    } else {
        "png"
    }
}

/// Format a color integer as `#rrggbb`.
pub(crate) fn hex_color(color: u32) -> String {
    format!("#{:06x}", color)
}
