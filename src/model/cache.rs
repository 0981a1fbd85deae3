//! Shared lookup tables for entities, keyed by identifier.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock};

use tracing::trace;

use super::{AnyChannel, ChannelId, Context, EmojiId, Entity, Guild, GuildEmoji, GuildId, User, UserId};

/// A map of entities which can be shared between threads.
///
/// Lookups hand out clones; use [`Collection::add`] to insert or patch.
pub struct Collection<K, V> {
    items: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for Collection<K, V> {
    fn default() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Copy, V: Clone> Collection<K, V> {
    /// Look up an entity by identifier.
    pub fn get(&self, id: &K) -> Option<V> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Whether an entity with this identifier is cached.
    pub fn contains(&self, id: &K) -> bool {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Insert an entity, replacing and returning any previous one.
    pub fn insert(&self, id: K, value: V) -> Option<V> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, value)
    }

    /// Remove an entity from the collection.
    pub fn remove(&self, id: &K) -> Option<V> {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// All cached entities matching a predicate.
    pub fn filter<P: Fn(&V) -> bool>(&self, predicate: P) -> Vec<V> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// The number of cached entities.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Copy + fmt::Debug, V: Entity> Collection<K, V> {
    /// Upsert by identifier.
    ///
    /// An entity already cached under `id` is patched in place with `data`;
    /// otherwise a new one is built from it. Either way the cached entity is
    /// returned.
    pub fn add(&self, ctx: &Context, id: K, data: &V::Data) -> V {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(&id) {
            Some(existing) => {
                trace!("patching cached entity {:?}", id);
                existing.patch(data);
                existing.clone()
            }
            None => {
                let entity = V::from_data(ctx, data);
                items.insert(id, entity.clone());
                entity
            }
        }
    }
}

impl<K, V> fmt::Debug for Collection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("Collection").field("len", &len).finish()
    }
}

/// The entity caches a [`Context`] carries.
#[derive(Debug, Default)]
pub struct Cache {
    /// Guilds by ID.
    pub guilds: Collection<GuildId, Guild>,
    /// Channels of every kind, threads included, by ID.
    pub channels: Collection<ChannelId, AnyChannel>,
    /// Users by ID.
    pub users: Collection<UserId, User>,
    /// Guild emojis by ID.
    pub emojis: Collection<EmojiId, GuildEmoji>,
}
