//! # Subscription store - the routing table.
//!
//! Maps message `TypeId` → [`Token`] → ordered descriptor list, plus a
//! global identity index used for duplicate detection across **all** types
//! and tokens.
//!
//! ## Rules
//! - One mutex serializes every mutation and snapshot read; it is never
//!   held while a handler executes (the dispatcher copies the bucket out
//!   first).
//! - An identity may appear at most once in the whole store; `add` rejects
//!   duplicates before touching the buckets.
//! - `remove` clears the identity from every token bucket under its
//!   declared type and prunes entries left empty.
//! - `snapshot` returns an owned copy, never a live view: registrations
//!   and removals that race a publish affect only later snapshots.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SubscribeError;
use crate::handlers::HandlerDescriptor;
use crate::messages::Token;

type Buckets = HashMap<Token, Vec<HandlerDescriptor>>;

#[derive(Default)]
struct StoreInner {
    /// Routing table: declared message type → delivery group → descriptors
    /// in registration order.
    routes: HashMap<TypeId, Buckets>,
    /// Identity → declared type, spanning every bucket. The declared type
    /// lets `remove` go straight to the right buckets.
    identities: HashMap<Arc<str>, TypeId>,
}

/// Lock-guarded routing table with a global identity index.
pub(crate) struct SubscriptionStore {
    inner: Mutex<StoreInner>,
}

impl SubscriptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// Places a descriptor into the (type, token) bucket.
    ///
    /// Fails with [`SubscribeError::AlreadySubscribed`] if the descriptor's
    /// identity is present anywhere in the store, regardless of type or
    /// token.
    pub fn add(&self, token: Token, descriptor: HandlerDescriptor) -> Result<(), SubscribeError> {
        let name = descriptor.name_arc();
        let message_type = descriptor.message_type();

        let mut inner = self.inner.lock();
        if inner.identities.contains_key(name.as_ref()) {
            return Err(SubscribeError::AlreadySubscribed {
                handler: name.to_string(),
            });
        }

        inner.identities.insert(name, message_type);
        inner
            .routes
            .entry(message_type)
            .or_default()
            .entry(token)
            .or_default()
            .push(descriptor);
        Ok(())
    }

    /// Removes an identity from every token bucket under its declared type
    /// and from the identity index. Returns `false` if it was not present.
    pub fn remove(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let Some(message_type) = inner.identities.remove(name) else {
            return false;
        };

        let type_now_empty = if let Some(buckets) = inner.routes.get_mut(&message_type) {
            for descriptors in buckets.values_mut() {
                descriptors.retain(|d| d.name() != name);
            }
            buckets.retain(|_, descriptors| !descriptors.is_empty());
            buckets.is_empty()
        } else {
            false
        };
        if type_now_empty {
            inner.routes.remove(&message_type);
        }
        true
    }

    /// Point-in-time copy of the (type, token) bucket, in registration
    /// order. Empty when nothing matches.
    pub fn snapshot(&self, message_type: TypeId, token: &Token) -> Vec<HandlerDescriptor> {
        let inner = self.inner.lock();
        inner
            .routes
            .get(&message_type)
            .and_then(|buckets| buckets.get(token))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of identities currently subscribed (all types, all tokens).
    pub fn handler_count(&self) -> usize {
        self.inner.lock().identities.len()
    }
}
