//! Subscriber callbacks with well-defined identity.
//!
//! Closures cannot be compared, so every [`Subscriber`] carries a
//! [`SubscriberId`] minted at construction. Clones share the id, which is
//! what the hub compares for duplicate detection and removal.

use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

/// Unique identifier for a subscriber.
///
/// Wraps a UUID v4, generated once when the [`Subscriber`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(uuid::Uuid);

impl SubscriberId {
    /// Creates a new random `SubscriberId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that reacts to a published payload.
trait Reaction<P>: Send + Sync {
    fn react(&self, payload: &P);

    fn is_alive(&self) -> bool {
        true
    }
}

struct FnReaction<F>(F);

impl<P, F> Reaction<P> for FnReaction<F>
where
    F: Fn(&P) + Send + Sync,
{
    fn react(&self, payload: &P) {
        (self.0)(payload);
    }
}

struct ObserverReaction<O, P> {
    target: Weak<O>,
    react: fn(&O, &P),
}

impl<O, P> Reaction<P> for ObserverReaction<O, P>
where
    O: Send + Sync,
{
    fn react(&self, payload: &P) {
        if let Some(target) = self.target.upgrade() {
            (self.react)(&target, payload);
        }
    }

    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

/// A registered reaction to a topic.
///
/// Build one with [`Subscriber::new`] from a closure, or with
/// [`Subscriber::observer`] to react through a weakly held object.
/// Keep a clone around to unsubscribe later.
pub struct Subscriber<P> {
    id: SubscriberId,
    reaction: Arc<dyn Reaction<P>>,
}

impl<P: 'static> Subscriber<P> {
    /// Wraps a closure.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        Self {
            id: SubscriberId::new(),
            reaction: Arc::new(FnReaction(callback)),
        }
    }

    /// Reacts by calling `react` on `observer`, which is held weakly.
    ///
    /// Once every strong reference to the observer is gone, the subscriber
    /// is dead: the hub refuses it and prunes it on the next publish.
    pub fn observer<O>(observer: &Arc<O>, react: fn(&O, &P)) -> Self
    where
        O: Send + Sync + 'static,
    {
        Self {
            id: SubscriberId::new(),
            reaction: Arc::new(ObserverReaction {
                target: Arc::downgrade(observer),
                react,
            }),
        }
    }
}

impl<P> Subscriber<P> {
    /// Returns the identity shared by all clones of this subscriber.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns `false` once an observer's target has been dropped.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.reaction.is_alive()
    }

    /// Invokes the reaction.
    pub fn call(&self, payload: &P) {
        self.reaction.react(payload);
    }
}

impl<P> Clone for Subscriber<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            reaction: Arc::clone(&self.reaction),
        }
    }
}

impl<P> PartialEq for Subscriber<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for Subscriber<P> {}

impl<P> fmt::Debug for Subscriber<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
