//! Event hub: named-topic publish/subscribe.
//!
//! Producers publish to a topic name, consumers subscribe to it, and
//! neither holds a reference to the other. [`EventHub`] is the registry;
//! [`Subscriber`] gives callbacks a comparable identity.

pub mod bridge;
pub mod client;
pub mod event_hub;
pub mod subscriber;

pub use client::HubClient;
pub use event_hub::{EventHub, Payload};
pub use subscriber::{Subscriber, SubscriberId};
