//! Convenience access to the process-wide hub from any value.

use std::sync::Arc;

use super::{EventHub, Payload, Subscriber};
use crate::error::HubError;

/// Posting and observing through [`EventHub::global`].
///
/// Implemented for every type, so any value can post events without
/// holding a hub reference:
///
/// ```
/// use gamekit_core::hub::HubClient;
///
/// struct Player;
/// let result = Player.post("player.jumped", &serde_json::json!({ "height": 2 }));
/// // Nobody is listening yet.
/// assert!(result.is_err_and(|e| e.is_warning()));
/// ```
pub trait HubClient {
    /// Publishes `payload` on the global hub.
    ///
    /// # Errors
    ///
    /// Same conditions as [`EventHub::publish`].
    fn post(&self, topic: &str, payload: &Payload) -> Result<usize, HubError> {
        EventHub::global().publish(topic, payload)
    }

    /// Publishes a `null` payload on the global hub.
    ///
    /// # Errors
    ///
    /// Same conditions as [`EventHub::publish`].
    fn post_signal(&self, topic: &str) -> Result<usize, HubError> {
        EventHub::global().publish_signal(topic)
    }

    /// Subscribes one of this value's methods to `topic` on the global hub.
    ///
    /// The value is held weakly; returns the subscriber needed for
    /// [`HubClient::unobserve`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`EventHub::subscribe`].
    fn observe(
        self: &Arc<Self>,
        topic: &str,
        react: fn(&Self, &Payload),
    ) -> Result<Subscriber<Payload>, HubError>
    where
        Self: Sized + Send + Sync + 'static,
    {
        let subscriber = Subscriber::observer(self, react);
        EventHub::global().subscribe(topic, &subscriber)?;
        Ok(subscriber)
    }

    /// Removes a subscriber previously returned by [`HubClient::observe`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`EventHub::unsubscribe`].
    fn unobserve(&self, topic: &str, subscriber: &Subscriber<Payload>) -> Result<(), HubError> {
        EventHub::global().unsubscribe(topic, subscriber)
    }
}

impl<T: ?Sized> HubClient for T {}
