//! Forwarding hub topics into async code.
//!
//! [`EventHub::subscribe_channel`] registers a subscriber that clones each
//! payload into a [`tokio::sync::mpsc`] unbounded channel, so a task can
//! `await` events instead of reacting inside the publisher's call stack.

use tokio::sync::mpsc;

use super::{EventHub, Subscriber};
use crate::error::HubError;

impl<P> EventHub<P>
where
    P: Clone + Send + 'static,
{
    /// Subscribes a channel forwarder to `topic`.
    ///
    /// Returns the registered subscriber and the receiving end. The
    /// receiver yields payloads in publish order and closes once the
    /// subscriber has been unsubscribed and every clone of it dropped.
    /// Dropping the receiver early turns the forwarder into a no-op.
    ///
    /// # Errors
    ///
    /// Same conditions as [`EventHub::subscribe`], except that a fresh
    /// forwarder can never be a duplicate or dead.
    pub fn subscribe_channel(
        &self,
        topic: &str,
    ) -> Result<(Subscriber<P>, mpsc::UnboundedReceiver<P>), HubError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let subscriber = Subscriber::new(move |payload: &P| {
            if sender.send(payload.clone()).is_err() {
                tracing::trace!("channel subscriber has no receiver");
            }
        });
        self.subscribe(topic, &subscriber)?;
        Ok((subscriber, receiver))
    }
}
