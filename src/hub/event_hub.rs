//! Named-topic registry with synchronous multicast dispatch.
//!
//! [`EventHub`] maps topic names to the ordered list of subscribers
//! registered under them. A topic exists only while it has at least one
//! subscriber.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;

use super::Subscriber;
use crate::error::HubError;

/// Payload carried by the process-wide hub.
pub type Payload = serde_json::Value;

/// Publish/subscribe hub keyed by topic name.
///
/// # Concurrency
///
/// The registry sits behind one `RwLock`. [`EventHub::publish`] copies the
/// topic's subscriber list under the read lock and invokes the copy with
/// no lock held, so subscribers may subscribe or unsubscribe from inside
/// their own callback. Such changes apply from the next publish on.
///
/// A subscriber that panics unwinds out of `publish`; the remaining
/// subscribers of that dispatch are not called.
pub struct EventHub<P = Payload> {
    topics: RwLock<HashMap<String, Vec<Subscriber<P>>>>,
}

impl<P> fmt::Debug for EventHub<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("topics", &self.topics.read().len())
            .finish()
    }
}

impl<P> Default for EventHub<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub<Payload> {
    /// Returns the process-wide hub, building it on first use.
    ///
    /// Prefer passing an explicit hub where possible; the global exists for
    /// code that cannot be handed one (see [`super::HubClient`]).
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<EventHub<Payload>> = OnceLock::new();
        GLOBAL.get_or_init(EventHub::new)
    }
}

impl<P> EventHub<P> {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `subscriber` under `topic`, after any existing ones.
    ///
    /// # Errors
    ///
    /// - [`HubError::InvalidTopic`] if `topic` is empty.
    /// - [`HubError::InvalidCallback`] if the subscriber's target is gone.
    /// - [`HubError::DuplicateSubscription`] (warning) if the subscriber is
    ///   already registered under `topic`. State is left unchanged.
    pub fn subscribe(&self, topic: &str, subscriber: &Subscriber<P>) -> Result<(), HubError> {
        validate_topic(topic)?;
        if !subscriber.is_alive() {
            return Err(HubError::InvalidCallback {
                topic: topic.to_owned(),
            }
            .reported());
        }

        let mut topics = self.topics.write();
        let list = topics.entry(topic.to_owned()).or_default();
        list.retain(Subscriber::is_alive);
        if list.contains(subscriber) {
            return Err(HubError::DuplicateSubscription {
                topic: topic.to_owned(),
            }
            .reported());
        }
        list.push(subscriber.clone());
        tracing::debug!(topic, subscriber = %subscriber.id(), count = list.len(), "subscribed");
        Ok(())
    }

    /// Invokes every subscriber of `topic` in subscription order and
    /// returns how many were called.
    ///
    /// Subscribers whose observer has been dropped are removed from the
    /// topic before dispatch and never called.
    ///
    /// # Errors
    ///
    /// - [`HubError::InvalidTopic`] if `topic` is empty.
    /// - [`HubError::NoSubscribers`] (warning) if no live subscriber is
    ///   registered under `topic`.
    pub fn publish(&self, topic: &str, payload: &P) -> Result<usize, HubError> {
        validate_topic(topic)?;

        let mut snapshot = self.topics.read().get(topic).cloned().unwrap_or_default();
        let registered = snapshot.len();
        snapshot.retain(Subscriber::is_alive);
        if snapshot.len() < registered {
            self.prune_topic(topic);
        }
        if snapshot.is_empty() {
            return Err(HubError::NoSubscribers {
                topic: topic.to_owned(),
            }
            .reported());
        }

        let mut delivered = 0;
        for subscriber in &snapshot {
            // An earlier callback may have dropped this observer.
            if subscriber.is_alive() {
                subscriber.call(payload);
                delivered += 1;
            }
        }
        tracing::trace!(topic, delivered, "published");
        Ok(delivered)
    }

    /// Publishes `P::default()`, for topics that carry no data.
    ///
    /// # Errors
    ///
    /// Same conditions as [`EventHub::publish`].
    pub fn publish_signal(&self, topic: &str) -> Result<usize, HubError>
    where
        P: Default,
    {
        self.publish(topic, &P::default())
    }

    /// Removes `subscriber` from `topic`. The topic itself is removed when
    /// its last subscriber leaves.
    ///
    /// # Errors
    ///
    /// - [`HubError::InvalidTopic`] if `topic` is empty.
    /// - [`HubError::InvalidCallback`] if the subscriber's target is gone.
    ///   Dead entries under `topic` are dropped all the same.
    /// - [`HubError::TopicNotFound`] (warning) if `topic` is unknown.
    /// - [`HubError::CallbackNotFound`] (warning) if the subscriber is not
    ///   registered under `topic`.
    pub fn unsubscribe(&self, topic: &str, subscriber: &Subscriber<P>) -> Result<(), HubError> {
        validate_topic(topic)?;
        if !subscriber.is_alive() {
            self.prune_topic(topic);
            return Err(HubError::InvalidCallback {
                topic: topic.to_owned(),
            }
            .reported());
        }

        let mut topics = self.topics.write();
        let Some(list) = topics.get_mut(topic) else {
            return Err(HubError::TopicNotFound {
                topic: topic.to_owned(),
            }
            .reported());
        };
        let Some(position) = list.iter().position(|s| s == subscriber) else {
            return Err(HubError::CallbackNotFound {
                topic: topic.to_owned(),
            }
            .reported());
        };
        list.remove(position);
        tracing::debug!(topic, subscriber = %subscriber.id(), "unsubscribed");

        if list.is_empty() {
            topics.remove(topic);
            tracing::debug!(topic, "topic removed");
        }
        Ok(())
    }

    /// Drops every dead subscriber from every topic and returns how many
    /// were removed.
    pub fn prune(&self) -> usize {
        let mut topics = self.topics.write();
        let mut removed = 0;
        topics.retain(|_, list| {
            let before = list.len();
            list.retain(Subscriber::is_alive);
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    /// Number of topics with at least one live subscriber.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics
            .read()
            .values()
            .filter(|list| any_alive(list))
            .count()
    }

    /// Returns `true` if `topic` has at least one live subscriber.
    #[must_use]
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.read().get(topic).is_some_and(|list| any_alive(list))
    }

    /// Number of live subscribers registered under `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .get(topic)
            .map_or(0, |list| list.iter().filter(|s| s.is_alive()).count())
    }

    /// Names of all topics with a live subscriber, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .topics
            .read()
            .iter()
            .filter(|(_, list)| any_alive(list))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// Removes every topic and subscriber.
    pub fn clear(&self) {
        self.topics.write().clear();
        tracing::debug!("hub cleared");
    }

    fn prune_topic(&self, topic: &str) {
        let mut topics = self.topics.write();
        let Some(list) = topics.get_mut(topic) else {
            return;
        };
        list.retain(Subscriber::is_alive);
        if list.is_empty() {
            topics.remove(topic);
            tracing::debug!(topic, "topic removed after pruning");
        }
    }
}

fn any_alive<P>(list: &[Subscriber<P>]) -> bool {
    list.iter().any(Subscriber::is_alive)
}

fn validate_topic(topic: &str) -> Result<(), HubError> {
    if topic.is_empty() {
        return Err(HubError::InvalidTopic.reported());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(log: &Log, name: &'static str) -> Subscriber<i64> {
        let log = Arc::clone(log);
        Subscriber::new(move |v: &i64| log.lock().push(format!("{name}({v})")))
    }

    #[test]
    fn dispatches_in_subscription_order() {
        let hub = EventHub::new();
        let log = Log::default();
        let a = recorder(&log, "A");
        let b = recorder(&log, "B");
        assert!(hub.subscribe("score", &a).is_ok());
        assert!(hub.subscribe("score", &b).is_ok());

        assert_eq!(hub.publish("score", &42), Ok(2));
        assert_eq!(*log.lock(), vec!["A(42)", "B(42)"]);
    }

    #[test]
    fn duplicate_subscription_is_rejected() {
        let hub = EventHub::new();
        let log = Log::default();
        let a = recorder(&log, "A");
        assert!(hub.subscribe("score", &a).is_ok());
        assert_eq!(
            hub.subscribe("score", &a.clone()),
            Err(HubError::DuplicateSubscription {
                topic: "score".to_string()
            })
        );
        assert_eq!(hub.subscriber_count("score"), 1);

        assert_eq!(hub.publish("score", &1), Ok(1));
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn same_subscriber_may_join_several_topics() {
        let hub = EventHub::new();
        let log = Log::default();
        let a = recorder(&log, "A");
        assert!(hub.subscribe("score", &a).is_ok());
        assert!(hub.subscribe("lives", &a).is_ok());
        assert_eq!(hub.topics(), vec!["lives", "score"]);
    }

    #[test]
    fn topics_are_case_sensitive() {
        let hub = EventHub::new();
        let a = recorder(&Log::default(), "A");
        assert!(hub.subscribe("Score", &a).is_ok());
        assert!(hub.publish("score", &1).is_err());
    }

    #[test]
    fn publish_without_subscribers_warns() {
        let hub: EventHub<i64> = EventHub::new();
        let Err(err) = hub.publish("nobody", &0) else {
            panic!("expected a warning");
        };
        assert!(err.is_warning());
        assert_eq!(
            err,
            HubError::NoSubscribers {
                topic: "nobody".to_string()
            }
        );
    }

    #[test]
    fn empty_topic_is_invalid_everywhere() {
        let hub = EventHub::new();
        let a = recorder(&Log::default(), "A");
        assert_eq!(hub.subscribe("", &a), Err(HubError::InvalidTopic));
        assert_eq!(hub.publish("", &0), Err(HubError::InvalidTopic));
        assert_eq!(hub.unsubscribe("", &a), Err(HubError::InvalidTopic));
        assert_eq!(hub.topic_count(), 0);
    }

    #[test]
    fn last_unsubscribe_removes_topic() {
        let hub = EventHub::new();
        let a = recorder(&Log::default(), "A");
        assert!(hub.subscribe("score", &a).is_ok());
        assert!(hub.unsubscribe("score", &a).is_ok());
        assert!(!hub.has_topic("score"));
        assert_eq!(
            hub.publish("score", &1),
            Err(HubError::NoSubscribers {
                topic: "score".to_string()
            })
        );
    }

    #[test]
    fn unsubscribe_keeps_topic_with_remaining_subscribers() {
        let hub = EventHub::new();
        let log = Log::default();
        let a = recorder(&log, "A");
        let b = recorder(&log, "B");
        assert!(hub.subscribe("score", &a).is_ok());
        assert!(hub.subscribe("score", &b).is_ok());
        assert!(hub.unsubscribe("score", &a).is_ok());
        assert_eq!(hub.publish("score", &3), Ok(1));
        assert_eq!(*log.lock(), vec!["B(3)"]);
    }

    #[test]
    fn unsubscribe_unknown_topic_and_callback() {
        let hub = EventHub::new();
        let a = recorder(&Log::default(), "A");
        let b = recorder(&Log::default(), "B");
        assert_eq!(
            hub.unsubscribe("score", &a),
            Err(HubError::TopicNotFound {
                topic: "score".to_string()
            })
        );
        assert!(hub.subscribe("score", &a).is_ok());
        assert_eq!(
            hub.unsubscribe("score", &b),
            Err(HubError::CallbackNotFound {
                topic: "score".to_string()
            })
        );
        assert_eq!(hub.subscriber_count("score"), 1);
    }

    struct Listener {
        hits: Mutex<u32>,
    }

    impl Listener {
        fn hit(&self, _: &i64) {
            *self.hits.lock() += 1;
        }
    }

    #[test]
    fn dead_observer_is_invalid_and_pruned() {
        let hub = EventHub::new();
        let listener = Arc::new(Listener {
            hits: Mutex::new(0),
        });
        let sub: Subscriber<i64> = Subscriber::observer(&listener, Listener::hit);
        assert!(hub.subscribe("tick", &sub).is_ok());
        assert_eq!(hub.publish("tick", &0), Ok(1));
        assert_eq!(*listener.hits.lock(), 1);

        drop(listener);
        assert_eq!(
            hub.subscribe("other", &sub),
            Err(HubError::InvalidCallback {
                topic: "other".to_string()
            })
        );
        assert!(!hub.has_topic("tick"));
        assert_eq!(hub.subscriber_count("tick"), 0);
        assert_eq!(hub.topic_count(), 0);
        assert!(hub.topics().is_empty());

        let silent = Err(HubError::NoSubscribers {
            topic: "tick".to_string(),
        });
        assert_eq!(hub.publish("tick", &0), silent);
        assert_eq!(hub.publish("tick", &0), silent);
        assert_eq!(hub.prune(), 0);
    }

    #[test]
    fn unsubscribing_dead_observer_still_drops_it() {
        let hub = EventHub::new();
        let listener = Arc::new(Listener {
            hits: Mutex::new(0),
        });
        let sub: Subscriber<i64> = Subscriber::observer(&listener, Listener::hit);
        assert!(hub.subscribe("tick", &sub).is_ok());
        drop(listener);

        assert_eq!(
            hub.unsubscribe("tick", &sub),
            Err(HubError::InvalidCallback {
                topic: "tick".to_string()
            })
        );
        assert_eq!(hub.prune(), 0);
    }

    #[test]
    fn dead_observer_beside_live_one_is_skipped() {
        let hub = EventHub::new();
        let log = Log::default();
        let listener = Arc::new(Listener {
            hits: Mutex::new(0),
        });
        let dead: Subscriber<i64> = Subscriber::observer(&listener, Listener::hit);
        let live = recorder(&log, "L");
        assert!(hub.subscribe("tick", &dead).is_ok());
        assert!(hub.subscribe("tick", &live).is_ok());
        drop(listener);

        assert_eq!(hub.subscriber_count("tick"), 1);
        assert_eq!(hub.publish("tick", &3), Ok(1));
        assert_eq!(*log.lock(), vec!["L(3)"]);
        assert_eq!(hub.prune(), 0);
        assert!(hub.has_topic("tick"));
    }

    #[test]
    fn prune_sweeps_all_topics() {
        let hub = EventHub::new();
        let listener = Arc::new(Listener {
            hits: Mutex::new(0),
        });
        let sub: Subscriber<i64> = Subscriber::observer(&listener, Listener::hit);
        let keep = recorder(&Log::default(), "K");
        assert!(hub.subscribe("a", &sub).is_ok());
        assert!(hub.subscribe("b", &sub).is_ok());
        assert!(hub.subscribe("b", &keep).is_ok());
        drop(listener);

        assert_eq!(hub.prune(), 2);
        assert_eq!(hub.topics(), vec!["b"]);
    }

    #[test]
    fn subscribe_during_publish_applies_next_time() {
        let hub = Arc::new(EventHub::new());
        let log = Log::default();
        let late = recorder(&log, "late");

        let hub_ref = Arc::clone(&hub);
        let late_ref = late.clone();
        let joiner = Subscriber::new(move |_: &i64| {
            let _ = hub_ref.subscribe("score", &late_ref);
        });
        assert!(hub.subscribe("score", &joiner).is_ok());

        assert_eq!(hub.publish("score", &1), Ok(1));
        assert!(log.lock().is_empty());

        assert_eq!(hub.publish("score", &2), Ok(2));
        assert_eq!(*log.lock(), vec!["late(2)"]);
    }

    #[test]
    fn unsubscribe_during_publish_does_not_skip_others() {
        let hub = Arc::new(EventHub::new());
        let log = Log::default();
        let b = recorder(&log, "B");

        let hub_ref = Arc::clone(&hub);
        let b_ref = b.clone();
        let remover = Subscriber::new(move |_: &i64| {
            let _ = hub_ref.unsubscribe("score", &b_ref);
        });
        assert!(hub.subscribe("score", &remover).is_ok());
        assert!(hub.subscribe("score", &b).is_ok());

        // B was in the snapshot, so it still hears this one.
        assert_eq!(hub.publish("score", &1), Ok(2));
        assert_eq!(hub.publish("score", &2), Ok(1));
        assert_eq!(*log.lock(), vec!["B(1)"]);
    }

    #[test]
    fn panicking_subscriber_stops_dispatch_but_hub_survives() {
        let hub = EventHub::new();
        let log = Log::default();
        let boom = Subscriber::new(|_: &i64| panic!("subscriber failure"));
        let after = recorder(&log, "after");
        assert!(hub.subscribe("score", &boom).is_ok());
        assert!(hub.subscribe("score", &after).is_ok());

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            hub.publish("score", &1)
        }));
        assert!(outcome.is_err());
        assert!(log.lock().is_empty());

        assert!(hub.unsubscribe("score", &boom).is_ok());
        assert_eq!(hub.publish("score", &2), Ok(1));
    }

    #[test]
    fn publish_signal_sends_default_payload() {
        let hub = EventHub::new();
        let log = Log::default();
        assert!(hub.subscribe("reset", &recorder(&log, "R")).is_ok());
        assert_eq!(hub.publish_signal("reset"), Ok(1));
        assert_eq!(*log.lock(), vec!["R(0)"]);
    }

    #[test]
    fn clear_empties_the_registry() {
        let hub = EventHub::new();
        assert!(hub.subscribe("a", &recorder(&Log::default(), "A")).is_ok());
        hub.clear();
        assert_eq!(hub.topic_count(), 0);
    }

    #[test]
    fn global_hub_is_a_single_instance() {
        assert!(std::ptr::eq(EventHub::global(), EventHub::global()));
    }
}
