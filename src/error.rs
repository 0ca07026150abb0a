//! Error types for the object pool, the event hub and configuration.
//!
//! Every condition the pool or hub can report is a variant here. Some of
//! them are warnings in nature (a duplicate subscription, a publish nobody
//! listens to) but they still travel through `Err` so callers can react
//! programmatically. [`Severity`] tells them apart.

use serde::Serialize;

/// How serious a reported condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Non-fatal, the operation was a no-op.
    Warning,
    /// The request was rejected.
    Error,
    /// An internal invariant is broken. Should never be observed.
    Defect,
}

/// Errors reported by [`crate::pool::ObjectPool`].
///
/// # Error Code Ranges
///
/// | Code | Variant              | Severity |
/// |------|----------------------|----------|
/// | 1001 | `AlreadyInitialized` | Error    |
/// | 1002 | `Exhausted`          | Warning  |
/// | 1003 | `EmptyPool`          | Error    |
/// | 1004 | `IndexOutOfRange`    | Error    |
/// | 1005 | `SlotMissing`        | Defect   |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// `initialize` was called on a pool that already holds instances.
    #[error("cannot initialize a pool already in use ({current_size} instances)")]
    AlreadyInitialized {
        /// Number of instances held when the call was rejected.
        current_size: usize,
    },

    /// Every instance is active and the pool may not grow.
    #[error("pool exhausted: all {max_size} instances are active")]
    Exhausted {
        /// Capacity the pool is pinned to.
        max_size: usize,
    },

    /// The pool holds no instances and cannot grow.
    #[error("empty pool")]
    EmptyPool,

    /// Requested slot lies outside `0..size`.
    #[error("slot index {index} out of range for pool of size {size}")]
    IndexOutOfRange {
        /// Requested slot.
        index: usize,
        /// Current pool size.
        size: usize,
    },

    /// Slot index is in range but nothing is stored there.
    #[error("no instance stored at slot {index} (pool invariant broken)")]
    SlotMissing {
        /// Requested slot.
        index: usize,
    },
}

impl PoolError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::AlreadyInitialized { .. } => 1001,
            Self::Exhausted { .. } => 1002,
            Self::EmptyPool => 1003,
            Self::IndexOutOfRange { .. } => 1004,
            Self::SlotMissing { .. } => 1005,
        }
    }

    /// Returns the severity of this condition.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Exhausted { .. } => Severity::Warning,
            Self::AlreadyInitialized { .. } | Self::EmptyPool | Self::IndexOutOfRange { .. } => {
                Severity::Error
            }
            Self::SlotMissing { .. } => Severity::Defect,
        }
    }

    /// Returns `true` for warning-severity conditions.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self.severity(), Severity::Warning)
    }

    /// Logs the condition at the level matching its severity and hands it
    /// back for returning.
    pub(crate) fn reported(self) -> Self {
        match self.severity() {
            Severity::Warning => tracing::warn!(code = self.error_code(), "{self}"),
            Severity::Error => tracing::error!(code = self.error_code(), "{self}"),
            Severity::Defect => tracing::error!(code = self.error_code(), defect = true, "{self}"),
        }
        self
    }
}

/// Errors and warnings reported by [`crate::hub::EventHub`].
///
/// # Error Code Ranges
///
/// | Code | Variant                 | Severity |
/// |------|-------------------------|----------|
/// | 2001 | `InvalidTopic`          | Error    |
/// | 2002 | `InvalidCallback`       | Error    |
/// | 2101 | `DuplicateSubscription` | Warning  |
/// | 2102 | `NoSubscribers`         | Warning  |
/// | 2103 | `TopicNotFound`         | Warning  |
/// | 2104 | `CallbackNotFound`      | Warning  |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// Topic name was empty.
    #[error("empty topic name")]
    InvalidTopic,

    /// The subscriber's target no longer exists.
    #[error("subscriber for topic `{topic}` has no live target")]
    InvalidCallback {
        /// Topic the call referred to.
        topic: String,
    },

    /// The subscriber is already registered under the topic.
    #[error("already subscribed to topic `{topic}`")]
    DuplicateSubscription {
        /// Topic the call referred to.
        topic: String,
    },

    /// Nothing is subscribed to the published topic.
    #[error("no subscribers for topic `{topic}`")]
    NoSubscribers {
        /// Topic the call referred to.
        topic: String,
    },

    /// Unsubscribe referred to an unknown topic.
    #[error("topic `{topic}` not found")]
    TopicNotFound {
        /// Topic the call referred to.
        topic: String,
    },

    /// Unsubscribe referred to a subscriber the topic does not hold.
    #[error("subscriber not registered under topic `{topic}`")]
    CallbackNotFound {
        /// Topic the call referred to.
        topic: String,
    },
}

impl HubError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidTopic => 2001,
            Self::InvalidCallback { .. } => 2002,
            Self::DuplicateSubscription { .. } => 2101,
            Self::NoSubscribers { .. } => 2102,
            Self::TopicNotFound { .. } => 2103,
            Self::CallbackNotFound { .. } => 2104,
        }
    }

    /// Returns the severity of this condition.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::InvalidTopic | Self::InvalidCallback { .. } => Severity::Error,
            Self::DuplicateSubscription { .. }
            | Self::NoSubscribers { .. }
            | Self::TopicNotFound { .. }
            | Self::CallbackNotFound { .. } => Severity::Warning,
        }
    }

    /// Returns `true` for warning-severity conditions.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self.severity(), Severity::Warning)
    }

    /// Logs the condition at the level matching its severity and hands it
    /// back for returning.
    pub(crate) fn reported(self) -> Self {
        match self.severity() {
            Severity::Warning => tracing::warn!(code = self.error_code(), "{self}"),
            Severity::Error | Severity::Defect => {
                tracing::error!(code = self.error_code(), "{self}");
            }
        }
        self
    }
}

/// Configuration value present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Variable is set to a value that cannot be interpreted.
    #[error("invalid value `{value}` for {key}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Raw value found.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_codes_are_in_pool_range() {
        let errors = [
            PoolError::AlreadyInitialized { current_size: 1 },
            PoolError::Exhausted { max_size: 2 },
            PoolError::EmptyPool,
            PoolError::IndexOutOfRange { index: 3, size: 2 },
            PoolError::SlotMissing { index: 0 },
        ];
        for e in &errors {
            assert!((1000..2000).contains(&e.error_code()), "{e}");
        }
    }

    #[test]
    fn slot_missing_is_a_defect() {
        assert_eq!(
            PoolError::SlotMissing { index: 4 }.severity(),
            Severity::Defect
        );
        assert!(PoolError::Exhausted { max_size: 1 }.is_warning());
        assert!(!PoolError::EmptyPool.is_warning());
    }

    #[test]
    fn hub_warnings_and_errors_are_split() {
        assert!(!HubError::InvalidTopic.is_warning());
        assert!(
            !HubError::InvalidCallback {
                topic: "t".to_string()
            }
            .is_warning()
        );
        assert!(
            HubError::NoSubscribers {
                topic: "t".to_string()
            }
            .is_warning()
        );
        assert!(
            HubError::DuplicateSubscription {
                topic: "t".to_string()
            }
            .is_warning()
        );
    }

    #[test]
    fn display_mentions_topic() {
        let e = HubError::TopicNotFound {
            topic: "score".to_string(),
        };
        assert!(e.to_string().contains("score"));
        assert_eq!(e.error_code(), 2103);
    }
}
