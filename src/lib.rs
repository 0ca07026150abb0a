//! # gamekit-core
//!
//! Engine-agnostic building blocks for game loops: a slot-indexed object
//! pool and a named-topic event hub.
//!
//! Both are synchronous, pull-based data structures. Rendering, input and
//! timing stay with the host, which calls in once per tick.
//!
//! ## Architecture
//!
//! ```text
//! Host game loop (per-frame tick)
//!     │
//!     ├── ObjectPool<T: Poolable> (pool/)
//!     │       factory ─► slots 0..n ─► get_available / spawn / advance
//!     │
//!     └── EventHub<P> (hub/)
//!             topic ─► [Subscriber, ...] ─► publish (snapshot, in order)
//!             └── subscribe_channel ─► tokio mpsc for async consumers
//! ```
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use gamekit_core::hub::{EventHub, Subscriber};
//! use gamekit_core::pool::{ActivityTimer, ObjectPool, Poolable};
//!
//! #[derive(Default)]
//! struct Bullet { slot: usize, timer: ActivityTimer }
//!
//! impl Poolable for Bullet {
//!     fn slot(&self) -> usize { self.slot }
//!     fn set_slot(&mut self, slot: usize) { self.slot = slot; }
//!     fn is_active(&self) -> bool { self.timer.is_active() }
//!     fn remaining(&self) -> Duration { self.timer.remaining() }
//!     fn is_expiry_suppressed(&self) -> bool { self.timer.is_suppressed() }
//!     fn set_expiry_suppressed(&mut self, s: bool) { self.timer.set_suppressed(s); }
//!     fn activate(&mut self, d: Duration) { self.timer.activate(d); }
//!     fn deactivate(&mut self) { self.timer.deactivate(); }
//! }
//!
//! let mut pool = ObjectPool::with_initial(Bullet::default, 2, 2, false);
//! assert!(pool.spawn(Duration::from_millis(100)).is_ok());
//!
//! let hub: EventHub<u32> = EventHub::new();
//! let on_score = Subscriber::new(|points: &u32| assert_eq!(*points, 10));
//! assert!(hub.subscribe("score", &on_score).is_ok());
//! assert_eq!(hub.publish("score", &10), Ok(1));
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod pool;
