//! Slot-indexed pool of reusable instances.
//!
//! [`ObjectPool`] keeps every instance in a `BTreeMap` keyed by slot index,
//! so the idle scan in [`ObjectPool::get_available`] visits slots in
//! creation order. Slots are contiguous from 0 and never reassigned while
//! the pool is alive.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::Poolable;
use crate::error::PoolError;

/// Producer of fresh instances, invoked on initial population and on
/// on-demand growth.
pub type Factory<T> = Box<dyn FnMut() -> T + Send>;

/// A pool behind a single per-instance lock, for multi-threaded hosts.
pub type SharedPool<T> = Arc<Mutex<ObjectPool<T>>>;

/// Construction parameters for an [`ObjectPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Instances created up front. `None` defers population to
    /// [`ObjectPool::initialize`].
    pub initial_size: Option<usize>,
    /// Capacity; values below 1 are clamped to 1.
    pub max_size: usize,
    /// Whether the pool may grow past `max_size`.
    pub can_resize: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: None,
            max_size: 1,
            can_resize: false,
        }
    }
}

/// Point-in-time summary of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Number of instances held.
    pub current_size: usize,
    /// Current capacity.
    pub max_size: usize,
    /// Instances currently in use.
    pub active: usize,
    /// Instances ready to be handed out.
    pub idle: usize,
    /// Whether the pool may grow.
    pub can_resize: bool,
}

/// Pool of reusable [`Poolable`] instances.
///
/// # Growth
///
/// Growth is lazy. Only [`ObjectPool::get_available`] creates instances
/// after population, and only when no idle instance exists. An empty pool
/// never grows and reports [`PoolError::EmptyPool`] instead. A fixed pool
/// fills up to `max_size`; a resizable pool keeps going and advances
/// `max_size` so it never falls below the current size.
///
/// # Thread Safety
///
/// All operations take `&mut self`. Wrap the pool with
/// [`ObjectPool::into_shared`] when several threads need it.
pub struct ObjectPool<T> {
    slots: BTreeMap<usize, T>,
    factory: Factory<T>,
    max_size: usize,
    can_resize: bool,
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("current_size", &self.slots.len())
            .field("max_size", &self.max_size)
            .field("can_resize", &self.can_resize)
            .finish_non_exhaustive()
    }
}

impl<T: Poolable> ObjectPool<T> {
    /// Creates an empty pool. Populate it later with
    /// [`ObjectPool::initialize`].
    ///
    /// `max_size` is clamped to a minimum of 1.
    #[must_use]
    pub fn new<F>(factory: F, max_size: usize, can_resize: bool) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        Self {
            slots: BTreeMap::new(),
            factory: Box::new(factory),
            max_size: max_size.max(1),
            can_resize,
        }
    }

    /// Creates a pool and immediately populates it with `initial_size`
    /// idle instances (clamped into `[1, max_size]`).
    #[must_use]
    pub fn with_initial<F>(
        factory: F,
        initial_size: usize,
        max_size: usize,
        can_resize: bool,
    ) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        let mut pool = Self::new(factory, max_size, can_resize);
        let size = pool.clamp_size(initial_size);
        pool.populate(size);
        pool
    }

    /// Creates a pool from a [`PoolConfig`].
    #[must_use]
    pub fn from_config<F>(factory: F, config: &PoolConfig) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        match config.initial_size {
            Some(size) => Self::with_initial(factory, size, config.max_size, config.can_resize),
            None => Self::new(factory, config.max_size, config.can_resize),
        }
    }

    /// Populates an empty pool with `size` idle instances, clamped into
    /// `[1, max_size]`. Returns the number created.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::AlreadyInitialized`] if the pool already holds
    /// instances. Nothing is created in that case.
    pub fn initialize(&mut self, size: usize) -> Result<usize, PoolError> {
        if !self.slots.is_empty() {
            return Err(PoolError::AlreadyInitialized {
                current_size: self.slots.len(),
            }
            .reported());
        }
        let size = self.clamp_size(size);
        self.populate(size);
        Ok(size)
    }

    /// Returns the first idle instance in slot order, creating one if none
    /// is idle and the pool may still grow.
    ///
    /// Only a populated pool grows. An empty pool (never initialized, or
    /// torn down) must be [`initialize`](Self::initialize)d first, whatever
    /// `can_resize` says. Once populated, the pool grows one instance at a
    /// time up to `max_size`, and past it when `can_resize` is set.
    ///
    /// The instance is returned idle; activating it is up to the caller
    /// (see [`ObjectPool::spawn`]).
    ///
    /// # Errors
    ///
    /// - [`PoolError::EmptyPool`] if the pool holds no instances.
    /// - [`PoolError::Exhausted`] if every instance is active, the pool is
    ///   at capacity and resizing is disabled.
    pub fn get_available(&mut self) -> Result<&mut T, PoolError> {
        if self.slots.is_empty() {
            return Err(PoolError::EmptyPool.reported());
        }

        let idle = self
            .slots
            .iter()
            .find(|(_, item)| !item.is_active())
            .map(|(&slot, _)| slot);

        let slot = match idle {
            Some(slot) => slot,
            None => {
                if self.slots.len() >= self.max_size && !self.can_resize {
                    return Err(PoolError::Exhausted {
                        max_size: self.max_size,
                    }
                    .reported());
                }
                let slot = self.create_slot();
                if self.slots.len() > self.max_size {
                    self.max_size = self.slots.len();
                    tracing::debug!(max_size = self.max_size, "pool grew past capacity");
                }
                slot
            }
        };
        self.slot_mut(slot)
    }

    /// Hands out an instance and activates it for `duration`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ObjectPool::get_available`].
    pub fn spawn(&mut self, duration: Duration) -> Result<&mut T, PoolError> {
        let item = self.get_available()?;
        item.activate(duration);
        Ok(item)
    }

    /// Returns the instance at `index`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::IndexOutOfRange`] if `index >= current_size`.
    /// - [`PoolError::SlotMissing`] if the index is in range but empty,
    ///   which means the slot invariant is broken.
    pub fn get(&self, index: usize) -> Result<&T, PoolError> {
        self.check_range(index)?;
        self.slots
            .get(&index)
            .ok_or_else(|| PoolError::SlotMissing { index }.reported())
    }

    /// Mutable variant of [`ObjectPool::get`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`ObjectPool::get`].
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, PoolError> {
        self.check_range(index)?;
        self.slot_mut(index)
    }

    /// Forwards an external tick to every active instance and returns how
    /// many of them went idle during it.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let mut expired = 0;
        for item in self.slots.values_mut().filter(|item| item.is_active()) {
            item.tick(elapsed);
            if !item.is_active() {
                expired += 1;
            }
        }
        expired
    }

    /// Deactivates every instance.
    pub fn deactivate_all(&mut self) {
        for item in self.slots.values_mut() {
            item.deactivate();
        }
    }

    /// Number of active instances.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.values().filter(|item| item.is_active()).count()
    }

    /// Number of idle instances.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.slots.len() - self.active_count()
    }

    /// Returns a summary of the pool.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let active = self.active_count();
        PoolStats {
            current_size: self.slots.len(),
            max_size: self.max_size,
            active,
            idle: self.slots.len() - active,
            can_resize: self.can_resize,
        }
    }

    /// Clamps a requested population size into `[1, max_size]`.
    fn clamp_size(&self, size: usize) -> usize {
        size.clamp(1, self.max_size)
    }

    /// Creates `size` idle instances.
    fn populate(&mut self, size: usize) {
        for _ in 0..size {
            self.create_slot();
        }
        tracing::debug!(size, max_size = self.max_size, "pool initialized");
    }

    /// Produces one idle instance at the next slot index.
    fn create_slot(&mut self) -> usize {
        let slot = self.slots.len();
        let mut item = (self.factory)();
        item.deactivate();
        item.set_slot(slot);
        self.slots.insert(slot, item);
        tracing::trace!(slot, "pool slot created");
        slot
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut T, PoolError> {
        self.slots
            .get_mut(&index)
            .ok_or_else(|| PoolError::SlotMissing { index }.reported())
    }
}

impl<T> ObjectPool<T> {
    /// Destroys every instance, highest slot first, leaving the pool empty
    /// and ready for [`ObjectPool::initialize`]. Returns the number
    /// destroyed.
    pub fn teardown(&mut self) -> usize {
        let count = self.slots.len();
        while let Some((_, item)) = self.slots.pop_last() {
            drop(item);
        }
        tracing::debug!(count, "pool torn down");
        count
    }

    /// Number of instances held.
    #[must_use]
    pub fn current_size(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the pool holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current capacity. Never decreases.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Whether the pool may grow past its capacity.
    #[must_use]
    pub const fn can_resize(&self) -> bool {
        self.can_resize
    }

    /// Iterates over all instances in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.values()
    }

    /// Moves the pool behind a per-instance lock.
    #[must_use]
    pub fn into_shared(self) -> SharedPool<T> {
        Arc::new(Mutex::new(self))
    }

    fn check_range(&self, index: usize) -> Result<(), PoolError> {
        if index >= self.slots.len() {
            return Err(PoolError::IndexOutOfRange {
                index,
                size: self.slots.len(),
            }
            .reported());
        }
        Ok(())
    }
}
