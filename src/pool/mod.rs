//! Object pool: reusable instances handed out without per-request
//! construction.
//!
//! An [`ObjectPool`] owns every instance its factory produces, keyed by a
//! stable slot index. Idle instances are reused before the pool grows, and
//! growth only ever happens on demand from [`ObjectPool::get_available`].

pub mod object_pool;
pub mod poolable;

pub use object_pool::{Factory, ObjectPool, PoolConfig, PoolStats, SharedPool};
pub use poolable::{ActivityTimer, Poolable};
