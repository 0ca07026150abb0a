//! gamekit-demo entry point.
//!
//! Drives an object pool and the global event hub from a fixed-rate tick
//! loop, the way a game's frame loop would.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use gamekit_core::config::{DemoConfig, LogFormat};
use gamekit_core::hub::{EventHub, HubClient, Payload};
use gamekit_core::pool::{ActivityTimer, ObjectPool, Poolable};

const SPAWNED: &str = "pool.spawned";
const EXPIRED: &str = "pool.expired";

/// Pooled projectile with a lifetime.
#[derive(Debug, Default)]
struct Projectile {
    slot: usize,
    timer: ActivityTimer,
}

impl Poolable for Projectile {
    fn slot(&self) -> usize {
        self.slot
    }

    fn set_slot(&mut self, slot: usize) {
        self.slot = slot;
    }

    fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    fn is_expiry_suppressed(&self) -> bool {
        self.timer.is_suppressed()
    }

    fn set_expiry_suppressed(&mut self, suppressed: bool) {
        self.timer.set_suppressed(suppressed);
    }

    fn activate(&mut self, duration: Duration) {
        self.timer.activate(duration);
    }

    fn deactivate(&mut self) {
        self.timer.deactivate();
    }

    fn tick(&mut self, elapsed: Duration) {
        if self.timer.tick(elapsed) {
            self.deactivate();
        }
    }
}

/// Counts expirations reported through the hub.
#[derive(Debug, Default)]
struct ExpiryCounter {
    total: AtomicUsize,
}

impl ExpiryCounter {
    fn on_expired(&self, payload: &Payload) {
        let count = payload.get("count").and_then(Payload::as_u64).unwrap_or(0);
        self.total
            .fetch_add(usize::try_from(count).unwrap_or(0), Ordering::Relaxed);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DemoConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
    tracing::info!(?config, "starting gamekit-demo");

    let hub = EventHub::global();

    // Async consumer of spawn events
    let (spawn_subscriber, mut spawned) = hub.subscribe_channel(SPAWNED)?;
    let listener = tokio::spawn(async move {
        let mut seen = 0_usize;
        while let Some(event) = spawned.recv().await {
            seen += 1;
            tracing::debug!(%event, "spawn observed");
        }
        seen
    });

    // Synchronous observer of expirations
    let counter = Arc::new(ExpiryCounter::default());
    let expiry_subscriber = counter.observe(EXPIRED, ExpiryCounter::on_expired)?;

    let mut pool = ObjectPool::from_config(Projectile::default, &config.pool);
    let mut interval = tokio::time::interval(config.tick);

    for frame in 0..config.ticks {
        interval.tick().await;

        let expired = pool.advance(config.tick);
        if expired > 0 {
            hub.publish(EXPIRED, &json!({ "frame": frame, "count": expired }))?;
        }

        if frame % config.spawn_every == 0 {
            match pool.spawn(config.active_for) {
                Ok(projectile) => {
                    let slot = projectile.slot();
                    hub.publish(SPAWNED, &json!({ "frame": frame, "slot": slot }))?;
                }
                Err(err) if err.is_warning() => {
                    tracing::info!(frame, "no projectile available this frame");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    let stats = serde_json::to_string(&pool.stats())?;
    tracing::info!(%stats, "final pool state");

    // Closing the channel ends the listener task.
    hub.unsubscribe(SPAWNED, &spawn_subscriber)?;
    drop(spawn_subscriber);
    let observed = listener.await?;
    counter.unobserve(EXPIRED, &expiry_subscriber)?;

    let destroyed = pool.teardown();
    tracing::info!(
        spawned = observed,
        expired = counter.total.load(Ordering::Relaxed),
        destroyed,
        "demo finished"
    );

    Ok(())
}
