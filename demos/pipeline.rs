//! # Micro-batching pipeline
//!
//! Demonstrates batchvisor features:
//! - Several producers feeding one bounded queue with `timed_put`
//! - A supervised micro-batch drainer with an idle heartbeat
//! - Respawn after a failing item (every 37th order is rejected)
//! - Lifecycle and batch events read from the supervisor bus
//! - Graceful shutdown on Ctrl+C: the reader drains the queue before stopping
//!
//! Run with `RUST_LOG=batchvisor=debug cargo run --example pipeline`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use batchvisor::{
    BoundedQueue, DrainConfig, EventKind, Queue, Supervisor, SupervisorConfig, TaskError,
    micro_batch_drainer_with_heartbeat, timed_put,
};

#[derive(Debug)]
struct Order {
    id: u64,
    producer: usize,
}

/// Puts an order every few milliseconds until cancelled.
async fn producer(
    idx: usize,
    queue: BoundedQueue<Order>,
    next_id: Arc<AtomicU64>,
    ctx: CancellationToken,
) {
    let pace = Duration::from_millis(5 + idx as u64 * 3);
    while !ctx.is_cancelled() {
        let order = Order {
            id: next_id.fetch_add(1, Ordering::Relaxed),
            producer: idx,
        };
        if !timed_put(&queue, order, Duration::from_millis(200), &ctx).await {
            println!("📦 Producer {idx}: queue full or shutting down, order dropped");
        }
        tokio::select! {
            _ = tokio::time::sleep(pace) => {},
            _ = ctx.cancelled() => break,
        }
    }
    println!("📦 Producer {idx}: stopped");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("batchvisor=info")),
        )
        .init();

    let queue = BoundedQueue::<Order>::new(512);
    let sup = Supervisor::new(SupervisorConfig {
        grace: Duration::from_secs(10),
        ..SupervisorConfig::default()
    });

    let processed = Arc::new(AtomicU64::new(0));
    let reader = {
        let processed = Arc::clone(&processed);
        micro_batch_drainer_with_heartbeat(
            queue.clone(),
            move |order: Order| {
                if order.id % 37 == 36 {
                    return Err(TaskError::fail(format!(
                        "order {} from producer {} rejected",
                        order.id, order.producer
                    )));
                }
                processed.fetch_add(1, Ordering::Relaxed);
                Ok(())
            },
            || println!("💓 Reader: idle"),
        )
        .named("orders")
        .with_config(DrainConfig {
            max_batch: 50,
            idle_timeout: Duration::from_secs(2),
        })
        .with_bus(sup.bus().clone())
        .arc()
    };

    let mut events = sup.bus().subscribe();
    tokio::spawn(async move {
        while let Ok(ev) = events.recv().await {
            match ev.kind {
                EventKind::ReaderFailed => println!(
                    "🔁 {}: attempt {} failed ({}), respawning",
                    ev.reader.as_deref().unwrap_or("?"),
                    ev.attempt.unwrap_or(0),
                    ev.reason.as_deref().unwrap_or("")
                ),
                EventKind::BatchProcessed => {
                    println!("✅ Batch of {}", ev.batch_size.unwrap_or(0))
                }
                _ => {}
            }
        }
    });

    let handle = sup.supervise(&tokio::runtime::Handle::current(), reader, || {
        println!("🧹 Reader: cleanup")
    });

    let producers_ctx = CancellationToken::new();
    let next_id = Arc::new(AtomicU64::new(0));
    let producers: Vec<_> = (0..3)
        .map(|idx| {
            tokio::spawn(producer(
                idx,
                queue.clone(),
                Arc::clone(&next_id),
                producers_ctx.clone(),
            ))
        })
        .collect();

    println!("🚀 Pipeline running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    println!("🛑 Stopping producers");
    producers_ctx.cancel();
    for p in producers {
        p.await?;
    }

    println!("🛑 Draining {} queued orders", queue.len().await);
    handle.shutdown().await?;

    println!(
        "🏁 Done: {} processed, {} produced",
        processed.load(Ordering::Relaxed),
        next_id.load(Ordering::Relaxed)
    );
    Ok(())
}
