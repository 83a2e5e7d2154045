//! Background job demo: submit batches of sleeping tasks, pick up
//! finished results mid-flight, shut down, then restart with a new batch.
//!
//! Run with:
//! ```sh
//! RUST_LOG=debug cargo run --example background_jobs
//! ```

use std::thread;
use std::time::Duration;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use offload::{Scheduler, SchedulerConfig, SchedulerError, Task};

fn sleepy(id: String, millis: u64) -> Task {
    Task::from_fn(id.clone(), move || async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(json!({ "job": id, "slept_ms": millis }))
    })
}

fn main() -> Result<(), SchedulerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let scheduler = Scheduler::new(
        SchedulerConfig::new()
            .with_scheduler_id("demo")
            .with_max_concurrency(3),
    );

    scheduler.submit_many((1u64..=6).map(|i| sleepy(format!("batch-a-{i}"), i * 100)))?;

    // Results become available as tasks finish, well before shutdown.
    thread::sleep(Duration::from_millis(250));
    let early = scheduler.drain(0);
    println!("finished mid-flight: {} job(s)", early.len());
    for (id, outcome) in &early {
        println!("  {id}: {outcome:?}");
    }

    scheduler.shutdown(None)?;
    let rest = scheduler.drain(0);
    println!("finished by shutdown: {} job(s)", rest.len());

    // A stopped scheduler accepts new work on a fresh worker context.
    scheduler.submit(sleepy("batch-b-1".into(), 50))?;
    scheduler.shutdown(None)?;
    println!("after restart: {:?}", scheduler.fetch("batch-b-1"));

    Ok(())
}
