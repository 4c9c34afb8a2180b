//! # Spin Wheel Example
//!
//! Fills a selector wheel with names from the command line, spins it on the
//! tokio clock, and prints the winner.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example spin_wheel -- Alice Bob Carol Dave
//! ```

use queue_dashboard::{WheelAnimator, WheelConfig, WheelEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (mut animator, mut event_rx) = WheelAnimator::new(WheelConfig::default());

    for name in std::env::args().skip(1) {
        if !animator.add_segment(&name).await {
            tracing::warn!("Skipping blank or duplicate name {name:?}");
        }
    }

    {
        let wheel = animator.wheel();
        let wheel = wheel.lock().await;
        for segment in wheel.layout() {
            println!("{:<16} {}", segment.label, segment.color);
        }
    }

    if !animator.spin().await {
        println!("Add at least one name to spin the wheel.");
        return Ok(());
    }

    while let Some(event) = event_rx.recv().await {
        match event {
            WheelEvent::SpinStarted(params) => {
                tracing::info!(
                    "Spinning for {:.0} ms from {:.1} deg/tick",
                    params.total_ms,
                    params.angle_start
                );
            }
            WheelEvent::Frame { angle } => tracing::trace!(angle, "frame"),
            WheelEvent::Resolved(resolution) => {
                println!("{}", resolution.announcement());
                break;
            }
            WheelEvent::Cleared => break,
        }
    }

    Ok(())
}
