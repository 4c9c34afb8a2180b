//! Clock-driven playback of [`Wheel`] spins.
//!
//! [`WheelAnimator`] owns a shared [`Wheel`] and, while a spin is active, a
//! background task that ticks it every [`WheelConfig::tick_ms`]. Each tick is
//! fed the time measured on the tokio clock since the previous one, so the
//! animation runs at wall speed in production and can be stepped
//! deterministically with a paused clock in tests.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::wheel::{Resolution, SpinParams, Wheel, WheelConfig};

const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Progress of a spin, as observed by the animator.
#[derive(Debug, Clone, PartialEq)]
pub enum WheelEvent {
    /// A spin began with these parameters.
    SpinStarted(SpinParams),
    /// The wheel moved; `angle` is the new rotation in radians.
    Frame { angle: f64 },
    /// The spin ended on a segment.
    Resolved(Resolution),
    /// The wheel was cleared, cancelling any spin.
    Cleared,
}

/// Handle over a shared wheel and its tick task.
pub struct WheelAnimator {
    wheel: Arc<Mutex<Wheel>>,
    config: WheelConfig,
    event_tx: mpsc::Sender<WheelEvent>,
    task: Option<JoinHandle<()>>,
}

impl WheelAnimator {
    /// Create an empty wheel and the receiver for its events.
    pub fn new(config: WheelConfig) -> (Self, mpsc::Receiver<WheelEvent>) {
        let (event_tx, event_rx) = mpsc::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);
        let animator = Self {
            wheel: Arc::new(Mutex::new(Wheel::new())),
            config,
            event_tx,
            task: None,
        };
        (animator, event_rx)
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    /// Shared access to the wheel, e.g. for a renderer reading [`Wheel::layout`].
    pub fn wheel(&self) -> Arc<Mutex<Wheel>> {
        Arc::clone(&self.wheel)
    }

    /// Copy of the current wheel state.
    pub async fn snapshot(&self) -> Wheel {
        self.wheel.lock().await.clone()
    }

    /// See [`Wheel::add_segment`].
    pub async fn add_segment(&self, label: &str) -> bool {
        self.wheel.lock().await.add_segment(label)
    }

    /// Start a spin with parameters drawn from the thread-local RNG.
    pub async fn spin(&mut self) -> bool {
        let params = SpinParams::random(&mut rand::rng(), &self.config);
        self.start_spin(params).await
    }

    /// Start a spin with parameters drawn from `rng`.
    pub async fn spin_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let params = SpinParams::random(rng, &self.config);
        self.start_spin(params).await
    }

    /// Start a spin with explicit parameters.
    ///
    /// Returns `false` if the wheel is empty or already spinning; the running
    /// spin is left untouched.
    pub async fn start_spin(&mut self, params: SpinParams) -> bool {
        if !self.wheel.lock().await.start_spin(params) {
            debug!("spin ignored");
            return false;
        }
        info!(
            angle_start = params.angle_start,
            total_ms = params.total_ms,
            "wheel spin started"
        );
        emit_event(&self.event_tx, WheelEvent::SpinStarted(params));

        if let Some(stale) = self.task.take() {
            stale.abort();
        }
        let period = Duration::from_millis(self.config.tick_ms.max(1));
        self.task = Some(tokio::spawn(tick_loop(
            Arc::clone(&self.wheel),
            period,
            self.event_tx.clone(),
        )));
        true
    }

    /// Clear the wheel and stop the tick task.
    pub async fn clear(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.wheel.lock().await.clear();
        emit_event(&self.event_tx, WheelEvent::Cleared);
    }

    pub async fn is_spinning(&self) -> bool {
        self.wheel.lock().await.is_spinning()
    }
}

impl std::fmt::Debug for WheelAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheelAnimator")
            .field("config", &self.config)
            .field("ticking", &self.task.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for WheelAnimator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn tick_loop(wheel: Arc<Mutex<Wheel>>, period: Duration, event_tx: mpsc::Sender<WheelEvent>) {
    let mut last = Instant::now();
    let mut interval = tokio::time::interval_at(last + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let now = interval.tick().await;
        // Microsecond precision keeps whole-millisecond periods exact.
        let delta_ms = now.duration_since(last).as_micros() as f64 / 1000.0;
        last = now;

        let (resolution, angle) = {
            let mut wheel = wheel.lock().await;
            if !wheel.is_spinning() {
                return;
            }
            let resolution = wheel.tick(delta_ms);
            (resolution, wheel.current_angle())
        };

        match resolution {
            Some(resolution) => {
                info!(index = resolution.index, label = %resolution.label, "wheel resolved");
                if event_tx.send(WheelEvent::Resolved(resolution)).await.is_err() {
                    debug!("wheel event receiver dropped before resolution");
                }
                return;
            }
            None => emit_event(&event_tx, WheelEvent::Frame { angle }),
        }
    }
}

/// Non-blocking send; frames are dropped when the consumer falls behind.
fn emit_event(event_tx: &mpsc::Sender<WheelEvent>, event: WheelEvent) {
    if let Err(mpsc::error::TrySendError::Full(event)) = event_tx.try_send(event) {
        warn!(?event, "wheel event channel full, dropping event");
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    async fn animator_with(labels: &[&str]) -> (WheelAnimator, mpsc::Receiver<WheelEvent>) {
        let (animator, events) = WheelAnimator::new(WheelConfig::default());
        for label in labels {
            assert!(animator.add_segment(label).await);
        }
        (animator, events)
    }

    #[tokio::test(start_paused = true)]
    async fn spin_plays_frames_then_resolves() {
        let (mut animator, mut events) = animator_with(&["A", "B", "C", "D"]).await;
        let params = SpinParams::new(15.0, 300.0);
        assert!(animator.start_spin(params).await);

        assert_eq!(events.recv().await, Some(WheelEvent::SpinStarted(params)));

        let mut frames = 0;
        let resolution = loop {
            match events.recv().await.unwrap() {
                WheelEvent::Frame { .. } => frames += 1,
                WheelEvent::Resolved(resolution) => break resolution,
                other => panic!("unexpected event {other:?}"),
            }
        };

        // Ten 30 ms ticks: nine move the wheel, the tenth resolves.
        assert_eq!(frames, 9);
        let wheel = animator.snapshot().await;
        assert!(!wheel.is_spinning());
        assert_eq!(wheel.selected_index(), Some(resolution.index));
        assert_eq!(wheel.result(), Some(resolution.announcement().as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn frames_match_pure_ticks() {
        let (mut animator, mut events) = animator_with(&["A", "B", "C"]).await;
        let params = SpinParams::new(12.0, 150.0);
        animator.start_spin(params).await;
        let _ = events.recv().await;

        let mut reference = Wheel::new();
        for label in ["A", "B", "C"] {
            reference.add_segment(label);
        }
        reference.start_spin(params);

        while let Some(WheelEvent::Frame { angle }) = events.recv().await {
            reference.tick(30.0);
            assert_eq!(angle, reference.current_angle());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn spin_while_spinning_is_ignored() {
        let (mut animator, mut events) = animator_with(&["A", "B"]).await;
        assert!(animator.start_spin(SpinParams::new(15.0, 5000.0)).await);
        let _ = events.recv().await;

        assert!(!animator.start_spin(SpinParams::new(19.0, 4000.0)).await);
        let state = animator.snapshot().await;
        assert_eq!(state.spin_state().unwrap().params.total_ms, 5000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_wheel_does_not_spin() {
        let (mut animator, _events) = WheelAnimator::new(WheelConfig::default());
        assert!(!animator.spin().await);
        assert!(!animator.is_spinning().await);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_spin() {
        let (mut animator, mut events) = animator_with(&["A", "B"]).await;
        animator.start_spin(SpinParams::new(15.0, 5000.0)).await;
        let _ = events.recv().await;
        assert!(matches!(events.recv().await, Some(WheelEvent::Frame { .. })));

        animator.clear().await;
        assert_eq!(events.recv().await, Some(WheelEvent::Cleared));
        assert_eq!(animator.snapshot().await, Wheel::new());

        let quiet = tokio::time::timeout(Duration::from_secs(1), events.recv()).await;
        assert!(quiet.is_err(), "no events after clear");
    }
}
