//! Selector wheel: a deterministic spin simulation over labeled segments.
//!
//! [`Wheel`] holds no timers and draws nothing. A spin is started with
//! [`Wheel::spin`] (random parameters) or [`Wheel::start_spin`] (explicit ones),
//! then advanced with [`Wheel::tick`]. Each tick moves the wheel by the eased
//! remaining angle until the spin's total duration has elapsed. At that point
//! the pointer position is resolved to exactly one segment.
//!
//! [`WheelAnimator`](crate::animation::WheelAnimator) drives `tick` on a real
//! (or paused) tokio clock.

use std::f64::consts::PI;
use std::fmt;
use std::ops::Range;

use rand::Rng;

/// Animation tick period in milliseconds.
pub const TICK_MS: u64 = 30;

/// Pointer sits at the bottom of the wheel.
pub const POINTER_OFFSET_DEGREES: f64 = 90.0;

const SATURATION: u8 = 80;
const LIGHTNESS: u8 = 60;

// ── Colors ──────────────────────────────────────────────────────────

/// HSL fill for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentColor {
    /// Degrees in `[0, 360)`.
    pub hue: f64,
    /// Percent.
    pub saturation: u8,
    /// Percent.
    pub lightness: u8,
}

impl SegmentColor {
    /// Color of segment `index` out of `total`, evenly spaced around the hue circle.
    pub fn evenly_spaced(index: usize, total: usize) -> Self {
        Self {
            hue: index as f64 * (360.0 / total as f64),
            saturation: SATURATION,
            lightness: LIGHTNESS,
        }
    }
}

impl fmt::Display for SegmentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

// ── Spin parameters ─────────────────────────────────────────────────

/// Ranges the random spin parameters are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelConfig {
    /// Tick period used by the animator.
    pub tick_ms: u64,
    /// Initial spin angle, in degrees per tick.
    pub angle_start: Range<f64>,
    /// Total spin duration in milliseconds.
    pub duration_ms: Range<f64>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            angle_start: 10.0..20.0,
            duration_ms: 4000.0..7000.0,
        }
    }
}

/// The two numbers that fully determine a spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinParams {
    /// Degrees added on the first tick; decays to zero over the spin.
    pub angle_start: f64,
    /// Total duration in milliseconds.
    pub total_ms: f64,
}

impl SpinParams {
    pub fn new(angle_start: f64, total_ms: f64) -> Self {
        Self {
            angle_start,
            total_ms,
        }
    }

    /// Draw parameters from `config`'s ranges.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, config: &WheelConfig) -> Self {
        Self {
            angle_start: sample(rng, &config.angle_start),
            total_ms: sample(rng, &config.duration_ms),
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, range: &Range<f64>) -> f64 {
    if range.start < range.end {
        rng.random_range(range.clone())
    } else {
        range.start
    }
}

/// Progress of an active spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinState {
    pub params: SpinParams,
    pub elapsed_ms: f64,
}

/// The outcome of a finished spin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub index: usize,
    pub label: String,
}

impl Resolution {
    /// Winner announcement shown under the wheel.
    pub fn announcement(&self) -> String {
        format!("🎉 You won: {}! 🎉", self.label)
    }
}

// ── Math ────────────────────────────────────────────────────────────

/// Cubic ease-out: `b + c·(u³ − 3u² + 3u)` with `u = t/d`.
pub fn ease_out(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let u = t / d;
    let ts = u * u;
    let tc = ts * u;
    b + c * (tc + -3.0 * ts + 3.0 * u)
}

/// Angular width of one segment, in radians.
pub fn segment_arc(count: usize) -> f64 {
    (PI * 2.0) / count as f64
}

/// Index of the segment under the pointer when the wheel rests at `angle`
/// radians. `None` for an empty wheel.
///
/// The degree conversions are spelled out (`x * 180 / π`) rather than using
/// `to_degrees`, which rounds differently in the last bit and can flip the
/// floor at segment boundaries.
pub fn resolve_index(angle: f64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let degrees = angle * 180.0 / PI + POINTER_OFFSET_DEGREES;
    let arc_degrees = segment_arc(count) * 180.0 / PI;
    let raw = ((360.0 - degrees % 360.0) / arc_degrees).floor();
    Some(raw as usize % count)
}

// ── Layout ──────────────────────────────────────────────────────────

/// Geometry of one segment for a canvas-like surface. Angles are radians,
/// measured clockwise from the positive x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLayout {
    pub label: String,
    pub color: SegmentColor,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Middle of the segment, where the label is drawn.
    pub label_angle: f64,
}

// ── Wheel ───────────────────────────────────────────────────────────

/// Wheel state: segments, colors, rotation, and the active spin if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wheel {
    segments: Vec<String>,
    colors: Vec<SegmentColor>,
    current_angle: f64,
    spin: Option<SpinState>,
    result: Option<String>,
}

impl Wheel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn colors(&self) -> &[SegmentColor] {
        &self.colors
    }

    /// Current rotation in radians. Carries over from one spin to the next.
    pub fn current_angle(&self) -> f64 {
        self.current_angle
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    pub fn spin_state(&self) -> Option<&SpinState> {
        self.spin.as_ref()
    }

    /// The last winner announcement.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn segment_arc(&self) -> Option<f64> {
        (!self.segments.is_empty()).then(|| segment_arc(self.segments.len()))
    }

    /// Add a segment. Blank labels and exact duplicates are ignored.
    ///
    /// Returns `true` if the label was added. Every segment's color is
    /// recomputed, since the hue spacing depends on the total count.
    pub fn add_segment(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.segments.iter().any(|s| s == label) {
            return false;
        }
        self.segments.push(label.to_string());

        let total = self.segments.len();
        self.colors = (0..total)
            .map(|i| SegmentColor::evenly_spaced(i, total))
            .collect();
        true
    }

    /// Remove every segment, reset rotation and result, and cancel any spin.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.colors.clear();
        self.result = None;
        self.current_angle = 0.0;
        self.spin = None;
    }

    /// Start a spin with random parameters.
    ///
    /// Returns `false` (and changes nothing) if a spin is already running or
    /// there are no segments.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &WheelConfig) -> bool {
        if !self.can_spin() {
            return false;
        }
        self.start_spin(SpinParams::random(rng, config))
    }

    /// Start a spin with explicit parameters. Same no-op rules as [`spin`](Self::spin).
    pub fn start_spin(&mut self, params: SpinParams) -> bool {
        if !self.can_spin() {
            return false;
        }
        self.spin = Some(SpinState {
            params,
            elapsed_ms: 0.0,
        });
        true
    }

    fn can_spin(&self) -> bool {
        self.spin.is_none() && !self.segments.is_empty()
    }

    /// Advance the active spin by `delta_ms`.
    ///
    /// Returns the resolution on the tick that reaches the total duration; that
    /// tick does not move the wheel. Without an active spin this does nothing.
    pub fn tick(&mut self, delta_ms: f64) -> Option<Resolution> {
        let spin = self.spin.as_mut()?;
        spin.elapsed_ms += delta_ms;

        let SpinParams {
            angle_start,
            total_ms,
        } = spin.params;
        if spin.elapsed_ms >= total_ms {
            return self.finish();
        }

        let remaining = angle_start - ease_out(spin.elapsed_ms, 0.0, angle_start, total_ms);
        self.current_angle += remaining * PI / 180.0;
        None
    }

    /// Index of the segment currently under the pointer.
    pub fn selected_index(&self) -> Option<usize> {
        resolve_index(self.current_angle, self.segments.len())
    }

    fn finish(&mut self) -> Option<Resolution> {
        self.spin = None;
        let index = self.selected_index()?;
        let label = self.segments.get(index)?.clone();
        let resolution = Resolution { index, label };
        self.result = Some(resolution.announcement());
        Some(resolution)
    }

    /// Segment geometry at the current rotation.
    pub fn layout(&self) -> Vec<SegmentLayout> {
        let Some(arc) = self.segment_arc() else {
            return Vec::new();
        };
        self.segments
            .iter()
            .zip(&self.colors)
            .enumerate()
            .map(|(i, (label, color))| {
                let start_angle = self.current_angle + i as f64 * arc;
                SegmentLayout {
                    label: label.clone(),
                    color: *color,
                    start_angle,
                    end_angle: start_angle + arc,
                    label_angle: start_angle + arc / 2.0,
                }
            })
            .collect()
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
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wheel_with(labels: &[&str]) -> Wheel {
        let mut wheel = Wheel::new();
        for label in labels {
            assert!(wheel.add_segment(label));
        }
        wheel
    }

    #[test]
    fn resting_at_zero_selects_last_of_four() {
        assert_eq!(resolve_index(0.0, 4), Some(3));

        let wheel = wheel_with(&["A", "B", "C", "D"]);
        assert_eq!(wheel.selected_index(), Some(3));
    }

    #[test]
    fn resolve_index_on_empty_wheel_is_none() {
        assert_eq!(resolve_index(1.0, 0), None);
    }

    #[test]
    fn quarter_turn_moves_pointer_back_one_segment() {
        // +90° puts the pointer at 180°; (360 - 180) / 90 = 2.
        assert_eq!(resolve_index(PI / 2.0, 4), Some(2));
        // +270° wraps to 0°; (360 - 0) / 90 = 4 -> 4 mod 4 = 0.
        assert_eq!(resolve_index(3.0 * PI / 2.0, 4), Some(0));
    }

    #[test]
    fn ease_out_reaches_full_change_at_end() {
        assert_eq!(ease_out(0.0, 0.0, 15.0, 5000.0), 0.0);
        assert!((ease_out(5000.0, 0.0, 15.0, 5000.0) - 15.0).abs() < 1e-12);
        assert!((ease_out(2500.0, 0.0, 8.0, 5000.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn colors_are_recomputed_for_every_add() {
        let mut wheel = wheel_with(&["A", "B"]);
        assert_eq!(wheel.colors()[1].hue, 180.0);

        wheel.add_segment("C");
        let hues: Vec<f64> = wheel.colors().iter().map(|c| c.hue).collect();
        assert_eq!(hues, vec![0.0, 120.0, 240.0]);
        assert_eq!(wheel.colors()[1].to_string(), "hsl(120, 80%, 60%)");
    }

    #[test]
    fn duplicate_and_blank_labels_are_ignored() {
        let mut wheel = wheel_with(&["Alice"]);
        assert!(!wheel.add_segment("Alice"));
        assert!(!wheel.add_segment("   "));
        assert!(!wheel.add_segment(""));
        assert!(wheel.add_segment("alice"));
        assert_eq!(wheel.segments(), ["Alice", "alice"]);
    }

    #[test]
    fn spin_on_empty_wheel_is_a_noop() {
        let mut wheel = Wheel::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(!wheel.spin(&mut rng, &WheelConfig::default()));
        assert!(!wheel.is_spinning());
    }

    #[test]
    fn second_spin_while_spinning_is_a_noop() {
        let mut wheel = wheel_with(&["A", "B"]);
        assert!(wheel.start_spin(SpinParams::new(12.0, 4500.0)));
        wheel.tick(30.0);
        let before = wheel.clone();

        assert!(!wheel.start_spin(SpinParams::new(19.0, 6000.0)));
        assert_eq!(wheel, before);
    }

    #[test]
    fn random_parameters_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = WheelConfig::default();
        for _ in 0..100 {
            let params = SpinParams::random(&mut rng, &config);
            assert!((10.0..20.0).contains(&params.angle_start));
            assert!((4000.0..7000.0).contains(&params.total_ms));
        }
    }

    #[test]
    fn spin_runs_to_completion_and_announces_winner() {
        let mut wheel = wheel_with(&["A", "B", "C", "D"]);
        wheel.start_spin(SpinParams::new(15.0, 4000.0));

        let mut ticks = 0;
        let mut last_angle = wheel.current_angle();
        let resolution = loop {
            ticks += 1;
            if let Some(resolution) = wheel.tick(TICK_MS as f64) {
                break resolution;
            }
            assert!(wheel.is_spinning());
            assert!(wheel.current_angle() >= last_angle);
            last_angle = wheel.current_angle();
        };

        // 4000 / 30 rounds up to 134 ticks; the last one only resolves.
        assert_eq!(ticks, 134);
        assert_eq!(wheel.current_angle(), last_angle);
        assert!(!wheel.is_spinning());
        assert_eq!(Some(resolution.index), resolve_index(last_angle, 4));
        assert_eq!(
            wheel.result(),
            Some(format!("🎉 You won: {}! 🎉", resolution.label).as_str())
        );
    }

    #[test]
    fn angle_persists_across_spins() {
        let mut wheel = wheel_with(&["A", "B", "C"]);
        wheel.start_spin(SpinParams::new(10.0, 300.0));
        while wheel.tick(30.0).is_none() {}
        let after_first = wheel.current_angle();
        assert!(after_first > 0.0);

        wheel.start_spin(SpinParams::new(10.0, 300.0));
        wheel.tick(30.0);
        assert!(wheel.current_angle() > after_first);
    }

    #[test]
    fn clear_resets_everything_mid_spin() {
        let mut wheel = wheel_with(&["A", "B"]);
        wheel.start_spin(SpinParams::new(15.0, 5000.0));
        wheel.tick(30.0);
        wheel.tick(30.0);

        wheel.clear();
        assert_eq!(wheel, Wheel::new());
        assert_eq!(wheel.tick(30.0), None);
    }

    #[test]
    fn layout_tiles_the_circle() {
        let wheel = wheel_with(&["A", "B", "C"]);
        let layout = wheel.layout();
        assert_eq!(layout.len(), 3);
        assert_eq!(layout[0].start_angle, 0.0);
        assert!((layout[2].end_angle - 2.0 * PI).abs() < 1e-12);
        assert!((layout[1].label_angle - PI).abs() < 1e-12);
        assert!(Wheel::new().layout().is_empty());
    }
}
