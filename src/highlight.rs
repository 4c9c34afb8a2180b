//! Per-series highlight toggling for score charts.
//!
//! Each chart series is registered under a stable key with its original style.
//! Toggling swaps between that style and a highlight style, whose color is
//! drawn at random on the first toggle and reused afterwards.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;

/// Line width of a highlighted series.
pub const HIGHLIGHT_WIDTH: f32 = 4.0;

/// An opaque RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            r: rng.random(),
            g: rng.random(),
            b: rng.random(),
            a: 1.0,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// How a series is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    /// Any CSS color string.
    pub color: String,
    pub width: f32,
}

impl SeriesStyle {
    pub fn new(color: impl Into<String>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HighlightRecord {
    original: SeriesStyle,
    highlight: Option<SeriesStyle>,
    is_highlighted: bool,
}

impl HighlightRecord {
    fn current(&self) -> &SeriesStyle {
        match (&self.highlight, self.is_highlighted) {
            (Some(highlight), true) => highlight,
            _ => &self.original,
        }
    }
}

/// Highlight state for every registered series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesHighlights {
    records: BTreeMap<String, HighlightRecord>,
}

impl SeriesHighlights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` with its original style. Re-registering a key resets it.
    pub fn register(&mut self, key: impl Into<String>, original: SeriesStyle) {
        self.records.insert(
            key.into(),
            HighlightRecord {
                original,
                highlight: None,
                is_highlighted: false,
            },
        );
    }

    /// Toggle `key` using the thread-local RNG for a first highlight color.
    pub fn toggle(&mut self, key: &str) -> Option<&SeriesStyle> {
        self.toggle_with(key, &mut rand::rng())
    }

    /// Toggle `key` and return the style to draw it with now.
    ///
    /// `None` if `key` was never registered.
    pub fn toggle_with<R: Rng + ?Sized>(&mut self, key: &str, rng: &mut R) -> Option<&SeriesStyle> {
        let record = self.records.get_mut(key)?;
        if record.highlight.is_none() {
            record.highlight = Some(SeriesStyle::new(
                Rgba::random(rng).to_string(),
                HIGHLIGHT_WIDTH,
            ));
        }
        record.is_highlighted = !record.is_highlighted;
        Some(record.current())
    }

    pub fn is_highlighted(&self, key: &str) -> bool {
        self.records.get(key).is_some_and(|r| r.is_highlighted)
    }

    /// Style `key` should currently be drawn with.
    pub fn style(&self, key: &str) -> Option<&SeriesStyle> {
        self.records.get(key).map(HighlightRecord::current)
    }

    /// Keys currently highlighted, in key order.
    pub fn highlighted(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|(_, r)| r.is_highlighted)
            .map(|(k, _)| k.as_str())
    }
}
