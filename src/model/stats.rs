//! Descriptive statistics over timestamped die outcomes.
//!
//! [`StatBlock::compute`] is a pure function of its input: it never fails
//! and performs no I/O. Every order-dependent aggregate (median, mode, the
//! two ordered sequences) is fully determined by the input values and their
//! timestamps, with ties on time resolved by input order.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// ===== DatedResult =====

/// One die outcome and the instant it was rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatedResult {
    /// When the outcome was rolled.
    pub date: DateTime<Utc>,
    /// Face shown.
    pub result: i64,
}

impl DatedResult {
    /// Pair an outcome with its instant.
    pub fn new(date: DateTime<Utc>, result: i64) -> Self {
        Self { date, result }
    }
}

// ===== StatBlock =====

/// Aggregate statistics for one player's outcomes.
///
/// # Invariants
///
/// - `ordered_by_time.len() == ordered_by_roll.len() == count`
/// - `ordered_by_roll` is non-decreasing
/// - `total` is the sum of all outcomes (two's-complement wrapping); `mean == total / count`
///   when `count > 0`
/// - an empty input yields `count == 0` and every other field at its zero value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatBlock {
    /// Number of outcomes.
    pub count: usize,
    /// Middle outcome by value; mean of the middle pair for even counts.
    pub median: f64,
    /// `total / count`.
    pub mean: f64,
    /// The single most frequent value, if exactly one value has the highest frequency.
    pub mode: Option<i64>,
    /// Smallest outcome.
    pub min: i64,
    /// Largest outcome.
    pub max: i64,
    /// Sum of all outcomes, wrapping on overflow.
    pub total: i64,
    /// Occurrences per distinct outcome, in ascending value order.
    pub by_roll: BTreeMap<i64, usize>,
    /// Outcomes sorted by value.
    pub ordered_by_roll: Vec<i64>,
    /// Outcomes sorted by timestamp; simultaneous outcomes keep input order.
    pub ordered_by_time: Vec<i64>,
}

impl StatBlock {
    /// Compute the statistics block for a collection of dated outcomes.
    pub fn compute(mut results: Vec<DatedResult>) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        // stable: equal timestamps keep their original relative order
        results.sort_by_key(|r| r.date);

        let count = results.len();
        let mut ordered_by_time = Vec::with_capacity(count);
        let mut by_roll: BTreeMap<i64, usize> = BTreeMap::new();
        let mut min = results[0].result;
        let mut max = results[0].result;
        let mut total: i64 = 0;

        for dated in &results {
            let value = dated.result;
            min = min.min(value);
            max = max.max(value);
            total = total.wrapping_add(value);
            ordered_by_time.push(value);
            *by_roll.entry(value).or_default() += 1;
        }

        let mean = total as f64 / count as f64;

        let mut ordered_by_roll = Vec::with_capacity(count);
        for (&value, &occurrences) in &by_roll {
            ordered_by_roll.extend(std::iter::repeat_n(value, occurrences));
        }

        let mode = mode_of(&by_roll);
        let median = median_of(&ordered_by_roll);

        Self {
            count,
            median,
            mean,
            mode,
            min,
            max,
            total,
            by_roll,
            ordered_by_roll,
            ordered_by_time,
        }
    }

    /// Whether a unique mode exists.
    pub fn has_mode(&self) -> bool {
        self.mode.is_some()
    }

    /// How many times `value` was rolled.
    pub fn occurrences(&self, value: i64) -> usize {
        self.by_roll.get(&value).copied().unwrap_or(0)
    }
}

/// Ascending scan for the mode.
///
/// A value becomes the mode when its frequency strictly exceeds the largest
/// seen so far. Matching the largest frequency clears the mode; a later,
/// strictly larger frequency sets it again.
fn mode_of(by_roll: &BTreeMap<i64, usize>) -> Option<i64> {
    let mut largest = 0;
    let mut mode = None;
    for (&value, &occurrences) in by_roll {
        if occurrences == largest {
            mode = None;
        } else if occurrences > largest {
            largest = occurrences;
            mode = Some(value);
        }
    }
    mode
}

/// Median of a value-sorted, non-empty sequence.
fn median_of(sorted: &[i64]) -> f64 {
    let count = sorted.len();
    let half = count / 2;
    if count % 2 == 1 {
        sorted[half] as f64
    } else {
        (sorted[half - 1] as f64 + sorted[half] as f64) / 2.0
    }
}
