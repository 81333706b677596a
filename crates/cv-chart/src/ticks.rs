//! Axis tick generation: "nice" linear steps and calendar-aligned dates.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Step between linear ticks: 1, 2 or 5 times a power of ten, chosen so that
/// roughly `count` ticks span `[start, stop]`.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    if count == 0 || !start.is_finite() || !stop.is_finite() || start == stop {
        return 0.0;
    }
    let raw = (stop - start).abs() / count as f64;
    let power = raw.log10().floor();
    let error = raw / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * 10f64.powf(power)
}

/// Evenly spaced round values within `[start, stop]` (either order), ascending.
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };
    let step = tick_step(lo, hi, count);
    if step <= 0.0 || !step.is_finite() {
        return Vec::new();
    }

    // Sub-unit steps divide by the inverse so 0.1-style values stay exact.
    let (first, last, scale) = if step < 1.0 {
        let inverse = (1.0 / step).round();
        ((lo * inverse).ceil(), (hi * inverse).floor(), Tick::Divide(inverse))
    } else {
        ((lo / step).ceil(), (hi / step).floor(), Tick::Multiply(step))
    };
    // Steps near the subnormal range overflow the inverse; never emit more
    // than a small multiple of the requested count.
    if !first.is_finite() || !last.is_finite() || last - first > (count * 10) as f64 {
        return Vec::new();
    }
    (first as i64..=last as i64)
        .map(|i| match scale {
            Tick::Divide(inverse) => i as f64 / inverse,
            Tick::Multiply(step) => i as f64 * step,
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Tick {
    Divide(f64),
    Multiply(f64),
}

/// Decimal places needed to print values on a grid of `step`.
pub fn tick_precision(step: f64) -> usize {
    if step <= 0.0 || !step.is_finite() {
        return 0;
    }
    let digits = -step.log10().floor();
    if digits > 0.0 {
        digits as usize
    } else {
        0
    }
}

/// Calendar interval between time ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInterval {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
}

impl TimeInterval {
    const CANDIDATES: [TimeInterval; 11] = [
        TimeInterval::Days(1),
        TimeInterval::Days(2),
        TimeInterval::Weeks(1),
        TimeInterval::Weeks(2),
        TimeInterval::Months(1),
        TimeInterval::Months(3),
        TimeInterval::Months(6),
        TimeInterval::Years(1),
        TimeInterval::Years(2),
        TimeInterval::Years(5),
        TimeInterval::Years(10),
    ];

    /// Approximate length in days, used only to pick an interval.
    pub fn approx_days(&self) -> f64 {
        match *self {
            TimeInterval::Days(n) => n as f64,
            TimeInterval::Weeks(n) => 7.0 * n as f64,
            TimeInterval::Months(n) => 30.0 * n as f64,
            TimeInterval::Years(n) => 365.0 * n as f64,
        }
    }

    /// Smallest interval yielding at most `count` ticks over `span_days`.
    pub fn for_span(span_days: f64, count: usize) -> TimeInterval {
        let count = count.max(1) as f64;
        Self::CANDIDATES
            .iter()
            .copied()
            .find(|i| span_days / i.approx_days() <= count)
            .unwrap_or(TimeInterval::Years(10))
    }

    /// True if `date` falls on a boundary of this interval.
    pub fn is_boundary(&self, date: NaiveDate) -> bool {
        match *self {
            TimeInterval::Days(n) => date.num_days_from_ce() % n as i32 == 0,
            TimeInterval::Weeks(n) => {
                date.weekday() == Weekday::Sun && (date.num_days_from_ce() / 7) % n as i32 == 0
            }
            TimeInterval::Months(n) => date.day() == 1 && date.month0() % n == 0,
            TimeInterval::Years(n) => date.ordinal() == 1 && date.year() % n as i32 == 0,
        }
    }

    /// strftime pattern for tick labels at this interval.
    pub fn label_format(&self) -> &'static str {
        match self {
            TimeInterval::Days(_) | TimeInterval::Weeks(_) => "%b %d",
            TimeInterval::Months(_) => "%b %Y",
            TimeInterval::Years(_) => "%Y",
        }
    }
}

/// Calendar-aligned dates within `[start, end]`, at most about `count` of them.
pub fn time_ticks(start: NaiveDate, end: NaiveDate, count: usize) -> (TimeInterval, Vec<NaiveDate>) {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    let span = (hi - lo).num_days() as f64;
    let interval = TimeInterval::for_span(span, count);
    let ticks = lo
        .iter_days()
        .take_while(|d| *d <= hi)
        .filter(|d| interval.is_boundary(*d))
        .collect();
    (interval, ticks)
}
