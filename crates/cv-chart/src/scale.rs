//! Coordinate mappings from data values to pixels, and the surface geometry
//! they map into.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cv_types::{ChartError, PlotRange};

use crate::group::{all_quotes, StrikeGroup};
use crate::measure::Measure;
use crate::ticks::{linear_ticks, tick_precision, tick_step, time_ticks};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const ZERO: Margins = Margins {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Size of a drawable surface and the data area inside its margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub full: Size,
    pub margin: Margins,
    pub data_area: Rect,
}

impl Extents {
    pub fn new(full: Size, margin: Margins) -> Self {
        let data_area = Rect {
            x: margin.left,
            y: margin.bottom,
            w: full.w - margin.left - margin.right,
            h: full.h - margin.top - margin.bottom,
        };
        Self {
            full,
            margin,
            data_area,
        }
    }

    /// 100x25 spark glyph for a single option, no margins.
    pub fn option_glyph() -> Self {
        Self::new(Size { w: 100.0, h: 25.0 }, Margins::ZERO)
    }

    /// 1200x800 chain graph.
    pub fn chain_graph() -> Self {
        Self::new(
            Size { w: 1200.0, h: 800.0 },
            Margins {
                top: 20.0,
                right: 80.0,
                bottom: 30.0,
                left: 50.0,
            },
        )
    }
}

/// Linear map from a numeric domain onto a pixel range.
///
/// Inputs outside the domain are extrapolated along the same line. A
/// zero-width domain maps everything to the middle of the range.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    round: bool,
    degenerate: Option<ChartError>,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            round: false,
            degenerate: None,
        }
    }

    /// Same mapping, rounded to whole pixels.
    pub fn rounded(mut self) -> Self {
        self.round = true;
        self
    }

    fn with_degenerate(mut self, reason: ChartError) -> Self {
        self.degenerate = Some(reason);
        self
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let px = if span == 0.0 || !span.is_finite() {
            (r0 + r1) / 2.0
        } else {
            r0 + (value - d0) / span * (r1 - r0)
        };
        if self.round {
            px.round()
        } else {
            px
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Set when the scale was built over no data and fell back to `[0, 1]`.
    pub fn degenerate(&self) -> Option<&ChartError> {
        self.degenerate.as_ref()
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate.is_some()
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        linear_ticks(self.domain.0, self.domain.1, count)
    }

    /// Ticks paired with labels printed at the precision of the tick step.
    pub fn labelled_ticks(&self, count: usize) -> Vec<(f64, String)> {
        let precision = tick_precision(tick_step(self.domain.0, self.domain.1, count));
        self.ticks(count)
            .into_iter()
            .map(|v| (v, format!("{v:.precision$}")))
            .collect()
    }
}

/// Linear map from calendar dates onto a pixel range.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScale {
    domain: (NaiveDate, NaiveDate),
    range: (f64, f64),
    degenerate: Option<ChartError>,
}

impl TimeScale {
    pub fn new(domain: (NaiveDate, NaiveDate), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            degenerate: None,
        }
    }

    pub fn apply(&self, date: NaiveDate) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = (d1 - d0).num_days();
        if span == 0 {
            return (r0 + r1) / 2.0;
        }
        let offset = (date - d0).num_days() as f64;
        r0 + offset / span as f64 * (r1 - r0)
    }

    pub fn domain(&self) -> (NaiveDate, NaiveDate) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn degenerate(&self) -> Option<&ChartError> {
        self.degenerate.as_ref()
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate.is_some()
    }

    pub fn ticks(&self, count: usize) -> Vec<NaiveDate> {
        time_ticks(self.domain.0, self.domain.1, count).1
    }

    /// Calendar-aligned ticks with labels formatted for their interval.
    pub fn labelled_ticks(&self, count: usize) -> Vec<(NaiveDate, String)> {
        let (interval, dates) = time_ticks(self.domain.0, self.domain.1, count);
        let fmt = interval.label_format();
        dates
            .into_iter()
            .map(|d| (d, d.format(fmt).to_string()))
            .collect()
    }
}

/// Day zero and day one of the Unix epoch: the `[0, 1]` fallback for time.
fn degenerate_time_domain() -> (NaiveDate, NaiveDate) {
    let zero = NaiveDate::default();
    (zero, zero + Duration::days(1))
}

/// Underlying price → glyph x pixel, rounded.
pub fn price_scale(plot_range: PlotRange, data_area: Rect) -> LinearScale {
    LinearScale::new(
        (plot_range.start, plot_range.end),
        (data_area.x, data_area.x + data_area.w),
    )
    .rounded()
}

/// Expiry date → x pixel over the span of every grouped quote.
pub fn time_scale(groups: &[StrikeGroup], data_area: Rect) -> TimeScale {
    let range = (0.0, data_area.w);
    let mut dates = all_quotes(groups).map(|q| q.expiry_date);
    let Some(first) = dates.next() else {
        warn!("Time scale built over no quotes, using [0, 1] domain");
        let mut scale = TimeScale::new(degenerate_time_domain(), range);
        scale.degenerate = Some(ChartError::EmptySeriesDomain {
            scale: "time".to_string(),
        });
        return scale;
    };
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    debug!("Time domain {} .. {}", min, max);
    TimeScale::new((min, max), range)
}

/// Measure value → y pixel, inverted so larger values plot higher.
pub fn measure_scale(
    groups: &[StrikeGroup],
    measure: &dyn Measure,
    reference_price: f64,
    data_area: Rect,
) -> LinearScale {
    let range = (data_area.h, 0.0);
    let max = all_quotes(groups)
        .map(|q| measure.extract(q, reference_price))
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    match max {
        None => {
            warn!("{} scale built over no quotes, using [0, 1] domain", measure.name());
            LinearScale::new((0.0, 1.0), range).with_degenerate(ChartError::EmptySeriesDomain {
                scale: measure.name().to_string(),
            })
        }
        Some(max) if max <= 0.0 => {
            debug!("{} maximum is {}, using [0, 1] domain", measure.name(), max);
            LinearScale::new((0.0, 1.0), range)
        }
        Some(max) => LinearScale::new((0.0, max), range),
    }
}

/// The 20-colour categorical palette used for series.
pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Categorical key → colour, assigned in first-seen key order and cycling
/// through the palette.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    keys: Vec<String>,
    palette: &'static [&'static str],
}

impl ColorScale {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_palette(keys, &CATEGORY20)
    }

    pub fn with_palette<I, S>(keys: I, palette: &'static [&'static str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref();
            if !ordered.iter().any(|k| k == key) {
                ordered.push(key.to_string());
            }
        }
        Self {
            keys: ordered,
            palette,
        }
    }

    /// Colour for `key`. Keys outside the domain get a slot derived from the
    /// key text, so repeated lookups still agree.
    pub fn color(&self, key: &str) -> &'static str {
        if self.palette.is_empty() {
            return "#000000";
        }
        let slot = match self.keys.iter().position(|k| k == key) {
            Some(idx) => idx,
            None => key
                .bytes()
                .fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize)),
        };
        self.palette[slot % self.palette.len()]
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::MeasureRegistry;
    use chrono::{TimeZone, Utc};
    use cv_types::Quote;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn group(key: &str, points: &[(NaiveDate, f64)]) -> StrikeGroup {
        StrikeGroup {
            key: key.to_string(),
            series: points
                .iter()
                .map(|(expiry, ask)| Quote {
                    strike_price: 100.0,
                    display_strike_price: key.to_string(),
                    expiry_date: *expiry,
                    ask_price: *ask,
                    bid_price: 0.0,
                    last_price: *ask,
                })
                .collect(),
        }
    }

    #[test]
    fn test_extents() {
        let glyph = Extents::option_glyph();
        assert_eq!(glyph.data_area, Rect { x: 0.0, y: 0.0, w: 100.0, h: 25.0 });

        let graph = Extents::chain_graph();
        assert_eq!(graph.data_area.w, 1070.0);
        assert_eq!(graph.data_area.h, 750.0);
        assert_eq!(graph.data_area.x, 50.0);
    }

    #[test]
    fn test_price_scale_rounds() {
        let scale = price_scale(PlotRange::new(90.0, 120.0), Extents::option_glyph().data_area);
        assert_eq!(scale.apply(90.0), 0.0);
        assert_eq!(scale.apply(120.0), 100.0);
        assert_eq!(scale.apply(100.0), 33.0);
        assert_eq!(scale.apply(105.0), 50.0);
    }

    #[test]
    fn test_price_scale_out_of_domain_extrapolates() {
        let scale = price_scale(PlotRange::new(100.0, 200.0), Extents::option_glyph().data_area);
        assert_eq!(scale.apply(50.0), -50.0);
        assert_eq!(scale.apply(250.0), 150.0);
    }

    #[test]
    fn test_zero_width_domain() {
        let scale = price_scale(PlotRange::new(100.0, 100.0), Extents::option_glyph().data_area);
        assert_eq!(scale.apply(100.0), 50.0);
        assert_eq!(scale.apply(3.0), 50.0);
    }

    #[test]
    fn test_time_scale_domain() {
        let groups = vec![
            group("100", &[(d(2024, 3, 1), 1.0), (d(2024, 5, 1), 2.0)]),
            group("105", &[(d(2024, 2, 1), 1.0)]),
        ];
        let area = Extents::chain_graph().data_area;
        let scale = time_scale(&groups, area);
        assert_eq!(scale.domain(), (d(2024, 2, 1), d(2024, 5, 1)));
        assert_eq!(scale.apply(d(2024, 2, 1)), 0.0);
        assert_eq!(scale.apply(d(2024, 5, 1)), area.w);
        assert!(!scale.is_degenerate());
    }

    #[test]
    fn test_measure_scale_inverted() {
        let registry = MeasureRegistry::with_builtins(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let ask = registry.get("askPrice").unwrap();
        let groups = vec![group("100", &[(d(2024, 3, 1), 2.0), (d(2024, 5, 1), 8.0)])];
        let area = Extents::chain_graph().data_area;
        let scale = measure_scale(&groups, ask, 100.0, area);
        assert_eq!(scale.domain(), (0.0, 8.0));
        assert_eq!(scale.apply(0.0), area.h);
        assert_eq!(scale.apply(8.0), 0.0);
        assert_eq!(scale.apply(4.0), area.h / 2.0);
    }

    #[test]
    fn test_empty_series_degenerate_domain() {
        let registry = MeasureRegistry::with_builtins(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let ask = registry.get("askPrice").unwrap();
        let area = Extents::chain_graph().data_area;

        let y = measure_scale(&[], ask, 100.0, area);
        assert_eq!(y.domain(), (0.0, 1.0));
        assert_eq!(
            y.degenerate(),
            Some(&ChartError::EmptySeriesDomain {
                scale: "askPrice".to_string()
            })
        );

        let x = time_scale(&[], area);
        let (d0, d1) = x.domain();
        assert_eq!((d1 - d0).num_days(), 1);
        assert_eq!(d0, d(1970, 1, 1));
        assert!(x.is_degenerate());
        assert_eq!(x.apply(d1), area.w);
    }

    #[test]
    fn test_all_zero_measure_falls_back() {
        let registry = MeasureRegistry::with_builtins(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let ask = registry.get("askPrice").unwrap();
        let groups = vec![group("100", &[(d(2024, 3, 1), 0.0)])];
        let scale = measure_scale(&groups, ask, 100.0, Extents::chain_graph().data_area);
        assert_eq!(scale.domain(), (0.0, 1.0));
        assert!(!scale.is_degenerate());
    }

    #[test]
    fn test_color_scale_stable() {
        let keys = ["110.00", "95.00", "110.00", "100.00"];
        let a = ColorScale::new(keys);
        let b = ColorScale::new(keys);
        assert_eq!(a.keys(), &["110.00", "95.00", "100.00"]);
        for key in keys {
            assert_eq!(a.color(key), b.color(key));
            assert_eq!(a.color(key), a.color(key));
        }
        assert_eq!(a.color("110.00"), CATEGORY20[0]);
        assert_eq!(a.color("95.00"), CATEGORY20[1]);
        assert_eq!(a.color("100.00"), CATEGORY20[2]);
        assert_eq!(a.color("unseen"), a.color("unseen"));
    }

    #[test]
    fn test_color_scale_cycles() {
        let keys: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        let scale = ColorScale::new(&keys);
        assert_eq!(scale.color("20"), scale.color("0"));
        assert_ne!(scale.color("1"), scale.color("0"));
    }

    #[test]
    fn test_labelled_ticks() {
        let scale = LinearScale::new((0.0, 1.0), (750.0, 0.0));
        let ticks = scale.labelled_ticks(5);
        assert_eq!(ticks.first().map(|t| t.1.as_str()), Some("0.0"));
        assert_eq!(ticks.last().map(|t| t.1.as_str()), Some("1.0"));

        let time = TimeScale::new((d(2024, 1, 19), d(2024, 9, 20)), (0.0, 1070.0));
        let ticks = time.labelled_ticks(10);
        assert_eq!(ticks[0].1, "Feb 2024");
        assert_eq!(time.ticks(10).len(), ticks.len());
    }
}
