//! Named quantities derived from a quote, selectable by name for plotting.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use cv_types::{ChartError, Quote};

/// How a measure's values should be read on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleKind {
    /// Currency amount.
    Price,
    /// Percentage (annualized rates).
    Percent,
}

/// A plottable quantity computed from a quote and a reference price
/// (normally the underlying's last price).
///
/// Callers must only pass quotes for which [`Measure::is_applicable`] is true
/// to [`Measure::extract`]; the quote filter guarantees this for the chart
/// pipeline.
pub trait Measure: Send + Sync + fmt::Debug {
    /// Registry key, e.g. `askPrice`.
    fn name(&self) -> &str;

    /// Axis label.
    fn label(&self) -> &str;

    fn extract(&self, quote: &Quote, reference_price: f64) -> f64;

    fn is_applicable(&self, _quote: &Quote) -> bool {
        true
    }

    fn scale_kind(&self) -> ScaleKind {
        ScaleKind::Price
    }
}

/// Quote fields read directly by [`LinearMeasure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteField {
    Ask,
    Bid,
    Last,
    StrikePlusBid,
}

/// A measure that reads (or sums) quote fields. Always applicable.
#[derive(Debug, Clone)]
pub struct LinearMeasure {
    name: String,
    label: String,
    field: QuoteField,
}

impl LinearMeasure {
    pub fn new(name: &str, label: &str, field: QuoteField) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field,
        }
    }
}

impl Measure for LinearMeasure {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn extract(&self, quote: &Quote, _reference_price: f64) -> f64 {
        match self.field {
            QuoteField::Ask => quote.ask_price,
            QuoteField::Bid => quote.bid_price,
            QuoteField::Last => quote.last_price,
            QuoteField::StrikePlusBid => quote.strike_price + quote.bid_price,
        }
    }
}

/// Annualized return of selling the option at the bid, measured against the
/// reference price and the days left until expiry as of a fixed instant.
#[derive(Debug, Clone)]
pub struct BidRateMeasure {
    as_of: DateTime<Utc>,
}

impl BidRateMeasure {
    pub const NAME: &'static str = "bidRate";

    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self { as_of }
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }
}

impl Measure for BidRateMeasure {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn label(&self) -> &str {
        "Annualized Bid Rate (%)"
    }

    fn extract(&self, quote: &Quote, reference_price: f64) -> f64 {
        let days = quote.days_to_expiry(self.as_of);
        match annualized_rate(days, reference_price, quote.strike_price, quote.bid_price) {
            Some(rate) => rate,
            None => {
                warn!(
                    "Degenerate bid rate for strike {} expiring {} (days={days}, reference={reference_price})",
                    quote.display_strike_price, quote.expiry_date
                );
                0.0
            }
        }
    }

    fn is_applicable(&self, quote: &Quote) -> bool {
        quote.bid_price > 0.0
    }

    fn scale_kind(&self) -> ScaleKind {
        ScaleKind::Percent
    }
}

/// Annualized premium-capture rate in percent, rounded to 3 decimal places.
///
/// Returns `None` when `days <= 0`, the reference price is zero, or the
/// result is not finite.
pub fn annualized_rate(days: f64, reference_price: f64, strike_price: f64, bid_price: f64) -> Option<f64> {
    if days <= 0.0 || reference_price == 0.0 {
        return None;
    }
    let fractional_year = 365.0 / days;
    let premium_capture = strike_price - reference_price + bid_price;
    let rate = (premium_capture / reference_price) * 100.0 * fractional_year;
    if !rate.is_finite() {
        return None;
    }
    Decimal::from_f64(rate)?
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

/// Measures available to one render session, keyed by name.
///
/// Built once against a fixed `as_of` instant and read-only afterwards.
#[derive(Debug)]
pub struct MeasureRegistry {
    as_of: DateTime<Utc>,
    measures: Vec<Box<dyn Measure>>,
}

impl MeasureRegistry {
    /// An empty registry.
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            measures: Vec::new(),
        }
    }

    /// Registry holding `askPrice`, `bidPrice`, `lastPrice`, `strikePlusBid`
    /// and `bidRate`.
    pub fn with_builtins(as_of: DateTime<Utc>) -> Self {
        let mut registry = Self::new(as_of);
        registry.register(Box::new(LinearMeasure::new("askPrice", "Ask Price", QuoteField::Ask)));
        registry.register(Box::new(LinearMeasure::new("bidPrice", "Bid Price", QuoteField::Bid)));
        registry.register(Box::new(LinearMeasure::new("lastPrice", "Last Price", QuoteField::Last)));
        registry.register(Box::new(LinearMeasure::new(
            "strikePlusBid",
            "Strike + Bid",
            QuoteField::StrikePlusBid,
        )));
        registry.register(Box::new(BidRateMeasure::new(as_of)));
        registry
    }

    /// Add a measure. A measure with the same name is replaced in place.
    pub fn register(&mut self, measure: Box<dyn Measure>) {
        match self.measures.iter().position(|m| m.name() == measure.name()) {
            Some(idx) => {
                debug!("Replacing measure {}", measure.name());
                self.measures[idx] = measure;
            }
            None => self.measures.push(measure),
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn Measure, ChartError> {
        self.measures
            .iter()
            .find(|m| m.name() == name)
            .map(|m| &**m)
            .ok_or_else(|| ChartError::UnknownMeasure {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.measures.iter().any(|m| m.name() == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.measures.iter().map(|m| m.name()).collect()
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }
}
