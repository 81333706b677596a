//! Selection of the chain quotes worth plotting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use cv_types::{Chain, ChainSide, ChartError, Quote, RawQuote};

use crate::measure::Measure;

/// Near-the-money window, as fractions of the underlying's last price.
/// Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterBand {
    pub lower: f64,
    pub upper: f64,
}

impl FilterBand {
    pub const NEAR_THE_MONEY: FilterBand = FilterBand {
        lower: 0.8,
        upper: 1.2,
    };

    pub fn contains(&self, strike_price: f64, last_price: f64) -> bool {
        strike_price > last_price * self.lower && strike_price < last_price * self.upper
    }
}

impl Default for FilterBand {
    fn default() -> Self {
        Self::NEAR_THE_MONEY
    }
}

/// Filter raw quotes down to the near-the-money, unexpired quotes the measure
/// can be computed for, parsing each surviving expiry date.
///
/// Input order is preserved. Quotes outside the band are dropped before
/// their dates are parsed, so a malformed date there is not an error.
pub fn filter_quotes(
    quotes: &[RawQuote],
    last_price: f64,
    measure: &dyn Measure,
    as_of: DateTime<Utc>,
) -> Result<Vec<Quote>, ChartError> {
    filter_quotes_in_band(quotes, last_price, FilterBand::default(), measure, as_of)
}

/// [`filter_quotes`] with an explicit band.
pub fn filter_quotes_in_band(
    quotes: &[RawQuote],
    last_price: f64,
    band: FilterBand,
    measure: &dyn Measure,
    as_of: DateTime<Utc>,
) -> Result<Vec<Quote>, ChartError> {
    let mut selected = Vec::with_capacity(quotes.len());

    for raw in quotes {
        if !band.contains(raw.strike_price, last_price) {
            continue;
        }
        let quote = raw.normalize()?;
        if quote.is_expired(as_of) {
            continue;
        }
        if !measure.is_applicable(&quote) {
            continue;
        }
        selected.push(quote);
    }

    debug!(
        "Filtered {} of {} quotes for {} (last price {})",
        selected.len(),
        quotes.len(),
        measure.name(),
        last_price
    );
    Ok(selected)
}

/// Filter one side of a chain against the chain's own last price.
pub fn filter_chain(
    chain: &Chain,
    side: ChainSide,
    measure: &dyn Measure,
    as_of: DateTime<Utc>,
) -> Result<Vec<Quote>, ChartError> {
    filter_quotes(chain.side(side), chain.last_price, measure, as_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::MeasureRegistry;
    use chrono::TimeZone;

    fn raw(strike: f64, expiry: &str, bid: f64) -> RawQuote {
        RawQuote {
            strike_price: strike,
            display_strike_price: format!("{strike:.2}"),
            expiry_date: expiry.to_string(),
            ask_price: bid + 0.5,
            bid_price: bid,
            last_price: bid,
        }
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn strikes(quotes: &[Quote]) -> Vec<f64> {
        quotes.iter().map(|q| q.strike_price).collect()
    }

    #[test]
    fn test_band_boundaries_are_exclusive() {
        let registry = MeasureRegistry::with_builtins(as_of());
        let ask = registry.get("askPrice").unwrap();
        let quotes = vec![
            raw(80.0, "2024-06-21", 1.0),
            raw(80.01, "2024-06-21", 1.0),
            raw(100.0, "2024-06-21", 1.0),
            raw(119.99, "2024-06-21", 1.0),
            raw(120.0, "2024-06-21", 1.0),
        ];
        let selected = filter_quotes(&quotes, 100.0, ask, as_of()).unwrap();
        assert_eq!(strikes(&selected), vec![80.01, 100.0, 119.99]);
    }

    #[test]
    fn test_expired_quotes_excluded() {
        let registry = MeasureRegistry::with_builtins(as_of());
        let ask = registry.get("askPrice").unwrap();
        let quotes = vec![
            raw(100.0, "2023-12-15", 5.0),
            raw(101.0, "2024-01-01", 5.0), // expires exactly at as_of
            raw(102.0, "2024-01-02", 5.0),
        ];
        let selected = filter_quotes(&quotes, 100.0, ask, as_of()).unwrap();
        assert_eq!(strikes(&selected), vec![102.0]);
    }

    #[test]
    fn test_measure_applicability() {
        let registry = MeasureRegistry::with_builtins(as_of());
        let bid_rate = registry.get("bidRate").unwrap();
        let quotes = vec![
            raw(100.0, "2024-06-21", 0.0),
            raw(105.0, "2024-06-21", 1.5),
            raw(110.0, "2024-06-21", -0.1),
        ];
        let selected = filter_quotes(&quotes, 100.0, bid_rate, as_of()).unwrap();
        assert_eq!(strikes(&selected), vec![105.0]);

        let ask = registry.get("askPrice").unwrap();
        assert_eq!(filter_quotes(&quotes, 100.0, ask, as_of()).unwrap().len(), 3);
    }

    #[test]
    fn test_order_preserved() {
        let registry = MeasureRegistry::with_builtins(as_of());
        let ask = registry.get("askPrice").unwrap();
        let quotes = vec![
            raw(110.0, "2024-09-20", 1.0),
            raw(95.0, "2024-03-15", 1.0),
            raw(105.0, "2024-06-21", 1.0),
        ];
        let selected = filter_quotes(&quotes, 100.0, ask, as_of()).unwrap();
        assert_eq!(strikes(&selected), vec![110.0, 95.0, 105.0]);
    }

    #[test]
    fn test_bad_date_in_band_is_an_error() {
        let registry = MeasureRegistry::with_builtins(as_of());
        let ask = registry.get("askPrice").unwrap();
        let quotes = vec![raw(100.0, "06/21/2024", 1.0)];
        let err = filter_quotes(&quotes, 100.0, ask, as_of()).unwrap_err();
        assert_eq!(
            err,
            ChartError::InvalidExpiryDate {
                value: "06/21/2024".to_string()
            }
        );
    }

    #[test]
    fn test_bad_date_out_of_band_is_ignored() {
        let registry = MeasureRegistry::with_builtins(as_of());
        let ask = registry.get("askPrice").unwrap();
        let quotes = vec![raw(200.0, "not-a-date", 1.0), raw(100.0, "2024-06-21", 1.0)];
        let selected = filter_quotes(&quotes, 100.0, ask, as_of()).unwrap();
        assert_eq!(strikes(&selected), vec![100.0]);
    }

    #[test]
    fn test_filter_chain_sides() {
        let registry = MeasureRegistry::with_builtins(as_of());
        let ask = registry.get("askPrice").unwrap();
        let chain = Chain {
            last_price: 100.0,
            calls: vec![raw(105.0, "2024-06-21", 1.0)],
            puts: vec![raw(95.0, "2024-06-21", 1.0), raw(90.0, "2024-06-21", 1.0)],
        };
        assert_eq!(filter_chain(&chain, ChainSide::Calls, ask, as_of()).unwrap().len(), 1);
        assert_eq!(filter_chain(&chain, ChainSide::Puts, ask, as_of()).unwrap().len(), 2);
    }

    #[test]
    fn test_custom_band() {
        let registry = MeasureRegistry::with_builtins(as_of());
        let ask = registry.get("askPrice").unwrap();
        let band = FilterBand {
            lower: 0.95,
            upper: 1.05,
        };
        let quotes = vec![raw(90.0, "2024-06-21", 1.0), raw(101.0, "2024-06-21", 1.0)];
        let selected = filter_quotes_in_band(&quotes, 100.0, band, ask, as_of()).unwrap();
        assert_eq!(strikes(&selected), vec![101.0]);
    }
}
