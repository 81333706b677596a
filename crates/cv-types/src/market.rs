use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ChartError;

/// Date format used by chain feeds for `expiryDate`.
pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Option type: call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionKind {
    Call,
    Put,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => write!(f, "CALL"),
            OptionKind::Put => write!(f, "PUT"),
        }
    }
}

impl FromStr for OptionKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CALL" => Ok(OptionKind::Call),
            "PUT" => Ok(OptionKind::Put),
            _ => Err(ChartError::InvalidOptionKind {
                value: s.to_string(),
            }),
        }
    }
}

/// A held option, as drawn by the option state glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionPosition {
    pub kind: OptionKind,
    /// Price of the underlying when the option was bought.
    pub purchase_underlying_price: f64,
    pub strike_price: f64,
    pub premium: f64,
}

impl OptionPosition {
    pub fn new(
        kind: OptionKind,
        purchase_underlying_price: f64,
        strike_price: f64,
        premium: f64,
    ) -> Self {
        Self {
            kind,
            purchase_underlying_price,
            strike_price,
            premium,
        }
    }

    /// Build a position from a textual kind. Anything other than `CALL` or
    /// `PUT` is rejected.
    pub fn parse(
        kind: &str,
        purchase_underlying_price: f64,
        strike_price: f64,
        premium: f64,
    ) -> Result<Self, ChartError> {
        let kind = kind.parse::<OptionKind>()?;
        Ok(Self::new(kind, purchase_underlying_price, strike_price, premium))
    }

    /// Underlying price at which the premium is recovered.
    pub fn premium_delta(&self) -> f64 {
        match self.kind {
            OptionKind::Call => self.strike_price + self.premium,
            OptionKind::Put => self.strike_price - self.premium,
        }
    }
}

/// Price bounds of the option glyph. `start <= end` is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRange {
    pub start: f64,
    pub end: f64,
}

impl PlotRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// A chain entry exactly as delivered by the data feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    pub strike_price: f64,
    #[serde(deserialize_with = "deserialize_strike_label")]
    pub display_strike_price: String,
    pub expiry_date: String,
    #[serde(default)]
    pub ask_price: f64,
    #[serde(default)]
    pub bid_price: f64,
    #[serde(default)]
    pub last_price: f64,
}

impl RawQuote {
    pub fn parse_expiry(&self) -> Result<NaiveDate, ChartError> {
        NaiveDate::parse_from_str(self.expiry_date.trim(), EXPIRY_DATE_FORMAT).map_err(|_| {
            ChartError::InvalidExpiryDate {
                value: self.expiry_date.clone(),
            }
        })
    }

    /// Parse the textual expiry into a [`Quote`].
    pub fn normalize(&self) -> Result<Quote, ChartError> {
        Ok(Quote {
            strike_price: self.strike_price,
            display_strike_price: self.display_strike_price.clone(),
            expiry_date: self.parse_expiry()?,
            ask_price: self.ask_price,
            bid_price: self.bid_price,
            last_price: self.last_price,
        })
    }
}

/// A chain entry with a parsed expiry date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub strike_price: f64,
    pub display_strike_price: String,
    pub expiry_date: NaiveDate,
    pub ask_price: f64,
    pub bid_price: f64,
    pub last_price: f64,
}

impl Quote {
    /// Expiry as midnight UTC of the expiry date.
    pub fn expiry_instant(&self) -> DateTime<Utc> {
        self.expiry_date.and_time(NaiveTime::default()).and_utc()
    }

    /// True if the contract has expired relative to `as_of`.
    pub fn is_expired(&self, as_of: DateTime<Utc>) -> bool {
        self.expiry_instant() <= as_of
    }

    /// Fractional days from `as_of` until expiry. Negative once expired.
    pub fn days_to_expiry(&self, as_of: DateTime<Utc>) -> f64 {
        (self.expiry_instant() - as_of).num_seconds() as f64 / 86_400.0
    }
}

/// Which side of the chain to chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainSide {
    #[default]
    Calls,
    Puts,
}

impl fmt::Display for ChainSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSide::Calls => write!(f, "calls"),
            ChainSide::Puts => write!(f, "puts"),
        }
    }
}

impl FromStr for ChainSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calls" | "call" => Ok(ChainSide::Calls),
            "puts" | "put" => Ok(ChainSide::Puts),
            other => Err(format!("unknown chain side: {other}")),
        }
    }
}

/// All quotes for one underlying at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    /// Last traded price of the underlying.
    pub last_price: f64,
    #[serde(default)]
    pub calls: Vec<RawQuote>,
    #[serde(default)]
    pub puts: Vec<RawQuote>,
}

impl Chain {
    pub fn side(&self, side: ChainSide) -> &[RawQuote] {
        match side {
            ChainSide::Calls => &self.calls,
            ChainSide::Puts => &self.puts,
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len() + self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrikeLabel {
    Text(String),
    Number(serde_json::Number),
}

/// Feeds send the display strike either as `"105.00"` or `105`.
fn deserialize_strike_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StrikeLabel::deserialize(deserializer)? {
        StrikeLabel::Text(s) => s,
        StrikeLabel::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(expiry: &str) -> RawQuote {
        RawQuote {
            strike_price: 105.0,
            display_strike_price: "105.00".to_string(),
            expiry_date: expiry.to_string(),
            ask_price: 3.2,
            bid_price: 3.0,
            last_price: 3.1,
        }
    }

    #[test]
    fn test_option_kind_parse() {
        assert_eq!("CALL".parse::<OptionKind>().unwrap(), OptionKind::Call);
        assert_eq!(" put ".parse::<OptionKind>().unwrap(), OptionKind::Put);
        let err = "STRADDLE".parse::<OptionKind>().unwrap_err();
        assert_eq!(
            err,
            ChartError::InvalidOptionKind {
                value: "STRADDLE".to_string()
            }
        );
    }

    #[test]
    fn test_option_position_rejects_unknown_kind() {
        assert!(OptionPosition::parse("", 100.0, 105.0, 2.0).is_err());
        assert!(OptionPosition::parse("calls", 100.0, 105.0, 2.0).is_err());
        let p = OptionPosition::parse("PUT", 100.0, 95.0, 2.0).unwrap();
        assert_eq!(p.kind, OptionKind::Put);
    }

    #[test]
    fn test_premium_delta() {
        let call = OptionPosition::new(OptionKind::Call, 100.0, 105.0, 2.5);
        let put = OptionPosition::new(OptionKind::Put, 100.0, 95.0, 2.5);
        assert_eq!(call.premium_delta(), 107.5);
        assert_eq!(put.premium_delta(), 92.5);
    }

    #[test]
    fn test_normalize_parses_expiry() {
        let q = raw("2024-03-15").normalize().unwrap();
        assert_eq!(q.expiry_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(q.display_strike_price, "105.00");
    }

    #[test]
    fn test_normalize_rejects_bad_expiry() {
        for bad in ["15/03/2024", "2024-13-01", "", "tomorrow"] {
            let err = raw(bad).normalize().unwrap_err();
            assert!(matches!(err, ChartError::InvalidExpiryDate { .. }), "{bad}");
        }
    }

    #[test]
    fn test_days_to_expiry() {
        let q = raw("2024-03-15").normalize().unwrap();
        let as_of = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(q.days_to_expiry(as_of), 10.0);
        let noon = Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap();
        assert_eq!(q.days_to_expiry(noon), 0.5);
        assert!(!q.is_expired(noon));
        let expiry = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert!(q.is_expired(expiry));
    }

    #[test]
    fn test_chain_deserialize() {
        let json = r#"{
            "lastPrice": 100.5,
            "calls": [
                {"strikePrice": 105, "displayStrikePrice": "105.00", "expiryDate": "2024-03-15",
                 "askPrice": 3.2, "bidPrice": 3.0, "lastPrice": 3.1},
                {"strikePrice": 110, "displayStrikePrice": 110, "expiryDate": "2024-03-15",
                 "bidPrice": 1.0}
            ]
        }"#;
        let chain: Chain = serde_json::from_str(json).unwrap();
        assert_eq!(chain.last_price, 100.5);
        assert_eq!(chain.calls.len(), 2);
        assert!(chain.puts.is_empty());
        assert_eq!(chain.calls[0].display_strike_price, "105.00");
        assert_eq!(chain.calls[1].display_strike_price, "110");
        assert_eq!(chain.calls[1].ask_price, 0.0);
        assert_eq!(chain.side(ChainSide::Calls).len(), 2);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_side_parse() {
        assert_eq!("Calls".parse::<ChainSide>().unwrap(), ChainSide::Calls);
        assert_eq!("put".parse::<ChainSide>().unwrap(), ChainSide::Puts);
        assert!("both".parse::<ChainSide>().is_err());
    }
}
