//! Partition of filtered quotes into per-strike series.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use cv_types::Quote;

/// All quotes sharing one display strike, in expiry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeGroup {
    pub key: String,
    pub series: Vec<Quote>,
}

impl StrikeGroup {
    /// The latest-expiring quote, where the series label is placed.
    pub fn last(&self) -> Option<&Quote> {
        self.series.last()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Group quotes by `display_strike_price`.
///
/// Groups appear in the order their key is first seen in `quotes`; each
/// series is stable-sorted by expiry date ascending.
pub fn group_by_strike(quotes: Vec<Quote>) -> Vec<StrikeGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<StrikeGroup> = Vec::new();

    for quote in quotes {
        match index.get(&quote.display_strike_price) {
            Some(&idx) => groups[idx].series.push(quote),
            None => {
                index.insert(quote.display_strike_price.clone(), groups.len());
                groups.push(StrikeGroup {
                    key: quote.display_strike_price.clone(),
                    series: vec![quote],
                });
            }
        }
    }

    for group in &mut groups {
        group.series.sort_by_key(|q| q.expiry_date);
    }

    groups
}

/// Iterate every quote across all groups.
pub fn all_quotes(groups: &[StrikeGroup]) -> impl Iterator<Item = &Quote> {
    groups.iter().flat_map(|g| g.series.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(key: &str, expiry: (i32, u32, u32), ask: f64) -> Quote {
        Quote {
            strike_price: key.parse().unwrap(),
            display_strike_price: key.to_string(),
            expiry_date: NaiveDate::from_ymd_opt(expiry.0, expiry.1, expiry.2).unwrap(),
            ask_price: ask,
            bid_price: ask - 0.5,
            last_price: ask,
        }
    }

    #[test]
    fn test_first_seen_key_order() {
        let quotes = vec![
            quote("110", (2024, 3, 15), 1.0),
            quote("95", (2024, 3, 15), 7.0),
            quote("110", (2024, 6, 21), 2.0),
            quote("100", (2024, 3, 15), 4.0),
        ];
        let groups = group_by_strike(quotes);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["110", "95", "100"]);
    }

    #[test]
    fn test_series_sorted_by_expiry() {
        let quotes = vec![
            quote("100", (2024, 9, 20), 6.0),
            quote("100", (2024, 3, 15), 4.0),
            quote("100", (2024, 6, 21), 5.0),
        ];
        let groups = group_by_strike(quotes);
        assert_eq!(groups.len(), 1);
        let asks: Vec<f64> = groups[0].series.iter().map(|q| q.ask_price).collect();
        assert_eq!(asks, vec![4.0, 5.0, 6.0]);
        assert_eq!(groups[0].last().unwrap().ask_price, 6.0);
    }

    #[test]
    fn test_sort_is_stable_for_equal_expiry() {
        let quotes = vec![
            quote("100", (2024, 6, 21), 2.0),
            quote("100", (2024, 3, 15), 1.0),
            quote("100", (2024, 6, 21), 3.0),
        ];
        let groups = group_by_strike(quotes);
        let asks: Vec<f64> = groups[0].series.iter().map(|q| q.ask_price).collect();
        assert_eq!(asks, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_partition_property() {
        let quotes = vec![
            quote("100", (2024, 3, 15), 4.0),
            quote("105", (2024, 3, 15), 2.0),
            quote("100", (2024, 6, 21), 5.0),
            quote("110", (2024, 6, 21), 1.0),
            quote("105", (2024, 9, 20), 3.0),
        ];
        let groups = group_by_strike(quotes.clone());

        let mut grouped: Vec<&Quote> = all_quotes(&groups).collect();
        assert_eq!(grouped.len(), quotes.len());
        for q in &quotes {
            let hits = grouped.iter().filter(|g| **g == q).count();
            assert_eq!(hits, 1, "quote {:?} appears {} times", q, hits);
        }
        grouped.dedup();
        assert_eq!(grouped.len(), quotes.len());
        for g in &groups {
            assert!(g.series.iter().all(|q| q.display_strike_price == g.key));
        }
    }

    #[test]
    fn test_empty_input() {
        let groups = group_by_strike(Vec::new());
        assert!(groups.is_empty());
    }
}
