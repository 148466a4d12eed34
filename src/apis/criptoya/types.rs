/// CriptoYa response types
use serde::Deserialize;

/// Quote for one exchange and pair
///
/// Only `bid` is used downstream; the rest is kept for logging.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CriptoYaQuote {
    pub ask: f64,
    #[serde(rename = "totalAsk", default)]
    pub total_ask: f64,
    pub bid: f64,
    #[serde(rename = "totalBid", default)]
    pub total_bid: f64,
    /// Unix seconds of the aggregator's cache, not of our request
    #[serde(default)]
    pub time: i64,
}
