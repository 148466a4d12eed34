/// CriptoYa API client
///
/// API: https://criptoya.com/api
///
/// Endpoint used:
/// 1. /api/binancep2p/USDT/BOB - best P2P quote for the pair
pub mod types;

use self::types::CriptoYaQuote;
use super::client::HttpClient;
use super::PriceSource;
use crate::errors::{PipelineError, PipelineResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::time::Instant;

pub struct CriptoYaClient {
    http_client: HttpClient,
    url: String,
}

impl CriptoYaClient {
    pub fn new(url: &str, timeout_secs: u64) -> PipelineResult<Self> {
        let http_client = HttpClient::new(timeout_secs).map_err(PipelineError::Config)?;
        Ok(Self {
            http_client,
            url: url.to_string(),
        })
    }

    pub fn from_config() -> PipelineResult<Self> {
        let (url, timeout_secs) =
            crate::config::with_config(|c| (c.source.api_url.clone(), c.source.timeout_secs));
        Self::new(&url, timeout_secs)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the full quote
    pub async fn fetch_quote(&self) -> PipelineResult<CriptoYaQuote> {
        let start = Instant::now();

        let response = self
            .http_client
            .client()
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("request timed out after {:?}", self.http_client.timeout())
                } else {
                    e.to_string()
                };
                PipelineError::SourceUnavailable(reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::SourceUnavailable(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::SourceUnavailable(format!("Failed to read body: {}", e)))?;

        logger::verbose(LogTag::Api, &format!("CriptoYa raw response: {}", body));
        let quote = parse_quote(&body)?;

        logger::debug(
            LogTag::Api,
            &format!(
                "CriptoYa quote in {}ms: bid={} ask={} totalBid={} totalAsk={} time={}",
                start.elapsed().as_millis(),
                quote.bid,
                quote.ask,
                quote.total_bid,
                quote.total_ask,
                quote.time
            ),
        );

        Ok(quote)
    }
}

#[async_trait]
impl PriceSource for CriptoYaClient {
    async fn fetch_price(&self) -> PipelineResult<f64> {
        let quote = self.fetch_quote().await?;
        validate_bid(quote.bid)
    }

    fn name(&self) -> &str {
        "CriptoYa"
    }
}

pub fn parse_quote(body: &str) -> PipelineResult<CriptoYaQuote> {
    serde_json::from_str(body)
        .map_err(|e| PipelineError::SourceUnavailable(format!("Invalid response: {}", e)))
}

/// A usable bid is finite and strictly positive
pub fn validate_bid(bid: f64) -> PipelineResult<f64> {
    if bid.is_finite() && bid > 0.0 {
        Ok(bid)
    } else {
        Err(PipelineError::SourceUnavailable(format!(
            "Invalid bid value: {}",
            bid
        )))
    }
}
