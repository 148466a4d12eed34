//! External price sources
//!
//! - `client`   - shared reqwest wrapper
//! - `criptoya` - CriptoYa P2P aggregator (USDT/BOB on Binance P2P)

pub mod client;
pub mod criptoya;

pub use client::HttpClient;
pub use criptoya::CriptoYaClient;

use crate::errors::PipelineResult;
use async_trait::async_trait;

/// Anything that can quote the current price of the tracked pair
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current bid; `SourceUnavailable` on network, status or payload problems
    async fn fetch_price(&self) -> PipelineResult<f64>;

    /// Name used in logs
    fn name(&self) -> &str;
}
