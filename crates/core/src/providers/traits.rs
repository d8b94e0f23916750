use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::asset::AssetType;
use crate::models::quote::StockQuote;

/// Trait abstraction for all quote data providers.
///
/// Each API (Yahoo chart endpoint, Alpha Vantage) implements this trait.
/// If an API stops working or changes, only that implementation is replaced.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which stock types this provider can quote.
    fn supported_asset_types(&self) -> Vec<AssetType>;

    /// Latest quote for `symbol` as entered by the user (e.g., "2330", "AAPL").
    /// Providers map it to their own ticker format based on `asset_type`.
    async fn fetch_stock_quote(
        &self,
        symbol: &str,
        asset_type: AssetType,
    ) -> Result<StockQuote, CoreError>;

    /// Current USD → TWD rate (TWD per USD).
    async fn fetch_exchange_rate(&self) -> Result<f64, CoreError>;
}
