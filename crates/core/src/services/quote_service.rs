use log::{debug, warn};

use crate::errors::CoreError;
use crate::models::asset::AssetType;
use crate::models::quote::StockQuote;
use crate::providers::registry::QuoteProviderRegistry;

/// Fetches stock quotes and the USD/TWD rate from the registered providers.
///
/// Providers are tried in registration order; the first valid answer wins.
/// The `try_*` methods return the last provider error; the plain methods are
/// best-effort and return `None` after logging the failure.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one provider is available for a given asset type.
    pub fn has_provider_for(&self, asset_type: &AssetType) -> bool {
        self.registry.get_provider_for(asset_type).is_some()
    }

    /// Get the names of all providers available for a given asset type.
    pub fn get_provider_names(&self, asset_type: &AssetType) -> Vec<String> {
        self.registry
            .get_providers_for(asset_type)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Latest quote, or `None` when every provider failed.
    pub async fn fetch_stock_quote(&self, symbol: &str, asset_type: AssetType) -> Option<StockQuote> {
        match self.try_fetch_stock_quote(symbol, asset_type).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("Could not fetch quote for {symbol}: {e}");
                None
            }
        }
    }

    /// Current TWD per USD, or `None` when every provider failed.
    pub async fn fetch_exchange_rate(&self) -> Option<f64> {
        match self.try_fetch_exchange_rate().await {
            Ok(rate) => Some(rate),
            Err(e) => {
                warn!("Could not fetch USD/TWD exchange rate: {e}");
                None
            }
        }
    }

    /// Latest quote with automatic provider fallback.
    /// Validates that returned prices are finite and non-negative.
    pub async fn try_fetch_stock_quote(
        &self,
        symbol: &str,
        asset_type: AssetType,
    ) -> Result<StockQuote, CoreError> {
        if !asset_type.is_stock() {
            return Err(CoreError::NoProvider(asset_type.to_string()));
        }
        let providers = self.registry.get_providers_for(&asset_type);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(asset_type.to_string()));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.fetch_stock_quote(symbol, asset_type).await {
                Ok(quote) if quote.price.is_finite() && quote.price >= 0.0 => {
                    debug!("{} quoted {symbol} at {} {}", provider.name(), quote.price, quote.currency);
                    return Ok(quote);
                }
                Ok(quote) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "Invalid price returned for {symbol}: {} (must be finite and non-negative)",
                            quote.price
                        ),
                    });
                }
                Err(e) => {
                    debug!("{} failed for {symbol}, trying next provider: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(asset_type.to_string())))
    }

    /// Current TWD per USD with automatic provider fallback.
    pub async fn try_fetch_exchange_rate(&self) -> Result<f64, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider("USD/TWD".into()));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.fetch_exchange_rate().await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => return Ok(rate),
                Ok(rate) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Invalid exchange rate returned: {rate}"),
                    });
                }
                Err(e) => {
                    debug!("{} failed for USD/TWD, trying next provider: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider("USD/TWD".into())))
    }
}
