use crate::models::asset::AssetType;
use crate::models::settings::{DataSourceConfig, QuoteSource};

use super::alphavantage::AlphaVantageProvider;
use super::traits::QuoteProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Settings key holding the Alpha Vantage API key.
pub const ALPHAVANTAGE_KEY: &str = "alphavantage";

/// Registry of all available quote providers, in priority order.
///
/// Routes requests to the providers that support an `AssetType`; callers
/// fall back down the list when the first one fails.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Build the registry described by the user's data-source settings.
    ///
    /// Yahoo needs no key and is always registered. Alpha Vantage is only
    /// registered when its key is configured. The preferred source goes first.
    pub fn from_config(config: &DataSourceConfig) -> Self {
        let mut registry = Self::new();

        let yahoo: Box<dyn QuoteProvider> =
            Box::new(YahooFinanceProvider::new(config.proxy_endpoints.clone()));
        let alphavantage: Option<Box<dyn QuoteProvider>> = config
            .api_keys
            .get(ALPHAVANTAGE_KEY)
            .filter(|k| !k.trim().is_empty())
            .map(|k| Box::new(AlphaVantageProvider::new(k.clone())) as Box<dyn QuoteProvider>);

        match (config.provider, alphavantage) {
            (QuoteSource::AlphaVantage, Some(av)) => {
                registry.register(av);
                registry.register(yahoo);
            }
            (_, av) => {
                registry.register(yahoo);
                if let Some(av) = av {
                    registry.register(av);
                }
            }
        }

        registry
    }

    /// Register a new quote provider at the lowest priority.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given asset type.
    pub fn get_provider_for(&self, asset_type: &AssetType) -> Option<&dyn QuoteProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_asset_types().contains(asset_type))
            .map(|p| p.as_ref())
    }

    /// Return ALL providers that support the given asset type, ordered by registration priority.
    pub fn get_providers_for(&self, asset_type: &AssetType) -> Vec<&dyn QuoteProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_asset_types().contains(asset_type))
            .map(|p| p.as_ref())
            .collect()
    }

    /// Every registered provider, in priority order.
    pub fn providers(&self) -> Vec<&dyn QuoteProvider> {
        self.providers.iter().map(|p| p.as_ref()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
