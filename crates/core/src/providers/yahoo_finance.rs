use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::asset::AssetType;
use crate::models::quote::StockQuote;

const PROVIDER: &str = "Yahoo Finance";
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo ticker of the USD/TWD pair (price is TWD per USD).
pub const USD_TWD_SYMBOL: &str = "TWD=X";

/// Per-endpoint request timeout.
pub const REQUEST_TIMEOUT_SECS: u64 = 8;

/// Yahoo Finance chart endpoint provider for Taiwan and US stocks.
///
/// - **Free**: No API key required.
/// - **Coverage**: TWSE listings (`.TW` suffix), US equities, FX pairs.
/// - **Fallback chain**: the direct URL first, then each configured proxy
///   prefix in order. Each attempt gets its own timeout; the first response
///   that parses into a quote wins.
pub struct YahooFinanceProvider {
    client: Client,
    proxy_endpoints: Vec<String>,
}

impl YahooFinanceProvider {
    pub fn new(proxy_endpoints: Vec<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            proxy_endpoints,
        }
    }

    /// Map a user-entered symbol to Yahoo's ticker format.
    /// Taiwan listings get a `.TW` suffix unless they already carry an exchange suffix.
    pub fn yahoo_symbol(symbol: &str, asset_type: AssetType) -> String {
        let symbol = symbol.trim().to_uppercase();
        match asset_type {
            AssetType::StockTw if !symbol.contains('.') => format!("{symbol}.TW"),
            _ => symbol,
        }
    }

    /// Every URL tried for `yahoo_symbol`, in order: direct, then each proxy.
    pub fn candidate_urls(&self, yahoo_symbol: &str) -> Vec<String> {
        let target = format!(
            "{CHART_URL}/{}?interval=1d&range=1d",
            urlencoding::encode(yahoo_symbol)
        );
        let mut urls = Vec::with_capacity(self.proxy_endpoints.len() + 1);
        urls.push(target.clone());
        for prefix in &self.proxy_endpoints {
            urls.push(format!("{prefix}{}", urlencoding::encode(&target)));
        }
        urls
    }

    /// Parse a chart endpoint response body into a quote.
    ///
    /// `change` is measured against the previous close; both change fields
    /// are zero when no previous close is reported.
    pub fn parse_chart_response(symbol: &str, body: &str) -> Result<StockQuote, CoreError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse chart response for {symbol}: {e}"),
        })?;

        if let Some(err) = resp.chart.error {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!(
                    "Chart request for {symbol} failed: {}",
                    err.description.unwrap_or_else(|| "unknown error".into())
                ),
            });
        }

        let meta = resp
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| CoreError::QuoteNotAvailable {
                symbol: symbol.to_string(),
            })?;

        let price = meta
            .regular_market_price
            .ok_or_else(|| CoreError::QuoteNotAvailable {
                symbol: symbol.to_string(),
            })?;

        let previous = meta.previous_close.or(meta.chart_previous_close);
        let (change, change_percent) = match previous {
            Some(prev) if prev != 0.0 => (price - prev, (price - prev) / prev * 100.0),
            _ => (0.0, 0.0),
        };

        let last_updated = meta
            .regular_market_time
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        Ok(StockQuote {
            symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
            price,
            currency: meta.currency.unwrap_or_else(|| "USD".into()).to_uppercase(),
            change,
            change_percent,
            last_updated,
        })
    }

    /// Walk the candidate URLs until one yields a quote.
    async fn fetch_chart(&self, yahoo_symbol: &str) -> Result<StockQuote, CoreError> {
        let mut last_error = None;

        for url in self.candidate_urls(yahoo_symbol) {
            match self.fetch_chart_from(&url, yahoo_symbol).await {
                Ok(quote) => return Ok(quote),
                Err(e) => {
                    debug!("{PROVIDER} attempt for {yahoo_symbol} failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::QuoteNotAvailable {
            symbol: yahoo_symbol.to_string(),
        }))
    }

    async fn fetch_chart_from(&self, url: &str, yahoo_symbol: &str) -> Result<StockQuote, CoreError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::parse_chart_response(yahoo_symbol, &body)
    }
}

impl Default for YahooFinanceProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// ── Yahoo chart response types ──────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    description: Option<String>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    currency: Option<String>,
    symbol: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_time: Option<i64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_asset_types(&self) -> Vec<AssetType> {
        vec![AssetType::StockTw, AssetType::StockUs]
    }

    async fn fetch_stock_quote(
        &self,
        symbol: &str,
        asset_type: AssetType,
    ) -> Result<StockQuote, CoreError> {
        let yahoo_symbol = Self::yahoo_symbol(symbol, asset_type);
        self.fetch_chart(&yahoo_symbol).await
    }

    async fn fetch_exchange_rate(&self) -> Result<f64, CoreError> {
        self.fetch_chart(USD_TWD_SYMBOL).await.map(|q| q.price)
    }
}
