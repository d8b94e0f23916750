use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::asset::AssetType;
use crate::models::quote::StockQuote;

const PROVIDER: &str = "Alpha Vantage";
const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage API provider for stock quotes and the USD/TWD rate.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Coverage**: US equities; Taiwan listings via the `.TPE` suffix.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }

    /// Map a user-entered symbol to Alpha Vantage's ticker format.
    pub fn alphavantage_symbol(symbol: &str, asset_type: AssetType) -> String {
        let symbol = symbol.trim().to_uppercase();
        match asset_type {
            AssetType::StockTw if !symbol.contains('.') => format!("{symbol}.TPE"),
            _ => symbol,
        }
    }

    /// Parse a `GLOBAL_QUOTE` response body.
    pub fn parse_global_quote(
        symbol: &str,
        asset_type: AssetType,
        body: &str,
    ) -> Result<StockQuote, CoreError> {
        let resp: GlobalQuoteResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quote for {symbol}: {e}"),
        })?;

        let quote = resp.global_quote.ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {symbol}. API limit may be exceeded."),
        })?;

        let price = parse_number(symbol, "price", quote.price.as_deref())?;
        let change = parse_number(symbol, "change", quote.change.as_deref()).unwrap_or(0.0);
        let change_percent = quote
            .change_percent
            .as_deref()
            .map(|p| p.trim_end_matches('%'))
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0.0);

        let last_updated = quote
            .latest_trading_day
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);

        let currency = match asset_type {
            AssetType::StockTw => "TWD",
            _ => "USD",
        };

        Ok(StockQuote {
            symbol: quote.symbol.unwrap_or_else(|| symbol.to_string()),
            price,
            currency: currency.to_string(),
            change,
            change_percent,
            last_updated,
        })
    }

    /// Parse a `CURRENCY_EXCHANGE_RATE` response body.
    pub fn parse_exchange_rate(body: &str) -> Result<f64, CoreError> {
        let resp: ExchangeRateResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse exchange rate: {e}"),
        })?;

        let rate = resp
            .rate
            .and_then(|r| r.exchange_rate)
            .ok_or_else(|| CoreError::Api {
                provider: PROVIDER.into(),
                message: "No exchange rate data. API limit may be exceeded.".into(),
            })?;

        parse_number("USD/TWD", "exchange rate", Some(&rate))
    }
}

fn parse_number(symbol: &str, field: &str, raw: Option<&str>) -> Result<f64, CoreError> {
    raw.ok_or_else(|| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Missing {field} for {symbol}"),
    })?
    .trim()
    .parse()
    .map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Invalid {field} format for {symbol}: {e}"),
    })
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Deserialize)]
struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    rate: Option<RealtimeRate>,
}

#[derive(Deserialize)]
struct RealtimeRate {
    #[serde(rename = "5. Exchange Rate")]
    exchange_rate: Option<String>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for AlphaVantageProvider {
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
        let av_symbol = Self::alphavantage_symbol(symbol, asset_type);
        let body = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", av_symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .text()
            .await?;

        Self::parse_global_quote(&av_symbol, asset_type, &body)
    }

    async fn fetch_exchange_rate(&self) -> Result<f64, CoreError> {
        let body = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "CURRENCY_EXCHANGE_RATE"),
                ("from_currency", "USD"),
                ("to_currency", "TWD"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .text()
            .await?;

        Self::parse_exchange_rate(&body)
    }
}
