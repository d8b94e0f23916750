use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two currencies an asset value can be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "TWD")]
    Twd,
    #[serde(rename = "USD")]
    Usd,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Twd => write!(f, "TWD"),
            Currency::Usd => write!(f, "USD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TWD" => Ok(Currency::Twd),
            "USD" => Ok(Currency::Usd),
            other => Err(crate::errors::CoreError::ValidationError(format!(
                "Unsupported currency '{other}': expected TWD or USD"
            ))),
        }
    }
}

/// Category of a tracked asset.
///
/// Decides how value changes are attributed during growth analysis
/// and which quote endpoint is used for price refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    CashTwd,
    CashUsd,
    StockTw,
    StockUs,
    Liability,
    UsTbills,
}

impl AssetType {
    /// Every asset type, in display order.
    pub const ALL: [AssetType; 6] = [
        AssetType::CashTwd,
        AssetType::CashUsd,
        AssetType::StockTw,
        AssetType::StockUs,
        AssetType::UsTbills,
        AssetType::Liability,
    ];

    pub fn is_stock(&self) -> bool {
        matches!(self, AssetType::StockTw | AssetType::StockUs)
    }

    /// Cash and T-Bills: value changes are deposits or withdrawals.
    pub fn is_cash_like(&self) -> bool {
        matches!(
            self,
            AssetType::CashTwd | AssetType::CashUsd | AssetType::UsTbills
        )
    }

    pub fn is_liability(&self) -> bool {
        matches!(self, AssetType::Liability)
    }

    /// Currency a new asset of this type is usually held in.
    pub fn default_currency(&self) -> Currency {
        match self {
            AssetType::CashTwd | AssetType::StockTw | AssetType::Liability => Currency::Twd,
            AssetType::CashUsd | AssetType::StockUs | AssetType::UsTbills => Currency::Usd,
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetType::CashTwd => write!(f, "cash_twd"),
            AssetType::CashUsd => write!(f, "cash_usd"),
            AssetType::StockTw => write!(f, "stock_tw"),
            AssetType::StockUs => write!(f, "stock_us"),
            AssetType::Liability => write!(f, "liability"),
            AssetType::UsTbills => write!(f, "us_tbills"),
        }
    }
}

/// A single holding in the user's asset list.
///
/// `value` is always expressed in the asset's own `currency`; conversion to
/// TWD/USD happens at read time with a caller-supplied exchange rate.
/// Liabilities store the outstanding balance as a positive value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub asset_type: AssetType,

    pub value: f64,

    pub currency: Currency,

    /// Ticker symbol for stocks (e.g., "2330", "AAPL")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// Number of shares held, for stocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub last_updated: DateTime<Utc>,
}

impl Asset {
    pub fn new(
        name: impl Into<String>,
        asset_type: AssetType,
        value: f64,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            asset_type,
            value,
            currency,
            symbol: None,
            shares: None,
            notes: None,
            last_updated: Utc::now(),
        }
    }

    /// Cash holding in the type's default currency.
    pub fn cash(name: impl Into<String>, asset_type: AssetType, value: f64) -> Self {
        Self::new(name, asset_type, value, asset_type.default_currency())
    }

    /// Stock position; `value` is the market value of all `shares`.
    pub fn stock(
        name: impl Into<String>,
        asset_type: AssetType,
        symbol: impl Into<String>,
        shares: f64,
        value: f64,
    ) -> Self {
        let mut asset = Self::new(name, asset_type, value, asset_type.default_currency());
        asset.symbol = Some(symbol.into().trim().to_uppercase());
        asset.shares = Some(shares);
        asset
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Key used to match the same holding across two snapshots: symbol when
    /// present, name otherwise.
    pub fn match_key(&self) -> &str {
        self.symbol
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }

    /// Value with liabilities negated, in the asset's own currency.
    pub fn signed_value(&self) -> f64 {
        if self.asset_type.is_liability() {
            -self.value
        } else {
            self.value
        }
    }
}

/// Partial update applied to an existing asset. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<AssetType>,
    pub value: Option<f64>,
    pub currency: Option<Currency>,
    pub symbol: Option<String>,
    pub shares: Option<f64>,
    pub notes: Option<String>,
}
