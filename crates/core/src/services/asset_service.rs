use chrono::{DateTime, Utc};
use log::info;

use crate::errors::CoreError;
use crate::models::app_data::AppData;
use crate::models::asset::{Asset, AssetUpdate};
use crate::models::settings::AppSettings;
use crate::models::snapshot::Snapshot;

use super::snapshot_service::{create_snapshot, is_snapshot_needed_at, validate_exchange_rate};

/// Manages the live asset list and the snapshot history.
///
/// Pure business logic over [`AppData`]: no I/O, no API calls. Callers
/// persist the data after a successful mutation.
pub struct AssetService;

impl AssetService {
    pub fn new() -> Self {
        Self
    }

    /// Add a new asset. Validates it first.
    pub fn add_asset(
        &self,
        data: &mut AppData,
        asset: Asset,
        now: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        self.validate_asset(&asset)?;
        if data.current_assets.assets.iter().any(|a| a.id == asset.id) {
            return Err(CoreError::ValidationError(format!(
                "An asset with id {} already exists",
                asset.id
            )));
        }
        let id = asset.id.clone();
        data.current_assets.assets.push(asset);
        data.current_assets.last_modified = now;
        Ok(id)
    }

    /// Apply `update` to the asset with `asset_id`.
    ///
    /// If the snapshot interval has elapsed since the last snapshot, a
    /// snapshot of the list as it was *before* this update is recorded first.
    /// Returns the id of that automatic snapshot, if one was taken.
    pub fn update_asset(
        &self,
        data: &mut AppData,
        asset_id: &str,
        update: AssetUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, CoreError> {
        let idx = self.position(data, asset_id)?;

        let mut updated = data.current_assets.assets[idx].clone();
        if let Some(name) = update.name {
            updated.name = name;
        }
        if let Some(asset_type) = update.asset_type {
            updated.asset_type = asset_type;
        }
        if let Some(value) = update.value {
            updated.value = value;
        }
        if let Some(currency) = update.currency {
            updated.currency = currency;
        }
        if let Some(symbol) = update.symbol {
            let symbol = symbol.trim().to_uppercase();
            updated.symbol = (!symbol.is_empty()).then_some(symbol);
        }
        if let Some(shares) = update.shares {
            updated.shares = Some(shares);
        }
        if let Some(notes) = update.notes {
            updated.notes = (!notes.trim().is_empty()).then_some(notes);
        }
        updated.last_updated = now;
        self.validate_asset(&updated)?;

        let auto_snapshot = self.auto_snapshot_if_due(data, now)?;

        data.current_assets.assets[idx] = updated;
        data.current_assets.last_modified = now;
        Ok(auto_snapshot)
    }

    /// Remove an asset by id and return it.
    pub fn delete_asset(
        &self,
        data: &mut AppData,
        asset_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Asset, CoreError> {
        let idx = self.position(data, asset_id)?;
        let removed = data.current_assets.assets.remove(idx);
        data.current_assets.last_modified = now;
        Ok(removed)
    }

    /// Overwrite an asset's value after a price refresh.
    ///
    /// Does not trigger an automatic snapshot; only user edits do.
    pub fn apply_price(
        &self,
        data: &mut AppData,
        asset_id: &str,
        price_per_share: f64,
        now: DateTime<Utc>,
    ) -> Result<f64, CoreError> {
        if !price_per_share.is_finite() || price_per_share < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Price must be finite and non-negative, got {price_per_share}"
            )));
        }
        let idx = self.position(data, asset_id)?;
        let asset = &mut data.current_assets.assets[idx];
        let shares = asset.shares.ok_or_else(|| {
            CoreError::ValidationError(format!("Asset {} has no share count", asset.name))
        })?;
        asset.value = shares * price_per_share;
        asset.last_updated = now;
        let value = asset.value;
        data.current_assets.last_modified = now;
        Ok(value)
    }

    pub fn set_exchange_rate(
        &self,
        data: &mut AppData,
        rate: f64,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        validate_exchange_rate(rate)?;
        data.current_assets.exchange_rate = rate;
        data.current_assets.last_modified = now;
        Ok(())
    }

    /// Record a snapshot of the current list at `now`.
    pub fn take_snapshot(
        &self,
        data: &mut AppData,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        let snapshot = create_snapshot(
            &data.current_assets.assets,
            data.current_assets.exchange_rate,
            now,
            notes,
        )?;
        let id = snapshot.id.clone();
        Self::insert_snapshot(&mut data.snapshots, snapshot);
        Ok(id)
    }

    pub fn delete_snapshot(&self, data: &mut AppData, snapshot_id: &str) -> Result<Snapshot, CoreError> {
        let idx = data
            .snapshots
            .iter()
            .position(|s| s.id == snapshot_id)
            .ok_or_else(|| CoreError::SnapshotNotFound(snapshot_id.to_string()))?;
        Ok(data.snapshots.remove(idx))
    }

    /// Set or clear a snapshot's notes. Notes are the only mutable part of a snapshot.
    pub fn set_snapshot_notes(
        &self,
        data: &mut AppData,
        snapshot_id: &str,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        let snapshot = data
            .snapshots
            .iter_mut()
            .find(|s| s.id == snapshot_id)
            .ok_or_else(|| CoreError::SnapshotNotFound(snapshot_id.to_string()))?;
        snapshot.notes = notes.filter(|n| !n.trim().is_empty());
        Ok(())
    }

    /// Validate settings before they replace the stored ones.
    ///
    /// Rules:
    /// - Snapshot interval of at least one day
    /// - Each target percentage within 0..=100, all targets summing to at most 100
    pub fn validate_settings(&self, settings: &AppSettings) -> Result<(), CoreError> {
        if settings.snapshot_interval == 0 {
            return Err(CoreError::ValidationError(
                "Snapshot interval must be at least 1 day".into(),
            ));
        }
        for (asset_type, pct) in &settings.target_allocation {
            if !pct.is_finite() || !(0.0..=100.0).contains(pct) {
                return Err(CoreError::ValidationError(format!(
                    "Target allocation for {asset_type} must be between 0 and 100, got {pct}"
                )));
            }
        }
        let total: f64 = settings.target_allocation.values().sum();
        if total > 100.0 + 1e-9 {
            return Err(CoreError::ValidationError(format!(
                "Target allocations add up to {total:.2}%, which exceeds 100%"
            )));
        }
        Ok(())
    }

    /// Validate an asset before it enters the list.
    ///
    /// Rules:
    /// - Name must not be blank
    /// - Value must be finite
    /// - Share count, if any, must be finite and non-negative
    fn validate_asset(&self, asset: &Asset) -> Result<(), CoreError> {
        if asset.name.trim().is_empty() {
            return Err(CoreError::ValidationError("Asset name must not be empty".into()));
        }
        if !asset.value.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Asset value must be a finite number, got {}",
                asset.value
            )));
        }
        if let Some(shares) = asset.shares {
            if !shares.is_finite() || shares < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Share count must be finite and non-negative, got {shares}"
                )));
            }
        }
        Ok(())
    }

    fn auto_snapshot_if_due(
        &self,
        data: &mut AppData,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, CoreError> {
        let last = data.latest_snapshot().map(|s| s.date);
        if !is_snapshot_needed_at(last, data.settings.snapshot_interval, now) {
            return Ok(None);
        }
        let id = self.take_snapshot(data, None, now)?;
        info!(
            "Snapshot interval of {} days elapsed; recorded automatic snapshot {id}",
            data.settings.snapshot_interval
        );
        Ok(Some(id))
    }

    fn position(&self, data: &AppData, asset_id: &str) -> Result<usize, CoreError> {
        data.current_assets
            .assets
            .iter()
            .position(|a| a.id == asset_id)
            .ok_or_else(|| CoreError::AssetNotFound(asset_id.to_string()))
    }

    /// Binary insert keeping the history ordered by date (oldest first).
    /// Snapshots sharing a date keep insertion order.
    fn insert_snapshot(snapshots: &mut Vec<Snapshot>, snapshot: Snapshot) {
        let pos = snapshots.partition_point(|s| s.date <= snapshot.date);
        snapshots.insert(pos, snapshot);
    }
}

impl Default for AssetService {
    fn default() -> Self {
        Self::new()
    }
}
