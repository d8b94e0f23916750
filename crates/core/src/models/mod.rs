pub mod analytics;
pub mod app_data;
pub mod asset;
pub mod chart;
pub mod quote;
pub mod settings;
pub mod snapshot;
pub mod wishlist;
