pub mod analytics_service;
pub mod asset_service;
pub mod chart_service;
pub mod currency_service;
pub mod growth_service;
pub mod quote_service;
pub mod snapshot_service;
pub mod wishlist_service;
