pub mod local;
pub mod store;
pub mod transfer;
