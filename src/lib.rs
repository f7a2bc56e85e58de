pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod event;
#[cfg(feature = "export")]
pub mod export;
pub mod fetch;
pub mod input;
pub mod model;
pub mod ui;
pub mod yahoo;
