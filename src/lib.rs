pub mod api;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod error;
pub mod manage;
pub mod monitor;
pub mod qr;
pub mod stats;
pub mod status;


pub use config::DashboardConfig;
pub use error::{Error, Result};
