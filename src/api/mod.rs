pub mod client;
pub mod types;

pub use client::WhatsAppApiClient;
pub use types::*;
