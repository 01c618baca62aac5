//! Backend configuration: personas, provider keys, and the contact allow-list.

pub mod cache;
pub mod contacts;
pub mod jid;
pub mod keys;
pub mod prompts;

pub use cache::{Activatable, ListCache};
pub use contacts::ContactManager;
pub use jid::normalize_jid;
pub use keys::{mask_key, ApiKeyManager};
pub use prompts::PromptManager;
