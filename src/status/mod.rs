pub mod backend;
pub mod snapshot;
pub mod sync;

pub use backend::SessionBackend;
pub use snapshot::{PairingView, StatusSnapshot};
pub use sync::{PollHandle, StatusSync};
