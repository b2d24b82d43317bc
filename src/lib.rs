// Library exports for hosts and tests

pub mod banner;
pub mod dom;
pub mod events;
pub mod store;
pub mod timers;

// Re-export commonly used types for hosts
pub use banner::{DismissController, SyncOutcome, BANNER_ID, DISMISS_DELAY, SYNC_INTERVAL};
pub use dom::{DomAdapter, PageDom, HIDDEN_CLASS};
pub use store::{ClientStore, StoreError};
