//! Console state engine: the configuration store, the person-name resolver and
//! the notification seam they report through.

mod error;
pub mod notify;
pub mod persons;
pub mod store;

#[cfg(test)]
mod fake;

pub use error::{failure_message, StoreError, FALLBACK_DETAIL};
pub use notify::{Notice, NoticeKind, Notifier};
pub use persons::PersonNameResolver;
pub use store::{ConfigStore, DataStatus, StoreState};
