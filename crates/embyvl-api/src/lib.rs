//! Client for the virtual proxy's admin REST API.

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::AdminClient;
pub use error::ApiError;
pub use traits::AdminApi;
