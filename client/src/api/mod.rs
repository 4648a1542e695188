pub mod client;
pub mod types;

pub use client::{ApiClient, ApiOperation, AuthRejectedHook, DEFAULT_HISTORY_LIMIT};
