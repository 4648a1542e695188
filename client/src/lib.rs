// lib.rs - Core library structure for the EstCoin wallet client

pub mod api;
pub mod app;
pub mod chain_client;
pub mod config_store;
pub mod controllers;
pub mod errors;
pub mod format;
pub mod navigation;
pub mod notifications;
pub mod session;
pub mod settings;
pub mod storage;
pub mod validation;

// Re-export common types
pub use api::types::*;
pub use api::{ApiClient, ApiOperation};
pub use app::WalletApp;
pub use chain_client::ChainClient;
pub use config_store::{ApiConfig, ChainConfig, ClientConfig, ConfigStore, UiConfig};
pub use controllers::{
    DashboardController, LoadOutcome, LoginController, RegisterController, SubmitOutcome,
    TransferController, UiDelays, ViewContext,
};
pub use errors::{WalletError, WalletResult};
pub use navigation::{Navigator, Route, Router};
pub use notifications::{Notification, NotificationCenter, NotificationEvent, NotificationKind};
pub use session::{Session, SessionStore};
pub use settings::Environment;
pub use storage::{ClientPaths, FileStore, KeyValueStore, MemoryStore};
pub use validation::InputValidator;
