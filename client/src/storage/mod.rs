pub mod kv;
pub mod paths;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use paths::ClientPaths;
