//! Envlink Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading.

pub mod config;
pub mod persistence;
pub mod serialization;

pub use config::{Settings, SettingsError, default_data_file};
pub use persistence::{InMemoryVariableStore, JsonFileVariableStore, MemoryTransaction, StoreState};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
