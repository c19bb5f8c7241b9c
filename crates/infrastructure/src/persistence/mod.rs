//! Storage adapters for the variable store ports.

mod json_file_store;
mod memory_store;
mod state;

pub use json_file_store::JsonFileVariableStore;
pub use memory_store::{InMemoryVariableStore, MemoryTransaction};
pub use state::StoreState;
