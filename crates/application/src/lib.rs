//! Envlink Application - Use cases and ports
//!
//! This crate contains the application logic: the ports that storage
//! adapters implement, the variable resolution engine, and the use cases
//! that validate and persist changes through transactions.

pub mod error;
pub mod ports;
pub mod use_cases;
pub mod variable_resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ApplicationError, ApplicationResult};
