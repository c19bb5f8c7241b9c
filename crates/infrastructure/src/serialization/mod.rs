//! Deterministic JSON serialization for the store file.
//!
//! Keeps diffs of the store file small: sorted keys (via `BTreeMap` in the
//! stored types), 2-space indentation and a trailing newline.

mod json;

pub use json::*;
