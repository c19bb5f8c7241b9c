//! Variable resolution module
//!
//! Parses `PROJECT:VAR` references, resolves variables across projects,
//! validates references at write time and answers reverse-dependency queries.
//!
//! # Usage
//!
//! ```
//! use envlink_application::variable_resolver::parser::{ReferenceMode, VariableRef, parse};
//!
//! let parsed = parse("API:VERSION", ReferenceMode::Linked).unwrap();
//! assert_eq!(parsed.references(), vec![&VariableRef::new("API", "VERSION")]);
//! ```

pub mod engine;
pub mod impact;
pub mod parser;
pub mod validator;

pub use engine::{ResolutionSession, ResolveError, ResolveResult, VariableResolver};
pub use impact::{AffectedExport, ImpactAnalyzer};
pub use parser::{
    Concatenation, ParseError, ParsedReference, ReferenceMode, ReferenceToken, VariableRef, parse,
};
pub use validator::{ReferenceValidator, ValidationError};
