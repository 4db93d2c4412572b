//! Output formatters for duplicate scan results.
//!
//! - Text for people: one block per group, paths shell-quoted
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use find_duplicates::duplicates::DuplicateFinder;
//! use find_duplicates::output::TextOutput;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//! print!("{}", TextOutput::new(&report).render());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::{shell_quote, TextOutput};
