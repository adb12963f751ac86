//! Command implementations for the nioi CLI
//!
//! `analyze` runs the full detection pipeline against one Python file and
//! renders the validated findings; `categories` lists the configured smell
//! taxonomy. Everything substantial lives in the detectors crate; these
//! commands are argument parsing and output.

pub mod analyze;
pub mod categories;
