//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod test;
mod validate;

pub use completions::handle_completions;
pub use test::handle_test;
pub use validate::handle_validate;

use crate::error::{Error, Result};
use datatype_schemas::ValidationConfig;

/// Apply command-line overrides on top of the configured validation settings
fn validation_config(
    configured: &ValidationConfig,
    max_depth: Option<usize>,
    max_errors: Option<usize>,
) -> Result<ValidationConfig> {
    let mut config = configured.clone();
    if let Some(depth) = max_depth {
        if depth == 0 {
            return Err(Error::invalid_args("--max-depth must be at least 1"));
        }
        config = config.with_max_reference_depth(depth);
    }
    if let Some(limit) = max_errors {
        config = config.with_max_errors(limit);
    }
    Ok(config)
}
