//! Node configuration
//!
//! Board-agnostic settings with compiled-in defaults, optionally
//! overridden by a small `node.toml` embedded in the firmware image.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
