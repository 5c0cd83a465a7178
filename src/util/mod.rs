//! Utility functions shared by the UI.
//!
//! - **Text**: Unicode-aware width, truncation, control-character stripping
//!   and relative timestamps
//! - **Links**: building and vetting article URLs before handing them to the
//!   system browser

mod text;
mod url_validator;

pub use text::{display_width, format_relative_time, strip_control_chars, truncate_to_width};
pub use url_validator::{article_url, validate_url_for_open, UrlValidationError};
