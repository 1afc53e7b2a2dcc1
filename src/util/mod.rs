//! Utility functions for common operations.
//!
//! This module provides reusable utilities for:
//!
//! - **Text processing**: control-character stripping for XML character data
//! - **URL checks**: absolute http(s) URL validation for feed fields
//! - **File output**: atomic write-to-temp-then-rename
//!
//! # Examples
//!
//! ```
//! use rssforge::util::{strip_control_chars, validate_feed_url};
//!
//! assert_eq!(strip_control_chars("a\u{0}b"), "ab");
//! assert!(validate_feed_url("https://example.com/feed.xml").is_ok());
//! ```

mod fs;
mod text;
mod url_validator;

pub use fs::write_atomic;
pub use text::strip_control_chars;
pub use url_validator::{validate_feed_url, UrlValidationError};
