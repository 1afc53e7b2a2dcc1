//! Generates RSS 2.0 feed documents from structured entries.
//!
//! See [`feed`] for the document engine; [`config`] and [`input`] back the
//! `rssforge` command-line tool.

pub mod config;
pub mod feed;
pub mod input;
pub mod util;
