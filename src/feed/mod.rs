//! RSS 2.0 document generation.
//!
//! Turns typed channel and item data into escaped, well-formed XML text:
//!
//! - **Escaping**: memoized XML escaping for element text and attributes
//! - **Dates**: RFC 822 formatting in UTC for `pubDate`/`lastBuildDate`
//! - **CDATA**: terminator-safe embedding of rich `content:encoded`
//! - **Assembly**: channel validation, item filtering and document layout
//!
//! # Architecture
//!
//! - [`writer`] - [`FeedWriter`], the single entry point for a document
//! - [`item`] - one `<item>` per [`FeedItem`]
//! - [`escape`], [`date`], [`cdata`], [`category`] - text-safety leaves
//! - [`adapter`] - [`EntryMapper`] for arbitrary source collections
//! - [`verify`] - re-reads output to confirm well-formedness
//!
//! Data flows one way: writer → item → leaves. The only state that outlives
//! a call is the escape cache.
//!
//! # Example
//!
//! ```
//! use rssforge::feed::{generate_rss, FeedChannel, FeedItem};
//!
//! let mut channel = FeedChannel::new(
//!     "My Blog",
//!     "Latest posts",
//!     "https://example.com",
//!     "https://example.com/feed.xml",
//! );
//! channel.items.push(FeedItem::new("Hello", "https://example.com/hello"));
//!
//! let xml = generate_rss(&channel).unwrap();
//! assert!(xml.starts_with("<?xml"));
//! ```

pub mod adapter;
pub mod category;
pub mod cdata;
pub mod date;
pub mod escape;
pub mod item;
mod types;
pub mod verify;
pub mod writer;

pub use adapter::{map_entry, render_collection, EntryMapper, FeedMeta};
pub use date::{format_rfc822, format_timestamp};
pub use escape::{escape_xml, Escaper};
pub use item::{render_item, DEFAULT_ENCLOSURE_TYPE};
pub use types::{Category, Enclosure, FeedChannel, FeedError, FeedItem, Timestamp};
pub use verify::{check_well_formed, WellFormedError};
pub use writer::{generate_rss, FeedWriter, DEFAULT_LANGUAGE};
