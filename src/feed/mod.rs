//! Feed items and parsing
//!
//! An [`Item`] is one parsed feed entry exposing named fields. The
//! [`FeedParser`] trait turns a response body into an ordered list of items;
//! [`RssParser`] is the default implementation for RSS 2.0 documents.

mod item;
mod parser;

pub use item::{fields, Item};
pub use parser::{FeedParser, RssParser};
