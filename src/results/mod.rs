//! Result storage and filtering
//!
//! [`ResultSet`] holds the items fetched per subject and the filters
//! registered on them, and computes the filtered view lazily.

mod container;
mod filter;
mod types;

pub use container::ResultSet;
pub use filter::{FieldValue, Filter, Predicate, Scope, Where};
pub use types::{FilterMode, RawStorage};
