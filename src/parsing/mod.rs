//! Grammar engine and classifier for plaintext chat exports.
//!
//! Parsing happens in two steps:
//!
//! 1. [`grammar::parse_structure`] splits the text into header units with
//!    their continuation lines and classifies every header against the
//!    locale's phrase catalog.
//! 2. [`reducer::reduce`] turns those borrowed spans into owned [`Record`]s.
//!
//! Locales plug in through the [`Locale`] trait; [`German`] is the reference
//! grammar.
//!
//! [`Record`]: crate::message::Record

pub mod catalog;
pub mod german;
pub mod grammar;
pub mod reducer;
pub mod timestamp;

// Re-export commonly used items
pub use catalog::{EventCatalog, EventMatch, EventRule, Field, Locale};
pub use german::German;
pub use grammar::{HeaderKind, LogTree, Unit, UserContent, is_header, normalize, parse_structure};
pub use reducer::reduce;
pub use timestamp::parse_timestamp;
