//! HTML element trees, stored in an arena (`Document`), with
//! attribute verification against a `tagrules::AttributeRules`
//! table, lookup via simple selectors, and serialization.

pub mod into_kstring;
pub mod error;
pub mod document;
pub mod elements;
pub mod select;
pub mod print;

pub use document::{Document, NodeId, NodeKind, ToAttrs, ToBody, att, opt_att, html_escape};
pub use error::{MarkupError, MarkupErrorKind};
pub use into_kstring::IntoKString;
pub use print::DOCTYPE;
pub use select::Selector;
