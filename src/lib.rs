//! Rendering of tables (e.g. from CSV files) to HTML. Cells can opt
//! into richer content via prefixes like `@img:` or `@color:`, see
//! `specializer`.

pub mod io_util;
pub mod table;
pub mod specializer;
pub mod specializers;
pub mod html_table;
pub mod template;
pub mod config;
