//! Small helpers shared between the tablehtml crates: stderr
//! diagnostics, boxed error definitions and env var parsing.

pub mod warn;
pub mod time;
pub mod boxed_error;
pub mod env;
