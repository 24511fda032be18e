//! # Authorization
//!
//! Identity is supplied by an external authentication provider; this module
//! only decides whether a verified identity may act on a record.

mod guard;

pub use guard::{is_authorized, require_owner, Caller};
