//! Ledger data model
//!
//! Users, blogs and articles, plus the identity and time primitives they
//! reference. Every stored type validates its own fields; messages reuse
//! the same format rules.

mod address;
mod article;
mod blog;
mod record;
mod time;
mod user;
pub mod validation;

pub use address::{Address, ADDRESS_LEN};
pub use article::Article;
pub use blog::Blog;
pub use record::{Object, Record, RecordId, RecordKind};
pub use time::UnixTime;
pub use user::User;
