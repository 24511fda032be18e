//! Ledger core
//!
//! Routing of messages to handlers, the two-phase Check/Deliver contract,
//! read-only queries and the [`Ledger`] that ties them to committed state.
//!
//! ## Design Principles
//!
//! - One handler per message path
//! - Check reads, Deliver writes, nothing else does either
//! - Every committed change goes through the journal first

mod context;
mod handler;
mod ledger;
mod query;
mod router;

pub use context::{CheckResult, Context, DeliverResult, Effect, Tx};
pub use handler::Handler;
pub use ledger::{Ledger, TickReport};
pub use query::{QueryMode, QueryModel, QueryRouter};
pub use router::Router;
