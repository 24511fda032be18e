//! Transition handler trait

use crate::errors::LedgerResult;
use crate::handlers::Msg;
use crate::storage::KvStore;

use super::context::{CheckResult, Context, DeliverResult};

/// Check/Deliver pair for one message path.
///
/// `check` sees the store read-only, so it can neither write records nor
/// reach the scheduler. `deliver` repeats the same validation before it
/// mutates anything.
pub trait Handler: Send + Sync {
    fn check(&self, ctx: &Context, store: &dyn KvStore, msg: &Msg) -> LedgerResult<CheckResult>;

    fn deliver(&self, ctx: &Context, store: &mut dyn KvStore, msg: &Msg) -> LedgerResult<DeliverResult>;
}
