//! Message routing
//!
//! Maps message paths to handlers. The ledger keeps two routers: one for
//! external transactions and one for messages fired by the scheduler.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{LedgerError, LedgerResult};
use crate::handlers::Msg;

use super::handler::Handler;

/// Path to handler table
#[derive(Default, Clone)]
pub struct Router {
    routes: BTreeMap<&'static str, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; a path may be registered once
    pub fn handle(&mut self, path: &'static str, handler: Arc<dyn Handler>) -> LedgerResult<()> {
        if self.routes.contains_key(path) {
            return Err(LedgerError::consistency(format!(
                "path {} already registered",
                path
            )));
        }
        self.routes.insert(path, handler);
        Ok(())
    }

    /// Handler for the message's path
    pub fn route(&self, msg: &Msg) -> LedgerResult<&dyn Handler> {
        self.routes
            .get(msg.path())
            .map(|h| h.as_ref())
            .ok_or_else(|| LedgerError::not_found(format!("no handler for path {}", msg.path())))
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("paths", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}
