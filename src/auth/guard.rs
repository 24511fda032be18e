//! # Authorization Guard
//!
//! Ownership checks run before any blog or article mutation.
//!
//! ## Invariants
//! - No silent bypass: only `Caller::System` skips ownership, and only on
//!   the system route set, which never calls `require_owner`
//! - `is_authorized` is a pure predicate over its two inputs
//! - Checks run during validation, before any write

use crate::errors::{LedgerError, LedgerResult};
use crate::model::Address;
use crate::scheduler::TaskId;

/// Who submitted a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// No verified identity
    Anonymous,
    /// Identity verified by the authentication provider
    Signer(Address),
    /// Scheduler firing the task with this handle
    System(TaskId),
}

impl Caller {
    pub fn from_signer(signer: Option<Address>) -> Self {
        match signer {
            Some(addr) => Caller::Signer(addr),
            None => Caller::Anonymous,
        }
    }

    /// The acting identity, if a signer submitted the transition
    pub fn signer(&self) -> Option<&Address> {
        match self {
            Caller::Signer(addr) => Some(addr),
            _ => None,
        }
    }

    /// The acting identity or an authorization error
    pub fn require_signer(&self) -> LedgerResult<Address> {
        self.signer()
            .copied()
            .ok_or_else(|| LedgerError::unauthorized("transition has no signer"))
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Caller::System(_))
    }

    /// Handle of the task being fired, for system calls
    pub fn firing_task(&self) -> Option<TaskId> {
        match self {
            Caller::System(task) => Some(*task),
            _ => None,
        }
    }
}

/// True when the acting identity is the required owner
pub fn is_authorized(acting: Option<&Address>, required_owner: &Address) -> bool {
    acting == Some(required_owner)
}

/// Fail with Unauthorized unless the caller signed as `owner`
pub fn require_owner(caller: &Caller, owner: &Address, action: &str) -> LedgerResult<()> {
    if !is_authorized(caller.signer(), owner) {
        return Err(LedgerError::unauthorized(format!(
            "only the owner can {}",
            action
        )));
    }
    Ok(())
}
