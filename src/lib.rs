//! quillstate - deterministic state-transition engine for a blog ledger
//!
//! Users, blogs and articles live in an ordered key-value store with
//! secondary indexes. Articles may carry a deletion deadline, enforced by
//! a task scheduler that runs inside the same transactional state.

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod index;
pub mod model;
pub mod observability;
pub mod scheduler;
pub mod storage;
