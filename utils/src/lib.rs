//! Shared utilities for the plait ledger.

pub mod logging;

pub use logging::init_tracing;
