//! CLI command handlers, one module per group of subcommands.
//!
//! Every handler is an [`App`](crate::App) method that renders to a writer so
//! output can be snapshotted in tests.

pub mod checkout;
pub mod elements;
pub mod history;
pub mod pulls;
pub mod status;
pub mod validate;
