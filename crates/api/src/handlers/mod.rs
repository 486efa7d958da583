//! Request handlers, one submodule per resource.
//!
//! Handlers extract the principal, delegate to a repository in `tidyhome_db`
//! (which runs the core lifecycle inside a transaction) and map errors via
//! [`AppError`](crate::error::AppError).

pub mod assignments;
pub mod auth;
pub mod inspection;
pub mod maids;
pub mod me;
pub mod payments;
pub mod templates;
