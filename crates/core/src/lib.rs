//! Domain core for the cleaning-service back office.
//!
//! Everything in this crate is pure logic with no database or HTTP
//! dependencies: identifiers, the error taxonomy, roles, service types,
//! checklist templates and instances, the assignment lifecycle state
//! machine, and the payroll ledger derivation.

pub mod assignment;
pub mod checklist;
pub mod error;
pub mod lifecycle;
pub mod payroll;
pub mod roles;
pub mod service_type;
pub mod status;
pub mod types;
