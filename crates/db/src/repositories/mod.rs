//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod assignment_repo;
pub mod payroll_repo;
pub mod user_repo;

pub use assignment_repo::AssignmentRepo;
pub use payroll_repo::PayrollRepo;
pub use user_repo::UserRepo;
