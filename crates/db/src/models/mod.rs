//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` struct matching the database row
//! - `Deserialize` request DTOs, validated with `validator`

pub mod assignment;
pub mod payroll;
pub mod user;
