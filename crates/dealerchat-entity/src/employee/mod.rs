//! Employee directory projection.

pub mod model;
pub mod role;

pub use model::Employee;
pub use role::EmployeeRole;
