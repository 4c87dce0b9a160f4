//! PostgreSQL repositories, one per table.

pub mod employee;
pub mod message;
pub mod session;

pub use employee::EmployeeRepository;
pub use message::MessageRepository;
pub use session::SessionRepository;
