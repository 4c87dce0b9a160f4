//! Employee directory repository implementation.

use sqlx::PgPool;

use dealerchat_core::error::{AppError, ErrorKind};
use dealerchat_core::result::AppResult;
use dealerchat_core::types::EmployeeId;
use dealerchat_entity::employee::{Employee, EmployeeRole};

/// Read access to the employee directory.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    /// Create a new employee repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an employee by ID.
    pub async fn find_by_id(&self, id: EmployeeId) -> AppResult<Option<Employee>> {
        sqlx::query_as::<_, Employee>(
            "SELECT id, name, role, is_activated, created_at FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find employee", e))
    }

    /// All employees, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<Employee>> {
        sqlx::query_as::<_, Employee>(
            "SELECT id, name, role, is_activated, created_at FROM employees \
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list employees", e))
    }

    /// The activated employee of `role` with the fewest active sessions.
    ///
    /// Ties go to the longest-registered employee.
    pub async fn find_least_loaded(&self, role: EmployeeRole) -> AppResult<Option<Employee>> {
        sqlx::query_as::<_, Employee>(
            "SELECT e.id, e.name, e.role, e.is_activated, e.created_at \
             FROM employees e \
             LEFT JOIN chat_sessions s ON s.employee_id = e.id AND s.status = 'ACTIVE' \
             WHERE e.role = $1 AND e.is_activated \
             GROUP BY e.id \
             ORDER BY COUNT(s.id) ASC, e.created_at ASC, e.id ASC \
             LIMIT 1",
        )
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to pick an available employee", e)
        })
    }
}
