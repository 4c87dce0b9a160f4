//! # dealerchat-entity
//!
//! Domain entity models for DealerChat. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod chat;
pub mod employee;
pub mod notification;
