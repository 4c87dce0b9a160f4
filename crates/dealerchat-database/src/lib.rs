//! # dealerchat-database
//!
//! Durable record of chat sessions and messages. The [`ChatStore`] trait is
//! the seam the realtime core talks to; [`PgChatStore`] backs it with
//! PostgreSQL and [`MemoryChatStore`] keeps everything in process.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::memory::MemoryChatStore;
pub use store::postgres::PgChatStore;
pub use store::{ChatStore, SessionCreation};
