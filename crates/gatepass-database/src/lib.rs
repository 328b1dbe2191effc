//! # gatepass-database
//!
//! PostgreSQL connection management, the store traits the services are
//! written against, their sqlx repositories, and an in-memory store with
//! the same guarantees.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{AccessLog, ConsumeOutcome, RegisterOutcome, TokenLedger, UserDirectory};
