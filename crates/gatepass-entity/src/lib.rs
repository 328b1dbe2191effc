//! # gatepass-entity
//!
//! Domain entity models for GatePass. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod access;
pub mod pass;
pub mod user;
