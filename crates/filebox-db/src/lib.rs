//! Relational store access for material records.
//!
//! This crate provides:
//! - The [`MaterialRepository`] port (lookup and partial update)
//! - A MySQL implementation using sqlx
//! - An in-memory implementation for tests and local development

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

pub use error::{DbError, DbResult};
pub use memory::MemoryMaterialRepository;
pub use repository::{DbConfig, MaterialRepository, SqlxMaterialRepository};
