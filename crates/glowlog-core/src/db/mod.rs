//! SQLite management for routine steps, completion records and products.
//!
//! This module provides the low-level, synchronous database layer behind
//! [`crate::store::SqliteStore`]. It handles connections, schema management
//! and the specialized queries for each table.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod completion_queries;
pub mod migrations;
pub mod product_queries;
pub mod step_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
