//! Database layer: SQLx/PostgreSQL persistence behind repositories.
//!
//! - [`handlers`]: repository implementations, one per table
//! - [`models`]: database-facing request/response records
//! - [`errors`]: database error classification
//! - [`pools`]: bounded connection pool construction
//!
//! Repositories borrow a `&mut PgConnection`, so multi-statement operations
//! run inside a caller-owned transaction and single reads can use a plain
//! acquired connection.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod pools;
