//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for request bodies and query strings

pub mod corrected;
pub mod issue;
pub mod notification;
pub mod outbox;
pub mod user;
