//! Civic issue reporting domain logic.
//!
//! Everything in this crate is pure: vocabularies and their validation, the
//! status transition table, advisor response normalization, geodesic math,
//! notification fan-out planning, analytics aggregation and the access
//! allow-list. Database and HTTP concerns live in the other workspace crates.

pub mod access;
pub mod analytics;
pub mod classification;
pub mod error;
pub mod fanout;
pub mod geo;
pub mod issue;
pub mod points;
pub mod priority;
pub mod search;
pub mod types;
