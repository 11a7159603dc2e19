//! Authentication primitives.
//!
//! - [`jwt`] -- validation of identity-provider access tokens.

pub mod jwt;
