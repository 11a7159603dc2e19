pub mod admin;
pub mod advisor;
pub mod analytics;
pub mod corrected;
pub mod geocode;
pub mod issue;
pub mod notification;
pub mod user;
