//! In-app notification writing for issue status changes.

pub mod fanout;

pub use fanout::store_fan_out;
