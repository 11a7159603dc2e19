//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Methods that take part in multi-statement transactions accept any
//! `PgExecutor`, so callers can pass either `&PgPool` or `&mut *tx`.

pub mod corrected_repo;
pub mod issue_repo;
pub mod notification_repo;
pub mod outbox_repo;
pub mod user_repo;

pub use corrected_repo::CorrectedRepo;
pub use issue_repo::{IssueFilter, IssueRepo, NewIssue, RadiusFilter};
pub use notification_repo::NotificationRepo;
pub use outbox_repo::OutboxRepo;
pub use user_repo::UserRepo;
