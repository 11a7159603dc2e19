//! Outbound email for issue notifications.
//!
//! - [`Mailer`]: the delivery seam; [`EmailDelivery`] implements it over SMTP.
//! - [`OutboxDispatcher`]: background service that drains the durable
//!   `email_outbox` table through a [`Mailer`], retrying with backoff.

pub mod delivery;
pub mod outbox;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, Mailer, OutgoingEmail};
pub use outbox::{OutboxConfig, OutboxDispatcher};
