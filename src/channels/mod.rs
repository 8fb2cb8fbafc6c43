//! Channel adapters for ticket ingress/egress.

pub mod email;
pub mod email_poller;

pub use email::EmailConfig;
pub use email_poller::spawn_email_poller;
