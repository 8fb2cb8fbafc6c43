//! Ticket persistence.

pub mod tickets;

pub use tickets::TicketStore;
