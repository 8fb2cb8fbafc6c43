//! The ticket intake pipeline.
//!
//! Every submission from any channel flows through:
//! 1. `SecurityFilter::score()` — phishing heuristics, may short-circuit
//! 2. `PiiRedactor::redact()` — reversible masking + model-safe stripping
//! 3. `ClientDirectory::resolve()` — client context, never fails
//! 4. `classify()` → `ChurnScorer::score()` → `generate_insight()`
//! 5. `TicketProcessor` assembles the record and appends it to the store
//!
//! Quarantined submissions produce no ticket.

pub mod churn;
pub mod classify;
pub mod insight;
pub mod processor;
pub mod redact;
pub mod security;
pub mod types;
