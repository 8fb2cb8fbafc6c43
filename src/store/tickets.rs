//! In-memory ticket store — ordered, append-only, write-serialized.
//!
//! The reference store for the service: a `RwLock`-guarded Vec mutated
//! only by `append` (at creation) and `resolve` (in-place field update).
//! Ids are assigned here, under the write lock, so concurrent
//! submissions can never race an id or interleave a partial record.
//! Replaceable by any durable store with the same operations.

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::pipeline::types::{Ticket, TicketStatus};

struct Inner {
    tickets: Vec<Ticket>,
    next_id: u64,
}

/// Thread-safe, insertion-ordered ticket store.
pub struct TicketStore {
    inner: RwLock<Inner>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                tickets: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Append a fully-assembled ticket, assigning its id.
    ///
    /// Ids are monotonically increasing and never reused.
    pub async fn append(&self, mut ticket: Ticket) -> Ticket {
        let mut inner = self.inner.write().await;
        ticket.id = inner.next_id;
        inner.next_id += 1;
        inner.tickets.push(ticket.clone());
        ticket
    }

    /// All tickets in insertion order.
    pub async fn list(&self) -> Vec<Ticket> {
        self.inner.read().await.tickets.clone()
    }

    /// Look up a ticket by id.
    pub async fn get(&self, id: u64) -> Option<Ticket> {
        self.inner
            .read()
            .await
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// Transition a ticket to resolved, stamping resolver and timestamp.
    ///
    /// Returns the updated record, or `NotFound` without mutating
    /// anything when the id is unknown.
    pub async fn resolve(&self, id: u64, resolved_by: &str) -> Result<Ticket, StoreError> {
        let mut inner = self.inner.write().await;
        let ticket = inner
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "ticket".into(),
                id: id.to_string(),
            })?;

        ticket.status = TicketStatus::Resolved;
        ticket.resolved_by = Some(resolved_by.to_string());
        ticket.resolved_at = Some(Utc::now());
        Ok(ticket.clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.tickets.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.tickets.is_empty()
    }
}

impl Default for TicketStore {
    fn default() -> Self {
        Self::new()
    }
}
