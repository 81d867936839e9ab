//! Ticket backend access.
//!
//! The backend is a JSON-over-HTTP CRUD service. [`TicketBackend`] is the
//! seam the rest of the crate talks to; [`HttpBackend`] is the real
//! implementation and tests substitute in-memory fakes.

pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod http;

use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::types::{NewTicket, Ticket, TicketId, TicketPatch};

pub use http::HttpBackend;

/// Common interface for ticket backends
pub trait TicketBackend: Send + Sync {
    /// Fetch every ticket (`GET /tickets`)
    fn list_tickets(&self) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// Fetch one ticket (`GET /tickets/{id}`)
    fn get_ticket(&self, id: TicketId) -> impl Future<Output = Result<Ticket>> + Send;

    /// Create a ticket (`POST /tickets`); the backend assigns the id
    fn create_ticket(&self, ticket: &NewTicket) -> impl Future<Output = Result<Ticket>> + Send;

    /// Apply a partial update (`PATCH /tickets/{id}`)
    fn update_ticket(
        &self,
        id: TicketId,
        patch: &TicketPatch,
    ) -> impl Future<Output = Result<Ticket>> + Send;

    /// Delete a ticket (`DELETE /tickets/{id}`)
    fn delete_ticket(&self, id: TicketId) -> impl Future<Output = Result<()>> + Send;
}

/// Retry settings for idempotent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub retries: u32,
    /// Delay before the first retry; doubles each time
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            base_delay: Duration::from_millis(200),
        }
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Run `operation`, retrying transient failures with exponential backoff.
///
/// Only use this for requests that are safe to repeat.
pub async fn execute_with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.retries && error::is_transient(&e) => {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient error: {e}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
