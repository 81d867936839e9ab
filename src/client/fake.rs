//! In-memory backend for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::TicketBackend;
use crate::error::{DeskError, Result};
use crate::types::{NewTicket, Ticket, TicketId, TicketPatch};

/// Stores tickets in a vector and can be told to fail the next request.
#[derive(Default)]
pub struct FakeBackend {
    pub tickets: Mutex<Vec<Ticket>>,
    next_id: Mutex<u64>,
    fail_with: Mutex<Option<(u16, String)>>,
    pub requests: AtomicUsize,
}

impl FakeBackend {
    pub fn with(tickets: Vec<Ticket>) -> Self {
        let next = tickets.iter().map(|t| t.id.get()).max().unwrap_or(0) + 1;
        Self {
            tickets: Mutex::new(tickets),
            next_id: Mutex::new(next),
            ..Default::default()
        }
    }

    pub fn fail_next(&self, status: u16, detail: &str) {
        *self.fail_with.lock().unwrap() = Some((status, detail.to_string()));
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<Ticket> {
        self.tickets.lock().unwrap().clone()
    }

    fn take_failure(&self) -> Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.fail_with.lock().unwrap().take() {
            Some((status, detail)) => Err(DeskError::Api { status, detail }),
            None => Ok(()),
        }
    }
}

impl TicketBackend for FakeBackend {
    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.take_failure()?;
        Ok(self.stored())
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Ticket> {
        self.take_failure()?;
        self.stored()
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(DeskError::TicketNotFound(id, None))
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        self.take_failure()?;
        let mut next = self.next_id.lock().unwrap();
        let created = Ticket {
            id: TicketId::new(*next),
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            priority: Some(ticket.priority.clone()),
            status: Some(ticket.status.clone()),
            tags: ticket.tags.clone(),
        };
        *next += 1;
        self.tickets.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<Ticket> {
        self.take_failure()?;
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DeskError::TicketNotFound(id, None))?;
        patch.apply_to(ticket);
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<()> {
        self.take_failure()?;
        let mut tickets = self.tickets.lock().unwrap();
        let before = tickets.len();
        tickets.retain(|t| t.id != id);
        if tickets.len() == before {
            return Err(DeskError::TicketNotFound(id, None));
        }
        Ok(())
    }
}
