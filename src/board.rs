//! In-memory ticket board: the snapshot, the view controls and the mutations.
//!
//! Mutations are applied to the local snapshot first and then sent to the
//! backend. A failed request rolls the local change back and returns the
//! error; a successful one replaces the local ticket with the backend's copy.
//! The next `refresh` replaces the whole snapshot, so any drift between the
//! optimistic copy and the backend is reconciled there.

use crate::client::TicketBackend;
use crate::error::{DeskError, Result};
use crate::query::{ActiveFilters, Admission, ClauseDraft, FilterClause, SortSpec, derive};
use crate::types::{
    NewTicket, Ticket, TicketId, TicketPatch, TicketPriority, TicketStatus,
    require_title_and_description,
};

/// State of the ticket currently being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    /// Message shown next to the form after a failed save.
    pub error: Option<String>,
}

pub struct Board<B> {
    backend: B,
    tickets: Vec<Ticket>,
    filters: ActiveFilters,
    draft: ClauseDraft,
    sort: SortSpec,
    editing: Option<EditState>,
}

impl<B: TicketBackend> Board<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tickets: Vec::new(),
            filters: ActiveFilters::new(),
            draft: ClauseDraft::default(),
            sort: SortSpec::default(),
            editing: None,
        }
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The raw snapshot, in backend order.
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// The filtered, sorted view to render.
    pub fn visible(&self) -> Vec<Ticket> {
        derive(&self.tickets, self.filters.clauses(), self.sort)
    }

    pub fn filters(&self) -> &[FilterClause] {
        self.filters.clauses()
    }

    pub fn draft(&self) -> &ClauseDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ClauseDraft {
        &mut self.draft
    }

    /// Admit the drafted clause into the active filters.
    pub fn add_filter(&mut self) -> Admission {
        self.filters.admit(&mut self.draft)
    }

    pub fn remove_filter(&mut self, index: usize) -> Option<FilterClause> {
        self.filters.remove(index)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    /// Replace the snapshot with the backend's current collection.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.backend.list_tickets().await {
            Ok(tickets) => {
                tracing::debug!(count = tickets.len(), "snapshot refreshed");
                self.tickets = tickets;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("failed to fetch tickets, keeping stale list: {e}");
                Err(e)
            }
        }
    }

    /// Fetch a single ticket and merge it into the snapshot.
    pub async fn fetch(&mut self, id: TicketId) -> Result<Ticket> {
        let ticket = self.backend.get_ticket(id).await?;
        self.upsert(ticket.clone());
        Ok(ticket)
    }

    /// Validate and create a ticket, then add it to the snapshot.
    pub async fn create(
        &mut self,
        title: &str,
        description: &str,
        priority: TicketPriority,
    ) -> Result<Ticket> {
        let new_ticket = NewTicket::new(title, description, priority)?;
        let created = self.backend.create_ticket(&new_ticket).await?;
        self.upsert(created.clone());
        Ok(created)
    }

    /// Change a ticket's status. Closed tickets are final.
    pub async fn set_status(&mut self, id: TicketId, status: TicketStatus) -> Result<Ticket> {
        let index = self.position(id)?;
        if self.tickets[index].is_closed() {
            return Err(DeskError::TicketClosed(id));
        }

        let patch = TicketPatch::status(status);
        let previous = self.tickets[index].clone();
        patch.apply_to(&mut self.tickets[index]);

        match self.backend.update_ticket(id, &patch).await {
            Ok(updated) => {
                self.upsert(updated.clone());
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!(%id, "status update failed, rolling back: {e}");
                self.restore(index, previous);
                Err(e)
            }
        }
    }

    /// Remove a ticket locally and on the backend.
    pub async fn delete(&mut self, id: TicketId) -> Result<()> {
        let index = self.position(id)?;
        let removed = self.tickets.remove(index);

        if let Err(e) = self.backend.delete_ticket(id).await {
            tracing::warn!(%id, "delete failed, restoring ticket: {e}");
            let at = index.min(self.tickets.len());
            self.tickets.insert(at, removed);
            return Err(e);
        }

        if self.editing.as_ref().is_some_and(|edit| edit.id == id) {
            self.editing = None;
        }
        Ok(())
    }

    /// Enter edit mode for a ticket, seeding the form with its current text.
    pub fn begin_edit(&mut self, id: TicketId) -> Result<&EditState> {
        let ticket = self.ticket(id).ok_or(DeskError::TicketNotFound(id, None))?;
        if ticket.is_closed() {
            return Err(DeskError::TicketClosed(id));
        }
        let state = EditState {
            id,
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            error: None,
        };
        Ok(self.editing.insert(state))
    }

    pub fn edit_title(&mut self, title: &str) -> Result<()> {
        let edit = self.editing.as_mut().ok_or(DeskError::NotEditing)?;
        edit.title = title.to_string();
        Ok(())
    }

    pub fn edit_description(&mut self, description: &str) -> Result<()> {
        let edit = self.editing.as_mut().ok_or(DeskError::NotEditing)?;
        edit.description = description.to_string();
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save the edit form.
    ///
    /// Blank fields are rejected before any request. Any failure is recorded
    /// in the edit state and edit mode stays active; success leaves edit mode.
    pub async fn save_edit(&mut self) -> Result<Ticket> {
        let id = self.editing.as_ref().ok_or(DeskError::NotEditing)?.id;
        let closed = self.ticket(id).is_some_and(Ticket::is_closed);
        let edit = self.editing.as_mut().ok_or(DeskError::NotEditing)?;
        if closed {
            let e = DeskError::TicketClosed(id);
            edit.error = Some(e.inline_message());
            return Err(e);
        }

        let checked = require_title_and_description(&edit.title, &edit.description);
        let (title, description) = match checked {
            Ok(pair) => pair,
            Err(e) => {
                edit.error = Some(e.inline_message());
                return Err(e);
            }
        };

        let patch = TicketPatch::text(title, description);
        match self.backend.update_ticket(id, &patch).await {
            Ok(updated) => {
                self.upsert(updated.clone());
                self.editing = None;
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!(%id, "edit save failed: {e}");
                if let Some(edit) = self.editing.as_mut() {
                    edit.error = Some(e.inline_message());
                }
                Err(e)
            }
        }
    }

    fn position(&self, id: TicketId) -> Result<usize> {
        self.tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or(DeskError::TicketNotFound(id, None))
    }

    /// Replace a ticket in place, or append it if the snapshot lacks it.
    fn upsert(&mut self, ticket: Ticket) {
        match self.tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(existing) => *existing = ticket,
            None => self.tickets.push(ticket),
        }
    }

    fn restore(&mut self, index: usize, previous: Ticket) {
        match self.tickets.get_mut(index) {
            Some(slot) if slot.id == previous.id => *slot = previous,
            _ => self.upsert(previous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeBackend;
    use crate::query::{FilterCriterion, SortKey, SortOrder};
    use crate::types::EMPTY_FIELDS_MESSAGE;

    fn seeded() -> Vec<Ticket> {
        vec![
            Ticket::new(1, "Printer", "Paper jam")
                .with_status(TicketStatus::Closed)
                .with_priority(TicketPriority::Low),
            Ticket::new(2, "VPN", "Cannot connect")
                .with_status(TicketStatus::Open)
                .with_priority(TicketPriority::High),
            Ticket::new(3, "Laptop", "Battery drains")
                .with_status(TicketStatus::InProgress)
                .with_priority(TicketPriority::Medium),
        ]
    }

    async fn loaded_board() -> Board<FakeBackend> {
        let mut board = Board::new(FakeBackend::with(seeded()));
        board.refresh().await.unwrap();
        board
    }

    fn ids(tickets: &[Ticket]) -> Vec<u64> {
        tickets.iter().map(|t| t.id.get()).collect()
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_stale_snapshot() {
        let mut board = loaded_board().await;
        board.backend().fail_next(503, "down");
        assert!(board.refresh().await.is_err());
        assert_eq!(ids(board.tickets()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_visible_applies_filters_and_sort() {
        let mut board = loaded_board().await;
        board.set_sort(SortSpec::new(SortKey::Priority, SortOrder::Asc));
        assert_eq!(ids(&board.visible()), vec![2, 3, 1]);

        board.draft_mut().set_criterion(FilterCriterion::Status);
        board.draft_mut().set_value("closed");
        assert_eq!(board.add_filter(), Admission::Admitted);
        assert_eq!(ids(&board.visible()), vec![1]);

        board.clear_filters();
        assert_eq!(board.visible().len(), 3);
    }

    #[tokio::test]
    async fn test_create_appends_and_sends_open_status() {
        let mut board = loaded_board().await;
        let created = board
            .create("  Monitor ", " Flickers ", TicketPriority::Medium)
            .await
            .unwrap();

        assert_eq!(created.id, TicketId::new(4));
        assert_eq!(created.title, "Monitor");
        assert_eq!(created.status, Some(TicketStatus::Open));
        assert!(created.tags.is_empty());
        assert_eq!(ids(board.tickets()), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_create_blank_rejected_without_request() {
        let mut board = loaded_board().await;
        let before = board.backend().request_count();
        let err = board.create("", "desc", TicketPriority::Low).await.unwrap_err();
        assert_eq!(err.to_string(), EMPTY_FIELDS_MESSAGE);
        assert_eq!(board.backend().request_count(), before);
    }

    #[tokio::test]
    async fn test_set_status_updates_snapshot() {
        let mut board = loaded_board().await;
        let updated = board
            .set_status(TicketId::new(2), TicketStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated.status, Some(TicketStatus::InProgress));
        assert_eq!(
            board.ticket(TicketId::new(2)).unwrap().status,
            Some(TicketStatus::InProgress)
        );
    }

    #[tokio::test]
    async fn test_set_status_failure_rolls_back() {
        let mut board = loaded_board().await;
        board.backend().fail_next(400, "Invalid transition");
        let err = board
            .set_status(TicketId::new(2), TicketStatus::Closed)
            .await
            .unwrap_err();
        assert_eq!(err.inline_message(), "Invalid transition");
        assert_eq!(
            board.ticket(TicketId::new(2)).unwrap().status,
            Some(TicketStatus::Open)
        );
    }

    #[tokio::test]
    async fn test_closed_ticket_is_final() {
        let mut board = loaded_board().await;
        let before = board.backend().request_count();
        let err = board
            .set_status(TicketId::new(1), TicketStatus::Open)
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::TicketClosed(_)));
        assert!(board.begin_edit(TicketId::new(1)).is_err());
        assert_eq!(board.backend().request_count(), before);
    }

    #[tokio::test]
    async fn test_unknown_ticket() {
        let mut board = loaded_board().await;
        assert!(matches!(
            board.delete(TicketId::new(99)).await,
            Err(DeskError::TicketNotFound(..))
        ));
        assert!(matches!(
            board.set_status(TicketId::new(99), TicketStatus::Closed).await,
            Err(DeskError::TicketNotFound(..))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_locally_and_remotely() {
        let mut board = loaded_board().await;
        board.delete(TicketId::new(2)).await.unwrap();
        assert_eq!(ids(board.tickets()), vec![1, 3]);
        assert_eq!(ids(&board.backend().stored()), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_delete_failure_restores_in_place() {
        let mut board = loaded_board().await;
        board.backend().fail_next(500, "boom");
        assert!(board.delete(TicketId::new(2)).await.is_err());
        assert_eq!(ids(board.tickets()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_edit_roundtrip() {
        let mut board = loaded_board().await;
        let state = board.begin_edit(TicketId::new(3)).unwrap();
        assert_eq!(state.title, "Laptop");

        board.edit_title("Laptop battery").unwrap();
        board.edit_description("Drains in an hour").unwrap();
        let saved = board.save_edit().await.unwrap();

        assert_eq!(saved.title, "Laptop battery");
        assert!(board.editing().is_none());
        assert_eq!(
            board.ticket(TicketId::new(3)).unwrap().description,
            "Drains in an hour"
        );
    }

    #[tokio::test]
    async fn test_edit_blank_rejected_inline() {
        let mut board = loaded_board().await;
        board.begin_edit(TicketId::new(3)).unwrap();
        board.edit_title("   ").unwrap();
        let before = board.backend().request_count();

        assert!(board.save_edit().await.is_err());
        let edit = board.editing().unwrap();
        assert_eq!(edit.error.as_deref(), Some(EMPTY_FIELDS_MESSAGE));
        assert_eq!(board.backend().request_count(), before);
        assert_eq!(board.ticket(TicketId::new(3)).unwrap().title, "Laptop");
    }

    #[tokio::test]
    async fn test_edit_backend_detail_shown_inline() {
        let mut board = loaded_board().await;
        board.begin_edit(TicketId::new(2)).unwrap();
        board.edit_title("VPN down").unwrap();
        board.backend().fail_next(409, "Title already used");

        assert!(board.save_edit().await.is_err());
        let edit = board.editing().unwrap();
        assert_eq!(edit.error.as_deref(), Some("Title already used"));
        assert_eq!(board.ticket(TicketId::new(2)).unwrap().title, "VPN");
    }

    #[tokio::test]
    async fn test_save_rejected_after_ticket_closed() {
        let mut board = loaded_board().await;
        board.begin_edit(TicketId::new(2)).unwrap();
        board.set_status(TicketId::new(2), TicketStatus::Closed).await.unwrap();
        board.edit_title("changed after close").unwrap();

        assert!(matches!(
            board.save_edit().await,
            Err(DeskError::TicketClosed(_))
        ));
        let edit = board.editing().unwrap();
        assert!(edit.error.as_deref().unwrap().contains("closed"));
        let stored = board.backend().stored();
        let vpn = stored.iter().find(|t| t.id == TicketId::new(2)).unwrap();
        assert_eq!(vpn.title, "VPN");
    }

    #[tokio::test]
    async fn test_save_without_edit() {
        let mut board = loaded_board().await;
        assert!(matches!(
            board.save_edit().await,
            Err(DeskError::NotEditing)
        ));
        board.begin_edit(TicketId::new(2)).unwrap();
        board.cancel_edit();
        assert!(board.editing().is_none());
    }

    #[tokio::test]
    async fn test_fetch_merges_single_ticket() {
        let mut board = Board::new(FakeBackend::with(seeded()));
        let ticket = board.fetch(TicketId::new(2)).await.unwrap();
        assert_eq!(ticket.title, "VPN");
        assert_eq!(ids(board.tickets()), vec![2]);

        board.set_status(TicketId::new(2), TicketStatus::InProgress).await.unwrap();
        assert!(matches!(
            board.fetch(TicketId::new(42)).await,
            Err(DeskError::TicketNotFound(..))
        ));
    }

    #[tokio::test]
    async fn test_refresh_reconciles_local_changes() {
        let mut board = loaded_board().await;
        board.delete(TicketId::new(3)).await.unwrap();
        // Added by another client
        board
            .backend()
            .tickets
            .lock()
            .unwrap()
            .push(Ticket::new(10, "External", "Added elsewhere"));
        board.refresh().await.unwrap();
        assert_eq!(ids(board.tickets()), vec![1, 2, 10]);
    }
}
