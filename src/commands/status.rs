use serde_json::json;

use super::CommandOutput;
use crate::board::Board;
use crate::cli::OutputOptions;
use crate::client::TicketBackend;
use crate::display::format_status_colored;
use crate::error::Result;
use crate::types::{TicketId, TicketStatus};

/// Update a ticket's status. Closed tickets are rejected before any request.
pub async fn cmd_status<B: TicketBackend>(
    backend: B,
    id: TicketId,
    status: TicketStatus,
    output: OutputOptions,
) -> Result<()> {
    let mut board = Board::new(backend);
    let previous = board.fetch(id).await?.status;
    let ticket = board.set_status(id, status).await?;

    let previous_text = previous.as_ref().map(ToString::to_string);
    let new_text = ticket.status.as_ref().map(ToString::to_string);

    CommandOutput::new(json!({
        "id": ticket.id,
        "action": "status_changed",
        "previous_status": previous_text,
        "new_status": new_text,
    }))
    .with_text(format!(
        "Updated #{} {} -> {}",
        ticket.id,
        format_status_colored(previous.as_ref()),
        format_status_colored(ticket.status.as_ref())
    ))
    .print(output)
}
