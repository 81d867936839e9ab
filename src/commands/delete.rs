use serde_json::json;

use super::CommandOutput;
use crate::board::Board;
use crate::cli::OutputOptions;
use crate::client::TicketBackend;
use crate::error::Result;
use crate::types::TicketId;

/// Delete a ticket
pub async fn cmd_delete<B: TicketBackend>(
    backend: B,
    id: TicketId,
    output: OutputOptions,
) -> Result<()> {
    let mut board = Board::new(backend);
    let ticket = board.fetch(id).await?;
    board.delete(id).await?;

    CommandOutput::new(json!({
        "id": id,
        "action": "deleted",
        "title": ticket.title,
    }))
    .with_text(format!("Deleted #{id} {}", ticket.title))
    .print(output)
}
