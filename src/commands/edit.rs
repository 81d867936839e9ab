use serde_json::json;

use super::CommandOutput;
use crate::board::Board;
use crate::cli::OutputOptions;
use crate::client::TicketBackend;
use crate::error::Result;
use crate::types::TicketId;

/// Replace a ticket's title and/or description
///
/// Fields not given keep their current text. The resulting pair must be
/// non-blank.
pub async fn cmd_edit<B: TicketBackend>(
    backend: B,
    id: TicketId,
    title: Option<&str>,
    description: Option<&str>,
    output: OutputOptions,
) -> Result<()> {
    let mut board = Board::new(backend);
    board.fetch(id).await?;
    board.begin_edit(id)?;
    if let Some(title) = title {
        board.edit_title(title)?;
    }
    if let Some(description) = description {
        board.edit_description(description)?;
    }
    let ticket = board.save_edit().await?;

    CommandOutput::new(json!({
        "id": ticket.id,
        "action": "edited",
        "title": ticket.title,
        "description": ticket.description,
    }))
    .with_text(format!("Updated #{} {}", ticket.id, ticket.title))
    .print(output)
}
