use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::client::TicketBackend;
use crate::display::format_ticket_detail;
use crate::error::Result;
use crate::types::TicketId;

/// Display a single ticket
pub async fn cmd_show<B: TicketBackend>(
    backend: B,
    id: TicketId,
    output: OutputOptions,
) -> Result<()> {
    let ticket = backend.get_ticket(id).await?;

    CommandOutput::new(json!(ticket))
        .with_text(format_ticket_detail(&ticket))
        .print(output)
}
