use owo_colors::{OwoColorize, Stream::Stdout};
use serde_json::json;

use super::CommandOutput;
use crate::board::Board;
use crate::cli::OutputOptions;
use crate::client::TicketBackend;
use crate::error::Result;
use crate::types::TicketPriority;

/// Create a new ticket and print its ID
///
/// Title and description are trimmed; either one blank is rejected before
/// anything is sent.
pub async fn cmd_create<B: TicketBackend>(
    backend: B,
    title: &str,
    description: &str,
    priority: TicketPriority,
    output: OutputOptions,
) -> Result<()> {
    let mut board = Board::new(backend);
    let ticket = board.create(title, description, priority).await?;

    let text = format!(
        "Created {} {}",
        format!("#{}", ticket.id).if_supports_color(Stdout, |t| t.cyan()),
        ticket.title
    );
    CommandOutput::new(json!(ticket)).with_text(text).print(output)
}
