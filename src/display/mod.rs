use owo_colors::{OwoColorize, Stream::Stdout};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::board::EditState;
use crate::query::FilterClause;
use crate::types::{Ticket, TicketPriority, TicketStatus};

pub fn format_status_colored(status: Option<&TicketStatus>) -> String {
    let Some(status) = status else {
        return "-".to_string();
    };
    let badge = format!("[{status}]");
    match status {
        TicketStatus::Open => badge.if_supports_color(Stdout, |t| t.yellow()).to_string(),
        TicketStatus::InProgress => badge.if_supports_color(Stdout, |t| t.cyan()).to_string(),
        TicketStatus::Closed => badge.if_supports_color(Stdout, |t| t.green()).to_string(),
        TicketStatus::Other(_) => badge.if_supports_color(Stdout, |t| t.dimmed()).to_string(),
    }
}

pub fn format_priority_colored(priority: Option<&TicketPriority>) -> String {
    let Some(priority) = priority else {
        return "-".to_string();
    };
    let label = priority.to_string();
    match priority {
        TicketPriority::High => label.if_supports_color(Stdout, |t| t.red()).to_string(),
        TicketPriority::Medium => label.if_supports_color(Stdout, |t| t.yellow()).to_string(),
        _ => label,
    }
}

/// Format a ticket for single-line display
pub fn format_ticket_line(ticket: &Ticket) -> String {
    let id = format!("#{:<5}", ticket.id.to_string());
    format!(
        "{} {} {} - {}",
        id.if_supports_color(Stdout, |t| t.cyan()),
        format_status_colored(ticket.status.as_ref()),
        format_priority_colored(ticket.priority.as_ref()),
        ticket.title
    )
}

/// Multi-line view used by `show`.
pub fn format_ticket_detail(ticket: &Ticket) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        format!("#{}", ticket.id).if_supports_color(Stdout, |t| t.cyan()),
        ticket.title.if_supports_color(Stdout, |t| t.bold())
    ));
    out.push_str(&format!(
        "status: {}\n",
        format_status_colored(ticket.status.as_ref())
    ));
    out.push_str(&format!(
        "priority: {}\n",
        format_priority_colored(ticket.priority.as_ref())
    ));
    if !ticket.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", ticket.tags.join(", ")));
    }
    out.push('\n');
    out.push_str(&ticket.description);
    out
}

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Ticket> for TicketRow {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id.to_string(),
            status: ticket
                .status
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            priority: ticket
                .priority
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            title: ticket.title.clone(),
            tags: ticket.tags.join(", "),
        }
    }
}

/// Render tickets as a table for `ls`.
pub fn ticket_table(tickets: &[Ticket]) -> String {
    let mut table = Table::new(tickets.iter().map(TicketRow::from));
    table.with(Style::modern());
    table.to_string()
}

/// Numbered list of active clauses, as shown by `browse`.
pub fn format_filters(filters: &[FilterClause]) -> String {
    if filters.is_empty() {
        return "no active filters".to_string();
    }
    filters
        .iter()
        .enumerate()
        .map(|(i, clause)| format!("{}. {}={}", i + 1, clause.criterion, clause.value))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_edit_state(edit: &EditState) -> String {
    let mut out = format!(
        "editing #{}\n  title: {}\n  description: {}",
        edit.id, edit.title, edit.description
    );
    if let Some(error) = &edit.error {
        out.push_str(&format!(
            "\n  {}",
            error.if_supports_color(Stdout, |t| t.red())
        ));
    }
    out
}
