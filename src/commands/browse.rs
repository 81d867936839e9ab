//! Line-oriented interactive session over the ticket board.
//!
//! Each input line is one command. Failures are printed and the session
//! carries on; only `quit` or end of input ends it.

use std::io::{self, IsTerminal, Write};
use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::board::Board;
use crate::client::TicketBackend;
use crate::config::Config;
use crate::display::{format_edit_state, format_filters, format_ticket_line};
use crate::error::{DeskError, Result};
use crate::query::{Admission, FilterCriterion, SortKey, SortOrder, SortSpec};
use crate::types::{TicketId, TicketStatus};

const HELP: &str = "\
commands:
  refresh                  fetch tickets from the backend
  list                     show filters, sort and matching tickets
  criterion <c>            pick the filter field: status, priority, description
  value <v>                set the filter value
  add                      add the drafted filter
  unfilter <n>             remove filter number n
  clear                    remove all filters
  sort <key> [asc|desc]    sort by id, priority, status, title, description, tags
  start|close|reopen <id>  change a ticket's status
  rm <id>                  delete a ticket
  edit <id>                start editing a ticket
  title <text>             set the edited title
  desc <text>              set the edited description
  save | cancel            finish editing
  help | quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Refresh,
    List,
    Criterion(FilterCriterion),
    Value(String),
    Add,
    /// 1-based, as printed by `list`
    Unfilter(usize),
    Clear,
    /// Without an order, sorting by the current key flips its order
    Sort(SortKey, Option<SortOrder>),
    Status(TicketId, TicketStatus),
    Remove(TicketId),
    Edit(TicketId),
    Title(String),
    Description(String),
    Save,
    Cancel,
    Help,
    Quit,
}

/// Whether the session continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn usage(text: &str) -> DeskError {
    DeskError::Validation(format!("usage: {text}"))
}

fn ticket_arg(arg: &str, text: &str) -> Result<TicketId> {
    if arg.is_empty() {
        return Err(usage(text));
    }
    arg.parse()
        .map_err(|_| DeskError::Validation(format!("invalid ticket ID '{arg}'")))
}

impl FromStr for BrowseCommand {
    type Err = DeskError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word.to_lowercase().as_str() {
            "refresh" | "r" => BrowseCommand::Refresh,
            "list" | "ls" | "l" => BrowseCommand::List,
            "criterion" => {
                if rest.is_empty() {
                    return Err(usage("criterion <status|priority|description>"));
                }
                BrowseCommand::Criterion(rest.parse()?)
            }
            "value" => BrowseCommand::Value(rest.to_string()),
            "add" => BrowseCommand::Add,
            "unfilter" => {
                let index = rest
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| usage("unfilter <n>"))?;
                BrowseCommand::Unfilter(index)
            }
            "clear" => BrowseCommand::Clear,
            "sort" => {
                let mut parts = rest.split_whitespace();
                let key = parts.next().ok_or_else(|| usage("sort <key> [asc|desc]"))?;
                let order = parts.next().map(str::parse::<SortOrder>).transpose()?;
                BrowseCommand::Sort(key.parse()?, order)
            }
            "start" => BrowseCommand::Status(
                ticket_arg(rest, "start <id>")?,
                TicketStatus::InProgress,
            ),
            "close" => BrowseCommand::Status(ticket_arg(rest, "close <id>")?, TicketStatus::Closed),
            "reopen" => BrowseCommand::Status(ticket_arg(rest, "reopen <id>")?, TicketStatus::Open),
            "rm" | "delete" => BrowseCommand::Remove(ticket_arg(rest, "rm <id>")?),
            "edit" => BrowseCommand::Edit(ticket_arg(rest, "edit <id>")?),
            "title" => BrowseCommand::Title(rest.to_string()),
            "desc" | "description" => BrowseCommand::Description(rest.to_string()),
            "save" => BrowseCommand::Save,
            "cancel" => BrowseCommand::Cancel,
            "help" | "?" => BrowseCommand::Help,
            "quit" | "exit" | "q" => BrowseCommand::Quit,
            other => {
                return Err(DeskError::Validation(format!(
                    "unknown command '{other}', type 'help' for a list"
                )));
            }
        };
        Ok(command)
    }
}

fn render_list<B: TicketBackend>(board: &Board<B>, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", format_filters(board.filters()))?;
    writeln!(out, "sort: {}", board.sort())?;
    let visible = board.visible();
    if visible.is_empty() {
        writeln!(out, "No tickets match")?;
    }
    for ticket in &visible {
        writeln!(out, "{}", format_ticket_line(ticket))?;
    }
    Ok(())
}

/// Run one command against the board, writing feedback to `out`.
pub async fn execute<B: TicketBackend>(
    board: &mut Board<B>,
    command: BrowseCommand,
    out: &mut impl Write,
) -> Result<Flow> {
    match command {
        BrowseCommand::Refresh => {
            board.refresh().await?;
            writeln!(out, "{} tickets loaded", board.tickets().len())?;
        }
        BrowseCommand::List => render_list(board, out)?,
        BrowseCommand::Criterion(criterion) => {
            board.draft_mut().set_criterion(criterion);
            writeln!(out, "draft: {criterion}={}", board.draft().value())?;
        }
        BrowseCommand::Value(value) => {
            let criterion = board.draft().criterion();
            board.draft_mut().set_value(criterion.canonical_value(&value));
            writeln!(out, "draft: {criterion}={}", board.draft().value())?;
        }
        BrowseCommand::Add => {
            let criterion = board.draft().criterion();
            let value = board.draft().value().trim().to_string();
            match board.add_filter() {
                Admission::Admitted => writeln!(out, "filter added: {criterion}={value}")?,
                Admission::Blank => writeln!(out, "filter value is blank, nothing added")?,
                Admission::Duplicate => {
                    writeln!(out, "filter {criterion}={value} is already active")?
                }
            }
        }
        BrowseCommand::Unfilter(index) => match board.remove_filter(index - 1) {
            Some(clause) => writeln!(
                out,
                "filter removed: {}={}",
                clause.criterion, clause.value
            )?,
            None => {
                return Err(DeskError::Validation(format!("no filter number {index}")));
            }
        },
        BrowseCommand::Clear => {
            board.clear_filters();
            writeln!(out, "filters cleared")?;
        }
        BrowseCommand::Sort(key, order) => {
            let current = board.sort();
            let order = order.unwrap_or(if current.key == key {
                current.order.toggled()
            } else {
                SortOrder::Asc
            });
            board.set_sort(SortSpec::new(key, order));
            writeln!(out, "sort: {}", board.sort())?;
        }
        BrowseCommand::Status(id, status) => {
            let ticket = board.set_status(id, status).await?;
            let shown = ticket.status.as_ref().map_or("-", |s| s.as_str());
            writeln!(out, "#{id} is now {shown}")?;
        }
        BrowseCommand::Remove(id) => {
            board.delete(id).await?;
            writeln!(out, "#{id} deleted")?;
        }
        BrowseCommand::Edit(id) => {
            let state = board.begin_edit(id)?;
            writeln!(out, "{}", format_edit_state(state))?;
        }
        BrowseCommand::Title(title) => {
            board.edit_title(&title)?;
        }
        BrowseCommand::Description(description) => {
            board.edit_description(&description)?;
        }
        BrowseCommand::Save => match board.save_edit().await {
            Ok(ticket) => writeln!(out, "#{} saved", ticket.id)?,
            Err(DeskError::NotEditing) => return Err(DeskError::NotEditing),
            Err(_) => {
                // The message lives in the edit state; show the form again
                if let Some(state) = board.editing() {
                    writeln!(out, "{}", format_edit_state(state))?;
                }
            }
        },
        BrowseCommand::Cancel => {
            board.cancel_edit();
            writeln!(out, "edit cancelled")?;
        }
        BrowseCommand::Help => writeln!(out, "{HELP}")?,
        BrowseCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Interactive session reading commands from stdin
pub async fn cmd_browse<B: TicketBackend>(backend: B, config: &Config) -> Result<()> {
    let mut board = Board::new(backend).with_sort(config.default_sort_spec()?);
    let mut out = io::stdout();
    let interactive = io::stdin().is_terminal();

    match board.refresh().await {
        Ok(()) => render_list(&board, &mut out)?,
        Err(e) => eprintln!("error: {e}"),
    }
    if interactive {
        writeln!(out, "type 'help' for commands")?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = match line.parse::<BrowseCommand>() {
            Ok(command) => execute(&mut board, command, &mut out).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
