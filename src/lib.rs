#[macro_use]
mod macros;

pub mod board;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod query;
pub mod types;

pub use board::{Board, EditState};
pub use client::{HttpBackend, RetryPolicy, TicketBackend};
pub use config::Config;
pub use error::{DeskError, Result};
pub use query::{
    ActiveFilters, Admission, ClauseDraft, FilterClause, FilterCriterion, SortKey, SortOrder,
    SortSpec, ViewQuery, derive,
};
pub use types::{
    EMPTY_FIELDS_MESSAGE, NewTicket, Ticket, TicketId, TicketPatch, TicketPriority, TicketStatus,
};
