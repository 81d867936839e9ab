use thiserror::Error;

use crate::types::TicketId;

#[derive(Error, Debug)]
pub enum DeskError {
    /// The optional text is the backend's own `detail`, when it sent one.
    #[error(
        "ticket '{0}' not found{detail}",
        detail = .1.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
    )]
    TicketNotFound(TicketId, Option<String>),

    #[error("ticket '{0}' is closed and can no longer be changed")]
    TicketClosed(TicketId),

    #[error("{0}")]
    Validation(String),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid filter criterion '{0}', expected status, priority or description")]
    InvalidCriterion(String),

    #[error("invalid sort key '{0}'")]
    InvalidSortKey(String),

    #[error("invalid sort order '{0}', expected asc or desc")]
    InvalidSortOrder(String),

    #[error("invalid filter '{0}', expected criterion=value")]
    InvalidFilter(String),

    #[error("not editing any ticket")]
    NotEditing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("backend error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl DeskError {
    /// Constructors for the enum parsing errors, as `enum_display_fromstr!` expects.
    pub fn invalid_status(s: String) -> Self {
        DeskError::InvalidStatus(s)
    }

    pub fn invalid_priority(s: String) -> Self {
        DeskError::InvalidPriority(s)
    }

    pub fn invalid_criterion(s: String) -> Self {
        DeskError::InvalidCriterion(s)
    }

    pub fn invalid_sort_key(s: String) -> Self {
        DeskError::InvalidSortKey(s)
    }

    pub fn invalid_sort_order(s: String) -> Self {
        DeskError::InvalidSortOrder(s)
    }

    /// The message to show inline next to a failed edit.
    ///
    /// Backend rejections show the backend's own `detail`; everything else
    /// falls back to the full error text.
    pub fn inline_message(&self) -> String {
        match self {
            DeskError::Api { detail, .. } => detail.clone(),
            DeskError::TicketNotFound(_, Some(detail)) => detail.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
