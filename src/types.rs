use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DeskError, Result};

/// Message shown when a create or edit is attempted with a blank title or description.
pub const EMPTY_FIELDS_MESSAGE: &str = "Title and description cannot be empty.";

/// Server-assigned ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    pub fn new(id: u64) -> Self {
        TicketId(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('#');
        trimmed
            .parse::<u64>()
            .map(TicketId)
            .map_err(|_| DeskError::Validation(format!("invalid ticket id '{s}'")))
    }
}

/// Rank assigned to priority or status values outside the known set.
pub const UNKNOWN_RANK: u8 = 99;

/// Ticket priority as sent by the backend.
///
/// Values outside the known set are kept verbatim in `Other` so a single odd
/// ticket never fails a whole fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketPriority {
    #[default]
    Low,
    Medium,
    High,
    Other(String),
}

impl TicketPriority {
    /// Severity rank: High sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            TicketPriority::High => 1,
            TicketPriority::Medium => 2,
            TicketPriority::Low => 3,
            TicketPriority::Other(_) => UNKNOWN_RANK,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
            TicketPriority::Other(s) => s,
        }
    }
}

impl From<String> for TicketPriority {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Low" => TicketPriority::Low,
            "Medium" => TicketPriority::Medium,
            "High" => TicketPriority::High,
            _ => TicketPriority::Other(s),
        }
    }
}

impl From<TicketPriority> for String {
    fn from(p: TicketPriority) -> Self {
        match p {
            TicketPriority::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses user input; only the three known priorities are accepted.
impl FromStr for TicketPriority {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(TicketPriority::Low),
            "medium" | "m" => Ok(TicketPriority::Medium),
            "high" | "h" => Ok(TicketPriority::High),
            _ => Err(DeskError::invalid_priority(s.to_string())),
        }
    }
}

pub const VALID_PRIORITIES: &[&str] = &["low", "medium", "high"];

/// Ticket workflow status as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Closed,
    Other(String),
}

impl TicketStatus {
    /// Workflow rank: Open sorts first, unknown values last.
    pub fn rank(&self) -> u8 {
        match self {
            TicketStatus::Open => 1,
            TicketStatus::InProgress => 2,
            TicketStatus::Closed => 3,
            TicketStatus::Other(_) => UNKNOWN_RANK,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In progress",
            TicketStatus::Closed => "Closed",
            TicketStatus::Other(s) => s,
        }
    }

    /// Closed tickets accept no further status changes or edits.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Closed)
    }
}

impl From<String> for TicketStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Open" => TicketStatus::Open,
            "In progress" => TicketStatus::InProgress,
            "Closed" => TicketStatus::Closed,
            _ => TicketStatus::Other(s),
        }
    }
}

impl From<TicketStatus> for String {
    fn from(s: TicketStatus) -> Self {
        match s {
            TicketStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "in progress" | "in-progress" | "in_progress" | "progress" => {
                Ok(TicketStatus::InProgress)
            }
            "closed" | "close" => Ok(TicketStatus::Closed),
            _ => Err(DeskError::invalid_status(s.to_string())),
        }
    }
}

pub const VALID_STATUSES: &[&str] = &["open", "in-progress", "closed"];

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A ticket as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl Ticket {
    pub fn new(id: u64, title: &str, description: &str) -> Self {
        Ticket {
            id: TicketId::new(id),
            title: title.to_string(),
            description: description.to_string(),
            priority: Some(TicketPriority::Low),
            status: Some(TicketStatus::Open),
            tags: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.status.as_ref().is_some_and(TicketStatus::is_terminal)
    }

    pub fn priority_rank(&self) -> u8 {
        self.priority.as_ref().map_or(UNKNOWN_RANK, TicketPriority::rank)
    }

    pub fn status_rank(&self) -> u8 {
        self.status.as_ref().map_or(UNKNOWN_RANK, TicketStatus::rank)
    }
}

/// Trim both fields and reject the pair if either ends up empty.
pub fn require_title_and_description(title: &str, description: &str) -> Result<(String, String)> {
    let title = title.trim();
    let description = description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(DeskError::Validation(EMPTY_FIELDS_MESSAGE.to_string()));
    }
    Ok((title.to_string(), description.to_string()))
}

/// Body of `POST /tickets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub tags: Vec<String>,
}

impl NewTicket {
    /// Validate and build a creation request. New tickets always start Open with no tags.
    pub fn new(title: &str, description: &str, priority: TicketPriority) -> Result<Self> {
        let (title, description) = require_title_and_description(title, description)?;
        Ok(NewTicket {
            title,
            description,
            priority,
            status: TicketStatus::Open,
            tags: Vec::new(),
        })
    }
}

/// Body of `PATCH /tickets/{id}`. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TicketPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
}

impl TicketPatch {
    pub fn status(status: TicketStatus) -> Self {
        TicketPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn text(title: String, description: String) -> Self {
        TicketPatch {
            title: Some(title),
            description: Some(description),
            ..Default::default()
        }
    }

    /// Apply this patch to a local copy, mirroring what the backend will do.
    pub fn apply_to(&self, ticket: &mut Ticket) {
        if let Some(title) = &self.title {
            ticket.title = title.clone();
        }
        if let Some(description) = &self.description {
            ticket.description = description.clone();
        }
        if let Some(status) = &self.status {
            ticket.status = Some(status.clone());
        }
    }
}
