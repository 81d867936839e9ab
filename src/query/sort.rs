//! Sort functions for ticket views.
//!
//! Priority and status sort by severity/workflow rank rather than
//! alphabetically. Free-text fields use accent-aware collation. All sorts are
//! stable, and descending order keeps ties in their original relative order.

use std::cmp::{Ordering, Reverse};

use super::collate::{CollationKey, compare_text};
use super::field_text;
use crate::error::DeskError;
use crate::types::Ticket;

/// Sort field for ticket listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Priority,
    Status,
    Title,
    Description,
    Tags,
}

enum_display_fromstr!(
    SortKey,
    DeskError::invalid_sort_key,
    {
        Id => "id",
        Priority => "priority",
        Status => "status",
        Title => "title",
        Description => "description" | "desc",
        Tags => "tags",
    }
);

impl SortKey {
    /// Keys compared as text rather than by number or rank.
    pub fn is_textual(self) -> bool {
        matches!(self, SortKey::Title | SortKey::Description | SortKey::Tags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

enum_display_fromstr!(
    SortOrder,
    DeskError::invalid_sort_order,
    {
        Asc => "asc" | "ascending",
        Desc => "desc" | "descending",
    }
);

impl SortOrder {
    /// Apply this order to an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}

impl std::fmt::Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.key, self.order)
    }
}

/// Ascending three-way comparison of two tickets on `key`.
pub fn compare_tickets(a: &Ticket, b: &Ticket, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Priority => a.priority_rank().cmp(&b.priority_rank()),
        SortKey::Status => a.status_rank().cmp(&b.status_rank()),
        SortKey::Title | SortKey::Description | SortKey::Tags => {
            compare_text(&field_text(a, key), &field_text(b, key))
        }
    }
}

/// Sort tickets in place according to `spec`.
pub fn sort_tickets(tickets: &mut [Ticket], spec: SortSpec) {
    if spec.key.is_textual() {
        // Collation keys are costly to build; compute each one once.
        match spec.order {
            SortOrder::Asc => {
                tickets.sort_by_cached_key(|t| CollationKey::new(&field_text(t, spec.key)))
            }
            SortOrder::Desc => tickets
                .sort_by_cached_key(|t| Reverse(CollationKey::new(&field_text(t, spec.key)))),
        }
    } else {
        tickets.sort_by(|a, b| spec.order.apply(compare_tickets(a, b, spec.key)));
    }
}
