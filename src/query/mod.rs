//! Filter/sort view engine.
//!
//! A view is derived from the full ticket snapshot, the active filter clauses
//! and a sort specification. Derivation is pure: the snapshot is never
//! modified and the same inputs always produce the same output.

use std::borrow::Cow;

use crate::error::DeskError;
use crate::types::{Ticket, TicketPriority, TicketStatus};

pub mod clause;
pub mod collate;
pub mod sort;

pub use clause::{ActiveFilters, Admission, ClauseDraft};
pub use sort::{SortKey, SortOrder, SortSpec, compare_tickets, sort_tickets};

/// Ticket field a filter clause inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterCriterion {
    #[default]
    Status,
    Priority,
    Description,
}

enum_display_fromstr!(
    FilterCriterion,
    DeskError::invalid_criterion,
    {
        Status => "status",
        Priority => "priority",
        Description => "description" | "desc",
    }
);

impl FilterCriterion {
    /// Value a fresh draft starts with after switching to this criterion.
    pub fn default_value(self) -> &'static str {
        match self {
            FilterCriterion::Status => "Open",
            FilterCriterion::Priority => "Low",
            FilterCriterion::Description => "",
        }
    }

    /// Text form of the inspected field. Absent fields read as empty text.
    pub fn field_text(self, ticket: &Ticket) -> &str {
        match self {
            FilterCriterion::Status => ticket.status.as_ref().map_or("", |s| s.as_str()),
            FilterCriterion::Priority => ticket.priority.as_ref().map_or("", |p| p.as_str()),
            FilterCriterion::Description => &ticket.description,
        }
    }

    /// Description matches on substrings, the enumerated fields on whole values.
    pub fn is_substring_match(self) -> bool {
        matches!(self, FilterCriterion::Description)
    }

    /// Map typed spellings such as `in-progress` or `h` onto the wire value.
    ///
    /// Anything unrecognised is kept verbatim so unknown backend values can
    /// still be filtered on.
    pub fn canonical_value(self, value: &str) -> String {
        let known = match self {
            FilterCriterion::Status => value.parse::<TicketStatus>().ok().map(String::from),
            FilterCriterion::Priority => value.parse::<TicketPriority>().ok().map(String::from),
            FilterCriterion::Description => None,
        };
        known.unwrap_or_else(|| value.to_string())
    }
}

/// Case-insensitive substring match using Unicode case folding.
pub fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack_folded = unicase::UniCase::new(haystack).to_folded_case();
    let needle_folded = unicase::UniCase::new(needle).to_folded_case();
    haystack_folded.contains(&needle_folded)
}

/// Case-insensitive equality using Unicode case folding.
pub fn eq_case_insensitive(a: &str, b: &str) -> bool {
    unicase::eq(a, b)
}

/// Trait for ticket filters
pub trait TicketFilter {
    fn matches(&self, ticket: &Ticket) -> bool;
}

/// One active filter condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub criterion: FilterCriterion,
    pub value: String,
}

impl FilterClause {
    pub fn new(criterion: FilterCriterion, value: impl Into<String>) -> Self {
        Self {
            criterion,
            value: value.into(),
        }
    }

    /// Same criterion and same value ignoring case.
    pub fn same_as(&self, other: &FilterClause) -> bool {
        self.criterion == other.criterion && eq_case_insensitive(&self.value, &other.value)
    }

    /// Parse `criterion=value` as typed on the command line.
    pub fn parse(s: &str) -> crate::error::Result<Self> {
        let (criterion, value) = s
            .split_once('=')
            .ok_or_else(|| DeskError::InvalidFilter(s.to_string()))?;
        let criterion: FilterCriterion = criterion.parse()?;
        Ok(FilterClause::new(criterion, criterion.canonical_value(value)))
    }
}

impl TicketFilter for FilterClause {
    fn matches(&self, ticket: &Ticket) -> bool {
        let text = self.criterion.field_text(ticket);
        if self.criterion.is_substring_match() {
            contains_case_insensitive(text, &self.value)
        } else {
            eq_case_insensitive(text, &self.value)
        }
    }
}

/// True when the ticket satisfies every clause. An empty list admits everything.
pub fn matches_all(ticket: &Ticket, filters: &[FilterClause]) -> bool {
    filters.iter().all(|f| f.matches(ticket))
}

/// Derive the ordered view of `tickets` under `filters` and `sort`.
pub fn derive(tickets: &[Ticket], filters: &[FilterClause], sort: SortSpec) -> Vec<Ticket> {
    let mut view: Vec<Ticket> = tickets
        .iter()
        .filter(|t| matches_all(t, filters))
        .cloned()
        .collect();
    sort_tickets(&mut view, sort);
    view
}

/// A reusable view configuration: clauses, sort and an optional cap on rows.
#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
    filters: Vec<FilterClause>,
    sort: SortSpec,
    limit: Option<usize>,
}

impl ViewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add clauses (AND composition)
    pub fn with_filters(mut self, clauses: &[FilterClause]) -> Self {
        self.filters.extend_from_slice(clauses);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[FilterClause] {
        &self.filters
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn apply(&self, tickets: &[Ticket]) -> Vec<Ticket> {
        let mut view = derive(tickets, &self.filters, self.sort);
        if let Some(limit) = self.limit {
            view.truncate(limit);
        }
        view
    }
}

/// Text of any sortable field, for display and collation.
pub fn field_text(ticket: &Ticket, key: SortKey) -> Cow<'_, str> {
    match key {
        SortKey::Id => Cow::Owned(ticket.id.to_string()),
        SortKey::Priority => Cow::Borrowed(FilterCriterion::Priority.field_text(ticket)),
        SortKey::Status => Cow::Borrowed(FilterCriterion::Status.field_text(ticket)),
        SortKey::Title => Cow::Borrowed(&ticket.title),
        SortKey::Description => Cow::Borrowed(&ticket.description),
        SortKey::Tags => Cow::Owned(ticket.tags.join(", ")),
    }
}
