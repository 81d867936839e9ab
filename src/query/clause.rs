//! Building the active clause list.
//!
//! A [`ClauseDraft`] holds the criterion and value the user is composing.
//! [`ActiveFilters`] decides whether a drafted clause is admitted and keeps
//! the list free of duplicates.

use super::{FilterClause, FilterCriterion};

/// Outcome of trying to add a clause to the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Value was empty or whitespace.
    Blank,
    /// Same criterion and value (ignoring case) is already active.
    Duplicate,
}

impl Admission {
    pub fn is_admitted(self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// The clause currently being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseDraft {
    criterion: FilterCriterion,
    value: String,
}

impl Default for ClauseDraft {
    fn default() -> Self {
        Self::new(FilterCriterion::default())
    }
}

impl ClauseDraft {
    pub fn new(criterion: FilterCriterion) -> Self {
        Self {
            criterion,
            value: criterion.default_value().to_string(),
        }
    }

    pub fn criterion(&self) -> FilterCriterion {
        self.criterion
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Switching criterion always resets the value to that criterion's default.
    pub fn set_criterion(&mut self, criterion: FilterCriterion) {
        self.criterion = criterion;
        self.value = criterion.default_value().to_string();
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// Active clauses, in the order they were admitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilters {
    clauses: Vec<FilterClause>,
}

impl ActiveFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn contains(&self, clause: &FilterClause) -> bool {
        self.clauses.iter().any(|c| c.same_as(clause))
    }

    /// Admit a clause directly. The value is stored trimmed.
    pub fn push(&mut self, clause: FilterClause) -> Admission {
        let value = clause.value.trim();
        if value.is_empty() {
            return Admission::Blank;
        }
        let clause = FilterClause::new(clause.criterion, value);
        if self.contains(&clause) {
            return Admission::Duplicate;
        }
        self.clauses.push(clause);
        Admission::Admitted
    }

    /// Admit the drafted clause.
    ///
    /// A description clause clears the draft value once admitted; status and
    /// priority drafts keep theirs.
    pub fn admit(&mut self, draft: &mut ClauseDraft) -> Admission {
        let outcome = self.push(FilterClause::new(draft.criterion, draft.value.clone()));
        if outcome.is_admitted() && draft.criterion == FilterCriterion::Description {
            draft.value.clear();
        }
        outcome
    }

    pub fn remove(&mut self, index: usize) -> Option<FilterClause> {
        if index < self.clauses.len() {
            Some(self.clauses.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.clauses.clear();
    }
}
