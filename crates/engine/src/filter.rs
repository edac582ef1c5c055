//! Record selection.
//!
//! [`TransactionFilter`] is a conjunction of predicates. The engine turns it
//! into a SQL `WHERE` clause for selects, updates and deletes; [`matches`]
//! evaluates the same predicates in memory.
//!
//! [`matches`]: TransactionFilter::matches

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, SeriesType, Transaction, TransactionType};

/// Filters for selecting transactions. Unset fields match everything.
///
/// `start_date` and `end_date` are inclusive, `after_date` is exclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub id: Option<Uuid>,
    pub series_id: Option<Uuid>,
    /// Lowest `series_sequence` to match (inclusive).
    pub min_sequence: Option<u32>,
    /// If present, acts as an allow-list of accounts.
    pub account_ids: Option<Vec<Uuid>>,
    pub kind: Option<TransactionType>,
    pub category_id: Option<Uuid>,
    pub is_paid: Option<bool>,
    pub series_type: Option<SeriesType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub after_date: Option<NaiveDate>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
}

/// Ordering of selected transactions by date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateOrder {
    Ascending,
    #[default]
    Descending,
}

impl TransactionFilter {
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Records of `series_id` from `from_sequence` on.
    #[must_use]
    pub fn series_from(mut self, series_id: Uuid, from_sequence: u32) -> Self {
        self.series_id = Some(series_id);
        self.min_sequence = Some(from_sequence);
        self
    }

    #[must_use]
    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_ids = Some(vec![account_id]);
        self
    }

    #[must_use]
    pub fn accounts(mut self, account_ids: Vec<Uuid>) -> Self {
        self.account_ids = Some(account_ids);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn paid(mut self, is_paid: bool) -> Self {
        self.is_paid = Some(is_paid);
        self
    }

    #[must_use]
    pub fn series_type(mut self, series_type: SeriesType) -> Self {
        self.series_type = Some(series_type);
        self
    }

    #[must_use]
    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    #[must_use]
    pub fn after(mut self, date: NaiveDate) -> Self {
        self.after_date = Some(date);
        self
    }

    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Unpaid expenses, the working set of credit exposure.
    #[must_use]
    pub fn unpaid_expenses() -> Self {
        Self::default().kind(TransactionType::Expense).paid(false)
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(EngineError::Validation(
                "invalid range: start_date must be <= end_date".to_string(),
            ));
        }
        if self.min_sequence.is_some() && self.series_id.is_none() {
            return Err(EngineError::Validation(
                "min_sequence requires series_id".to_string(),
            ));
        }
        Ok(())
    }

    /// `search` trimmed, `None` when blank.
    pub(crate) fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// In-memory evaluation of the filter.
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.id.is_none_or(|id| tx.id == id)
            && self.series_id.is_none_or(|id| tx.series_id == Some(id))
            && self.min_sequence.is_none_or(|seq| tx.series_sequence >= seq)
            && self
                .account_ids
                .as_ref()
                .is_none_or(|ids| tx.account_id.is_some_and(|id| ids.contains(&id)))
            && self.kind.is_none_or(|kind| tx.kind == kind)
            && self.category_id.is_none_or(|id| tx.category_id == Some(id))
            && self.is_paid.is_none_or(|paid| tx.is_paid == paid)
            && self.series_type.is_none_or(|t| tx.series_type == t)
            && self.start_date.is_none_or(|d| tx.date >= d)
            && self.end_date.is_none_or(|d| tx.date <= d)
            && self.after_date.is_none_or(|d| tx.date > d)
            && self.matches_search(&tx.description)
    }

    /// Case-insensitive substring match of the search term, Unicode aware.
    /// `%` and `_` are plain characters.
    pub(crate) fn matches_search(&self, description: &str) -> bool {
        self.search_term().is_none_or(|term| {
            description
                .to_lowercase()
                .contains(&term.to_lowercase())
        })
    }
}
