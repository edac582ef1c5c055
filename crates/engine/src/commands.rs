//! Command structs for engine operations.
//!
//! These types group parameters for write operations
//! (create/update/delete/clone), keeping call sites readable and avoiding
//! long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{AccountType, ApplyMode, MoneyCents, Patch, SeriesMeta, SeriesType, TransactionType};

/// Create a transaction, possibly expanded into a series.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: String,
    pub kind: TransactionType,
    pub amount_cents: MoneyCents,
    /// Base date as typed in the form (`YYYY-MM-DD` or ISO date-time).
    pub date: String,
    pub description: String,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub is_paid: bool,
    pub recurrence_type: SeriesType,
    pub installments_count: Option<u32>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionType,
        amount_cents: impl Into<MoneyCents>,
        date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            amount_cents: amount_cents.into(),
            date: date.into(),
            description: description.into(),
            account_id: None,
            category_id: None,
            payment_method: None,
            notes: None,
            is_paid: false,
            recurrence_type: SeriesType::Single,
            installments_count: None,
        }
    }

    /// Split the amount over `count` monthly installments.
    #[must_use]
    pub fn installments(mut self, count: u32) -> Self {
        self.recurrence_type = SeriesType::Installment;
        self.installments_count = Some(count);
        self
    }

    /// Repeat the amount every month for a year.
    #[must_use]
    pub fn monthly(mut self) -> Self {
        self.recurrence_type = SeriesType::Monthly;
        self.installments_count = None;
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn paid(mut self, is_paid: bool) -> Self {
        self.is_paid = is_paid;
        self
    }
}

/// Field changes of a transaction update.
///
/// Non-nullable fields use `Option` (`None` = untouched); nullable fields use
/// [`Patch`] so an explicit clear is kept apart from an absent field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionType>,
    pub amount_cents: Option<MoneyCents>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Patch<String>,
    pub payment_method: Patch<String>,
    pub account_id: Patch<Uuid>,
    pub category_id: Patch<Uuid>,
    pub is_paid: Option<bool>,
    pub series_amount_total_cents: Option<MoneyCents>,
}

impl TransactionPatch {
    /// `true` when no field would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Update one transaction or the tail of its series.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub id: Uuid,
    pub user_id: String,
    pub apply_mode: ApplyMode,
    pub series_meta: Option<SeriesMeta>,
    pub patch: TransactionPatch,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(id: Uuid, user_id: impl Into<String>, patch: TransactionPatch) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            apply_mode: ApplyMode::Single,
            series_meta: None,
            patch,
        }
    }

    #[must_use]
    pub fn apply_mode(mut self, apply_mode: ApplyMode) -> Self {
        self.apply_mode = apply_mode;
        self
    }

    #[must_use]
    pub fn series_meta(mut self, series_meta: SeriesMeta) -> Self {
        self.series_meta = Some(series_meta);
        self
    }
}

/// Delete one transaction or the tail of its series.
#[derive(Clone, Debug)]
pub struct DeleteTransactionCmd {
    pub id: Uuid,
    pub user_id: String,
    pub mode: ApplyMode,
    pub series_meta: Option<SeriesMeta>,
}

impl DeleteTransactionCmd {
    #[must_use]
    pub fn new(id: Uuid, user_id: impl Into<String>, mode: ApplyMode) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            mode,
            series_meta: None,
        }
    }

    #[must_use]
    pub fn series_meta(mut self, series_meta: SeriesMeta) -> Self {
        self.series_meta = Some(series_meta);
        self
    }
}

/// Copy an existing record to a new date as a standalone transaction.
#[derive(Clone, Debug)]
pub struct CloneTransactionCmd {
    pub source_id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub is_paid: bool,
}

/// Create an account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub user_id: String,
    pub name: String,
    pub kind: AccountType,
    pub limit_cents: Option<MoneyCents>,
    pub balance_cents: Option<MoneyCents>,
    pub is_active: bool,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, kind: AccountType) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            kind,
            limit_cents: None,
            balance_cents: None,
            is_active: true,
        }
    }

    #[must_use]
    pub fn limit_cents(mut self, limit: impl Into<MoneyCents>) -> Self {
        self.limit_cents = Some(limit.into());
        self
    }

    #[must_use]
    pub fn balance_cents(mut self, balance: impl Into<MoneyCents>) -> Self {
        self.balance_cents = Some(balance.into());
        self
    }

    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Update an account; see [`TransactionPatch`] for the field conventions.
#[derive(Clone, Debug, Default)]
pub struct UpdateAccountCmd {
    pub name: Option<String>,
    pub kind: Option<AccountType>,
    pub limit_cents: Patch<MoneyCents>,
    pub balance_cents: Patch<MoneyCents>,
    pub is_active: Option<bool>,
}

/// Create a category.
#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub user_id: String,
    pub name: String,
    pub kind: TransactionType,
    pub color: Option<String>,
}
