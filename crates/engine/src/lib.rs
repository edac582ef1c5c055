//! Recurring transaction engine of a personal finance ledger.
//!
//! Records are created alone, split into installments or repeated monthly;
//! edits and deletes can reach a whole series from a given occurrence
//! onward. Account standing and totals are always computed from the current
//! records.

pub use accounts::{Account, AccountType};
pub use categories::Category;
pub use commands::{
    CloneTransactionCmd, DeleteTransactionCmd, NewAccountCmd, NewCategoryCmd, NewTransactionCmd,
    TransactionPatch, UpdateAccountCmd, UpdateTransactionCmd,
};
pub use error::EngineError;
pub use exposure::{
    AccountStanding, AccountsOverview, CreditExposure, InstallmentsSummary, PeriodTotals,
    account_standing, accounts_overview, future_installments, period_totals,
};
pub use filter::{DateOrder, TransactionFilter};
pub use money::{MoneyCents, format_date_br, parse_brl_to_cents};
pub use mutation::{ApplyMode, MutationScope, effective_patch, resolve_scope};
pub use ops::{AccountListFilter, Engine, EngineBuilder};
pub use patch::Patch;
pub use schedule::{add_months_clamped, monthly_dates, monthly_days, parse_base_date};
pub use series::{
    MAX_INSTALLMENTS, MIN_INSTALLMENTS, MONTHLY_OCCURRENCES, SeriesMeta, calculate_installments,
    generate_series, series_label,
};
pub use transactions::{SeriesType, Transaction, TransactionType};

mod accounts;
mod categories;
mod commands;
mod error;
mod exposure;
mod filter;
mod money;
mod mutation;
mod ops;
mod patch;
mod schedule;
mod series;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
