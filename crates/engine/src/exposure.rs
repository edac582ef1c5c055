//! Account exposure aggregation.
//!
//! Pure functions over an account list and a transaction set. Nothing here is
//! cached: callers recompute from the current records whenever transactions
//! or accounts change.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{Account, MoneyCents, SeriesType, Transaction, TransactionType};

/// Credit card position against its limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CreditExposure {
    pub limit_cents: MoneyCents,
    /// Unpaid expenses due in the current invoice period.
    pub invoice_cents: MoneyCents,
    /// Unpaid expenses dated after the cutoff.
    pub future_cents: MoneyCents,
    /// Future records belonging to installment series.
    pub remaining_installments: u32,
    /// `limit - (invoice + future)`; negative when over the limit.
    pub available_cents: MoneyCents,
}

impl CreditExposure {
    /// Available limit as displayed (never below zero).
    #[must_use]
    pub fn available_display(&self) -> MoneyCents {
        self.available_cents.floor_zero()
    }

    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        self.available_cents.is_negative()
    }
}

/// What can be said about an account's money.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountStanding {
    Credit(CreditExposure),
    /// Credit card whose limit was never informed.
    CreditWithoutLimit,
    /// User-declared balance of a non-credit account.
    Declared { balance_cents: MoneyCents },
    /// Non-credit account without a declared balance.
    Unknown,
}

impl AccountStanding {
    /// One-line description for account lists.
    pub fn hint(&self) -> String {
        match self {
            Self::Credit(exposure) => format!("Available limit: {}", exposure.available_display()),
            Self::CreditWithoutLimit => "Limit not informed".to_string(),
            Self::Declared { balance_cents } => format!("Estimated balance: {balance_cents}"),
            Self::Unknown => "Balance not informed".to_string(),
        }
    }
}

/// Future unpaid expenses of one account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct InstallmentsSummary {
    pub account_id: Uuid,
    pub future_amount_cents: MoneyCents,
    pub remaining_installments: u32,
}

/// Totals of the accounts dashboard card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AccountsOverview {
    pub active_accounts: usize,
    pub credit_limit_total_cents: MoneyCents,
    pub credit_available_total_cents: MoneyCents,
    pub declared_balances_total_cents: MoneyCents,
}

/// Income/expense totals of a transaction set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub income_cents: MoneyCents,
    pub expense_cents: MoneyCents,
    pub balance_cents: MoneyCents,
    pub pending_count: usize,
}

fn is_unpaid_expense_of(tx: &Transaction, account_id: Uuid) -> bool {
    tx.account_id == Some(account_id) && tx.kind == TransactionType::Expense && !tx.is_paid
}

/// Computes the standing of `account`.
///
/// Only unpaid expenses linked to the account count. Without a cutoff every
/// one of them belongs to the current invoice; with a cutoff, records dated
/// after it are future obligations.
pub fn account_standing(
    account: &Account,
    transactions: &[Transaction],
    cutoff: Option<NaiveDate>,
) -> AccountStanding {
    if !account.kind.is_credit_card() {
        return match account.balance_cents {
            Some(balance_cents) => AccountStanding::Declared { balance_cents },
            None => AccountStanding::Unknown,
        };
    }
    let Some(limit_cents) = account.limit_cents else {
        return AccountStanding::CreditWithoutLimit;
    };

    let mut invoice_cents = MoneyCents::ZERO;
    let mut future_cents = MoneyCents::ZERO;
    let mut remaining_installments = 0;
    for tx in transactions
        .iter()
        .filter(|tx| is_unpaid_expense_of(tx, account.id))
    {
        match cutoff {
            Some(cutoff) if tx.date > cutoff => {
                future_cents += tx.amount_cents;
                if tx.series_type == SeriesType::Installment {
                    remaining_installments += 1;
                }
            }
            _ => invoice_cents += tx.amount_cents,
        }
    }

    AccountStanding::Credit(CreditExposure {
        limit_cents,
        invoice_cents,
        future_cents,
        remaining_installments,
        available_cents: limit_cents - (invoice_cents + future_cents),
    })
}

/// Future unpaid expenses per requested account, in request order.
///
/// Without a cutoff every unpaid expense counts. Accounts with nothing
/// pending get a zero summary.
pub fn future_installments(
    account_ids: &[Uuid],
    transactions: &[Transaction],
    cutoff: Option<NaiveDate>,
) -> Vec<InstallmentsSummary> {
    let mut aggregated: HashMap<Uuid, (MoneyCents, u32)> = HashMap::new();
    for tx in transactions.iter().filter(|tx| {
        tx.kind == TransactionType::Expense
            && !tx.is_paid
            && cutoff.is_none_or(|cutoff| tx.date > cutoff)
    }) {
        let Some(account_id) = tx.account_id.filter(|id| account_ids.contains(id)) else {
            continue;
        };
        let entry = aggregated.entry(account_id).or_default();
        entry.0 += tx.amount_cents;
        if tx.series_type == SeriesType::Installment {
            entry.1 += 1;
        }
    }

    account_ids
        .iter()
        .map(|account_id| {
            let (future_amount_cents, remaining_installments) =
                aggregated.get(account_id).copied().unwrap_or_default();
            InstallmentsSummary {
                account_id: *account_id,
                future_amount_cents,
                remaining_installments,
            }
        })
        .collect()
}

/// Dashboard totals across all accounts.
pub fn accounts_overview(
    accounts: &[Account],
    transactions: &[Transaction],
    cutoff: Option<NaiveDate>,
) -> AccountsOverview {
    let mut overview = AccountsOverview {
        active_accounts: accounts.iter().filter(|a| a.is_active).count(),
        ..Default::default()
    };

    let mut declared = MoneyCents::ZERO;
    for account in accounts {
        if account.kind.is_credit_card() {
            overview.credit_limit_total_cents += account.limit_cents.unwrap_or_default();
            if let AccountStanding::Credit(exposure) =
                account_standing(account, transactions, cutoff)
            {
                overview.credit_available_total_cents += exposure.available_display();
            }
        } else {
            declared += account.balance_cents.unwrap_or_default();
        }
    }
    overview.declared_balances_total_cents = declared.floor_zero();
    overview
}

/// Income, expense, balance and pending count of `transactions`.
pub fn period_totals(transactions: &[Transaction]) -> PeriodTotals {
    let sum_of = |kind: TransactionType| -> MoneyCents {
        transactions
            .iter()
            .filter(|tx| tx.kind == kind)
            .map(|tx| tx.amount_cents)
            .sum()
    };
    let income_cents = sum_of(TransactionType::Income);
    let expense_cents = sum_of(TransactionType::Expense);

    PeriodTotals {
        income_cents,
        expense_cents,
        balance_cents: income_cents - expense_cents,
        pending_count: transactions.iter().filter(|tx| !tx.is_paid).count(),
    }
}
