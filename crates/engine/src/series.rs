//! Series generation.
//!
//! Expands one transaction request into the dated, amount-assigned records to
//! persist:
//!
//! - `single`: one record, no series id.
//! - `installment`: the amount is split over `n` months (`2 <= n <= 24`).
//! - `monthly`: the amount repeats for [`MONTHLY_OCCURRENCES`] months.
//!
//! Everything here is pure; the engine persists the result in one batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, NewTransactionCmd, ResultEngine, SeriesType, Transaction,
    schedule::{monthly_days, parse_base_date},
    util::{ensure_non_negative, normalize_optional_text, normalize_required_text},
};

/// Occurrences generated for a monthly recurrence.
pub const MONTHLY_OCCURRENCES: u32 = 12;
pub const MIN_INSTALLMENTS: u32 = 2;
pub const MAX_INSTALLMENTS: u32 = 24;

/// Position of a record inside its series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub series_id: Uuid,
    pub series_sequence: u32,
}

/// Splits `total_cents` into `quantity` parts that sum exactly to the total.
///
/// The first `total % quantity` parts carry the extra cent, so earlier
/// installments are never smaller than later ones.
pub fn calculate_installments(total_cents: i64, quantity: u32) -> ResultEngine<Vec<i64>> {
    if quantity < MIN_INSTALLMENTS {
        return Err(EngineError::Validation(format!(
            "minimum {MIN_INSTALLMENTS} installments"
        )));
    }
    ensure_non_negative(total_cents, "amount_cents")?;

    let n = i64::from(quantity);
    let base = total_cents / n;
    let remainder = total_cents % n;

    Ok((0..n)
        .map(|index| base + i64::from(index < remainder))
        .collect())
}

/// Builds the records for `cmd`. `now` becomes every record's `created_at`.
pub fn generate_series(cmd: &NewTransactionCmd, now: DateTime<Utc>) -> ResultEngine<Vec<Transaction>> {
    let amount = cmd.amount_cents;
    ensure_non_negative(amount.cents(), "amount_cents")?;
    let description = normalize_required_text(&cmd.description, "description")?;
    let start = parse_base_date(&cmd.date)?.date();

    let (occurrences, amounts, total) = match cmd.recurrence_type {
        SeriesType::Single => (1, vec![amount.cents()], amount),
        SeriesType::Installment => {
            let count = cmd.installments_count.ok_or_else(|| {
                EngineError::Validation("installments_count is required".to_string())
            })?;
            if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&count) {
                return Err(EngineError::Validation(format!(
                    "installments_count must be between {MIN_INSTALLMENTS} and {MAX_INSTALLMENTS}, got {count}"
                )));
            }
            (count, calculate_installments(amount.cents(), count)?, amount)
        }
        SeriesType::Monthly => {
            let total = amount
                .checked_mul(i64::from(MONTHLY_OCCURRENCES))
                .ok_or_else(|| EngineError::Validation("amount too large".to_string()))?;
            (
                MONTHLY_OCCURRENCES,
                vec![amount.cents(); MONTHLY_OCCURRENCES as usize],
                total,
            )
        }
    };

    let series_id = cmd.recurrence_type.is_series().then(Uuid::new_v4);
    let dates = monthly_days(start, occurrences)?;
    tracing::debug!(
        recurrence = cmd.recurrence_type.as_str(),
        occurrences,
        first = %start,
        "generated schedule"
    );

    let notes = normalize_optional_text(cmd.notes.as_deref());
    let payment_method = normalize_optional_text(cmd.payment_method.as_deref());

    Ok(dates
        .into_iter()
        .zip(amounts)
        .zip(1u32..)
        .map(|((date, amount_cents), sequence)| Transaction {
            id: Uuid::new_v4(),
            user_id: cmd.user_id.clone(),
            kind: cmd.kind,
            amount_cents: MoneyCents::new(amount_cents),
            date,
            description: description.clone(),
            notes: notes.clone(),
            payment_method: payment_method.clone(),
            account_id: cmd.account_id,
            category_id: cmd.category_id,
            is_paid: cmd.is_paid,
            series_type: cmd.recurrence_type,
            series_id,
            series_sequence: sequence,
            series_total: occurrences,
            series_amount_total_cents: total,
            created_at: now,
        })
        .collect())
}

/// Short label shown next to a record, e.g. `Installment 2/3`.
pub fn series_label(series_type: SeriesType, sequence: Option<u32>, total: Option<u32>) -> String {
    let sequence = sequence.unwrap_or(1);
    match series_type {
        SeriesType::Installment => format!("Installment {sequence}/{}", total.unwrap_or(0)),
        SeriesType::Monthly => {
            format!("Monthly {sequence}/{}", total.unwrap_or(MONTHLY_OCCURRENCES))
        }
        SeriesType::Single => "Single".to_string(),
    }
}
