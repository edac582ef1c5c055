//! Series mutation scope.
//!
//! An edit or delete targets one record. With [`ApplyMode::SeriesFromHere`]
//! it also reaches every later record of the same series; earlier records are
//! never touched, so editing a recurring bill going forward leaves past
//! occurrences as they were.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, SeriesMeta, SeriesType, Transaction, TransactionFilter,
    TransactionPatch,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Only the target record.
    #[default]
    Single,
    /// The target record and all later records of its series.
    SeriesFromHere,
}

impl TryFrom<&str> for ApplyMode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "single" => Ok(Self::Single),
            "series_from_here" => Ok(Self::SeriesFromHere),
            other => Err(EngineError::Validation(format!("invalid apply mode: {other}"))),
        }
    }
}

/// Records a mutation applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationScope {
    Record { id: Uuid },
    SeriesFromHere { series_id: Uuid, from_sequence: u32 },
}

impl MutationScope {
    /// Store filter selecting exactly the records in scope.
    pub fn filter(self) -> TransactionFilter {
        match self {
            Self::Record { id } => TransactionFilter::default().id(id),
            Self::SeriesFromHere {
                series_id,
                from_sequence,
            } => TransactionFilter::default().series_from(series_id, from_sequence),
        }
    }
}

/// Decides which records a mutation of `target` affects.
///
/// `requested` is the series position the caller believes the target has; it
/// must agree with what is stored. When omitted the stored position is used.
pub fn resolve_scope(
    target: &Transaction,
    mode: ApplyMode,
    requested: Option<SeriesMeta>,
) -> ResultEngine<MutationScope> {
    match mode {
        ApplyMode::Single => Ok(MutationScope::Record { id: target.id }),
        ApplyMode::SeriesFromHere => {
            let stored = target.series_meta().ok_or_else(|| {
                EngineError::InvalidScope(format!(
                    "transaction {} does not belong to a series",
                    target.id
                ))
            })?;
            if let Some(requested) = requested
                && requested != stored
            {
                return Err(EngineError::InvalidScope(format!(
                    "series position {}#{} does not match transaction {}",
                    requested.series_id, requested.series_sequence, target.id
                )));
            }
            Ok(MutationScope::SeriesFromHere {
                series_id: stored.series_id,
                from_sequence: stored.series_sequence,
            })
        }
    }
}

/// Patch actually written for `scope`.
///
/// A single record's total always equals its amount. A new per-occurrence
/// amount on the tail of a monthly series also moves the series total to
/// `amount * series_total`. Either way an explicit total from the caller
/// wins. Installment amounts are never redistributed.
pub fn effective_patch(
    target: &Transaction,
    scope: MutationScope,
    mut patch: TransactionPatch,
) -> ResultEngine<TransactionPatch> {
    if target.series_type == SeriesType::Single
        && patch.series_amount_total_cents.is_none()
        && let Some(amount) = patch.amount_cents
    {
        patch.series_amount_total_cents = Some(amount);
        return Ok(patch);
    }
    if let MutationScope::SeriesFromHere { .. } = scope
        && target.series_type == SeriesType::Monthly
        && patch.series_amount_total_cents.is_none()
        && let Some(amount) = patch.amount_cents
    {
        let total = amount
            .checked_mul(i64::from(target.series_total))
            .ok_or_else(|| EngineError::Validation("amount too large".to_string()))?;
        patch.series_amount_total_cents = Some(total);
    }
    Ok(patch)
}
