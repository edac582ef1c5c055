use chrono::Utc;
use sea_orm::{ConnectionTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    ApplyMode, CloneTransactionCmd, DateOrder, DeleteTransactionCmd, EngineError,
    NewTransactionCmd, Patch, ResultEngine, SeriesType, Transaction, TransactionFilter,
    TransactionPatch, UpdateTransactionCmd, effective_patch, generate_series, resolve_scope,
    util::{ensure_non_negative, normalize_optional_text, normalize_required_text},
};

use super::{
    Engine,
    accounts::require_account,
    categories::ensure_category_matches,
    store::{delete_where, insert_batch, select_where, update_where},
    with_tx,
};

/// Trims text fields and rejects values the store must never hold.
fn normalize_patch(mut patch: TransactionPatch) -> ResultEngine<TransactionPatch> {
    if let Some(description) = patch.description.as_deref() {
        patch.description = Some(normalize_required_text(description, "description")?);
    }
    patch.notes = trim_text_patch(patch.notes);
    patch.payment_method = trim_text_patch(patch.payment_method);
    if let Some(amount) = patch.amount_cents {
        ensure_non_negative(amount.cents(), "amount_cents")?;
    }
    if let Some(total) = patch.series_amount_total_cents {
        ensure_non_negative(total.cents(), "series_amount_total_cents")?;
    }
    Ok(patch)
}

/// A text patch that trims to nothing clears the field.
fn trim_text_patch(patch: Patch<String>) -> Patch<String> {
    match patch {
        Patch::Value(value) => normalize_optional_text(Some(&value)).into(),
        other => other,
    }
}

impl Engine {
    /// Creates a transaction, expanding it into a series when requested.
    ///
    /// All records are validated first and then written in one DB
    /// transaction: either the whole series is stored or nothing is.
    pub async fn create_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Vec<Transaction>> {
        let records = generate_series(&cmd, Utc::now())?;
        with_tx!(self, |db_tx| {
            if let Some(account_id) = cmd.account_id {
                require_account(&db_tx, &cmd.user_id, account_id).await?;
            }
            if let Some(category_id) = cmd.category_id {
                ensure_category_matches(&db_tx, &cmd.user_id, category_id, cmd.kind)
                    .await?;
            }
            let stored = insert_batch(&db_tx, &records).await?;
            tracing::info!(
                user = cmd.user_id.as_str(),
                recurrence = cmd.recurrence_type.as_str(),
                records = stored.len(),
                "created transactions"
            );
            Ok(stored)
        })
    }

    /// Returns one transaction.
    pub async fn transaction(&self, user_id: &str, id: Uuid) -> ResultEngine<Transaction> {
        require_transaction(&self.database, user_id, id).await
    }

    /// Lists transactions matching `filter`.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
        order: DateOrder,
    ) -> ResultEngine<Vec<Transaction>> {
        select_where(&self.database, user_id, filter, order).await
    }

    /// Updates one transaction or, with [`ApplyMode::SeriesFromHere`], the
    /// target and every later record of its series. Returns the updated
    /// records in series order.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Vec<Transaction>> {
        let user_id = cmd.user_id.as_str();
        let patch = normalize_patch(cmd.patch)?;
        with_tx!(self, |db_tx| {
            let target = require_transaction(&db_tx, user_id, cmd.id).await?;
            let scope = resolve_scope(&target, cmd.apply_mode, cmd.series_meta).inspect_err(|err| {
                tracing::warn!(transaction = %cmd.id, "rejected update: {err}");
            })?;

            if let Patch::Value(account_id) = patch.account_id {
                require_account(&db_tx, user_id, account_id).await?;
            }
            let kind = patch.kind.unwrap_or(target.kind);
            if let Some(category_id) = patch.category_id.clone().resolve(target.category_id)
                && (patch.kind.is_some() || !patch.category_id.is_unset())
            {
                ensure_category_matches(&db_tx, user_id, category_id, kind)
                    .await?;
            }

            let patch = effective_patch(&target, scope, patch)?;
            tracing::debug!(transaction = %cmd.id, ?scope, "resolved update scope");
            let updated = update_where(&db_tx, user_id, &scope.filter(), &patch).await?;
            tracing::info!(transaction = %cmd.id, records = updated.len(), "updated transactions");
            Ok(updated)
        })
    }

    /// Marks one transaction (or the tail of its series) as paid or unpaid.
    pub async fn set_paid(
        &self,
        user_id: &str,
        id: Uuid,
        is_paid: bool,
        mode: ApplyMode,
    ) -> ResultEngine<Vec<Transaction>> {
        let patch = TransactionPatch {
            is_paid: Some(is_paid),
            ..Default::default()
        };
        self.update_transaction(UpdateTransactionCmd::new(id, user_id, patch).apply_mode(mode))
            .await
    }

    /// Deletes one transaction or the tail of its series. Earlier records of
    /// the series keep their `series_total`.
    pub async fn delete_transaction(&self, cmd: DeleteTransactionCmd) -> ResultEngine<u64> {
        let user_id = cmd.user_id.as_str();
        with_tx!(self, |db_tx| {
            let target = require_transaction(&db_tx, user_id, cmd.id).await?;
            let scope = resolve_scope(&target, cmd.mode, cmd.series_meta).inspect_err(|err| {
                tracing::warn!(transaction = %cmd.id, "rejected delete: {err}");
            })?;
            tracing::debug!(transaction = %cmd.id, ?scope, "resolved delete scope");
            let removed = delete_where(&db_tx, user_id, &scope.filter()).await?;
            tracing::info!(transaction = %cmd.id, removed, "deleted transactions");
            Ok(removed)
        })
    }

    /// Copies a record to another date as a new standalone transaction.
    pub async fn clone_transaction(&self, cmd: CloneTransactionCmd) -> ResultEngine<Transaction> {
        let user_id = cmd.user_id.as_str();
        with_tx!(self, |db_tx| {
            let source = require_transaction(&db_tx, user_id, cmd.source_id).await?;
            let copy = clone_of(&source, cmd.date, cmd.is_paid);
            insert_batch(&db_tx, std::slice::from_ref(&copy)).await?;
            tracing::info!(source = %cmd.source_id, copy = %copy.id, "cloned transaction");
            Ok(copy)
        })
    }
}

fn clone_of(source: &Transaction, date: chrono::NaiveDate, is_paid: bool) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        date,
        is_paid,
        series_type: SeriesType::Single,
        series_id: None,
        series_sequence: 1,
        series_total: 1,
        series_amount_total_cents: source.amount_cents,
        created_at: Utc::now(),
        ..source.clone()
    }
}

pub(super) async fn require_transaction<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    id: Uuid,
) -> ResultEngine<Transaction> {
    select_where(db, user_id, &TransactionFilter::default().id(id), DateOrder::Ascending)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))
}
