//! Record store over the `transactions` table.
//!
//! Every query is scoped to the acting user; the rest of the engine only
//! speaks [`TransactionFilter`] and [`TransactionPatch`].

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{
    DateOrder, MoneyCents, ResultEngine, Transaction, TransactionFilter, TransactionPatch,
    patch::set_if, transactions,
};

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, user_id: &str, filter: &TransactionFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, user_id: &str, filter: &TransactionFilter) -> Self {
        self = self.filter(transactions::Column::UserId.eq(user_id));

        if let Some(id) = filter.id {
            self = self.filter(transactions::Column::Id.eq(id.to_string()));
        }
        if let Some(series_id) = filter.series_id {
            self = self.filter(transactions::Column::SeriesId.eq(series_id.to_string()));
        }
        if let Some(min_sequence) = filter.min_sequence {
            self = self.filter(transactions::Column::SeriesSequence.gte(min_sequence as i32));
        }
        if let Some(account_ids) = &filter.account_ids {
            let ids: Vec<String> = account_ids.iter().map(ToString::to_string).collect();
            self = self.filter(transactions::Column::AccountId.is_in(ids));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        if let Some(is_paid) = filter.is_paid {
            self = self.filter(transactions::Column::IsPaid.eq(is_paid));
        }
        if let Some(series_type) = filter.series_type {
            self = self.filter(transactions::Column::SeriesType.eq(series_type.as_str()));
        }
        if let Some(start) = filter.start_date {
            self = self.filter(transactions::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            self = self.filter(transactions::Column::Date.lte(end));
        }
        if let Some(after) = filter.after_date {
            self = self.filter(transactions::Column::Date.gt(after));
        }
        // `search` is not applied here: SQLite only folds ASCII case.

        self
    }
}

/// Restricts `query` to the ids whose description matches the search term.
async fn restrict_to_search<C, Q>(
    db: &C,
    user_id: &str,
    filter: &TransactionFilter,
    query: Q,
) -> ResultEngine<Q>
where
    C: ConnectionTrait,
    Q: QueryFilter,
{
    if filter.search_term().is_none() {
        return Ok(query);
    }
    let ids: Vec<String> = select_where(db, user_id, filter, DateOrder::Ascending)
        .await?
        .into_iter()
        .map(|tx| tx.id.to_string())
        .collect();
    Ok(query.filter(transactions::Column::Id.is_in(ids)))
}

fn patch_active_model(patch: &TransactionPatch) -> transactions::ActiveModel {
    transactions::ActiveModel {
        kind: set_if(patch.kind.map(|kind| kind.as_str().to_string())),
        amount_cents: set_if(patch.amount_cents.map(MoneyCents::cents)),
        date: set_if(patch.date),
        description: set_if(patch.description.clone()),
        notes: patch.notes.clone().into_active_value(),
        payment_method: patch.payment_method.clone().into_active_value(),
        account_id: patch
            .account_id
            .clone()
            .map(|id| id.to_string())
            .into_active_value(),
        category_id: patch
            .category_id
            .clone()
            .map(|id| id.to_string())
            .into_active_value(),
        is_paid: set_if(patch.is_paid),
        series_amount_total_cents: set_if(patch.series_amount_total_cents.map(MoneyCents::cents)),
        ..Default::default()
    }
}

/// Inserts all `records` with a single statement.
///
/// Callers run this inside a DB transaction so a failure leaves no partial
/// series behind.
pub(super) async fn insert_batch<C: ConnectionTrait>(
    db: &C,
    records: &[Transaction],
) -> ResultEngine<Vec<Transaction>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let models: Vec<transactions::ActiveModel> =
        records.iter().map(transactions::ActiveModel::from).collect();
    transactions::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;
    Ok(records.to_vec())
}

pub(super) async fn select_where<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    filter: &TransactionFilter,
    order: DateOrder,
) -> ResultEngine<Vec<Transaction>> {
    filter.validate()?;
    let query = transactions::Entity::find().apply_tx_filters(user_id, filter);
    let query = match order {
        DateOrder::Ascending => query
            .order_by_asc(transactions::Column::Date)
            .order_by_asc(transactions::Column::SeriesSequence),
        DateOrder::Descending => query
            .order_by_desc(transactions::Column::Date)
            .order_by_asc(transactions::Column::SeriesSequence),
    };
    let records = query
        .order_by_asc(transactions::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Transaction::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    Ok(records
        .into_iter()
        .filter(|tx| filter.matches_search(&tx.description))
        .collect())
}

/// Applies `patch` to every record matching `filter` and returns them.
pub(super) async fn update_where<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    filter: &TransactionFilter,
    patch: &TransactionPatch,
) -> ResultEngine<Vec<Transaction>> {
    filter.validate()?;
    if !patch.is_empty() {
        let query = transactions::Entity::update_many()
            .set(patch_active_model(patch))
            .apply_tx_filters(user_id, filter);
        let result = restrict_to_search(db, user_id, filter, query)
            .await?
            .exec(db)
            .await?;
        tracing::debug!(rows = result.rows_affected, "updated transactions");
    }
    select_where(db, user_id, filter, DateOrder::Ascending).await
}

/// Deletes every record matching `filter`, returning how many were removed.
pub(super) async fn delete_where<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    filter: &TransactionFilter,
) -> ResultEngine<u64> {
    filter.validate()?;
    let query = transactions::Entity::delete_many().apply_tx_filters(user_id, filter);
    let result = restrict_to_search(db, user_id, filter, query)
        .await?
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
