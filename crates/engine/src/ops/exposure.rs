use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    AccountStanding, AccountsOverview, DateOrder, InstallmentsSummary, PeriodTotals,
    ResultEngine, TransactionFilter, account_standing, accounts_overview, future_installments,
    period_totals,
};

use super::{AccountListFilter, Engine, accounts::require_account, store::select_where};

impl Engine {
    /// Standing of one account computed from its current unpaid expenses.
    pub async fn account_standing(
        &self,
        user_id: &str,
        account_id: Uuid,
        cutoff: Option<NaiveDate>,
    ) -> ResultEngine<AccountStanding> {
        let account = require_account(&self.database, user_id, account_id).await?;
        let pending = select_where(
            &self.database,
            user_id,
            &TransactionFilter::unpaid_expenses().account(account_id),
            DateOrder::Ascending,
        )
        .await?;
        Ok(account_standing(&account, &pending, cutoff))
    }

    /// Future unpaid expenses for each of `account_ids`.
    pub async fn future_installments(
        &self,
        user_id: &str,
        account_ids: &[Uuid],
        cutoff: Option<NaiveDate>,
    ) -> ResultEngine<Vec<InstallmentsSummary>> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut filter = TransactionFilter::unpaid_expenses().accounts(account_ids.to_vec());
        if let Some(cutoff) = cutoff {
            filter = filter.after(cutoff);
        }
        let pending = select_where(&self.database, user_id, &filter, DateOrder::Ascending).await?;
        Ok(future_installments(account_ids, &pending, cutoff))
    }

    /// Totals of every account of the user.
    pub async fn accounts_overview(
        &self,
        user_id: &str,
        cutoff: Option<NaiveDate>,
    ) -> ResultEngine<AccountsOverview> {
        let accounts = self
            .list_accounts(user_id, AccountListFilter::default())
            .await?;
        let pending = select_where(
            &self.database,
            user_id,
            &TransactionFilter::unpaid_expenses(),
            DateOrder::Ascending,
        )
        .await?;
        Ok(accounts_overview(&accounts, &pending, cutoff))
    }

    /// Income/expense totals of the records matching `filter`.
    pub async fn period_totals(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> ResultEngine<PeriodTotals> {
        let records = select_where(&self.database, user_id, filter, DateOrder::Ascending).await?;
        tracing::debug!(records = records.len(), "computing period totals");
        Ok(period_totals(&records))
    }
}
