use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, AccountType, EngineError, MoneyCents, NewAccountCmd, ResultEngine, UpdateAccountCmd,
    accounts,
    patch::set_if,
    transactions,
    util::{ensure_non_negative, normalize_required_text},
};

use super::{Engine, with_tx};

/// Optional constraints of [`Engine::list_accounts`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AccountListFilter {
    pub kind: Option<AccountType>,
    pub is_active: Option<bool>,
}

impl AccountListFilter {
    #[must_use]
    pub fn active_only() -> Self {
        Self {
            is_active: Some(true),
            ..Default::default()
        }
    }
}

fn ensure_limit(limit: Option<MoneyCents>) -> ResultEngine<()> {
    match limit {
        Some(limit) => ensure_non_negative(limit.cents(), "limit_cents"),
        None => Ok(()),
    }
}

impl Engine {
    /// Registers an account. The declared balance may be negative (overdraft).
    pub async fn create_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        ensure_limit(cmd.limit_cents)?;
        let account = Account {
            id: Uuid::new_v4(),
            name: normalize_required_text(&cmd.name, "account name")?,
            user_id: cmd.user_id,
            kind: cmd.kind,
            limit_cents: cmd.limit_cents,
            balance_cents: cmd.balance_cents,
            is_active: cmd.is_active,
            created_at: Utc::now(),
        };
        accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;
        tracing::info!(account = %account.id, kind = account.kind.as_str(), "created account");
        Ok(account)
    }

    pub async fn account(&self, user_id: &str, id: Uuid) -> ResultEngine<Account> {
        require_account(&self.database, user_id, id).await
    }

    /// Lists accounts ordered by name.
    pub async fn list_accounts(
        &self,
        user_id: &str,
        filter: AccountListFilter,
    ) -> ResultEngine<Vec<Account>> {
        let mut query = accounts::Entity::find().filter(accounts::Column::UserId.eq(user_id));
        if let Some(kind) = filter.kind {
            query = query.filter(accounts::Column::Kind.eq(kind.as_str()));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }
        query
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    pub async fn update_account(
        &self,
        user_id: &str,
        id: Uuid,
        cmd: UpdateAccountCmd,
    ) -> ResultEngine<Account> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_text(name, "account name"))
            .transpose()?;
        if let crate::Patch::Value(limit) = cmd.limit_cents {
            ensure_limit(Some(limit))?;
        }

        with_tx!(self, |db_tx| {
            require_account(&db_tx, user_id, id).await?;
            let active = accounts::ActiveModel {
                id: ActiveValue::Unchanged(id.to_string()),
                name: set_if(name),
                kind: set_if(cmd.kind.map(|kind| kind.as_str().to_string())),
                limit_cents: cmd.limit_cents.map(MoneyCents::cents).into_active_value(),
                balance_cents: cmd.balance_cents.map(MoneyCents::cents).into_active_value(),
                is_active: set_if(cmd.is_active),
                ..Default::default()
            };
            if active.is_changed() {
                active.update(&db_tx).await?;
            }
            let account = require_account(&db_tx, user_id, id).await?;
            tracing::info!(account = %id, "updated account");
            Ok(account)
        })
    }

    /// Deletes an account. Its transactions are kept, unlinked from it.
    pub async fn delete_account(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_account(&db_tx, user_id, id).await?;
            let detached = transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::AccountId,
                    Expr::value(Option::<String>::None),
                )
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::AccountId.eq(id.to_string()))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            tracing::info!(account = %id, detached = detached.rows_affected, "deleted account");
            Ok(())
        })
    }
}

pub(super) async fn require_account<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    id: Uuid,
) -> ResultEngine<Account> {
    let model = accounts::Entity::find_by_id(id.to_string())
        .filter(accounts::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("account {id}")))?;
    Account::try_from(model)
}
