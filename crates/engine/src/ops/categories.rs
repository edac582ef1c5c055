use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, NewCategoryCmd, ResultEngine, TransactionType, categories,
    transactions,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a category for income or expense transactions.
    pub async fn create_category(&self, cmd: NewCategoryCmd) -> ResultEngine<Category> {
        let category = Category {
            id: Uuid::new_v4(),
            name: normalize_required_text(&cmd.name, "category name")?,
            color: normalize_optional_text(cmd.color.as_deref()),
            kind: cmd.kind,
            user_id: cmd.user_id,
        };
        with_tx!(self, |db_tx| {
            let duplicate = categories::Entity::find()
                .filter(categories::Column::UserId.eq(category.user_id.as_str()))
                .filter(categories::Column::Kind.eq(category.kind.as_str()))
                .filter(categories::Column::Name.eq(category.name.as_str()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::Validation(format!(
                    "category '{}' already exists",
                    category.name
                )));
            }
            categories::ActiveModel::from(&category).insert(&db_tx).await?;
            tracing::info!(category = %category.id, name = category.name.as_str(), "created category");
            Ok(category)
        })
    }

    pub async fn category(&self, user_id: &str, id: Uuid) -> ResultEngine<Category> {
        require_category(&self.database, user_id, id).await
    }

    /// Lists categories by name, optionally only those of one transaction type.
    pub async fn list_categories(
        &self,
        user_id: &str,
        kind: Option<TransactionType>,
    ) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find().filter(categories::Column::UserId.eq(user_id));
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(kind.as_str()));
        }
        query
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    /// Deletes a category. Transactions pointing at it lose their category.
    pub async fn delete_category(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_category(&db_tx, user_id, id).await?;
            let detached = transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::CategoryId,
                    Expr::value(Option::<String>::None),
                )
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::CategoryId.eq(id.to_string()))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            tracing::info!(category = %id, detached = detached.rows_affected, "deleted category");
            Ok(())
        })
    }
}

pub(super) async fn require_category<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    id: Uuid,
) -> ResultEngine<Category> {
    let model = categories::Entity::find_by_id(id.to_string())
        .filter(categories::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("category {id}")))?;
    Category::try_from(model)
}

/// Rejects a category whose type differs from the transaction's.
pub(super) async fn ensure_category_matches<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    category_id: Uuid,
    kind: TransactionType,
) -> ResultEngine<()> {
    let category = require_category(db, user_id, category_id).await?;
    if category.kind != kind {
        return Err(EngineError::Validation(format!(
            "category '{}' is for {} transactions, not {}",
            category.name,
            category.kind.as_str(),
            kind.as_str()
        )));
    }
    Ok(())
}
