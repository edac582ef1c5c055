//! Transaction primitives.
//!
//! A `Transaction` is one dated income or expense record. Records generated
//! together from a recurrence request share a `series_id`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

/// How a record was generated. Fixed at creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesType {
    Single,
    Installment,
    Monthly,
}

impl SeriesType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Installment => "installment",
            Self::Monthly => "monthly",
        }
    }

    /// `true` for every generated series (anything but `single`).
    pub fn is_series(self) -> bool {
        self != Self::Single
    }
}

impl TryFrom<&str> for SeriesType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "single" => Ok(Self::Single),
            "installment" => Ok(Self::Installment),
            "monthly" => Ok(Self::Monthly),
            other => Err(EngineError::Validation(format!(
                "unrecognized recurrence type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount_cents: MoneyCents,
    pub date: NaiveDate,
    pub description: String,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub is_paid: bool,
    pub series_type: SeriesType,
    pub series_id: Option<Uuid>,
    pub series_sequence: u32,
    pub series_total: u32,
    pub series_amount_total_cents: MoneyCents,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Series coordinates of this record, `None` for `single` records.
    pub fn series_meta(&self) -> Option<crate::SeriesMeta> {
        self.series_id.map(|series_id| crate::SeriesMeta {
            series_id,
            series_sequence: self.series_sequence,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub amount_cents: i64,
    pub date: Date,
    pub description: String,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub is_paid: bool,
    pub series_type: String,
    pub series_id: Option<String>,
    pub series_sequence: i32,
    pub series_total: i32,
    pub series_amount_total_cents: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_cents: ActiveValue::Set(tx.amount_cents.cents()),
            date: ActiveValue::Set(tx.date),
            description: ActiveValue::Set(tx.description.clone()),
            notes: ActiveValue::Set(tx.notes.clone()),
            payment_method: ActiveValue::Set(tx.payment_method.clone()),
            account_id: ActiveValue::Set(tx.account_id.map(|id| id.to_string())),
            category_id: ActiveValue::Set(tx.category_id.map(|id| id.to_string())),
            is_paid: ActiveValue::Set(tx.is_paid),
            series_type: ActiveValue::Set(tx.series_type.as_str().to_string()),
            series_id: ActiveValue::Set(tx.series_id.map(|id| id.to_string())),
            series_sequence: ActiveValue::Set(tx.series_sequence as i32),
            series_total: ActiveValue::Set(tx.series_total as i32),
            series_amount_total_cents: ActiveValue::Set(tx.series_amount_total_cents.cents()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: model.user_id,
            kind: TransactionType::try_from(model.kind.as_str())?,
            amount_cents: MoneyCents::new(model.amount_cents),
            date: model.date,
            description: model.description,
            notes: model.notes,
            payment_method: model.payment_method,
            account_id: model
                .account_id
                .as_deref()
                .map(|id| parse_uuid(id, "account"))
                .transpose()?,
            category_id: model
                .category_id
                .as_deref()
                .map(|id| parse_uuid(id, "category"))
                .transpose()?,
            is_paid: model.is_paid,
            series_type: SeriesType::try_from(model.series_type.as_str())?,
            series_id: model
                .series_id
                .as_deref()
                .map(|id| parse_uuid(id, "series"))
                .transpose()?,
            series_sequence: series_position(model.series_sequence, "series_sequence")?,
            series_total: series_position(model.series_total, "series_total")?,
            series_amount_total_cents: MoneyCents::new(model.series_amount_total_cents),
            created_at: model.created_at,
        })
    }
}

/// Stored series positions are 1-based; anything else is a corrupt row.
fn series_position(value: i32, label: &str) -> ResultEngine<u32> {
    u32::try_from(value)
        .ok()
        .filter(|position| *position >= 1)
        .ok_or_else(|| EngineError::Validation(format!("invalid {label} {value}")))
}
