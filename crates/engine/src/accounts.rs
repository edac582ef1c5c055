//! The module contains `Account` struct and its implementation.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

/// Where money is kept or spent from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    CreditCard,
    DebitCard,
    Cash,
    Pix,
    Boleto,
    FoodVoucher,
    Transfer,
    Ewallet,
    BankAccount,
}

impl AccountType {
    pub const ALL: [AccountType; 9] = [
        Self::CreditCard,
        Self::DebitCard,
        Self::Cash,
        Self::Pix,
        Self::Boleto,
        Self::FoodVoucher,
        Self::Transfer,
        Self::Ewallet,
        Self::BankAccount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Cash => "cash",
            Self::Pix => "pix",
            Self::Boleto => "boleto",
            Self::FoodVoucher => "food_voucher",
            Self::Transfer => "transfer",
            Self::Ewallet => "ewallet",
            Self::BankAccount => "bank_account",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::CreditCard => "Credit card",
            Self::DebitCard => "Debit card",
            Self::Cash => "Cash",
            Self::Pix => "Pix",
            Self::Boleto => "Boleto",
            Self::FoodVoucher => "Food voucher",
            Self::Transfer => "Transfer",
            Self::Ewallet => "Digital wallet",
            Self::BankAccount => "Bank account",
        }
    }

    pub fn is_credit_card(self) -> bool {
        self == Self::CreditCard
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| EngineError::Validation(format!("invalid account type: {value}")))
    }
}

/// An account.
///
/// A card, a bank account, a cash drawer. Only credit cards use `limit_cents`;
/// the other types surface the user-declared `balance_cents` as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    pub limit_cents: Option<MoneyCents>,
    pub balance_cents: Option<MoneyCents>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub limit_cents: Option<i64>,
    pub balance_cents: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            user_id: ActiveValue::Set(account.user_id.clone()),
            name: ActiveValue::Set(account.name.clone()),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            limit_cents: ActiveValue::Set(account.limit_cents.map(MoneyCents::cents)),
            balance_cents: ActiveValue::Set(account.balance_cents.map(MoneyCents::cents)),
            is_active: ActiveValue::Set(account.is_active),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            user_id: model.user_id,
            name: model.name,
            kind: AccountType::try_from(model.kind.as_str())?,
            limit_cents: model.limit_cents.map(MoneyCents::new),
            balance_cents: model.balance_cents.map(MoneyCents::new),
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}
