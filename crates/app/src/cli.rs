//! Command line definition.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{
    AccountListFilter, AccountType, ApplyMode, MoneyCents, NewAccountCmd, NewTransactionCmd,
    Patch, SeriesType, TransactionFilter, TransactionPatch, TransactionType, UpdateAccountCmd,
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "finbook")]
#[command(about = "Personal ledger with installment and monthly series")]
pub struct Cli {
    /// Settings file, without extension (also read from `FINBOOK_SETTINGS`).
    #[arg(long, env = "FINBOOK_SETTINGS", default_value = "settings")]
    pub settings: String,

    /// Acting user; overrides `user` from the settings.
    #[arg(long, env = "FINBOOK_USER")]
    pub user: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transactions and series.
    #[command(subcommand)]
    Tx(TxCommand),
    /// Accounts and their standing.
    #[command(subcommand)]
    Account(AccountCommand),
    /// Income and expense categories.
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Dashboard figures.
    #[command(subcommand)]
    Summary(SummaryCommand),
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    Create(TxCreateArgs),
    List(TxListArgs),
    Show { id: Uuid },
    Update(TxUpdateArgs),
    /// Mark as paid (or unpaid with `--unpaid`).
    Pay {
        id: Uuid,
        #[arg(long)]
        unpaid: bool,
        #[arg(long, value_enum, default_value_t = Scope::Single)]
        scope: Scope,
    },
    Delete {
        id: Uuid,
        #[arg(long, value_enum, default_value_t = Scope::Single)]
        scope: Scope,
    },
    /// Copy a record to another date as a standalone transaction.
    Clone {
        id: Uuid,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        paid: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Scope {
    Single,
    SeriesFromHere,
}

impl From<Scope> for ApplyMode {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Single => ApplyMode::Single,
            Scope::SeriesFromHere => ApplyMode::SeriesFromHere,
        }
    }
}

#[derive(Args, Debug)]
pub struct TxCreateArgs {
    #[arg(long = "type", value_parser = parse_kind)]
    kind: TransactionType,
    /// Amount as typed, e.g. `R$ 1.234,56` or `99,90`.
    #[arg(long, value_parser = parse_amount)]
    amount: MoneyCents,
    /// `YYYY-MM-DD` or ISO date-time.
    #[arg(long)]
    date: String,
    #[arg(long)]
    description: String,
    /// Split the amount over this many monthly installments.
    #[arg(long, conflicts_with = "monthly")]
    installments: Option<u32>,
    /// Repeat the amount every month for a year.
    #[arg(long)]
    monthly: bool,
    #[arg(long)]
    account: Option<Uuid>,
    #[arg(long)]
    category: Option<Uuid>,
    #[arg(long)]
    payment_method: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    paid: bool,
}

impl TxCreateArgs {
    pub fn into_cmd(self, user_id: &str) -> NewTransactionCmd {
        let mut cmd = NewTransactionCmd::new(
            user_id,
            self.kind,
            self.amount,
            self.date,
            self.description,
        )
        .paid(self.paid);
        if let Some(count) = self.installments {
            cmd = cmd.installments(count);
        } else if self.monthly {
            cmd = cmd.monthly();
        }
        cmd.account_id = self.account;
        cmd.category_id = self.category;
        cmd.payment_method = self.payment_method;
        cmd.notes = self.notes;
        cmd
    }
}

#[derive(Args, Debug)]
pub struct TxListArgs {
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
    #[arg(long = "type", value_parser = parse_kind)]
    kind: Option<TransactionType>,
    #[arg(long)]
    account: Vec<Uuid>,
    #[arg(long)]
    category: Option<Uuid>,
    #[arg(long)]
    paid: Option<bool>,
    #[arg(long, value_parser = parse_series_type)]
    series_type: Option<SeriesType>,
    #[arg(long)]
    search: Option<String>,
    /// Oldest first.
    #[arg(long)]
    pub asc: bool,
}

impl TxListArgs {
    pub fn filter(&self) -> TransactionFilter {
        let mut filter = TransactionFilter::default().between(self.from, self.to);
        if !self.account.is_empty() {
            filter = filter.accounts(self.account.clone());
        }
        filter.kind = self.kind;
        filter.category_id = self.category;
        filter.is_paid = self.paid;
        filter.series_type = self.series_type;
        filter.search = self.search.clone();
        filter
    }
}

#[derive(Args, Debug)]
pub struct TxUpdateArgs {
    pub id: Uuid,
    #[arg(long, value_enum, default_value_t = Scope::Single)]
    pub scope: Scope,
    /// Series the record is expected to belong to.
    #[arg(long, requires = "sequence")]
    pub series: Option<Uuid>,
    /// Expected position of the record in `--series`.
    #[arg(long, requires = "series")]
    pub sequence: Option<u32>,
    #[arg(long = "type", value_parser = parse_kind)]
    kind: Option<TransactionType>,
    #[arg(long, value_parser = parse_amount)]
    amount: Option<MoneyCents>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, conflicts_with = "clear_notes")]
    notes: Option<String>,
    #[arg(long)]
    clear_notes: bool,
    #[arg(long, conflicts_with = "clear_payment_method")]
    payment_method: Option<String>,
    #[arg(long)]
    clear_payment_method: bool,
    #[arg(long, conflicts_with = "clear_account")]
    account: Option<Uuid>,
    #[arg(long)]
    clear_account: bool,
    #[arg(long, conflicts_with = "clear_category")]
    category: Option<Uuid>,
    #[arg(long)]
    clear_category: bool,
    #[arg(long)]
    paid: Option<bool>,
    /// New series total (the amount originally entered).
    #[arg(long, value_parser = parse_amount)]
    total: Option<MoneyCents>,
}

fn patch_of<T>(value: Option<T>, clear: bool) -> Patch<T> {
    match (value, clear) {
        (Some(value), _) => Patch::Value(value),
        (None, true) => Patch::Null,
        (None, false) => Patch::Unset,
    }
}

impl TxUpdateArgs {
    pub fn patch(&self) -> TransactionPatch {
        TransactionPatch {
            kind: self.kind,
            amount_cents: self.amount,
            date: self.date,
            description: self.description.clone(),
            notes: patch_of(self.notes.clone(), self.clear_notes),
            payment_method: patch_of(self.payment_method.clone(), self.clear_payment_method),
            account_id: patch_of(self.account, self.clear_account),
            category_id: patch_of(self.category, self.clear_category),
            is_paid: self.paid,
            series_amount_total_cents: self.total,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    Create(AccountCreateArgs),
    List {
        #[arg(long = "type", value_parser = parse_account_type)]
        kind: Option<AccountType>,
        #[arg(long)]
        active: Option<bool>,
    },
    Update(AccountUpdateArgs),
    Delete { id: Uuid },
    /// Available limit or declared balance.
    Standing {
        id: Uuid,
        /// Last day of the current invoice period.
        #[arg(long)]
        cutoff: Option<NaiveDate>,
    },
}

pub fn account_filter(kind: Option<AccountType>, active: Option<bool>) -> AccountListFilter {
    AccountListFilter {
        kind,
        is_active: active,
    }
}

#[derive(Args, Debug)]
pub struct AccountCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long = "type", value_parser = parse_account_type)]
    kind: AccountType,
    #[arg(long, value_parser = parse_amount)]
    limit: Option<MoneyCents>,
    #[arg(long, value_parser = parse_amount)]
    balance: Option<MoneyCents>,
    #[arg(long)]
    inactive: bool,
}

impl AccountCreateArgs {
    pub fn into_cmd(self, user_id: &str) -> NewAccountCmd {
        let mut cmd = NewAccountCmd::new(user_id, self.name, self.kind).active(!self.inactive);
        cmd.limit_cents = self.limit;
        cmd.balance_cents = self.balance;
        cmd
    }
}

#[derive(Args, Debug)]
pub struct AccountUpdateArgs {
    pub id: Uuid,
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "type", value_parser = parse_account_type)]
    kind: Option<AccountType>,
    #[arg(long, value_parser = parse_amount, conflicts_with = "clear_limit")]
    limit: Option<MoneyCents>,
    #[arg(long)]
    clear_limit: bool,
    #[arg(long, value_parser = parse_amount, conflicts_with = "clear_balance")]
    balance: Option<MoneyCents>,
    #[arg(long)]
    clear_balance: bool,
    #[arg(long)]
    active: Option<bool>,
}

impl AccountUpdateArgs {
    pub fn cmd(&self) -> UpdateAccountCmd {
        UpdateAccountCmd {
            name: self.name.clone(),
            kind: self.kind,
            limit_cents: patch_of(self.limit, self.clear_limit),
            balance_cents: patch_of(self.balance, self.clear_balance),
            is_active: self.active,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_parser = parse_kind)]
        kind: TransactionType,
        #[arg(long)]
        color: Option<String>,
    },
    List {
        #[arg(long = "type", value_parser = parse_kind)]
        kind: Option<TransactionType>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum SummaryCommand {
    /// Totals of the accounts card.
    Overview {
        #[arg(long)]
        cutoff: Option<NaiveDate>,
    },
    /// Unpaid expenses still to come, per account.
    Installments {
        #[arg(long = "account", required = true)]
        accounts: Vec<Uuid>,
        #[arg(long)]
        cutoff: Option<NaiveDate>,
    },
    /// Income, expense and balance of a date range.
    Period {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

fn parse_amount(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

fn parse_kind(raw: &str) -> Result<TransactionType, String> {
    TransactionType::try_from(raw).map_err(|err| err.to_string())
}

fn parse_series_type(raw: &str) -> Result<SeriesType, String> {
    SeriesType::try_from(raw).map_err(|err| err.to_string())
}

fn parse_account_type(raw: &str) -> Result<AccountType, String> {
    AccountType::try_from(raw).map_err(|err| err.to_string())
}
