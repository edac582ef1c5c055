use std::error::Error;

use clap::Parser;
use engine::{
    Account, AccountStanding, CloneTransactionCmd, DateOrder, DeleteTransactionCmd, Engine,
    NewCategoryCmd, SeriesMeta, Transaction, TransactionFilter, UpdateTransactionCmd,
    format_date_br, series_label,
};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;
use settings::Database;

use crate::cli::{
    AccountCommand, CategoryCommand, Cli, Command, SummaryCommand, TxCommand, account_filter,
};

mod cli;
mod settings;

type ResultApp<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> ResultApp<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.settings)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finbook={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let Some(user) = cli.user.clone().or(settings.user.clone()) else {
        return Err("no acting user: pass --user or set `user` in the settings".into());
    };

    let db = parse_database(&settings.database).await?;
    let engine = Engine::builder().database(db).build().await?;
    tracing::debug!(user = user.as_str(), "engine ready");

    run(&engine, &user, cli).await
}

async fn run(engine: &Engine, user: &str, cli: Cli) -> ResultApp<()> {
    let json = cli.json;
    match cli.command {
        Command::Tx(command) => match command {
            TxCommand::Create(args) => {
                let created = engine.create_transaction(args.into_cmd(user)).await?;
                print_transactions(&created, json)?;
            }
            TxCommand::List(args) => {
                let order = if args.asc {
                    DateOrder::Ascending
                } else {
                    DateOrder::Descending
                };
                let records = engine
                    .list_transactions(user, &args.filter(), order)
                    .await?;
                print_transactions(&records, json)?;
            }
            TxCommand::Show { id } => {
                let record = engine.transaction(user, id).await?;
                print_transactions(std::slice::from_ref(&record), json)?;
            }
            TxCommand::Update(args) => {
                let mut cmd = UpdateTransactionCmd::new(args.id, user, args.patch())
                    .apply_mode(args.scope.into());
                if let (Some(series_id), Some(series_sequence)) = (args.series, args.sequence) {
                    cmd = cmd.series_meta(SeriesMeta {
                        series_id,
                        series_sequence,
                    });
                }
                let updated = engine.update_transaction(cmd).await?;
                print_transactions(&updated, json)?;
            }
            TxCommand::Pay { id, unpaid, scope } => {
                let updated = engine.set_paid(user, id, !unpaid, scope.into()).await?;
                print_transactions(&updated, json)?;
            }
            TxCommand::Delete { id, scope } => {
                let removed = engine
                    .delete_transaction(DeleteTransactionCmd::new(id, user, scope.into()))
                    .await?;
                println!("deleted {removed} transaction(s)");
            }
            TxCommand::Clone { id, date, paid } => {
                let copy = engine
                    .clone_transaction(CloneTransactionCmd {
                        source_id: id,
                        user_id: user.to_string(),
                        date,
                        is_paid: paid,
                    })
                    .await?;
                print_transactions(std::slice::from_ref(&copy), json)?;
            }
        },
        Command::Account(command) => match command {
            AccountCommand::Create(args) => {
                let account = engine.create_account(args.into_cmd(user)).await?;
                print_accounts(engine, user, &[account], json).await?;
            }
            AccountCommand::List { kind, active } => {
                let accounts = engine
                    .list_accounts(user, account_filter(kind, active))
                    .await?;
                print_accounts(engine, user, &accounts, json).await?;
            }
            AccountCommand::Update(args) => {
                let account = engine.update_account(user, args.id, args.cmd()).await?;
                print_accounts(engine, user, &[account], json).await?;
            }
            AccountCommand::Delete { id } => {
                engine.delete_account(user, id).await?;
                println!("deleted account {id}");
            }
            AccountCommand::Standing { id, cutoff } => {
                let standing = engine.account_standing(user, id, cutoff).await?;
                print_value(&standing, json, |s: &AccountStanding| s.hint())?;
            }
        },
        Command::Category(command) => match command {
            CategoryCommand::Create { name, kind, color } => {
                let category = engine
                    .create_category(NewCategoryCmd {
                        user_id: user.to_string(),
                        name,
                        kind,
                        color,
                    })
                    .await?;
                print_value(&category, json, |c| format!("{}  {}", c.id, c.name))?;
            }
            CategoryCommand::List { kind } => {
                let categories = engine.list_categories(user, kind).await?;
                print_value(&categories, json, |all| {
                    all.iter()
                        .map(|c| format!("{}  {:<7}  {}", c.id, c.kind.as_str(), c.name))
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
            CategoryCommand::Delete { id } => {
                engine.delete_category(user, id).await?;
                println!("deleted category {id}");
            }
        },
        Command::Summary(command) => match command {
            SummaryCommand::Overview { cutoff } => {
                let overview = engine.accounts_overview(user, cutoff).await?;
                print_value(&overview, json, |o| {
                    format!(
                        "active accounts: {}\ncredit limit: {}\navailable limit: {}\ndeclared balances: {}",
                        o.active_accounts,
                        o.credit_limit_total_cents,
                        o.credit_available_total_cents,
                        o.declared_balances_total_cents
                    )
                })?;
            }
            SummaryCommand::Installments { accounts, cutoff } => {
                let summaries = engine.future_installments(user, &accounts, cutoff).await?;
                print_value(&summaries, json, |all| {
                    all.iter()
                        .map(|s| {
                            format!(
                                "{}  {}  ({} installments left)",
                                s.account_id, s.future_amount_cents, s.remaining_installments
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })?;
            }
            SummaryCommand::Period { from, to } => {
                let filter = TransactionFilter::default().between(from, to);
                let totals = engine.period_totals(user, &filter).await?;
                print_value(&totals, json, |t| {
                    format!(
                        "income: {}\nexpense: {}\nbalance: {}\npending: {}",
                        t.income_cents, t.expense_cents, t.balance_cents, t.pending_count
                    )
                })?;
            }
        },
    }
    Ok(())
}

fn print_value<T: Serialize>(value: &T, json: bool, text: impl Fn(&T) -> String) -> ResultApp<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn print_transactions(records: &[Transaction], json: bool) -> ResultApp<()> {
    print_value(&records, json, |records| {
        records
            .iter()
            .map(|tx| {
                format!(
                    "{}  {}  {:<7}  {:>14}  {}  [{}]{}",
                    tx.id,
                    format_date_br(tx.date),
                    tx.kind.as_str(),
                    tx.amount_cents.to_string(),
                    tx.description,
                    series_label(
                        tx.series_type,
                        Some(tx.series_sequence),
                        Some(tx.series_total)
                    ),
                    if tx.is_paid { "  paid" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

async fn print_accounts(
    engine: &Engine,
    user: &str,
    accounts: &[Account],
    json: bool,
) -> ResultApp<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(accounts)?);
        return Ok(());
    }
    for account in accounts {
        let standing = engine.account_standing(user, account.id, None).await?;
        println!(
            "{}  {:<14}  {}{}  {}",
            account.id,
            account.kind.label(),
            account.name,
            if account.is_active { "" } else { " (inactive)" },
            standing.hint()
        );
    }
    Ok(())
}

async fn parse_database(config: &Database) -> ResultApp<sea_orm::DatabaseConnection> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
