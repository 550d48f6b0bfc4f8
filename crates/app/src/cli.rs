//! Operator command line over the engine controllers.
//!
//! Every mutation runs in its own [`Journal`], committed once the command
//! succeeded.

use clap::{Args, Parser, Subcommand};
use engine::{Currency, Engine, EngineError, Expense, Journal, ShareOfExpense};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Friends and shared expenses")]
pub struct Cli {
    /// Database connection string; overrides the settings file.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Friends(Friends),
    Expenses(Expenses),
}

#[derive(Args, Debug)]
pub struct Friends {
    #[command(subcommand)]
    command: FriendsCommand,
}

#[derive(Subcommand, Debug)]
enum FriendsCommand {
    /// SENDER asks TARGET to be friends.
    Send { sender: String, target: String },
    /// ACCEPTER accepts the request of REQUESTER.
    Accept { requester: String, accepter: String },
    /// Withdraw or reject the pending request SENDER -> TARGET.
    Reject { sender: String, target: String },
    /// USER stops being friends with FRIEND.
    Unfriend { user: String, friend: String },
    /// Friends, subscribers and subscriptions of USER.
    List { user: String },
    /// Status of each CANDIDATE as seen from SUBJECT.
    Status {
        subject: String,
        candidates: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct Expenses {
    #[command(subcommand)]
    command: ExpensesCommand,
}

#[derive(Subcommand, Debug)]
enum ExpensesCommand {
    Add(ExpenseAddArgs),
    Remove { actor: String, id: Uuid },
    Show { actor: String, id: Uuid },
    Between { actor: String, other: String },
    Balance { actor: String },
}

#[derive(Args, Debug)]
struct ExpenseAddArgs {
    #[arg(long)]
    actor: String,
    #[arg(long)]
    details: String,
    /// Total cost in minor units.
    #[arg(long, allow_hyphen_values = true)]
    total: i64,
    #[arg(long, value_parser = parse_currency)]
    currency: Currency,
    /// Seconds since the Unix epoch; defaults to now.
    #[arg(long)]
    timestamp: Option<i64>,
    /// `user=signed_cost`, repeated once per party.
    #[arg(long = "share", value_parser = parse_share, allow_hyphen_values = true)]
    shares: Vec<ShareOfExpense>,
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

fn parse_share(raw: &str) -> Result<ShareOfExpense, String> {
    let (user, cost) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected user=cost, got {raw}"))?;
    let user = user.trim();
    if user.is_empty() {
        return Err(format!("missing user in {raw}"));
    }
    let cost = cost
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid cost in {raw}"))?;
    Ok(ShareOfExpense::new(user, cost))
}

fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

pub async fn run(engine: &Engine, command: Command) -> Result<Value, EngineError> {
    match command {
        Command::Friends(friends) => run_friends(engine, friends.command).await,
        Command::Expenses(expenses) => run_expenses(engine, expenses.command).await,
    }
}

async fn run_friends(engine: &Engine, command: FriendsCommand) -> Result<Value, EngineError> {
    let friends = engine.friends();
    let mut journal = Journal::new();
    let (subject, other) = match command {
        FriendsCommand::Send { sender, target } => {
            friends.send_request(&sender, &target, &mut journal).await?;
            (sender, target)
        }
        FriendsCommand::Accept {
            requester,
            accepter,
        } => {
            friends
                .accept_request(&requester, &accepter, &mut journal)
                .await?;
            (accepter, requester)
        }
        FriendsCommand::Reject { sender, target } => {
            friends
                .rollback_or_reject(&sender, &target, &mut journal)
                .await?;
            (sender, target)
        }
        FriendsCommand::Unfriend { user, friend } => {
            friends.unfriend(&user, &friend, &mut journal).await?;
            (user, friend)
        }
        FriendsCommand::List { user } => {
            let mutual = friends.friends_of(&user).await?;
            let subscribers = friends.pending_subscribers_of(&user).await?;
            let subscriptions = friends.pending_subscriptions_of(&user).await?;
            return Ok(json!({
                "friends": mutual,
                "subscribers": subscribers,
                "subscriptions": subscriptions,
            }));
        }
        FriendsCommand::Status {
            subject,
            candidates,
        } => {
            let statuses = friends.statuses_of(&subject, &candidates).await?;
            return Ok(json!(statuses));
        }
    };
    journal.commit();

    let statuses = friends.statuses_of(&subject, [other.as_str()]).await?;
    Ok(json!({ "subject": subject, "status": statuses }))
}

async fn run_expenses(engine: &Engine, command: ExpensesCommand) -> Result<Value, EngineError> {
    let ledger = engine.ledger();
    match command {
        ExpensesCommand::Add(args) => {
            let expense = Expense::new(
                args.timestamp.unwrap_or_else(now_seconds),
                args.details,
                args.total,
                args.currency,
                args.shares,
            );
            let mut journal = Journal::new();
            let id = ledger
                .add_expense(&args.actor, expense, &mut journal)
                .await?;
            journal.commit();
            Ok(json!({ "id": id }))
        }
        ExpensesCommand::Remove { actor, id } => {
            let mut journal = Journal::new();
            let removed = ledger.remove_expense(&actor, id, &mut journal).await?;
            journal.commit();
            Ok(json!({ "removed": removed }))
        }
        ExpensesCommand::Show { actor, id } => Ok(json!(ledger.get_expense(&actor, id).await?)),
        ExpensesCommand::Between { actor, other } => {
            Ok(json!(ledger.expenses_between(&actor, &other).await?))
        }
        ExpensesCommand::Balance { actor } => Ok(json!(ledger.balance_of(&actor).await?)),
    }
}
