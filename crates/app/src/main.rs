use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{Engine, Money, NewAccountCmd, StatisticsFilter, UserIncomesCmd};
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use serde::Serialize;

mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "casa")]
#[command(about = "Household ledger administration (bootstrap users, accounts, categories)")]
struct Cli {
    /// Database connection string; overrides the `database` setting.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Account(AccountArgs),
    Category(CategoryArgs),
    /// Print the statistics of a user as JSON.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register a user together with their personal account.
    New {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Set the allocation weights of a user.
    Incomes {
        #[arg(long)]
        user: String,
        #[arg(long)]
        percentage: Option<Decimal>,
        #[arg(long)]
        usd: Option<Money>,
        #[arg(long)]
        usdt: Option<Money>,
        #[arg(long)]
        cup: Option<Money>,
    },
}

#[derive(Args, Debug)]
struct AccountArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    shared: bool,
    /// Additional members (repeatable).
    #[arg(long = "member")]
    members: Vec<String>,
}

#[derive(Args, Debug)]
struct CategoryArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Caller identity.
    #[arg(long)]
    user: String,
    /// Whose statistics to show; defaults to the caller.
    #[arg(long)]
    subject: Option<String>,
    /// RFC 3339 lower bound, inclusive.
    #[arg(long)]
    start: Option<DateTime<Utc>>,
    /// RFC 3339 upper bound, inclusive.
    #[arg(long)]
    end: Option<DateTime<Utc>>,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "casa={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;

    let mut builder = Engine::builder().database(database);
    if let Some(raw) = settings.engine.principal_account_id.as_deref() {
        builder = builder.principal_account(uuid::Uuid::parse_str(raw)?);
    }
    let engine = builder.build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::New { name, email },
        }) => print_json(&engine.new_user(&name, &email).await?)?,
        Command::User(User {
            command:
                UserCommand::Incomes {
                    user,
                    percentage,
                    usd,
                    usdt,
                    cup,
                },
        }) => {
            let cmd = UserIncomesCmd {
                income_percentage: percentage,
                monthly_income_usd: usd,
                monthly_income_usdt: usdt,
                monthly_income_cup: cup,
            };
            print_json(&engine.update_user_incomes(&user, cmd).await?)?;
        }
        Command::Account(args) => {
            let mut cmd = if args.shared {
                NewAccountCmd::shared(args.owner, args.name)
            } else {
                NewAccountCmd::personal(args.owner, args.name)
            };
            for member in args.members {
                cmd = cmd.member(member);
            }
            print_json(&engine.new_account(cmd).await?)?;
        }
        Command::Category(args) => {
            print_json(&engine.new_category(&args.user, &args.name).await?)?;
        }
        Command::Stats(args) => {
            let filter = StatisticsFilter {
                start: args.start,
                end: args.end,
                user_id: args.subject,
            };
            print_json(&engine.statistics(&args.user, filter).await?)?;
        }
    }

    tracing::debug!("done");
    Ok(())
}
