use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ledgerlens_core::{EntryKind, RawTransaction, format_dmy, summarize};
use ledgerlens_ingest::{MessageParser, MessageQuery, TokenStreamParser, tokens_from_text};
use ledgerlens_sync::{
    JsonFileSource, MessageSource, TransactionStore, UploadCoordinator, UploadReport,
    import_messages, import_statement,
};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "ledgerlens", version, about = "Turn bank statements and SMS alerts into transactions")]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement's text-layer dump (one extracted fragment per line)
    Statement {
        #[arg(long)]
        tokens: PathBuf,

        /// Write parsed rows to this CSV file
        #[arg(long)]
        out: Option<PathBuf>,

        /// Upload parsed rows to the configured store
        #[arg(long)]
        import: bool,
    },

    /// Parse an SMS export (JSON) for transaction alerts
    Sms {
        #[arg(long)]
        messages: PathBuf,

        /// Max messages to read (default: config import.message_limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Only messages at/after this epoch-millis timestamp (default: stored cursor)
        #[arg(long)]
        since: Option<i64>,

        /// Upload and advance the stored cursor
        #[arg(long)]
        import: bool,
    },

    /// Record a manual entry
    Add {
        /// DD/MM/YYYY
        #[arg(long)]
        date: String,

        #[arg(long)]
        description: String,

        /// Positive amount; expenses are stored negative
        #[arg(long)]
        amount: f64,

        #[arg(long)]
        income: bool,
    },

    /// Income/expense totals and category breakdown of stored transactions
    Summary,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.ledgerlens/config.toml
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Statement {
            tokens,
            out,
            import,
        } => statement(&tokens, out.as_deref(), import).await?,

        Command::Sms {
            messages,
            limit,
            since,
            import,
        } => sms(&messages, limit, since, import).await?,

        Command::Add {
            date,
            description,
            amount,
            income,
        } => add(&date, &description, amount, income).await?,

        Command::Summary => summary().await?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn statement(tokens_path: &Path, out: Option<&Path>, import: bool) -> Result<()> {
    if !tokens_path.exists() {
        bail!("token dump not found: {}", tokens_path.display());
    }
    let text = std::fs::read_to_string(tokens_path)
        .with_context(|| format!("read {}", tokens_path.display()))?;
    let tokens = tokens_from_text(&text);
    let parser = TokenStreamParser::new();
    let txns = parser.parse(&tokens);

    println!("Parsed {} transactions from {} tokens\n", txns.len(), tokens.len());
    print_transactions(&txns);

    if let Some(out) = out {
        write_csv(out, &txns)?;
        println!("\nWrote {}", out.display());
    }

    if import {
        let cfg = config::load_config()?;
        let store = cfg.store.open()?;
        let coordinator =
            UploadCoordinator::new(&store, cfg.import.owner.clone()).with_batch_size(cfg.import.batch_size);
        let report = import_statement(&tokens, &parser, &coordinator).await?;
        print_report(&report);
    }

    Ok(())
}

async fn sms(path: &Path, limit: Option<usize>, since: Option<i64>, import: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let state_path = state::state_path()?;
    let mut import_state = state::read_state(&state_path)?;

    let query = MessageQuery::since(since.unwrap_or(import_state.sms_cursor))
        .with_limit(limit.unwrap_or(cfg.import.message_limit));
    let parser = MessageParser::new(cfg.import.tz()?);
    let source = JsonFileSource::new(path);
    debug!(min_date = query.min_date, limit = query.effective_limit(), "sms window");

    if !import {
        let messages = source
            .read_messages(&query)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let txns = parser.parse_messages(&messages);
        println!(
            "Parsed {} transactions from {} messages (since {})\n",
            txns.len(),
            messages.len(),
            query.min_date
        );
        print_transactions(&txns);
        return Ok(());
    }

    let store = cfg.store.open()?;
    let coordinator =
        UploadCoordinator::new(&store, cfg.import.owner.clone()).with_batch_size(cfg.import.batch_size);
    let report = import_messages(&source, &parser, &query, &coordinator).await?;
    print_report(&report);

    if import_state.advance(report.latest_source_timestamp) {
        state::write_state(&state_path, &import_state)?;
        println!("Cursor advanced to {}", import_state.sms_cursor);
    }

    Ok(())
}

async fn add(date: &str, description: &str, amount: f64, income: bool) -> Result<()> {
    let date = NaiveDate::parse_from_str(date.trim(), "%d/%m/%Y")
        .with_context(|| format!("invalid date '{date}' (expected DD/MM/YYYY)"))?;
    let kind = if income { EntryKind::Income } else { EntryKind::Expense };
    let txn = RawTransaction::manual(date, description, amount, kind)
        .ok_or_else(|| anyhow!("amount must be a positive number"))?;

    let cfg = config::load_config()?;
    let store = cfg.store.open()?;
    let coordinator = UploadCoordinator::new(&store, cfg.import.owner.clone());
    let existing = coordinator.existing().await?;
    let report = coordinator.upload(std::slice::from_ref(&txn), &existing).await?;

    if report.inserted == 0 {
        println!("Already recorded: {}", txn.description);
    } else {
        println!(
            "Added {} | {} | {:.2} | {}",
            format_dmy(txn.date),
            txn.description,
            txn.amount,
            txn.category
        );
    }
    Ok(())
}

async fn summary() -> Result<()> {
    let cfg = config::load_config()?;
    let store = cfg.store.open()?;
    let txns = store.list_existing(&cfg.import.owner).await?;
    let s = summarize(&txns);

    println!("Transactions: {}", txns.len());
    println!("Income:   {:>12.2}", s.total_income);
    println!("Expenses: {:>12.2}", s.total_expenses);
    println!("Savings:  {:>12.2} ({:.1}%)\n", s.net_savings, s.savings_rate);

    for c in &s.breakdown {
        println!(
            "- {:<14} {:>12.2}  ({} transactions)",
            c.category.label(),
            c.total,
            c.transaction_count
        );
    }
    Ok(())
}

fn print_transactions(txns: &[RawTransaction]) {
    for t in txns {
        let balance = t.balance.map(|b| format!(" | bal {b:.2}")).unwrap_or_default();
        println!(
            "{} | {:>10.2} | {:<14} | {}{}",
            format_dmy(t.date),
            t.amount,
            t.category.label(),
            t.description,
            balance
        );
    }
}

fn print_report(report: &UploadReport) {
    println!(
        "\nAttempted: {} | inserted: {} | skipped duplicates: {}",
        report.attempted, report.inserted, report.skipped
    );
}

fn write_csv(path: &Path, txns: &[RawTransaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for t in txns {
        wtr.serialize(t)?;
    }
    wtr.flush()?;
    Ok(())
}
