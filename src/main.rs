use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use credit_dispute::{
    analyze_report, case_exists, export_disputes_csv, get_case_disputes, import_report,
    list_cases, setup_database, DisputeSummary, ImportOutcome, JsonReportParser, ReportParser,
    SuggestedDispute,
};

#[derive(Parser, Debug)]
#[command(
    name = "credit-dispute",
    version,
    about = "Import credit reports and suggest disputes"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// SQLite case store
    #[arg(
        long,
        env = "CREDIT_DISPUTE_DB",
        default_value = "credit_disputes.db",
        global = true
    )]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a report and print suggested disputes (nothing is stored)
    Analyze {
        file: PathBuf,

        /// Print disputes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse, analyze and store a report, opening a case
    Import {
        file: PathBuf,

        /// Client reference attached to the case
        #[arg(long, default_value = "unassigned")]
        client: String,
    },

    /// List stored cases
    Cases,

    /// List disputes stored for a case
    Disputes {
        case_id: String,

        /// Export to a CSV file instead of printing
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Analyze { file, json } => run_analyze(&file, json),
        Command::Import { file, client } => run_import(&cli.db, &file, &client),
        Command::Cases => run_cases(&cli.db),
        Command::Disputes { case_id, csv } => run_disputes(&cli.db, &case_id, csv.as_deref()),
    }
}

fn open_store(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    setup_database(&conn)?;
    info!(path = %db_path.display(), "case store ready");
    Ok(conn)
}

fn print_disputes(disputes: &[SuggestedDispute]) {
    for (idx, dispute) in disputes.iter().enumerate() {
        println!(
            "{:>3}. [{}] {} - {}",
            idx + 1,
            dispute.priority,
            dispute.dispute_type,
            dispute.item.key()
        );
        println!("     {}", dispute.detail);
    }
}

fn run_analyze(file: &Path, json: bool) -> Result<()> {
    let report = JsonReportParser::new().parse_file(file)?;
    let disputes = analyze_report(&report);

    if json {
        println!("{}", serde_json::to_string_pretty(&disputes)?);
        return Ok(());
    }

    println!("📄 {} report, score {}", report.bureau, report.score);
    println!(
        "   {} accounts, {} inquiries, {} public records",
        report.accounts.len(),
        report.inquiries.len(),
        report.public_records.len()
    );
    println!(
        "   {} hard inquiries, total balance ${:.2}",
        report.hard_inquiry_count(),
        report.total_balance()
    );
    println!();
    print_disputes(&disputes);
    println!();
    println!("{}", DisputeSummary::from_disputes(&disputes).summary());

    Ok(())
}

fn run_import(db_path: &Path, file: &Path, client: &str) -> Result<()> {
    let parser = JsonReportParser::new();
    let report = parser.parse_file(file)?;

    let mut conn = open_store(db_path)?;

    match import_report(&mut conn, &report, client, parser.version())? {
        ImportOutcome::Created {
            case_id,
            report_id,
            summary,
            ..
        } => {
            println!("✓ Report stored: {}", report_id);
            println!("✓ Case opened:   {}", case_id);
            println!("✓ {}", summary.summary());
        }
        ImportOutcome::Duplicate { report_id } => {
            println!("✓ Report already imported as {} - nothing to do", report_id);
        }
    }

    Ok(())
}

fn run_cases(db_path: &Path) -> Result<()> {
    let conn = open_store(db_path)?;
    let cases = list_cases(&conn)?;

    if cases.is_empty() {
        println!("No cases yet. Run: credit-dispute import <FILE>");
        return Ok(());
    }

    for case in cases {
        println!(
            "{}  {:<10} {:<12} {:<6} {} disputes  (opened {})",
            case.case_id,
            case.bureau,
            case.client_ref,
            case.status,
            case.dispute_count,
            case.opened_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}

fn run_disputes(db_path: &Path, case_id: &str, csv: Option<&Path>) -> Result<()> {
    let conn = open_store(db_path)?;

    if !case_exists(&conn, case_id)? {
        bail!("Case not found: {}", case_id);
    }

    let stored = get_case_disputes(&conn, case_id)?;

    if let Some(path) = csv {
        let written = export_disputes_csv(path, stored.iter().map(|s| &s.dispute))?;
        println!("✓ Exported {} disputes to {}", written, path.display());
        return Ok(());
    }

    let disputes: Vec<SuggestedDispute> = stored.into_iter().map(|s| s.dispute).collect();
    print_disputes(&disputes);

    Ok(())
}
