//! Release and inspection helpers for R package development.
//!
//! Three independent subcommands:
//! - `db-summary`: table list and row previews of a database, as text
//! - `release`: bump `DESCRIPTION` version/date and prepend a `NEWS.md` entry
//! - `dump-source`: directory tree and `.R` sources of a package, as text

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use rpkgtools_core::{
    AggregateConfig, FixedChooser, PromptChooser, ReleaseOutcome, ReleaseRequest, SummaryConfig,
    TreeStyle, VersionBump, VersionChooser, WalkTreeRenderer, aggregate_package,
    error::redact_database_url, init_logging, open_source, sources::compiled_engines,
    summarize_database, update_release,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "rpkgtools")]
#[command(about = "Release and inspection helpers for R package development")]
#[command(version)]
#[command(long_about = "
rpkgtools - release and inspection helpers for R package development

COMMANDS:
- db-summary: write every table name plus a 5-row preview of each table
- release: bump Version/Date in DESCRIPTION and prepend a NEWS.md entry
- dump-source: write the package tree followed by all R/ and tests/testthat/ sources

SUPPORTED DATABASES:
- PostgreSQL (postgres://)
- SQLite (sqlite:// or .db/.sqlite files)
- MySQL (mysql://) [if compiled with --features mysql]

EXAMPLES:
  rpkgtools db-summary --database-url sqlite://data/cars.db
  rpkgtools release --bump patch \"Fixed \\`read_data()\\` on empty input\"
  rpkgtools dump-source --root . -o inst/extdata/package_source.txt
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize database tables into a text report
    DbSummary(DbSummaryArgs),
    /// Bump the package version and prepend a changelog entry
    Release(ReleaseArgs),
    /// Dump the package tree and R sources into a text file
    DumpSource(DumpSourceArgs),
    /// List compiled-in database engines
    List,
}

#[derive(Args)]
pub struct DbSummaryArgs {
    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: Option<String>,

    /// Output file path
    #[arg(short, long, default_value = "inst/extdata/db_summary.txt")]
    pub output: PathBuf,

    /// Rows previewed per table
    #[arg(long, default_value_t = rpkgtools_core::config::DEFAULT_PREVIEW_ROWS)]
    pub rows: usize,
}

#[derive(Args)]
pub struct ReleaseArgs {
    /// Project root containing DESCRIPTION
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Use this exact version instead of asking
    #[arg(long, conflicts_with = "bump")]
    pub version: Option<String>,

    /// Apply this bump (major, minor, patch, dev) instead of asking
    #[arg(long)]
    pub bump: Option<VersionBump>,

    /// Change descriptions, one changelog bullet each
    #[arg(required = true, num_args = 1..)]
    pub fixtures: Vec<String>,
}

#[derive(Args)]
pub struct DumpSourceArgs {
    /// Package root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = "inst/extdata/package_source.txt")]
    pub output: PathBuf,

    /// Draw the tree with box drawing characters
    #[arg(long)]
    pub unicode: bool,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    match cli.command {
        Command::DbSummary(args) => db_summary(args).await,
        Command::Release(args) => release(args).await,
        Command::DumpSource(args) => dump_source(args).await,
        Command::List => {
            list_supported_databases();
            Ok(())
        }
    }
}

/// Writes the database content summary
async fn db_summary(args: DbSummaryArgs) -> anyhow::Result<()> {
    let Some(database_url) = args.database_url else {
        bail!("A database URL is required (--database-url or DATABASE_URL)");
    };
    let config = SummaryConfig::new().with_preview_rows(args.rows);
    config.validate()?;

    info!("Connecting to {}", redact_database_url(&database_url));
    let source = open_source(&database_url).await.map_err(|e| {
        error!("Failed to open data source: {}", e);
        e
    })?;

    let result = summarize_database(source.as_ref(), &args.output, &config).await;
    source.close().await;
    let report = result.context("Database summary failed")?;

    let failed = report.failed_tables();
    println!(
        "Summarized {} tables into {}",
        report.table_count(),
        report.output.display()
    );
    if !failed.is_empty() {
        println!("Tables with errors: {}", failed.join(", "));
    }
    Ok(())
}

/// Bumps the version and prepends the changelog entry
async fn release(args: ReleaseArgs) -> anyhow::Result<()> {
    let request = ReleaseRequest {
        root: args.root,
        fixtures: args.fixtures,
        date: chrono::Local::now().date_naive(),
    };

    let mut chooser: Box<dyn VersionChooser> = match (args.version, args.bump) {
        (Some(version), _) => Box::new(FixedChooser::version(&version)?),
        (None, Some(bump)) => Box::new(FixedChooser::Bump(bump)),
        (None, None) => Box::new(PromptChooser::new(
            std::io::stdin().lock(),
            std::io::stdout(),
        )),
    };

    match update_release(&request, chooser.as_mut())
        .await
        .context("Release update failed")?
    {
        ReleaseOutcome::Declined => {
            println!("No version chosen. Try again later.");
        }
        ReleaseOutcome::Released {
            package,
            version,
            changelog,
            commit_message,
        } => {
            println!("Released {} {} ({})", package, version, changelog.display());
            println!("Suggested commit message: {}", commit_message);
        }
    }
    Ok(())
}

/// Dumps the package tree and sources
async fn dump_source(args: DumpSourceArgs) -> anyhow::Result<()> {
    let style = if args.unicode {
        TreeStyle::Unicode
    } else {
        TreeStyle::Ascii
    };
    let config = AggregateConfig::new();
    let renderer = WalkTreeRenderer::new(style);

    let report = aggregate_package(&args.root, &args.output, &config, &renderer)
        .await
        .context("Source dump failed")?;

    println!(
        "Wrote {} source files from {} into {}",
        report.files.len(),
        report.root.display(),
        report.output.display()
    );
    Ok(())
}

/// Lists database engines compiled into this build
fn list_supported_databases() {
    println!("Compiled-in database engines:");
    for engine in compiled_engines() {
        println!("  - {}", engine);
    }
}
