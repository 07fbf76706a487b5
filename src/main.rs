//! Gradebook CLI - seed a university database and answer questions about it

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use gradebook::config::{self, GradebookConfig};
use gradebook::menu::{self, LinePrompter, TerminalPrompter};
use gradebook::storage::SqliteStore;
use gradebook::ui::{self, Icons, Spinner};
use gradebook::{QueryCatalog, QueryGateway, SeedOutcome};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(version)]
#[command(about = "Seed a synthetic university database and answer ten fixed questions about it")]
#[command(long_about = r#"
Gradebook creates a small SQLite database of groups, lecturers, subjects,
students and grades filled with synthetic data, then answers questions such as:
  • Top 5 students by average grade
  • Average grades per group for a subject
  • Which subjects a lecturer teaches a given student

Example usage:
  gradebook                      # seed on first run, then open the menu
  gradebook ask 3 Mathematics
  gradebook ask 8 "Anna Nowak" Physics --format json
  gradebook seed --seed 42 --force
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive question menu (default)
    Menu,

    /// Create and seed the database
    Seed {
        /// Fixed RNG seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,

        /// Delete an existing database first
        #[arg(long)]
        force: bool,
    },

    /// Answer one question without the menu
    Ask {
        /// Question number (1-10)
        number: u8,

        /// Names the question needs, in order
        params: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the available questions and their parameters
    Questions,

    /// Show row counts per table
    Stats,

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stderr keeps the menu on stdout clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut settings = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    if let Some(database) = cli.database {
        settings.database = database;
    }

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let (store, outcome) = prepare(&settings)?;
            ui::seed_report(&settings.database, &outcome);
            println!();

            let catalog = QueryCatalog::load(settings.queries_dir.as_deref())?;
            let gateway = QueryGateway::new(&store, &catalog);
            let mut out = std::io::stdout();

            if console::Term::stdout().is_term() {
                menu::run_menu(&gateway, &mut TerminalPrompter::new(), &mut out)?;
            } else {
                let stdin = std::io::stdin();
                let mut prompter = LinePrompter::new(stdin.lock(), std::io::stdout());
                menu::run_menu(&gateway, &mut prompter, &mut out)?;
            }
        }

        Commands::Seed { seed, force } => {
            if settings.database.exists() {
                if !force {
                    ui::notice(&format!(
                        "{} already exists (use --force to reseed)",
                        settings.database.display()
                    ));
                    return Ok(());
                }
                tracing::info!("Removing {} before reseeding", settings.database.display());
                std::fs::remove_file(&settings.database)?;
            }
            if seed.is_some() {
                settings.seed.rng_seed = seed;
            }

            let (store, outcome) = prepare(&settings)?;
            ui::seed_report(&settings.database, &outcome);
            println!("{}", ui::stats_table(&store.stats()?));
        }

        Commands::Ask { number, params, format } => {
            let (store, _) = prepare(&settings)?;
            let catalog = QueryCatalog::load(settings.queries_dir.as_deref())?;
            let contract = catalog.get(number)?;
            if params.len() != contract.arity() {
                let expected: Vec<String> = contract.params.iter().map(|p| format!("<{}>", p)).collect();
                anyhow::bail!(
                    "question {} takes {} name(s): {}",
                    number,
                    contract.arity(),
                    expected.join(" ")
                );
            }

            let gateway = QueryGateway::new(&store, &catalog);
            let answer = menu::answer(&gateway, number, &params)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&answer)?),
                OutputFormat::Text => menu::write_answer(&mut std::io::stdout(), &answer)?,
            }
        }

        Commands::Questions => {
            let catalog = QueryCatalog::load(settings.queries_dir.as_deref())?;
            ui::banner(&format!("Questions (catalog {})", catalog.version()));
            for contract in catalog.iter() {
                ui::question_entry(contract);
            }
        }

        Commands::Stats => {
            if !settings.database.exists() {
                anyhow::bail!(
                    "no database at {} (run `gradebook seed` first)",
                    settings.database.display()
                );
            }
            let store = SqliteStore::open(&settings.database)?;
            let stats = store.stats()?;

            println!("{} Gradebook Statistics ({})", Icons::STATS, settings.database.display());
            println!("{}", ui::stats_table(&stats));
            let orphans = store.orphan_count()?;
            if orphans > 0 {
                ui::notice(&format!("{} rows reference missing parents", orphans));
            }
        }

        Commands::InitConfig { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &GradebookConfig::default(), force)?;
            ui::done(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}

/// Open the store, seeding it if the file is new
fn prepare(settings: &GradebookConfig) -> anyhow::Result<(SqliteStore, SeedOutcome)> {
    config::ensure_db_dir(&settings.database)?;
    let spinner = Spinner::new(&format!("{} Preparing database...", Icons::SEED));
    let result = gradebook::bootstrap(&settings.database, &settings.seed);
    spinner.finish_and_clear();
    Ok(result?)
}
