//! # Outreach CLI (`outreach`)
//!
//! ## Usage
//!
//! ```bash
//! outreach --config ./config/outreach.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `outreach init` | Create the store directory and database |
//! | `outreach portfolio load` | Embed the portfolio CSV (once, or `--rebuild`) |
//! | `outreach portfolio query <SKILL>...` | Show the nearest portfolio entries |
//! | `outreach portfolio status` | Show collection model and entry count |
//! | `outreach fetch [URL]` | Print a job page's visible text |
//! | `outreach extract [URL]` | Print the extracted job details as JSON |
//! | `outreach generate [URL]` | Draft an email and save it as markdown |
//!
//! ## Examples
//!
//! ```bash
//! # Draft an email for a posting
//! outreach generate https://careers.example.com/jobs/123
//!
//! # Try the email stage with the built-in job, print only
//! outreach generate --test-data --no-save
//!
//! # Re-embed after editing the portfolio
//! outreach portfolio load --rebuild
//! ```

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use outreach::{config, index, logging, migrate, pipeline};

const DEFAULT_CONFIG: &str = "./config/outreach.toml";

/// Outreach: draft cold emails from job postings and a portfolio.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/outreach.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "outreach",
    about = "Draft cold outreach emails from job postings",
    version,
    long_about = "Outreach fetches a job posting, extracts the role and skills with a language \
    model, finds matching projects in a local portfolio index, and drafts a cold email that \
    cites them."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/outreach.toml`. When that default file does not
    /// exist, built-in defaults are used.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Log more (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the store.
    ///
    /// Creates the store directory, the SQLite database and its tables.
    /// Running it again is safe.
    Init,

    /// Manage the portfolio index.
    Portfolio {
        #[command(subcommand)]
        action: PortfolioAction,
    },

    /// Fetch a job page and print its visible text.
    Fetch {
        /// Job posting URL. Defaults to `fetch.default_url`.
        url: Option<String>,
    },

    /// Fetch a job page and print the extracted job details as JSON.
    Extract {
        /// Job posting URL. Defaults to `fetch.default_url`.
        url: Option<String>,
    },

    /// Run the full pipeline and draft an email.
    ///
    /// The email is printed to stdout and saved as
    /// `<output.dir>/<file_prefix>_<role>.md`.
    Generate {
        /// Job posting URL. Defaults to `fetch.default_url`.
        url: Option<String>,

        /// Use a built-in job instead of fetching and extracting one.
        #[arg(long)]
        test_data: bool,

        /// Directory for the saved email (overrides `output.dir`).
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print the email without saving it.
        #[arg(long, conflicts_with = "out_dir")]
        no_save: bool,
    },
}

#[derive(Subcommand)]
enum PortfolioAction {
    /// Embed the portfolio CSV into the index.
    ///
    /// Does nothing when the collection already has entries, unless
    /// `--rebuild` is given.
    Load {
        /// CSV file to load (overrides `portfolio.csv`).
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Replace existing entries.
        #[arg(long)]
        rebuild: bool,
    },

    /// Print the entries nearest to the given skills.
    Query {
        /// Skills to match, e.g. `CAD "3D Modeling"`.
        #[arg(required = true)]
        skills: Vec<String>,

        /// Maximum number of entries (defaults to `retrieval.n_results`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the collection's model and entry count.
    Status,
}

fn load_config(path: &Path) -> anyhow::Result<config::Config> {
    // Only the implicit default path may be absent
    if path == Path::new(DEFAULT_CONFIG) && !path.exists() {
        let cfg = config::Config::minimal();
        config::validate(&cfg)?;
        return Ok(cfg);
    }
    config::load_config(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg.store).await?;
            println!("Store initialized at {}", cfg.store.db_path().display());
        }
        Commands::Portfolio { action } => match action {
            PortfolioAction::Load { csv, rebuild } => {
                index::run_load(&cfg, csv, rebuild).await?;
            }
            PortfolioAction::Query { skills, limit } => {
                index::run_query(&cfg, &skills, limit).await?;
            }
            PortfolioAction::Status => {
                index::run_status(&cfg).await?;
            }
        },
        Commands::Fetch { url } => {
            pipeline::run_fetch(&cfg, url).await?;
        }
        Commands::Extract { url } => {
            pipeline::run_extract(&cfg, url).await?;
        }
        Commands::Generate {
            url,
            test_data,
            out_dir,
            no_save,
        } => {
            pipeline::run_generate(&cfg, url, test_data, out_dir, no_save).await?;
        }
    }

    Ok(())
}
