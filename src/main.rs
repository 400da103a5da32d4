use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sphindex::index::build::{build_index, check_index, default_output};
use sphindex::index::stats::show_stats;
use sphindex::index::IndexReader;
use sphindex::IndexError;
use sphindex::output::{self, REBUILD_HINT};
use sphindex::query::search;
use sphindex::utils::{init_logging, AppConfig, PROJECT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use termcolor::ColorChoice;

#[derive(Parser)]
#[command(name = "sphindex")]
#[command(about = "Build, check and query Sphinx searchindex.js files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log pipeline details to stderr (overridden by SPHINDEX_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate searchindex.js from a documentation source tree
    Build {
        /// Documentation source root
        source: PathBuf,

        /// Output file (default: <source>/_build/html/searchindex.js)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compare a fresh build with the existing file instead of writing
        #[arg(long)]
        check: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Validate an index and compare its generator versions
    Check {
        /// Path to searchindex.js
        index: PathBuf,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,

        /// Source root whose sphindex.json supplies the expected versions
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Search an index
    Search {
        /// Path to searchindex.js
        index: PathBuf,

        /// Query words; prefix a word with `-` to exclude it
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,

        /// Maximum results
        #[arg(short = 'n', long, default_value_t = sphindex::query::DEFAULT_LIMIT)]
        limit: usize,

        /// When to color output
        #[arg(long, value_enum, default_value_t = ColorWhen::Auto)]
        color: ColorWhen,
    },
    /// Show index statistics
    Stats {
        /// Path to searchindex.js
        index: PathBuf,
    },
    /// Print the effective configuration
    Config {
        /// Source root to look for sphindex.json in
        #[arg(long)]
        source: Option<PathBuf>,

        /// Write a default sphindex.json into the source root
        #[arg(long, requires = "source")]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorWhen {
    Auto,
    Always,
    Never,
}

impl From<ColorWhen> for ColorChoice {
    fn from(value: ColorWhen) -> Self {
        match value {
            ColorWhen::Auto => ColorChoice::Auto,
            ColorWhen::Always => ColorChoice::Always,
            ColorWhen::Never => ColorChoice::Never,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Run a command; `Ok(false)` means the command ran but the check it performs failed
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Build {
            source,
            output: out_path,
            check,
            quiet,
        } => {
            let config = AppConfig::load(Some(source.as_path()))?;
            let out_path = out_path.unwrap_or_else(|| default_output(&source));

            if check {
                let outcome = check_index(&source, &out_path, &config, quiet)?;
                output::print_check_outcome(&mut output::stdout(ColorChoice::Auto), outcome)?;
                return Ok(outcome.is_up_to_date());
            }

            let summary = build_index(&source, &out_path, &config, quiet)?;
            if !quiet {
                println!(
                    "{} pages, {} terms, {} title terms",
                    summary.pages,
                    summary.index.terms.len(),
                    summary.index.titleterms.len()
                );
            }
            Ok(true)
        }
        Commands::Check {
            index,
            strict,
            source,
        } => check(&index, strict, source.as_deref()),
        Commands::Search {
            index,
            query,
            limit,
            color,
        } => {
            let Some(reader) = open(&index)? else {
                return Ok(false);
            };
            let config = AppConfig::load(None)?;
            let hits = search(&reader, &query.join(" "), config.scoring, limit);
            output::print_hits(&mut output::stdout(color.into()), &hits)?;
            Ok(true)
        }
        Commands::Stats { index } => {
            let Some(reader) = open(&index)? else {
                return Ok(false);
            };
            show_stats(&reader)?;
            Ok(true)
        }
        Commands::Config { source, init } => {
            if init {
                let Some(root) = source.as_deref() else {
                    bail!("--init needs --source");
                };
                let path = root.join(PROJECT_CONFIG_FILE);
                if path.exists() {
                    bail!("{} already exists", path.display());
                }
                AppConfig::default().save_to(&path)?;
                println!("Wrote {}", path.display());
                return Ok(true);
            }

            let config = AppConfig::load(source.as_deref())?;
            let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{}", json);
            Ok(true)
        }
    }
}

/// Load and validate an index; `None` after printing the rebuild hint when it is corrupt
fn open(index: &Path) -> Result<Option<IndexReader>> {
    match IndexReader::open_validated(index) {
        Ok(reader) => Ok(Some(reader)),
        Err(e) if e.requires_rebuild() => {
            report_corrupt(index, &e);
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", index.display())),
    }
}

fn report_corrupt(index: &Path, error: &IndexError) {
    println!("{}: {}", index.display(), error);
    println!("index is corrupt: {}", REBUILD_HINT);
}

fn check(index: &Path, strict: bool, source: Option<&Path>) -> Result<bool> {
    let mut out = output::stdout(ColorChoice::Auto);

    let reader = match IndexReader::open(index) {
        Ok(reader) => reader,
        Err(e) if e.requires_rebuild() => {
            report_corrupt(index, &e);
            return Ok(false);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to load {}", index.display())),
    };

    let report = reader.validate();
    output::print_report(&mut out, &report)?;

    let config = AppConfig::load(source)?;
    let freshness = reader.freshness(&config.envversion);
    output::print_freshness(&mut out, &freshness)?;

    let failed = report.is_corrupt()
        || !freshness.is_current()
        || (strict && report.warning_count() > 0);
    Ok(!failed)
}
