use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use miette::{miette, Context, IntoDiagnostic, Result};

use faultline_core::{FaultlineConfig, Repository};
use faultline_extract::extract_repository;
use faultline_risk::analyze;

#[derive(Parser)]
#[command(
    name = "faultline",
    version,
    about = "Mine git history into structural change-sets and bug-risk scores",
    long_about = "Faultline mines a repository's history, classifies every commit's changes\n\
                   at file/class/method granularity, and scores current files by how often\n\
                   and how recently bug-fixing commits touched them.\n\n\
                   Examples:\n  \
                     faultline extract --path .        Dump the structural change history\n  \
                     faultline risk --path . --top 10  Rank the 10 most bug-prone files\n  \
                     faultline init                    Write a default faultline.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: faultline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default faultline.toml in the current directory
    Init,
    /// Extract the structural change history
    #[command(long_about = "Extract the structural change history.\n\n\
        Walks the repository newest-first, classifies each commit's changes at\n\
        file/class/method granularity across a worker pool, and prints the\n\
        chronologically ascending result.\n\n\
        Examples:\n  faultline extract --path .\n  faultline extract --max-commits 500 --format json")]
    Extract {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Cap the number of extracted commits
        #[arg(long)]
        max_commits: Option<usize>,

        /// Extract on a single worker instead of the pool
        #[arg(long)]
        sequential: bool,

        /// Track files only; skip class/method-level changes
        #[arg(long)]
        file_granularity: bool,
    },
    /// Rank current files by bug-fix-weighted risk
    #[command(long_about = "Rank current files by bug-fix-weighted risk.\n\n\
        Every commit whose message mentions a bug or a fix adds a recency weight\n\
        to the files it touched; recent fixes dominate, early history fades out.\n\n\
        Examples:\n  faultline risk --path .\n  faultline risk --top 10 --format json")]
    Risk {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Cap the number of extracted commits
        #[arg(long)]
        max_commits: Option<usize>,

        /// Extract on a single worker instead of the pool
        #[arg(long)]
        sequential: bool,

        /// Number of files to list (text output)
        #[arg(long, default_value = "20")]
        top: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable tables and summaries
    Text,
    /// Machine-readable JSON with camelCase keys
    Json,
}

fn main() -> Result<()> {
    human_panic::setup_panic!();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Init => run_init(),
        Command::Extract {
            path,
            max_commits,
            sequential,
            file_granularity,
        } => {
            let config = apply_overrides(config, max_commits, sequential, file_granularity);
            run_extract(&path, &config, cli.format)
        }
        Command::Risk {
            path,
            max_commits,
            sequential,
            top,
        } => {
            let config = apply_overrides(config, max_commits, sequential, false);
            run_risk(&path, &config, cli.format, top)
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<FaultlineConfig> {
    if let Some(path) = explicit {
        return FaultlineConfig::from_file(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to load {}", path.display()));
    }
    let default = Path::new("faultline.toml");
    if default.exists() {
        FaultlineConfig::from_file(default)
            .into_diagnostic()
            .wrap_err("failed to load faultline.toml")
    } else {
        Ok(FaultlineConfig::default())
    }
}

fn apply_overrides(
    mut config: FaultlineConfig,
    max_commits: Option<usize>,
    sequential: bool,
    file_granularity: bool,
) -> FaultlineConfig {
    if max_commits.is_some() {
        config.extraction.max_commits = max_commits;
    }
    if sequential {
        config.extraction.parallel = false;
    }
    if file_granularity {
        config.extraction.method_granularity = false;
    }
    config
}

fn run_init() -> Result<()> {
    let path = Path::new("faultline.toml");
    if path.exists() {
        return Err(miette!("faultline.toml already exists"));
    }
    std::fs::write(path, FaultlineConfig::default_template())
        .into_diagnostic()
        .wrap_err("failed to write faultline.toml")?;
    println!("Wrote faultline.toml");
    Ok(())
}

fn extract_with_progress(path: &Path, config: &FaultlineConfig) -> Result<Repository> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").expect("spinner template"));
    spinner.set_message("extracting history...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let repository = extract_repository(path, config)
        .into_diagnostic()
        .wrap_err_with(|| format!("extraction failed for {}", path.display()))?;

    spinner.finish_and_clear();
    Ok(repository)
}

fn run_extract(path: &Path, config: &FaultlineConfig, format: OutputFormat) -> Result<()> {
    let repository = extract_with_progress(path, config)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&repository).into_diagnostic()?;
            println!("{json}");
        }
        OutputFormat::Text => {
            println!(
                "{} commits over {}, {} current files",
                repository.commits.len(),
                date_span(repository.created_at, repository.evaluated_at),
                repository.current_files.len(),
            );
            for commit in &repository.commits {
                let subject = commit.message.lines().next().unwrap_or("");
                println!(
                    "{}  {:>3} changes  {}",
                    &commit.id[..commit.id.len().min(8)],
                    commit.changes.len(),
                    subject,
                );
            }
        }
    }
    Ok(())
}

fn run_risk(path: &Path, config: &FaultlineConfig, format: OutputFormat, top: usize) -> Result<()> {
    let repository = extract_with_progress(path, config)?;
    let scores = analyze(&repository);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&scores).into_diagnostic()?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let mut ranked: Vec<(&String, &f64)> = scores.iter().collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));

            println!(
                "Bug-fix-weighted risk, evaluated at {}",
                date(repository.evaluated_at),
            );
            for (path, score) in ranked.into_iter().take(top) {
                println!("{score:>8.4}  {path}");
            }
        }
    }
    Ok(())
}

fn date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn date_span(from: i64, to: i64) -> String {
    format!("{}..{}", date(from), date(to))
}
