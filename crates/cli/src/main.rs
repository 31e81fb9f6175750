// patterncmp - compare a predicted antenna gain pattern against a measured one

mod exit_codes;
mod logging;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use patterncmp_cli::{report, tui};
use patterncmp_compare::{
    read_samples, run, CompareConfig, CompareError, CompareInput, ComparisonResult, Source,
};

use exit_codes::{
    compare_exit_code, EXIT_ERROR, EXIT_FILE_NOT_FOUND, EXIT_INVALID_CONFIG, EXIT_SUCCESS,
    EXIT_VIEWER,
};

#[derive(Parser)]
#[command(name = "patterncmp")]
#[command(about = "Compare a predicted antenna gain pattern against measured data")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Predicted (simulated / interpolated) pattern CSV
    predicted: PathBuf,

    /// Actual (measured) pattern CSV
    actual: PathBuf,

    /// TOML config with column names and report options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of worst mismatches to list (overrides config)
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Warn when the join drops rows present in only one file
    #[arg(long)]
    warn_dropped: bool,

    /// Print the full result as JSON on stdout (report goes to stderr)
    #[arg(long)]
    json: bool,

    /// Also write the JSON result to this file
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip the viewer
    #[arg(long)]
    no_view: bool,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  patterncmp-compare ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cmd_compare(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// compare
// ============================================================================

fn cmd_compare(cli: Cli) -> Result<(), CliError> {
    check_inputs_exist(&cli.predicted, &cli.actual)?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CompareConfig::default(),
    };
    if let Some(top) = cli.top {
        config.report.top = top;
    }
    if cli.warn_dropped {
        config.report.warn_dropped = true;
    }
    config.validate()?;

    // With --json, stdout carries only the JSON document
    let mut human: Box<dyn Write> = if cli.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let io_err = |e: io::Error| CliError::new(EXIT_ERROR, format!("write failed: {e}"));

    write!(human, "{}", report::loading_lines(&cli.predicted, &cli.actual)).map_err(io_err)?;
    let input = CompareInput {
        predicted: read_samples(Source::Predicted, &cli.predicted, &config.columns)?,
        actual: read_samples(Source::Actual, &cli.actual, &config.columns)?,
    };

    let result = run(&config, &input)?;
    log::info!(
        "compared {} points, mse {:.6}",
        result.statistics.aligned,
        result.statistics.mse
    );

    write!(
        human,
        "{}",
        report::full_report(&result.statistics, &result.coverage, &result.top_mismatches)
    )
    .map_err(io_err)?;
    human.flush().map_err(io_err)?;

    if cli.json || cli.output.is_some() {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot serialize result: {e}")))?;
        if cli.json {
            println!("{json}");
        }
        if let Some(path) = &cli.output {
            write_json(path, &json)?;
        }
    }

    if cli.no_view {
        return Ok(());
    }

    writeln!(human, "\nPreparing visualization...").map_err(io_err)?;
    human.flush().map_err(io_err)?;
    show_viewer(&result)
}

fn check_inputs_exist(predicted: &Path, actual: &Path) -> Result<(), CliError> {
    let missing: Vec<String> = [predicted, actual]
        .iter()
        .filter(|p| !p.exists())
        .map(|p| p.display().to_string())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(CliError::new(
        EXIT_FILE_NOT_FOUND,
        format!("input file not found: {}", missing.join(", ")),
    )
    .with_hint(format!(
        "expected predicted data at {} and actual data at {}",
        predicted.display(),
        actual.display()
    )))
}

fn load_config(path: &Path) -> Result<CompareConfig, CliError> {
    let text = fs::read_to_string(path).map_err(|e| {
        CliError::new(
            EXIT_INVALID_CONFIG,
            format!("cannot read config {}: {e}", path.display()),
        )
    })?;
    log::debug!("config loaded from {}", path.display());
    Ok(CompareConfig::from_toml(&text)?)
}

fn write_json(path: &Path, json: &str) -> Result<(), CliError> {
    fs::write(path, format!("{json}\n")).map_err(|e| {
        CliError::new(EXIT_ERROR, format!("cannot write {}: {e}", path.display()))
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn show_viewer(result: &ComparisonResult) -> Result<(), CliError> {
    tui::run(result).map_err(|e| {
        CliError::new(EXIT_VIEWER, format!("viewer failed: {e}"))
            .with_hint("use --no-view when no interactive terminal is available")
    })
}

// ============================================================================
// errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<CompareError> for CliError {
    fn from(err: CompareError) -> Self {
        let kind = err.kind();
        let code = compare_exit_code(kind);
        log::debug!("{} error, exit {code}", kind.as_str());
        let hint = match &err {
            CompareError::MissingColumn { .. } => {
                Some("map the column names with [columns] in a --config file".to_string())
            }
            CompareError::NoOverlap { .. } => {
                Some("both files must sample the same (Phi, Theta) points".to_string())
            }
            CompareError::DuplicateKey { .. } => {
                Some("each (Phi, Theta) pair may appear once per file".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
