//! CLI definition and dispatch.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::table_writer::{write_matrix, write_swings};
use crate::domain::config::AnalysisConfig;
use crate::domain::error::{BarmatrixError, RegistryError};
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::parse_field;
use crate::domain::registry::registry;
use crate::domain::swing::{self, SwingBase, SwingPoint, DEFAULT_SWING_SIZE};
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "barmatrix", about = "Technical indicators and swing points over OHLCV bars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators over a CSV file and print the resulting table
    Compute {
        #[arg(short, long)]
        input: PathBuf,
        /// Indicator expression, e.g. `SMA(20)` or `MACD(12,26,9)`; repeatable
        #[arg(short = 'x', long = "indicator", required = true)]
        indicators: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the analysis described by a config file
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Detect swing points in a CSV file
    Swings {
        #[arg(short, long)]
        input: PathBuf,
        /// Half-window in bars on each side of an extreme
        #[arg(short, long, default_value_t = DEFAULT_SWING_SIZE)]
        size: usize,
        /// Detect on a single field instead of high/low
        #[arg(short, long)]
        field: Option<String>,
    },
    /// List available indicators
    List,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Compute {
            input,
            indicators,
            output,
        } => run_compute(&input, &indicators, output.as_deref()),
        Command::Run { config } => run_config(&config),
        Command::Swings { input, size, field } => run_swings(&input, size, field.as_deref()),
        Command::List => run_list(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, BarmatrixError> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "writing output");
            Ok(Box::new(BufWriter::new(File::create(p)?)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn load_matrix(input: &Path) -> Result<Matrix, BarmatrixError> {
    let bars = CsvAdapter::read_file(input)?;
    if bars.is_empty() {
        return Err(BarmatrixError::NoData {
            symbol: input.display().to_string(),
        });
    }
    info!(path = %input.display(), bars = bars.len(), "loaded bars");
    Ok(Matrix::from_bars(&bars))
}

/// Applies each expression in order. Parse failures are echoed with a caret
/// under the offending position before the error is returned.
pub fn apply_indicators(matrix: &mut Matrix, exprs: &[String]) -> Result<(), BarmatrixError> {
    for expr in exprs {
        let column = registry().evaluate(matrix, expr).inspect_err(|e| {
            if let RegistryError::Parse(p) = e {
                eprintln!("{}", p.display_with_context(expr));
            }
        })?;
        debug!(expr = %expr, column = column.index(), header = matrix.header(column), "indicator applied");
    }
    info!(count = exprs.len(), columns = matrix.cols(), "indicators computed");
    Ok(())
}

/// Marks each swing bar's row comment with its classification(s).
pub fn annotate_swings(matrix: &mut Matrix, points: &[SwingPoint]) {
    for point in points {
        if let Some(row) = matrix.row_mut(point.index) {
            let comment = if row.comment().is_empty() {
                point.kind.to_string()
            } else {
                format!("{}/{}", row.comment(), point.kind)
            };
            row.set_comment(comment);
        }
    }
}

fn summarize_swings(points: &[SwingPoint]) {
    let highs = points.iter().filter(|p| p.base_type == SwingBase::High).count();
    let broken = points.iter().filter(|p| p.broken).count();
    info!(
        highs,
        lows = points.len() - highs,
        broken,
        intact = points.len() - broken,
        "swing summary"
    );
}

fn run_compute(
    input: &Path,
    indicators: &[String],
    output: Option<&Path>,
) -> Result<(), BarmatrixError> {
    let mut matrix = load_matrix(input)?;
    apply_indicators(&mut matrix, indicators)?;
    write_matrix(&matrix, open_output(output)?)
}

fn run_config(config_path: &Path) -> Result<(), BarmatrixError> {
    info!(path = %config_path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let config = AnalysisConfig::from_port(&adapter)?;

    let data = CsvAdapter::new(config.data_dir.clone());
    let bars = data.fetch_bars(&config.symbol)?;
    info!(symbol = %config.symbol, bars = bars.len(), "loaded bars");

    let mut matrix = Matrix::from_bars(&bars);
    apply_indicators(&mut matrix, &config.indicators)?;

    let points = swing::fractals(&matrix, config.swing_size);
    summarize_swings(&points);
    annotate_swings(&mut matrix, &points);

    write_matrix(&matrix, open_output(config.output.as_deref())?)
}

fn run_swings(input: &Path, size: usize, field: Option<&str>) -> Result<(), BarmatrixError> {
    let matrix = load_matrix(input)?;
    let points = match field {
        Some(name) => {
            let field = parse_field(name).ok_or_else(|| RegistryError::InvalidParameter {
                name: "swings".to_string(),
                value: name.to_string(),
                reason: "expected a price field or column index".to_string(),
            })?;
            swing::find_swing_points_by_field(&matrix, field, size)
        }
        None => swing::fractals(&matrix, size),
    };
    summarize_swings(&points);
    write_swings(&points, io::stdout().lock())
}

fn run_list() -> Result<(), BarmatrixError> {
    let mut out = io::stdout().lock();
    for spec in registry().specs() {
        writeln!(out, "{:<10} {:<12} {}", spec.name, spec.usage(), spec.summary)?;
    }
    Ok(())
}
