//! hdp - structural diff and patch for HTML fragments.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use clap::{Parser, Subcommand};
use html_diffpatch::{html, reverse, Delta, DiffOptions, DiffPatch};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Structural diff, patch and reverse for HTML fragments
#[derive(Parser)]
#[command(name = "hdp")]
#[command(version)]
#[command(about = "Structural diff, patch and reverse for HTML fragments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the delta between two fragments
    #[command(visible_alias = "d")]
    Diff {
        /// Left (original) fragment
        left: String,
        /// Right (changed) fragment
        right: String,
        /// Output file (default: stdout)
        output: Option<String>,

        /// Compare child lists by position instead of detecting moves
        #[arg(long)]
        no_moves: bool,

        /// Store the moved item in move descriptors
        #[arg(long)]
        include_moved_values: bool,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Apply a delta to a fragment
    #[command(visible_alias = "p")]
    Patch {
        /// Fragment to patch
        input: String,
        /// Delta file (JSON)
        delta: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Undo a delta on the fragment it produced
    #[command(visible_alias = "u")]
    Unpatch {
        /// Patched fragment
        input: String,
        /// Delta file (JSON)
        delta: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Invert a delta
    #[command(visible_alias = "r")]
    Reverse {
        /// Delta file (JSON)
        delta: String,
        /// Output file (default: stdout)
        output: Option<String>,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diff {
            left,
            right,
            output,
            no_moves,
            include_moved_values,
            pretty,
        } => {
            let options = DiffOptions::default()
                .with_detect_move(!no_moves)
                .with_include_value_on_move(include_moved_values);
            run_diff(&left, &right, output.as_deref(), options, pretty)
        }
        Commands::Patch {
            input,
            delta,
            output,
        } => run_patch(&input, &delta, output.as_deref(), false),
        Commands::Unpatch {
            input,
            delta,
            output,
        } => run_patch(&input, &delta, output.as_deref(), true),
        Commands::Reverse {
            delta,
            output,
            pretty,
        } => run_reverse(&delta, output.as_deref(), pretty),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Opens the output file, or stdout when none is given.
fn open_output(output_path: Option<&str>) -> io::Result<Box<dyn Write>> {
    Ok(match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    })
}

fn read_delta(path: &str) -> Result<Delta, Box<dyn std::error::Error>> {
    info!("Reading delta: {}", path);
    Ok(Delta::from_json_str(&fs::read_to_string(path)?)?)
}

fn encode_delta(delta: &Delta, pretty: bool) -> html_diffpatch::Result<String> {
    if pretty {
        delta.to_json_string_pretty()
    } else {
        delta.to_json_string()
    }
}

/// Diffs two fragments and writes the delta.
fn run_diff(
    left_path: &str,
    right_path: &str,
    output_path: Option<&str>,
    options: DiffOptions,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Parsing left: {}", left_path);
    let left = html::parse_file(left_path)?;

    info!("Parsing right: {}", right_path);
    let right = html::parse_file(right_path)?;

    let Some(delta) = DiffPatch::create(options).diff(&left, &right) else {
        info!("Fragments are equal.");
        return Ok(());
    };

    let mut output = open_output(output_path)?;
    writeln!(output, "{}", encode_delta(&delta, pretty)?)?;
    output.flush()?;

    info!("Diff complete: {} changes.", delta.len());
    Ok(())
}

/// Applies a delta, or undoes it, and writes the resulting markup.
fn run_patch(
    input_path: &str,
    delta_path: &str,
    output_path: Option<&str>,
    undo: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Parsing input: {}", input_path);
    let tree = html::parse_file(input_path)?;
    let delta = read_delta(delta_path)?;

    let dp = DiffPatch::new();
    let patched = if undo {
        dp.unpatch(&tree, &delta)?
    } else {
        dp.patch(&tree, &delta)?
    };

    let mut output = open_output(output_path)?;
    writeln!(output, "{}", html::print_to_string(&patched))?;
    output.flush()?;

    info!("Applied {} changes.", delta.len());
    Ok(())
}

/// Reverses a delta and writes it.
fn run_reverse(
    delta_path: &str,
    output_path: Option<&str>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let delta = read_delta(delta_path)?;
    let reversed = reverse(&delta);

    let mut output = open_output(output_path)?;
    writeln!(output, "{}", encode_delta(&reversed, pretty)?)?;
    output.flush()?;
    Ok(())
}
