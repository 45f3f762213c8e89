//! hexglitch - Glitch image files at the raw byte level
//!
//! This tool corrupts the body of image files with hex find/replace or
//! randomized byte operations, leaving a protected header region intact so
//! the result still opens as an image.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use hexglitch_core::file::{self, DEFAULT_MAX_FILE_SIZE};
use hexglitch_core::{
    FilePolicy, GlitchConfig, GlitchMode, GlitchSession, Operation, DEFAULT_HEADER_LEN,
    DEFAULT_INTENSITY,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Glitch image files at the raw byte level
#[derive(Parser, Debug)]
#[command(name = "hexglitch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Output file, or directory for generated names (default: next to each input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of leading bytes protected from glitching
    #[arg(long = "header", env = "HEXGLITCH_HEADER", default_value_t = DEFAULT_HEADER_LEN)]
    header_len: usize,

    /// Largest input file accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_size: u64,

    /// Seed for the random generator, for reproducible glitches
    #[arg(long)]
    seed: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dry run - don't write files, just show what would be written
    #[arg(long)]
    dry_run: bool,

    /// Overwrite existing files
    #[arg(long)]
    force: bool,

    /// Print a hex preview of the start of each glitched file
    #[arg(long)]
    preview: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Path to a single image file to glitch
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of images to glitch
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace every occurrence of a hex byte pattern in the body
    Replace {
        /// Hex bytes to search for (e.g. FF or "FF D8")
        #[arg(long)]
        find: String,

        /// Hex bytes to write in place of each match (e.g. 00)
        #[arg(long)]
        replace: String,
    },
    /// Corrupt a random sample of body bytes
    Corrupt {
        /// Change roughly 1 in N body bytes
        #[arg(short, long, default_value_t = DEFAULT_INTENSITY)]
        intensity: usize,

        /// Byte operation: random, increment, decrement, zero, bitwise-xor
        #[arg(short, long, default_value = "random")]
        mode: GlitchMode,
    },
    /// Print a hex preview of the input without modifying it
    Inspect,
}

impl Command {
    /// Validate the command into an engine operation (`None` for read-only commands)
    fn operation(&self) -> hexglitch_core::Result<Option<Operation>> {
        match self {
            Command::Replace { find, replace } => {
                Operation::find_replace_hex(find, replace).map(Some)
            }
            Command::Corrupt { intensity, mode } => Operation::corrupt(*intensity, *mode).map(Some),
            Command::Inspect => Ok(None),
        }
    }

    /// Session configuration for this command
    fn config(&self, header_len: usize) -> GlitchConfig {
        let config = GlitchConfig::new().header_len(header_len);
        match self {
            Command::Corrupt { intensity, .. } => config.intensity(*intensity),
            _ => config,
        }
    }
}

/// Counters reported at the end of a run
#[derive(Default, Debug)]
struct RunStats {
    processed: usize,
    written: usize,
    failed: usize,
}

impl RunStats {
    fn print_summary(&self) {
        info!(
            "Summary: {} processed, {} written, {} failed",
            self.processed, self.written, self.failed
        );
    }
}

/// Everything a run needs besides the parsed flags
struct RunContext {
    policy: FilePolicy,
    config: GlitchConfig,
    operation: Option<Operation>,
    rng: StdRng,
    stats: RunStats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    // Validate user input before touching any file
    let operation = cli.command.operation()?;

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut ctx = RunContext {
        policy: FilePolicy::new().max_file_size(cli.max_size),
        config: cli.command.config(cli.header_len),
        operation,
        rng,
        stats: RunStats::default(),
    };

    // Dispatch based on input mode
    if let Some(ref file) = cli.input.file {
        process_single_file(cli, &mut ctx, file)
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(cli, &mut ctx, directory)
    } else {
        bail!("Either --file or --directory must be specified")
    }
}

/// Process a single image file
fn process_single_file(cli: &Cli, ctx: &mut RunContext, file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    glitch_file(cli, ctx, file, false)?;

    if ctx.operation.is_some() && !cli.dry_run {
        ctx.stats.print_summary();
    }

    Ok(())
}

/// Process every supported image under a directory
fn process_directory(cli: &Cli, ctx: &mut RunContext, directory: &Path) -> Result<()> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    // Collect first so files written during the run are not picked up
    let inputs: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            if is_hidden(path) {
                return false;
            }
            if !ctx.policy.is_supported_image(path) {
                trace!("Skipping unsupported file: {}", path.display());
                return false;
            }
            if is_glitched_output(path) {
                debug!("Skipping previous output: {}", path.display());
                return false;
            }
            true
        })
        .collect();

    debug!("Found {} candidate image(s)", inputs.len());

    for path in &inputs {
        if let Err(e) = glitch_file(cli, ctx, path, true) {
            // Log error but continue with other files
            warn!("Error processing {}: {:#}", path.display(), e);
            ctx.stats.failed += 1;
        }
    }

    if !cli.dry_run {
        ctx.stats.print_summary();
    }

    Ok(())
}

/// Load, glitch and save one file
fn glitch_file(cli: &Cli, ctx: &mut RunContext, path: &Path, into_dir: bool) -> Result<()> {
    let data = file::load_image(path, &ctx.policy)
        .with_context(|| format!("Failed to load image: {}", path.display()))?;

    trace!("Read {} bytes from {}", data.len(), path.display());
    ctx.stats.processed += 1;

    let mut session = GlitchSession::with_config(data, ctx.config.clone());

    let Some(operation) = ctx.operation.as_ref() else {
        println!("{} ({} bytes)", path.display(), session.original().len());
        println!("{}", session.preview());
        return Ok(());
    };

    let affected = match operation {
        Operation::Corrupt { mode, .. } => {
            debug!(
                "Corrupting 1/{} bytes of {}",
                session.config().intensity,
                path.display()
            );
            session.corrupt(*mode, &mut ctx.rng)
        }
        op => session.apply(op, &mut ctx.rng),
    }
    .with_context(|| format!("Failed to glitch: {}", path.display()))?;

    match operation {
        Operation::FindReplace { .. } => {
            println!("{}: {} replacement(s)", path.display(), affected)
        }
        Operation::Corrupt { mode, .. } => {
            println!("{}: {} byte(s) glitched ({})", path.display(), affected, mode)
        }
    }

    if cli.preview {
        println!("{}", session.preview());
    }

    let output_path = resolve_output(path, cli.output.as_deref(), session.glitched(), into_dir);

    if cli.dry_run {
        println!("Would write: {}", output_path.display());
        return Ok(());
    }

    let glitched = session.into_glitched();
    file::save_image(&output_path, &glitched, &ctx.policy, cli.force)
        .with_context(|| format!("Failed to save: {}", output_path.display()))?;
    println!("Wrote {}", output_path.display());
    ctx.stats.written += 1;

    Ok(())
}

/// Decide where the glitched bytes for `input` go
fn resolve_output(input: &Path, output: Option<&Path>, data: &[u8], into_dir: bool) -> PathBuf {
    let name = glitched_name(input, data);
    match output {
        None => input.with_file_name(name),
        Some(out) if into_dir || out.is_dir() => out.join(name),
        Some(out) => out.to_path_buf(),
    }
}

/// Marker placed between the input stem and the content hash
const OUTPUT_MARKER: &str = "~glitch-";

/// `photo.png` becomes `photo~glitch-a1b2c3d4.png`, keyed by the glitched content
fn glitched_name(input: &Path, data: &[u8]) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("glitched");
    let hash = content_hash(data);
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}{}{}.{}", stem, OUTPUT_MARKER, hash, ext),
        None => format!("{}{}{}", stem, OUTPUT_MARKER, hash),
    }
}

/// Compute a short hash of the content (first 8 chars of blake3)
fn content_hash(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    hash.to_hex()[..8].to_string()
}

/// True for names produced by [`glitched_name`]
fn is_glitched_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.rsplit_once(OUTPUT_MARKER))
        .map(|(_, hash)| hash.len() == 8 && hash.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
