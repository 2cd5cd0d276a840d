use anyhow::Context;
use clap::Parser;
use lineconv::{BatchRunner, DEFAULT_SETTINGS_FILE, Settings};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "lineconv",
    version,
    about = "Convert text files line by line into length-prefixed outputs",
    long_about = "Convert text files line by line into length-prefixed outputs.\n\n\
    Every non-empty line of each input file is read as a date/time, a \
    `<index> <text>` instruction, or a number, and written to `<file>.out` \
    prefixed with the length of the result. Files are processed in parallel.\n\n\
    USAGE EXAMPLES:\n  \
      # Convert text.txt using ./settings.xml\n  \
      lineconv\n\n  \
      # Convert several files with four workers\n  \
      lineconv --jobs 4 a.txt b.txt c.txt\n\n  \
      # Use another settings file\n  \
      lineconv --settings ./ru.xml data.txt"
)]
struct Cli {
    /// Input files; defaults to text.txt
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// XML settings file
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE, value_name = "PATH", env = "LINECONV_SETTINGS")]
    settings: PathBuf,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, default_value_t = 0)]
    jobs: usize,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let settings = Settings::load(&cli.settings).context("Failed to load settings")?;

    let report = BatchRunner::new(cli.jobs)
        .run(&cli.files, &settings)
        .context("Batch execution failed")?;

    report.log_summary();

    Ok(())
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("lineconv=info"),
        1 => EnvFilter::new("lineconv=debug"),
        _ => EnvFilter::new("lineconv=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();
}
