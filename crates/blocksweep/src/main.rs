use blocksweep::{ConfigOverrides, init_logging, load_config, log_event, summarize, to_yaml};
use blocksweep_core::{ProcessWorker, Sweep};
use clap::Parser;
use color_eyre::eyre::WrapErr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blocksweep")]
#[command(about = "Run the blocking worker over a parameter grid and collect its CSV output")]
struct Args {
    /// YAML sweep configuration (defaults reproduce the canopies experiment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated question limits, replacing the configured axis
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    limits: Option<Vec<i64>>,

    /// Comma-separated tight-threshold functions, replacing the configured axis
    #[arg(long, value_delimiter = ',')]
    thresholds: Option<Vec<String>>,

    /// Results CSV file
    #[arg(long)]
    results: Option<PathBuf>,

    /// Kill a worker that runs longer than this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the commands that would run, then exit
    #[arg(long)]
    dry_run: bool,

    /// Print the effective configuration as YAML, then exit
    #[arg(long)]
    print_config: bool,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            limits: self.limits.clone(),
            tight_thresholds: self.thresholds.clone(),
            results_file: self.results.clone(),
            timeout_secs: self.timeout,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    let mut config = load_config(args.config.as_deref())?;
    args.overrides().apply(&mut config);
    config.validate()?;

    if args.print_config {
        print!("{}", to_yaml(&config)?);
        return Ok(());
    }

    let worker = ProcessWorker::new().with_timeout(config.worker.timeout());
    let mut sweep = Sweep::from_config(&config, worker)?.with_observer(log_event);

    if args.dry_run {
        for (_, invocation) in sweep.plan() {
            println!("{invocation}");
        }
        return Ok(());
    }

    match sweep.run() {
        Ok(report) => {
            tracing::info!(
                results = %config.paths.results_file.display(),
                "Sweep complete: {}",
                summarize(&report)
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                combination = ?err.combination().map(ToString::to_string),
                "Sweep aborted: {err}"
            );
            Err(err).wrap_err("Worker sweep aborted")
        }
    }
}
