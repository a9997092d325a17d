//! untextract CLI - document text and form extraction

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use untextract::config::Settings;
use untextract::dump::dump_path;
use untextract::render::{self, OutputFormat};
use untextract::{
    DocumentSource, Extraction, ExtractionOutcome, Extractor, HttpService, JsonFormat, OutputMode,
    PollOptions,
};

#[derive(Parser)]
#[command(name = "untextract")]
#[command(version)]
#[command(about = "Extract text and form fields through a document-analysis service", long_about = None)]
struct Cli {
    /// Settings file (key=value lines)
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "UNTEXTRACT_CONFIG",
        default_value = ".env"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect text in a local file with a single synchronous call
    Text {
        /// Input image or PDF
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory for the raw result dump (next to the input by default)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Do not write the raw result dump
        #[arg(long)]
        no_dump: bool,

        /// Print lines as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Detect text in a stored document with an asynchronous job
    Lines {
        /// Object key in the configured bucket
        #[arg(value_name = "KEY")]
        key: String,

        #[command(flatten)]
        poll: PollArgs,

        /// Write the raw result to this file
        #[arg(long, value_name = "FILE")]
        dump: Option<PathBuf>,

        /// Print lines as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Extract form key/value pairs from a stored document
    Forms {
        /// Object key in the configured bucket
        #[arg(value_name = "KEY")]
        key: String,

        /// Use an asynchronous job instead of a single call
        #[arg(long = "async")]
        use_job: bool,

        #[command(flatten)]
        poll: PollArgs,

        /// Write the raw result to this file
        #[arg(long, value_name = "FILE")]
        dump: Option<PathBuf>,

        /// Print pairs as a JSON object
        #[arg(long)]
        json: bool,
    },

    /// Extract lines or pairs from a saved result dump
    Inspect {
        /// Result dump written by an earlier run
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Extract form pairs instead of lines
        #[arg(long)]
        forms: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct PollArgs {
    /// Seconds between status requests
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    interval: u64,

    /// Maximum number of status requests
    #[arg(long, value_name = "N", default_value_t = 360)]
    max_polls: u32,

    /// Give up waiting after this many seconds
    #[arg(long, value_name = "SECS", default_value_t = 1800)]
    timeout: u64,
}

impl From<PollArgs> for PollOptions {
    fn from(args: PollArgs) -> Self {
        PollOptions::new()
            .with_interval(Duration::from_secs(args.interval))
            .with_max_attempts(args.max_polls)
            .with_timeout(Duration::from_secs(args.timeout))
    }
}

/// How a command ended when it did not error.
enum Status {
    Done,
    JobFailed,
}

type CmdResult = Result<Status, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Text {
            input,
            output,
            no_dump,
            json,
        } => cmd_text(&cli.config, &input, output.as_deref(), no_dump, json),
        Commands::Lines {
            key,
            poll,
            dump,
            json,
        } => cmd_lines(&cli.config, &key, poll, dump, json),
        Commands::Forms {
            key,
            use_job,
            poll,
            dump,
            json,
        } => cmd_forms(&cli.config, &key, use_job, poll, dump, json),
        Commands::Inspect { input, forms, json } => cmd_inspect(&input, forms, json),
        Commands::Version => {
            cmd_version();
            Ok(Status::Done)
        }
    };

    match result {
        Ok(Status::Done) => {}
        Ok(Status::JobFailed) => std::process::exit(2),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json(JsonFormat::Pretty)
    } else {
        OutputFormat::Text
    }
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

fn load_settings(config: &Path) -> Result<Settings, Box<dyn std::error::Error>> {
    log::debug!("Using settings file {}", config.display());
    Ok(Settings::load_from(config)?)
}

fn build_extractor(
    settings: &Settings,
    poll: Option<PollArgs>,
    dump: Option<PathBuf>,
) -> Result<Extractor<HttpService>, Box<dyn std::error::Error>> {
    let service = Arc::new(HttpService::from_settings(settings)?);
    let mut extractor = Extractor::new(service);
    if let Some(poll) = poll {
        extractor = extractor.with_poll_options(poll.into());
    }
    if let Some(path) = dump {
        extractor = extractor.with_dump(path);
    }
    Ok(extractor)
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn cmd_text(
    config: &Path,
    input: &Path,
    output: Option<&Path>,
    no_dump: bool,
    json: bool,
) -> CmdResult {
    let settings = load_settings(config)?;
    let document = DocumentSource::from_path(input)?;
    let dump = (!no_dump).then(|| dump_path(input, output));
    let extractor = build_extractor(&settings, None, dump)?;

    let rt = runtime()?;
    let outcome = rt.block_on(extractor.extract_sync(&document, OutputMode::Lines))?;
    report(outcome, json)
}

fn cmd_lines(config: &Path, key: &str, poll: PollArgs, dump: Option<PathBuf>, json: bool) -> CmdResult {
    let settings = load_settings(config)?;
    let document = DocumentSource::storage(settings.bucket()?, key);
    let notification = settings.notification_channel()?;
    let extractor = build_extractor(&settings, Some(poll), dump)?;

    let rt = runtime()?;
    let pb = spinner(format!("Detecting text in {}", key));
    let outcome = rt.block_on(extractor.extract_async_until(
        &document,
        OutputMode::Lines,
        notification.as_ref(),
        shutdown_signal(),
    ));
    pb.finish_and_clear();

    report(outcome?, json)
}

fn cmd_forms(
    config: &Path,
    key: &str,
    use_job: bool,
    poll: PollArgs,
    dump: Option<PathBuf>,
    json: bool,
) -> CmdResult {
    let settings = load_settings(config)?;
    let document = DocumentSource::storage(settings.bucket()?, key);
    let rt = runtime()?;

    let outcome = if use_job {
        let notification = settings.notification_channel()?;
        let extractor = build_extractor(&settings, Some(poll), dump)?;
        let pb = spinner(format!("Analyzing form {}", key));
        let outcome = rt.block_on(extractor.extract_async_until(
            &document,
            OutputMode::Forms,
            notification.as_ref(),
            shutdown_signal(),
        ));
        pb.finish_and_clear();
        outcome?
    } else {
        let extractor = build_extractor(&settings, None, dump)?;
        rt.block_on(extractor.extract_sync(&document, OutputMode::Forms))?
    };

    report(outcome, json)
}

fn cmd_inspect(input: &Path, forms: bool, json: bool) -> CmdResult {
    let mode = if forms {
        OutputMode::Forms
    } else {
        OutputMode::Lines
    };
    let content = untextract::extract_from_file(input, mode)?;
    print!("{}", render::render(&content, output_format(json))?);
    Ok(Status::Done)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; never cancel.
        std::future::pending::<()>().await;
    }
}

fn report(outcome: ExtractionOutcome, json: bool) -> CmdResult {
    match outcome {
        ExtractionOutcome::Completed(extraction) => {
            print_extraction(&extraction, json)?;
            Ok(Status::Done)
        }
        ExtractionOutcome::JobFailed { job_id, message } => {
            println!(
                "{} {}",
                "The job did not complete successfully:".yellow(),
                job_id
            );
            if let Some(message) = message {
                println!("  {}", message.dimmed());
            }
            Ok(Status::JobFailed)
        }
    }
}

fn print_extraction(extraction: &Extraction, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(job_id) = &extraction.job_id {
        eprintln!("{} {}", "Job".green(), job_id);
    }
    if let Some(path) = &extraction.dump_path {
        eprintln!("{} {}", "Saved result to".green(), path.display());
    }
    for warning in &extraction.warnings {
        eprintln!(
            "{} {} on pages {:?}",
            "Warning:".yellow(),
            warning.error_code.as_deref().unwrap_or("unknown"),
            warning.pages
        );
    }

    print!("{}", render::render(&extraction.content, output_format(json))?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "untextract".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document text and form extraction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_args_defaults() {
        let cli = Cli::try_parse_from(["untextract", "lines", "scan.pdf"]).unwrap();
        let Commands::Lines { key, poll, .. } = cli.command else {
            panic!("expected lines command");
        };
        assert_eq!(key, "scan.pdf");

        let options: PollOptions = poll.into();
        assert_eq!(options, PollOptions::default());
    }

    #[test]
    fn test_forms_async_flag() {
        let cli = Cli::try_parse_from([
            "untextract",
            "forms",
            "form.png",
            "--async",
            "--interval",
            "1",
            "--max-polls",
            "10",
            "--config",
            "custom.env",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("custom.env"));
        let Commands::Forms { use_job, poll, .. } = cli.command else {
            panic!("expected forms command");
        };
        assert!(use_job);
        let options: PollOptions = poll.into();
        assert_eq!(options.interval, Duration::from_secs(1));
        assert_eq!(options.max_attempts, 10);
    }

    #[test]
    fn test_inspect_saved_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        std::fs::write(
            &path,
            r#"{"Blocks":[{"Id":"l1","BlockType":"LINE","Text":"Hello"}]}"#,
        )
        .unwrap();

        assert!(matches!(cmd_inspect(&path, false, false), Ok(Status::Done)));
        assert!(cmd_inspect(&dir.path().join("missing.json"), false, false).is_err());
    }
}
