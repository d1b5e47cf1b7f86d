//! Subdomain Extractor CLI Application
//!
//! Fetches one URL or a list of URLs and prints every subdomain of the target
//! domain found in the page bodies, one per line, each exactly once.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::error::ErrorKind;
use clap::{ArgAction, ArgGroup, CommandFactory, Parser};
use futures::StreamExt;
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::process;
use subdomain_extractor_lib::{
    load_env_config, parse_timeout_string, read_url_file, validate_domain, ConfigManager,
    Dispatcher, EnvConfig, ExtractConfig, ExtractorError, FileConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for subdomain-extractor
#[derive(Parser, Debug)]
#[command(name = "subdomain-extractor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract subdomains of a target domain from fetched web pages")]
#[command(
    long_about = "Fetch one URL (-u) or a newline-separated list of URLs (-f) and print every\nsubdomain of the target domain found in the response bodies, once each."
)]
#[command(styles = STYLES)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
pub struct Args {
    /// Target domain to search for subdomains (e.g. ford.com)
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN", help_heading = "Target")]
    pub domain: String,

    /// URL to fetch and search
    #[arg(short = 'u', long = "url", value_name = "URL", help_heading = "Target")]
    pub url: Option<String>,

    /// File containing newline-separated URLs to fetch
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = "Target")]
    pub file: Option<String>,

    /// File to write found subdomains to (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE", help_heading = "Output")]
    pub output: Option<String>,

    /// Hide the progress line on stderr
    #[arg(long = "no-progress", help_heading = "Output")]
    pub no_progress: bool,

    /// Maximum number of concurrent fetches (default: 10)
    #[arg(short = 't', long = "threads", value_name = "N", help_heading = "Performance")]
    pub threads: Option<usize>,

    /// Maximum number of HTTP requests started per second (default: 20)
    #[arg(long = "rps", value_name = "N", help_heading = "Performance")]
    pub rps: Option<u32>,

    /// Per-request timeout, e.g. 10s or 2m (default: none)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Skip TLS certificate verification (default: true, use with caution)
    #[arg(
        short = 'i',
        long = "insecure",
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "Network"
    )]
    pub insecure: Option<bool>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Verbose logging and an end-of-run summary on stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = check_domain_arg(&args) {
        e.exit();
    }

    init_logging(args.verbose);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_extraction(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Route all logs to stderr so stdout carries only results.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

/// A blank `-d ""` is reported like a missing `-d`, with the usage line.
fn check_domain_arg(args: &Args) -> Result<(), clap::Error> {
    if args.domain.trim().is_empty() {
        return Err(Args::command().error(
            ErrorKind::ValueValidation,
            "the target domain given to -d/--domain cannot be blank",
        ));
    }
    Ok(())
}

/// Validate command line arguments that clap cannot check on its own.
fn validate_args(args: &Args) -> Result<(), String> {
    if args.url.is_some() == args.file.is_some() {
        return Err("Specify exactly one of -u/--url or -f/--file".to_string());
    }

    if args.threads == Some(0) {
        return Err("Threads must be at least 1".to_string());
    }

    if args.rps == Some(0) {
        return Err("Requests per second must be at least 1".to_string());
    }

    Ok(())
}

async fn run_extraction(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Everything that can fail on configuration happens before the first fetch.
    let config = build_config(&args)?;
    let domain = validate_domain(&args.domain)?;
    let urls = collect_urls(&args)?;
    let mut writer = open_output(args.output.as_deref())?;

    if config.insecure && args.verbose {
        tracing::warn!("TLS certificate verification is disabled");
    }

    let dispatcher = Dispatcher::new(&domain, config)?;
    let total = urls.len();

    if args.verbose {
        ui::print_header(&domain, total, dispatcher.config());
    }

    let progress = if should_show_progress(&args) {
        ui::Progress::start(dispatcher.stats(), total)
    } else {
        None
    };

    let start_time = std::time::Instant::now();
    let mut results = dispatcher.stream(urls);

    while let Some(subdomain) = results.next().await {
        if let Err(e) = writeln!(writer, "{}", subdomain) {
            // Reader went away (e.g. piped into `head`); nothing left to do.
            if e.kind() == io::ErrorKind::BrokenPipe {
                break;
            }
            return Err(e.into());
        }
    }
    writer.flush().or_else(|e| match e.kind() {
        io::ErrorKind::BrokenPipe => Ok(()),
        _ => Err(e),
    })?;

    if let Some(p) = progress {
        p.stop().await;
    }

    if args.verbose {
        ui::print_summary(&dispatcher.stats().snapshot(), start_time.elapsed());
    }

    Ok(())
}

/// Build ExtractConfig from CLI arguments with config file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (SE_*)
/// 3. Explicit config file (--config or SE_CONFIG), otherwise discovered files
/// 4. Built-in defaults
fn build_config(args: &Args) -> Result<ExtractConfig, Box<dyn std::error::Error>> {
    let mut config = ExtractConfig::default();
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config(args.verbose);

    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());

    if let Some(path) = explicit_path {
        tracing::info!("using config file {}", path);
        let file_config = config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?;
        config = merge_file_config_into_extract_config(config, file_config)?;
    } else {
        match config_manager.discover_and_load() {
            Ok(file_config) => {
                config = merge_file_config_into_extract_config(config, file_config)?;
            }
            Err(e) => tracing::warn!("config discovery failed: {}", e),
        }
    }

    config = apply_environment_config(config, &env_config);
    config = apply_cli_args_to_config(config, args)?;
    config.validate()?;

    Ok(config)
}

/// Merge FileConfig into ExtractConfig.
fn merge_file_config_into_extract_config(
    mut config: ExtractConfig,
    file_config: FileConfig,
) -> Result<ExtractConfig, ExtractorError> {
    let Some(defaults) = file_config.defaults else {
        return Ok(config);
    };

    if let Some(threads) = defaults.threads {
        config.max_threads = threads;
    }
    if let Some(rps) = defaults.rps {
        config.max_rps = rps;
    }
    if let Some(insecure) = defaults.insecure {
        config.insecure = insecure;
    }
    if let Some(timeout_str) = defaults.timeout {
        let timeout = parse_timeout_string(&timeout_str).ok_or_else(|| {
            ExtractorError::config(format!("Invalid timeout '{}' in config file", timeout_str))
        })?;
        config.timeout = Some(timeout);
    }

    Ok(config)
}

/// Apply SE_* environment values to config.
fn apply_environment_config(mut config: ExtractConfig, env_config: &EnvConfig) -> ExtractConfig {
    if let Some(threads) = env_config.threads {
        config.max_threads = threads;
    }
    if let Some(rps) = env_config.rps {
        config.max_rps = rps;
    }
    if let Some(insecure) = env_config.insecure {
        config.insecure = insecure;
    }
    if let Some(timeout) = env_config.timeout {
        config.timeout = Some(timeout);
    }
    config
}

/// Apply CLI arguments to config (highest precedence).
///
/// Only flags the user actually passed override lower layers.
fn apply_cli_args_to_config(
    mut config: ExtractConfig,
    args: &Args,
) -> Result<ExtractConfig, ExtractorError> {
    if let Some(threads) = args.threads {
        config.max_threads = threads;
    }
    if let Some(rps) = args.rps {
        config.max_rps = rps;
    }
    if let Some(insecure) = args.insecure {
        config.insecure = insecure;
    }
    if let Some(timeout_str) = &args.timeout {
        let timeout = parse_timeout_string(timeout_str).ok_or_else(|| {
            ExtractorError::config(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout_str
            ))
        })?;
        config.timeout = Some(timeout);
    }
    Ok(config)
}

/// Get the list of URLs to fetch from -u or -f.
fn collect_urls(args: &Args) -> Result<Vec<String>, ExtractorError> {
    match (&args.url, &args.file) {
        (_, Some(file)) => {
            let urls = read_url_file(file)?;
            tracing::info!("read {} URLs from {}", urls.len(), file);
            Ok(urls)
        }
        (Some(url), None) => Ok(vec![url.trim().to_string()]),
        (None, None) => Err(ExtractorError::config(
            "No URL source given; use -u/--url or -f/--file",
        )),
    }
}

/// Open the result sink: a file when -o is given, stdout otherwise.
///
/// Both sinks flush on every newline so results show up as they are found.
fn open_output(path: Option<&str>) -> Result<Box<dyn Write>, ExtractorError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                ExtractorError::file_error(path, format!("Failed to create output file: {}", e))
            })?;
            Ok(Box::new(LineWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// The progress line shares the terminal with nothing else: it is drawn on
/// stderr only when results are not also going to that terminal.
fn should_show_progress(args: &Args) -> bool {
    if args.no_progress || !console::user_attended_stderr() {
        return false;
    }
    args.output.is_some() || !console::user_attended()
}
