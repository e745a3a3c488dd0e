//! feedsift: search feeds for one or more subjects from the command line
//!
//! This is the main entry point for the binary.

use anyhow::{bail, Context, Result};
use feedsift::{
    config::{self, Settings},
    feed::fields,
    Search, Where,
};
use regex::Regex;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    subjects: Vec<String>,
    config: Option<PathBuf>,
    secure: bool,
    exact: bool,
    concurrency: Option<usize>,
    title: Option<Regex>,
    json: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = parse_args(std::env::args().skip(1))? else {
        return Ok(());
    };

    info!("Starting feedsift v{}", feedsift::VERSION);

    // Load configuration, command line flags win
    let mut settings = load_settings(args.config.as_deref())?;
    if args.secure {
        settings.search.secure = true;
    }
    if args.exact {
        settings.search.exact = true;
    }
    if let Some(n) = args.concurrency {
        settings.search.max_concurrency = n;
    }
    let settings = config::init(settings)?;

    let search = Search::from_settings(args.subjects, settings)?;
    let mut results = search.into_result_set();
    if let Some(pattern) = args.title {
        results.pick(Where::new().field(fields::TITLE, pattern));
    }

    let items = results.to_vec()?;
    info!("Found {} items", items.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for item in &items {
            println!(
                "{}\t{}",
                item.title().unwrap_or("(untitled)"),
                item.link().unwrap_or("")
            );
        }
    }

    let mut errors: Vec<_> = results.errors().iter().collect();
    errors.sort();
    for (subject, body) in errors {
        eprintln!("{}: {}", subject, body.trim());
    }

    Ok(())
}

/// Parse arguments; `None` means help or version was printed
fn parse_args<I>(args: I) -> Result<Option<Args>>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("feedsift {}", feedsift::VERSION);
                return Ok(None);
            }
            "-c" | "--config" => {
                let path = args.next().context("--config requires a file")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--secure" => parsed.secure = true,
            "--exact" => parsed.exact = true,
            "--json" => parsed.json = true,
            "--concurrency" => {
                let value = args.next().context("--concurrency requires a number")?;
                let n = value
                    .parse()
                    .with_context(|| format!("invalid concurrency: {}", value))?;
                parsed.concurrency = Some(n);
            }
            "--title" => {
                let value = args.next().context("--title requires a pattern")?;
                let pattern = Regex::new(&value)
                    .with_context(|| format!("invalid title pattern: {}", value))?;
                parsed.title = Some(pattern);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => bail!("unknown option: {}", flag),
            _ => parsed.subjects.push(arg),
        }
    }

    if parsed.subjects.is_empty() {
        print_usage();
        bail!("no subjects given");
    }

    Ok(Some(parsed))
}

/// Load settings from file or use defaults
fn load_settings(explicit: Option<&std::path::Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        info!("Loading settings from: {}", path.display());
        let mut settings = Settings::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        settings.merge_env();
        return Ok(settings);
    }

    // Check environment variable first
    if let Ok(path) = std::env::var("FEEDSIFT_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    let mut paths = vec![
        PathBuf::from("feedsift.yml"),
        PathBuf::from("config/feedsift.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("feedsift/settings.yml"));
    }

    for path in paths.iter() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
feedsift v{}
Search RSS feeds for one or more subjects and filter the results

USAGE:
    feedsift [OPTIONS] <SUBJECT>...

OPTIONS:
    -c, --config <FILE>      Path to configuration file
        --secure             Use https
        --exact              Ask for exact subject matches
        --concurrency <N>    Maximum requests in flight (default {})
        --title <REGEX>      Keep only items whose title matches
        --json               Print items as JSON
    -h, --help               Print help information
    -V, --version            Print version information

ENVIRONMENT VARIABLES:
    FEEDSIFT_SETTINGS_PATH    Path to settings.yml
    FEEDSIFT_ENDPOINT         Search endpoint, without scheme
    FEEDSIFT_SECURE           Use https (true/false)
    FEEDSIFT_EXACT            Exact matching (true/false)
    FEEDSIFT_MAX_CONCURRENCY  Maximum requests in flight
    FEEDSIFT_REQUEST_TIMEOUT  Request timeout in seconds
    FEEDSIFT_USER_AGENT       User agent string
    RUST_LOG                  Log filter (default info)
"#,
        feedsift::VERSION,
        feedsift::DEFAULT_MAX_CONCURRENCY
    );
}
