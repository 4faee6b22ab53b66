//! blogcast-publish - Publish a markdown post to Dev.to, Medium and Hashnode

use std::path::PathBuf;

use clap::Parser;
use libblogcast::config::{Config, CredentialSource};
use libblogcast::credentials::{provider_for, ActionInputProvider, Credentials};
use libblogcast::events::{Event, EventBus, EventReceiver};
use libblogcast::logging::LoggingConfig;
use libblogcast::poster::{create_platforms, platforms_needing_credentials};
use libblogcast::{BlogcastError, Document, PlatformKind, Result, SequentialPublisher};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// Action input naming the markdown file
const MARKDOWN_FILE_INPUT: &str = "markdown_file";

#[derive(Parser, Debug)]
#[command(name = "blogcast-publish")]
#[command(version)]
#[command(about = "Publish a markdown post to Dev.to, Medium and Hashnode")]
#[command(long_about = r##"Publish a markdown post to Dev.to, Medium and Hashnode.

The first line starting with "# " is the post title. Platforms are
published to in a fixed order (Dev.to, Medium, Hashnode) and the first
failure stops the run; posts already published stay published.

EXAMPLES:
    # Publish blog.md to every enabled platform
    blogcast-publish

    # Publish a specific file to Dev.to and Hashnode only
    blogcast-publish posts/launch.md --platform devto,hashnode

    # Inside a CI action, read secrets from INPUT_* variables
    blogcast-publish --credentials action

    # One JSON result per platform on stdout
    blogcast-publish --format json | jq -r '.url'

CREDENTIALS:
    env    - DEVTO_API_KEY, MEDIUM_INTEGRATION_TOKEN, HASHNODE_API_KEY
    action - INPUT_DEVTO_API_KEY, INPUT_MEDIUM_TOKEN, INPUT_HASHNODE_API_KEY
             (and INPUT_MARKDOWN_FILE for the input file)

EXIT CODES:
    0 - Published to every enabled platform
    1 - Platform, network or configuration error
    2 - A platform rejected the credential
    3 - Invalid input (missing file, no title, bad arguments)
"##)]
struct Cli {
    /// Markdown file to publish (default: config input.path, then blog.md)
    file: Option<PathBuf>,

    /// Target specific platform(s) (comma-separated)
    #[arg(short, long, value_name = "PLATFORMS")]
    platform: Option<String>,

    /// Credential source: env or action (overrides config)
    #[arg(long, value_name = "SOURCE")]
    credentials: Option<String>,

    /// Configuration file (default: $BLOGCAST_CONFIG or ~/.config/blogcast/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = BlogcastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(BlogcastError::InvalidInput(format!(
                "Invalid format '{}'. Valid formats: text, json",
                s
            ))),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    // Run the main logic and handle errors
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse()?;
    let only = cli.platform.as_deref().map(parse_platforms).transpose()?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    if let Some(source) = &cli.credentials {
        config.credentials.source = source
            .parse::<CredentialSource>()
            .map_err(|e| BlogcastError::InvalidInput(format!("--credentials: {}", e)))?;
    }

    // Read and parse the document before any platform is contacted
    let input = input_path(&cli, &config);
    debug!("Reading {}", input.display());
    let document = Document::from_file(&input)?;

    let enabled = config.enabled_platforms(only.as_deref());
    if enabled.is_empty() {
        warn!("No platforms enabled; nothing to publish");
        eprintln!("No platforms enabled; nothing to publish");
        return Ok(());
    }

    let provider = provider_for(config.credentials.source);
    let mut credentials = Credentials::resolve(
        provider.as_ref(),
        &platforms_needing_credentials(&config, &enabled),
    );
    let platforms = create_platforms(&config, &mut credentials, &enabled)?;

    let bus = EventBus::new(32);
    let printer = tokio::spawn(print_progress(bus.subscribe(), format));

    let publisher = SequentialPublisher::new(platforms).with_events(bus);
    let outcome = publisher.publish_all(&document).await;

    // Dropping the publisher closes the bus so the printer drains and exits
    drop(publisher);
    if let Err(e) = printer.await {
        warn!("Progress printer stopped unexpectedly: {}", e);
    }

    outcome.map(|_| ())
}

/// Parse a comma-separated platform list
fn parse_platforms(list: &str) -> Result<Vec<PlatformKind>> {
    let platforms = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::parse::<PlatformKind>)
        .collect::<Result<Vec<PlatformKind>>>()?;

    if platforms.is_empty() {
        return Err(BlogcastError::InvalidInput(
            "--platform needs at least one platform".to_string(),
        ));
    }
    Ok(platforms)
}

/// Input file: CLI argument, then action input, then config
fn input_path(cli: &Cli, config: &Config) -> PathBuf {
    if let Some(file) = &cli.file {
        return file.clone();
    }
    if config.credentials.source == CredentialSource::Action {
        if let Some(file) = ActionInputProvider::input(MARKDOWN_FILE_INPUT) {
            return PathBuf::from(file);
        }
    }
    PathBuf::from(config.input.path.as_str())
}

/// Progress notices go to stderr, results to stdout
async fn print_progress(mut receiver: EventReceiver, format: OutputFormat) {
    loop {
        match receiver.recv().await {
            Ok(event) => report(&event, format),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Progress output skipped {} event(s)", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn report(event: &Event, format: OutputFormat) {
    eprintln!("{}", event);

    let result = match event {
        Event::PlatformSucceeded { result } | Event::PlatformFailed { result } => result,
        _ => return,
    };

    match format {
        OutputFormat::Json => match serde_json::to_string(result) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to serialize result: {}", e),
        },
        OutputFormat::Text if result.success => {
            let location = result
                .receipt
                .url
                .as_deref()
                .or(result.receipt.slug.as_deref())
                .or(result.receipt.post_id.as_deref())
                .unwrap_or("published");
            println!("{}: {}", result.platform.as_str(), location);
        }
        OutputFormat::Text => {}
    }
}
