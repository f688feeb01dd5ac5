mod commands;
mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use embyvl_api::AdminClient;
use embyvl_core::config::{ConsoleConfig, LoggingConfig};
use embyvl_core::models::ResourceType;
use embyvl_runtime::ConfigStore;

use crate::console::ConsoleNotifier;

#[derive(Parser, Debug)]
#[command(name = "embyvl", version)]
#[command(about = "Manage the virtual libraries of an Emby proxy")]
struct Cli {
    /// Console config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "EMBYVL_CONFIG")]
    config: Option<PathBuf>,

    /// Admin API base URL, including its /api prefix (overrides config)
    #[arg(long, global = true, env = "EMBYVL_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show virtual libraries and the home layout
    Show {
        /// Print the raw proxy configuration as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-fetch classifications and libraries from Emby
    RefreshEmby,
    /// Create a virtual library
    Add(LibraryArgs),
    /// Edit an existing virtual library
    Edit {
        id: String,
        #[command(flatten)]
        changes: LibraryArgs,
    },
    /// Delete a virtual library
    Delete { id: String },
    /// Refresh an RSSHub library in the background
    Refresh { id: String },
    /// Save the home layout order
    Order {
        /// Library ids in display order
        ids: Vec<String>,
        /// Append every library not yet in the layout
        #[arg(long)]
        append_unsorted: bool,
    },
    /// Generate a cover image for a virtual library
    Cover {
        id: String,
        /// Primary title drawn on the cover (defaults to the library name)
        #[arg(long)]
        title: Option<String>,
        /// Secondary title
        #[arg(long)]
        subtitle: Option<String>,
        /// Cover style (defaults to the proxy's configured style)
        #[arg(long)]
        style: Option<String>,
        /// Server-side path of an uploaded source image
        #[arg(long = "image")]
        images: Vec<String>,
        /// Keep the generated cover unsaved
        #[arg(long)]
        no_save: bool,
    },
    /// Remove every generated cover
    ClearCovers,
    /// Restart the proxy server
    RestartProxy,
    /// Search Emby persons
    Persons {
        query: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List or replace the advanced filters
    Filters {
        #[command(subcommand)]
        action: FilterAction,
    },
    /// Change proxy settings
    Settings(SettingsArgs),
    /// Write the effective console config to the config file
    InitConfig,
}

#[derive(Subcommand, Debug)]
enum FilterAction {
    List,
    /// Replace all filters with the JSON array in FILE
    Import { file: PathBuf },
}

#[derive(Args, Debug, Default)]
struct LibraryArgs {
    #[arg(long)]
    name: Option<String>,
    /// collection, tag, genre, studio, person, rsshub or all
    #[arg(long = "type", value_parser = parse_resource_type)]
    resource_type: Option<ResourceType>,
    #[arg(long)]
    resource_id: Option<String>,
    #[arg(long)]
    rsshub_url: Option<String>,
    #[arg(long)]
    rss_type: Option<String>,
    #[arg(long)]
    merge_by_tmdb_id: Option<bool>,
    /// Advanced filter id; an empty value detaches the filter
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    #[arg(long)]
    emby_url: Option<String>,
    #[arg(long)]
    emby_api_key: Option<String>,
    /// Hide a library from the Emby home screen
    #[arg(long = "hide")]
    hide: Vec<String>,
    /// Show a previously hidden library again
    #[arg(long = "unhide")]
    unhide: Vec<String>,
}

fn parse_resource_type(s: &str) -> Result<ResourceType, String> {
    ResourceType::from_str_opt(&s.to_ascii_lowercase()).ok_or_else(|| {
        let known: Vec<&str> = ResourceType::ALL.iter().map(|t| t.as_str()).collect();
        format!("unknown resource type '{s}' (expected one of: {})", known.join(", "))
    })
}

fn load_config(cli: &Cli) -> anyhow::Result<ConsoleConfig> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load_from(path)?,
        None => ConsoleConfig::load()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.admin.base_url = base_url.clone();
        config.admin_url()?;
    }
    Ok(config)
}

/// Install the stderr subscriber, plus a daily-rolling file when configured.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let (file_layer, guard) = match &logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "embyvl.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _log_guard = init_logging(&config.logging);

    if let Command::InitConfig = cli.command {
        let path = cli.config.clone().unwrap_or_else(ConsoleConfig::config_path);
        let written = match &cli.config {
            Some(path) => config.save_to(path),
            None => config.save(),
        };
        written.with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let base = config.admin_url()?;
    tracing::debug!(%base, "connecting to admin API");
    let client = AdminClient::new(base, config.request_timeout())?;
    let notifier = Arc::new(ConsoleNotifier::default());
    let store = ConfigStore::new(client, notifier.clone());

    commands::run(&store, cli.command).await?;

    Ok(if notifier.saw_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
