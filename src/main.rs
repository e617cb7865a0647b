//! Emoji Porter - Copy custom emojis between Misskey instances.
//!
//! Fetches the emoji catalog of a source instance and posts a selection of
//! it, one emoji at a time, to the admin API of a destination instance.
//!
//!   emoji-porter fetch -s misskey.example --search blob
//!   emoji-porter token set https://my.example --emoji-token <token>
//!   emoji-porter import -s misskey.example -d https://my.example --all --search blob
//!   emoji-porter import -s misskey.example -d https://my.example -n blobcat --first-only

mod application;
mod cli;
mod domain;
mod infrastructure;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_emojis_json, format_emojis_table, format_summary, format_token_record,
    scroll_to_latest, LogView, Notifier, OutputFormat, TransferService,
};
use cli::{Cli, Commands, ConfigAction, TokenAction};
use domain::{AppConfig, AppError, ImportOutcome, TransferConfig};
use infrastructure::{
    config_file_path, ensure_config_exists, load_config, save_config, HttpEmojiApi, TokenStore,
};

const NOTICE: &str = "\
Emoji Porter copies custom emojis from one Misskey instance to another.

  1. `fetch` downloads the public emoji list of the source instance.
  2. `import` posts the chosen emojis to the destination's admin API,
     one request at a time, stopping at the first failure.

The destination token needs the admin emoji permission. Emojis are added
by URL, so the source images must stay reachable. Importing the same emoji
twice is left to the destination server to reject.";

/// Prints each import acknowledgment as a single status line.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, outcome: &ImportOutcome) {
        if outcome.is_success() {
            println!("{} {}", "✓".green().bold(), outcome);
        } else {
            println!("{} {}", "✗".red().bold(), outcome);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let config = load_config()?;

    match cli.command {
        Commands::Notice => {
            println!("{NOTICE}");
        }
        Commands::Fetch {
            source,
            search,
            format,
        } => {
            let format =
                cli::parse_format(&format).map_err(|e| AppError::Config { message: e })?;
            cmd_fetch(&config, source, search, format).await?;
        }
        Commands::Import {
            source,
            destination,
            token,
            names,
            all,
            search,
            first_only,
            log_lines,
        } => {
            let route = Route {
                source: resolve_domain(source, config.transfer.source_domain.as_ref(), "source")?,
                destination: resolve_domain(
                    destination,
                    config.transfer.destination_domain.as_ref(),
                    "destination",
                )?,
                token: token.unwrap_or_default(),
            };
            let selection = if all {
                Selection::Matching(search.unwrap_or_default())
            } else {
                Selection::Named(names)
            };
            cmd_import(&config, route, selection, first_only, log_lines).await?;
        }
        Commands::Token { action } => cmd_token(&config, action)?,
        Commands::Config { action } => cmd_config(config, action)?,
    }

    Ok(())
}

/// Where `import` reads from and writes to.
struct Route {
    source: String,
    destination: String,
    token: String,
}

/// How `import` picks emojis from the fetched catalog.
enum Selection {
    Named(Vec<String>),
    Matching(String),
}

/// Command-line value first, then the config file.
fn resolve_domain(
    flag: Option<String>,
    configured: Option<&String>,
    what: &str,
) -> domain::Result<String> {
    flag.or_else(|| configured.cloned())
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::Config {
            message: format!("No {what} domain given (use --{what} or `config set --{what}`)"),
        })
}

fn build_service(config: &AppConfig) -> domain::Result<TransferService<HttpEmojiApi>> {
    let api = HttpEmojiApi::new(&config.http)?;
    let tokens = TokenStore::open(&config.token_db_path())?;
    Ok(TransferService::new(api, TransferConfig::default()).with_token_store(tokens))
}

/// Fetch and list the source catalog.
async fn cmd_fetch(
    config: &AppConfig,
    source: Option<String>,
    search: Option<String>,
    format: OutputFormat,
) -> domain::Result<()> {
    let source = resolve_domain(source, config.transfer.source_domain.as_ref(), "source")?;

    let mut service = build_service(config)?;
    service.set_source_domain(source);
    service.set_search_term(search.unwrap_or_default());
    service.fetch_emojis().await;

    let matching = service.matching_emojis();

    match format {
        OutputFormat::Table => {
            if service.catalog().is_empty() {
                println!(
                    "{} No emojis loaded (run with -v for details)",
                    "!".yellow().bold()
                );
                return Ok(());
            }
            println!("{}", format_emojis_table(&matching));
            println!();
            println!(
                "{}",
                format_summary(matching.len(), service.catalog().len(), service.search_term())
            );
        }
        OutputFormat::Json => {
            println!("{}", format_emojis_json(&matching).map_err(AppError::json_parse)?);
        }
    }

    Ok(())
}

/// Fetch the source catalog, select, and import.
async fn cmd_import(
    config: &AppConfig,
    route: Route,
    selection: Selection,
    first_only: bool,
    log_lines: usize,
) -> domain::Result<()> {
    let mut service = build_service(config)?;
    service.set_source_domain(route.source);
    service.set_destination_domain(route.destination);
    service.set_api_token(route.token);

    let total = service.try_fetch_emojis().await?;
    tracing::info!(total, "Source catalog loaded");

    match selection {
        Selection::Named(names) => service.select_by_names(&names)?,
        Selection::Matching(term) => {
            service.set_search_term(term);
            service.select_matching();
        }
    }

    let count = if first_only {
        service.selection().len().min(1)
    } else {
        service.selection().len()
    };
    println!(
        "{} Importing {} emoji(s) into {}",
        "→".cyan().bold(),
        count,
        service.config().destination_domain
    );

    let notifier = ConsoleNotifier;
    let outcome = if first_only {
        service.import_selected_emoji(&notifier).await
    } else {
        service.import_all_emojis(&notifier).await
    };

    if log_lines > 0 && !service.request_log().is_empty() {
        let mut view = LogView::from_entries(service.request_log(), log_lines);
        scroll_to_latest(Some(&mut view));
        println!();
        println!("{}", view.render());
    }

    if !outcome.is_success() {
        std::process::exit(2);
    }

    Ok(())
}

/// Token store command.
fn cmd_token(config: &AppConfig, action: TokenAction) -> domain::Result<()> {
    let store = TokenStore::open(&config.token_db_path())?;

    match action {
        TokenAction::Set {
            domain,
            emoji_token,
            drive_token,
        } => {
            store.set_token(&domain, &emoji_token, &drive_token)?;
            println!("{} Tokens saved for {}", "✓".green().bold(), domain);
        }
        TokenAction::Get { domain } => {
            let record = store.get_token(&domain)?;
            println!("{}", format_token_record(&domain, &record));
        }
    }

    Ok(())
}

/// Configuration file command.
fn cmd_config(mut config: AppConfig, action: ConfigAction) -> domain::Result<()> {
    let path = config_file_path();

    match action {
        ConfigAction::Init => {
            if ensure_config_exists(&path)? {
                println!("{} Created {}", "✓".green().bold(), path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&config).map_err(|e| AppError::Config {
                message: format!("Failed to serialize config: {e}"),
            })?;
            println!("{} {}", "📄".bold(), path.display());
            println!();
            println!("{content}");
        }
        ConfigAction::Set {
            source,
            destination,
        } => {
            if source.is_some() {
                config.transfer.source_domain = source;
            }
            if destination.is_some() {
                config.transfer.destination_domain = destination;
            }
            save_config(&config, &path)?;
            println!("{} Saved {}", "✓".green().bold(), path.display());
        }
    }

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
