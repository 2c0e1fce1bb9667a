mod config;
mod logging;
mod prompts;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use playlist_core::auth::DEFAULT_REDIRECT_PORT;
use playlist_core::{
    parse_playlist_id, run_sort_blocking, Authenticator, ClientSecrets, InstalledAppFlow,
    MoveCallback, MoveOutcome, SortDirection, SortError, SortOptions, SortReport, StaticToken,
};
use tracing::debug;

use config::{resolve_credentials, CredentialSource, SorterConfig, DEFAULT_TIMEOUT_SECS};
use logging::init_logging;
use prompts::prompt_playlist;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Sort a YouTube playlist by the timestamps in its video titles",
    long_about = None
)]
struct Cli {
    /// Playlist ID or playlist URL (prompted when omitted)
    playlist: Option<String>,

    /// Pre-issued OAuth access token; skips the browser flow
    #[arg(long = "access-token", env = "YOUTUBE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// OAuth client secrets JSON
    #[arg(long = "client-secret", env = "YOUTUBE_CLIENT_SECRET")]
    client_secret: Option<PathBuf>,

    /// Loopback port for the OAuth redirect
    #[arg(long = "port", default_value_t = DEFAULT_REDIRECT_PORT)]
    port: u16,

    /// Request timeout in seconds
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Put the most recent timestamps first
    #[arg(long = "newest-first")]
    newest_first: bool,

    /// Print the computed order without moving anything
    #[arg(long = "dry-run")]
    dry_run: bool,

    #[arg(long = "api-base-url", hide = true)]
    api_base_url: Option<String>,

    /// More log output on stderr (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Result<(Option<String>, SorterConfig)> {
        let credentials = resolve_credentials(self.access_token, self.client_secret)?;
        let config = SorterConfig {
            credentials,
            redirect_port: self.port,
            timeout_secs: self.timeout,
            direction: if self.newest_first {
                SortDirection::NewestFirst
            } else {
                SortDirection::OldestFirst
            },
            dry_run: self.dry_run,
            api_base_url: self.api_base_url,
        };
        Ok((self.playlist, config))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("{} {err:#}", style("warning:").yellow());
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let (playlist, config) = cli.into_config()?;
    debug!(
        credentials = config.credentials.label(),
        port = config.redirect_port,
        timeout_secs = config.timeout_secs,
        direction = ?config.direction,
        dry_run = config.dry_run,
        "resolved configuration"
    );

    let playlist_id = match playlist {
        Some(playlist) => parse_playlist_id(&playlist).context("invalid playlist")?,
        None => prompt_playlist()?,
    };

    let progress_bar = sort_spinner();
    let authenticator = build_authenticator(&config, progress_bar.clone())?;
    let options = SortOptions {
        playlist: playlist_id.clone(),
        direction: config.direction,
        dry_run: config.dry_run,
        timeout_secs: config.timeout().as_secs(),
        base_url: config.api_base_url.clone(),
        progress_callback: Some(progress_printer(progress_bar.clone())),
    };

    println!("{} {}", style("Sorting playlist").cyan(), playlist_id);
    progress_bar.enable_steady_tick(Duration::from_millis(120));
    let result = run_sort_blocking(authenticator.as_ref(), options);
    progress_bar.finish_and_clear();

    match result {
        Ok(report) => {
            print_summary(&report);
            Ok(if report.is_complete_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(SortError::EmptyPlaylist { playlist_id }) => {
            println!(
                "{}",
                style(format!("Playlist {playlist_id} has no items; nothing to sort.")).yellow()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Err(anyhow::Error::from(err).context("playlist was not sorted")),
    }
}

fn sort_spinner() -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress_bar.set_message("fetching playlist");
    progress_bar
}

fn build_authenticator(
    config: &SorterConfig,
    progress_bar: ProgressBar,
) -> Result<Box<dyn Authenticator>> {
    match &config.credentials {
        CredentialSource::AccessToken(token) => Ok(Box::new(StaticToken::new(token.clone()))),
        CredentialSource::ClientSecrets(path) => {
            let secrets = ClientSecrets::load(path)
                .with_context(|| format!("failed to load client secrets from {}", path.display()))?;
            let flow = InstalledAppFlow::new(secrets)
                .with_port(config.redirect_port)
                .with_timeout(config.timeout())
                .on_authorize_url(Arc::new(move |url: &str| {
                    progress_bar.suspend(|| {
                        println!("{}", style("Open this URL in your browser to authorize:").cyan());
                        println!("{url}");
                    });
                }));
            Ok(Box::new(flow))
        }
    }
}

fn progress_printer(progress_bar: ProgressBar) -> MoveCallback {
    Arc::new(move |outcome: &MoveOutcome| {
        let position = outcome.operation.target_position;
        match &outcome.result {
            Ok(()) => progress_bar.println(format!("\"{}\" moved to position {position}", outcome.title)),
            Err(err) => progress_bar.println(format!(
                "{} \"{}\" could not be moved to position {position}: {err}",
                style("✗").red(),
                outcome.title
            )),
        }
        progress_bar.set_message(format!("{} moves attempted", position + 1));
    })
}

fn print_summary(report: &SortReport) {
    let order = &report.order;
    println!(
        "{} {} items ({} dated, {} undated)",
        style("Playlist:").green().bold(),
        order.len(),
        order.dated_count(),
        order.undated_count()
    );

    let Some(moves) = &report.moves else {
        println!("{}", style("Planned order (dry run, nothing moved):").yellow());
        for (position, item) in order.items().iter().enumerate() {
            let marker = if item.current_position as usize == position { " " } else { "*" };
            println!("{marker} {position:>4}  {}", item.title);
        }
        if order.is_already_ordered() {
            println!("{}", style("The playlist is already in this order.").dim());
        }
        return;
    };

    if moves.is_complete_success() {
        println!(
            "{} all {} items are in place.",
            style("Done:").green().bold(),
            moves.success_count()
        );
        return;
    }

    println!(
        "{} {} of {} moves failed:",
        style("Incomplete:").red().bold(),
        moves.failure_count(),
        moves.outcomes.len()
    );
    for outcome in moves.failed() {
        if let Err(err) = &outcome.result {
            println!(
                "  • \"{}\" (target position {}): {err}",
                style(&outcome.title).yellow(),
                outcome.operation.target_position
            );
        }
    }
    println!("{}", style("Re-run the sorter to retry.").dim());
}
