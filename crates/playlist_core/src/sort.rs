use std::time::Duration;

use tokio::runtime::Builder;
use tracing::{info, instrument};

use crate::auth::Authenticator;
use crate::client::{ClientOptions, PlaylistApi, YouTubeClient};
use crate::errors::{PlaylistError, SortError};
use crate::fetch::fetch_playlist;
use crate::ordering::{order_items, DesiredOrder, SortDirection};
use crate::reorder::{apply_order, MoveCallback, MoveReport};
use crate::timestamp::parse_playlist_id;

#[derive(Clone)]
pub struct SortOptions {
    /// Playlist ID or a URL with a `list=` parameter.
    pub playlist: String,
    pub direction: SortDirection,
    /// Stop after computing the order; issue no moves.
    pub dry_run: bool,
    pub timeout_secs: u64,
    pub base_url: Option<String>,
    pub progress_callback: Option<MoveCallback>,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            playlist: String::new(),
            direction: SortDirection::OldestFirst,
            dry_run: false,
            timeout_secs: 30,
            base_url: None,
            progress_callback: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortReport {
    pub playlist_id: String,
    pub order: DesiredOrder,
    /// `None` when the run was a dry run.
    pub moves: Option<MoveReport>,
}

impl SortReport {
    pub fn item_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.moves
            .as_ref()
            .map(MoveReport::is_complete_success)
            .unwrap_or(true)
    }
}

/// Fetch, order and apply against an already authorized API.
#[instrument(skip(api, options), fields(playlist = %options.playlist, dry_run = options.dry_run))]
pub async fn sort_playlist<A>(api: &A, options: &SortOptions) -> Result<SortReport, SortError>
where
    A: PlaylistApi + ?Sized,
{
    let playlist_id = parse_playlist_id(&options.playlist)?;

    let items = fetch_playlist(api, &playlist_id).await?;
    if items.is_empty() {
        return Err(SortError::EmptyPlaylist { playlist_id });
    }

    let order = order_items(items, options.direction);
    info!(
        items = order.len(),
        dated = order.dated_count(),
        undated = order.undated_count(),
        already_ordered = order.is_already_ordered(),
        "computed target order"
    );

    let moves = if options.dry_run {
        None
    } else {
        Some(
            apply_order(
                api,
                &playlist_id,
                &order,
                options.progress_callback.as_ref(),
            )
            .await,
        )
    };

    Ok(SortReport {
        playlist_id,
        order,
        moves,
    })
}

/// One full run: authorize, then [`sort_playlist`] against the YouTube API.
pub async fn run_sort<Au>(authenticator: &Au, options: SortOptions) -> Result<SortReport, SortError>
where
    Au: Authenticator + ?Sized,
{
    let token = authenticator.authorize().await?;
    let client = YouTubeClient::new(ClientOptions {
        timeout: Duration::from_secs(options.timeout_secs),
        access_token: token.secret().to_string(),
        base_url: options.base_url.clone(),
    })
    .map_err(|err| SortError::from(err).context("failed to build API client"))?;
    sort_playlist(&client, &options).await
}

pub fn run_sort_blocking<Au>(authenticator: &Au, options: SortOptions) -> Result<SortReport, SortError>
where
    Au: Authenticator + ?Sized,
{
    let rt = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            SortError::from(PlaylistError::Other(err.to_string())).context("failed to start tokio runtime")
        })?;
    rt.block_on(run_sort(authenticator, options))
}
