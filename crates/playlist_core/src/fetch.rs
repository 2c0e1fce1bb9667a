use tracing::{debug, info, instrument, warn};

use crate::client::PlaylistApi;
use crate::errors::FetchError;
use crate::models::PlaylistItem;

/// Collects every item of `playlist_id`, following page tokens until the
/// listing stops returning one.
///
/// Pages are requested one at a time since each token comes from the previous
/// response. Any page failure discards everything gathered so far.
#[instrument(skip(api))]
pub async fn fetch_playlist<A>(api: &A, playlist_id: &str) -> Result<Vec<PlaylistItem>, FetchError>
where
    A: PlaylistApi + ?Sized,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages_fetched = 0usize;

    loop {
        let page = match api.list_items(playlist_id, page_token.as_deref()).await {
            Ok(page) => page,
            Err(source) => {
                warn!(pages_fetched, error = %source, "page request failed, discarding partial playlist");
                return Err(FetchError {
                    pages_fetched,
                    source,
                });
            }
        };
        pages_fetched += 1;
        debug!(page = pages_fetched, count = page.items.len(), "fetched page");
        items.extend(page.items);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(pages = pages_fetched, items = items.len(), "fetched playlist");
    Ok(items)
}
