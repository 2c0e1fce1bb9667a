use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::errors::{ApiErrorKind, PlaylistError};
use crate::models::{
    ApiErrorEnvelope, MoveOperation, PlaylistItemListResponse, PlaylistPage, UpdateItemBody,
};

pub const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const PLAYLIST_ITEMS_PATH: &str = "/playlistItems";

/// Largest page the playlistItems listing accepts.
pub const MAX_PAGE_SIZE: u32 = 50;

pub const DEFAULT_HEADERS: [(&str, &str); 1] = [("user-agent", "playlist-date-sorter/0.1")];

/// The remote playlist operations the sorter depends on.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    /// Lists one page. `page_token` is `None` for the first page.
    async fn list_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, PlaylistError>;

    /// Sets the position of one item.
    async fn move_item(&self, operation: &MoveOperation) -> Result<(), PlaylistError>;
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub access_token: String,
    pub base_url: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            access_token: String::new(),
            base_url: None,
        }
    }
}

#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(options: ClientOptions) -> Result<Self, PlaylistError> {
        let mut headers = HeaderMap::new();
        for (name, value) in DEFAULT_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", options.access_token))
            .map_err(|err| PlaylistError::Other(format!("access token is not a valid header: {err}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(PlaylistError::Request)?;

        let base_url = options
            .base_url
            .unwrap_or_else(|| API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self { client, base_url })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, PLAYLIST_ITEMS_PATH)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, PlaylistError> {
        let response = request.send().await.map_err(PlaylistError::Request)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(PlaylistError::Request)?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &bytes));
        }
        Ok(bytes.to_vec())
    }

    async fn request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PlaylistError> {
        let bytes = self.send(request).await?;
        serde_json::from_slice(&bytes).map_err(|err| PlaylistError::InvalidJson(err.to_string()))
    }
}

fn api_error(status: u16, body: &[u8]) -> PlaylistError {
    match serde_json::from_slice::<ApiErrorEnvelope>(body) {
        Ok(envelope) => PlaylistError::Api {
            kind: ApiErrorKind::from_status(status, envelope.error.reason()),
            status,
            message: envelope.error.message,
        },
        Err(_) => PlaylistError::Api {
            kind: ApiErrorKind::from_status(status, None),
            status,
            message: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}

#[async_trait]
impl PlaylistApi for YouTubeClient {
    #[instrument(skip(self))]
    async fn list_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, PlaylistError> {
        let mut query = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", MAX_PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let payload: PlaylistItemListResponse =
            self.request(self.client.get(self.endpoint()).query(&query)).await?;
        let items = payload
            .items
            .into_iter()
            .map(|resource| resource.into_item())
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = items.len(), has_next = payload.next_page_token.is_some(), "listed page");
        Ok(PlaylistPage {
            items,
            next_page_token: payload.next_page_token.filter(|token| !token.is_empty()),
        })
    }

    #[instrument(skip(self), fields(item_id = %operation.item_id, position = operation.target_position))]
    async fn move_item(&self, operation: &MoveOperation) -> Result<(), PlaylistError> {
        let body = UpdateItemBody::from_operation(operation);
        let request = self
            .client
            .put(self.endpoint())
            .query(&[("part", "snippet")])
            .json(&body);
        self.send(request).await.map(|_| ())
    }
}
