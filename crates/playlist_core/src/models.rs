use serde::{Deserialize, Serialize};

use crate::errors::PlaylistError;

/// One placement of a video inside a playlist, as observed at fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    /// Identifies this placement within the playlist.
    pub item_id: String,
    /// Identifies the underlying video; stable across reorderings.
    pub video_id: String,
    pub title: String,
    /// Position reported by the remote. Advisory only.
    pub current_position: u32,
}

/// The unit of work sent to the remote reorder interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOperation {
    pub item_id: String,
    pub video_id: String,
    pub playlist_id: String,
    pub target_position: u32,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItemResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemResource {
    pub id: String,
    pub snippet: ItemSnippet,
    #[serde(default)]
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    #[serde(default)]
    pub video_id: Option<String>,
}

impl PlaylistItemResource {
    pub fn resolve_video_id(&self) -> Option<String> {
        self.content_details
            .as_ref()
            .and_then(|details| details.video_id.clone())
            .or_else(|| {
                self.snippet
                    .resource_id
                    .as_ref()
                    .and_then(|resource| resource.video_id.clone())
            })
            .filter(|id| !id.trim().is_empty())
    }

    pub fn into_item(self) -> Result<PlaylistItem, PlaylistError> {
        let video_id = self.resolve_video_id().ok_or_else(|| {
            PlaylistError::InvalidJson(format!("playlist item {} has no videoId", self.id))
        })?;
        Ok(PlaylistItem {
            item_id: self.id,
            video_id,
            title: self.snippet.title,
            current_position: self.snippet.position,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemBody<'a> {
    pub id: &'a str,
    pub snippet: UpdateSnippet<'a>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSnippet<'a> {
    pub playlist_id: &'a str,
    pub position: u32,
    pub resource_id: ResourceId,
}

impl<'a> UpdateItemBody<'a> {
    pub fn from_operation(operation: &'a MoveOperation) -> Self {
        Self {
            id: &operation.item_id,
            snippet: UpdateSnippet {
                playlist_id: &operation.playlist_id,
                position: operation.target_position,
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: Some(operation.video_id.clone()),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorBody {
    pub fn reason(&self) -> Option<&str> {
        self.errors.iter().find_map(|detail| detail.reason.as_deref())
    }
}
