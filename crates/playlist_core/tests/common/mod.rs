#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use playlist_core::{
    ApiErrorKind, MoveOperation, PlaylistApi, PlaylistError, PlaylistItem, PlaylistPage,
};

pub type TestResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

pub fn item(id: &str, title: &str, position: u32) -> PlaylistItem {
    PlaylistItem {
        item_id: format!("item-{id}"),
        video_id: format!("video-{id}"),
        title: title.to_string(),
        current_position: position,
    }
}

pub fn items_from_titles(titles: &[&str]) -> Vec<PlaylistItem> {
    titles
        .iter()
        .enumerate()
        .map(|(index, title)| item(&index.to_string(), title, index as u32))
        .collect()
}

pub fn titles(items: &[PlaylistItem]) -> Vec<&str> {
    items.iter().map(|item| item.title.as_str()).collect()
}

pub fn page(items: Vec<PlaylistItem>, next: Option<&str>) -> PlaylistPage {
    PlaylistPage {
        items,
        next_page_token: next.map(str::to_string),
    }
}

pub fn server_error() -> PlaylistError {
    PlaylistError::Api {
        kind: ApiErrorKind::Transient,
        status: 503,
        message: "backend unavailable".to_string(),
    }
}

/// Replays scripted pages in order and records every call it receives.
#[derive(Default)]
pub struct ScriptedApi {
    pages: Mutex<VecDeque<Result<PlaylistPage, PlaylistError>>>,
    failing_items: HashSet<String>,
    pub page_requests: Mutex<Vec<Option<String>>>,
    pub moves: Mutex<Vec<MoveOperation>>,
}

impl ScriptedApi {
    pub fn new(pages: Vec<Result<PlaylistPage, PlaylistError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    pub fn failing_moves_for(mut self, item_ids: &[&str]) -> Self {
        self.failing_items = item_ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn recorded_moves(&self) -> Vec<MoveOperation> {
        self.moves.lock().unwrap().clone()
    }

    pub fn recorded_page_requests(&self) -> Vec<Option<String>> {
        self.page_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaylistApi for ScriptedApi {
    async fn list_items(
        &self,
        _playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage, PlaylistError> {
        self.page_requests
            .lock()
            .unwrap()
            .push(page_token.map(str::to_string));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PlaylistError::Other("unexpected page request".into())))
    }

    async fn move_item(&self, operation: &MoveOperation) -> Result<(), PlaylistError> {
        self.moves.lock().unwrap().push(operation.clone());
        if self.failing_items.contains(&operation.item_id) {
            return Err(PlaylistError::Api {
                kind: ApiErrorKind::Permanent,
                status: 404,
                message: format!("{} not found", operation.item_id),
            });
        }
        Ok(())
    }
}
