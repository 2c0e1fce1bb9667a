use chrono::NaiveDateTime;

use crate::models::{MoveOperation, PlaylistItem};
use crate::timestamp::extract_title_timestamp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Target order for a playlist. The index of each item is its target position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesiredOrder {
    items: Vec<PlaylistItem>,
    dated: usize,
}

impl DesiredOrder {
    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<PlaylistItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose title carried a valid timestamp. They occupy the leading positions.
    pub fn dated_count(&self) -> usize {
        self.dated
    }

    pub fn undated_count(&self) -> usize {
        self.items.len() - self.dated
    }

    /// True when every fetched position already equals its target position.
    pub fn is_already_ordered(&self) -> bool {
        self.items
            .iter()
            .enumerate()
            .all(|(index, item)| item.current_position as usize == index)
    }

    /// One operation per item, ascending by target position.
    pub fn move_operations(&self, playlist_id: &str) -> Vec<MoveOperation> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| MoveOperation {
                item_id: item.item_id.clone(),
                video_id: item.video_id.clone(),
                playlist_id: playlist_id.to_string(),
                target_position: index as u32,
            })
            .collect()
    }
}

/// Dated items first, in chronological order, then undated items in fetched order.
///
/// Both the partition and the sort are stable, so items sharing a timestamp
/// keep their relative order. Undated items are never compared against dated
/// ones.
pub fn order_items(items: Vec<PlaylistItem>, direction: SortDirection) -> DesiredOrder {
    let mut dated: Vec<(NaiveDateTime, PlaylistItem)> = Vec::new();
    let mut undated: Vec<PlaylistItem> = Vec::new();

    for item in items {
        match extract_title_timestamp(&item.title) {
            Some(timestamp) => dated.push((timestamp, item)),
            None => undated.push(item),
        }
    }

    match direction {
        SortDirection::OldestFirst => dated.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDirection::NewestFirst => dated.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    let dated_count = dated.len();
    let mut ordered: Vec<PlaylistItem> = dated.into_iter().map(|(_, item)| item).collect();
    ordered.extend(undated);

    DesiredOrder {
        items: ordered,
        dated: dated_count,
    }
}
