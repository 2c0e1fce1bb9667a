use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::errors::PlaylistError;

lazy_static! {
    static ref TITLE_TIMESTAMP: Regex = Regex::new(
        r"([0-9]{4})\s+([0-9]{2})\s+([0-9]{2})\s+([0-9]{2})\s+([0-9]{2})\s+([0-9]{2})"
    )
    .expect("title timestamp regex");
}

/// Finds the first `YYYY MM DD HH MM SS` group in `title`.
///
/// Returns `None` when no such group exists, or when the first group does not
/// form a valid calendar timestamp (month 13, day 32, year 0 and the like).
/// Later groups are never consulted.
pub fn extract_title_timestamp(title: &str) -> Option<NaiveDateTime> {
    let captures = TITLE_TIMESTAMP.captures(title)?;
    let field = |index: usize| -> Option<u32> { captures.get(index)?.as_str().parse().ok() };

    let year = field(1)?;
    if year == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, field(2)?, field(3)?)?.and_hms_opt(
        field(4)?,
        field(5)?,
        field(6)?,
    )
}

fn is_valid_playlist_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Accepts a bare playlist ID or any URL carrying a `list=` query parameter.
pub fn parse_playlist_id(input: &str) -> Result<String, PlaylistError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PlaylistError::InvalidPlaylist(
            "playlist reference is empty".to_string(),
        ));
    }

    let Ok(url) = Url::parse(trimmed) else {
        if is_valid_playlist_id(trimmed) {
            return Ok(trimmed.to_string());
        }
        return Err(PlaylistError::InvalidPlaylist(format!(
            "playlist ID contains illegal characters: {trimmed}"
        )));
    };

    for (key, value) in url.query_pairs() {
        if key == "list" {
            let cleaned = value.trim();
            if is_valid_playlist_id(cleaned) {
                return Ok(cleaned.to_string());
            }
            return Err(PlaylistError::InvalidPlaylist(format!(
                "list parameter is invalid: {cleaned}"
            )));
        }
    }
    Err(PlaylistError::InvalidPlaylist(
        "no list parameter found in the URL query".to_string(),
    ))
}
