pub mod auth;
pub mod client;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod ordering;
pub mod reorder;
pub mod sort;
pub mod timestamp;

pub use auth::{AccessToken, Authenticator, ClientSecrets, InstalledAppFlow, StaticToken};
pub use client::{ClientOptions, PlaylistApi, YouTubeClient, MAX_PAGE_SIZE};
pub use errors::{ApiErrorKind, AuthError, FetchError, MoveError, PlaylistError, SortError};
pub use fetch::fetch_playlist;
pub use models::{MoveOperation, PlaylistItem, PlaylistPage};
pub use ordering::{order_items, DesiredOrder, SortDirection};
pub use reorder::{apply_order, MoveCallback, MoveOutcome, MoveReport};
pub use sort::{run_sort, run_sort_blocking, sort_playlist, SortOptions, SortReport};
pub use timestamp::{extract_title_timestamp, parse_playlist_id};
