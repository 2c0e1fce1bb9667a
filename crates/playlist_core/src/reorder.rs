use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::client::PlaylistApi;
use crate::errors::MoveError;
use crate::models::MoveOperation;
use crate::ordering::DesiredOrder;

/// The attempt for one item and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub operation: MoveOperation,
    pub title: String,
    pub result: Result<(), MoveError>,
}

impl MoveOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub type MoveCallback = Arc<dyn Fn(&MoveOutcome) + Send + Sync + 'static>;

/// Per-item trail of one apply pass, in the order the moves were issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub playlist_id: String,
    pub outcomes: Vec<MoveOutcome>,
}

impl MoveReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &MoveOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &MoveOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_complete_success(&self) -> bool {
        self.outcomes.iter().all(MoveOutcome::is_success)
    }
}

/// Issues one move per item, ascending by target position, each awaited
/// before the next. A failed move is recorded and the pass continues.
#[instrument(skip(api, order, on_outcome), fields(items = order.len()))]
pub async fn apply_order<A>(
    api: &A,
    playlist_id: &str,
    order: &DesiredOrder,
    on_outcome: Option<&MoveCallback>,
) -> MoveReport
where
    A: PlaylistApi + ?Sized,
{
    let mut outcomes = Vec::with_capacity(order.len());

    for (operation, item) in order
        .move_operations(playlist_id)
        .into_iter()
        .zip(order.items())
    {
        let result = api.move_item(&operation).await.map_err(MoveError::from);
        match &result {
            Ok(()) => debug!(
                item_id = %operation.item_id,
                position = operation.target_position,
                "moved item"
            ),
            Err(err) => warn!(
                item_id = %operation.item_id,
                position = operation.target_position,
                error = %err,
                "move failed"
            ),
        }

        let outcome = MoveOutcome {
            operation,
            title: item.title.clone(),
            result,
        };
        if let Some(callback) = on_outcome {
            callback(&outcome);
        }
        outcomes.push(outcome);
    }

    let report = MoveReport {
        playlist_id: playlist_id.to_string(),
        outcomes,
    };
    info!(
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "apply pass finished"
    );
    report
}
