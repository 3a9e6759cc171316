//! History log: entry stamping, recording, rollback and clearing.
//!
//! The log is append-to-front and is never rewritten by rollback; only
//! the live roster and multiplier travel back in time.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use derive_more::{Display, Error};
use uuid::Uuid;

use crate::engine::models::*;

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RollbackError {
    #[display("no history entry with id {action_id}")]
    UnknownAction { action_id: ActionId },
    #[display("history entry {action_id} has no snapshot")]
    MissingSnapshot { action_id: ActionId },
    #[display("history entry {action_id} has a snapshot with duplicate player {player_id}")]
    InvalidSnapshot { action_id: ActionId, player_id: PlayerId },
}

/// Random v4 UUID, the id format the web client writes.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Wall-clock millis, never older than the newest entry already logged.
pub fn next_timestamp(history: &VecDeque<Arc<GameAction>>) -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    match history.front() {
        Some(newest) => now.max(newest.timestamp),
        None => now,
    }
}

/// What a new entry says beyond its type and affected players.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryDetail {
    pub points: Option<i64>,
    pub doubled: bool,
    pub new_game: bool,
}

/// Prepend an entry describing the mutation already applied to `state`.
/// The snapshot is taken from `state` as it is now.
pub fn record_action(
    state: &mut GameState,
    action_type: ActionType,
    affected_players: Vec<AffectedPlayer>,
    detail: EntryDetail,
) {
    let action = GameAction {
        id: new_id(),
        timestamp: next_timestamp(&state.history),
        action_type,
        affected_players,
        snapshot: Some(ActionSnapshot {
            players: state.players.clone(),
            double_multiplier: state.double_multiplier,
        }),
        points: detail.points,
        doubled: detail.doubled,
        new_game: detail.new_game,
    };
    tracing::debug!(
        action_id = %action.id,
        action_type = ?action.action_type,
        affected = action.affected_players.len(),
        "recorded history entry"
    );
    state.history.push_front(Arc::new(action));
    // every index just shifted by one
    state.last_rollback_index = None;
}

fn check_snapshot(action: &GameAction) -> Result<&ActionSnapshot, RollbackError> {
    let snapshot = action
        .snapshot
        .as_ref()
        .ok_or_else(|| RollbackError::MissingSnapshot {
            action_id: action.id.clone(),
        })?;
    let mut seen = HashSet::new();
    for player in &snapshot.players {
        if !seen.insert(player.id.as_str()) {
            return Err(RollbackError::InvalidSnapshot {
                action_id: action.id.clone(),
                player_id: player.id.clone(),
            });
        }
    }
    Ok(snapshot)
}

/// Restore roster and multiplier from the entry's snapshot.
pub fn rollback_to_action(state: &GameState, action_id: &str) -> Result<GameState, RollbackError> {
    let (index, action) = state
        .action(action_id)
        .ok_or_else(|| RollbackError::UnknownAction {
            action_id: action_id.to_string(),
        })?;
    let snapshot = check_snapshot(action)?;

    let mut new_state = state.clone();
    new_state.players = snapshot.players.clone();
    new_state.double_multiplier = snapshot.double_multiplier;
    new_state.last_rollback_index = Some(index);
    if let Some(selected) = &state.selected_player_id {
        if new_state.player(selected).is_none() {
            new_state.selected_player_id = None;
        }
    }
    Ok(new_state)
}

/// Empty the log. The rollback marker goes too since it indexes the log.
pub fn clear_history(state: &GameState) -> TransitionResult {
    if state.history.is_empty() && state.last_rollback_index.is_none() {
        return TransitionResult::unchanged(state);
    }
    let mut new_state = state.clone();
    new_state.history.clear();
    new_state.last_rollback_index = None;
    TransitionResult::updated(new_state)
}
