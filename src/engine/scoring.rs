//! Zero-sum point transfers, the one-shot double multiplier and resets.

use crate::engine::history::{record_action, EntryDetail};
use crate::engine::models::*;
use crate::engine::queue::position_of;

/// Points actually moved once the multiplier is applied. `None` on overflow.
pub fn effective_points(state: &GameState, base_points: i64) -> Option<i64> {
    if state.double_multiplier {
        base_points.checked_mul(2)
    } else {
        Some(base_points)
    }
}

fn adjust(player: &mut Player, delta: i64) -> Option<()> {
    player.score = player.score.checked_add(delta)?;
    Some(())
}

fn overflowed(state: &GameState, op: &str, base_points: i64) -> TransitionResult {
    tracing::warn!(op, base_points, "score arithmetic overflowed, ignoring");
    TransitionResult::unchanged(state)
}

/// The scorer takes `points` from the player right before them in the queue.
pub fn record_score(state: &GameState, scorer_id: &str, base_points: i64) -> TransitionResult {
    if base_points <= 0 {
        tracing::debug!(base_points, "score: non-positive points");
        return TransitionResult::unchanged(state);
    }
    let Some(scorer) = position_of(&state.players, scorer_id) else {
        tracing::debug!(scorer_id, "score: unknown player");
        return TransitionResult::unchanged(state);
    };
    let n = state.players.len();
    let previous = (scorer + n - 1) % n;
    let mut new_state = state.clone();
    let moved = effective_points(state, base_points).and_then(|points| {
        adjust(&mut new_state.players[scorer], points)?;
        adjust(&mut new_state.players[previous], -points)?;
        Some(points)
    });
    let Some(points) = moved else {
        return overflowed(state, "score", base_points);
    };
    new_state.double_multiplier = false;

    let affected = vec![
        AffectedPlayer::of(&new_state.players[scorer], points),
        AffectedPlayer::of(&new_state.players[previous], -points),
    ];
    let detail = EntryDetail {
        points: Some(points),
        doubled: state.double_multiplier,
        new_game: false,
    };
    record_action(&mut new_state, ActionType::Score, affected, detail);
    TransitionResult::recorded(new_state)
}

/// The scorer takes `points` from every other player.
pub fn record_take_from_all(state: &GameState, scorer_id: &str, base_points: i64) -> TransitionResult {
    if base_points <= 0 {
        tracing::debug!(base_points, "take-from-all: non-positive points");
        return TransitionResult::unchanged(state);
    }
    let Some(scorer) = position_of(&state.players, scorer_id) else {
        tracing::debug!(scorer_id, "take-from-all: unknown player");
        return TransitionResult::unchanged(state);
    };
    let others = state.players.len() as i64 - 1;
    let mut new_state = state.clone();
    let moved = effective_points(state, base_points).and_then(|points| {
        let total_gain = points.checked_mul(others)?;
        for (i, player) in new_state.players.iter_mut().enumerate() {
            adjust(player, if i == scorer { total_gain } else { -points })?;
        }
        Some((points, total_gain))
    });
    let Some((points, total_gain)) = moved else {
        return overflowed(state, "take-from-all", base_points);
    };

    let mut affected = Vec::with_capacity(state.players.len());
    affected.push(AffectedPlayer::of(&new_state.players[scorer], total_gain));
    affected.extend(
        new_state
            .players
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != scorer)
            .map(|(_, p)| AffectedPlayer::of(p, -points)),
    );
    new_state.double_multiplier = false;

    let detail = EntryDetail {
        points: Some(points),
        doubled: state.double_multiplier,
        new_game: false,
    };
    record_action(&mut new_state, ActionType::TakeFromAll, affected, detail);
    TransitionResult::recorded(new_state)
}

pub fn toggle_double_multiplier(state: &GameState) -> TransitionResult {
    let mut new_state = state.clone();
    new_state.double_multiplier = !state.double_multiplier;
    TransitionResult::updated(new_state)
}

/// Zero every score, logging the delta each player needed to get there.
fn zero_scores(state: &GameState, new_game: bool) -> GameState {
    let affected = state
        .players
        .iter()
        .map(|p| AffectedPlayer::of(p, -p.score))
        .collect();
    let mut new_state = state.clone();
    for player in &mut new_state.players {
        player.score = 0;
    }
    let detail = EntryDetail {
        points: None,
        doubled: false,
        new_game,
    };
    record_action(&mut new_state, ActionType::Reset, affected, detail);
    new_state
}

pub fn reset_all_players(state: &GameState) -> TransitionResult {
    TransitionResult::recorded(zero_scores(state, false))
}

/// Same as a reset, and also drops the selection.
pub fn start_new_game(state: &GameState) -> TransitionResult {
    let mut new_state = zero_scores(state, true);
    new_state.selected_player_id = None;
    new_state.last_rollback_index = None;
    TransitionResult::recorded(new_state)
}
