//! Circular player queue: roster edits, selection and fault rotation.
//!
//! Index 0 is always the player about to act.

use serde::{Deserialize, Serialize};

use crate::engine::history::{new_id, record_action, EntryDetail};
use crate::engine::models::*;

/// What selecting a player does to the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Selection only moves the focus pointer.
    #[default]
    Display,
    /// Selection also rotates the queue so the selected player is current.
    Rotate,
}

pub fn position_of(players: &[Player], id: &str) -> Option<usize> {
    players.iter().position(|p| p.id == id)
}

/// New order after the player at `faulting` commits a fault.
///
/// Starting from the faulting player's predecessor, walk the circle once
/// skipping the faulting player, then append them last.
pub fn fault_order(players: &[Player], faulting: usize) -> Vec<Player> {
    let n = players.len();
    let prev = (faulting + n - 1) % n;
    let mut order = Vec::with_capacity(n);
    for step in 0..n {
        let i = (prev + step) % n;
        if i != faulting {
            order.push(players[i].clone());
        }
    }
    order.push(players[faulting].clone());
    order
}

/// Rotate so `index` becomes the head, keeping circular order.
pub fn rotate_to_front(players: &mut [Player], index: usize) {
    if index < players.len() {
        players.rotate_left(index);
    }
}

pub fn add_player(state: &GameState, name: &str) -> TransitionResult {
    if name.is_empty() {
        tracing::debug!("ignoring player with empty name");
        return TransitionResult::unchanged(state);
    }
    let mut id = new_id();
    while state.player(&id).is_some() {
        id = new_id();
    }
    let mut new_state = state.clone();
    new_state.players.push(Player {
        id,
        name: name.to_string(),
        score: 0,
    });
    TransitionResult::updated(new_state)
}

pub fn remove_player(state: &GameState, player_id: &str) -> TransitionResult {
    let Some(index) = position_of(&state.players, player_id) else {
        tracing::debug!(player_id, "remove: unknown player");
        return TransitionResult::unchanged(state);
    };
    let mut new_state = state.clone();
    new_state.players.remove(index);
    if new_state.selected_player_id.as_deref() == Some(player_id) {
        new_state.selected_player_id = None;
    }
    TransitionResult::updated(new_state)
}

pub fn select_player(state: &GameState, player_id: Option<&str>, mode: SelectionMode) -> TransitionResult {
    let Some(player_id) = player_id else {
        if state.selected_player_id.is_none() {
            return TransitionResult::unchanged(state);
        }
        let mut new_state = state.clone();
        new_state.selected_player_id = None;
        return TransitionResult::updated(new_state);
    };

    let Some(index) = position_of(&state.players, player_id) else {
        tracing::debug!(player_id, "select: unknown player");
        return TransitionResult::unchanged(state);
    };
    let mut new_state = state.clone();
    new_state.selected_player_id = Some(player_id.to_string());
    if mode == SelectionMode::Rotate {
        rotate_to_front(&mut new_state.players, index);
    }
    TransitionResult::updated(new_state)
}

/// Move the faulting player to the tail; their predecessor becomes current.
pub fn apply_fault(state: &GameState, player_id: &str) -> TransitionResult {
    if state.players.len() < 2 {
        tracing::debug!(players = state.players.len(), "fault: not enough players to rotate");
        return TransitionResult::unchanged(state);
    }
    let Some(faulting) = position_of(&state.players, player_id) else {
        tracing::debug!(player_id, "fault: unknown player");
        return TransitionResult::unchanged(state);
    };

    let mut new_state = state.clone();
    new_state.players = fault_order(&state.players, faulting);
    let affected = vec![AffectedPlayer::of(&state.players[faulting], 0)];
    record_action(&mut new_state, ActionType::Fault, affected, EntryDetail::default());
    TransitionResult::recorded(new_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[&str]) -> Vec<Player> {
        ids.iter()
            .map(|id| Player { id: id.to_string(), name: id.to_string(), score: 0 })
            .collect()
    }

    fn ids(players: &[Player]) -> Vec<&str> {
        players.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_fault_order_middle() {
        let players = roster(&["A", "B", "C", "D"]);
        assert_eq!(ids(&fault_order(&players, 2)), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_fault_order_head_and_tail() {
        let players = roster(&["A", "B", "C", "D"]);
        assert_eq!(ids(&fault_order(&players, 0)), vec!["D", "B", "C", "A"]);
        assert_eq!(ids(&fault_order(&players, 3)), vec!["C", "A", "B", "D"]);
        let pair = roster(&["A", "B"]);
        assert_eq!(ids(&fault_order(&pair, 0)), vec!["B", "A"]);
        assert_eq!(ids(&fault_order(&pair, 1)), vec!["A", "B"]);
    }

    #[test]
    fn test_fault_order_preserves_circular_order() {
        for n in 2..8usize {
            let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
            let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
            let players = roster(&refs);
            for f in 0..n {
                let order = fault_order(&players, f);
                assert_eq!(order.len(), n);
                assert_eq!(order[n - 1].id, players[f].id);
                let prev = (f + n - 1) % n;
                let expected: Vec<&str> = (0..n)
                    .map(|k| (prev + k) % n)
                    .filter(|&i| i != f)
                    .map(|i| refs[i])
                    .collect();
                assert_eq!(ids(&order[..n - 1]), expected);
            }
        }
    }

    #[test]
    fn test_apply_fault_records_entry() {
        let state = GameState { players: roster(&["A", "B", "C", "D"]), ..Default::default() };
        let result = apply_fault(&state, "C");
        assert!(result.changed);
        assert_eq!(ids(&result.state.players), vec!["B", "D", "A", "C"]);
        let action = result.action.unwrap();
        assert_eq!(action.action_type, ActionType::Fault);
        assert_eq!(action.affected_players, vec![AffectedPlayer::of(&state.players[2], 0)]);
        assert_eq!(action.snapshot.as_ref().unwrap().players, result.state.players);
        assert_eq!(result.state.total_score(), 0);
    }

    #[test]
    fn test_apply_fault_noops() {
        let single = GameState { players: roster(&["A"]), ..Default::default() };
        assert!(!apply_fault(&single, "A").changed);
        let pair = GameState { players: roster(&["A", "B"]), ..Default::default() };
        let result = apply_fault(&pair, "Z");
        assert!(!result.changed);
        assert!(result.state.history.is_empty());
    }

    #[test]
    fn test_add_and_remove() {
        let state = GameState::default();
        let state = add_player(&state, "An").state;
        let state = add_player(&state, "Bình").state;
        assert!(!add_player(&state, "").changed);
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[1].name, "Bình");
        assert_eq!(state.players[1].score, 0);
        assert_ne!(state.players[0].id, state.players[1].id);

        let second = state.players[1].id.clone();
        let selected = select_player(&state, Some(&second), SelectionMode::Display).state;
        let removed = remove_player(&selected, &second);
        assert!(removed.changed);
        assert_eq!(removed.state.players.len(), 1);
        assert_eq!(removed.state.selected_player_id, None);
        assert!(!remove_player(&removed.state, "missing").changed);
    }

    #[test]
    fn test_select_modes() {
        let state = GameState { players: roster(&["A", "B", "C"]), ..Default::default() };

        let shown = select_player(&state, Some("C"), SelectionMode::Display).state;
        assert_eq!(shown.selected_player_id.as_deref(), Some("C"));
        assert_eq!(ids(&shown.players), vec!["A", "B", "C"]);

        let rotated = select_player(&state, Some("C"), SelectionMode::Rotate).state;
        assert_eq!(ids(&rotated.players), vec!["C", "A", "B"]);

        let cleared = select_player(&shown, None, SelectionMode::Display);
        assert!(cleared.changed);
        assert_eq!(cleared.state.selected_player_id, None);
        assert!(!select_player(&state, Some("Z"), SelectionMode::Rotate).changed);
    }
}
