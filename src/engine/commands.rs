//! The command surface hosts drive the engine through.

use serde::{Deserialize, Serialize};

use crate::engine::config::EngineOptions;
use crate::engine::history::{clear_history, rollback_to_action};
use crate::engine::models::*;
use crate::engine::queue::{add_player, apply_fault, remove_player, select_player};
use crate::engine::scoring::{
    record_score, record_take_from_all, reset_all_players, start_new_game, toggle_double_multiplier,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddPlayer { name: String },
    RemovePlayer { player_id: PlayerId },
    SetScoringConfig { config: ScoringConfig },
    RecordScore { player_id: PlayerId, points: i64 },
    RecordTakeFromAll { player_id: PlayerId, points: i64 },
    ToggleDoubleMultiplier,
    RecordFault { player_id: PlayerId },
    ResetAllPlayers,
    StartGame,
    SelectPlayer {
        #[serde(default)]
        player_id: Option<PlayerId>,
    },
    UpdateSettings { settings: SettingsPatch },
    ClearHistory,
    StartNewGame,
    RollbackToAction { action_id: ActionId },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddPlayer { .. } => "add_player",
            Command::RemovePlayer { .. } => "remove_player",
            Command::SetScoringConfig { .. } => "set_scoring_config",
            Command::RecordScore { .. } => "record_score",
            Command::RecordTakeFromAll { .. } => "record_take_from_all",
            Command::ToggleDoubleMultiplier => "toggle_double_multiplier",
            Command::RecordFault { .. } => "record_fault",
            Command::ResetAllPlayers => "reset_all_players",
            Command::StartGame => "start_game",
            Command::SelectPlayer { .. } => "select_player",
            Command::UpdateSettings { .. } => "update_settings",
            Command::ClearHistory => "clear_history",
            Command::StartNewGame => "start_new_game",
            Command::RollbackToAction { .. } => "rollback_to_action",
        }
    }
}

pub fn set_scoring_config(state: &GameState, config: &ScoringConfig) -> TransitionResult {
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "rejecting scoring config");
        return TransitionResult::unchanged(state);
    }
    if &state.scoring_config == config {
        return TransitionResult::unchanged(state);
    }
    let mut new_state = state.clone();
    new_state.scoring_config = config.clone();
    TransitionResult::updated(new_state)
}

pub fn update_settings(state: &GameState, patch: &SettingsPatch) -> TransitionResult {
    let settings = state.settings.merged(patch);
    if settings == state.settings {
        return TransitionResult::unchanged(state);
    }
    let mut new_state = state.clone();
    new_state.settings = settings;
    TransitionResult::updated(new_state)
}

pub fn start_game(state: &GameState) -> TransitionResult {
    if state.is_game_active {
        return TransitionResult::unchanged(state);
    }
    let mut new_state = state.clone();
    new_state.is_game_active = true;
    TransitionResult::updated(new_state)
}

/// Apply one command. Unknown ids and other expected edge cases come back
/// as `changed == false` rather than errors.
pub fn apply_command(state: &GameState, command: &Command, options: &EngineOptions) -> TransitionResult {
    let result = match command {
        Command::AddPlayer { name } => add_player(state, name),
        Command::RemovePlayer { player_id } => remove_player(state, player_id),
        Command::SetScoringConfig { config } => set_scoring_config(state, config),
        Command::RecordScore { player_id, points } => record_score(state, player_id, *points),
        Command::RecordTakeFromAll { player_id, points } => record_take_from_all(state, player_id, *points),
        Command::ToggleDoubleMultiplier => toggle_double_multiplier(state),
        Command::RecordFault { player_id } => apply_fault(state, player_id),
        Command::ResetAllPlayers => reset_all_players(state),
        Command::StartGame => start_game(state),
        Command::SelectPlayer { player_id } => select_player(state, player_id.as_deref(), options.selection),
        Command::UpdateSettings { settings } => update_settings(state, settings),
        Command::ClearHistory => clear_history(state),
        Command::StartNewGame => start_new_game(state),
        Command::RollbackToAction { action_id } => match rollback_to_action(state, action_id) {
            Ok(new_state) => TransitionResult::updated(new_state),
            Err(e) => {
                tracing::error!(error = %e, "rollback failed");
                TransitionResult::unchanged(state)
            }
        },
    };
    tracing::debug!(
        command = command.name(),
        changed = result.changed,
        history = result.state.history.len(),
        "applied command"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::queue::SelectionMode;

    fn two_players() -> GameState {
        let opts = EngineOptions::default();
        let state = apply_command(&GameState::default(), &Command::AddPlayer { name: "An".into() }, &opts).state;
        apply_command(&state, &Command::AddPlayer { name: "Bảo".into() }, &opts).state
    }

    #[test]
    fn test_command_json_shape() {
        let cmd: Command =
            serde_json::from_str(r#"{"command":"record_score","player_id":"p1","points":3}"#).unwrap();
        assert_eq!(cmd, Command::RecordScore { player_id: "p1".into(), points: 3 });

        let cmd: Command = serde_json::from_str(r#"{"command":"select_player"}"#).unwrap();
        assert_eq!(cmd, Command::SelectPlayer { player_id: None });

        let json = serde_json::to_value(Command::ToggleDoubleMultiplier).unwrap();
        assert_eq!(json, serde_json::json!({"command": "toggle_double_multiplier"}));
    }

    #[test]
    fn test_scoring_config_rejects_invalid() {
        let state = GameState::default();
        let bad = ScoringConfig { preset: ScoringPreset::FiveTen, points: vec![1, 2, 3] };
        assert!(!set_scoring_config(&state, &bad).changed);

        let good = ScoringConfig::for_preset(ScoringPreset::FiveTen);
        let result = set_scoring_config(&state, &good);
        assert!(result.changed);
        assert_eq!(result.state.scoring_config.points, vec![1, 2]);
        assert!(result.state.history.is_empty());
    }

    #[test]
    fn test_settings_and_start() {
        let state = two_players();
        let opts = EngineOptions::default();
        let patch = SettingsPatch { enable_double_loser: Some(true) };
        let state = apply_command(&state, &Command::UpdateSettings { settings: patch.clone() }, &opts).state;
        assert!(state.settings.enable_double_loser);
        assert!(!apply_command(&state, &Command::UpdateSettings { settings: patch }, &opts).changed);

        let started = apply_command(&state, &Command::StartGame, &opts);
        assert!(started.changed);
        assert!(started.state.is_game_active);
        assert!(!apply_command(&started.state, &Command::StartGame, &opts).changed);
    }

    #[test]
    fn test_rollback_unknown_is_noop() {
        let state = two_players();
        let result = apply_command(
            &state,
            &Command::RollbackToAction { action_id: "missing".into() },
            &EngineOptions::default(),
        );
        assert!(!result.changed);
        assert_eq!(result.state, state);
    }

    #[test]
    fn test_selection_mode_comes_from_options() {
        let state = two_players();
        let second = state.players[1].id.clone();
        let opts = EngineOptions { selection: SelectionMode::Rotate };
        let result = apply_command(&state, &Command::SelectPlayer { player_id: Some(second.clone()) }, &opts);
        assert_eq!(result.state.players[0].id, second);
        assert_eq!(result.state.selected_player_id, Some(second));
    }
}
