//! Core data types for a score-keeping session.
//!
//! Field names on the wire are camelCase so a stored record round-trips
//! with the layout the web client has always written.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

pub type PlayerId = String;
pub type ActionId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub score: i64,
}

/// Named point tables. The label is the ball combination, the points are
/// what each of those balls is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringPreset {
    #[serde(rename = "3-6-9")]
    ThreeSixNine,
    #[serde(rename = "5-9")]
    FiveNine,
    #[serde(rename = "5-10")]
    FiveTen,
    #[serde(rename = "4-7-10")]
    FourSevenTen,
    #[serde(rename = "custom")]
    Custom,
}

impl ScoringPreset {
    pub const ALL: [ScoringPreset; 5] = [
        ScoringPreset::ThreeSixNine,
        ScoringPreset::FiveNine,
        ScoringPreset::FiveTen,
        ScoringPreset::FourSevenTen,
        ScoringPreset::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScoringPreset::ThreeSixNine => "3-6-9",
            ScoringPreset::FiveNine => "5-9",
            ScoringPreset::FiveTen => "5-10",
            ScoringPreset::FourSevenTen => "4-7-10",
            ScoringPreset::Custom => "custom",
        }
    }

    /// Canonical points. For `Custom` this is only the starting template.
    pub fn default_points(self) -> &'static [i64] {
        match self {
            ScoringPreset::ThreeSixNine | ScoringPreset::FourSevenTen => &[1, 2, 3],
            ScoringPreset::FiveNine | ScoringPreset::FiveTen => &[1, 2],
            ScoringPreset::Custom => &[1, 2, 3],
        }
    }

    /// Number of tiers a named preset must have; `None` for custom.
    pub fn arity(self) -> Option<usize> {
        match self {
            ScoringPreset::Custom => None,
            other => Some(other.default_points().len()),
        }
    }
}

impl fmt::Display for ScoringPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScoringPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScoringPreset::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown scoring preset: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ScoringConfigError {
    #[display("point values must be positive, got {_0}")]
    NonPositivePoint(#[error(not(source))] i64),
    #[display("preset {preset} expects {expected} point values, got {actual}")]
    WrongArity {
        preset: ScoringPreset,
        expected: usize,
        actual: usize,
    },
    #[display("custom scoring needs at least one point value")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub preset: ScoringPreset,
    pub points: Vec<i64>,
}

impl ScoringConfig {
    pub fn for_preset(preset: ScoringPreset) -> Self {
        Self {
            preset,
            points: preset.default_points().to_vec(),
        }
    }

    pub fn custom(points: Vec<i64>) -> Self {
        Self {
            preset: ScoringPreset::Custom,
            points,
        }
    }

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if let Some(&bad) = self.points.iter().find(|&&p| p <= 0) {
            return Err(ScoringConfigError::NonPositivePoint(bad));
        }
        match self.preset.arity() {
            Some(expected) if expected != self.points.len() => Err(ScoringConfigError::WrongArity {
                preset: self.preset,
                expected,
                actual: self.points.len(),
            }),
            None if self.points.is_empty() => Err(ScoringConfigError::Empty),
            _ => Ok(()),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::for_preset(ScoringPreset::ThreeSixNine)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    #[serde(default)]
    pub enable_double_loser: bool,
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_double_loser: Option<bool>,
}

impl GameSettings {
    pub fn merged(&self, patch: &SettingsPatch) -> GameSettings {
        GameSettings {
            enable_double_loser: patch.enable_double_loser.unwrap_or(self.enable_double_loser),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    Score,
    Fault,
    Reset,
    TakeFromAll,
    DoubleLoser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedPlayer {
    pub player_id: PlayerId,
    pub player_name: String,
    pub score_delta: i64,
}

impl AffectedPlayer {
    pub fn of(player: &Player, score_delta: i64) -> Self {
        Self {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            score_delta,
        }
    }
}

/// Live state captured right after an action was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSnapshot {
    pub players: Vec<Player>,
    #[serde(default)]
    pub double_multiplier: bool,
}

/// One history entry. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAction {
    pub id: ActionId,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub affected_players: Vec<AffectedPlayer>,
    #[serde(default)]
    pub snapshot: Option<ActionSnapshot>,
    /// Points moved per transfer, after the multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(default)]
    pub doubled: bool,
    #[serde(default)]
    pub new_game: bool,
}

impl GameAction {
    /// Net effect of the entry across all affected players.
    pub fn delta_sum(&self) -> i64 {
        self.affected_players.iter().map(|a| a.score_delta).sum()
    }

    pub fn actor(&self) -> Option<&AffectedPlayer> {
        self.affected_players.first()
    }
}

/// The aggregate root. Missing fields in a stored record fall back to the
/// same values a fresh session starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub players: Vec<Player>,
    pub scoring_config: ScoringConfig,
    /// Newest first.
    pub history: VecDeque<Arc<GameAction>>,
    pub is_game_active: bool,
    pub selected_player_id: Option<PlayerId>,
    pub settings: GameSettings,
    pub double_multiplier: bool,
    pub last_rollback_index: Option<usize>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            players: Vec::new(),
            scoring_config: ScoringConfig::default(),
            history: VecDeque::new(),
            is_game_active: false,
            selected_player_id: None,
            settings: GameSettings::default(),
            double_multiplier: false,
            last_rollback_index: None,
        }
    }
}

impl GameState {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.first()
    }

    pub fn action(&self, id: &str) -> Option<(usize, &Arc<GameAction>)> {
        self.history.iter().enumerate().find(|(_, a)| a.id == id)
    }

    pub fn total_score(&self) -> i64 {
        self.players.iter().map(|p| p.score).sum()
    }
}

/// Outcome of one command. `changed == false` means the command was a
/// no-op and `state` equals the input.
#[derive(Debug, Clone)]
pub struct TransitionResult {
    pub state: GameState,
    pub action: Option<Arc<GameAction>>,
    pub changed: bool,
}

impl TransitionResult {
    pub fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            action: None,
            changed: false,
        }
    }

    /// A change that did not produce a history entry.
    pub fn updated(state: GameState) -> Self {
        Self {
            state,
            action: None,
            changed: true,
        }
    }

    /// A change whose history entry is the newest one in `state`.
    pub fn recorded(state: GameState) -> Self {
        let action = state.history.front().cloned();
        Self {
            state,
            action,
            changed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_wire_names() {
        let json = serde_json::to_string(&ScoringPreset::FourSevenTen).unwrap();
        assert_eq!(json, "\"4-7-10\"");
        let parsed: ScoringPreset = serde_json::from_str("\"5-9\"").unwrap();
        assert_eq!(parsed, ScoringPreset::FiveNine);
        assert_eq!("3-6-9".parse::<ScoringPreset>().unwrap(), ScoringPreset::ThreeSixNine);
        assert!("7-8".parse::<ScoringPreset>().is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(ScoringConfig::default().validate().is_ok());
        assert!(ScoringConfig::for_preset(ScoringPreset::FiveTen).validate().is_ok());
        assert!(ScoringConfig::custom(vec![2, 5, 7, 11]).validate().is_ok());

        let wrong = ScoringConfig {
            preset: ScoringPreset::FiveNine,
            points: vec![1, 2, 3],
        };
        assert_eq!(
            wrong.validate(),
            Err(ScoringConfigError::WrongArity {
                preset: ScoringPreset::FiveNine,
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(
            ScoringConfig::custom(vec![1, 0]).validate(),
            Err(ScoringConfigError::NonPositivePoint(0))
        );
        assert_eq!(ScoringConfig::custom(vec![]).validate(), Err(ScoringConfigError::Empty));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let state: GameState = serde_json::from_str(r#"{"players":[{"id":"a","name":"An","score":4}]}"#).unwrap();
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.scoring_config, ScoringConfig::default());
        assert!(state.history.is_empty());
        assert!(!state.is_game_active);
        assert_eq!(state.selected_player_id, None);
        assert!(!state.settings.enable_double_loser);
        assert!(!state.double_multiplier);
        assert_eq!(state.last_rollback_index, None);
    }

    #[test]
    fn test_wire_layout_is_camel_case() {
        let mut state = GameState::default();
        state.is_game_active = true;
        state.selected_player_id = Some("a".into());
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["isGameActive"], true);
        assert_eq!(value["selectedPlayerId"], "a");
        assert_eq!(value["scoringConfig"]["preset"], "3-6-9");
        assert_eq!(value["settings"]["enableDoubleLoser"], false);
        assert!(value["lastRollbackIndex"].is_null());
    }

    #[test]
    fn test_settings_patch_merge() {
        let settings = GameSettings::default();
        let on = settings.merged(&SettingsPatch { enable_double_loser: Some(true) });
        assert!(on.enable_double_loser);
        assert_eq!(on.merged(&SettingsPatch::default()), on);
    }
}
