//! Line-oriented front end: parses typed commands against the current
//! state and renders the queue and history as text.

use chrono::{Local, TimeZone};

use crate::engine::commands::Command;
use crate::engine::models::*;
use crate::i18n::{describe, t, Language, Text};

pub const HELP: &str = "\
commands:
  add <name>                 add a player to the end of the queue
  remove <player>            remove a player
  preset <3-6-9|5-9|5-10|4-7-10>
  custom <p1> [p2 ...]       custom point values
  double-loser on|off        allow the x2 action
  start                      start the game (needs 2 players)
  select <player>|none       focus a player
  score <player> <points>    take points from the previous player
  all <player> <points>      take points from every other player
  double                     arm x2 for the next score
  fault <player>             fault: move the player to the end
  reset                      zero all scores
  new                        start a new game
  rollback <entry>           restore the state after a history entry
  clear-history              forget the history
  show | history | lang <vi|en> | help | quit
players can be given by queue position, id or name; entries by number or id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(Command),
    Show,
    History,
    Language(Language),
    Help,
    Quit,
    Empty,
}

/// Find a player by 1-based queue position, exact id, or name.
pub fn resolve_player<'a>(state: &'a GameState, token: &str) -> Result<&'a Player, String> {
    if let Ok(position) = token.parse::<usize>() {
        if position >= 1 {
            if let Some(player) = state.players.get(position - 1) {
                return Ok(player);
            }
        }
    }
    if let Some(player) = state.player(token) {
        return Ok(player);
    }
    let lowered = token.to_lowercase();
    let mut matches = state.players.iter().filter(|p| p.name.to_lowercase() == lowered);
    match (matches.next(), matches.next()) {
        (Some(player), None) => Ok(player),
        (Some(_), Some(_)) => Err(format!("more than one player is named {token}")),
        _ => Err(format!("no player matches {token}")),
    }
}

/// Find a history entry by 1-based index (newest first) or id.
pub fn resolve_action<'a>(state: &'a GameState, token: &str) -> Result<&'a GameAction, String> {
    if let Ok(index) = token.parse::<usize>() {
        if index >= 1 {
            if let Some(action) = state.history.get(index - 1) {
                return Ok(action);
            }
        }
    }
    state
        .action(token)
        .map(|(_, a)| a.as_ref())
        .ok_or_else(|| format!("no history entry matches {token}"))
}

fn parse_points(token: Option<&str>) -> Result<i64, String> {
    let token = token.ok_or("missing points")?;
    match token.parse::<i64>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(format!("points must be a positive number, got {token}")),
    }
}

fn player_id(state: &GameState, token: Option<&str>) -> Result<PlayerId, String> {
    let token = token.ok_or("missing player")?;
    resolve_player(state, token).map(|p| p.id.clone())
}

/// Parse one input line. Guards the UI applies before a command reaches
/// the engine (start needs two players, x2 needs the setting) live here.
pub fn parse_line(line: &str, state: &GameState) -> Result<ConsoleInput, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match word.to_lowercase().as_str() {
        "" => return Ok(ConsoleInput::Empty),
        "help" | "?" => return Ok(ConsoleInput::Help),
        "quit" | "exit" => return Ok(ConsoleInput::Quit),
        "show" | "queue" => return Ok(ConsoleInput::Show),
        "history" => return Ok(ConsoleInput::History),
        "lang" => {
            let code = args.next().ok_or("missing language code")?;
            return code.parse().map(ConsoleInput::Language);
        }
        "add" => {
            if rest.is_empty() {
                return Err("missing player name".into());
            }
            Command::AddPlayer { name: rest.to_string() }
        }
        "remove" => Command::RemovePlayer { player_id: player_id(state, Some(rest).filter(|r| !r.is_empty()))? },
        "preset" => {
            let preset: ScoringPreset = args.next().ok_or("missing preset")?.parse()?;
            if preset == ScoringPreset::Custom {
                return Err("use `custom <points...>` for custom scoring".into());
            }
            Command::SetScoringConfig { config: ScoringConfig::for_preset(preset) }
        }
        "custom" => {
            let points = args.map(|a| parse_points(Some(a))).collect::<Result<Vec<_>, _>>()?;
            if points.is_empty() {
                return Err("missing points".into());
            }
            Command::SetScoringConfig { config: ScoringConfig::custom(points) }
        }
        "double-loser" => {
            let enabled = match args.next() {
                Some("on") => true,
                Some("off") => false,
                _ => return Err("expected on or off".into()),
            };
            Command::UpdateSettings {
                settings: SettingsPatch { enable_double_loser: Some(enabled) },
            }
        }
        "start" => {
            if state.players.len() < 2 {
                return Err(t(Language::En, Text::AddAtLeastPlayers).into());
            }
            Command::StartGame
        }
        "select" => match args.next() {
            None | Some("none") => Command::SelectPlayer { player_id: None },
            Some(token) => Command::SelectPlayer { player_id: Some(player_id(state, Some(token))?) },
        },
        "score" => {
            let player_id = player_id(state, args.next())?;
            Command::RecordScore { player_id, points: parse_points(args.next())? }
        }
        "all" => {
            let player_id = player_id(state, args.next())?;
            Command::RecordTakeFromAll { player_id, points: parse_points(args.next())? }
        }
        "double" => {
            if !state.settings.enable_double_loser {
                return Err("x2 is disabled, turn it on with `double-loser on`".into());
            }
            Command::ToggleDoubleMultiplier
        }
        "fault" => Command::RecordFault { player_id: player_id(state, args.next())? },
        "reset" => Command::ResetAllPlayers,
        "new" => Command::StartNewGame,
        "rollback" => {
            let token = args.next().ok_or("missing history entry")?;
            Command::RollbackToAction { action_id: resolve_action(state, token)?.id.clone() }
        }
        "clear-history" => Command::ClearHistory,
        other => return Err(format!("unknown command {other}, try `help`")),
    };
    Ok(ConsoleInput::Command(command))
}

pub fn render_queue(state: &GameState, lang: Language) -> String {
    let mut lines = vec![format!(
        "{} ({} {})",
        t(lang, Text::PlayerQueue),
        state.scoring_config.preset,
        state
            .scoring_config
            .points
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("/")
    )];
    if state.players.is_empty() {
        lines.push(format!("  {}", t(lang, Text::AddAtLeastPlayers)));
        return lines.join("\n");
    }
    for (i, player) in state.players.iter().enumerate() {
        let marker = if state.selected_player_id.as_deref() == Some(player.id.as_str()) {
            '>'
        } else {
            ' '
        };
        let label = if i == 0 {
            t(lang, Text::CurrentPlayer).to_string()
        } else {
            format!("{} {}", t(lang, Text::Position), i + 1)
        };
        lines.push(format!(
            "{marker} {:>2}. {:<16} {:>6} {}  [{label}]",
            i + 1,
            player.name,
            player.score,
            t(lang, Text::Points)
        ));
    }
    if state.double_multiplier {
        lines.push(format!("  ** {} **", t(lang, Text::MultiplierActive)));
    }
    lines.join("\n")
}

fn format_time(timestamp: i64) -> String {
    match Local.timestamp_millis_opt(timestamp).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => "--:--:--".into(),
    }
}

pub fn render_history(state: &GameState, lang: Language) -> String {
    let mut lines = vec![t(lang, Text::GameHistory).to_string()];
    if state.history.is_empty() {
        lines.push(format!("  {}", t(lang, Text::NoActionsYet)));
        return lines.join("\n");
    }
    for (i, action) in state.history.iter().enumerate() {
        let marker = if state.last_rollback_index == Some(i) { '*' } else { ' ' };
        lines.push(format!(
            "{marker}{:>3}. [{}] {}",
            i + 1,
            format_time(action.timestamp),
            describe(action, lang)
        ));
        for affected in &action.affected_players {
            lines.push(format!("        {:<16} {:>+6}", affected.player_name, affected.score_delta));
        }
    }
    lines.join("\n")
}
