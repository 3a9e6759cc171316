//! Display strings and history descriptions.
//!
//! History entries store only data; their text is rendered here on demand
//! for whichever language is active.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::models::{ActionType, GameAction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Vi,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Vi => "vi",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Language::Vi),
            "en" => Ok(Language::En),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    GameManager,
    PlayerQueue,
    AddAtLeastPlayers,
    CurrentPlayer,
    Position,
    Points,
    MultiplierActive,
    GameHistory,
    NoActionsYet,
    NothingHappened,
    GameStarted,
    Scored,
    Point,
    PointsPlural,
    Doubled,
    TookFrom,
    FromAllPlayers,
    Faulted,
    AllScoresReset,
    NewGameStarted,
    DoubleLoser,
}

pub fn t(lang: Language, key: Text) -> &'static str {
    match lang {
        Language::Vi => match key {
            Text::GameManager => "Mâm Đền",
            Text::PlayerQueue => "Hàng Đợi Người Chơi",
            Text::AddAtLeastPlayers => "Thêm ít nhất 2 người chơi để bắt đầu",
            Text::CurrentPlayer => "Người Chơi Hiện Tại",
            Text::Position => "Vị Trí",
            Text::Points => "Điểm",
            Text::MultiplierActive => "x2 Đang Hoạt Động - Chọn Điểm Để Nhân Đôi",
            Text::GameHistory => "Lịch Sử Trò Chơi",
            Text::NoActionsYet => "Chưa có hành động nào",
            Text::NothingHappened => "Không có gì thay đổi",
            Text::GameStarted => "Trò chơi đã bắt đầu",
            Text::Scored => "ghi được",
            Text::Point => "điểm",
            Text::PointsPlural => "điểm",
            Text::Doubled => "nhân đôi",
            Text::TookFrom => "lấy",
            Text::FromAllPlayers => "từ tất cả người chơi",
            Text::Faulted => "phạm lỗi và đổi vị trí",
            Text::AllScoresReset => "Tất cả điểm đã được đặt lại về 0",
            Text::NewGameStarted => "Trò chơi mới bắt đầu - tất cả điểm đã được đặt lại",
            Text::DoubleLoser => "Lỗ mười x2",
        },
        Language::En => match key {
            Text::GameManager => "Mâm Đền",
            Text::PlayerQueue => "Player Queue",
            Text::AddAtLeastPlayers => "Add at least 2 players to start",
            Text::CurrentPlayer => "Current Player",
            Text::Position => "Position",
            Text::Points => "Points",
            Text::MultiplierActive => "x2 Active - Pick Points To Double",
            Text::GameHistory => "Game History",
            Text::NoActionsYet => "No actions yet",
            Text::NothingHappened => "Nothing changed",
            Text::GameStarted => "Game started",
            Text::Scored => "scored",
            Text::Point => "point",
            Text::PointsPlural => "points",
            Text::Doubled => "doubled",
            Text::TookFrom => "took",
            Text::FromAllPlayers => "from all players",
            Text::Faulted => "faulted and moved position",
            Text::AllScoresReset => "All scores reset to 0",
            Text::NewGameStarted => "New game started - all scores reset",
            Text::DoubleLoser => "Double loser x2",
        },
    }
}

fn points_phrase(lang: Language, points: i64, doubled: bool) -> String {
    let unit = if points == 1 {
        t(lang, Text::Point)
    } else {
        t(lang, Text::PointsPlural)
    };
    let mut phrase = format!("{points} {unit}");
    if doubled {
        phrase.push_str(&format!(" ({})", t(lang, Text::Doubled)));
    }
    phrase
}

/// One-line description of a history entry.
pub fn describe(action: &GameAction, lang: Language) -> String {
    let actor = action.actor().map(|a| a.player_name.as_str()).unwrap_or("?");
    match action.action_type {
        ActionType::Score => {
            let points = action.points.unwrap_or_else(|| action.actor().map_or(0, |a| a.score_delta));
            format!(
                "{actor} {} {}",
                t(lang, Text::Scored),
                points_phrase(lang, points, action.doubled)
            )
        }
        ActionType::TakeFromAll => {
            let points = action
                .points
                .or_else(|| action.affected_players.get(1).map(|a| -a.score_delta))
                .unwrap_or(0);
            format!(
                "{actor} {} {} {}",
                t(lang, Text::TookFrom),
                points_phrase(lang, points, action.doubled),
                t(lang, Text::FromAllPlayers)
            )
        }
        ActionType::Fault => format!("{actor} {}", t(lang, Text::Faulted)),
        ActionType::Reset if action.new_game => t(lang, Text::NewGameStarted).to_string(),
        ActionType::Reset => t(lang, Text::AllScoresReset).to_string(),
        ActionType::DoubleLoser => t(lang, Text::DoubleLoser).to_string(),
    }
}
