//! Persistence adapter behaviour against a real directory.

use std::fs;
use std::sync::Arc;

use mam_den_engine::engine::commands::Command;
use mam_den_engine::engine::config::EngineOptions;
use mam_den_engine::engine::models::*;
use mam_den_engine::engine::session::GameSession;
use mam_den_engine::i18n::Language;
use mam_den_engine::storage::background::BackgroundWriter;
use mam_den_engine::storage::{FileStore, KeyValueStore, Persistence, GAME_STATE_KEY, LANGUAGE_KEY};

fn open(dir: &std::path::Path) -> GameSession<Arc<Persistence<FileStore>>> {
    GameSession::open(Arc::new(Persistence::new(FileStore::new(dir))), EngineOptions::default())
}

#[test]
fn nothing_is_written_before_the_game_starts() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    session.dispatch(Command::AddPlayer { name: "An".into() });
    session.dispatch(Command::AddPlayer { name: "Bảo".into() });
    assert!(!dir.path().join(format!("{GAME_STATE_KEY}.json")).exists());

    session.dispatch(Command::StartGame);
    assert!(dir.path().join(format!("{GAME_STATE_KEY}.json")).exists());
}

#[test]
fn active_game_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let saved = {
        let mut session = open(dir.path());
        session.dispatch(Command::AddPlayer { name: "An".into() });
        session.dispatch(Command::AddPlayer { name: "Bảo".into() });
        session.dispatch(Command::AddPlayer { name: "Chi".into() });
        session.dispatch(Command::StartGame);
        let chi = session.state().players[2].id.clone();
        session.dispatch(Command::ToggleDoubleMultiplier);
        session.dispatch(Command::RecordScore { player_id: chi.clone(), points: 3 });
        session.dispatch(Command::RecordFault { player_id: chi });
        session.state().clone()
    };

    let session = open(dir.path());
    assert_eq!(*session.state(), saved);
    assert_eq!(session.state().history.len(), 2);
    assert!(session.state().history[1].doubled);
}

#[test]
fn corrupt_record_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(format!("{GAME_STATE_KEY}.json")), "{\"players\": 12").unwrap();
    let session = open(dir.path());
    assert_eq!(*session.state(), GameState::default());
}

#[test]
fn record_written_by_the_web_client_loads() {
    let dir = tempfile::tempdir().unwrap();
    let record = r#"{
        "players": [
            {"id": "p1", "name": "An", "score": -2},
            {"id": "p2", "name": "Bảo", "score": 2}
        ],
        "scoringConfig": {"preset": "5-10", "points": [1, 2]},
        "history": [{
            "id": "h1",
            "timestamp": 1700000000000,
            "type": "score",
            "description": "Bảo scored 2 points",
            "affectedPlayers": [
                {"playerId": "p2", "playerName": "Bảo", "scoreDelta": 2},
                {"playerId": "p1", "playerName": "An", "scoreDelta": -2}
            ],
            "snapshot": {
                "players": [
                    {"id": "p1", "name": "An", "score": -2},
                    {"id": "p2", "name": "Bảo", "score": 2}
                ],
                "doubleMultiplier": false
            }
        }],
        "isGameActive": true,
        "selectedPlayerId": null,
        "doubleMultiplier": false,
        "lastRollbackIndex": null
    }"#;
    fs::write(dir.path().join(format!("{GAME_STATE_KEY}.json")), record).unwrap();

    let mut session = open(dir.path());
    let state = session.state();
    assert_eq!(state.scoring_config.preset, ScoringPreset::FiveTen);
    assert_eq!(state.history[0].action_type, ActionType::Score);
    assert_eq!(state.history[0].points, None);
    assert!(!state.settings.enable_double_loser);

    let result = session.dispatch(Command::RollbackToAction { action_id: "h1".into() });
    assert!(result.changed);
    assert_eq!(session.state().last_rollback_index, Some(0));
}

#[test]
fn language_is_stored_under_its_own_key() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = Persistence::new(FileStore::new(dir.path()));
    persistence.save_language(Language::En).unwrap();
    assert_eq!(persistence.store().get(LANGUAGE_KEY).unwrap().as_deref(), Some("en"));
    assert!(persistence.load_state().is_none());
    assert_eq!(Persistence::new(FileStore::new(dir.path())).load_language(), Some(Language::En));
}

#[tokio::test]
async fn background_writer_persists_session() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = Arc::new(Persistence::new(FileStore::new(dir.path())));
    let mut session = GameSession::open(BackgroundWriter::spawn(Arc::clone(&persistence)), EngineOptions::default());
    session.dispatch(Command::AddPlayer { name: "An".into() });
    session.dispatch(Command::AddPlayer { name: "Bảo".into() });
    session.dispatch(Command::StartGame);
    let bao = session.state().players[1].id.clone();
    session.dispatch(Command::RecordTakeFromAll { player_id: bao, points: 2 });
    let expected = session.state().clone();

    let written = session.into_port().shutdown().await;
    assert_eq!(written, 2);
    assert_eq!(persistence.load_state(), Some(expected));
}
