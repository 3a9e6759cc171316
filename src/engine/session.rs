//! Caller-owned session: one live `GameState` plus the port it persists
//! through. Transitions stay pure; only `dispatch` touches the port.

use std::sync::Arc;

use crate::engine::commands::{apply_command, Command};
use crate::engine::config::EngineOptions;
use crate::engine::models::*;

/// Where a session's state comes from and goes to.
///
/// `save` must not fail loudly: implementations log and move on.
pub trait StatePort {
    fn load(&self) -> Option<GameState>;
    fn save(&self, state: &GameState);
}

impl<P: StatePort + ?Sized> StatePort for Arc<P> {
    fn load(&self) -> Option<GameState> {
        (**self).load()
    }

    fn save(&self, state: &GameState) {
        (**self).save(state)
    }
}

/// Port that keeps nothing. Handy for tests and throwaway sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl StatePort for NoPersistence {
    fn load(&self) -> Option<GameState> {
        None
    }

    fn save(&self, _state: &GameState) {}
}

pub struct GameSession<P: StatePort> {
    state: GameState,
    options: EngineOptions,
    port: P,
}

impl<P: StatePort> GameSession<P> {
    /// Load once from the port; an absent record starts a fresh game.
    pub fn open(port: P, options: EngineOptions) -> Self {
        let state = match port.load() {
            Some(state) => {
                tracing::info!(
                    players = state.players.len(),
                    history = state.history.len(),
                    active = state.is_game_active,
                    "restored game state"
                );
                state
            }
            None => GameState::default(),
        };
        Self { state, options, port }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    /// Apply a command and write through while a game is active.
    pub fn dispatch(&mut self, command: Command) -> TransitionResult {
        let result = apply_command(&self.state, &command, &self.options);
        if result.changed {
            self.state = result.state.clone();
            if self.state.is_game_active {
                self.port.save(&self.state);
            }
        }
        result
    }
}
