use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{GameState, Table};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("table {0} not found")]
    TableNotFound(Uuid),
    #[error("no game state for table {0}")]
    GameStateNotFound(Uuid),
    #[error("unknown session token")]
    SessionNotFound,
    #[error("storage write failed: {0}")]
    WriteFailed(String),
}

/// Session record created on join: maps a resumable token back to a
/// player at a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub player_id: Uuid,
    pub table_id: Uuid,
}

/// Persistence boundary for the authoritative records. Writes are
/// last-write-wins; the engine persists a validated mutation before it
/// broadcasts it.
pub trait Storage: Send + Sync {
    fn load_table(&self, id: Uuid) -> Result<Table, StorageError>;
    fn save_table(&self, table: &Table) -> Result<(), StorageError>;
    fn load_game_state(&self, table_id: Uuid) -> Result<GameState, StorageError>;
    fn save_game_state(&self, state: &GameState) -> Result<(), StorageError>;
    fn create_session(&self, player_id: Uuid, table_id: Uuid) -> Result<String, StorageError>;
    fn resolve_session(&self, token: &str) -> Result<Session, StorageError>;
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Uuid, Table>>,
    game_states: Mutex<HashMap<Uuid, GameState>>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn load_table(&self, id: Uuid) -> Result<Table, StorageError> {
        self.tables
            .lock()
            .expect("tables lock poisoned")
            .get(&id)
            .cloned()
            .ok_or(StorageError::TableNotFound(id))
    }

    fn save_table(&self, table: &Table) -> Result<(), StorageError> {
        self.tables
            .lock()
            .expect("tables lock poisoned")
            .insert(table.id, table.clone());
        Ok(())
    }

    fn load_game_state(&self, table_id: Uuid) -> Result<GameState, StorageError> {
        self.game_states
            .lock()
            .expect("game states lock poisoned")
            .get(&table_id)
            .cloned()
            .ok_or(StorageError::GameStateNotFound(table_id))
    }

    fn save_game_state(&self, state: &GameState) -> Result<(), StorageError> {
        self.game_states
            .lock()
            .expect("game states lock poisoned")
            .insert(state.table_id, state.clone());
        Ok(())
    }

    fn create_session(&self, player_id: Uuid, table_id: Uuid) -> Result<String, StorageError> {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .expect("sessions lock poisoned")
            .insert(token.clone(), Session { player_id, table_id });
        Ok(token)
    }

    fn resolve_session(&self, token: &str) -> Result<Session, StorageError> {
        self.sessions
            .lock()
            .expect("sessions lock poisoned")
            .get(token)
            .cloned()
            .ok_or(StorageError::SessionNotFound)
    }
}
