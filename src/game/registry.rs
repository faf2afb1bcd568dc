use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::domain::Table;
use crate::game::table_actor::{TableActor, TableHandle};
use crate::infrastructure::{Storage, StorageError};
use crate::shared::DEFAULT_MAX_PLAYERS;

/// Per-process coordinator owning the `table_id -> actor` map. There is no
/// ambient global: the registry is created in `main` and injected into the
/// websocket layer. Tables run on independent actors, so actions against
/// different tables never contend.
pub struct TableRegistry {
    storage: Arc<dyn Storage>,
    tables: Mutex<HashMap<Uuid, TableHandle>>,
}

impl TableRegistry {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, tables: Mutex::new(HashMap::new()) }
    }

    pub fn create_table(&self, name: &str, max_players: Option<usize>) -> TableHandle {
        let table = Table::new(name, max_players.unwrap_or(DEFAULT_MAX_PLAYERS));
        let handle = TableActor::spawn(table, self.storage.clone());
        self.tables
            .lock()
            .expect("registry lock poisoned")
            .insert(handle.table_id, handle.clone());
        tracing::info!(table_id = %handle.table_id, name, "table created");
        handle
    }

    pub fn get(&self, table_id: Uuid) -> Option<TableHandle> {
        self.tables
            .lock()
            .expect("registry lock poisoned")
            .get(&table_id)
            .cloned()
    }

    /// Maps a session token back to its live table, for reconnects.
    pub fn resolve(&self, token: &str) -> Result<TableHandle, StorageError> {
        let session = self.storage.resolve_session(token)?;
        self.get(session.table_id)
            .ok_or(StorageError::TableNotFound(session.table_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;

    #[tokio::test]
    async fn tables_are_registered_and_found_by_id() {
        let registry = TableRegistry::new(Arc::new(MemoryStore::new()));
        let handle = registry.create_table("alpha", Some(4));
        assert!(registry.get(handle.table_id).is_some());
        assert!(registry.get(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn unknown_tokens_do_not_resolve() {
        let registry = TableRegistry::new(Arc::new(MemoryStore::new()));
        assert!(matches!(registry.resolve("bogus"), Err(StorageError::SessionNotFound)));
    }
}
